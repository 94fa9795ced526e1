#![forbid(unsafe_code)]

//! Recording host used by unit tests.

use std::cell::RefCell;
use std::rc::Rc;

use lattice_core::Rect;
use serde_json::Value;

use crate::host::{ComponentHost, ComponentHostError, ComponentRequest, PanelHandle};
use crate::item::ItemId;

#[derive(Debug, Clone, PartialEq)]
pub(crate) enum HostCall {
    Create(ItemId, String),
    Show(PanelHandle),
    Hide(PanelHandle),
    Resize(PanelHandle, Rect),
    Destroy(PanelHandle),
}

#[derive(Debug, Clone, Default)]
pub(crate) struct RecordingHost {
    pub(crate) calls: Rc<RefCell<Vec<HostCall>>>,
    next: u64,
}

impl RecordingHost {
    pub(crate) fn new() -> (Self, Rc<RefCell<Vec<HostCall>>>) {
        let host = Self::default();
        let calls = Rc::clone(&host.calls);
        (host, calls)
    }
}

impl ComponentHost for RecordingHost {
    fn create(&mut self, request: ComponentRequest<'_>) -> Result<PanelHandle, ComponentHostError> {
        if request.component_type == "broken" {
            return Err(ComponentHostError::UnknownComponentType("broken".into()));
        }
        self.next += 1;
        self.calls
            .borrow_mut()
            .push(HostCall::Create(request.item, request.component_type.to_owned()));
        Ok(PanelHandle(self.next))
    }

    fn show(&mut self, panel: PanelHandle) {
        self.calls.borrow_mut().push(HostCall::Show(panel));
    }

    fn hide(&mut self, panel: PanelHandle) {
        self.calls.borrow_mut().push(HostCall::Hide(panel));
    }

    fn resize(&mut self, panel: PanelHandle, rect: Rect) {
        self.calls.borrow_mut().push(HostCall::Resize(panel, rect));
    }

    fn destroy(&mut self, panel: PanelHandle) {
        self.calls.borrow_mut().push(HostCall::Destroy(panel));
    }

    fn state(&self, _panel: PanelHandle) -> Option<Value> {
        None
    }
}

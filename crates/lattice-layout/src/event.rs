#![forbid(unsafe_code)]

//! Layout events and per-item bubbling.
//!
//! Item events travel from the originating item up the parent chain. Each
//! item's handlers see the event in turn and may stop it; events that reach
//! the ground unstopped are queued for [`crate::Layout::drain_events`].

use std::collections::VecDeque;

use rustc_hash::FxHashMap;

use crate::host::PopoutHandle;
use crate::item::ItemId;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum LayoutEvent {
    ItemCreated(ItemId),
    StackCreated(ItemId),
    RowCreated(ItemId),
    ColumnCreated(ItemId),
    ComponentCreated(ItemId),
    BeforeItemDestroyed(ItemId),
    ItemDestroyed(ItemId),
    StateChanged(ItemId),
    ActiveContentItemChanged { stack: ItemId, item: ItemId },
    TabCreated { stack: ItemId, item: ItemId },
    ItemDropped(ItemId),
    SelectionChanged(Option<ItemId>),
    ItemMaximised(ItemId),
    ItemMinimised(ItemId),
    Initialised,
    WindowOpened(PopoutHandle),
    WindowClosed(PopoutHandle),
}

/// An item event on its way up the tree.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BubblingEvent {
    event: LayoutEvent,
    origin: ItemId,
    current: ItemId,
    stopped: bool,
}

impl BubblingEvent {
    pub(crate) const fn new(event: LayoutEvent, origin: ItemId) -> Self {
        Self {
            event,
            origin,
            current: origin,
            stopped: false,
        }
    }

    #[must_use]
    pub const fn event(&self) -> LayoutEvent {
        self.event
    }

    /// Item that emitted the event.
    #[must_use]
    pub const fn origin(&self) -> ItemId {
        self.origin
    }

    /// Item whose handlers are currently running.
    #[must_use]
    pub const fn current(&self) -> ItemId {
        self.current
    }

    /// Keep the event from reaching further ancestors.
    pub fn stop_propagation(&mut self) {
        self.stopped = true;
    }

    #[must_use]
    pub const fn is_propagation_stopped(&self) -> bool {
        self.stopped
    }
}

/// Token returned by [`crate::Layout::on_item_event`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ListenerId(u64);

type Handler = Box<dyn FnMut(&mut BubblingEvent)>;

#[derive(Default)]
pub(crate) struct EventHub {
    handlers: FxHashMap<ItemId, Vec<(ListenerId, Handler)>>,
    queue: VecDeque<LayoutEvent>,
    next_listener: u64,
}

impl std::fmt::Debug for EventHub {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("EventHub")
            .field("items_with_handlers", &self.handlers.len())
            .field("queued", &self.queue.len())
            .finish()
    }
}

impl EventHub {
    pub(crate) fn subscribe(
        &mut self,
        item: ItemId,
        handler: impl FnMut(&mut BubblingEvent) + 'static,
    ) -> ListenerId {
        self.next_listener += 1;
        let id = ListenerId(self.next_listener);
        self.handlers
            .entry(item)
            .or_default()
            .push((id, Box::new(handler)));
        id
    }

    pub(crate) fn unsubscribe(&mut self, listener: ListenerId) -> bool {
        let mut found = false;
        self.handlers.retain(|_, list| {
            let before = list.len();
            list.retain(|(id, _)| *id != listener);
            found |= list.len() != before;
            !list.is_empty()
        });
        found
    }

    pub(crate) fn forget_item(&mut self, item: ItemId) {
        self.handlers.remove(&item);
    }

    /// Run `item`'s handlers on the event.
    pub(crate) fn visit(&mut self, item: ItemId, event: &mut BubblingEvent) {
        event.current = item;
        if let Some(list) = self.handlers.get_mut(&item) {
            for (_, handler) in list.iter_mut() {
                handler(event);
            }
        }
    }

    pub(crate) fn queue(&mut self, event: LayoutEvent) {
        self.queue.push_back(event);
    }

    pub(crate) fn drain(&mut self) -> Vec<LayoutEvent> {
        self.queue.drain(..).collect()
    }
}

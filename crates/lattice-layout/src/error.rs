#![forbid(unsafe_code)]

use std::fmt;

use crate::host::ComponentHostError;
use crate::item::{ItemId, ItemType};

/// Errors returned by layout operations.
///
/// A failed mutation leaves the tree exactly as it was.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LayoutError {
    UnknownItem(ItemId),
    NotAChild {
        parent: ItemId,
        child: ItemId,
    },
    ComponentUnderRowOrColumn {
        parent: ItemId,
        child: ItemId,
    },
    InvalidChildType {
        parent: ItemType,
        child: ItemType,
    },
    IndexOutOfBounds {
        parent: ItemId,
        index: usize,
        len: usize,
    },
    GroundOccupied,
    NoSuchSplitter {
        row: ItemId,
        index: usize,
    },
    /// Attaching would make an item its own ancestor.
    CycleDetected {
        item: ItemId,
    },
    /// The item is already attached somewhere.
    AlreadyAttached {
        item: ItemId,
        parent: ItemId,
    },
    MissingComponentType,
    /// `ground` appeared in config content.
    ConfigItemType,
    Host(ComponentHostError),
    PopoutBlocked,
    SelectionDisabled,
    NotInitialised,
    AlreadyInitialised,
    AlreadyDestroyed,
}

impl fmt::Display for LayoutError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::UnknownItem(id) => write!(f, "unknown item {}", id.get()),
            Self::NotAChild { parent, child } => write!(
                f,
                "item {} is not a child of {}",
                child.get(),
                parent.get()
            ),
            Self::ComponentUnderRowOrColumn { parent, child } => write!(
                f,
                "component {} cannot be a direct child of row/column {}; wrap it in a stack",
                child.get(),
                parent.get()
            ),
            Self::InvalidChildType { parent, child } => {
                write!(f, "{child:?} cannot be a child of {parent:?}")
            }
            Self::IndexOutOfBounds { parent, index, len } => write!(
                f,
                "index {index} out of bounds for item {} with {len} children",
                parent.get()
            ),
            Self::GroundOccupied => write!(f, "ground already holds a root item"),
            Self::NoSuchSplitter { row, index } => {
                write!(f, "item {} has no splitter at index {index}", row.get())
            }
            Self::CycleDetected { item } => {
                write!(f, "attaching item {} would create a cycle", item.get())
            }
            Self::AlreadyAttached { item, parent } => write!(
                f,
                "item {} is already attached to {}",
                item.get(),
                parent.get()
            ),
            Self::MissingComponentType => write!(f, "component config is missing componentType"),
            Self::ConfigItemType => write!(f, "'ground' cannot appear in config content"),
            Self::Host(e) => write!(f, "component host error: {e}"),
            Self::PopoutBlocked => write!(f, "popout window was blocked"),
            Self::SelectionDisabled => write!(f, "selection is disabled in settings"),
            Self::NotInitialised => write!(f, "layout is not initialised"),
            Self::AlreadyInitialised => write!(f, "layout is already initialised"),
            Self::AlreadyDestroyed => write!(f, "layout has been destroyed"),
        }
    }
}

impl std::error::Error for LayoutError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Self::Host(e) => Some(e),
            _ => None,
        }
    }
}

impl From<ComponentHostError> for LayoutError {
    fn from(e: ComponentHostError) -> Self {
        Self::Host(e)
    }
}

//! Record lifecycle events and their notifier.
//!
//! # Responsibility
//! - Define the four lifecycle events a record publishes.
//! - Dispatch events to subscribed listeners.
//!
//! # Invariants
//! - Only `BeforeSave` and `BeforeDelete` can be vetoed.
//! - Listeners observe the record read-only.

mod notifier;

pub use notifier::{EventNotifier, RecordListener};

use crate::record::Record;

/// Event kind tags, used for logging and listener filtering.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum EventKind {
    BeforeSave,
    AfterSave,
    BeforeDelete,
    AfterDelete,
}

impl EventKind {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::BeforeSave => "before_save",
            Self::AfterSave => "after_save",
            Self::BeforeDelete => "before_delete",
            Self::AfterDelete => "after_delete",
        }
    }

    pub fn is_cancelable(self) -> bool {
        matches!(self, Self::BeforeSave | Self::BeforeDelete)
    }
}

/// Lifecycle event published by [`Record`].
#[derive(Debug, Clone, Copy)]
pub enum RecordEvent<'a> {
    /// Fired before any save statement is built. `insert` tells whether the
    /// save will insert a new row.
    BeforeSave { insert: bool, record: &'a Record<'a> },
    AfterSave { record: &'a Record<'a> },
    BeforeDelete { record: &'a Record<'a> },
    AfterDelete { record: &'a Record<'a> },
}

impl<'a> RecordEvent<'a> {
    pub fn kind(&self) -> EventKind {
        match self {
            Self::BeforeSave { .. } => EventKind::BeforeSave,
            Self::AfterSave { .. } => EventKind::AfterSave,
            Self::BeforeDelete { .. } => EventKind::BeforeDelete,
            Self::AfterDelete { .. } => EventKind::AfterDelete,
        }
    }

    pub fn record(&self) -> &'a Record<'a> {
        match self {
            Self::BeforeSave { record, .. }
            | Self::AfterSave { record }
            | Self::BeforeDelete { record }
            | Self::AfterDelete { record } => record,
        }
    }

    /// Insert flag of a `BeforeSave` event, `None` for other kinds.
    pub fn insert(&self) -> Option<bool> {
        match self {
            Self::BeforeSave { insert, .. } => Some(*insert),
            _ => None,
        }
    }
}

/// Listener answer to one event.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Verdict {
    #[default]
    Continue,
    /// Cancels the pending save/delete. Ignored for after-events.
    Veto,
}

#[cfg(test)]
mod tests {
    use super::{EventKind, Verdict};

    #[test]
    fn only_before_events_are_cancelable() {
        assert!(EventKind::BeforeSave.is_cancelable());
        assert!(EventKind::BeforeDelete.is_cancelable());
        assert!(!EventKind::AfterSave.is_cancelable());
        assert!(!EventKind::AfterDelete.is_cancelable());
    }

    #[test]
    fn default_verdict_continues() {
        assert_eq!(Verdict::default(), Verdict::Continue);
    }
}

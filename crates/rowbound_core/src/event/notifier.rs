//! Listener registry and dispatch policy.
//!
//! # Invariants
//! - Listeners run in subscription order.
//! - For cancelable events dispatch stops at the first `Veto`.
//! - For notification events every listener runs; verdicts are ignored.

use super::{RecordEvent, Verdict};
use log::debug;
use std::fmt::{Debug, Formatter};
use std::sync::Arc;

/// Subscriber contract for record lifecycle events.
pub trait RecordListener: Send + Sync {
    fn on_event(&self, event: &RecordEvent<'_>) -> Verdict;
}

impl<F> RecordListener for F
where
    F: Fn(&RecordEvent<'_>) -> Verdict + Send + Sync,
{
    fn on_event(&self, event: &RecordEvent<'_>) -> Verdict {
        self(event)
    }
}

/// Publish/subscribe hub shared by any number of records.
#[derive(Default)]
pub struct EventNotifier {
    listeners: Vec<Arc<dyn RecordListener>>,
}

impl EventNotifier {
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds one listener at the end of the dispatch order.
    pub fn subscribe(&mut self, listener: Arc<dyn RecordListener>) {
        self.listeners.push(listener);
    }

    /// Closure shorthand for [`EventNotifier::subscribe`].
    pub fn subscribe_fn<F>(&mut self, listener: F)
    where
        F: Fn(&RecordEvent<'_>) -> Verdict + Send + Sync + 'static,
    {
        self.listeners.push(Arc::new(listener));
    }

    pub fn len(&self) -> usize {
        self.listeners.len()
    }

    pub fn is_empty(&self) -> bool {
        self.listeners.is_empty()
    }

    /// Publishes `event` and returns the aggregated verdict.
    pub fn notify(&self, event: &RecordEvent<'_>) -> Verdict {
        let kind = event.kind();
        if !kind.is_cancelable() {
            for listener in &self.listeners {
                let _ = listener.on_event(event);
            }
            return Verdict::Continue;
        }

        for (position, listener) in self.listeners.iter().enumerate() {
            if listener.on_event(event) == Verdict::Veto {
                debug!(
                    "event=record_event module=event status=vetoed kind={} listener_index={} table={}",
                    kind.as_str(),
                    position,
                    event.record().table()
                );
                return Verdict::Veto;
            }
        }
        Verdict::Continue
    }
}

impl Debug for EventNotifier {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("EventNotifier")
            .field("listeners", &self.listeners.len())
            .finish()
    }
}

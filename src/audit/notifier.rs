//! Notification seam for committed changes

use super::event::ChangeEvent;

/// Receives an event after each successful mutation
///
/// Delivery is fire-and-forget: implementations report their own failures
/// and never fail the mutation that triggered them.
pub trait ChangeNotifier: Send + Sync {
    fn notify(&self, event: &ChangeEvent);
}

/// Drops every event
#[derive(Debug, Default, Clone, Copy)]
pub struct NoopNotifier;

impl ChangeNotifier for NoopNotifier {
    fn notify(&self, _event: &ChangeEvent) {}
}

#[cfg(test)]
pub(crate) mod recording {
    use std::sync::Mutex;

    use super::*;

    /// Keeps events in memory for assertions
    #[derive(Default)]
    pub struct RecordingNotifier {
        pub events: Mutex<Vec<ChangeEvent>>,
    }

    impl RecordingNotifier {
        pub fn kinds(&self) -> Vec<crate::audit::ChangeKind> {
            self.events.lock().unwrap().iter().map(|e| e.kind).collect()
        }
    }

    impl ChangeNotifier for RecordingNotifier {
        fn notify(&self, event: &ChangeEvent) {
            self.events.lock().unwrap().push(event.clone());
        }
    }
}

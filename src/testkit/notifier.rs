//! Notifier that keeps every event for later assertions.

use std::sync::Arc;

use parking_lot::Mutex;

use crate::port::outbound::notifier::{Notification, Notifier, NotifierRegistry};

/// Records notifications in memory. Clones share the same log.
#[derive(Debug, Clone, Default)]
pub struct RecordingNotifier {
    events: Arc<Mutex<Vec<Notification>>>,
}

impl RecordingNotifier {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// A registry holding a clone of this notifier.
    #[must_use]
    pub fn registry(&self) -> NotifierRegistry {
        let mut registry = NotifierRegistry::new();
        registry.register(Box::new(self.clone()));
        registry
    }

    #[must_use]
    pub fn events(&self) -> Vec<Notification> {
        self.events.lock().clone()
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.events.lock().len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.events.lock().is_empty()
    }
}

impl Notifier for RecordingNotifier {
    fn notify(&self, event: Notification) {
        self.events.lock().push(event);
    }
}

//! Recording notifier for testing.

use std::sync::{Arc, Mutex};

use crate::notifications::Notification;
use crate::traits::Notifier;

/// Notifier that keeps every notification for later inspection.
#[derive(Debug, Clone, Default)]
pub struct RecordingNotifier {
    notifications: Arc<Mutex<Vec<Notification>>>,
}

impl RecordingNotifier {
    pub fn new() -> Self {
        Self::default()
    }

    /// All notifications received so far, oldest first.
    pub fn notifications(&self) -> Vec<Notification> {
        self.notifications.lock().unwrap().clone()
    }

    pub fn count(&self) -> usize {
        self.notifications.lock().unwrap().len()
    }
}

impl Notifier for RecordingNotifier {
    fn notify(&self, notification: Notification) {
        self.notifications.lock().unwrap().push(notification);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::notifications::Severity;

    #[test]
    fn test_records_in_order() {
        let notifier = RecordingNotifier::new();
        notifier.notify(Notification::error("first"));
        notifier.notify(Notification::warning("second"));

        let seen = notifier.notifications();
        assert_eq!(notifier.count(), 2);
        assert_eq!(seen[0].message, "first");
        assert_eq!(seen[1].severity, Severity::Warning);
    }
}

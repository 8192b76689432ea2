//! Notification sink trait abstraction.

use crate::notifications::Notification;

/// Receiver of app-wide notifications (the snackbar channel).
///
/// Implementations must not block: the chat service calls `notify` on the
/// request path.
pub trait Notifier: Send + Sync {
    fn notify(&self, notification: Notification);
}

//! User-facing error presentation.

/// Label of the single acknowledgement action on every alert.
pub const ACKNOWLEDGE_LABEL: &str = "OK";

/// A modal message with one acknowledgement action.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Alert {
    pub message: String,
    pub acknowledge: &'static str,
}

impl Alert {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
            acknowledge: ACKNOWLEDGE_LABEL,
        }
    }
}

/// Presents alerts to the user.
///
/// Called from collaborator threads; implementations hand the alert over to
/// whatever thread owns the UI.
pub trait UserNotifier: Send + Sync {
    fn alert(&self, alert: Alert);
}

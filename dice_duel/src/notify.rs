//! User-facing notices and the seam frontends implement to show them.

use std::fmt;

pub const DISCONNECTED_NOTICE: &str = "Your opponent has disconnected so the game has been cancelled. You will be returned to the home screen.";
pub const CONNECTION_LOST_NOTICE: &str =
    "Lost connection to the game server. You will be returned to the home screen.";
pub const TIEBREAK_NOTICE: &str = "You tied! Continue rolling until one player gets a higher roll.";
pub const LOCAL_DOUBLE_NOTICE: &str = "You rolled a double! Click to roll again.";
pub const REMOTE_DOUBLE_NOTICE: &str = "They rolled a double!";

#[derive(Clone, Copy, Debug, Default, Eq, PartialEq)]
pub enum Severity {
    #[default]
    Success,
    Info,
    Warning,
    Error,
}

impl fmt::Display for Severity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let repr = match self {
            Self::Success => "success",
            Self::Info => "info",
            Self::Warning => "warning",
            Self::Error => "error",
        };
        write!(f, "{repr}")
    }
}

#[derive(Clone, Debug, Eq, PartialEq)]
pub struct Notice {
    pub message: String,
    pub severity: Severity,
    /// The user must dismiss a blocking notice before carrying on.
    pub blocking: bool,
}

impl Notice {
    pub fn new(message: impl Into<String>, severity: Severity) -> Self {
        Self {
            message: message.into(),
            severity,
            blocking: false,
        }
    }

    pub fn blocking(mut self) -> Self {
        self.blocking = true;
        self
    }
}

impl fmt::Display for Notice {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.message)
    }
}

/// Something that can put a notice in front of the user.
pub trait Notifier {
    fn notify(&mut self, notice: &Notice);
}

impl<F> Notifier for F
where
    F: FnMut(&Notice),
{
    fn notify(&mut self, notice: &Notice) {
        self(notice)
    }
}

impl Notifier for Vec<Notice> {
    fn notify(&mut self, notice: &Notice) {
        self.push(notice.clone());
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_closure_notifier() {
        let mut seen = Vec::new();
        let mut notifier = |notice: &Notice| seen.push(notice.severity);
        notifier.notify(&Notice::new("hi", Severity::Warning));
        assert_eq!(seen, vec![Severity::Warning]);
    }

    #[test]
    fn test_blocking_builder() {
        let notice = Notice::new(TIEBREAK_NOTICE, Severity::Info).blocking();
        assert!(notice.blocking);
        assert_eq!(notice.to_string(), TIEBREAK_NOTICE);
    }

    #[test]
    fn test_severity_display() {
        assert_eq!(Severity::Success.to_string(), "success");
        assert_eq!(Severity::Error.to_string(), "error");
    }
}

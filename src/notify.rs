//! Transient notifications
//!
//! Every user-facing failure ends up here; the driver shows the message and
//! removes it after `ttl`.

use std::time::Duration;

use crate::consts::NOTIFICATION_TTL;
use crate::error::ExternalError;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Severity {
    Success,
    Error,
    Info,
}

impl Severity {
    /// CSS class applied to the toast
    pub fn as_str(&self) -> &'static str {
        match self {
            Severity::Success => "success",
            Severity::Error => "error",
            Severity::Info => "info",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Notification {
    pub message: String,
    pub severity: Severity,
    pub ttl: Duration,
}

impl Notification {
    pub fn new(message: impl Into<String>, severity: Severity) -> Self {
        Self {
            message: message.into(),
            severity,
            ttl: NOTIFICATION_TTL,
        }
    }

    pub fn success(message: impl Into<String>) -> Self {
        Self::new(message, Severity::Success)
    }

    pub fn error(message: impl Into<String>) -> Self {
        Self::new(message, Severity::Error)
    }

    pub fn info(message: impl Into<String>) -> Self {
        Self::new(message, Severity::Info)
    }

    pub fn with_ttl(mut self, ttl: Duration) -> Self {
        self.ttl = ttl;
        self
    }
}

/// How a share request was fulfilled
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ShareOutcome {
    /// Native share sheet completed
    Shared,
    /// No share sheet; page URL went to the clipboard
    CopiedLink,
}

/// Notification for a share attempt (`None` when the user cancelled)
pub fn share_notification(outcome: Result<ShareOutcome, ExternalError>) -> Option<Notification> {
    match outcome {
        Ok(ShareOutcome::Shared) => Some(Notification::success("Thanks for sharing!")),
        Ok(ShareOutcome::CopiedLink) => Some(Notification::success("Link copied to clipboard")),
        Err(ExternalError::Cancelled) => None,
        Err(e) => {
            log::warn!("Share failed: {}", e);
            Some(Notification::error("Sharing is not available right now"))
        }
    }
}

/// Notification for an image export attempt
pub fn export_notification(outcome: Result<String, ExternalError>) -> Option<Notification> {
    match outcome {
        Ok(filename) => Some(Notification::success(format!("Saved {}", filename))),
        Err(ExternalError::Cancelled) => None,
        Err(e) => {
            log::warn!("Certificate export failed: {}", e);
            Some(Notification::error("Could not create the certificate image"))
        }
    }
}

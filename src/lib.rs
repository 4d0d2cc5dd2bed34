//! Pledge - a three-screen commitment wizard
//!
//! Core modules:
//! - `flow`: Pure wizard state machine (validation, transitions, effects)
//! - `persistence`: Key/value storage of the user record and autosave draft
//! - `runtime`: Controller that owns the wizard and applies storage effects
//! - `certificate`: Display data, download filename and share payload
//! - `celebration`: Deterministic confetti burst schedule
//! - `notify`: Transient notifications for external provider outcomes

pub mod certificate;
pub mod celebration;
pub mod error;
pub mod flow;
pub mod notify;
pub mod persistence;
pub mod runtime;
pub mod settings;

pub use certificate::{Certificate, SharePayload};
pub use error::{ExternalError, StorageError, ValidationError};
pub use flow::{Effect, Event, Gender, Screen, UserRecord, WizardState, step};
pub use runtime::Controller;
pub use settings::Settings;

/// Wizard configuration constants
pub mod consts {
    use std::time::Duration;

    /// LocalStorage key for the user record
    pub const STORAGE_KEY: &str = "pledge_user_data";
    /// LocalStorage key for the unvalidated entry-form draft
    pub const DRAFT_KEY: &str = "pledge_user_draft";
    /// LocalStorage key for display preferences
    pub const SETTINGS_KEY: &str = "pledge_settings";

    /// Simulated processing between "yes" and the certificate screen
    pub const PROCESSING_DELAY: Duration = Duration::from_millis(1500);
    /// Idle window before a keystroke is autosaved
    pub const AUTOSAVE_DEBOUNCE: Duration = Duration::from_millis(1000);
    /// How long a notification stays on screen
    pub const NOTIFICATION_TTL: Duration = Duration::from_millis(3000);

    /// Total confetti show length
    pub const CONFETTI_DURATION: Duration = Duration::from_millis(3000);
    /// Time between confetti bursts
    pub const CONFETTI_INTERVAL: Duration = Duration::from_millis(250);

    /// Minimum trimmed name length
    pub const MIN_NAME_LEN: usize = 2;

    /// Download filename prefix (followed by first and last name)
    pub const DOWNLOAD_PREFIX: &str = "commitment-certificate-";
    /// Title offered to the native share sheet
    pub const SHARE_TITLE: &str = "My Commitment Certificate";
}

//! User preferences
//!
//! Stored next to the user record under `SETTINGS_KEY` (see `RecordStore`).

use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::consts::NOTIFICATION_TTL;

/// Display preferences
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Settings {
    /// Confetti on commitment
    pub celebration: bool,
    /// Reduced motion (suppresses confetti)
    pub reduced_motion: bool,
    /// Seconds a notification stays visible
    pub notification_secs: f32,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            celebration: true,
            reduced_motion: false,
            notification_secs: NOTIFICATION_TTL.as_secs_f32(),
        }
    }
}

impl Settings {
    /// Effective celebration (respects reduced_motion)
    pub fn effective_celebration(&self) -> bool {
        self.celebration && !self.reduced_motion
    }

    /// Notification lifetime, clamped to something readable
    pub fn notification_ttl(&self) -> Duration {
        Duration::from_secs_f32(self.notification_secs.clamp(1.0, 30.0))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_reduced_motion_disables_celebration() {
        let mut settings = Settings::default();
        assert!(settings.effective_celebration());
        settings.reduced_motion = true;
        assert!(!settings.effective_celebration());
    }

    #[test]
    fn test_partial_json_fills_defaults() {
        let settings: Settings = serde_json::from_str(r#"{"reduced_motion":true}"#).unwrap();
        assert!(settings.reduced_motion);
        assert!(settings.celebration);
        assert_eq!(settings.notification_ttl(), NOTIFICATION_TTL);
    }

    #[test]
    fn test_notification_ttl_clamped() {
        let settings = Settings {
            notification_secs: 0.0,
            ..Default::default()
        };
        assert_eq!(settings.notification_ttl(), Duration::from_secs(1));
    }
}

//! Name field validation
//!
//! Rules are checked in order and the first failure wins:
//! empty, too short, then character set.

use crate::consts::MIN_NAME_LEN;
use crate::error::ValidationError;

/// Validate a single name field
pub fn validate(name: &str) -> Result<(), ValidationError> {
    let trimmed = name.trim();
    if trimmed.is_empty() {
        return Err(ValidationError::Required);
    }
    if trimmed.chars().count() < MIN_NAME_LEN {
        return Err(ValidationError::TooShort);
    }
    if !trimmed.chars().all(is_name_char) {
        return Err(ValidationError::InvalidCharacters);
    }
    Ok(())
}

/// ASCII letters plus space, hyphen and apostrophe
#[inline]
fn is_name_char(c: char) -> bool {
    c.is_ascii_alphabetic() || matches!(c, ' ' | '-' | '\'')
}

/// Per-field outcome of validating the entry form
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct NameCheck {
    pub first: Result<(), ValidationError>,
    pub last: Result<(), ValidationError>,
}

impl NameCheck {
    pub fn is_valid(&self) -> bool {
        self.first.is_ok() && self.last.is_ok()
    }
}

/// Validate both entry fields independently
pub fn validate_names(first: &str, last: &str) -> NameCheck {
    NameCheck {
        first: validate(first),
        last: validate(last),
    }
}

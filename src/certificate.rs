//! Certificate display data
//!
//! Derived from the user record and the current date; never persisted.

use chrono::NaiveDate;
use serde::Serialize;

use crate::consts::{DOWNLOAD_PREFIX, SHARE_TITLE};
use crate::flow::UserRecord;

/// Display-ready certificate contents
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Certificate {
    /// "First Last"
    pub full_name: String,
    /// "Month Day, Year"
    pub issued_on: String,
}

impl Certificate {
    pub fn derive(record: &UserRecord, today: NaiveDate) -> Self {
        Self {
            full_name: record.full_name(),
            issued_on: long_date(today),
        }
    }
}

/// Format a date as "October 17, 2026"
pub fn long_date(date: NaiveDate) -> String {
    date.format("%B %-d, %Y").to_string()
}

/// Name of the downloaded certificate image
pub fn download_filename(record: &UserRecord) -> String {
    format!(
        "{}{}-{}.png",
        DOWNLOAD_PREFIX,
        filename_part(&record.first_name),
        filename_part(&record.last_name)
    )
}

/// Collapse inner whitespace runs to a single hyphen
fn filename_part(name: &str) -> String {
    name.split_whitespace().collect::<Vec<_>>().join("-")
}

/// Payload offered to the native share sheet
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SharePayload {
    pub title: String,
    pub text: String,
    pub url: String,
}

impl SharePayload {
    pub fn new(record: &UserRecord, url: &str) -> Self {
        Self {
            title: SHARE_TITLE.to_string(),
            text: format!("I, {}, have made my commitment official!", record.full_name()),
            url: url.to_string(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn record() -> UserRecord {
        UserRecord {
            first_name: "Mary Ann".into(),
            last_name: "O'Brien".into(),
            ..Default::default()
        }
    }

    #[test]
    fn test_derive() {
        let date = NaiveDate::from_ymd_opt(2026, 3, 5).unwrap();
        let cert = Certificate::derive(&record(), date);
        assert_eq!(cert.full_name, "Mary Ann O'Brien");
        assert_eq!(cert.issued_on, "March 5, 2026");
    }

    #[test]
    fn test_long_date_no_padding() {
        let date = NaiveDate::from_ymd_opt(2024, 12, 31).unwrap();
        assert_eq!(long_date(date), "December 31, 2024");
    }

    #[test]
    fn test_download_filename() {
        assert_eq!(
            download_filename(&record()),
            "commitment-certificate-Mary-Ann-O'Brien.png"
        );
    }

    #[test]
    fn test_share_payload() {
        let payload = SharePayload::new(&record(), "https://example.com/");
        assert_eq!(payload.title, SHARE_TITLE);
        assert!(payload.text.contains("Mary Ann O'Brien"));
        assert_eq!(payload.url, "https://example.com/");
    }
}

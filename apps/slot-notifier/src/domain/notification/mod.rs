//! Slot Notification Types
//!
//! A structured notification is what a raw slot alert becomes once it has
//! been scored against the keyword tables. It is ephemeral: the only copy
//! that outlives a broadcast is the "last notification" slot kept by the
//! stats aggregator.

mod classifier;
mod keywords;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

pub use classifier::Classifier;
pub use keywords::{KeywordTable, KeywordTableError, KeywordTables, TagRule};

/// A classified slot alert.
///
/// Each classification axis holds at most one tag. An axis with no matching
/// keyword is `None` and serializes as `null`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StructuredNotification {
    /// Canonical country tag.
    pub country: Option<String>,
    /// Canonical visa center tag.
    pub center: Option<String>,
    /// Canonical visa type tag.
    pub visa_type: Option<String>,
    /// Appointment date, verbatim as it appeared in the alert.
    pub date: Option<String>,
    /// The original alert text.
    pub raw: String,
    /// When the notification was created.
    pub timestamp: DateTime<Utc>,
}

impl StructuredNotification {
    /// Whether no axis (and no date) could be extracted.
    #[must_use]
    pub const fn is_unclassified(&self) -> bool {
        self.country.is_none()
            && self.center.is_none()
            && self.visa_type.is_none()
            && self.date.is_none()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn serializes_with_camel_case_and_explicit_nulls() {
        let notification = StructuredNotification {
            country: Some("sweden".to_string()),
            center: None,
            visa_type: Some("tourist".to_string()),
            date: None,
            raw: "Sweden tourist".to_string(),
            timestamp: Utc::now(),
        };

        let json = serde_json::to_value(&notification).unwrap();
        assert_eq!(json["country"], "sweden");
        assert_eq!(json["visaType"], "tourist");
        assert!(json["center"].is_null());
        assert!(json["date"].is_null());
        assert_eq!(json["raw"], "Sweden tourist");
        assert!(json["timestamp"].is_string());
    }

    #[test]
    fn unclassified_detection() {
        let notification = StructuredNotification {
            country: None,
            center: None,
            visa_type: None,
            date: None,
            raw: "nothing".to_string(),
            timestamp: Utc::now(),
        };
        assert!(notification.is_unclassified());

        let dated = StructuredNotification {
            date: Some("2025-03-15".to_string()),
            ..notification
        };
        assert!(!dated.is_unclassified());
    }
}

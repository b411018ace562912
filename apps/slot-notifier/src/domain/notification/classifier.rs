//! Alert Classifier
//!
//! Turns free-text slot alerts into [`StructuredNotification`]s. The
//! classifier is pure and total: every input yields a notification, and an
//! axis without a keyword match is simply left empty.

use std::sync::OnceLock;

use chrono::Utc;
use regex::Regex;

use super::StructuredNotification;
use super::keywords::KeywordTables;

/// Accepted date shapes: `D/M/YYYY` with 1-2 digit day and month, or ISO
/// `YYYY-MM-DD`. Taken verbatim, no calendar validation.
const DATE_PATTERN: &str = r"\d{1,2}/\d{1,2}/\d{4}|\d{4}-\d{2}-\d{2}";

#[allow(clippy::expect_used)] // Pattern is a compile-time constant
fn date_regex() -> &'static Regex {
    static DATE_REGEX: OnceLock<Regex> = OnceLock::new();
    DATE_REGEX.get_or_init(|| Regex::new(DATE_PATTERN).expect("date regex is valid"))
}

/// Keyword-table driven alert classifier.
///
/// # Example
///
/// ```rust
/// use slot_notifier::domain::notification::Classifier;
///
/// let classifier = Classifier::default();
/// let n = classifier.classify("🇸🇪 Sweden - Rabat - Tourist Visa - 15/03/2025");
///
/// assert_eq!(n.country.as_deref(), Some("sweden"));
/// assert_eq!(n.center.as_deref(), Some("rabat"));
/// assert_eq!(n.visa_type.as_deref(), Some("tourist"));
/// assert_eq!(n.date.as_deref(), Some("15/03/2025"));
/// ```
#[derive(Debug, Clone, Default)]
pub struct Classifier {
    tables: KeywordTables,
}

impl Classifier {
    /// Create a classifier over the given tables.
    #[must_use]
    pub const fn new(tables: KeywordTables) -> Self {
        Self { tables }
    }

    /// The tables this classifier matches against.
    #[must_use]
    pub const fn tables(&self) -> &KeywordTables {
        &self.tables
    }

    /// Classify a raw alert.
    #[must_use]
    pub fn classify(&self, raw: &str) -> StructuredNotification {
        let haystack = raw.to_lowercase();

        StructuredNotification {
            country: self.tables.countries.first_match(&haystack).map(str::to_string),
            center: self.tables.centers.first_match(&haystack).map(str::to_string),
            visa_type: self.tables.visa_types.first_match(&haystack).map(str::to_string),
            date: extract_date(raw),
            raw: raw.to_string(),
            timestamp: Utc::now(),
        }
    }
}

/// First date-shaped substring in `text`, if any.
fn extract_date(text: &str) -> Option<String> {
    date_regex().find(text).map(|m| m.as_str().to_string())
}

#[cfg(test)]
mod tests {
    use proptest::prelude::*;
    use test_case::test_case;

    use super::*;
    use crate::domain::notification::{KeywordTable, TagRule};

    #[test]
    fn classifies_reference_alert() {
        let n = Classifier::default().classify("🇸🇪 Sweden - Rabat - Tourist Visa - 15/03/2025");

        assert_eq!(n.country.as_deref(), Some("sweden"));
        assert_eq!(n.center.as_deref(), Some("rabat"));
        assert_eq!(n.visa_type.as_deref(), Some("tourist"));
        assert_eq!(n.date.as_deref(), Some("15/03/2025"));
        assert_eq!(n.raw, "🇸🇪 Sweden - Rabat - Tourist Visa - 15/03/2025");
    }

    #[test]
    fn unmatched_alert_leaves_every_axis_empty() {
        let n = Classifier::default().classify("no country mentioned here");

        assert!(n.is_unclassified());
        assert_eq!(n.raw, "no country mentioned here");
    }

    #[test_case("SPAIN slots open", Some("spain") ; "uppercase name")]
    #[test_case("Rendez-vous Espagne", Some("spain") ; "french name")]
    #[test_case("🇮🇹 new dates", Some("italy") ; "flag emoji only")]
    #[test_case("Pays-Bas disponible", Some("netherlands") ; "hyphenated")]
    #[test_case("Deutschland termin", Some("germany") ; "native name")]
    #[test_case("nothing here", None ; "no country")]
    fn country_axis(text: &str, expected: Option<&str>) {
        let n = Classifier::default().classify(text);
        assert_eq!(n.country.as_deref(), expected);
    }

    #[test_case("Casablanca center", Some("casablanca") ; "full name")]
    #[test_case("CASA - business", Some("casablanca") ; "abbreviation")]
    #[test_case("Tanger rdv", Some("tangier") ; "french spelling")]
    #[test_case("Fes", None ; "unknown center")]
    fn center_axis(text: &str, expected: Option<&str>) {
        let n = Classifier::default().classify(text);
        assert_eq!(n.center.as_deref(), expected);
    }

    #[test_case("Business visa", Some("business") ; "business")]
    #[test_case("Visa étudiant", Some("student") ; "accented french")]
    #[test_case("Regroupement familial", Some("family") ; "family reunion")]
    #[test_case("Short stay 🏖", Some("tourist") ; "short stay")]
    #[test_case("Visa", None ; "no type")]
    fn visa_type_axis(text: &str, expected: Option<&str>) {
        let n = Classifier::default().classify(text);
        assert_eq!(n.visa_type.as_deref(), expected);
    }

    #[test_case("on 1/2/2025", Some("1/2/2025") ; "single digit day and month")]
    #[test_case("on 15/03/2025", Some("15/03/2025") ; "two digit day and month")]
    #[test_case("on 2025-03-15", Some("2025-03-15") ; "iso")]
    #[test_case("on 31/02/2025", Some("31/02/2025") ; "no calendar validation")]
    #[test_case("2025-04-01 then 15/03/2025", Some("2025-04-01") ; "first match wins")]
    #[test_case("on 15.03.2025", None ; "dotted shape rejected")]
    #[test_case("on 15/03/25", None ; "two digit year rejected")]
    fn date_extraction(text: &str, expected: Option<&str>) {
        assert_eq!(extract_date(text).as_deref(), expected);
    }

    #[test]
    fn first_declared_tag_wins_when_two_match() {
        let n = Classifier::default().classify("France or Spain, whichever opens");
        assert_eq!(n.country.as_deref(), Some("france"));
    }

    #[test]
    fn custom_tables_add_tags_without_code_changes() {
        let mut tables = KeywordTables::reference();
        tables.countries = KeywordTable::from(vec![TagRule::new("portugal", &["portugal", "🇵🇹"])]);
        let classifier = Classifier::new(tables);

        let n = classifier.classify("🇵🇹 slots");
        assert_eq!(n.country.as_deref(), Some("portugal"));
        assert_eq!(classifier.classify("Sweden").country, None);
    }

    proptest! {
        #[test]
        fn classify_is_total_and_preserves_raw(text in any::<String>()) {
            let classifier = Classifier::default();
            let n = classifier.classify(&text);
            let tables = classifier.tables();

            prop_assert_eq!(&n.raw, &text);
            if let Some(tag) = n.country.as_deref() {
                prop_assert!(tables.countries.contains_tag(tag));
            }
            if let Some(tag) = n.center.as_deref() {
                prop_assert!(tables.centers.contains_tag(tag));
            }
            if let Some(tag) = n.visa_type.as_deref() {
                prop_assert!(tables.visa_types.contains_tag(tag));
            }
        }

        #[test]
        fn classify_is_deterministic(text in "[ -~]{0,64}") {
            let classifier = Classifier::default();
            let a = classifier.classify(&text);
            let b = classifier.classify(&text);

            prop_assert_eq!(a.country, b.country);
            prop_assert_eq!(a.center, b.center);
            prop_assert_eq!(a.visa_type, b.visa_type);
            prop_assert_eq!(a.date, b.date);
        }
    }
}

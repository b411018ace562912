//! Keyword Tables
//!
//! Classification is driven entirely by data: each axis (country, center,
//! visa type) is an ordered list of `(tag, keywords)` rules. Adding a tag
//! means adding a rule; the matching routine never changes.
//!
//! Keywords are stored lowercased so the classifier only has to lowercase
//! the alert text once.

use std::collections::HashSet;

use serde::{Deserialize, Serialize};

/// One canonical tag and the surface keywords that select it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TagRule {
    /// Canonical tag emitted when any keyword matches.
    pub tag: String,
    /// Surface keywords (names, translations, abbreviations, emoji).
    pub keywords: Vec<String>,
}

impl TagRule {
    /// Create a rule from string slices.
    #[must_use]
    pub fn new(tag: &str, keywords: &[&str]) -> Self {
        Self {
            tag: tag.to_string(),
            keywords: keywords.iter().map(|k| (*k).to_string()).collect(),
        }
    }
}

/// Ordered rules for a single classification axis.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(from = "Vec<TagRule>", into = "Vec<TagRule>")]
pub struct KeywordTable {
    rules: Vec<TagRule>,
}

impl From<Vec<TagRule>> for KeywordTable {
    fn from(rules: Vec<TagRule>) -> Self {
        let rules = rules
            .into_iter()
            .map(|rule| TagRule {
                tag: rule.tag,
                keywords: rule.keywords.iter().map(|k| k.to_lowercase()).collect(),
            })
            .collect();
        Self { rules }
    }
}

impl From<KeywordTable> for Vec<TagRule> {
    fn from(table: KeywordTable) -> Self {
        table.rules
    }
}

impl KeywordTable {
    /// Return the tag of the first rule with a keyword contained in `haystack`.
    ///
    /// `haystack` must already be lowercased.
    #[must_use]
    pub fn first_match(&self, haystack: &str) -> Option<&str> {
        self.rules
            .iter()
            .find(|rule| rule.keywords.iter().any(|k| haystack.contains(k.as_str())))
            .map(|rule| rule.tag.as_str())
    }

    #[cfg(test)]
    pub(crate) fn contains_tag(&self, tag: &str) -> bool {
        self.rules.iter().any(|rule| rule.tag == tag)
    }

    /// Number of rules.
    #[must_use]
    pub fn len(&self) -> usize {
        self.rules.len()
    }

    /// Whether the table has no rules.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.rules.is_empty()
    }

    fn validate(&self, axis: &'static str) -> Result<(), KeywordTableError> {
        let mut seen = HashSet::new();
        for rule in &self.rules {
            if rule.tag.trim().is_empty() {
                return Err(KeywordTableError::EmptyTag { axis });
            }
            if rule.keywords.is_empty() {
                return Err(KeywordTableError::NoKeywords {
                    axis,
                    tag: rule.tag.clone(),
                });
            }
            if rule.keywords.iter().any(|k| k.trim().is_empty()) {
                return Err(KeywordTableError::EmptyKeyword {
                    axis,
                    tag: rule.tag.clone(),
                });
            }
            if !seen.insert(rule.tag.as_str()) {
                return Err(KeywordTableError::DuplicateTag {
                    axis,
                    tag: rule.tag.clone(),
                });
            }
        }
        Ok(())
    }
}

/// The full set of classification tables.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct KeywordTables {
    /// Country axis.
    pub countries: KeywordTable,
    /// Visa center axis.
    pub centers: KeywordTable,
    /// Visa type axis.
    pub visa_types: KeywordTable,
}

impl Default for KeywordTables {
    fn default() -> Self {
        Self::reference()
    }
}

impl KeywordTables {
    /// Tables of the reference deployment: six countries, three centers,
    /// four visa types.
    #[must_use]
    pub fn reference() -> Self {
        Self {
            countries: KeywordTable::from(vec![
                TagRule::new("france", &["france", "🇫🇷"]),
                TagRule::new("spain", &["spain", "espagne", "españa", "espana", "🇪🇸"]),
                TagRule::new("italy", &["italy", "italie", "italia", "🇮🇹"]),
                TagRule::new("germany", &["germany", "allemagne", "deutschland", "🇩🇪"]),
                TagRule::new("sweden", &["sweden", "suède", "suede", "sverige", "🇸🇪"]),
                TagRule::new(
                    "netherlands",
                    &["netherlands", "pays-bas", "pays bas", "holland", "nederland", "🇳🇱"],
                ),
            ]),
            centers: KeywordTable::from(vec![
                TagRule::new("rabat", &["rabat", "الرباط"]),
                TagRule::new("casablanca", &["casablanca", "casa", "cmn", "الدار البيضاء"]),
                TagRule::new("tangier", &["tangier", "tanger", "tanja", "tng", "طنجة"]),
            ]),
            visa_types: KeywordTable::from(vec![
                TagRule::new(
                    "tourist",
                    &["tourist", "tourism", "touriste", "tourisme", "short stay", "🏖"],
                ),
                TagRule::new("business", &["business", "affaires", "💼"]),
                TagRule::new("student", &["student", "étudiant", "etudiant", "study", "🎓"]),
                TagRule::new("family", &["family", "famille", "familial", "👨‍👩‍👧"]),
            ]),
        }
    }

    /// Parse and validate tables from YAML.
    ///
    /// ```yaml
    /// countries:
    ///   - tag: sweden
    ///     keywords: ["sweden", "🇸🇪"]
    /// centers: []
    /// visa_types: []
    /// ```
    pub fn from_yaml_str(yaml: &str) -> Result<Self, KeywordTableError> {
        let tables: Self = serde_yaml_bw::from_str(yaml)?;
        tables.validate()?;
        Ok(tables)
    }

    /// Reject tables the matcher cannot use unambiguously.
    pub fn validate(&self) -> Result<(), KeywordTableError> {
        self.countries.validate("countries")?;
        self.centers.validate("centers")?;
        self.visa_types.validate("visa_types")
    }
}

/// Keyword table errors.
#[derive(Debug, thiserror::Error)]
pub enum KeywordTableError {
    /// The YAML document could not be parsed.
    #[error("failed to parse keyword tables: {0}")]
    Parse(#[from] serde_yaml_bw::Error),

    /// A rule has a blank tag.
    #[error("{axis}: rule with empty tag")]
    EmptyTag {
        /// Axis name.
        axis: &'static str,
    },

    /// A rule has no keywords and could never match.
    #[error("{axis}: tag '{tag}' has no keywords")]
    NoKeywords {
        /// Axis name.
        axis: &'static str,
        /// Offending tag.
        tag: String,
    },

    /// A blank keyword would match every alert.
    #[error("{axis}: tag '{tag}' has an empty keyword")]
    EmptyKeyword {
        /// Axis name.
        axis: &'static str,
        /// Offending tag.
        tag: String,
    },

    /// The same tag is declared twice on one axis.
    #[error("{axis}: duplicate tag '{tag}'")]
    DuplicateTag {
        /// Axis name.
        axis: &'static str,
        /// Offending tag.
        tag: String,
    },
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn reference_table_sizes() {
        let tables = KeywordTables::reference();
        assert_eq!(tables.countries.len(), 6);
        assert_eq!(tables.centers.len(), 3);
        assert_eq!(tables.visa_types.len(), 4);
        assert!(tables.validate().is_ok());
    }

    #[test]
    fn keywords_are_lowercased_on_construction() {
        let table = KeywordTable::from(vec![TagRule::new("sweden", &["SWEDEN", "Sverige"])]);
        assert_eq!(table.first_match("sweden slots"), Some("sweden"));
        assert_eq!(table.first_match("sverige"), Some("sweden"));
    }

    #[test]
    fn first_rule_in_declaration_order_wins() {
        let table = KeywordTable::from(vec![
            TagRule::new("first", &["beta"]),
            TagRule::new("second", &["alpha"]),
        ]);
        // "alpha" appears earlier in the text, but "first" is declared first.
        assert_eq!(table.first_match("alpha beta"), Some("first"));
    }

    #[test]
    fn no_match_returns_none() {
        let table = KeywordTables::reference().countries;
        assert_eq!(table.first_match("nothing to see"), None);
    }

    #[test]
    fn earlier_rule_wins_when_several_match() {
        let tables = KeywordTables::reference();
        assert_eq!(
            tables.centers.first_match("tangier or casablanca or rabat"),
            Some("rabat")
        );
        assert!(tables.centers.contains_tag("tangier"));
        assert!(!tables.centers.contains_tag("fes"));
    }

    #[test]
    fn yaml_round_trip_through_serde() {
        let yaml = r#"
countries:
  - tag: portugal
    keywords: ["Portugal", "🇵🇹"]
centers:
  - tag: agadir
    keywords: ["agadir"]
visa_types: []
"#;
        let tables = KeywordTables::from_yaml_str(yaml).unwrap();
        assert_eq!(tables.countries.first_match("portugal 🇵🇹"), Some("portugal"));
        assert_eq!(tables.centers.first_match("agadir"), Some("agadir"));
        assert!(tables.visa_types.is_empty());
    }

    #[test]
    fn yaml_rejects_duplicate_tag() {
        let yaml = r#"
countries:
  - tag: spain
    keywords: ["spain"]
  - tag: spain
    keywords: ["espagne"]
centers: []
visa_types: []
"#;
        let err = KeywordTables::from_yaml_str(yaml).unwrap_err();
        assert!(matches!(err, KeywordTableError::DuplicateTag { axis: "countries", .. }));
    }

    #[test]
    fn yaml_rejects_empty_keyword() {
        let yaml = r#"
countries: []
centers:
  - tag: rabat
    keywords: ["rabat", " "]
visa_types: []
"#;
        let err = KeywordTables::from_yaml_str(yaml).unwrap_err();
        assert!(matches!(err, KeywordTableError::EmptyKeyword { axis: "centers", .. }));
    }

    #[test]
    fn yaml_rejects_rule_without_keywords() {
        let yaml = r#"
countries: []
centers: []
visa_types:
  - tag: work
    keywords: []
"#;
        let err = KeywordTables::from_yaml_str(yaml).unwrap_err();
        assert!(matches!(err, KeywordTableError::NoKeywords { axis: "visa_types", .. }));
    }

    #[test]
    fn yaml_rejects_garbage() {
        let err = KeywordTables::from_yaml_str("countries: [").unwrap_err();
        assert!(matches!(err, KeywordTableError::Parse(_)));
    }
}

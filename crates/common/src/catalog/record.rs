//! Assessment record model

use super::Topic;
use serde::{Deserialize, Deserializer, Serialize};
use std::fmt;

/// A single catalog entry. Immutable once the catalog is built.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct AssessmentRecord {
    /// Position in the catalog, assigned at load time
    #[serde(skip)]
    pub index: usize,

    pub name: String,

    /// Unique identifier used for evaluation matching
    pub url: String,

    pub description: String,

    /// Duration in minutes
    pub duration: u32,

    pub test_type: TestTypes,

    pub adaptive_support: SupportFlag,

    pub remote_support: SupportFlag,
}

impl AssessmentRecord {
    /// Text the record is embedded from
    pub fn embedding_text(&self) -> String {
        format!(
            "{} {} {} {} {}",
            self.name,
            self.description,
            self.test_type.joined(" "),
            self.adaptive_support,
            self.remote_support
        )
    }

    /// Diversification bucket of this record
    pub fn topic(&self) -> Topic {
        Topic::bucket_for(self.test_type.iter())
    }
}

/// Ordered test-type labels. Accepts a single string or a list on input and
/// always serialises as a list.
#[derive(Debug, Clone, Serialize, PartialEq, Eq, Default)]
#[serde(transparent)]
pub struct TestTypes(Vec<String>);

impl TestTypes {
    pub fn new(labels: Vec<String>) -> Self {
        Self(labels)
    }

    pub fn iter(&self) -> impl Iterator<Item = &str> {
        self.0.iter().map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn joined(&self, separator: &str) -> String {
        self.0.join(separator)
    }

    pub fn to_vec(&self) -> Vec<String> {
        self.0.clone()
    }
}

impl<'de> Deserialize<'de> for TestTypes {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        #[derive(Deserialize)]
        #[serde(untagged)]
        enum OneOrMany {
            One(String),
            Many(Vec<String>),
        }

        Ok(match OneOrMany::deserialize(deserializer)? {
            OneOrMany::One(label) => TestTypes(vec![label]),
            OneOrMany::Many(labels) => TestTypes(labels),
        })
    }
}

/// Boolean-like support flag. The original value ("Yes"/"No" or a JSON bool)
/// is kept so results echo the catalog unchanged.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(untagged)]
pub enum SupportFlag {
    Flag(bool),
    Label(String),
}

impl fmt::Display for SupportFlag {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SupportFlag::Flag(value) => write!(f, "{}", value),
            SupportFlag::Label(label) => f.write_str(label),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_scalar_test_type_becomes_list() {
        let record: AssessmentRecord = serde_json::from_value(serde_json::json!({
            "name": "Verify Numerical Ability",
            "url": "https://example.com/verify-numerical",
            "description": "Numerical reasoning",
            "duration": 25,
            "test_type": "Cognitive",
            "adaptive_support": "Yes",
            "remote_support": true
        }))
        .unwrap();

        assert_eq!(record.test_type.to_vec(), vec!["Cognitive".to_string()]);
        assert_eq!(record.topic(), Topic::Cognitive);
        assert_eq!(record.adaptive_support, SupportFlag::Label("Yes".into()));
        assert_eq!(record.remote_support, SupportFlag::Flag(true));
    }

    #[test]
    fn test_embedding_text_layout() {
        let record = AssessmentRecord {
            index: 0,
            name: "Java 8".into(),
            url: "https://example.com/java-8".into(),
            description: "Core Java".into(),
            duration: 30,
            test_type: TestTypes::new(vec!["Technical".into(), "Java".into()]),
            adaptive_support: SupportFlag::Label("No".into()),
            remote_support: SupportFlag::Flag(true),
        };

        assert_eq!(record.embedding_text(), "Java 8 Core Java Technical Java No true");
    }

    #[test]
    fn test_support_flag_round_trips_original_value() {
        let flag: SupportFlag = serde_json::from_str("\"No\"").unwrap();
        assert_eq!(flag.to_string(), "No");
        assert_eq!(serde_json::to_string(&flag).unwrap(), "\"No\"");
    }
}

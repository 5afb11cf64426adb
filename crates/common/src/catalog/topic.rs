//! Topic tags used to bucket assessments and detect query focus

use serde::{Deserialize, Serialize};
use std::fmt;

/// Assessment domain a record is bucketed into
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "snake_case")]
pub enum Topic {
    Cognitive,
    Personality,
    Behavioral,
    Situational,
    Knowledge,
    Ability,
    /// No recognised test-type label
    Other,
}

impl Topic {
    /// Topics recognised by focus detection, in detection order
    pub const FOCUS_ORDER: [Topic; 5] = [
        Topic::Cognitive,
        Topic::Personality,
        Topic::Situational,
        Topic::Knowledge,
        Topic::Ability,
    ];

    /// Focus used when a query mentions none of the keyword groups
    pub const DEFAULT_FOCUS: [Topic; 2] = [Topic::Cognitive, Topic::Personality];

    /// Map a test-type label onto its bucket, ignoring case.
    ///
    /// The six bucket names and a literal `other` are recognised; anything
    /// else is `None`.
    pub fn from_label(label: &str) -> Option<Topic> {
        let label = label.to_lowercase();
        match label.as_str() {
            "cognitive" => Some(Topic::Cognitive),
            "personality" => Some(Topic::Personality),
            "behavioral" => Some(Topic::Behavioral),
            "situational" => Some(Topic::Situational),
            "knowledge" => Some(Topic::Knowledge),
            "ability" => Some(Topic::Ability),
            "other" => Some(Topic::Other),
            _ => None,
        }
    }

    /// Bucket for an ordered list of labels: first recognised label wins
    pub fn bucket_for<'a, I>(labels: I) -> Topic
    where
        I: IntoIterator<Item = &'a str>,
    {
        labels
            .into_iter()
            .find_map(Topic::from_label)
            .unwrap_or(Topic::Other)
    }

    /// Query keywords that put this topic in focus.
    ///
    /// `Behavioral` and `Other` have no keyword group and are never detected.
    pub fn keywords(&self) -> &'static [&'static str] {
        match self {
            Topic::Cognitive => &["cognitive", "reasoning", "numerical", "verbal", "logical", "analytical"],
            Topic::Personality => &["personality", "behavioral", "behavior", "motivation", "values", "traits"],
            Topic::Situational => &["situational", "judgment", "scenario", "decision"],
            Topic::Knowledge => &["knowledge", "technical", "skills", "expertise", "competency"],
            Topic::Ability => &["ability", "aptitude", "capability", "talent"],
            Topic::Behavioral | Topic::Other => &[],
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Topic::Cognitive => "cognitive",
            Topic::Personality => "personality",
            Topic::Behavioral => "behavioral",
            Topic::Situational => "situational",
            Topic::Knowledge => "knowledge",
            Topic::Ability => "ability",
            Topic::Other => "other",
        }
    }
}

impl fmt::Display for Topic {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_label_matching_ignores_case() {
        assert_eq!(Topic::from_label("Cognitive"), Some(Topic::Cognitive));
        assert_eq!(Topic::from_label("BEHAVIORAL"), Some(Topic::Behavioral));
        assert_eq!(Topic::from_label("Technical"), None);
        assert_eq!(Topic::from_label("Other"), Some(Topic::Other));
    }

    #[test]
    fn test_first_recognised_label_wins() {
        let bucket = Topic::bucket_for(["Technical", "Ability", "Cognitive"]);
        assert_eq!(bucket, Topic::Ability);
    }

    #[test]
    fn test_unrecognised_labels_fall_into_other() {
        assert_eq!(Topic::bucket_for(["Java", "Programming"]), Topic::Other);
    }

    #[test]
    fn test_other_label_stops_the_search() {
        assert_eq!(Topic::bucket_for(["Other", "Cognitive"]), Topic::Other);
        assert_eq!(Topic::bucket_for(["Java", "other", "Ability"]), Topic::Other);
    }

    #[test]
    fn test_behavioral_has_no_keywords() {
        assert!(Topic::Behavioral.keywords().is_empty());
        assert!(!Topic::FOCUS_ORDER.contains(&Topic::Behavioral));
        assert!(Topic::Personality.keywords().contains(&"behavioral"));
    }
}

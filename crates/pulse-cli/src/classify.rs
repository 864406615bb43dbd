use anyhow::Context;
use pulse_core::{Classifier, Event, Labeled};
use std::collections::BTreeMap;
use std::path::Path;

/// Classifies events through a caller-supplied subtitle → label table,
/// typically exported from a repository-metadata service. One label per
/// matching event, weight 1. Events with no table entry stay unlabeled.
pub struct TableClassifier {
    table: BTreeMap<String, String>,
}

impl TableClassifier {
    pub fn new(table: BTreeMap<String, String>) -> Self {
        Self { table }
    }

    pub fn from_file(path: &Path) -> anyhow::Result<Self> {
        let raw = std::fs::read_to_string(path)
            .with_context(|| format!("cannot read label table {}", path.display()))?;
        let table: BTreeMap<String, String> = serde_json::from_str(&raw)
            .with_context(|| format!("invalid label table {}", path.display()))?;
        Ok(Self::new(table))
    }
}

impl Classifier for TableClassifier {
    fn classify(&self, event: &Event) -> Vec<Labeled> {
        match self.table.get(&event.subtitle) {
            Some(label) => vec![Labeled {
                label: label.clone(),
                weight: 1,
            }],
            None => Vec::new(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{TimeZone, Utc};
    use pulse_core::Source;
    use std::io::Write;

    fn event(subtitle: &str) -> Event {
        Event {
            source: Source::Github,
            id: "1".to_string(),
            timestamp: Utc.with_ymd_and_hms(2024, 1, 1, 0, 0, 0).unwrap(),
            title: String::new(),
            subtitle: subtitle.to_string(),
            url: None,
            meta: None,
        }
    }

    #[test]
    fn test_known_subtitle_yields_one_label() {
        let classifier = TableClassifier::new(BTreeMap::from([(
            "org/repo".to_string(),
            "Rust".to_string(),
        )]));
        let labels = classifier.classify(&event("org/repo"));
        assert_eq!(labels.len(), 1);
        assert_eq!(labels[0].label, "Rust");
        assert_eq!(labels[0].weight, 1);
    }

    #[test]
    fn test_unknown_subtitle_yields_nothing() {
        let classifier = TableClassifier::new(BTreeMap::new());
        assert!(classifier.classify(&event("org/other")).is_empty());
    }

    #[test]
    fn test_loads_table_from_json_file() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        write!(file, r#"{{"org/repo": "C", "torvalds/linux": "C"}}"#).unwrap();

        let classifier = TableClassifier::from_file(file.path()).unwrap();
        assert_eq!(classifier.classify(&event("torvalds/linux"))[0].label, "C");
    }

    #[test]
    fn test_invalid_table_file_is_an_error() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        write!(file, "not json").unwrap();
        assert!(TableClassifier::from_file(file.path()).is_err());
    }
}

//! Immutable label vocabulary.
//!
//! Replaces the mutable module-level label tables of older pipelines with
//! an explicit table built once and passed into feature encoding.

use anyhow::{anyhow, Result};
use std::collections::HashMap;

/// Bidirectional label <-> id table for a tagging scheme.
#[derive(Debug, Clone)]
pub struct LabelVocabulary {
    id_to_label: Vec<String>,
    label_to_id: HashMap<String, usize>,
}

impl LabelVocabulary {
    /// Build a vocabulary from an ordered label list. Ids follow list
    /// order. Duplicate labels are rejected.
    pub fn new<S: Into<String>>(labels: impl IntoIterator<Item = S>) -> Result<Self> {
        let mut id_to_label = Vec::new();
        let mut label_to_id = HashMap::new();
        for label in labels {
            let label = label.into();
            if label_to_id.contains_key(&label) {
                return Err(anyhow!("duplicate label '{}'", label));
            }
            label_to_id.insert(label.clone(), id_to_label.len());
            id_to_label.push(label);
        }
        Ok(Self {
            id_to_label,
            label_to_id,
        })
    }

    pub fn id(&self, label: &str) -> Option<usize> {
        self.label_to_id.get(label).copied()
    }

    pub fn label(&self, id: usize) -> Option<&str> {
        self.id_to_label.get(id).map(|s| s.as_str())
    }

    pub fn len(&self) -> usize {
        self.id_to_label.len()
    }

    pub fn is_empty(&self) -> bool {
        self.id_to_label.is_empty()
    }

    /// Id of the outside tag, used for the placeholder tokens.
    pub fn outside_id(&self) -> Result<usize> {
        self.id("O")
            .ok_or_else(|| anyhow!("label vocabulary has no 'O' tag"))
    }

    /// Label set of the CLUENER benchmark (BIOS scheme).
    pub fn cluener() -> Self {
        let mut labels = vec!["X".to_string()];
        let types = [
            "address",
            "book",
            "company",
            "game",
            "government",
            "movie",
            "name",
            "organization",
            "position",
            "scene",
        ];
        for prefix in ["B-", "I-", "S-"] {
            for t in types {
                labels.push(format!("{prefix}{t}"));
            }
        }
        labels.push("O".to_string());
        labels.push("[START]".to_string());
        labels.push("[END]".to_string());
        Self::new(labels).expect("preset labels are unique")
    }

    /// Label set of the CNER resume benchmark (BIOS scheme).
    pub fn cner() -> Self {
        let mut labels = vec!["X".to_string()];
        let bi_types = ["CONT", "EDU", "LOC", "NAME", "ORG", "PRO", "RACE", "TITLE"];
        for prefix in ["B-", "I-"] {
            for t in bi_types {
                labels.push(format!("{prefix}{t}"));
            }
        }
        labels.push("O".to_string());
        for t in ["NAME", "ORG", "RACE"] {
            labels.push(format!("S-{t}"));
        }
        labels.push("[START]".to_string());
        labels.push("[END]".to_string());
        Self::new(labels).expect("preset labels are unique")
    }
}

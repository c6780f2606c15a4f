//! Event-type vocabulary
//!
//! Maps loan type labels to dense, 0-indexed integer codes in first-seen order.
//! One vocabulary is built over the whole dataset before it is split, so every
//! slice agrees on both the codes and `num_types`.

use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// Grow-only label → code mapping
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(from = "VocabularyLabels", into = "VocabularyLabels")]
pub struct TypeVocabulary {
    /// Labels indexed by code
    labels: Vec<String>,
    /// Reverse index
    codes: HashMap<String, usize>,
}

/// Persisted form: labels in code order
#[derive(Serialize, Deserialize)]
struct VocabularyLabels {
    labels: Vec<String>,
}

impl From<VocabularyLabels> for TypeVocabulary {
    fn from(value: VocabularyLabels) -> Self {
        TypeVocabulary::from_labels(value.labels)
    }
}

impl From<TypeVocabulary> for VocabularyLabels {
    fn from(value: TypeVocabulary) -> Self {
        VocabularyLabels {
            labels: value.labels,
        }
    }
}

impl TypeVocabulary {
    pub fn new() -> Self {
        Self::default()
    }

    /// Rebuild a vocabulary from labels listed in code order.
    ///
    /// Repeated labels keep their first code.
    pub fn from_labels<I, S>(labels: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let mut vocabulary = Self::new();
        for label in labels {
            vocabulary.intern(label.as_ref());
        }
        vocabulary
    }

    /// Return the code for `label`, assigning the next unused code if unseen
    pub fn intern(&mut self, label: &str) -> usize {
        if let Some(&code) = self.codes.get(label) {
            return code;
        }
        let code = self.labels.len();
        self.labels.push(label.to_string());
        self.codes.insert(label.to_string(), code);
        code
    }

    /// Code for an already interned label
    pub fn code(&self, label: &str) -> Option<usize> {
        self.codes.get(label).copied()
    }

    /// Label for a code
    pub fn label(&self, code: usize) -> Option<&str> {
        self.labels.get(code).map(String::as_str)
    }

    /// Number of distinct labels interned so far (`num_types`)
    pub fn size(&self) -> usize {
        self.labels.len()
    }

    pub fn is_empty(&self) -> bool {
        self.labels.is_empty()
    }

    /// Labels in code order
    pub fn labels(&self) -> &[String] {
        &self.labels
    }
}

//! Thesaurus domain models.

use std::hash::{Hash, Hasher};

use serde::{Deserialize, Serialize};

/// A vocabulary entry as returned by the thesaurus API.
///
/// Identity is the concept URI; two concepts with the same URI are equal
/// regardless of which labels were returned for them.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ThesaurusConcept {
    pub pref_label: String,

    /// Alternate label that matched the query, if any
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub alt_label: Option<String>,

    /// Hidden label that matched the query, if any
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub hidden_label: Option<String>,

    pub uri: String,

    #[serde(default, rename = "vocab")]
    pub vocabulary: String,

    #[serde(default, rename = "lang")]
    pub language: String,
}

impl ThesaurusConcept {
    pub fn new(pref_label: impl Into<String>, uri: impl Into<String>) -> Self {
        Self {
            pref_label: pref_label.into(),
            alt_label: None,
            hidden_label: None,
            uri: uri.into(),
            vocabulary: String::new(),
            language: String::new(),
        }
    }

    pub fn with_alt_label(mut self, label: impl Into<String>) -> Self {
        self.alt_label = Some(label.into());
        self
    }

    pub fn with_hidden_label(mut self, label: impl Into<String>) -> Self {
        self.hidden_label = Some(label.into());
        self
    }

    pub fn with_vocabulary(mut self, vocabulary: impl Into<String>, language: impl Into<String>) -> Self {
        self.vocabulary = vocabulary.into();
        self.language = language.into();
        self
    }

    /// Does the alternate label match `term` (case-insensitive, trimmed).
    pub fn alt_label_matches(&self, term: &str) -> bool {
        label_matches(self.alt_label.as_deref(), term)
    }

    /// Does the hidden label match `term` (case-insensitive, trimmed).
    pub fn hidden_label_matches(&self, term: &str) -> bool {
        label_matches(self.hidden_label.as_deref(), term)
    }

    /// Does either non-preferred label match `term`.
    pub fn variant_label_matches(&self, term: &str) -> bool {
        self.alt_label_matches(term) || self.hidden_label_matches(term)
    }
}

fn label_matches(label: Option<&str>, term: &str) -> bool {
    label.is_some_and(|label| label.trim().to_lowercase() == term.trim().to_lowercase())
}

impl PartialEq for ThesaurusConcept {
    fn eq(&self, other: &Self) -> bool {
        self.uri == other.uri
    }
}

impl Eq for ThesaurusConcept {}

impl Hash for ThesaurusConcept {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.uri.hash(state);
    }
}

/// Concepts matching a keyword search. Never empty: an empty match is `None`.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ConceptSearchResult {
    pub query: String,
    pub concepts: Vec<ThesaurusConcept>,
}

impl ConceptSearchResult {
    /// Wraps `concepts`, returning `None` for an empty list.
    pub fn from_concepts(query: impl Into<String>, concepts: Vec<ThesaurusConcept>) -> Option<Self> {
        if concepts.is_empty() {
            None
        } else {
            Some(Self {
                query: query.into(),
                concepts,
            })
        }
    }

    pub fn len(&self) -> usize {
        self.concepts.len()
    }

    pub fn is_empty(&self) -> bool {
        self.concepts.is_empty()
    }
}

/// Concepts hierarchically narrower than `broader_uri`. Never empty.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct NarrowerResult {
    pub broader_uri: String,
    pub concepts: Vec<ThesaurusConcept>,
}

impl NarrowerResult {
    pub fn from_concepts(broader_uri: impl Into<String>, concepts: Vec<ThesaurusConcept>) -> Option<Self> {
        if concepts.is_empty() {
            None
        } else {
            Some(Self {
                broader_uri: broader_uri.into(),
                concepts,
            })
        }
    }
}

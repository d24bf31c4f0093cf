//! Classification rules for thesaurus search results.
//!
//! The rules decide, per query term, whether the concepts returned by a
//! keyword search are recommended directly (non-descriptor, specifier),
//! expanded into narrower concepts (hyponym) or ignored.

use std::fmt;
use std::str::FromStr;

use ontorec_core::error::OntorecError;
use ontorec_core::recommendation::{Category, ResultType};
use ontorec_core::thesaurus::{ConceptSearchResult, ThesaurusConcept};
use serde::{Deserialize, Serialize};

/// What to do with one term's search result.
#[derive(Debug, Clone, PartialEq)]
pub enum Classification<'a> {
    /// Recommend these concepts under `category`
    Direct {
        category: Category,
        concepts: Vec<&'a ThesaurusConcept>,
    },
    /// Look up concepts narrower than this one and recommend them as hyponyms
    Expand(&'a ThesaurusConcept),
    /// Nothing usable
    Other,
}

impl Classification<'_> {
    pub fn result_type(&self) -> ResultType {
        match self {
            Classification::Direct { category, .. } => (*category).into(),
            Classification::Expand(_) => ResultType::Hyponym,
            Classification::Other => ResultType::Other,
        }
    }
}

/// Selectable rule set.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum ClassificationRules {
    /// A lone concept matched only by its hidden label is left unclassified.
    #[default]
    Strict,
    /// A lone concept matched only by its hidden label is a specifier.
    Lenient,
}

impl ClassificationRules {
    /// Classifies `result` for `term`.
    ///
    /// `expansion_allowed` tells whether a hyponym lookup may follow (large
    /// enough result set and budget for the extra call).
    pub fn classify<'a>(
        &self,
        term: &str,
        result: &'a ConceptSearchResult,
        expansion_allowed: bool,
    ) -> Classification<'a> {
        match result.concepts.as_slice() {
            [] => Classification::Other,
            [concept] => self.classify_single(term, concept, expansion_allowed),
            concepts => {
                let matching: Vec<&ThesaurusConcept> = concepts
                    .iter()
                    .filter(|c| c.variant_label_matches(term))
                    .collect();
                if matching.is_empty() {
                    Classification::Other
                } else {
                    Classification::Direct {
                        category: Category::Specifier,
                        concepts: matching,
                    }
                }
            }
        }
    }

    fn classify_single<'a>(
        &self,
        term: &str,
        concept: &'a ThesaurusConcept,
        expansion_allowed: bool,
    ) -> Classification<'a> {
        if concept.alt_label_matches(term) {
            return Classification::Direct {
                category: Category::NonDescriptor,
                concepts: vec![concept],
            };
        }

        if concept.hidden_label_matches(term) {
            return match self {
                ClassificationRules::Strict => Classification::Other,
                ClassificationRules::Lenient => Classification::Direct {
                    category: Category::Specifier,
                    concepts: vec![concept],
                },
            };
        }

        if expansion_allowed {
            Classification::Expand(concept)
        } else {
            Classification::Other
        }
    }
}

impl FromStr for ClassificationRules {
    type Err = OntorecError;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value.trim().to_ascii_lowercase().as_str() {
            "" | "strict" => Ok(ClassificationRules::Strict),
            "lenient" => Ok(ClassificationRules::Lenient),
            other => Err(OntorecError::config(format!(
                "Unknown classification rules '{}'",
                other
            ))),
        }
    }
}

impl fmt::Display for ClassificationRules {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ClassificationRules::Strict => f.write_str("strict"),
            ClassificationRules::Lenient => f.write_str("lenient"),
        }
    }
}

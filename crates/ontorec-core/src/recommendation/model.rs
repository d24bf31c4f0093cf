//! Recommendation domain models.

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::thesaurus::ThesaurusConcept;

/// Why a concept is recommended for a term.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Category {
    /// The typed term is a synonym of the concept's preferred label
    NonDescriptor,
    /// The typed term is ambiguous between several concepts
    Specifier,
    /// The concept is narrower than the one the term matched
    Hyponym,
}

impl Category {
    /// Fixed presentation order.
    pub const ALL: [Category; 3] = [Category::NonDescriptor, Category::Specifier, Category::Hyponym];

    pub fn as_str(&self) -> &'static str {
        match self {
            Category::NonDescriptor => "nondescriptor",
            Category::Specifier => "specifier",
            Category::Hyponym => "hyponym",
        }
    }

    pub fn parse(value: &str) -> Option<Self> {
        match value {
            "nondescriptor" => Some(Category::NonDescriptor),
            "specifier" => Some(Category::Specifier),
            "hyponym" => Some(Category::Hyponym),
            _ => None,
        }
    }
}

impl fmt::Display for Category {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Outcome of classifying one term's search result.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ResultType {
    NonDescriptor,
    Specifier,
    Hyponym,
    /// Not a usable recommendation category
    Other,
}

impl ResultType {
    pub fn category(&self) -> Option<Category> {
        match self {
            ResultType::NonDescriptor => Some(Category::NonDescriptor),
            ResultType::Specifier => Some(Category::Specifier),
            ResultType::Hyponym => Some(Category::Hyponym),
            ResultType::Other => None,
        }
    }
}

impl From<Category> for ResultType {
    fn from(category: Category) -> Self {
        match category {
            Category::NonDescriptor => ResultType::NonDescriptor,
            Category::Specifier => ResultType::Specifier,
            Category::Hyponym => ResultType::Hyponym,
        }
    }
}

/// A single recommended follow-up search.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct RecommendationRecord {
    pub category: Category,

    /// The query term the recommendation replaces
    pub source_term: String,

    pub concept: ThesaurusConcept,

    /// The original query with the source term rewritten to the concept
    pub follow_up_query: String,

    /// Link to the follow-up search, including the memory key
    pub href: String,

    /// Key under which `memory_token` is stored client-side
    pub memory_key: String,

    /// Opaque token describing the recommendation
    pub memory_token: String,
}

/// Records for one source term, in insertion order.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct TermBucket {
    pub term: String,
    pub records: Vec<RecommendationRecord>,
}

/// Records grouped by category, then by source term.
///
/// Term buckets keep the order in which terms were processed.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Default)]
pub struct GroupedRecommendations {
    pub nondescriptor: Vec<TermBucket>,
    pub specifier: Vec<TermBucket>,
    pub hyponym: Vec<TermBucket>,
}

impl GroupedRecommendations {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get(&self, category: Category) -> &[TermBucket] {
        match category {
            Category::NonDescriptor => &self.nondescriptor,
            Category::Specifier => &self.specifier,
            Category::Hyponym => &self.hyponym,
        }
    }

    fn get_mut(&mut self, category: Category) -> &mut Vec<TermBucket> {
        match category {
            Category::NonDescriptor => &mut self.nondescriptor,
            Category::Specifier => &mut self.specifier,
            Category::Hyponym => &mut self.hyponym,
        }
    }

    /// Records under `category` for `term`, if that bucket exists.
    pub fn bucket(&self, category: Category, term: &str) -> Option<&TermBucket> {
        self.get(category).iter().find(|bucket| bucket.term == term)
    }

    /// Appends a record to its bucket.
    ///
    /// # Returns
    /// `true` when this opened a new bucket.
    pub fn push(&mut self, record: RecommendationRecord) -> bool {
        let buckets = self.get_mut(record.category);
        if let Some(bucket) = buckets.iter_mut().find(|b| b.term == record.source_term) {
            bucket.records.push(record);
            return false;
        }

        buckets.push(TermBucket {
            term: record.source_term.clone(),
            records: vec![record],
        });
        true
    }

    pub fn bucket_count(&self) -> usize {
        Category::ALL.iter().map(|c| self.get(*c).len()).sum()
    }

    pub fn record_count(&self) -> usize {
        self.records().count()
    }

    pub fn is_empty(&self) -> bool {
        self.bucket_count() == 0
    }

    /// All records in category order, then term order.
    pub fn records(&self) -> impl Iterator<Item = &RecommendationRecord> {
        Category::ALL
            .into_iter()
            .flat_map(move |category| self.get(category).iter())
            .flat_map(|bucket| bucket.records.iter())
    }
}

/// Counters of a single run, kept for diagnostics.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Default)]
pub struct RunStats {
    /// Thesaurus calls issued
    pub api_calls: u32,
    /// Distinct term buckets opened
    pub recommendation_count: u32,
    /// Ontology results turned into records; numbers the memory keys
    pub ontology_result_total: u32,
}

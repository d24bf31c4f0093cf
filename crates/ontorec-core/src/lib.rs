//! Domain layer for ontology-based query recommendations.
//!
//! Holds the data model, budget parsing, query handling, the memory token
//! codec and the collaborator traits the recommender is wired with.

pub mod budget;
pub mod error;
pub mod memory;
pub mod query;
pub mod recommendation;
pub mod session;
pub mod thesaurus;

// Re-export common error type
pub use budget::{Budget, Limit};
pub use error::OntorecError;
pub use recommendation::{Category, GroupedRecommendations, RecommendationRecord, ResultType, RunStats};
pub use session::{InMemorySessionStore, SessionStore};
pub use thesaurus::{ConceptSearchResult, NarrowerResult, ThesaurusConcept, ThesaurusService};

//! Controlled vocabulary (thesaurus) lookups.
//!
//! The domain only knows the [`ThesaurusService`] contract; the HTTP client
//! lives in the infrastructure crate.

pub mod model;
pub mod service;

pub use model::{ConceptSearchResult, NarrowerResult, ThesaurusConcept};
pub use service::{DEFAULT_VOCABULARY, SUPPORTED_LANGUAGES, ThesaurusService, normalize_language};

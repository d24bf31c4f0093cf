//! Thesaurus service trait definition.

use async_trait::async_trait;

use crate::error::Result;
use crate::thesaurus::{ConceptSearchResult, NarrowerResult};

/// Vocabulary searched when the caller names none.
pub const DEFAULT_VOCABULARY: &str = "yso";

/// Interface languages the vocabulary has labels for.
pub const SUPPORTED_LANGUAGES: [&str; 3] = ["fi", "sv", "en"];

/// Maps regional English locales (`en-gb`, `en-US`) to `en`.
pub fn normalize_language(language: &str) -> String {
    let language = language.trim();
    let lower = language.to_ascii_lowercase();
    if lower.starts_with("en-") {
        "en".to_string()
    } else {
        language.to_string()
    }
}

/// Keyword and hierarchy lookups against an external vocabulary.
#[async_trait]
pub trait ThesaurusService: Send + Sync {
    /// Searches concepts by keyword.
    ///
    /// # Arguments
    /// * `term` - The term to look up (trimmed by the implementation)
    /// * `language` - Label language, e.g. "fi" or "en"
    /// * `extra_params` - Additional API parameters that override the defaults
    ///
    /// # Returns
    /// `Ok(None)` when nothing matched. An error payload from the API counts
    /// as "nothing matched"; only transport failures are errors.
    async fn search(
        &self,
        term: &str,
        language: Option<&str>,
        extra_params: &[(String, String)],
    ) -> Result<Option<ConceptSearchResult>>;

    /// Looks up concepts directly narrower than `uri`.
    async fn narrower(
        &self,
        vocabulary: &str,
        uri: &str,
        language: &str,
        include_details: bool,
    ) -> Result<Option<NarrowerResult>>;

    /// Pure predicate checked before any API work.
    fn is_supported_language(&self, language: &str) -> bool {
        SUPPORTED_LANGUAGES.contains(&language)
    }
}

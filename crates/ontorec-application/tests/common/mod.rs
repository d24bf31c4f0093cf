//! Shared test doubles for recommender tests.

#![allow(dead_code)]

use std::collections::HashMap;
use std::sync::Mutex;

use async_trait::async_trait;
use ontorec_core::error::{OntorecError, Result};
use ontorec_core::thesaurus::{
    ConceptSearchResult, NarrowerResult, SUPPORTED_LANGUAGES, ThesaurusConcept, ThesaurusService,
};

/// Scripted thesaurus that records every call it receives.
#[derive(Default)]
pub struct MockThesaurus {
    search_results: HashMap<String, Vec<ThesaurusConcept>>,
    narrower_results: HashMap<String, Vec<ThesaurusConcept>>,
    failing_terms: Vec<String>,
    pub search_calls: Mutex<Vec<(String, Option<String>)>>,
    pub narrower_calls: Mutex<Vec<(String, String, String)>>,
}

impl MockThesaurus {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_search(mut self, term: &str, concepts: Vec<ThesaurusConcept>) -> Self {
        self.search_results.insert(term.to_string(), concepts);
        self
    }

    pub fn with_narrower(mut self, uri: &str, concepts: Vec<ThesaurusConcept>) -> Self {
        self.narrower_results.insert(uri.to_string(), concepts);
        self
    }

    pub fn failing_on(mut self, term: &str) -> Self {
        self.failing_terms.push(term.to_string());
        self
    }

    pub fn searched_terms(&self) -> Vec<String> {
        self.search_calls
            .lock()
            .unwrap()
            .iter()
            .map(|(term, _)| term.clone())
            .collect()
    }

    pub fn search_count(&self) -> usize {
        self.search_calls.lock().unwrap().len()
    }

    pub fn narrower_count(&self) -> usize {
        self.narrower_calls.lock().unwrap().len()
    }

    pub fn total_calls(&self) -> usize {
        self.search_count() + self.narrower_count()
    }
}

#[async_trait]
impl ThesaurusService for MockThesaurus {
    async fn search(
        &self,
        term: &str,
        language: Option<&str>,
        _extra_params: &[(String, String)],
    ) -> Result<Option<ConceptSearchResult>> {
        self.search_calls
            .lock()
            .unwrap()
            .push((term.to_string(), language.map(str::to_string)));

        if self.failing_terms.iter().any(|t| t == term) {
            return Err(OntorecError::transport(format!("connection reset for '{}'", term)));
        }

        Ok(self
            .search_results
            .get(term)
            .cloned()
            .and_then(|concepts| ConceptSearchResult::from_concepts(term, concepts)))
    }

    async fn narrower(
        &self,
        vocabulary: &str,
        uri: &str,
        language: &str,
        _include_details: bool,
    ) -> Result<Option<NarrowerResult>> {
        self.narrower_calls.lock().unwrap().push((
            vocabulary.to_string(),
            uri.to_string(),
            language.to_string(),
        ));

        Ok(self
            .narrower_results
            .get(uri)
            .cloned()
            .and_then(|concepts| NarrowerResult::from_concepts(uri, concepts)))
    }

    fn is_supported_language(&self, language: &str) -> bool {
        SUPPORTED_LANGUAGES.contains(&language)
    }
}

/// A concept returned for a term with no matching variant label.
pub fn plain(label: &str, uri: &str) -> ThesaurusConcept {
    ThesaurusConcept::new(label, uri).with_vocabulary("yso", "en")
}

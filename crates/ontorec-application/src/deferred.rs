//! Deferred recommendation requests.
//!
//! When the search page does not compute recommendations inline, it embeds
//! the parameters built by [`DeferredRequestBuilder`] in a follow-up request.
//! [`DeferredRecommendationHandler`] later turns those parameters back into an
//! initialized [`OntologyRecommender`] and runs it.

use std::sync::Arc;

use ontorec_core::budget::Budget;
use ontorec_core::error::{OntorecError, Result};
use ontorec_core::recommendation::{GroupedRecommendations, RunStats};
use ontorec_core::session::SessionStore;
use ontorec_core::thesaurus::ThesaurusService;
use serde::{Deserialize, Serialize};
use url::form_urlencoded;

use crate::classification::ClassificationRules;
use crate::recommender::{OntologyRecommender, RecommendationRequest, RecommenderConfig};

/// Target module name of deferred recommendation requests.
pub const DEFERRED_MODULE: &str = "Ontology";

pub struct DeferredRequestBuilder;

impl DeferredRequestBuilder {
    /// Packs the inputs needed to rebuild an initialized recommender.
    ///
    /// `resultTotal` is left out when unknown.
    pub fn build_deferred_params(
        raw_settings: &str,
        lookfor: &str,
        language: &str,
        result_total: Option<u64>,
    ) -> String {
        let mut serializer = form_urlencoded::Serializer::new(String::new());
        serializer
            .append_pair("mod", DEFERRED_MODULE)
            .append_pair("params", raw_settings)
            .append_pair("lookfor", lookfor)
            .append_pair("language", language);
        if let Some(total) = result_total {
            serializer.append_pair("resultTotal", &total.to_string());
        }
        serializer.finish()
    }
}

/// Parsed deferred request.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DeferredRequest {
    pub raw_settings: String,
    pub lookfor: String,
    pub language: String,
    pub result_total: Option<u64>,
    pub search_id: Option<String>,
    /// All decoded parameters, in order
    pub params: Vec<(String, String)>,
}

impl DeferredRequest {
    /// Parses a query string produced by [`DeferredRequestBuilder`].
    ///
    /// A leading `?` is ignored. Extra parameters (e.g. `searchId` added by
    /// the page) are kept for follow-up links.
    pub fn parse(query_string: &str) -> Result<Self> {
        let query_string = query_string.trim().trim_start_matches('?');
        let params: Vec<(String, String)> = form_urlencoded::parse(query_string.as_bytes())
            .into_owned()
            .collect();

        let get = |name: &str| {
            params
                .iter()
                .find(|(key, _)| key == name)
                .map(|(_, value)| value.clone())
        };

        match get("mod").as_deref() {
            Some(DEFERRED_MODULE) => {}
            Some(other) => {
                return Err(OntorecError::invalid_request(format!(
                    "Deferred request targets module '{}', expected '{}'",
                    other, DEFERRED_MODULE
                )));
            }
            None => {
                return Err(OntorecError::invalid_request(
                    "Deferred request is missing the 'mod' parameter",
                ));
            }
        }

        let result_total = match get("resultTotal").filter(|v| !v.trim().is_empty()) {
            Some(value) => Some(value.trim().parse::<u64>().map_err(|e| {
                OntorecError::invalid_request(format!("Invalid resultTotal '{}': {}", value, e))
            })?),
            None => None,
        };

        Ok(Self {
            raw_settings: get("params").unwrap_or_default(),
            lookfor: get("lookfor").unwrap_or_default(),
            language: get("language").unwrap_or_default(),
            result_total,
            search_id: get("searchId").filter(|v| !v.is_empty()),
            params,
        })
    }

    pub fn budget(&self) -> Result<Budget> {
        Budget::parse(&self.raw_settings)
    }

    /// The recommender input equivalent to this request.
    pub fn to_recommendation_request(&self) -> RecommendationRequest {
        RecommendationRequest {
            lookfor: self.lookfor.clone(),
            language: self.language.clone(),
            search_id: self.search_id.clone(),
            result_total: self.result_total,
            params: self.params.clone(),
        }
    }
}

/// Response of a deferred recommendation request.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct DeferredResponse {
    pub recommendations: GroupedRecommendations,
    pub stats: RunStats,
}

/// Runs deferred requests against shared collaborators.
pub struct DeferredRecommendationHandler {
    thesaurus: Arc<dyn ThesaurusService>,
    session: Arc<dyn SessionStore>,
    rules: ClassificationRules,
    search_path: String,
}

impl DeferredRecommendationHandler {
    pub fn new(
        thesaurus: Arc<dyn ThesaurusService>,
        session: Arc<dyn SessionStore>,
        rules: ClassificationRules,
        search_path: impl Into<String>,
    ) -> Self {
        Self {
            thesaurus,
            session,
            rules,
            search_path: search_path.into(),
        }
    }

    /// Parses `query_string`, rebuilds the recommender from it and runs it.
    pub async fn handle(&self, query_string: &str) -> Result<DeferredResponse> {
        let request = DeferredRequest::parse(query_string)?;
        let config = RecommenderConfig {
            budget: request.budget()?,
            rules: self.rules,
            search_path: self.search_path.clone(),
        };

        let mut recommender =
            OntologyRecommender::new(self.thesaurus.clone(), self.session.clone(), config);
        recommender.init(request.to_recommendation_request())?;
        let recommendations = recommender.process(None).await?.clone();
        let stats = recommender.stats().unwrap_or_default();

        Ok(DeferredResponse {
            recommendations,
            stats,
        })
    }
}

//! Ontology recommendation engine.
//!
//! Lifecycle: `Unconfigured` → [`OntologyRecommender::init`] → `Initialized`
//! → [`OntologyRecommender::process`] → `Processed`. Once processed the
//! records are cached and further `process` calls return them unchanged.
//!
//! Thesaurus calls are made one at a time. Budgets are checked before each
//! call using a look-ahead of the calls the next step would need, so the
//! API-call limit is never exceeded.

use std::sync::Arc;

use ontorec_core::budget::Budget;
use ontorec_core::error::{OntorecError, Result};
use ontorec_core::memory;
use ontorec_core::query::{is_uri_filter, rewrite_query, tokenize_query};
use ontorec_core::recommendation::{Category, GroupedRecommendations, RecommendationRecord, RunStats};
use ontorec_core::session::{self, SessionStore};
use ontorec_core::thesaurus::{
    DEFAULT_VOCABULARY, ThesaurusConcept, ThesaurusService, normalize_language,
};
use ontorec_infrastructure::settings::OntologySettings;
use serde::{Deserialize, Serialize};

use crate::classification::{Classification, ClassificationRules};
use crate::link::FollowUpLinkBuilder;

/// Source module name written into memory tokens.
pub const SOURCE_MODULE: &str = "Ontology";

/// Inputs of one recommendation run.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Default)]
pub struct RecommendationRequest {
    /// The user's free-text query
    pub lookfor: String,
    /// Interface language, e.g. "fi" or "en-gb"
    pub language: String,
    /// Id of the saved search, prefixes memory keys when known
    #[serde(skip_serializing_if = "Option::is_none")]
    pub search_id: Option<String>,
    /// Result total known at request time (deferred requests carry it)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub result_total: Option<u64>,
    /// Original request parameters, reused for follow-up links
    #[serde(default)]
    pub params: Vec<(String, String)>,
}

impl RecommendationRequest {
    pub fn new(lookfor: impl Into<String>, language: impl Into<String>) -> Self {
        Self {
            lookfor: lookfor.into(),
            language: language.into(),
            ..Self::default()
        }
    }

    pub fn with_search_id(mut self, search_id: impl Into<String>) -> Self {
        self.search_id = Some(search_id.into());
        self
    }

    pub fn with_result_total(mut self, total: u64) -> Self {
        self.result_total = Some(total);
        self
    }

    pub fn with_params(mut self, params: Vec<(String, String)>) -> Self {
        self.params = params;
        self
    }
}

/// Static configuration of a recommender.
#[derive(Debug, Clone, PartialEq)]
pub struct RecommenderConfig {
    pub budget: Budget,
    pub rules: ClassificationRules,
    pub search_path: String,
}

impl RecommenderConfig {
    pub fn new(budget: Budget) -> Self {
        Self {
            budget,
            rules: ClassificationRules::default(),
            search_path: ontorec_infrastructure::settings::DEFAULT_SEARCH_PATH.to_string(),
        }
    }

    /// Parses the `[ontology]` settings section.
    pub fn from_settings(settings: &OntologySettings) -> Result<Self> {
        Ok(Self {
            budget: settings.budget()?,
            rules: settings.rules.parse()?,
            search_path: settings.search_path.clone(),
        })
    }
}

#[derive(Debug, Clone)]
struct ProcessedRun {
    recommendations: GroupedRecommendations,
    stats: RunStats,
}

#[derive(Debug, Clone)]
enum RecommenderState {
    Unconfigured,
    Initialized(RecommendationRequest),
    Processed(ProcessedRun),
}

/// Builds ontology-based search recommendations for a query.
pub struct OntologyRecommender {
    thesaurus: Arc<dyn ThesaurusService>,
    session: Arc<dyn SessionStore>,
    budget: Budget,
    rules: ClassificationRules,
    links: FollowUpLinkBuilder,
    state: RecommenderState,
}

impl OntologyRecommender {
    /// Creates a recommender with explicit collaborators.
    pub fn new(
        thesaurus: Arc<dyn ThesaurusService>,
        session: Arc<dyn SessionStore>,
        config: RecommenderConfig,
    ) -> Self {
        Self {
            thesaurus,
            session,
            budget: config.budget,
            rules: config.rules,
            links: FollowUpLinkBuilder::new(config.search_path),
            state: RecommenderState::Unconfigured,
        }
    }

    pub fn budget(&self) -> &Budget {
        &self.budget
    }

    /// Stores the request for the coming run.
    ///
    /// May be called again before processing; fails once processed.
    pub fn init(&mut self, mut request: RecommendationRequest) -> Result<()> {
        if matches!(self.state, RecommenderState::Processed(_)) {
            return Err(OntorecError::invalid_state(
                "Recommender has already processed a request",
            ));
        }
        request.lookfor = request.lookfor.trim().to_string();
        self.state = RecommenderState::Initialized(request);
        Ok(())
    }

    /// Runs the recommendation pipeline, or returns the cached result.
    ///
    /// `result_total` is the size of the main search result; a total carried
    /// by the request itself takes precedence.
    pub async fn process(&mut self, result_total: Option<u64>) -> Result<&GroupedRecommendations> {
        let pending = match &self.state {
            RecommenderState::Unconfigured => {
                return Err(OntorecError::invalid_state(
                    "process() called before init()",
                ));
            }
            RecommenderState::Initialized(request) => Some(request.clone()),
            RecommenderState::Processed(_) => None,
        };

        if let Some(request) = pending {
            let total = request.result_total.or(result_total);
            let (recommendations, stats) = self.execute(&request, total).await;
            self.state = RecommenderState::Processed(ProcessedRun {
                recommendations,
                stats,
            });
        }

        match &self.state {
            RecommenderState::Processed(run) => Ok(&run.recommendations),
            _ => Err(OntorecError::internal("Recommender did not reach processed state")),
        }
    }

    /// Cached records, once processed.
    pub fn recommendations(&self) -> Option<&GroupedRecommendations> {
        match &self.state {
            RecommenderState::Processed(run) => Some(&run.recommendations),
            _ => None,
        }
    }

    /// Counters of the finished run.
    pub fn stats(&self) -> Option<RunStats> {
        match &self.state {
            RecommenderState::Processed(run) => Some(run.stats),
            _ => None,
        }
    }

    pub fn is_processed(&self) -> bool {
        matches!(self.state, RecommenderState::Processed(_))
    }

    async fn execute(
        &self,
        request: &RecommendationRequest,
        result_total: Option<u64>,
    ) -> (GroupedRecommendations, RunStats) {
        let mut run = Run::new(request, &self.links);

        if request.lookfor.is_empty() {
            return run.finish();
        }

        let language = normalize_language(&request.language);
        if !self.thesaurus.is_supported_language(&language) {
            tracing::debug!("Language '{}' not supported, skipping ontology lookups", language);
            return run.finish();
        }

        let shown = match session::shown_count(self.session.as_ref()).await {
            Ok(shown) => shown,
            Err(e) => {
                tracing::warn!("Failed to read show counter: {}", e);
                0
            }
        };
        if self.budget.display_cap_reached(shown) {
            tracing::debug!("Ontology recommendations already shown {} times this session", shown);
            return run.finish();
        }

        for term in tokenize_query(&request.lookfor) {
            if !(self.budget.can_call(run.stats.api_calls, 1)
                && self.budget.can_add_recommendation(run.stats.recommendation_count))
            {
                break;
            }
            if is_uri_filter(&term) {
                continue;
            }

            // Decided up front: the expansion needs a second call.
            let expansion_allowed = self.budget.is_large_result(result_total)
                && self.budget.can_call(run.stats.api_calls, 2);

            run.stats.api_calls += 1;
            let result = match self.thesaurus.search(&term, Some(&language), &[]).await {
                Ok(Some(result)) => result,
                Ok(None) => continue,
                Err(e) => {
                    tracing::warn!("Thesaurus search for '{}' failed: {}", term, e);
                    continue;
                }
            };

            match self.rules.classify(&term, &result, expansion_allowed) {
                Classification::Other => {}
                Classification::Direct { category, concepts } => {
                    for concept in concepts {
                        run.add(&term, concept, category, None);
                    }
                }
                Classification::Expand(concept) => {
                    self.expand(&mut run, &term, concept, &language).await;
                }
            }
        }

        if run.stats.recommendation_count > 0 {
            if let Err(e) = session::record_shown(self.session.as_ref(), shown).await {
                tracing::warn!("Failed to update show counter: {}", e);
            }
        }

        let (recommendations, stats) = run.finish();
        tracing::info!(
            api_calls = stats.api_calls,
            recommendation_count = stats.recommendation_count,
            records = recommendations.record_count(),
            "Ontology recommendations processed"
        );
        (recommendations, stats)
    }

    /// Adds the narrower concepts of `concept` as hyponym records.
    async fn expand(&self, run: &mut Run<'_>, term: &str, concept: &ThesaurusConcept, language: &str) {
        let vocabulary = if concept.vocabulary.is_empty() {
            DEFAULT_VOCABULARY
        } else {
            concept.vocabulary.as_str()
        };

        run.stats.api_calls += 1;
        match self
            .thesaurus
            .narrower(vocabulary, &concept.uri, language, true)
            .await
        {
            Ok(Some(narrower)) => {
                for hyponym in &narrower.concepts {
                    run.add(term, hyponym, Category::Hyponym, Some(&concept.uri));
                }
            }
            Ok(None) => {}
            Err(e) => {
                tracing::warn!("Narrower lookup for '{}' failed: {}", concept.uri, e);
            }
        }
    }
}

/// Mutable state of a single run.
struct Run<'a> {
    request: &'a RecommendationRequest,
    links: &'a FollowUpLinkBuilder,
    recommendations: GroupedRecommendations,
    stats: RunStats,
}

impl<'a> Run<'a> {
    fn new(request: &'a RecommendationRequest, links: &'a FollowUpLinkBuilder) -> Self {
        Self {
            request,
            links,
            recommendations: GroupedRecommendations::new(),
            stats: RunStats::default(),
        }
    }

    /// Turns an ontology result into a record; a new term bucket counts
    /// towards the recommendation limit.
    fn add(&mut self, term: &str, concept: &ThesaurusConcept, category: Category, broader_uri: Option<&str>) {
        self.stats.ontology_result_total += 1;

        let memory_key = match &self.request.search_id {
            Some(search_id) => format!("{}-{}", search_id, self.stats.ontology_result_total),
            None => self.stats.ontology_result_total.to_string(),
        };
        let memory_token = memory::encode(SOURCE_MODULE, &concept.pref_label, Some(term), Some(category));
        let follow_up_query = rewrite_query(&self.request.lookfor, term, concept, broader_uri);
        let href = self.links.build(&self.request.params, &follow_up_query, &memory_key);

        let record = RecommendationRecord {
            category,
            source_term: term.to_string(),
            concept: concept.clone(),
            follow_up_query,
            href,
            memory_key,
            memory_token,
        };

        if self.recommendations.push(record) {
            self.stats.recommendation_count += 1;
        }
    }

    fn finish(self) -> (GroupedRecommendations, RunStats) {
        (self.recommendations, self.stats)
    }
}

//! FintoClient - REST client for the Finto thesaurus API.
//!
//! Finto serves the YSO general ontology and related vocabularies. Only two
//! endpoints are used:
//! - `GET {base_url}/search?query=&vocab=&lang=` for keyword lookups
//! - `GET {base_url}/{vocab}/{uri}/narrower?lang=` for narrower concepts
//!
//! Error payloads that are valid JSON are handed back like any other
//! response; only network failures and non-JSON bodies are errors.

use std::time::{Duration, Instant};

use async_trait::async_trait;
use ontorec_core::error::{OntorecError, Result};
use ontorec_core::thesaurus::{
    ConceptSearchResult, NarrowerResult, ThesaurusConcept, ThesaurusService,
};
use reqwest::header::{ACCEPT, HeaderMap, HeaderValue};
use reqwest::{Client, StatusCode, Url};
use serde_json::Value;

use crate::settings::FintoSettings;

const USER_AGENT: &str = "ontorec";

/// Thesaurus client backed by a pooled keep-alive HTTP client.
#[derive(Clone)]
pub struct FintoClient {
    client: Client,
    base_url: Url,
    vocabulary: String,
}

impl FintoClient {
    /// Creates a client from settings.
    ///
    /// Fails with a Config error when the base URL cannot be parsed.
    pub fn new(settings: &FintoSettings) -> Result<Self> {
        let base_url = Url::parse(settings.base_url.trim_end_matches('/')).map_err(|e| {
            OntorecError::config(format!("Invalid Finto base_url '{}': {}", settings.base_url, e))
        })?;
        if base_url.cannot_be_a_base() {
            return Err(OntorecError::config(format!(
                "Finto base_url '{}' cannot carry a path",
                settings.base_url
            )));
        }

        let mut headers = HeaderMap::new();
        headers.insert(ACCEPT, HeaderValue::from_static("application/json"));

        let client = Client::builder()
            .timeout(Duration::from_secs(settings.http_timeout))
            .user_agent(USER_AGENT)
            .default_headers(headers)
            .build()
            .map_err(|e| OntorecError::config(format!("Failed to build HTTP client: {}", e)))?;

        Ok(Self {
            client,
            base_url,
            vocabulary: settings.vocabulary.clone(),
        })
    }

    /// Vocabulary used for keyword searches.
    pub fn vocabulary(&self) -> &str {
        &self.vocabulary
    }

    /// Builds `{base_url}/{segment}/{segment}...`, percent-encoding each segment.
    fn endpoint(&self, hierarchy: &[&str]) -> Url {
        let mut url = self.base_url.clone();
        if let Ok(mut segments) = url.path_segments_mut() {
            segments.pop_if_empty();
            for segment in hierarchy {
                segments.push(segment);
            }
        }
        url
    }

    /// Sends a GET request and decodes the JSON body.
    ///
    /// A non-2xx status is only an error when the body is not JSON.
    async fn make_request(&self, hierarchy: &[&str], params: &[(String, String)]) -> Result<Value> {
        let url = self.endpoint(hierarchy);
        let started = Instant::now();

        let response = self
            .client
            .get(url.clone())
            .query(params)
            .send()
            .await
            .map_err(|err| {
                tracing::error!(url = %url, ?params, "Finto request failed: {}", err);
                OntorecError::transport(format!("Finto request failed: {err}"))
            })?;

        let status = response.status();
        let body = response.text().await.map_err(|err| {
            OntorecError::transport_status(
                status.as_u16(),
                format!("Failed to read Finto response body: {err}"),
            )
        })?;

        tracing::debug!(
            url = %url,
            status = status.as_u16(),
            elapsed_ms = started.elapsed().as_millis() as u64,
            "GET request, response: {}",
            body
        );

        decode_body(status, &body).inspect_err(|err| {
            if !status.is_success() {
                tracing::error!(
                    url = %url,
                    ?params,
                    status = status.as_u16(),
                    "GET request failed: {}, response content: {}",
                    status.canonical_reason().unwrap_or("Unknown"),
                    body
                );
            } else {
                tracing::warn!(url = %url, "{}", err);
            }
        })
    }
}

/// Decides whether a response body is a usable payload.
///
/// JSON is returned whatever the status: the API reports errors as JSON, and
/// those payloads simply carry no results. A non-2xx response whose body is
/// not JSON, or is JSON `null`, is a transport error. So is a 2xx response
/// that is not JSON.
pub(crate) fn decode_body(status: StatusCode, body: &str) -> Result<Value> {
    match serde_json::from_str::<Value>(body) {
        Ok(Value::Null) if !status.is_success() => Err(OntorecError::transport_status(
            status.as_u16(),
            "Problem with Finto REST API",
        )),
        Ok(decoded) => Ok(decoded),
        Err(_) if !status.is_success() => Err(OntorecError::transport_status(
            status.as_u16(),
            "Problem with Finto REST API",
        )),
        // A success status with an undecodable body is reported, not read as "no results".
        Err(err) => Err(OntorecError::transport_status(
            status.as_u16(),
            format!("Failed to parse Finto response: {err}"),
        )),
    }
}

#[async_trait]
impl ThesaurusService for FintoClient {
    async fn search(
        &self,
        term: &str,
        language: Option<&str>,
        extra_params: &[(String, String)],
    ) -> Result<Option<ConceptSearchResult>> {
        let term = term.trim();
        let mut params = vec![
            ("query".to_string(), term.to_string()),
            ("vocab".to_string(), self.vocabulary.clone()),
        ];
        if let Some(language) = language.filter(|l| !l.is_empty()) {
            params.push(("lang".to_string(), language.to_string()));
        }
        merge_params(&mut params, extra_params);

        let payload = self.make_request(&["search"], &params).await?;
        Ok(parse_search_payload(term, &payload))
    }

    async fn narrower(
        &self,
        vocabulary: &str,
        uri: &str,
        language: &str,
        include_details: bool,
    ) -> Result<Option<NarrowerResult>> {
        let params = vec![("lang".to_string(), language.to_string())];
        let payload = self
            .make_request(&[vocabulary, uri, "narrower"], &params)
            .await?;

        let details = include_details.then_some((vocabulary, language));
        Ok(parse_narrower_payload(uri, &payload, details))
    }
}

/// Overrides existing keys in place, appends new ones.
fn merge_params(params: &mut Vec<(String, String)>, extra: &[(String, String)]) {
    for (key, value) in extra {
        match params.iter_mut().find(|(k, _)| k == key) {
            Some(existing) => existing.1 = value.clone(),
            None => params.push((key.clone(), value.clone())),
        }
    }
}

fn parse_concepts(entries: Option<&Value>) -> Vec<ThesaurusConcept> {
    let Some(entries) = entries.and_then(|v| v.as_array()) else {
        return Vec::new();
    };

    entries
        .iter()
        .filter_map(|entry| match serde_json::from_value::<ThesaurusConcept>(entry.clone()) {
            Ok(concept) => Some(concept),
            Err(err) => {
                tracing::warn!("Skipping malformed Finto concept: {}", err);
                None
            }
        })
        .collect()
}

/// Extracts `results` from a search payload. Error payloads have none.
pub fn parse_search_payload(query: &str, payload: &Value) -> Option<ConceptSearchResult> {
    ConceptSearchResult::from_concepts(query, parse_concepts(payload.get("results")))
}

/// Extracts `narrower` from a narrower payload.
///
/// With `details`, each concept gets the requested vocabulary and language,
/// which the narrower endpoint does not return itself.
pub fn parse_narrower_payload(
    broader_uri: &str,
    payload: &Value,
    details: Option<(&str, &str)>,
) -> Option<NarrowerResult> {
    let mut concepts = parse_concepts(payload.get("narrower"));
    if let Some((vocabulary, language)) = details {
        for concept in &mut concepts {
            if concept.vocabulary.is_empty() {
                concept.vocabulary = vocabulary.to_string();
            }
            if concept.language.is_empty() {
                concept.language = language.to_string();
            }
        }
    }
    NarrowerResult::from_concepts(broader_uri, concepts)
}

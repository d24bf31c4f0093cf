//! Follow-up search links.

use ontorec_core::memory::PARAMETER_NAME;
use url::form_urlencoded;

/// Request parameters that only make sense for the recommendation request itself.
const DROPPED_PARAMS: [&str; 4] = ["mod", "params", "searchId", "resultTotal"];

/// Builds links to the search results page for rewritten queries.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FollowUpLinkBuilder {
    search_path: String,
}

impl FollowUpLinkBuilder {
    pub fn new(search_path: impl Into<String>) -> Self {
        Self {
            search_path: search_path.into(),
        }
    }

    pub fn search_path(&self) -> &str {
        &self.search_path
    }

    /// Returns `{search_path}?{params}`.
    ///
    /// `lookfor` and `rmKey` replace existing values in place (or are
    /// appended), and the recommendation-request parameters are dropped.
    pub fn build(&self, request_params: &[(String, String)], lookfor: &str, memory_key: &str) -> String {
        let mut params: Vec<(String, String)> = request_params
            .iter()
            .filter(|(key, _)| !DROPPED_PARAMS.contains(&key.as_str()))
            .cloned()
            .collect();
        set_param(&mut params, "lookfor", lookfor);
        set_param(&mut params, PARAMETER_NAME, memory_key);

        let query = form_urlencoded::Serializer::new(String::new())
            .extend_pairs(params.iter())
            .finish();
        format!("{}?{}", self.search_path, query)
    }
}

fn set_param(params: &mut Vec<(String, String)>, key: &str, value: &str) {
    let mut seen = false;
    params.retain_mut(|(k, v)| {
        if k != key {
            return true;
        }
        if seen {
            return false;
        }
        seen = true;
        *v = value.to_string();
        true
    });
    if !seen {
        params.push((key.to_string(), value.to_string()));
    }
}

//! Recommendation memory: a small token describing a followed recommendation.
//!
//! The token is base64 (URL-safe, unpadded) over a JSON object with the keys
//! `srcMod`, `recTerm`, `origTerm` and `recType`. It is a convenience carrier
//! for analytics, not a trust boundary, and is not signed.

use std::sync::Arc;

use base64::Engine;
use base64::engine::general_purpose::{STANDARD, URL_SAFE_NO_PAD};
use serde::{Deserialize, Serialize};

use crate::error::Result;
use crate::recommendation::Category;
use crate::session::SessionStore;

/// Query string parameter carrying the memory key.
pub const PARAMETER_NAME: &str = "rmKey";

/// Decoded content of a memory token.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct MemoryRecord {
    pub source_module: String,
    pub recommended_term: String,
    pub replaced_term: Option<String>,
    pub category: Option<Category>,
}

#[derive(Serialize, Deserialize)]
struct TokenPayload {
    #[serde(rename = "srcMod")]
    source_module: String,
    #[serde(rename = "recTerm")]
    recommended_term: String,
    #[serde(rename = "origTerm", default, skip_serializing_if = "Option::is_none")]
    replaced_term: Option<String>,
    #[serde(rename = "recType", default, skip_serializing_if = "Option::is_none")]
    category: Option<String>,
}

/// Encodes the four fields into a URL-safe token.
///
/// An empty replaced term is treated as absent.
pub fn encode(
    source_module: &str,
    recommended_term: &str,
    replaced_term: Option<&str>,
    category: Option<Category>,
) -> String {
    let payload = TokenPayload {
        source_module: source_module.to_string(),
        recommended_term: recommended_term.to_string(),
        replaced_term: replaced_term
            .filter(|term| !term.is_empty())
            .map(str::to_string),
        category: category.map(|c| c.as_str().to_string()),
    };
    // Serializing a struct of strings cannot fail.
    let json = serde_json::to_vec(&payload).unwrap_or_default();
    URL_SAFE_NO_PAD.encode(json)
}

/// Decodes a token. Missing or malformed tokens yield `None`.
///
/// Tokens produced by the browser (`btoa`, standard alphabet with padding)
/// are accepted as well. `decode(encode(..))` returns the encoded fields
/// unchanged, except that an empty replaced term comes back as `None`.
pub fn decode(token: Option<&str>) -> Option<MemoryRecord> {
    let token = token?.trim();
    if token.is_empty() {
        return None;
    }

    let bytes = URL_SAFE_NO_PAD
        .decode(token)
        .or_else(|_| STANDARD.decode(token))
        .ok()?;
    let payload: TokenPayload = serde_json::from_slice(&bytes).ok()?;

    Some(MemoryRecord {
        source_module: payload.source_module,
        recommended_term: payload.recommended_term,
        replaced_term: payload.replaced_term,
        category: payload.category.as_deref().and_then(Category::parse),
    })
}

/// Stores and recalls memory tokens through a [`SessionStore`].
#[derive(Clone)]
pub struct RecommendationMemory {
    store: Arc<dyn SessionStore>,
}

impl RecommendationMemory {
    pub fn new(store: Arc<dyn SessionStore>) -> Self {
        Self { store }
    }

    /// Stores `token` under `key`.
    pub async fn remember(&self, key: &str, token: &str) -> Result<()> {
        self.store.set(key, token.to_string()).await
    }

    /// Returns the memory referenced by the `rmKey` request parameter.
    ///
    /// # Arguments
    /// * `params` - Request parameters of the followed link
    /// * `clear` - Remove the stored token after reading it
    pub async fn recall(&self, params: &[(String, String)], clear: bool) -> Result<Option<MemoryRecord>> {
        let Some((_, key)) = params.iter().find(|(name, _)| name == PARAMETER_NAME) else {
            return Ok(None);
        };

        let Some(token) = self.store.get(key).await? else {
            return Ok(None);
        };

        if clear {
            self.store.clear(key).await?;
        }

        Ok(decode(Some(token.as_str())))
    }
}

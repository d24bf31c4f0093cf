//! Session-scoped key/value storage.
//!
//! In a web deployment this is the browser cookie jar; the engine only needs
//! get/set/clear on string values.

use std::collections::HashMap;

use async_trait::async_trait;
use tokio::sync::RwLock;

use crate::error::Result;

/// Key under which the number of shown recommendation batches is stored.
pub const SHOW_COUNTER_KEY: &str = "ontologyRecommend";

/// Opaque per-session key/value collaborator.
#[async_trait]
pub trait SessionStore: Send + Sync {
    async fn get(&self, key: &str) -> Result<Option<String>>;

    async fn set(&self, key: &str, value: String) -> Result<()>;

    async fn clear(&self, key: &str) -> Result<()>;
}

/// Reads the show counter. Missing or non-numeric values count as zero.
pub async fn shown_count(store: &dyn SessionStore) -> Result<u32> {
    let value = store.get(SHOW_COUNTER_KEY).await?;
    Ok(value
        .and_then(|v| v.trim().parse::<u32>().ok())
        .unwrap_or(0))
}

/// Writes `previous + 1` to the show counter.
///
/// Read and write are not atomic across requests; two concurrent runs in the
/// same session may both see the old value.
pub async fn record_shown(store: &dyn SessionStore, previous: u32) -> Result<u32> {
    let next = previous.saturating_add(1);
    store.set(SHOW_COUNTER_KEY, next.to_string()).await?;
    Ok(next)
}

/// Process-local store, used by tests and one-shot CLI runs.
#[derive(Default)]
pub struct InMemorySessionStore {
    values: RwLock<HashMap<String, String>>,
}

impl InMemorySessionStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a store pre-filled with `values`.
    pub fn with_values<I, K, V>(values: I) -> Self
    where
        I: IntoIterator<Item = (K, V)>,
        K: Into<String>,
        V: Into<String>,
    {
        Self {
            values: RwLock::new(
                values
                    .into_iter()
                    .map(|(k, v)| (k.into(), v.into()))
                    .collect(),
            ),
        }
    }
}

#[async_trait]
impl SessionStore for InMemorySessionStore {
    async fn get(&self, key: &str) -> Result<Option<String>> {
        Ok(self.values.read().await.get(key).cloned())
    }

    async fn set(&self, key: &str, value: String) -> Result<()> {
        self.values.write().await.insert(key.to_string(), value);
        Ok(())
    }

    async fn clear(&self, key: &str) -> Result<()> {
        self.values.write().await.remove(key);
        Ok(())
    }
}

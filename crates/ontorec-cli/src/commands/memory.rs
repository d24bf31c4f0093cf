use std::path::Path;

use anyhow::{Context, Result, bail};
use clap::Args;
use ontorec_application::recommender::SOURCE_MODULE;
use ontorec_core::memory::{self, MemoryRecord, PARAMETER_NAME, RecommendationMemory};
use ontorec_core::recommendation::Category;

use super::{load_settings, session_store};

#[derive(Args)]
pub struct EncodeArgs {
    /// The recommended term
    pub recommended: String,

    /// The term it replaces
    #[arg(long)]
    pub replaced: Option<String>,

    /// nondescriptor, specifier or hyponym
    #[arg(long)]
    pub category: Option<String>,

    #[arg(long, default_value = SOURCE_MODULE)]
    pub module: String,
}

pub fn encode(args: EncodeArgs) -> Result<()> {
    let category = match args.category.as_deref() {
        Some(value) => match Category::parse(value) {
            Some(category) => Some(category),
            None => bail!("Unknown category '{}'", value),
        },
        None => None,
    };

    let token = memory::encode(
        &args.module,
        &args.recommended,
        args.replaced.as_deref(),
        category,
    );
    println!("{}", token);
    Ok(())
}

#[derive(Args)]
pub struct RecallArgs {
    /// Memory key, the `rmKey` value of a followed link
    pub key: String,

    /// Leave the stored token in place
    #[arg(long)]
    pub keep: bool,
}

/// Stores `token` under `key` in the session store.
pub async fn remember(config: Option<&Path>, key: &str, token: &str) -> Result<()> {
    let settings = load_settings(config)?;
    let recommendation_memory = RecommendationMemory::new(session_store(&settings, false)?);
    recommendation_memory
        .remember(key, token)
        .await
        .context("Failed to store memory token")?;
    Ok(())
}

/// Prints the memory stored under a followed link's key, clearing it unless `keep`.
pub async fn recall(config: Option<&Path>, args: RecallArgs) -> Result<()> {
    let settings = load_settings(config)?;
    let recommendation_memory = RecommendationMemory::new(session_store(&settings, false)?);

    let Some(record) = recall_key(&recommendation_memory, &args.key, !args.keep).await? else {
        bail!("No recommendation memory stored under '{}'", args.key);
    };
    println!("{}", serde_json::to_string_pretty(&record)?);
    Ok(())
}

async fn recall_key(recommendation_memory: &RecommendationMemory, key: &str, clear: bool) -> Result<Option<MemoryRecord>> {
    let params = vec![(PARAMETER_NAME.to_string(), key.to_string())];
    recommendation_memory
        .recall(&params, clear)
        .await
        .context("Failed to read memory token")
}

pub fn decode(token: &str) -> Result<()> {
    let Some(record) = memory::decode(Some(token)) else {
        bail!("Not a valid memory token");
    };
    println!("{}", serde_json::to_string_pretty(&record)?);
    Ok(())
}

use std::path::Path;

use anyhow::{Context, Result};
use clap::Args;
use ontorec_application::{
    ClassificationRules, DeferredRecommendationHandler, DeferredRequestBuilder,
};

use super::{build_services, load_settings};

#[derive(Args)]
pub struct BuildArgs {
    /// The search query
    pub lookfor: String,

    #[arg(short, long, default_value = "fi")]
    pub language: String,

    #[arg(long)]
    pub result_total: Option<u64>,

    /// Budget string, defaults to `[ontology] settings`
    #[arg(long)]
    pub settings: Option<String>,
}

#[derive(Args)]
pub struct RunArgs {
    /// Query string as printed by `deferred build`
    pub query: String,

    /// Do not persist the show counter
    #[arg(long)]
    pub ephemeral: bool,
}

pub fn build(config: Option<&Path>, args: BuildArgs) -> Result<()> {
    let raw_settings = match args.settings {
        Some(raw) => raw,
        None => load_settings(config)?.ontology.settings,
    };

    let query = DeferredRequestBuilder::build_deferred_params(
        &raw_settings,
        &args.lookfor,
        &args.language,
        args.result_total,
    );
    println!("{}", query);
    Ok(())
}

pub async fn run(config: Option<&Path>, args: RunArgs) -> Result<()> {
    let settings = load_settings(config)?;
    let rules: ClassificationRules = settings
        .ontology
        .rules
        .parse()
        .context("Invalid [ontology] rules")?;
    let (thesaurus, session) = build_services(&settings, args.ephemeral)?;

    let handler = DeferredRecommendationHandler::new(
        thesaurus,
        session,
        rules,
        settings.ontology.search_path.clone(),
    );
    let response = handler.handle(&args.query).await?;
    println!("{}", serde_json::to_string_pretty(&response)?);
    Ok(())
}

use std::path::Path;

use anyhow::{Context, Result};
use clap::Args;
use ontorec_application::{OntologyRecommender, RecommendationRequest, RecommenderConfig};

use super::{build_services, load_settings};

#[derive(Args)]
pub struct RecommendArgs {
    /// The search query
    pub lookfor: String,

    /// Interface language
    #[arg(short, long, default_value = "fi")]
    pub language: String,

    /// Size of the main search result
    #[arg(long)]
    pub result_total: Option<u64>,

    /// Saved search id, prefixes memory keys
    #[arg(long)]
    pub search_id: Option<String>,

    /// Budget string, overrides `[ontology] settings`
    #[arg(long)]
    pub settings: Option<String>,

    /// Rule set (strict or lenient), overrides `[ontology] rules`
    #[arg(long)]
    pub rules: Option<String>,

    /// Extra search parameter kept in follow-up links (key=value)
    #[arg(long = "param", value_parser = parse_param)]
    pub params: Vec<(String, String)>,

    /// Do not persist the show counter
    #[arg(long)]
    pub ephemeral: bool,
}

fn parse_param(value: &str) -> Result<(String, String), String> {
    value
        .split_once('=')
        .map(|(key, value)| (key.to_string(), value.to_string()))
        .ok_or_else(|| format!("expected key=value, got '{}'", value))
}

pub async fn run(config: Option<&Path>, args: RecommendArgs) -> Result<()> {
    let mut settings = load_settings(config)?;
    if let Some(raw) = args.settings {
        settings.ontology.settings = raw;
    }
    if let Some(rules) = args.rules {
        settings.ontology.rules = rules;
    }

    let config = RecommenderConfig::from_settings(&settings.ontology)
        .context("Invalid [ontology] settings")?;
    let (thesaurus, session) = build_services(&settings, args.ephemeral)?;

    let mut params = vec![("lookfor".to_string(), args.lookfor.clone())];
    params.extend(args.params);

    let mut request = RecommendationRequest::new(args.lookfor, args.language).with_params(params);
    if let Some(search_id) = args.search_id {
        request = request.with_search_id(search_id);
    }

    let mut recommender = OntologyRecommender::new(thesaurus, session, config);
    recommender.init(request)?;
    let recommendations = recommender.process(args.result_total).await?.clone();
    let stats = recommender.stats().unwrap_or_default();

    let output = serde_json::json!({
        "recommendations": recommendations,
        "stats": stats,
    });
    println!("{}", serde_json::to_string_pretty(&output)?);

    Ok(())
}

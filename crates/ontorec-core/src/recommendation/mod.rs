//! Recommendation records produced by an ontology run.

pub mod model;

pub use model::{Category, GroupedRecommendations, RecommendationRecord, ResultType, RunStats, TermBucket};

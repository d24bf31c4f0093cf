//! Application layer for ontorec.
//!
//! This crate provides the recommendation use cases that coordinate the
//! domain rules with the thesaurus and session collaborators.

pub mod classification;
pub mod deferred;
pub mod link;
pub mod recommender;

pub use classification::{Classification, ClassificationRules};
pub use deferred::{
    DeferredRecommendationHandler, DeferredRequest, DeferredRequestBuilder, DeferredResponse,
};
pub use link::FollowUpLinkBuilder;
pub use recommender::{OntologyRecommender, RecommendationRequest, RecommenderConfig};

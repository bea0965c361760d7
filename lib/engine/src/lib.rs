//! Per-domain recommenders and the service that fronts them.
//!
//! A [`DomainRecommender`] owns one domain's catalog, query adapter and
//! index. [`RecommendationService`] loads one per configured bundle and
//! routes queries by [`Domain`](simrec_core::Domain).

pub mod config;
pub mod recommender;
pub mod service;

pub use config::ServiceConfig;
pub use recommender::{DomainRecommender, Recommendation, SONG_NOT_FOUND};
pub use service::{RecommendationService, DEFAULT_TOP_N};

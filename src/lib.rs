//! # simrec
//!
//! Content-based "more like this" recommendations over fixed catalogs of
//! books, movies, songs, articles, blogs and news.
//!
//! Every domain is served from an artifact bundle produced offline: the
//! catalog, a fitted vectorizer (TF-IDF vocabulary or feature scaler) or a
//! precomputed similarity matrix, and a `manifest.json` tying them together.
//! Queries are exact nearest-neighbor lookups over that data.
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use simrec::prelude::*;
//!
//! # fn main() -> simrec::Result<()> {
//! simrec::telemetry::init_tracing("info")?;
//!
//! let config = ServiceConfig::from_root("artifacts")?;
//! let service = RecommendationService::load(&config)?;
//!
//! for title in service.recommend_books("Dune", DEFAULT_TOP_N)? {
//!     println!("{title}");
//! }
//! for (title, url) in service.recommend_news("Rust 2024 edition released", 3)? {
//!     println!("{title} <{url}>");
//! }
//! # Ok(())
//! # }
//! ```
//!
//! ## Crate Structure
//!
//! - `simrec-core` - Catalog, vectors, metrics and the exact k-NN indexes
//! - `simrec-vectorize` - TF-IDF and numeric feature adapters
//! - `simrec-storage` - Bundle manifests, artifact codecs and loading
//! - `simrec-engine` - Domain recommenders and the multi-domain service

pub mod telemetry;

pub use simrec_core::{
    Catalog, CatalogItem, Domain, Error, FeatureKind, FeatureVector, MatrixIndex, Metric, Neighbor, Result,
    SimilarityMatrix, SparseVector, TitleMatch, Vector, VectorIndex,
};
pub use simrec_engine::{
    DomainRecommender, Recommendation, RecommendationService, ServiceConfig, DEFAULT_TOP_N, SONG_NOT_FOUND,
};
pub use simrec_storage::{load_bundle, ArtifactBundle, BundleManifest, BundleWriter};
pub use simrec_vectorize::{NumericAdapter, ScalingModel, TextAdapter, Vectorizer, VocabularyModel};

/// Prelude module for convenient imports
pub mod prelude {
    pub use crate::{
        Domain, Error, Recommendation, RecommendationService, Result, ServiceConfig, DEFAULT_TOP_N,
    };
}

//! # simrec Vectorize
//!
//! Adapters that map raw queries into the feature space of a catalog.
//!
//! - [`TextAdapter`] - title string → sparse TF-IDF vector via a fitted [`VocabularyModel`]
//! - [`NumericAdapter`] - catalog item attributes → dense vector via a fitted [`ScalingModel`]
//!
//! Both are read-only after construction and safe to share across threads.

pub mod numeric;
pub mod scaling;
pub mod text;
pub mod tokenize;
pub mod vocabulary;

pub use numeric::{NumericAdapter, AUDIO_FEATURES};
pub use scaling::{ScalingModel, ScalingParams};
pub use text::TextAdapter;
pub use tokenize::Tokenizer;
pub use vocabulary::{Norm, VocabularyModel};

use simrec_core::{FeatureVector, Result};

/// Capability shared by query adapters: turn a raw input into a feature
/// vector in the catalog's space.
pub trait Vectorizer: Send + Sync {
    type Input: ?Sized;

    /// Dimensionality of produced vectors
    fn dim(&self) -> usize;

    fn transform(&self, input: &Self::Input) -> Result<FeatureVector>;
}

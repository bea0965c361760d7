//! # simrec Core
//!
//! Core data structures and search algorithms for the simrec engine.
//!
//! - [`Catalog`] - Immutable ordered items of one [`Domain`] with O(1) title lookup
//! - [`FeatureVector`] - Dense [`Vector`] or [`SparseVector`] item features
//! - [`SimilarityMatrix`] - Precomputed all-pairs similarity table
//! - [`VectorIndex`] - Exact k-nearest-neighbor search over feature vectors
//! - [`MatrixIndex`] - k-nearest lookup over similarity matrix rows
//!
//! ## Example
//!
//! ```rust
//! use simrec_core::{Catalog, Domain, FeatureVector, Metric, Vector, VectorIndex};
//!
//! let catalog = Catalog::from_titles(Domain::Books, ["Dune", "Emma", "Persuasion"]);
//! let vectors = vec![
//!     FeatureVector::Dense(Vector::new(vec![0.0, 1.0])),
//!     FeatureVector::Dense(Vector::new(vec![1.0, 0.0])),
//!     FeatureVector::Dense(Vector::new(vec![0.9, 0.1])),
//! ];
//! let index = VectorIndex::build(vectors, 2, Metric::Euclidean).unwrap();
//!
//! let emma = catalog.find_by_title("Emma").unwrap();
//! let query = FeatureVector::Dense(Vector::new(vec![1.0, 0.0]));
//! let neighbors = index.query(&query, 1).unwrap();
//! assert_eq!(neighbors[0].id, emma.id);
//! assert_eq!(catalog.get_by_id(neighbors[1].id).unwrap().title, "Persuasion");
//! ```

pub mod catalog;
pub mod distance;
pub mod domain;
pub mod error;
pub mod index;
pub mod item;
pub mod matrix;
pub mod sparse;
pub mod vector;

pub use catalog::{Catalog, TitleMatch};
pub use distance::Metric;
pub use domain::{Domain, FeatureKind};
pub use error::{Error, Result};
pub use index::{MatrixIndex, Neighbor, VectorIndex, PARALLEL_SCAN_THRESHOLD};
pub use item::CatalogItem;
pub use matrix::SimilarityMatrix;
pub use sparse::SparseVector;
pub use vector::{FeatureVector, Vector};

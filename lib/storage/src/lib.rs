//! Artifact bundles: one directory per domain holding a `manifest.json`
//! and the catalog, model and index files it names.

pub mod bundle;
pub mod codec;
pub mod manifest;

pub use bundle::{load_bundle, ArtifactBundle, BundleFeatures, BundleWriter};
pub use codec::{read_artifact, sha256_hex, write_artifact};
pub use manifest::{BundleFiles, BundleManifest, FORMAT_VERSION, MANIFEST_FILE};

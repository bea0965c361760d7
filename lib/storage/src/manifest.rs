//! Bundle manifest: the versioned description of one domain's artifacts.

use anyhow::{bail, Context, Result};
use serde::{Deserialize, Serialize};
use simrec_core::{Domain, FeatureKind, Metric, TitleMatch};
use std::collections::BTreeMap;
use std::fs;
use std::path::Path;

pub const MANIFEST_FILE: &str = "manifest.json";
pub const FORMAT_VERSION: u32 = 1;

fn default_format_version() -> u32 {
    FORMAT_VERSION
}

/// File names of a bundle's artifacts, relative to the bundle directory
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct BundleFiles {
    pub catalog: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub vocabulary: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub scaler: Option<String>,
    /// Precomputed catalog vectors; derived from the catalog when absent
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub vectors: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub matrix: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BundleManifest {
    #[serde(default = "default_format_version")]
    pub format_version: u32,

    pub domain: Domain,

    /// Version label assigned by the pipeline that produced the bundle
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub version: Option<String>,

    #[serde(default)]
    pub metric: Metric,

    /// Overrides the domain's default title matching
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub title_match: Option<TitleMatch>,

    /// Record column renames applied on load, e.g. `"track_artist": "artist"`
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub columns: BTreeMap<String, String>,

    pub files: BundleFiles,

    /// SHA-256 (hex) of stored artifact files, keyed by file name
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub checksums: BTreeMap<String, String>,
}

impl BundleManifest {
    pub fn new(domain: Domain) -> Self {
        Self {
            format_version: FORMAT_VERSION,
            domain,
            version: None,
            metric: Metric::default(),
            title_match: None,
            columns: BTreeMap::new(),
            files: BundleFiles::default(),
            checksums: BTreeMap::new(),
        }
    }

    pub fn read(dir: &Path) -> Result<Self> {
        let path = dir.join(MANIFEST_FILE);
        let bytes = fs::read(&path).with_context(|| format!("reading {}", path.display()))?;
        serde_json::from_slice(&bytes).with_context(|| format!("parsing {}", path.display()))
    }

    pub fn title_match(&self) -> TitleMatch {
        self.title_match
            .unwrap_or_else(|| self.domain.default_title_match())
    }

    pub fn checksum(&self, file: &str) -> Option<&str> {
        self.checksums.get(file).map(String::as_str)
    }

    /// Check the manifest describes a bundle `expected` can be served from.
    pub fn validate(&self, expected: Domain) -> Result<()> {
        if self.format_version != FORMAT_VERSION {
            bail!(
                "unsupported bundle format version {} (expected {})",
                self.format_version,
                FORMAT_VERSION
            );
        }
        if self.domain != expected {
            bail!("bundle is for domain {} but was configured for {}", self.domain, expected);
        }
        if self.files.catalog.is_empty() {
            bail!("manifest names no catalog file");
        }

        let required = match expected.feature_kind() {
            FeatureKind::Text => ("vocabulary", self.files.vocabulary.is_some()),
            FeatureKind::Numeric => ("scaler", self.files.scaler.is_some()),
            FeatureKind::Matrix => ("matrix", self.files.matrix.is_some()),
        };
        if !required.1 {
            bail!("{} bundles require a {} file", expected, required.0);
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_minimal_manifest() {
        let json = r#"{
            "domain": "songs",
            "columns": {"track_name": "title", "track_artist": "artist"},
            "files": {"catalog": "songs.json", "scaler": "scaler.json"}
        }"#;
        let manifest: BundleManifest = serde_json::from_str(json).unwrap();
        assert_eq!(manifest.format_version, FORMAT_VERSION);
        assert_eq!(manifest.metric, Metric::Euclidean);
        assert_eq!(manifest.title_match(), TitleMatch::CaseInsensitive);
        assert!(manifest.validate(Domain::Songs).is_ok());
        assert!(manifest.validate(Domain::Books).is_err());
    }

    #[test]
    fn test_validate_requires_kind_file() {
        let mut manifest = BundleManifest::new(Domain::Movies);
        manifest.files.catalog = "movies.json".into();
        assert!(manifest.validate(Domain::Movies).is_err());

        manifest.files.matrix = Some("similarity.bin".into());
        assert!(manifest.validate(Domain::Movies).is_ok());

        manifest.format_version = 2;
        assert!(manifest.validate(Domain::Movies).is_err());
    }
}

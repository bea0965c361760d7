use serde::{Deserialize, Serialize};
use simrec_core::{Domain, Error, Result};
use simrec_storage::MANIFEST_FILE;
use std::collections::BTreeMap;
use std::fs;
use std::path::{Path, PathBuf};

/// Which bundle directory serves which domain, and how to load them.
///
/// ```json
/// {
///   "bundles": { "books": "artifacts/books", "movies": "artifacts/movies" },
///   "parallel_load": true
/// }
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ServiceConfig {
    #[serde(default)]
    pub bundles: BTreeMap<Domain, PathBuf>,

    /// Load domains on the rayon pool instead of one after another
    #[serde(default = "default_parallel_load")]
    pub parallel_load: bool,
}

fn default_parallel_load() -> bool {
    true
}

impl Default for ServiceConfig {
    fn default() -> Self {
        Self {
            bundles: BTreeMap::new(),
            parallel_load: default_parallel_load(),
        }
    }
}

impl ServiceConfig {
    /// Read a JSON config file. Relative bundle paths resolve against the
    /// directory holding the file.
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let bytes = fs::read(path)?;
        let mut config: ServiceConfig = serde_json::from_slice(&bytes)
            .map_err(|e| Error::InvalidConfig(format!("{}: {}", path.display(), e)))?;

        if let Some(base) = path.parent() {
            for dir in config.bundles.values_mut() {
                if dir.is_relative() {
                    *dir = base.join(&*dir);
                }
            }
        }
        Ok(config)
    }

    /// Use the conventional layout `<root>/<domain>/manifest.json`, taking
    /// every domain whose directory holds a manifest.
    pub fn from_root(root: impl AsRef<Path>) -> Result<Self> {
        let root = root.as_ref();
        if !root.is_dir() {
            return Err(Error::InvalidConfig(format!(
                "artifact root {} is not a directory",
                root.display()
            )));
        }

        let bundles = Domain::ALL
            .iter()
            .map(|domain| (*domain, root.join(domain.as_str())))
            .filter(|(_, dir)| dir.join(MANIFEST_FILE).is_file())
            .collect();
        Ok(Self {
            bundles,
            ..Self::default()
        })
    }

    pub fn with_bundle(mut self, domain: Domain, dir: impl Into<PathBuf>) -> Self {
        self.bundles.insert(domain, dir.into());
        self
    }

    pub fn with_parallel_load(mut self, parallel: bool) -> Self {
        self.parallel_load = parallel;
        self
    }

    pub fn validate(&self) -> Result<()> {
        if self.bundles.is_empty() {
            return Err(Error::InvalidConfig("no bundles configured".into()));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_from_file_resolves_relative_paths() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("simrec.json");
        fs::write(
            &path,
            r#"{"bundles": {"books": "books", "songs": "/srv/songs"}, "parallel_load": false}"#,
        )
        .unwrap();

        let config = ServiceConfig::from_file(&path).unwrap();
        assert!(!config.parallel_load);
        assert_eq!(config.bundles[&Domain::Books], dir.path().join("books"));
        assert_eq!(config.bundles[&Domain::Songs], PathBuf::from("/srv/songs"));
    }

    #[test]
    fn test_from_file_rejects_unknown_domain() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("simrec.json");
        fs::write(&path, r#"{"bundles": {"podcasts": "podcasts"}}"#).unwrap();
        assert!(matches!(ServiceConfig::from_file(&path), Err(Error::InvalidConfig(_))));
    }

    #[test]
    fn test_from_root_picks_up_manifests() {
        let dir = tempfile::tempdir().unwrap();
        for domain in ["movies", "news"] {
            fs::create_dir(dir.path().join(domain)).unwrap();
        }
        fs::write(dir.path().join("movies").join(MANIFEST_FILE), "{}").unwrap();

        let config = ServiceConfig::from_root(dir.path()).unwrap();
        assert_eq!(config.bundles.keys().copied().collect::<Vec<_>>(), vec![Domain::Movies]);
        assert!(config.parallel_load);
    }

    #[test]
    fn test_validate() {
        assert!(ServiceConfig::default().validate().is_err());
        let config = ServiceConfig::default().with_bundle(Domain::Blogs, "/tmp/blogs");
        assert!(config.validate().is_ok());
    }
}

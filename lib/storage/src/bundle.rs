use crate::codec::{read_artifact, write_artifact};
use crate::manifest::{BundleManifest, MANIFEST_FILE};
use anyhow::{anyhow, bail, Context};
use serde::Serialize;
use serde_json::{Map, Value};
use simrec_core::{Catalog, Domain, Error, FeatureKind, FeatureVector, Metric, Result, SimilarityMatrix, TitleMatch};
use simrec_vectorize::{NumericAdapter, ScalingModel, TextAdapter, Vectorizer, VocabularyModel};
use std::fs;
use std::path::{Path, PathBuf};
use tracing::{info, warn};

/// Matrices whose mirrored entries differ by more than this are reported.
const SYMMETRY_TOLERANCE: f32 = 1e-4;

/// Decoded feature data of a bundle, row-aligned with its catalog
pub enum BundleFeatures {
    Text {
        adapter: TextAdapter,
        vectors: Vec<FeatureVector>,
    },
    Numeric {
        adapter: NumericAdapter,
        vectors: Vec<FeatureVector>,
    },
    Matrix(SimilarityMatrix),
}

/// Everything one domain needs to serve queries, fully validated
pub struct ArtifactBundle {
    /// Directory the bundle was read from
    pub dir: PathBuf,
    pub manifest: BundleManifest,
    pub catalog: Catalog,
    pub features: BundleFeatures,
}

/// Load and validate the bundle in `dir` for `domain`.
///
/// Every failure (missing file, checksum mismatch, schema or dimension
/// mismatch) surfaces as [`Error::ArtifactLoad`] naming the bundle directory.
pub fn load_bundle(dir: impl AsRef<Path>, domain: Domain) -> Result<ArtifactBundle> {
    let dir = dir.as_ref();
    let bundle = load_inner(dir, domain).map_err(|e| Error::artifact(dir, format!("{e:#}")))?;

    info!(
        domain = %domain,
        items = bundle.catalog.len(),
        version = bundle.manifest.version.as_deref().unwrap_or("unversioned"),
        "Loaded artifact bundle from {}",
        dir.display()
    );
    Ok(bundle)
}

fn load_inner(dir: &Path, domain: Domain) -> anyhow::Result<ArtifactBundle> {
    let manifest = BundleManifest::read(dir)?;
    manifest.validate(domain)?;

    let path_of = |file: &str| -> PathBuf { dir.join(file) };

    let records: Vec<Value> = read_artifact(&path_of(&manifest.files.catalog), manifest.checksum(&manifest.files.catalog))?;
    let catalog = build_catalog(&manifest, records)?;

    let features = match domain.feature_kind() {
        FeatureKind::Text => {
            let file = manifest.files.vocabulary.as_deref().unwrap_or_default();
            let vocabulary: VocabularyModel = read_artifact(&path_of(file), manifest.checksum(file))?;
            let adapter = TextAdapter::new(vocabulary).context("invalid vocabulary model")?;
            let vectors: Vec<FeatureVector> = match manifest.files.vectors.as_deref() {
                Some(file) => read_artifact(&path_of(file), manifest.checksum(file))?,
                None => catalog
                    .iter()
                    .map(|item| FeatureVector::Sparse(adapter.vectorize(&item.title)))
                    .collect(),
            };
            check_vectors(&vectors, catalog.len(), adapter.dim())?;
            BundleFeatures::Text { adapter, vectors }
        }
        FeatureKind::Numeric => {
            let file = manifest.files.scaler.as_deref().unwrap_or_default();
            let scaler: ScalingModel = read_artifact(&path_of(file), manifest.checksum(file))?;
            let adapter = NumericAdapter::new(scaler).context("invalid scaling model")?;
            let vectors: Vec<FeatureVector> = match manifest.files.vectors.as_deref() {
                Some(file) => read_artifact(&path_of(file), manifest.checksum(file))?,
                None => catalog
                    .iter()
                    .map(|item| adapter.transform(item))
                    .collect::<Result<Vec<_>>>()
                    .context("deriving catalog vectors")?,
            };
            check_vectors(&vectors, catalog.len(), adapter.dim())?;
            BundleFeatures::Numeric { adapter, vectors }
        }
        FeatureKind::Matrix => {
            let file = manifest.files.matrix.as_deref().unwrap_or_default();
            let rows: Vec<Vec<f32>> = read_artifact(&path_of(file), manifest.checksum(file))?;
            let matrix = SimilarityMatrix::from_rows(rows).context("invalid similarity matrix")?;
            if matrix.dim() != catalog.len() {
                bail!(
                    "similarity matrix has dimension {} but the catalog has {} items",
                    matrix.dim(),
                    catalog.len()
                );
            }
            let asymmetry = matrix.max_asymmetry();
            if asymmetry > SYMMETRY_TOLERANCE {
                warn!(domain = %domain, asymmetry, "Similarity matrix is not symmetric");
            }
            let weak = matrix.rows_with_weak_diagonal();
            if weak > 0 {
                warn!(domain = %domain, rows = weak, "Similarity matrix rows rank another item above self");
            }
            BundleFeatures::Matrix(matrix)
        }
    };

    Ok(ArtifactBundle {
        dir: dir.to_path_buf(),
        manifest,
        catalog,
        features,
    })
}

fn build_catalog(manifest: &BundleManifest, records: Vec<Value>) -> anyhow::Result<Catalog> {
    let domain = manifest.domain;
    let mut rows = Vec::with_capacity(records.len());

    for (pos, record) in records.into_iter().enumerate() {
        let Value::Object(mut fields) = record else {
            bail!("catalog record #{pos} is not an object");
        };
        for (from, to) in &manifest.columns {
            if let Some(value) = fields.remove(from) {
                fields.insert(to.clone(), value);
            }
        }

        let title = match fields.remove("title") {
            Some(Value::String(s)) => s,
            Some(Value::Number(n)) => n.to_string(),
            _ => bail!("catalog record #{pos} has no title"),
        };
        if let Some(field) = domain.required_fields().iter().find(|f| !fields.contains_key(**f)) {
            bail!("catalog record #{pos} ({title:?}) is missing required column {field:?}");
        }
        rows.push((title, fields));
    }

    let catalog = Catalog::new(domain, rows, manifest.title_match());
    for field in domain.required_fields() {
        if let Some(item) = catalog.first_missing(field) {
            warn!(domain = %domain, item = item.id, "Catalog has empty {} values", field);
        }
    }
    Ok(catalog)
}

fn check_vectors(vectors: &[FeatureVector], items: usize, dim: usize) -> anyhow::Result<()> {
    if vectors.len() != items {
        bail!("{} feature vectors for {} catalog items", vectors.len(), items);
    }
    if let Some(pos) = vectors.iter().position(|v| !v.fits(dim)) {
        bail!(
            "feature vector #{pos} has dimension {} but the model produces {dim}",
            vectors[pos].dim_hint()
        );
    }
    if let Some(pos) = vectors.iter().position(|v| !v.is_finite()) {
        bail!("feature vector #{pos} has a non-finite component");
    }
    Ok(())
}

/// Writes a bundle directory: artifact files first, then a manifest that
/// records their checksums. Used by pipelines and test fixtures.
pub struct BundleWriter {
    dir: PathBuf,
    manifest: BundleManifest,
}

impl BundleWriter {
    pub fn new(dir: impl Into<PathBuf>, domain: Domain) -> anyhow::Result<Self> {
        let dir = dir.into();
        fs::create_dir_all(&dir).with_context(|| format!("creating {}", dir.display()))?;
        Ok(Self {
            dir,
            manifest: BundleManifest::new(domain),
        })
    }

    #[must_use]
    pub fn version(mut self, version: impl Into<String>) -> Self {
        self.manifest.version = Some(version.into());
        self
    }

    #[must_use]
    pub fn metric(mut self, metric: Metric) -> Self {
        self.manifest.metric = metric;
        self
    }

    #[must_use]
    pub fn title_match(mut self, title_match: TitleMatch) -> Self {
        self.manifest.title_match = Some(title_match);
        self
    }

    #[must_use]
    pub fn rename_column(mut self, from: impl Into<String>, to: impl Into<String>) -> Self {
        self.manifest.columns.insert(from.into(), to.into());
        self
    }

    fn write<T: Serialize + ?Sized>(&mut self, file: &str, value: &T) -> anyhow::Result<String> {
        let checksum = write_artifact(&self.dir.join(file), value)?;
        self.manifest.checksums.insert(file.to_string(), checksum);
        Ok(file.to_string())
    }

    pub fn catalog(mut self, file: &str, records: &[Map<String, Value>]) -> anyhow::Result<Self> {
        self.manifest.files.catalog = self.write(file, records)?;
        Ok(self)
    }

    pub fn vocabulary(mut self, file: &str, model: &VocabularyModel) -> anyhow::Result<Self> {
        self.manifest.files.vocabulary = Some(self.write(file, model)?);
        Ok(self)
    }

    pub fn scaler(mut self, file: &str, model: &ScalingModel) -> anyhow::Result<Self> {
        self.manifest.files.scaler = Some(self.write(file, model)?);
        Ok(self)
    }

    pub fn vectors(mut self, file: &str, vectors: &[FeatureVector]) -> anyhow::Result<Self> {
        self.manifest.files.vectors = Some(self.write(file, vectors)?);
        Ok(self)
    }

    pub fn matrix(mut self, file: &str, rows: &[Vec<f32>]) -> anyhow::Result<Self> {
        self.manifest.files.matrix = Some(self.write(file, rows)?);
        Ok(self)
    }

    /// Write the manifest and return the bundle directory.
    pub fn finish(self) -> anyhow::Result<PathBuf> {
        let path = self.dir.join(MANIFEST_FILE);
        let json = serde_json::to_vec_pretty(&self.manifest)?;
        fs::write(&path, json).map_err(|e| anyhow!("writing {}: {}", path.display(), e))?;
        Ok(self.dir)
    }
}

use ahash::AHashSet;
use serde::Serialize;
use simrec_core::{
    Catalog, CatalogItem, Domain, Error, FeatureKind, FeatureVector, MatrixIndex, Metric, Neighbor, Result,
    SimilarityMatrix, VectorIndex,
};
use simrec_storage::{ArtifactBundle, BundleFeatures};
use simrec_vectorize::{NumericAdapter, TextAdapter, Vectorizer};
use std::fmt;
use tracing::debug;

/// Returned by the songs domain when the query title is unknown.
pub const SONG_NOT_FOUND: &str = "Song not found.";

/// One recommended item, shaped by its domain
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Recommendation {
    Title { title: String },
    Track { title: String, artist: String },
    Link { title: String, url: String },
    NotFound { message: String },
}

impl Recommendation {
    pub fn title(&self) -> &str {
        match self {
            Recommendation::Title { title }
            | Recommendation::Track { title, .. }
            | Recommendation::Link { title, .. } => title,
            Recommendation::NotFound { message } => message,
        }
    }

    fn dedup_key(&self) -> Option<(String, String)> {
        match self {
            Recommendation::Track { title, artist } => Some((title.clone(), artist.clone())),
            Recommendation::Link { title, url } => Some((title.clone(), url.clone())),
            Recommendation::Title { .. } | Recommendation::NotFound { .. } => None,
        }
    }
}

impl fmt::Display for Recommendation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Recommendation::Track { title, artist } => write!(f, "{} - {}", title, artist),
            other => f.write_str(other.title()),
        }
    }
}

enum Strategy {
    Text { adapter: TextAdapter, index: VectorIndex },
    Numeric { adapter: NumericAdapter, index: VectorIndex },
    Matrix { index: MatrixIndex },
}

enum Probe {
    Vector(FeatureVector),
    Item(usize),
}

/// Where a query lands: the probe handed to the index, and the catalog
/// item it stands for, if any.
struct Anchor {
    id: Option<usize>,
    probe: Probe,
}

/// Serves `recommend(query, top_n)` for one content domain over its
/// immutable catalog.
///
/// Text domains vectorize the raw query, so titles missing from the catalog
/// still get neighbors. Songs and movies first resolve the query to a
/// catalog item; an unknown title yields [`SONG_NOT_FOUND`] for songs and
/// an empty list for movies.
pub struct DomainRecommender {
    domain: Domain,
    version: Option<String>,
    catalog: Catalog,
    strategy: Strategy,
}

impl DomainRecommender {
    pub fn text(catalog: Catalog, adapter: TextAdapter, vectors: Vec<FeatureVector>, metric: Metric) -> Result<Self> {
        check_rows(&catalog, vectors.len())?;
        let index = VectorIndex::build(vectors, adapter.dim(), metric)?;
        Ok(Self::assemble(catalog, Strategy::Text { adapter, index }))
    }

    pub fn numeric(
        catalog: Catalog,
        adapter: NumericAdapter,
        vectors: Vec<FeatureVector>,
        metric: Metric,
    ) -> Result<Self> {
        check_rows(&catalog, vectors.len())?;
        let index = VectorIndex::build(vectors, adapter.dim(), metric)?;
        Ok(Self::assemble(catalog, Strategy::Numeric { adapter, index }))
    }

    pub fn matrix(catalog: Catalog, matrix: SimilarityMatrix) -> Result<Self> {
        check_rows(&catalog, matrix.dim())?;
        Ok(Self::assemble(
            catalog,
            Strategy::Matrix {
                index: MatrixIndex::new(matrix),
            },
        ))
    }

    pub fn from_bundle(bundle: ArtifactBundle) -> Result<Self> {
        let ArtifactBundle {
            dir,
            manifest,
            catalog,
            features,
        } = bundle;

        let expected = catalog.domain().feature_kind();
        let mut recommender = match features {
            BundleFeatures::Text { adapter, vectors } if expected == FeatureKind::Text => {
                Self::text(catalog, adapter, vectors, manifest.metric)?
            }
            BundleFeatures::Numeric { adapter, vectors } if expected == FeatureKind::Numeric => {
                Self::numeric(catalog, adapter, vectors, manifest.metric)?
            }
            BundleFeatures::Matrix(matrix) if expected == FeatureKind::Matrix => Self::matrix(catalog, matrix)?,
            _ => {
                return Err(Error::artifact(
                    dir,
                    format!("bundle features do not match the {} domain", manifest.domain),
                ))
            }
        };
        recommender.version = manifest.version;
        Ok(recommender)
    }

    fn assemble(catalog: Catalog, strategy: Strategy) -> Self {
        Self {
            domain: catalog.domain(),
            version: None,
            catalog,
            strategy,
        }
    }

    pub fn domain(&self) -> Domain {
        self.domain
    }

    pub fn version(&self) -> Option<&str> {
        self.version.as_deref()
    }

    pub fn catalog(&self) -> &Catalog {
        &self.catalog
    }

    /// Ranked recommendations for `query`, never containing the item the
    /// query resolves to.
    ///
    /// `top_n == 0` yields an empty list. Larger requests than the catalog
    /// can answer are clamped to the items other than the anchor. Unknown
    /// titles and items with missing features are answered with the
    /// domain's not-found result.
    pub fn recommend(&self, query: &str, top_n: usize) -> Result<Vec<Recommendation>> {
        match self.try_recommend(query, top_n) {
            Err(e) if e.is_query_miss() => {
                debug!(domain = %self.domain, query, error = %e, "Query did not resolve");
                Ok(self.miss_result())
            }
            other => other,
        }
    }

    /// Like [`recommend`](Self::recommend) but hands query misses back as errors.
    pub fn try_recommend(&self, query: &str, top_n: usize) -> Result<Vec<Recommendation>> {
        if top_n == 0 {
            return Ok(Vec::new());
        }

        let anchor = self.resolve(query)?;
        let len = self.catalog.len();
        let available = len - usize::from(anchor.id.is_some());
        if top_n > available {
            debug!(domain = %self.domain, requested = top_n, available, "Clamping top_n to the catalog");
        }
        let top_n = top_n.min(available);
        if top_n == 0 {
            return Ok(Vec::new());
        }

        // Dedup may drop rows; widen the search until enough survive.
        let mut fetched = (top_n + 1).min(len);
        loop {
            let neighbors = self.nearest(&anchor.probe, fetched)?;
            let picked = self.collect(&neighbors, anchor.id, top_n)?;
            if picked.len() >= top_n || fetched >= len {
                debug!(domain = %self.domain, query, top_n, results = picked.len(), "Served recommendations");
                return Ok(picked);
            }
            fetched = fetched.saturating_mul(2).min(len);
        }
    }

    fn miss_result(&self) -> Vec<Recommendation> {
        match self.domain {
            Domain::Songs => vec![Recommendation::NotFound {
                message: SONG_NOT_FOUND.to_string(),
            }],
            _ => Vec::new(),
        }
    }

    fn resolve(&self, query: &str) -> Result<Anchor> {
        match &self.strategy {
            Strategy::Text { adapter, .. } => Ok(Anchor {
                id: self.catalog.find_by_title(query).ok().map(|item| item.id),
                probe: Probe::Vector(adapter.transform(query)?),
            }),
            Strategy::Numeric { adapter, .. } => {
                let item = self.catalog.find_by_title(query)?;
                Ok(Anchor {
                    id: Some(item.id),
                    probe: Probe::Vector(adapter.transform(item)?),
                })
            }
            Strategy::Matrix { .. } => {
                let item = self.catalog.find_by_title(query)?;
                Ok(Anchor {
                    id: Some(item.id),
                    probe: Probe::Item(item.id),
                })
            }
        }
    }

    fn nearest(&self, probe: &Probe, n: usize) -> Result<Vec<Neighbor>> {
        match (&self.strategy, probe) {
            (Strategy::Text { index, .. } | Strategy::Numeric { index, .. }, Probe::Vector(v)) => index.nearest(v, n),
            (Strategy::Matrix { index }, Probe::Item(id)) => index.nearest(*id, n),
            _ => Err(Error::InvalidConfig("probe does not match index strategy".into())),
        }
    }

    /// Drop the anchor by id, drop repeated results, keep at most `top_n`.
    fn collect(&self, neighbors: &[Neighbor], anchor: Option<usize>, top_n: usize) -> Result<Vec<Recommendation>> {
        let mut seen: AHashSet<(String, String)> = AHashSet::new();
        if let Some(id) = anchor {
            if let Some(key) = self.render(self.catalog.get_by_id(id)?).dedup_key() {
                seen.insert(key);
            }
        }

        let mut picked = Vec::with_capacity(top_n);
        for neighbor in neighbors {
            if Some(neighbor.id) == anchor {
                continue;
            }
            let rec = self.render(self.catalog.get_by_id(neighbor.id)?);
            if let Some(key) = rec.dedup_key() {
                if !seen.insert(key) {
                    continue;
                }
            }
            picked.push(rec);
            if picked.len() == top_n {
                break;
            }
        }
        Ok(picked)
    }

    fn render(&self, item: &CatalogItem) -> Recommendation {
        let title = item.title.clone();
        match self.domain {
            Domain::Songs => Recommendation::Track {
                title,
                artist: item.artist().unwrap_or_default().to_string(),
            },
            Domain::Articles | Domain::News => Recommendation::Link {
                title,
                url: item.url().unwrap_or_default().to_string(),
            },
            Domain::Books | Domain::Movies | Domain::Blogs => Recommendation::Title { title },
        }
    }
}

fn check_rows(catalog: &Catalog, rows: usize) -> Result<()> {
    if catalog.len() != rows {
        return Err(Error::InvalidDimension {
            expected: catalog.len(),
            actual: rows,
        });
    }
    Ok(())
}

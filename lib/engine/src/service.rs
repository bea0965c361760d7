use crate::config::ServiceConfig;
use crate::recommender::{DomainRecommender, Recommendation};
use rayon::prelude::*;
use simrec_core::{Catalog, Domain, Error, Result};
use simrec_storage::load_bundle;
use std::collections::BTreeMap;
use std::path::PathBuf;
use tracing::{info, warn};

/// Result count used when a caller has no preference
pub const DEFAULT_TOP_N: usize = 5;

/// The multi-domain facade. Each configured domain is loaded once and then
/// served read-only, so one instance can be shared across threads.
///
/// A domain whose bundle fails to load is left out; the others keep serving
/// and the failure is kept in [`load_errors`](Self::load_errors).
#[derive(Default)]
pub struct RecommendationService {
    recommenders: BTreeMap<Domain, DomainRecommender>,
    load_errors: BTreeMap<Domain, String>,
}

fn load_domain((domain, dir): (&Domain, &PathBuf)) -> (Domain, Result<DomainRecommender>) {
    let result = load_bundle(dir, *domain).and_then(DomainRecommender::from_bundle);
    (*domain, result)
}

impl RecommendationService {
    pub fn load(config: &ServiceConfig) -> Result<Self> {
        config.validate()?;

        let results: Vec<(Domain, Result<DomainRecommender>)> = if config.parallel_load {
            config.bundles.par_iter().map(load_domain).collect()
        } else {
            config.bundles.iter().map(load_domain).collect()
        };

        let mut service = Self::default();
        for (domain, result) in results {
            match result {
                Ok(recommender) => {
                    service.recommenders.insert(domain, recommender);
                }
                Err(e) => {
                    warn!(domain = %domain, error = %e, "Domain failed to load, it will not be served");
                    service.load_errors.insert(domain, e.to_string());
                }
            }
        }

        info!(
            ready = service.recommenders.len(),
            failed = service.load_errors.len(),
            "Recommendation service loaded"
        );
        Ok(service)
    }

    /// Serve already-built recommenders, keyed by their own domain.
    pub fn with_recommenders(recommenders: impl IntoIterator<Item = DomainRecommender>) -> Self {
        Self {
            recommenders: recommenders.into_iter().map(|r| (r.domain(), r)).collect(),
            load_errors: BTreeMap::new(),
        }
    }

    /// Domains that loaded and are serving
    pub fn domains(&self) -> impl Iterator<Item = Domain> + '_ {
        self.recommenders.keys().copied()
    }

    pub fn is_ready(&self, domain: Domain) -> bool {
        self.recommenders.contains_key(&domain)
    }

    pub fn load_errors(&self) -> &BTreeMap<Domain, String> {
        &self.load_errors
    }

    /// Fail with the first of `domains` that is not serving.
    pub fn ensure_ready(&self, domains: &[Domain]) -> Result<()> {
        match domains.iter().find(|d| !self.is_ready(**d)) {
            Some(domain) => Err(Error::DomainUnavailable(*domain)),
            None => Ok(()),
        }
    }

    pub fn recommender(&self, domain: Domain) -> Result<&DomainRecommender> {
        self.recommenders
            .get(&domain)
            .ok_or(Error::DomainUnavailable(domain))
    }

    pub fn catalog(&self, domain: Domain) -> Result<&Catalog> {
        Ok(self.recommender(domain)?.catalog())
    }

    pub fn recommend(&self, domain: Domain, query: &str, top_n: usize) -> Result<Vec<Recommendation>> {
        self.recommender(domain)?.recommend(query, top_n)
    }

    pub fn recommend_books(&self, title: &str, top_n: usize) -> Result<Vec<String>> {
        self.titles(Domain::Books, title, top_n)
    }

    pub fn recommend_movies(&self, title: &str, top_n: usize) -> Result<Vec<String>> {
        self.titles(Domain::Movies, title, top_n)
    }

    /// `"title - artist"` strings, or the single not-found sentinel.
    pub fn recommend_songs(&self, title: &str, top_n: usize) -> Result<Vec<String>> {
        self.titles(Domain::Songs, title, top_n)
    }

    pub fn recommend_blogs(&self, title: &str, top_n: usize) -> Result<Vec<String>> {
        self.titles(Domain::Blogs, title, top_n)
    }

    /// `(title, url)` pairs
    pub fn recommend_articles(&self, title: &str, top_n: usize) -> Result<Vec<(String, String)>> {
        self.links(Domain::Articles, title, top_n)
    }

    /// `(title, url)` pairs
    pub fn recommend_news(&self, title: &str, top_n: usize) -> Result<Vec<(String, String)>> {
        self.links(Domain::News, title, top_n)
    }

    fn titles(&self, domain: Domain, query: &str, top_n: usize) -> Result<Vec<String>> {
        Ok(self
            .recommend(domain, query, top_n)?
            .iter()
            .map(ToString::to_string)
            .collect())
    }

    fn links(&self, domain: Domain, query: &str, top_n: usize) -> Result<Vec<(String, String)>> {
        Ok(self
            .recommend(domain, query, top_n)?
            .into_iter()
            .map(|rec| match rec {
                Recommendation::Link { title, url } => (title, url),
                other => (other.to_string(), String::new()),
            })
            .collect())
    }
}

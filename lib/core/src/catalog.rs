use crate::{CatalogItem, Domain, Error, Result};
use ahash::AHashMap;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// How titles are compared by [`Catalog::find_by_title`]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TitleMatch {
    #[default]
    Exact,
    CaseInsensitive,
}

impl TitleMatch {
    #[inline]
    fn key(&self, title: &str) -> String {
        match self {
            TitleMatch::Exact => title.to_string(),
            TitleMatch::CaseInsensitive => title.to_lowercase(),
        }
    }
}

/// Immutable, ordered collection of content items for one domain.
///
/// Item ids are positions in load order. Title lookups resolve to the first
/// occurrence when the catalog holds duplicate titles.
#[derive(Debug, Clone)]
pub struct Catalog {
    domain: Domain,
    items: Vec<CatalogItem>,
    title_index: AHashMap<String, usize>,
    title_match: TitleMatch,
}

impl Catalog {
    pub fn new(domain: Domain, records: Vec<(String, Map<String, Value>)>, title_match: TitleMatch) -> Self {
        let mut items = Vec::with_capacity(records.len());
        let mut title_index = AHashMap::with_capacity(records.len());

        for (id, (title, metadata)) in records.into_iter().enumerate() {
            title_index.entry(title_match.key(&title)).or_insert(id);
            items.push(CatalogItem::new(id, title, metadata));
        }

        Self {
            domain,
            items,
            title_index,
            title_match,
        }
    }

    /// Catalog of bare titles with no metadata
    pub fn from_titles<I, S>(domain: Domain, titles: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let records = titles.into_iter().map(|t| (t.into(), Map::new())).collect();
        Self::new(domain, records, domain.default_title_match())
    }

    pub fn domain(&self) -> Domain {
        self.domain
    }

    pub fn title_match(&self) -> TitleMatch {
        self.title_match
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.items.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    pub fn get_by_id(&self, id: usize) -> Result<&CatalogItem> {
        self.items
            .get(id)
            .ok_or_else(|| Error::NotFound(format!("{} item #{id}", self.domain)))
    }

    pub fn find_by_title(&self, title: &str) -> Result<&CatalogItem> {
        self.title_index
            .get(&self.title_match.key(title))
            .map(|&id| &self.items[id])
            .ok_or_else(|| Error::NotFound(format!("{} title {title:?}", self.domain)))
    }

    pub fn iter(&self) -> std::slice::Iter<'_, CatalogItem> {
        self.items.iter()
    }

    pub fn items(&self) -> &[CatalogItem] {
        &self.items
    }

    /// Titles in catalog order, as offered by selection widgets
    pub fn titles(&self) -> impl Iterator<Item = &str> + '_ {
        self.items.iter().map(|item| item.title.as_str())
    }

    /// First item lacking a non-null `field`
    pub fn first_missing(&self, field: &str) -> Option<&CatalogItem> {
        self.items.iter().find(|item| item.field(field).is_none())
    }
}

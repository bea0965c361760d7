use crate::catalog::TitleMatch;
use crate::error::Error;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Content domain served by the engine. Each domain owns its own catalog
/// and never exchanges recommendations with another.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Domain {
    Books,
    Movies,
    Songs,
    Articles,
    Blogs,
    News,
}

/// How a domain represents the features of its catalog items
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FeatureKind {
    /// Sparse weighted-term vectors over a fitted vocabulary
    Text,
    /// Dense vectors of scaled numeric attributes
    Numeric,
    /// Precomputed all-pairs similarity matrix
    Matrix,
}

impl Domain {
    pub const ALL: [Domain; 6] = [
        Domain::Books,
        Domain::Movies,
        Domain::Songs,
        Domain::Articles,
        Domain::Blogs,
        Domain::News,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Domain::Books => "books",
            Domain::Movies => "movies",
            Domain::Songs => "songs",
            Domain::Articles => "articles",
            Domain::Blogs => "blogs",
            Domain::News => "news",
        }
    }

    pub fn feature_kind(&self) -> FeatureKind {
        match self {
            Domain::Movies => FeatureKind::Matrix,
            Domain::Songs => FeatureKind::Numeric,
            Domain::Books | Domain::Articles | Domain::Blogs | Domain::News => FeatureKind::Text,
        }
    }

    /// Metadata fields every catalog record of this domain must carry
    /// besides its title.
    pub fn required_fields(&self) -> &'static [&'static str] {
        match self {
            Domain::Articles | Domain::News => &["url"],
            Domain::Songs => &["artist"],
            Domain::Books | Domain::Movies | Domain::Blogs => &[],
        }
    }

    pub fn default_title_match(&self) -> TitleMatch {
        match self {
            Domain::Songs => TitleMatch::CaseInsensitive,
            _ => TitleMatch::Exact,
        }
    }
}

impl fmt::Display for Domain {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Domain {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Domain::ALL
            .into_iter()
            .find(|d| d.as_str().eq_ignore_ascii_case(s.trim()))
            .ok_or_else(|| Error::InvalidConfig(format!("unknown domain: {s}")))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_domain() {
        assert_eq!("books".parse::<Domain>().unwrap(), Domain::Books);
        assert_eq!(" News ".parse::<Domain>().unwrap(), Domain::News);
        assert!("podcasts".parse::<Domain>().is_err());
    }

    #[test]
    fn test_feature_kinds() {
        assert_eq!(Domain::Movies.feature_kind(), FeatureKind::Matrix);
        assert_eq!(Domain::Songs.feature_kind(), FeatureKind::Numeric);
        for domain in [Domain::Books, Domain::Articles, Domain::Blogs, Domain::News] {
            assert_eq!(domain.feature_kind(), FeatureKind::Text);
        }
    }

    #[test]
    fn test_serde_names() {
        let json = serde_json::to_string(&Domain::Articles).unwrap();
        assert_eq!(json, "\"articles\"");
        let back: Domain = serde_json::from_str("\"songs\"").unwrap();
        assert_eq!(back, Domain::Songs);
    }
}

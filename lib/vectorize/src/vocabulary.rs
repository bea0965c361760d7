//! Fitted term-weighting state produced by the offline pipeline.

use crate::tokenize::Tokenizer;
use serde::{Deserialize, Serialize};
use simrec_core::{Error, Result};
use std::collections::HashMap;

/// Row normalization applied after term weighting
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Norm {
    #[default]
    L2,
    L1,
    None,
}

/// Vocabulary → column mapping plus per-column inverse document frequency.
///
/// Loaded from an artifact and never refit; the flags reproduce the
/// tokenization the pipeline used when it vectorized the catalog.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct VocabularyModel {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub version: Option<String>,

    /// Term → column index
    pub vocabulary: HashMap<String, u32>,

    /// Inverse document frequency per column
    pub idf: Vec<f32>,

    #[serde(default = "default_lowercase")]
    pub lowercase: bool,

    #[serde(default)]
    pub stop_words: Vec<String>,

    #[serde(default = "default_ngram_range")]
    pub ngram_range: (usize, usize),

    /// Use `1 + ln(tf)` instead of raw counts
    #[serde(default)]
    pub sublinear_tf: bool,

    #[serde(default)]
    pub norm: Norm,

    #[serde(default = "default_min_token_len")]
    pub min_token_len: usize,
}

fn default_lowercase() -> bool {
    true
}

fn default_ngram_range() -> (usize, usize) {
    (1, 1)
}

fn default_min_token_len() -> usize {
    2
}

impl VocabularyModel {
    /// Model with default tokenization flags
    pub fn new(vocabulary: HashMap<String, u32>, idf: Vec<f32>) -> Self {
        Self {
            version: None,
            vocabulary,
            idf,
            lowercase: default_lowercase(),
            stop_words: Vec::new(),
            ngram_range: default_ngram_range(),
            sublinear_tf: false,
            norm: Norm::default(),
            min_token_len: default_min_token_len(),
        }
    }

    /// Number of columns in the feature space
    #[inline]
    pub fn dim(&self) -> usize {
        self.idf.len()
    }

    pub fn validate(&self) -> Result<()> {
        if self.vocabulary.is_empty() {
            return Err(Error::InvalidConfig("vocabulary is empty".into()));
        }
        if let Some((term, col)) = self
            .vocabulary
            .iter()
            .find(|(_, &col)| col as usize >= self.idf.len())
        {
            return Err(Error::InvalidConfig(format!(
                "vocabulary term {term:?} maps to column {col} but only {} idf weights exist",
                self.idf.len()
            )));
        }
        if let Some(pos) = self.idf.iter().position(|w| !w.is_finite()) {
            return Err(Error::InvalidConfig(format!("idf weight #{pos} is not finite")));
        }
        let (min_n, max_n) = self.ngram_range;
        if min_n == 0 || min_n > max_n {
            return Err(Error::InvalidConfig(format!(
                "invalid ngram range ({min_n}, {max_n})"
            )));
        }
        Ok(())
    }

    pub fn tokenizer(&self) -> Tokenizer {
        Tokenizer::new()
            .with_lowercase(self.lowercase)
            .with_min_len(self.min_token_len)
            .with_stop_words(&self.stop_words)
            .with_ngram_range(self.ngram_range.0, self.ngram_range.1)
    }

    #[inline]
    pub fn column(&self, term: &str) -> Option<u32> {
        self.vocabulary.get(term).copied()
    }

    #[inline]
    pub fn idf(&self, column: u32) -> f32 {
        self.idf.get(column as usize).copied().unwrap_or(0.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_deserialize_with_defaults() {
        let json = r#"{"vocabulary": {"rust": 0, "book": 1}, "idf": [1.5, 1.0]}"#;
        let model: VocabularyModel = serde_json::from_str(json).unwrap();
        assert_eq!(model.dim(), 2);
        assert!(model.lowercase);
        assert_eq!(model.norm, Norm::L2);
        assert_eq!(model.ngram_range, (1, 1));
        assert_eq!(model.column("rust"), Some(0));
        assert!(model.validate().is_ok());
    }

    #[test]
    fn test_validate_rejects_out_of_range_column() {
        let model = VocabularyModel::new(HashMap::from([("x".to_string(), 3)]), vec![1.0]);
        assert!(model.validate().is_err());
    }

    #[test]
    fn test_validate_rejects_bad_ngram_range() {
        let mut model = VocabularyModel::new(HashMap::from([("x".to_string(), 0)]), vec![1.0]);
        model.ngram_range = (2, 1);
        assert!(model.validate().is_err());
        model.ngram_range = (1, 2);
        assert!(model.validate().is_ok());
    }
}

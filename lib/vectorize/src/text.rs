use crate::tokenize::Tokenizer;
use crate::vocabulary::{Norm, VocabularyModel};
use crate::Vectorizer;
use ahash::AHashMap;
use simrec_core::{FeatureVector, Result, SparseVector};

/// Maps raw strings into the sparse TF-IDF space of a fitted vocabulary.
///
/// Terms outside the vocabulary carry no weight; a string made only of
/// unknown terms becomes the zero vector.
#[derive(Debug, Clone)]
pub struct TextAdapter {
    model: VocabularyModel,
    tokenizer: Tokenizer,
}

impl TextAdapter {
    pub fn new(model: VocabularyModel) -> Result<Self> {
        model.validate()?;
        let tokenizer = model.tokenizer();
        Ok(Self { model, tokenizer })
    }

    pub fn model(&self) -> &VocabularyModel {
        &self.model
    }

    pub fn vectorize(&self, text: &str) -> SparseVector {
        let mut counts: AHashMap<u32, f32> = AHashMap::new();
        for token in self.tokenizer.tokenize(text) {
            if let Some(col) = self.model.column(&token) {
                *counts.entry(col).or_insert(0.0) += 1.0;
            }
        }

        let weighted = counts
            .into_iter()
            .map(|(col, tf)| {
                let tf = if self.model.sublinear_tf { 1.0 + tf.ln() } else { tf };
                (col, tf * self.model.idf(col))
            })
            .collect();
        let mut vector = SparseVector::from_pairs(weighted);

        match self.model.norm {
            Norm::L2 => vector.normalize(),
            Norm::L1 => {
                let total: f32 = vector.values().iter().map(|v| v.abs()).sum();
                if total > f32::EPSILON {
                    let scaled = vector.iter().map(|(i, v)| (i, v / total)).collect();
                    vector = SparseVector::from_pairs(scaled);
                }
            }
            Norm::None => {}
        }
        vector
    }
}

impl Vectorizer for TextAdapter {
    type Input = str;

    fn dim(&self) -> usize {
        self.model.dim()
    }

    fn transform(&self, input: &str) -> Result<FeatureVector> {
        Ok(FeatureVector::Sparse(self.vectorize(input)))
    }
}

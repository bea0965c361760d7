use crate::scaling::ScalingModel;
use crate::Vectorizer;
use simrec_core::{CatalogItem, Error, FeatureVector, Result, Vector};

/// Audio attributes song vectors are built from, in column order.
pub const AUDIO_FEATURES: [&str; 11] = [
    "danceability",
    "energy",
    "key",
    "loudness",
    "mode",
    "speechiness",
    "acousticness",
    "instrumentalness",
    "liveness",
    "valence",
    "tempo",
];

/// Builds dense vectors from an item's numeric metadata and a fitted scaler.
#[derive(Debug, Clone)]
pub struct NumericAdapter {
    features: Vec<String>,
    scaler: ScalingModel,
}

impl NumericAdapter {
    /// Attribute names come from the scaler when it lists them, otherwise
    /// [`AUDIO_FEATURES`] is assumed.
    pub fn new(scaler: ScalingModel) -> Result<Self> {
        scaler.validate()?;
        let features: Vec<String> = if scaler.features.is_empty() {
            AUDIO_FEATURES.iter().map(|f| f.to_string()).collect()
        } else {
            scaler.features.clone()
        };
        if features.len() != scaler.dim() {
            return Err(Error::InvalidDimension {
                expected: features.len(),
                actual: scaler.dim(),
            });
        }
        Ok(Self { features, scaler })
    }

    pub fn features(&self) -> &[String] {
        &self.features
    }

    pub fn scaler(&self) -> &ScalingModel {
        &self.scaler
    }

    /// Unscaled attribute row of `item`
    pub fn raw_attributes(&self, item: &CatalogItem) -> Result<Vec<f64>> {
        self.features
            .iter()
            .map(|feature| {
                item.numeric_field(feature)
                    .ok_or_else(|| Error::MissingFeature {
                        item: item.title.clone(),
                        feature: feature.clone(),
                    })
            })
            .collect()
    }
}

impl Vectorizer for NumericAdapter {
    type Input = CatalogItem;

    fn dim(&self) -> usize {
        self.features.len()
    }

    fn transform(&self, item: &CatalogItem) -> Result<FeatureVector> {
        let raw = self.raw_attributes(item)?;
        let scaled = self.scaler.transform(&raw)?;
        Ok(FeatureVector::Dense(Vector::new(scaled)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn song(attrs: serde_json::Value) -> CatalogItem {
        CatalogItem::new(3, "Roxanne", attrs.as_object().cloned().unwrap_or_default())
    }

    fn full_attrs() -> serde_json::Value {
        json!({
            "artist": "The Police",
            "danceability": 0.6, "energy": 0.8, "key": 7, "loudness": -6.0,
            "mode": 1, "speechiness": 0.05, "acousticness": "0.1",
            "instrumentalness": 0.0, "liveness": 0.2, "valence": 0.7, "tempo": 134.0
        })
    }

    #[test]
    fn test_default_audio_features() {
        let scaler = ScalingModel::standard(vec![0.0; 11], vec![1.0; 11]);
        let adapter = NumericAdapter::new(scaler).unwrap();
        assert_eq!(adapter.features().len(), 11);

        let v = adapter.transform(&song(full_attrs())).unwrap();
        match v {
            FeatureVector::Dense(v) => {
                assert_eq!(v.dim(), 11);
                assert_eq!(v.as_slice()[2], 7.0);
                assert_eq!(v.as_slice()[10], 134.0);
            }
            FeatureVector::Sparse(_) => panic!("expected dense vector"),
        }
    }

    #[test]
    fn test_missing_feature() {
        let scaler = ScalingModel::standard(vec![0.0; 11], vec![1.0; 11]);
        let adapter = NumericAdapter::new(scaler).unwrap();
        let mut attrs = full_attrs();
        attrs["valence"] = json!("n/a");

        let err = adapter.transform(&song(attrs)).unwrap_err();
        match err {
            Error::MissingFeature { item, feature } => {
                assert_eq!(item, "Roxanne");
                assert_eq!(feature, "valence");
            }
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn test_named_features_and_mismatch() {
        let scaler = ScalingModel::min_max(vec![0.0, 0.0], vec![1.0, 200.0]).with_features(["energy", "tempo"]);
        let adapter = NumericAdapter::new(scaler).unwrap();
        let v = adapter.transform(&song(full_attrs())).unwrap();
        assert_eq!(v.dim_hint(), 2);

        let short = ScalingModel::standard(vec![0.0; 3], vec![1.0; 3]);
        assert!(NumericAdapter::new(short).is_err());
    }
}

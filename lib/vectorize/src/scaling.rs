use serde::{Deserialize, Serialize};
use simrec_core::{Error, Result};

/// Fitted per-feature normalization parameters
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum ScalingParams {
    /// `(x - mean) / scale`
    Standard { mean: Vec<f64>, scale: Vec<f64> },
    /// `(x - min) / (max - min)` mapped onto `feature_range`
    MinMax {
        data_min: Vec<f64>,
        data_max: Vec<f64>,
        #[serde(default = "default_feature_range")]
        feature_range: (f64, f64),
    },
}

fn default_feature_range() -> (f64, f64) {
    (0.0, 1.0)
}

/// Scaling artifact: parameters plus the ordered attribute names they were fit on.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScalingModel {
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub features: Vec<String>,
    #[serde(flatten)]
    pub params: ScalingParams,
}

impl ScalingModel {
    pub fn standard(mean: Vec<f64>, scale: Vec<f64>) -> Self {
        Self {
            features: Vec::new(),
            params: ScalingParams::Standard { mean, scale },
        }
    }

    pub fn min_max(data_min: Vec<f64>, data_max: Vec<f64>) -> Self {
        Self {
            features: Vec::new(),
            params: ScalingParams::MinMax {
                data_min,
                data_max,
                feature_range: default_feature_range(),
            },
        }
    }

    #[must_use]
    pub fn with_features<I, S>(mut self, features: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.features = features.into_iter().map(Into::into).collect();
        self
    }

    pub fn dim(&self) -> usize {
        match &self.params {
            ScalingParams::Standard { mean, .. } => mean.len(),
            ScalingParams::MinMax { data_min, .. } => data_min.len(),
        }
    }

    pub fn validate(&self) -> Result<()> {
        let (a, b) = match &self.params {
            ScalingParams::Standard { mean, scale } => (mean, scale),
            ScalingParams::MinMax { data_min, data_max, .. } => (data_min, data_max),
        };
        if a.is_empty() || a.len() != b.len() {
            return Err(Error::InvalidConfig(format!(
                "scaler parameter lengths differ or are empty ({} vs {})",
                a.len(),
                b.len()
            )));
        }
        if a.iter().chain(b.iter()).any(|v| !v.is_finite()) {
            return Err(Error::InvalidConfig("scaler parameters must be finite".into()));
        }
        if !self.features.is_empty() && self.features.len() != a.len() {
            return Err(Error::InvalidConfig(format!(
                "scaler names {} features but has {} parameters",
                self.features.len(),
                a.len()
            )));
        }
        Ok(())
    }

    /// Scale one raw attribute row. Constant features (zero scale or range)
    /// are divided by 1 instead.
    pub fn transform(&self, raw: &[f64]) -> Result<Vec<f32>> {
        if raw.len() != self.dim() {
            return Err(Error::InvalidDimension {
                expected: self.dim(),
                actual: raw.len(),
            });
        }

        let scaled = match &self.params {
            ScalingParams::Standard { mean, scale } => raw
                .iter()
                .zip(mean.iter().zip(scale.iter()))
                .map(|(x, (m, s))| (x - m) / non_zero(*s))
                .collect::<Vec<f64>>(),
            ScalingParams::MinMax {
                data_min,
                data_max,
                feature_range: (lo, hi),
            } => raw
                .iter()
                .zip(data_min.iter().zip(data_max.iter()))
                .map(|(x, (min, max))| (x - min) / non_zero(max - min) * (hi - lo) + lo)
                .collect(),
        };
        Ok(scaled.into_iter().map(|v| v as f32).collect())
    }
}

#[inline]
fn non_zero(v: f64) -> f64 {
    if v.abs() < f64::EPSILON {
        1.0
    } else {
        v
    }
}

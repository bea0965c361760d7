use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// One content entity of a catalog. `id` is its position in load order.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CatalogItem {
    pub id: usize,
    pub title: String,
    /// Domain-specific fields (`url`, `artist`, audio attributes, ...)
    #[serde(default)]
    pub metadata: Map<String, Value>,
}

impl CatalogItem {
    #[inline]
    #[must_use]
    pub fn new(id: usize, title: impl Into<String>, metadata: Map<String, Value>) -> Self {
        Self {
            id,
            title: title.into(),
            metadata,
        }
    }

    #[inline]
    pub fn field(&self, name: &str) -> Option<&Value> {
        self.metadata.get(name).filter(|v| !v.is_null())
    }

    /// String field; numbers and booleans are not coerced.
    #[inline]
    pub fn text_field(&self, name: &str) -> Option<&str> {
        self.field(name).and_then(Value::as_str)
    }

    /// Numeric field. Numeric strings such as `"0.73"` are accepted since
    /// tabular exports frequently quote them.
    pub fn numeric_field(&self, name: &str) -> Option<f64> {
        match self.field(name)? {
            Value::Number(n) => n.as_f64(),
            Value::String(s) => s.trim().parse::<f64>().ok(),
            _ => None,
        }
        .filter(|v| v.is_finite())
    }

    pub fn url(&self) -> Option<&str> {
        self.text_field("url")
    }

    pub fn artist(&self) -> Option<&str> {
        self.text_field("artist")
    }
}

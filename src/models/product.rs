use serde::{Deserialize, Serialize};

/// A product entry as written in the configuration file.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ProductEntry {
    #[serde(default)]
    pub label: Option<String>,
    pub url: String,
}

/// A tracked product page. The URL is the identity used by the status store.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Product {
    pub label: String,
    pub url: String,
}

impl Product {
    pub fn new(label: impl Into<String>, url: impl Into<String>) -> Self {
        Self {
            label: label.into(),
            url: url.into(),
        }
    }
}

impl From<ProductEntry> for Product {
    fn from(entry: ProductEntry) -> Self {
        // Missing or blank labels fall back to the URL
        let label = entry
            .label
            .filter(|label| !label.trim().is_empty())
            .unwrap_or_else(|| entry.url.clone());

        Self {
            label,
            url: entry.url,
        }
    }
}

use serde::{Deserialize, Serialize};

use super::{Product, StatusLabel};

/// A product that moved into an actionable status during this run.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct ChangeEvent {
    pub label: String,
    pub url: String,
    pub status: StatusLabel,
}

impl ChangeEvent {
    pub fn new(product: &Product, status: StatusLabel) -> Self {
        Self {
            label: product.label.clone(),
            url: product.url.clone(),
            status,
        }
    }
}

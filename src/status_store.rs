//! Last observed status per product URL, persisted as a flat JSON object.
//!
//! ```json
//! {
//!   "https://shop.example.com/p/booster-box": "in_stock",
//!   "https://shop.example.com/p/elite-trainer-box": "unknown"
//! }
//! ```
//!
//! Entries are never pruned: URLs dropped from the configuration keep their
//! last status until the file is edited by hand. Values that are not a known
//! label are written back unchanged until their URL is observed again.

use std::collections::BTreeMap;
use std::path::Path;

use serde_json::Value;
use tokio::io::AsyncWriteExt;

use crate::Result;
use crate::models::StatusLabel;

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct StatusStore {
    entries: BTreeMap<String, StatusLabel>,
    unrecognized: BTreeMap<String, Value>,
}

impl StatusStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Previous status for a URL, `None` if it has never been observed
    /// or its stored value is not a known label.
    pub fn get(&self, url: &str) -> Option<StatusLabel> {
        self.entries.get(url).copied()
    }

    /// Overwrite the status for a URL, returning the one it replaced.
    pub fn record(&mut self, url: &str, status: StatusLabel) -> Option<StatusLabel> {
        self.unrecognized.remove(url);
        self.entries.insert(url.to_string(), status)
    }

    /// Number of URLs holding a known label.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Parse a persisted store. Values that are not a known label read as
    /// "never observed" but are kept for the next save.
    pub fn from_json_slice(bytes: &[u8]) -> Result<Self> {
        let raw: BTreeMap<String, Value> = serde_json::from_slice(bytes)?;
        let mut store = Self::new();

        for (url, value) in raw {
            match value.as_str().map(str::parse::<StatusLabel>) {
                Some(Ok(status)) => {
                    store.entries.insert(url, status);
                }
                _ => {
                    tracing::warn!("Ignoring stored status {} for {}: not a known label", value, url);
                    store.unrecognized.insert(url, value);
                }
            }
        }

        Ok(store)
    }

    /// Flat URL -> value object, known labels and kept unknown values together.
    pub fn to_json_value(&self) -> Value {
        let mut map = serde_json::Map::new();
        for (url, value) in &self.unrecognized {
            map.insert(url.clone(), value.clone());
        }
        for (url, status) in &self.entries {
            map.insert(url.clone(), Value::String(status.as_str().to_string()));
        }
        Value::Object(map)
    }

    /// Load the store, treating a missing file as an empty store.
    pub async fn load(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        match tokio::fs::read(path).await {
            Ok(bytes) => {
                let store = Self::from_json_slice(&bytes)?;
                tracing::debug!("Loaded {} stored statuses from {}", store.len(), path.display());
                Ok(store)
            }
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                tracing::info!("No status file at {}, starting fresh", path.display());
                Ok(Self::new())
            }
            Err(e) => Err(e.into()),
        }
    }

    /// Write the store as pretty JSON, replacing the previous file.
    pub async fn save(&self, path: impl AsRef<Path>) -> Result<()> {
        let path = path.as_ref();
        if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
            tokio::fs::create_dir_all(parent).await?;
        }

        let bytes = serde_json::to_vec_pretty(&self.to_json_value())?;

        // Write to a sibling temp file, then rename it into place
        let tmp = path.with_extension("tmp");
        let mut file = tokio::fs::File::create(&tmp).await?;
        file.write_all(&bytes).await?;
        file.flush().await?;
        drop(file);

        tokio::fs::rename(&tmp, path).await?;
        tracing::debug!("Saved {} statuses to {}", self.len(), path.display());
        Ok(())
    }
}

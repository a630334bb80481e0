use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

pub mod change_event;
pub mod product;

// Re-exports for convenience
pub use change_event::*;
pub use product::*;

/// Availability of a product page as observed on a single fetch.
///
/// The "never observed" state is not a variant: store lookups return
/// `Option<StatusLabel>` and `None` compares unequal to every label.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "snake_case")]
pub enum StatusLabel {
    InStock,
    Anticipated,
    OutOfStock,
    Unknown,
}

impl StatusLabel {
    pub const ALL: [StatusLabel; 4] = [
        StatusLabel::InStock,
        StatusLabel::Anticipated,
        StatusLabel::OutOfStock,
        StatusLabel::Unknown,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            StatusLabel::InStock => "in_stock",
            StatusLabel::Anticipated => "anticipated",
            StatusLabel::OutOfStock => "out_of_stock",
            StatusLabel::Unknown => "unknown",
        }
    }

    /// Whether moving into this status warrants an alert.
    pub fn is_actionable(&self) -> bool {
        matches!(self, StatusLabel::InStock | StatusLabel::Anticipated)
    }
}

impl fmt::Display for StatusLabel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for StatusLabel {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        StatusLabel::ALL
            .into_iter()
            .find(|label| label.as_str() == s)
            .ok_or_else(|| format!("unrecognised status label '{}'", s))
    }
}

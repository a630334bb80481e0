use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use crate::models::ChangeEvent;

pub mod email;

pub use email::{EmailConfig, EmailNotifier};

/// One message covering every change found in a run.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Alert {
    pub subject: String,
    pub body: String,
}

impl Alert {
    /// Returns `None` when there is nothing to report.
    pub fn from_events(events: &[ChangeEvent]) -> Option<Self> {
        if events.is_empty() {
            return None;
        }

        let subject = format!("Pokemon stock alert: {} change(s)", events.len());
        let body = events
            .iter()
            .map(|event| format!("{}\n{}\nStatus: {}\n", event.label, event.url, event.status))
            .collect::<Vec<_>>()
            .join("\n");

        Some(Alert { subject, body })
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct NotificationResult {
    pub success: bool,
    pub message_id: Option<String>,
    pub error: Option<String>,
}

impl NotificationResult {
    pub fn sent(message_id: Option<String>) -> Self {
        NotificationResult {
            success: true,
            message_id,
            error: None,
        }
    }

    pub fn failed(error: impl Into<String>) -> Self {
        NotificationResult {
            success: false,
            message_id: None,
            error: Some(error.into()),
        }
    }
}

/// Delivery channel for alerts.
///
/// Implementations report failures through [`NotificationResult`] instead of
/// returning an error, so a failed delivery never aborts a run.
#[async_trait]
pub trait Notifier: Send + Sync {
    fn name(&self) -> &str;

    async fn notify(&self, alert: &Alert) -> NotificationResult;
}

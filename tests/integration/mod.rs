// Integration tests for Restock Watcher
// These run the real HTTP fetcher against a local mock server

pub mod fetcher_tests;
pub mod watch_run_tests;

use async_trait::async_trait;
use std::sync::{Arc, Mutex};
use std::time::Duration;

use restock_watcher::config::ScraperConfig;
use restock_watcher::notifier::{Alert, NotificationResult, Notifier};
use restock_watcher::{HttpFetcher, Runner};

/// Scraper settings with short timeouts and matcher-friendly headers
pub fn get_test_scraper_config() -> ScraperConfig {
    ScraperConfig {
        request_timeout: 2,
        delay_ms: 0,
        user_agent: "restock-watcher-test".to_string(),
        accept_language: "en-GB".to_string(),
    }
}

/// Keeps every alert it is handed
#[derive(Clone, Default)]
pub struct RecordingNotifier {
    pub alerts: Arc<Mutex<Vec<Alert>>>,
}

impl RecordingNotifier {
    pub fn sent(&self) -> Vec<Alert> {
        self.alerts.lock().unwrap().clone()
    }
}

#[async_trait]
impl Notifier for RecordingNotifier {
    fn name(&self) -> &str {
        "recording"
    }

    async fn notify(&self, alert: &Alert) -> NotificationResult {
        self.alerts.lock().unwrap().push(alert.clone());
        NotificationResult::sent(Some("250 OK".to_string()))
    }
}

pub fn create_test_runner(notifier: &RecordingNotifier) -> anyhow::Result<Runner> {
    let fetcher = HttpFetcher::new(&get_test_scraper_config())?;
    Ok(Runner::new(Box::new(fetcher), Box::new(notifier.clone()), Duration::ZERO))
}

use serde::{Deserialize, Serialize};
use std::path::Path;
use std::time::Duration;

use crate::Result;
use crate::change_detector::detect;
use crate::classifier::AvailabilityClassifier;
use crate::fetcher::PageFetcher;
use crate::models::{ChangeEvent, Product, StatusLabel};
use crate::notifier::{Alert, NotificationResult, Notifier};
use crate::status_store::StatusStore;

pub type PageFetcherBox = Box<dyn PageFetcher>;
pub type NotifierBox = Box<dyn Notifier>;

#[derive(Debug, Clone, Copy, Default)]
pub struct RunOptions {
    /// Classify and report, but neither notify nor write state.
    pub dry_run: bool,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProductCheck {
    pub product: Product,
    pub status: StatusLabel,
    pub previous: Option<StatusLabel>,
    pub fetched: bool,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RunReport {
    pub checks: Vec<ProductCheck>,
    pub products_checked: usize,
    pub fetch_failures: usize,
    pub events: Vec<ChangeEvent>,
    pub notification: Option<NotificationResult>,
    pub state_saved: bool,
}

impl RunReport {
    pub fn has_changes(&self) -> bool {
        !self.events.is_empty()
    }
}

/// Drives one pass over the configured products.
pub struct Runner {
    fetcher: PageFetcherBox,
    notifier: Option<NotifierBox>,
    classifier: AvailabilityClassifier,
    delay: Duration,
}

impl Runner {
    pub fn new(fetcher: PageFetcherBox, notifier: NotifierBox, delay: Duration) -> Self {
        Self {
            fetcher,
            notifier: Some(notifier),
            classifier: AvailabilityClassifier::new(),
            delay,
        }
    }

    /// A runner that only fetches and classifies. Runs still record state,
    /// but changes are logged instead of delivered.
    pub fn without_notifier(fetcher: PageFetcherBox, delay: Duration) -> Self {
        Self {
            fetcher,
            notifier: None,
            classifier: AvailabilityClassifier::new(),
            delay,
        }
    }

    /// Fetch a page, logging and swallowing any failure.
    async fn fetch_document(&self, url: &str) -> Option<String> {
        match self.fetcher.fetch(url).await {
            Ok(html) => Some(html),
            Err(e) => {
                tracing::warn!("Error fetching {}: {}", url, e);
                None
            }
        }
    }

    /// Classify a single URL without touching any stored state.
    pub async fn check_url(&self, url: &str) -> StatusLabel {
        let html = self.fetch_document(url).await;
        self.classifier.classify(html.as_deref())
    }

    /// Check every product in order, recording each status in `store`.
    /// Returns the per-product results and the change events they produced.
    pub async fn check_products(
        &self,
        products: &[Product],
        store: &mut StatusStore,
    ) -> (Vec<ProductCheck>, Vec<ChangeEvent>) {
        let mut checks = Vec::with_capacity(products.len());
        let mut events = Vec::new();

        for (index, product) in products.iter().enumerate() {
            if index > 0 && !self.delay.is_zero() {
                tracing::debug!("Waiting {:?} before next product", self.delay);
                tokio::time::sleep(self.delay).await;
            }

            tracing::info!("Checking: {} {}", product.label, product.url);
            let html = self.fetch_document(&product.url).await;
            let status = self.classifier.classify(html.as_deref());
            let previous = store.get(&product.url);
            tracing::info!(" -> status: {}, previous: {}", status, previous.map_or("none", |p| p.as_str()));

            if let Some(event) = detect(product, status, store) {
                events.push(event);
            }

            checks.push(ProductCheck {
                product: product.clone(),
                status,
                previous,
                fetched: html.is_some(),
            });
        }

        (checks, events)
    }

    /// Load state, check all products, alert once on changes, then persist state.
    pub async fn run(
        &self,
        products: &[Product],
        state_path: impl AsRef<Path>,
        options: RunOptions,
    ) -> Result<RunReport> {
        let state_path = state_path.as_ref();
        let mut store = StatusStore::load(state_path).await?;

        let (checks, events) = self.check_products(products, &mut store).await;
        let fetch_failures = checks.iter().filter(|check| !check.fetched).count();

        let notification = match Alert::from_events(&events) {
            None => {
                tracing::info!("No changes requiring alert.");
                None
            }
            Some(_) if options.dry_run => {
                tracing::info!("Dry run: not notifying about {} change(s)", events.len());
                None
            }
            Some(alert) => match &self.notifier {
                None => {
                    tracing::warn!("No notifier configured, {} change(s) not delivered", events.len());
                    None
                }
                Some(notifier) => {
                    let result = notifier.notify(&alert).await;
                    if !result.success {
                        tracing::warn!(
                            "Notification via {} failed: {}",
                            notifier.name(),
                            result.error.as_deref().unwrap_or("unknown error")
                        );
                    }
                    Some(result)
                }
            },
        };

        let state_saved = if options.dry_run {
            false
        } else {
            store.save(state_path).await?;
            true
        };

        Ok(RunReport {
            products_checked: checks.len(),
            checks,
            fetch_failures,
            events,
            notification,
            state_saved,
        })
    }
}

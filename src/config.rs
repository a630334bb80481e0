use config::{Config, ConfigError, Environment, File, FileFormat};
use serde::{Deserialize, Serialize};
use std::path::Path;
use url::Url;

use crate::models::{Product, ProductEntry};

pub const DEFAULT_SMTP_SERVER: &str = "smtp.office365.com";
pub const DEFAULT_SMTP_PORT: u16 = 587;
pub const DEFAULT_REQUEST_TIMEOUT_SECS: u64 = 20;
pub const DEFAULT_DELAY_MS: u64 = 1500;
pub const DEFAULT_USER_AGENT: &str = "Mozilla/5.0 (Windows NT 10.0; Win64; x64) \
     AppleWebKit/537.36 (KHTML, like Gecko) Chrome/116.0 Safari/537.36";
pub const DEFAULT_ACCEPT_LANGUAGE: &str = "en-US,en;q=0.9";

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AppConfig {
    pub watch: WatchConfig,
    pub scraper: ScraperConfig,
    pub smtp: SmtpSettings,
}

/// Contents of the product file.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct WatchConfig {
    #[serde(default)]
    pub products: Vec<ProductEntry>,
    #[serde(default)]
    pub recipient_email: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ScraperConfig {
    pub request_timeout: u64,
    pub delay_ms: u64,
    pub user_agent: String,
    pub accept_language: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SmtpSettings {
    pub smtp_server: String,
    pub smtp_port: u16,
    #[serde(default)]
    pub email_address: Option<String>,
    #[serde(default)]
    pub email_password: Option<String>,
    #[serde(default)]
    pub recipient_email: Option<String>,
}

/// Blank variables behave as unset, so the defaults still apply.
fn non_blank(vars: config::Map<String, String>) -> config::Map<String, String> {
    vars.into_iter()
        .filter(|(_, value)| !value.trim().is_empty())
        .collect()
}

impl AppConfig {
    /// Load the product file and overlay settings from the environment.
    pub fn load(config_path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        Ok(AppConfig {
            watch: WatchConfig::load(config_path)?,
            scraper: ScraperConfig::from_env()?,
            smtp: SmtpSettings::from_env()?,
        })
    }

    /// Who receives alerts: explicit override, then the product file, then the sender.
    pub fn recipient(&self) -> Option<String> {
        self.smtp.recipient(self.watch.recipient_email.as_deref())
    }
}

impl WatchConfig {
    pub fn load(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let s = Config::builder()
            .add_source(File::from(path.as_ref()).format(FileFormat::Json).required(true))
            .build()?;

        let config: WatchConfig = s.try_deserialize()?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        for (index, entry) in self.products.iter().enumerate() {
            if entry.url.trim().is_empty() {
                return Err(ConfigError::Message(format!("Product {} has an empty url", index)));
            }

            // Unparseable URLs are kept; their fetch fails and reports unknown
            if Url::parse(&entry.url).is_err() {
                tracing::warn!("Product {} has an invalid URL: {}", index, entry.url);
            }
        }

        Ok(())
    }

    /// Configured products in file order.
    pub fn products(&self) -> Vec<Product> {
        self.products.iter().cloned().map(Product::from).collect()
    }
}

impl Default for ScraperConfig {
    fn default() -> Self {
        ScraperConfig {
            request_timeout: DEFAULT_REQUEST_TIMEOUT_SECS,
            delay_ms: DEFAULT_DELAY_MS,
            user_agent: DEFAULT_USER_AGENT.to_string(),
            accept_language: DEFAULT_ACCEPT_LANGUAGE.to_string(),
        }
    }
}

impl ScraperConfig {
    /// Defaults overridden by `WATCHER_*` variables, e.g. `WATCHER_DELAY_MS=3000`.
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_source(std::env::vars().collect())
    }

    pub fn from_source(vars: config::Map<String, String>) -> Result<Self, ConfigError> {
        Self::from_environment(Environment::with_prefix("WATCHER").source(Some(non_blank(vars))))
    }

    fn from_environment(environment: Environment) -> Result<Self, ConfigError> {
        let defaults = ScraperConfig::default();
        let s = Config::builder()
            .set_default("request_timeout", defaults.request_timeout as i64)?
            .set_default("delay_ms", defaults.delay_ms as i64)?
            .set_default("user_agent", defaults.user_agent)?
            .set_default("accept_language", defaults.accept_language)?
            .add_source(environment)
            .build()?;

        let config: ScraperConfig = s.try_deserialize()?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.request_timeout == 0 {
            return Err(ConfigError::Message("Scraper request_timeout must be greater than 0".into()));
        }

        if self.user_agent.trim().is_empty() {
            return Err(ConfigError::Message("Scraper user_agent must not be empty".into()));
        }

        Ok(())
    }
}

impl SmtpSettings {
    /// Read `SMTP_SERVER`, `SMTP_PORT`, `EMAIL_ADDRESS`, `EMAIL_PASSWORD` and
    /// `RECIPIENT_EMAIL` from the process environment.
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_source(std::env::vars().collect())
    }

    pub fn from_source(vars: config::Map<String, String>) -> Result<Self, ConfigError> {
        Self::from_environment(Environment::default().source(Some(non_blank(vars))))
    }

    fn from_environment(environment: Environment) -> Result<Self, ConfigError> {
        let s = Config::builder()
            .set_default("smtp_server", DEFAULT_SMTP_SERVER)?
            .set_default("smtp_port", i64::from(DEFAULT_SMTP_PORT))?
            .add_source(environment)
            .build()?;

        let settings: SmtpSettings = s.try_deserialize()?;
        settings.validate()?;
        Ok(settings)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.smtp_port == 0 {
            return Err(ConfigError::Message("SMTP port must be greater than 0".into()));
        }

        if self.smtp_server.trim().is_empty() {
            return Err(ConfigError::Message("SMTP server must not be empty".into()));
        }

        Ok(())
    }

    pub fn recipient(&self, configured: Option<&str>) -> Option<String> {
        self.recipient_email
            .clone()
            .or_else(|| configured.filter(|r| !r.trim().is_empty()).map(str::to_string))
            .or_else(|| self.email_address.clone())
    }
}

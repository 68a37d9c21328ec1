use config::{Config, ConfigError, Environment, File};
use serde::{Deserialize, Serialize};
use std::env;
use url::Url;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AppConfig {
    pub shopify: ShopifyConfig,
    pub scraper: ScraperConfig,
    pub reconciler: ReconcilerConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ShopifyConfig {
    /// Store root, e.g. "https://shop.example.com".
    pub base_url: String,
    pub access_token: String,
    pub api_version: String,
    /// Products per catalog page; the Admin API caps this at 250.
    pub page_size: u32,
    pub request_timeout_secs: u64,
    /// Disable only for stores behind self-signed certificates.
    pub verify_tls: bool,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ScraperConfig {
    /// Search endpoint; the SKU is appended as the query string.
    pub search_url: String,
    pub user_agent: String,
    pub chrome_path: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ReconcilerConfig {
    /// Manufacturer filter selecting which products this job manages.
    pub vendor: String,
    /// Relative-difference cutoff above which a price correction is written.
    pub price_threshold: f64,
    /// Compute and log updates without issuing any write.
    pub dry_run: bool,
    /// Pause after every processed SKU, throttling the storefront.
    pub inter_request_delay_ms: u64,
    /// Emit an explicit record for SKUs the storefront lookup cannot find.
    pub record_not_found: bool,
}

impl AppConfig {
    pub fn from_env() -> Result<Self, ConfigError> {
        let s = Config::builder()
            .set_default("shopify.base_url", "")?
            .set_default("shopify.access_token", "")?
            .set_default("shopify.api_version", "2025-04")?
            .set_default("shopify.page_size", 250_i64)?
            .set_default("shopify.request_timeout_secs", 30_i64)?
            .set_default("shopify.verify_tls", true)?
            .set_default("scraper.search_url", "")?
            .set_default("scraper.user_agent", "ShopifyPriceSync/0.1")?
            .set_default("reconciler.vendor", "")?
            .set_default("reconciler.price_threshold", 0.05)?
            .set_default("reconciler.dry_run", false)?
            .set_default("reconciler.inter_request_delay_ms", 10_000_i64)?
            .set_default("reconciler.record_not_found", true)?
            // Optional file configuration
            .add_source(File::with_name("config/default").required(false))
            // Local overrides (ignored by git)
            .add_source(File::with_name("config/local").required(false))
            // Environment variables with prefix "PRICESYNC_"
            .add_source(
                Environment::with_prefix("PRICESYNC")
                    .separator("__")
                    .try_parsing(true),
            )
            .build()?;

        let mut config: AppConfig = s.try_deserialize()?;

        // Fall back to the conventional Chrome path variable if unset
        if config.scraper.chrome_path.is_none() {
            config.scraper.chrome_path = env::var("CHROME_PATH").ok();
        }

        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.shopify.base_url.is_empty() || Url::parse(&self.shopify.base_url).is_err() {
            return Err(ConfigError::Message(
                "shopify.base_url must be a valid URL".into(),
            ));
        }

        if self.shopify.access_token.is_empty() {
            return Err(ConfigError::Message(
                "shopify.access_token must not be empty".into(),
            ));
        }

        if self.shopify.api_version.is_empty() {
            return Err(ConfigError::Message(
                "shopify.api_version must not be empty".into(),
            ));
        }

        if self.shopify.page_size == 0 || self.shopify.page_size > 250 {
            return Err(ConfigError::Message(
                "shopify.page_size must be between 1 and 250".into(),
            ));
        }

        if self.scraper.search_url.is_empty() || Url::parse(&self.scraper.search_url).is_err() {
            return Err(ConfigError::Message(
                "scraper.search_url must be a valid URL".into(),
            ));
        }

        if self.reconciler.vendor.is_empty() {
            return Err(ConfigError::Message(
                "reconciler.vendor must not be empty".into(),
            ));
        }

        if !self.reconciler.price_threshold.is_finite() || self.reconciler.price_threshold < 0.0 {
            return Err(ConfigError::Message(
                "reconciler.price_threshold must be a non-negative number".into(),
            ));
        }

        Ok(())
    }
}

use anyhow::{Context, anyhow};
use async_trait::async_trait;
use headless_chrome::{Browser, LaunchOptions, Tab};
use scraper::{Html, Selector};
use std::time::Duration;
use tracing::{debug, info, warn};

use crate::config::ScraperConfig;
use crate::utils::error::{AppError, Result};

// Selectors for the supplier storefront: the search widget on the results
// page and the stock/price blocks on the product detail page.
const COOKIE_ACCEPT_SELECTOR: &str = "button.iubenda-cs-accept-btn";
const RESULT_ENTRY_SELECTOR: &str =
    "#sherlocWrapper > div > div.sherlocResultsBlock > div.sherlocResultsList > div";
const RESULT_IMAGE_SELECTOR: &str = "a > div.sherlocImgWrapper > img";
const RESULT_LINK_SELECTOR: &str = "a";
const PRODUCT_SKU_SELECTOR: &str = "#maincontent > div.columns > div > div.product-info-main > div.product-info-price > div.product-info-stock-sku > div.product.attribute.sku > div";
const PRODUCT_PRICE_SELECTOR: &str = r#"[id^="product-price-"] > span"#;

const COOKIE_TIMEOUT: Duration = Duration::from_secs(5);
const RESULTS_TIMEOUT: Duration = Duration::from_secs(10);
const SKU_TIMEOUT: Duration = Duration::from_secs(5);
const PRICE_TIMEOUT: Duration = Duration::from_secs(10);

/// Narrow seam over "what does the supplier charge for this SKU right now".
/// Implementations map their own lookup failures to `Ok(None)`; `Err` is
/// reserved for unrecoverable host failures that should end the run.
#[async_trait]
pub trait PriceLookup: Send + Sync {
    async fn lookup_price(&self, sku: &str) -> Result<Option<String>>;
}

/// Browser-driven storefront lookup: search by SKU, pick the result whose
/// thumbnail matches the SKU prefix, confirm identity on the product page,
/// read the displayed price.
pub struct StorefrontScraper {
    browser: Browser,
    config: ScraperConfig,
}

impl StorefrontScraper {
    pub fn new(config: ScraperConfig) -> Result<Self> {
        let mut launch_options = LaunchOptions::default_builder()
            .headless(true)
            .sandbox(false)
            .args(vec![
                std::ffi::OsStr::new("--no-sandbox"),
                std::ffi::OsStr::new("--disable-dev-shm-usage"),
                std::ffi::OsStr::new("--disable-gpu"),
                std::ffi::OsStr::new("--disable-extensions"),
            ])
            .build()
            .map_err(|e| AppError::Scraping(format!("failed to build launch options: {e}")))?;

        if let Some(chrome_path) = &config.chrome_path {
            launch_options.path = Some(std::path::PathBuf::from(chrome_path));
        }

        let browser = Browser::new(launch_options)
            .map_err(|e| AppError::Scraping(format!("failed to launch browser: {e}")))?;

        Ok(Self { browser, config })
    }

    /// Runs the search → match → product page → price sequence on one tab.
    /// Errors bubble up to `lookup_price`, which downgrades them.
    fn scrape_price(&self, tab: &Tab, sku: &str) -> anyhow::Result<Option<String>> {
        let search_url = format!("{}{}", self.config.search_url, sku);
        tab.set_user_agent(&self.config.user_agent, None, None)?;
        tab.navigate_to(&search_url)?;
        tab.wait_until_navigated()?;

        // The consent banner only shows on fresh sessions; ignore it otherwise.
        if let Ok(button) =
            tab.wait_for_element_with_custom_timeout(COOKIE_ACCEPT_SELECTOR, COOKIE_TIMEOUT)
        {
            let _ = button.click();
        }

        if tab
            .wait_for_element_with_custom_timeout(RESULT_ENTRY_SELECTOR, RESULTS_TIMEOUT)
            .is_err()
        {
            debug!(sku, "search results never appeared");
            return Ok(None);
        }

        let html = tab.get_content()?;
        let Some(index) = find_matching_entry(&html, sku) else {
            info!(sku, "no search result matched the SKU prefix");
            return Ok(None);
        };

        let entries = tab.find_elements(RESULT_ENTRY_SELECTOR)?;
        let entry = entries
            .get(index)
            .ok_or_else(|| anyhow!("result entry {index} disappeared before click"))?;
        entry
            .find_element(RESULT_LINK_SELECTOR)
            .context("matched entry has no link")?
            .click()?;
        tab.wait_until_navigated()?;

        let page_sku =
            match tab.wait_for_element_with_custom_timeout(PRODUCT_SKU_SELECTOR, SKU_TIMEOUT) {
                Ok(element) => element.get_inner_text()?,
                Err(_) => {
                    debug!(sku, "product page exposes no SKU block");
                    return Ok(None);
                }
            };

        // Identity check against false-positive thumbnail matches.
        if sku_prefix(&page_sku) != sku_prefix(sku) {
            info!(sku, page_sku = %page_sku.trim(), "product page SKU prefix mismatch");
            return Ok(None);
        }

        match tab.wait_for_element_with_custom_timeout(PRODUCT_PRICE_SELECTOR, PRICE_TIMEOUT) {
            Ok(element) => Ok(Some(element.get_inner_text()?)),
            Err(_) => {
                debug!(sku, "product page exposes no price element");
                Ok(None)
            }
        }
    }
}

#[async_trait]
impl PriceLookup for StorefrontScraper {
    /// One tab per lookup, closed on every path. Everything the storefront
    /// can throw (timeouts, detached nodes, navigation failures) is
    /// downgraded to "not found" so one bad SKU cannot end the run.
    async fn lookup_price(&self, sku: &str) -> Result<Option<String>> {
        let tab = self
            .browser
            .new_tab()
            .map_err(|e| AppError::Scraping(format!("failed to open tab: {e}")))?;

        let result = self.scrape_price(&tab, sku);
        let _ = tab.close(true);

        match result {
            Ok(price) => Ok(price),
            Err(e) => {
                warn!(sku, error = %e, "scrape failed, treating as not found");
                Ok(None)
            }
        }
    }
}

/// Substring before the first hyphen, trimmed and lowercased. Used as the
/// coarse identity key when matching scraped content against a catalog SKU.
pub fn sku_prefix(sku: &str) -> String {
    sku.split('-').next().unwrap_or(sku).trim().to_lowercase()
}

/// True when the prefix occurs in the reference. Hyphen and underscore
/// spellings are interchangeable; supplier image names use either.
fn reference_contains_prefix(reference: &str, prefix: &str) -> bool {
    let reference = reference.to_lowercase();
    reference.contains(prefix)
        || reference.contains(&prefix.replace('-', "_"))
        || reference.contains(&prefix.replace('_', "-"))
}

/// Index of the first search-result entry whose thumbnail src matches the
/// SKU prefix, scanning in document order.
fn find_matching_entry(html: &str, sku: &str) -> Option<usize> {
    let document = Html::parse_document(html);
    let entry_selector = Selector::parse(RESULT_ENTRY_SELECTOR).ok()?;
    let image_selector = Selector::parse(RESULT_IMAGE_SELECTOR).ok()?;
    let prefix = sku_prefix(sku);

    document.select(&entry_selector).position(|entry| {
        entry
            .select(&image_selector)
            .next()
            .and_then(|img| img.value().attr("src"))
            .is_some_and(|src| reference_contains_prefix(src, &prefix))
    })
}

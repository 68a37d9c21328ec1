// Integration tests for shopify-price-sync
//
// Shared fixtures: a wiremock stand-in for the Shopify Admin API and a
// scripted PriceLookup that replaces the browser-driven scraper.

pub mod catalog_tests;

use std::collections::HashMap;
use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use serde_json::{Value, json};
use shopify_price_sync::config::{ReconcilerConfig, ShopifyConfig};
use shopify_price_sync::scraper::PriceLookup;

pub fn shopify_config(base_url: &str) -> ShopifyConfig {
    ShopifyConfig {
        base_url: base_url.trim_end_matches('/').to_string(),
        access_token: "test-token".to_string(),
        api_version: "2025-04".to_string(),
        page_size: 250,
        request_timeout_secs: 5,
        verify_tls: true,
    }
}

pub fn reconciler_config(vendor: &str, dry_run: bool) -> ReconcilerConfig {
    ReconcilerConfig {
        vendor: vendor.to_string(),
        price_threshold: 0.05,
        dry_run,
        // No throttling in tests
        inter_request_delay_ms: 0,
        record_not_found: true,
    }
}

pub fn product_json(id: i64, vendor: &str, variants: Value) -> Value {
    json!({
        "id": id,
        "title": format!("Product {id}"),
        "vendor": vendor,
        "variants": variants,
    })
}

pub fn variant_json(id: i64, sku: Value, price: &str) -> Value {
    json!({ "id": id, "sku": sku, "price": price })
}

/// Scripted stand-in for the storefront scraper. Records every SKU it is
/// asked about so tests can assert what was (not) scraped.
#[derive(Clone)]
pub struct StubLookup {
    prices: HashMap<String, Option<String>>,
    calls: Arc<Mutex<Vec<String>>>,
}

impl StubLookup {
    pub fn new(prices: &[(&str, Option<&str>)]) -> Self {
        Self {
            prices: prices
                .iter()
                .map(|(sku, price)| (sku.to_string(), price.map(str::to_string)))
                .collect(),
            calls: Arc::new(Mutex::new(Vec::new())),
        }
    }

    pub fn calls(&self) -> Vec<String> {
        self.calls.lock().unwrap().clone()
    }
}

#[async_trait]
impl PriceLookup for StubLookup {
    async fn lookup_price(&self, sku: &str) -> shopify_price_sync::Result<Option<String>> {
        self.calls.lock().unwrap().push(sku.to_string());
        Ok(self.prices.get(sku).cloned().flatten())
    }
}

use rust_decimal::Decimal;
use rust_decimal::prelude::ToPrimitive;
use std::str::FromStr;
use std::time::Duration;
use tracing::{debug, info, warn};

use crate::catalog::CatalogClient;
use crate::config::ReconcilerConfig;
use crate::models::{Product, ReconciliationRecord, Variant, find_variant_id};
use crate::scraper::PriceLookup;
use crate::utils::error::{AppError, Result};

/// Drives the end-to-end fetch → scrape → compare → update pass over every
/// variant of the configured vendor, one SKU at a time.
pub struct Reconciler<L> {
    catalog: CatalogClient,
    lookup: L,
    config: ReconcilerConfig,
}

impl<L: PriceLookup> Reconciler<L> {
    pub fn new(catalog: CatalogClient, lookup: L, config: ReconcilerConfig) -> Self {
        Self {
            catalog,
            lookup,
            config,
        }
    }

    /// A catalog fetch failure aborts the whole run; everything after that
    /// is recovered per SKU.
    pub async fn run(&self) -> Result<Vec<ReconciliationRecord>> {
        let products = self
            .catalog
            .fetch_products_by_vendor(&self.config.vendor)
            .await?;
        info!(
            vendor = %self.config.vendor,
            products = products.len(),
            dry_run = self.config.dry_run,
            "starting reconciliation pass"
        );

        let delay = Duration::from_millis(self.config.inter_request_delay_ms);
        let mut records = Vec::new();

        for product in &products {
            for variant in &product.variants {
                let sku = variant.sku.as_deref().unwrap_or("");
                if sku.is_empty() {
                    continue;
                }

                if let Some(record) = self.process_variant(&products, variant, sku).await? {
                    records.push(record);
                }

                // Throttle against the storefront after every processed
                // SKU, whether or not the scrape produced anything.
                tokio::time::sleep(delay).await;
            }
        }

        Ok(records)
    }

    async fn process_variant(
        &self,
        products: &[Product],
        variant: &Variant,
        sku: &str,
    ) -> Result<Option<ReconciliationRecord>> {
        let catalog_price = match Decimal::from_str(variant.price.trim()) {
            Ok(price) => price,
            Err(e) => {
                return Ok(Some(ReconciliationRecord::error(
                    sku,
                    None,
                    format!("unparseable catalog price '{}': {e}", variant.price),
                )));
            }
        };

        debug!(sku, catalog_price = %catalog_price, "checking variant");

        let Some(raw_price) = self.lookup.lookup_price(sku).await? else {
            debug!(sku, "no storefront price found");
            if self.config.record_not_found {
                return Ok(Some(ReconciliationRecord::not_found(sku)));
            }
            return Ok(None);
        };

        let scraped_price = match normalize_price_text(&raw_price) {
            Ok(price) => price,
            Err(e) => {
                return Ok(Some(ReconciliationRecord::error(
                    sku,
                    Some(catalog_price),
                    e.to_string(),
                )));
            }
        };

        if catalog_price.is_zero() {
            // Relative difference is undefined at zero; flag instead of dividing.
            return Ok(Some(ReconciliationRecord::error(
                sku,
                Some(catalog_price),
                "catalog price is zero, relative difference undefined",
            )));
        }

        let difference = ((scraped_price - catalog_price).abs() / catalog_price)
            .to_f64()
            .unwrap_or(0.0);

        if difference <= self.config.price_threshold {
            info!(sku, difference, "prices within threshold, no update");
            return Ok(Some(ReconciliationRecord::within_threshold(
                sku,
                catalog_price,
                scraped_price,
            )));
        }

        warn!(
            sku,
            catalog_price = %catalog_price,
            scraped_price = %scraped_price,
            difference,
            "price discrepancy above threshold"
        );

        // Resolve the id only inside the fetched vendor set; an update must
        // never reach a variant outside this vendor's catalog.
        match find_variant_id(products, sku) {
            Some(variant_id) => {
                self.catalog
                    .update_variant_price(variant_id, scraped_price)
                    .await;
                Ok(Some(ReconciliationRecord::updated(
                    sku,
                    catalog_price,
                    scraped_price,
                )))
            }
            None => Ok(Some(ReconciliationRecord::error(
                sku,
                Some(catalog_price),
                "no matching variant id in vendor catalog",
            ))),
        }
    }
}

/// Normalizes a scraped price string ("104,50 €") to a decimal: currency
/// symbols and whitespace are stripped, decimal commas become periods.
pub fn normalize_price_text(raw: &str) -> Result<Decimal> {
    let cleaned: String = raw
        .replace(',', ".")
        .chars()
        .filter(|c| !c.is_whitespace() && !matches!(c, '€' | '$' | '£'))
        .collect();

    Decimal::from_str(&cleaned).map_err(|e| AppError::Parse {
        message: format!("unparseable price text '{}': {e}", raw.trim()),
    })
}

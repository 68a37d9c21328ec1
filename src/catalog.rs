use reqwest::StatusCode;
use reqwest::header::{HeaderMap, LINK};
use rust_decimal::Decimal;
use serde::Deserialize;
use serde_json::json;
use std::time::Duration;
use tracing::{debug, error, info};
use url::Url;

use crate::config::ShopifyConfig;
use crate::models::Product;
use crate::utils::error::{AppError, Result};

const ACCESS_TOKEN_HEADER: &str = "X-Shopify-Access-Token";

#[derive(Debug, Deserialize)]
struct ProductsPage {
    products: Vec<Product>,
}

/// Client for the Shopify Admin API: paginated product listing and
/// single-variant price updates.
pub struct CatalogClient {
    http: reqwest::Client,
    config: ShopifyConfig,
    dry_run: bool,
}

impl CatalogClient {
    pub fn new(config: ShopifyConfig, dry_run: bool) -> Result<Self> {
        let http = reqwest::Client::builder()
            .timeout(Duration::from_secs(config.request_timeout_secs))
            .danger_accept_invalid_certs(!config.verify_tls)
            .build()?;

        Ok(Self {
            http,
            config,
            dry_run,
        })
    }

    /// Fetches every product whose vendor field matches, following the
    /// Link-header cursor until the API stops supplying one. Any failed
    /// page request aborts the fetch; a partial catalog is not usable.
    pub async fn fetch_products_by_vendor(&self, vendor: &str) -> Result<Vec<Product>> {
        let limit = self.config.page_size.to_string();
        let first_page = Url::parse_with_params(
            &format!(
                "{}/admin/api/{}/products.json",
                self.config.base_url, self.config.api_version
            ),
            &[("vendor", vendor), ("limit", limit.as_str())],
        )?;

        let mut products = Vec::new();
        let mut next_url = Some(first_page.to_string());

        while let Some(page_url) = next_url {
            debug!(url = %page_url, "fetching catalog page");
            let response = self
                .http
                .get(&page_url)
                .header(ACCESS_TOKEN_HEADER, self.config.access_token.as_str())
                .send()
                .await?;

            if !response.status().is_success() {
                return Err(AppError::Api {
                    status: response.status().as_u16(),
                    body: response.text().await.unwrap_or_default(),
                });
            }

            next_url = next_page_url(response.headers());
            let page: ProductsPage = response.json().await?;
            products.extend(page.products);
        }

        info!(vendor, count = products.len(), "fetched vendor catalog");
        Ok(products)
    }

    /// Sets a variant's price, formatted to two decimals. Failures are
    /// logged and swallowed; a missed update must not stop the run.
    pub async fn update_variant_price(&self, variant_id: i64, new_price: Decimal) {
        let formatted = format!("{new_price:.2}");
        if self.dry_run {
            info!(variant_id, price = %formatted, "dry run, skipping variant price update");
            return;
        }

        let url = format!(
            "{}/admin/api/{}/variants/{}.json",
            self.config.base_url, self.config.api_version, variant_id
        );
        let payload = json!({ "variant": { "price": formatted } });

        let response = match self
            .http
            .put(&url)
            .header(ACCESS_TOKEN_HEADER, self.config.access_token.as_str())
            .json(&payload)
            .send()
            .await
        {
            Ok(response) => response,
            Err(e) => {
                error!(variant_id, error = %e, "variant price update request failed");
                return;
            }
        };

        if response.status() == StatusCode::OK {
            info!(variant_id, price = %formatted, "updated variant price");
        } else {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            error!(variant_id, %status, body = %body, "variant price update rejected");
        }
    }
}

/// Extracts the rel="next" target from a Link response header, if any.
fn next_page_url(headers: &HeaderMap) -> Option<String> {
    let link = headers.get(LINK)?.to_str().ok()?;
    link.split(',').find_map(|part| {
        if !part.contains(r#"rel="next""#) {
            return None;
        }
        let start = part.find('<')? + 1;
        let end = part[start..].find('>')? + start;
        Some(part[start..end].to_string())
    })
}

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// How a single SKU fared during a reconciliation pass.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum ReconcileOutcome {
    Updated,
    WithinThreshold,
    NotFound,
    Error,
}

/// Per-SKU log entry. Records are held in memory for the duration of one
/// run and can be emitted as a JSON array afterwards.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ReconciliationRecord {
    pub sku: String,
    pub catalog_price: Option<Decimal>,
    pub scraped_price: Option<Decimal>,
    pub outcome: ReconcileOutcome,
    pub updated: bool,
    pub error: Option<String>,
    pub checked_at: DateTime<Utc>,
}

impl ReconciliationRecord {
    fn new(sku: &str, outcome: ReconcileOutcome) -> Self {
        Self {
            sku: sku.to_string(),
            catalog_price: None,
            scraped_price: None,
            outcome,
            updated: false,
            error: None,
            checked_at: Utc::now(),
        }
    }

    pub fn updated(sku: &str, catalog_price: Decimal, scraped_price: Decimal) -> Self {
        Self {
            catalog_price: Some(catalog_price),
            scraped_price: Some(scraped_price),
            updated: true,
            ..Self::new(sku, ReconcileOutcome::Updated)
        }
    }

    pub fn within_threshold(sku: &str, catalog_price: Decimal, scraped_price: Decimal) -> Self {
        Self {
            catalog_price: Some(catalog_price),
            scraped_price: Some(scraped_price),
            ..Self::new(sku, ReconcileOutcome::WithinThreshold)
        }
    }

    pub fn not_found(sku: &str) -> Self {
        Self::new(sku, ReconcileOutcome::NotFound)
    }

    pub fn error(sku: &str, catalog_price: Option<Decimal>, message: impl Into<String>) -> Self {
        Self {
            catalog_price,
            error: Some(message.into()),
            ..Self::new(sku, ReconcileOutcome::Error)
        }
    }
}

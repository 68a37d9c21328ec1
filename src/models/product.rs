use serde::{Deserialize, Serialize};

/// One catalog line item as the Shopify Admin API returns it. Fields the
/// reconciler never touches are ignored during deserialization.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Product {
    pub id: i64,
    #[serde(default)]
    pub title: String,
    #[serde(default)]
    pub vendor: String,
    #[serde(default)]
    pub variants: Vec<Variant>,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Variant {
    /// Unique id used for update targeting.
    pub id: i64,
    /// May be null or empty; such variants are never reconciled.
    pub sku: Option<String>,
    /// Price as the decimal string the API returns, e.g. "100.00".
    pub price: String,
}

/// Resolves a SKU to its variant id, searching only the supplied product
/// set. An update must never target a variant outside the vendor catalog
/// that was fetched for this run.
pub fn find_variant_id(products: &[Product], sku: &str) -> Option<i64> {
    products
        .iter()
        .flat_map(|product| product.variants.iter())
        .find(|variant| variant.sku.as_deref() == Some(sku))
        .map(|variant| variant.id)
}

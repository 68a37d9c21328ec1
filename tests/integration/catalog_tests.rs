use rust_decimal::Decimal;
use serde_json::json;
use shopify_price_sync::AppError;
use shopify_price_sync::catalog::CatalogClient;
use wiremock::matchers::{body_json, header, method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

use super::*;

#[tokio::test]
async fn fetches_all_pages_via_link_header() {
    let server = MockServer::start().await;

    let page_two_url = format!(
        "{}/admin/api/2025-04/products.json?limit=250&page_info=nextcursor",
        server.uri()
    );

    Mock::given(method("GET"))
        .and(path("/admin/api/2025-04/products.json"))
        .and(query_param("vendor", "Acme"))
        .and(header("X-Shopify-Access-Token", "test-token"))
        .respond_with(
            ResponseTemplate::new(200)
                .insert_header(
                    "Link",
                    format!("<{page_two_url}>; rel=\"next\"").as_str(),
                )
                .set_body_json(json!({
                    "products": [
                        product_json(1, "Acme", json!([variant_json(11, json!("AAA-1"), "10.00")]))
                    ]
                })),
        )
        .expect(1)
        .mount(&server)
        .await;

    Mock::given(method("GET"))
        .and(path("/admin/api/2025-04/products.json"))
        .and(query_param("page_info", "nextcursor"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "products": [
                product_json(2, "Acme", json!([variant_json(22, json!("BBB-2"), "20.00")]))
            ]
        })))
        .expect(1)
        .mount(&server)
        .await;

    let client = CatalogClient::new(shopify_config(&server.uri()), false).unwrap();
    let products = client.fetch_products_by_vendor("Acme").await.unwrap();

    assert_eq!(products.len(), 2);
    assert_eq!(products[0].variants[0].sku.as_deref(), Some("AAA-1"));
    assert_eq!(products[1].id, 2);
}

#[tokio::test]
async fn vendor_filter_is_url_encoded() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/admin/api/2025-04/products.json"))
        .and(query_param("vendor", "Acme Srl"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({ "products": [] })))
        .expect(1)
        .mount(&server)
        .await;

    let client = CatalogClient::new(shopify_config(&server.uri()), false).unwrap();
    let products = client.fetch_products_by_vendor("Acme Srl").await.unwrap();
    assert!(products.is_empty());
}

#[tokio::test]
async fn non_success_page_aborts_fetch() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/admin/api/2025-04/products.json"))
        .respond_with(ResponseTemplate::new(401).set_body_string("unauthorized"))
        .mount(&server)
        .await;

    let client = CatalogClient::new(shopify_config(&server.uri()), false).unwrap();
    let result = client.fetch_products_by_vendor("Acme").await;

    match result {
        Err(AppError::Api { status, body }) => {
            assert_eq!(status, 401);
            assert_eq!(body, "unauthorized");
        }
        other => panic!("expected Api error, got {other:?}"),
    }
}

#[tokio::test]
async fn update_formats_price_to_two_decimals() {
    let server = MockServer::start().await;

    Mock::given(method("PUT"))
        .and(path("/admin/api/2025-04/variants/42.json"))
        .and(header("X-Shopify-Access-Token", "test-token"))
        .and(body_json(json!({ "variant": { "price": "120.00" } })))
        .respond_with(ResponseTemplate::new(200))
        .expect(1)
        .mount(&server)
        .await;

    let client = CatalogClient::new(shopify_config(&server.uri()), false).unwrap();
    client.update_variant_price(42, Decimal::new(120, 0)).await;
}

#[tokio::test]
async fn dry_run_never_issues_write() {
    let server = MockServer::start().await;

    Mock::given(method("PUT"))
        .respond_with(ResponseTemplate::new(200))
        .expect(0)
        .mount(&server)
        .await;

    let client = CatalogClient::new(shopify_config(&server.uri()), true).unwrap();
    client.update_variant_price(42, Decimal::new(9999, 2)).await;
}

#[tokio::test]
async fn rejected_update_is_swallowed() {
    let server = MockServer::start().await;

    Mock::given(method("PUT"))
        .and(path("/admin/api/2025-04/variants/42.json"))
        .respond_with(ResponseTemplate::new(500).set_body_string("boom"))
        .expect(1)
        .mount(&server)
        .await;

    let client = CatalogClient::new(shopify_config(&server.uri()), false).unwrap();
    // Must not panic or propagate; the reconciliation loop carries on.
    client.update_variant_price(42, Decimal::new(12050, 2)).await;
}

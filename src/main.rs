use anyhow::Result;
use clap::Parser;
use tracing::info;

use shopify_price_sync::catalog::CatalogClient;
use shopify_price_sync::config::AppConfig;
use shopify_price_sync::models::ReconcileOutcome;
use shopify_price_sync::reconciler::Reconciler;
use shopify_price_sync::scraper::StorefrontScraper;

/// Reconciles Shopify variant prices against the supplier storefront.
#[derive(Parser, Debug)]
#[command(name = "shopify-price-sync", version, about)]
struct Cli {
    /// Compute and log updates without writing anything back
    #[arg(long)]
    dry_run: bool,

    /// Override the configured vendor filter
    #[arg(long)]
    vendor: Option<String>,

    /// Print the per-SKU records as a JSON array on stdout
    #[arg(long)]
    json: bool,
}

#[tokio::main]
async fn main() -> Result<()> {
    dotenvy::dotenv().ok();

    // Initialize tracing
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive("shopify_price_sync=info".parse()?),
        )
        .init();

    let cli = Cli::parse();
    let mut config = AppConfig::from_env()?;
    if cli.dry_run {
        config.reconciler.dry_run = true;
    }
    if let Some(vendor) = cli.vendor {
        config.reconciler.vendor = vendor;
    }

    info!(
        vendor = %config.reconciler.vendor,
        dry_run = config.reconciler.dry_run,
        threshold = config.reconciler.price_threshold,
        "starting price reconciliation"
    );

    let catalog = CatalogClient::new(config.shopify.clone(), config.reconciler.dry_run)?;
    let scraper = StorefrontScraper::new(config.scraper.clone())?;
    let reconciler = Reconciler::new(catalog, scraper, config.reconciler.clone());

    let records = reconciler.run().await?;

    if cli.json {
        println!("{}", serde_json::to_string_pretty(&records)?);
    } else {
        let count_of = |outcome: ReconcileOutcome| {
            records
                .iter()
                .filter(|record| record.outcome == outcome)
                .count()
        };
        info!(
            total = records.len(),
            updated = count_of(ReconcileOutcome::Updated),
            unchanged = count_of(ReconcileOutcome::WithinThreshold),
            not_found = count_of(ReconcileOutcome::NotFound),
            errors = count_of(ReconcileOutcome::Error),
            "reconciliation finished"
        );
    }

    Ok(())
}

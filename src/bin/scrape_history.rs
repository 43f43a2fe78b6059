// src/bin/scrape_history.rs
use anyhow::Context;
use log::{info, warn};

use fuel_breakeven::config::{parse_fuel_types, AppConfig};
use fuel_breakeven::models::FuelType;
use fuel_breakeven::services::source::{build_client, scrape_year};
use fuel_breakeven::services::store::{persist_extraction, CsvPriceStore};

/// Scrapes every configured year, optionally limited to the fuel types
/// named on the command line.
#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenv::dotenv().ok();
    env_logger::init();

    let config = AppConfig::from_env();
    let args: Vec<String> = std::env::args().skip(1).collect();
    let fuel_types = if args.is_empty() {
        FuelType::ALL.to_vec()
    } else {
        parse_fuel_types(&args)
    };
    if fuel_types.is_empty() {
        anyhow::bail!("no known fuel types requested");
    }

    let client = build_client(config.fetch_timeout).context("Failed to create HTTP client")?;
    let store = CsvPriceStore::new(config.data_dir.clone());

    let mut years_with_data = 0;
    let mut years_skipped = 0;
    for year in config.scrape_years.clone() {
        info!("Scraping data for year {}...", year);
        let result = scrape_year(&client, &config.price_source_url, year, &fuel_types).await;
        if result.is_empty() {
            warn!("No data for {}: {}", year, result.diagnostic.as_deref().unwrap_or("empty table"));
            years_skipped += 1;
            continue;
        }

        let written = persist_extraction(&store, &result);
        info!(
            "Completed {}: {} points over {} fuel type(s), {} missing, skipped {:?}",
            year,
            result.total_points(),
            written,
            result.missing_fuel_types.len(),
            result.skipped
        );
        years_with_data += 1;
    }

    info!(
        "Finished: {} year(s) saved, {} year(s) skipped, data in {}",
        years_with_data,
        years_skipped,
        store.root().display()
    );
    Ok(())
}

// src/services/source.rs
use log::{error, info};
use reqwest::Client;
use std::time::Duration;

use crate::errors::ScrapeError;
use crate::models::FuelType;
use crate::services::extractor::{extract_year, ExtractionResult};

pub const HISTORICAL_PRICE_URL: &str = "https://www.bangchak.co.th/en/oilprice/historical";
const USER_AGENT: &str = "Mozilla/5.0 (Windows NT 10.0; Win64; x64) AppleWebKit/537.36";

pub fn historical_price_url(base_url: &str, year: i32) -> String {
    format!("{}?year={}", base_url, year)
}

pub fn build_client(timeout: Duration) -> Result<Client, ScrapeError> {
    Client::builder()
        .timeout(timeout)
        .user_agent(USER_AGENT)
        .build()
        .map_err(|e| ScrapeError::Transport { year: 0, message: e.to_string() })
}

/// Downloads one year's historical price page from `base_url`.
pub async fn fetch_year_markup(client: &Client, base_url: &str, year: i32) -> Result<String, ScrapeError> {
    let url = historical_price_url(base_url, year);
    info!("Fetching historical prices from URL: {}", url);

    let transport = |e: reqwest::Error| ScrapeError::Transport { year, message: e.to_string() };
    let response = client.get(&url).send().await.map_err(transport)?;
    let response = response.error_for_status().map_err(transport)?;
    let markup = response.text().await.map_err(transport)?;

    info!("Fetched {} bytes for {}", markup.len(), year);
    Ok(markup)
}

/// Fetches and extracts one year. A failed request yields an empty result.
pub async fn scrape_year(
    client: &Client,
    base_url: &str,
    year: i32,
    fuel_types: &[FuelType],
) -> ExtractionResult {
    match fetch_year_markup(client, base_url, year).await {
        Ok(markup) => extract_year(&markup, year, fuel_types),
        Err(e) => {
            error!("{}", e);
            ExtractionResult::empty(year, Some(e.to_string()))
        }
    }
}

// src/handlers/scrape.rs
use warp::reply::Json;
use warp::Rejection;
use std::sync::Arc;
use log::info;

use crate::models::FuelType;
use crate::services::source::scrape_year;
use crate::services::store::persist_extraction;
use crate::state::AppState;
use super::error::ApiError;

const EARLIEST_YEAR: i32 = 2000;
const LATEST_YEAR: i32 = 2100;

/// Fetches, extracts and persists one year, returning what was kept and skipped.
pub async fn post_scrape_year(year: i32, state: Arc<AppState>) -> Result<Json, Rejection> {
    info!("Handling request to scrape year {}", year);
    if !(EARLIEST_YEAR..=LATEST_YEAR).contains(&year) {
        return Err(warp::reject::custom(ApiError::bad_request(format!(
            "year {} is outside {}..={}",
            year, EARLIEST_YEAR, LATEST_YEAR
        ))));
    }

    let result = scrape_year(&state.client, &state.config.price_source_url, year, &FuelType::ALL).await;
    let record_sets_written = persist_extraction(&state.store, &result);

    let points: std::collections::BTreeMap<FuelType, usize> =
        result.prices.iter().map(|(f, p)| (*f, p.len())).collect();
    Ok(warp::reply::json(&serde_json::json!({
        "year": result.year,
        "points": points,
        "missing_fuel_types": result.missing_fuel_types,
        "rows_read": result.rows_read,
        "skipped": result.skipped,
        "diagnostic": result.diagnostic,
        "record_sets_written": record_sets_written,
    })))
}

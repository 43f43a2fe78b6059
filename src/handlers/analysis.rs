// src/handlers/analysis.rs
use warp::reply::Json;
use warp::Rejection;
use std::sync::Arc;
use log::{error, info};

use crate::models::FuelType;
use crate::services::pipeline::{run_analysis, summarize_series, AnalysisReport};
use crate::services::repository::load_series_with_summary;
use crate::state::AppState;
use super::error::ApiError;

fn analysis(state: &AppState) -> Result<AnalysisReport, Rejection> {
    run_analysis(&state.store, &state.config).map_err(|e| {
        error!("Analysis failed: {}", e);
        warp::reject::custom(ApiError::internal(e.to_string()))
    })
}

pub async fn get_all_series(state: Arc<AppState>) -> Result<Json, Rejection> {
    info!("Handling request to get all price series");
    let series = summarize_series(&state.store, state.config.history_years.clone());
    Ok(warp::reply::json(&series))
}

pub async fn get_series(fuel: String, state: Arc<AppState>) -> Result<Json, Rejection> {
    info!("Handling request to get {} price series", fuel);
    let fuel_type: FuelType = fuel
        .parse()
        .map_err(|e: crate::errors::ScrapeError| warp::reject::custom(ApiError::not_found(e.to_string())))?;

    let (series, load) = load_series_with_summary(&state.store, fuel_type, state.config.history_years.clone());
    Ok(warp::reply::json(&serde_json::json!({
        "stats": series.stats(),
        "load": load,
        "series": series,
    })))
}

pub async fn get_forecasts(state: Arc<AppState>) -> Result<Json, Rejection> {
    info!("Handling request to get fuel price forecasts");
    let report = analysis(&state)?;
    Ok(warp::reply::json(&serde_json::json!({
        "forecasts": report.forecasts,
        "reference_fuel": report.reference_fuel,
        "reference_forecast": report.reference_forecast,
    })))
}

pub async fn get_break_even(state: Arc<AppState>) -> Result<Json, Rejection> {
    info!("Handling request to get break-even analysis");
    let report = analysis(&state)?;
    Ok(warp::reply::json(&report.break_even))
}

// tests/api_routes.rs
//
// HTTP surface over an on-disk store, without touching the network.
//
use std::fs;
use std::path::PathBuf;
use std::sync::Arc;

use chrono::NaiveDate;
use fuel_breakeven::config::AppConfig;
use fuel_breakeven::models::{Assumptions, FuelType, PricePoint};
use fuel_breakeven::routes::routes;
use fuel_breakeven::services::store::PriceStore;
use fuel_breakeven::state::AppState;
use serde_json::Value;

fn tmp(name: &str) -> PathBuf {
    let mut p = std::env::temp_dir();
    p.push(format!("fuel_breakeven_api_{}_{}", name, std::process::id()));
    let _ = fs::remove_dir_all(&p);
    p
}

fn state_with_data(name: &str) -> Arc<AppState> {
    state_with_config(AppConfig { data_dir: tmp(name), ..AppConfig::default() })
}

fn state_with_config(config: AppConfig) -> Arc<AppState> {
    let state = AppState::new(config).unwrap();
    let points: Vec<PricePoint> = (1..=3)
        .map(|d| PricePoint {
            date: NaiveDate::from_ymd_opt(2024, 1, d).unwrap(),
            price: 35.0 + d as f64 * 0.1,
            fuel_type: FuelType::Gasohol95,
        })
        .collect();
    state.store.save_year(FuelType::Gasohol95, 2024, &points).unwrap();
    Arc::new(state)
}

#[tokio::test]
async fn series_for_known_fuel_type() {
    let api = routes(state_with_data("series"));
    let resp = warp::test::request().method("GET").path("/api/v1/series/gasohol_95").reply(&api).await;
    assert_eq!(resp.status(), 200);

    let body: Value = serde_json::from_slice(resp.body()).unwrap();
    assert_eq!(body["series"]["fuel_type"], "gasohol_95");
    assert_eq!(body["series"]["points"].as_array().unwrap().len(), 3);
    assert_eq!(body["stats"]["count"], 3);
    assert_eq!(body["load"]["years_loaded"], 1);
    assert_eq!(body["load"]["records_skipped"], 0);
}

#[tokio::test]
async fn all_series_ignore_invalid_assumptions() {
    let config = AppConfig {
        data_dir: tmp("bad_assumptions"),
        assumptions: Assumptions { years_to_own: 0, ..Assumptions::default() },
        ..AppConfig::default()
    };
    let api = routes(state_with_config(config));

    let resp = warp::test::request().method("GET").path("/api/v1/series").reply(&api).await;
    assert_eq!(resp.status(), 200);
    let body: Value = serde_json::from_slice(resp.body()).unwrap();
    assert_eq!(body["gasohol_95"]["stats"]["count"], 3);
    assert_eq!(body["gasohol_95"]["load"]["years_loaded"], 1);
    assert_eq!(body["diesel"]["load"]["years_loaded"], 0);

    let resp = warp::test::request().method("GET").path("/api/v1/break_even").reply(&api).await;
    assert_eq!(resp.status(), 500);
    let body: Value = serde_json::from_slice(resp.body()).unwrap();
    assert!(body["error"].as_str().unwrap().contains("years_to_own"));
}

#[tokio::test]
async fn unknown_fuel_type_is_not_found() {
    let api = routes(state_with_data("unknown"));
    let resp = warp::test::request().method("GET").path("/api/v1/series/kerosene").reply(&api).await;
    assert_eq!(resp.status(), 404);

    let body: Value = serde_json::from_slice(resp.body()).unwrap();
    assert!(body["error"].as_str().unwrap().contains("kerosene"));
}

#[tokio::test]
async fn break_even_reports_tagged_outcomes() {
    let api = routes(state_with_data("break_even"));
    let resp = warp::test::request().method("GET").path("/api/v1/break_even").reply(&api).await;
    assert_eq!(resp.status(), 200);

    let body: Value = serde_json::from_slice(resp.body()).unwrap();
    assert_eq!(body["hybrid"]["break_even_years"]["kind"], "finite");
    assert!(body["ev"]["required_monthly_km"]["kind"].is_string());
    assert_eq!(body["assumptions"]["years_to_own"], 5);
}

#[tokio::test]
async fn forecasts_cover_fuel_types_with_data() {
    let api = routes(state_with_data("forecast"));
    let resp = warp::test::request().method("GET").path("/api/v1/forecast").reply(&api).await;
    assert_eq!(resp.status(), 200);

    let body: Value = serde_json::from_slice(resp.body()).unwrap();
    assert!(body["forecasts"]["gasohol_95"]["price"].as_f64().unwrap() > 35.3);
    assert_eq!(body["forecasts"]["gasohol_95"]["method"]["kind"], "linear");
    assert_eq!(body["reference_fuel"], "gasohol_95");
}

#[tokio::test]
async fn scrape_rejects_out_of_range_year() {
    let api = routes(state_with_data("scrape"));
    let resp = warp::test::request().method("POST").path("/api/v1/scrape/1800").reply(&api).await;
    assert_eq!(resp.status(), 400);
}

// src/routes.rs
use std::sync::Arc;
use warp::reject::Rejection;
use crate::handlers::analysis::{get_all_series, get_break_even, get_forecasts, get_series};
use crate::handlers::scrape::post_scrape_year;
use crate::state::AppState;
use log::info;

use std::convert::Infallible;
use warp::{Filter, Reply};
use crate::handlers::error::ApiError;

async fn handle_rejection(err: Rejection) -> Result<impl Reply, Infallible> {
    let code;
    let message: &str;

    if err.is_not_found() {
        code = warp::http::StatusCode::NOT_FOUND;
        message = "Not Found";
    } else if let Some(api_error) = err.find::<ApiError>() {
        code = api_error.status();
        message = &api_error.message;
    } else if err.find::<warp::reject::MethodNotAllowed>().is_some() {
        code = warp::http::StatusCode::METHOD_NOT_ALLOWED;
        message = "Method Not Allowed";
    } else {
        code = warp::http::StatusCode::INTERNAL_SERVER_ERROR;
        message = "Internal Server Error";
    }

    Ok(warp::reply::with_status(
        warp::reply::json(&serde_json::json!({
            "error": message,
        })),
        code,
    ))
}

pub fn routes(state: Arc<AppState>) -> impl Filter<Extract = impl Reply, Error = Infallible> + Clone {
    info!("Configuring routes...");

    let state_filter = warp::any().map(move || state.clone());

    let all_series_route = warp::path!("api" / "v1" / "series")
        .and(warp::get())
        .and(state_filter.clone())
        .and_then(get_all_series);

    let series_route = warp::path!("api" / "v1" / "series" / String)
        .and(warp::get())
        .and(state_filter.clone())
        .and_then(get_series);

    let forecast_route = warp::path!("api" / "v1" / "forecast")
        .and(warp::get())
        .and(state_filter.clone())
        .and_then(get_forecasts);

    let break_even_route = warp::path!("api" / "v1" / "break_even")
        .and(warp::get())
        .and(state_filter.clone())
        .and_then(get_break_even);

    let scrape_route = warp::path!("api" / "v1" / "scrape" / i32)
        .and(warp::post())
        .and(state_filter.clone())
        .and_then(post_scrape_year);

    info!("All routes configured successfully.");

    all_series_route
        .or(series_route)
        .or(forecast_route)
        .or(break_even_route)
        .or(scrape_route)
        .recover(handle_rejection)
}

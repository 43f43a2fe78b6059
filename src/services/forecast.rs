// src/services/forecast.rs
use log::{info, warn};
use serde::Serialize;

use crate::models::{FuelType, TimeSeries};

/// Price returned when a fuel type has no history at all (THB per liter).
pub const DEFAULT_FUEL_PRICE: f64 = 32.55;
pub const FORECAST_HORIZON_DAYS: i64 = 365;

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum ForecastMethod {
    Default,
    SinglePoint,
    Linear { slope: f64, intercept: f64 },
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct ForecastResult {
    pub fuel_type: FuelType,
    pub price: f64,
    pub observations: usize,
    pub target_day_offset: i64,
    pub method: ForecastMethod,
}

/// Ordinary least squares of `ys` against `xs`; `None` when the x values
/// have no spread.
pub fn fit_line(xs: &[f64], ys: &[f64]) -> Option<(f64, f64)> {
    let n = xs.len().min(ys.len());
    if n < 2 {
        return None;
    }
    let mean_x = xs[..n].iter().sum::<f64>() / n as f64;
    let mean_y = ys[..n].iter().sum::<f64>() / n as f64;

    let (sxy, sxx) = xs[..n]
        .iter()
        .zip(&ys[..n])
        .fold((0.0, 0.0), |(sxy, sxx), (x, y)| {
            let dx = x - mean_x;
            (sxy + dx * (y - mean_y), sxx + dx * dx)
        });
    if sxx == 0.0 {
        return None;
    }
    let slope = sxy / sxx;
    Some((slope, mean_y - slope * mean_x))
}

/// Predicts the price one year past the last observation.
pub fn forecast_next_year(series: &TimeSeries) -> ForecastResult {
    let fuel_type = series.fuel_type;
    let observations = series.len();
    let target_day_offset = series.max_day_offset().unwrap_or(0) + FORECAST_HORIZON_DAYS;

    let (price, method) = match observations {
        0 => {
            warn!("No data to forecast {}; using default price {}", fuel_type, DEFAULT_FUEL_PRICE);
            (DEFAULT_FUEL_PRICE, ForecastMethod::Default)
        }
        1 => {
            warn!("Only one observation for {}; forecasting it unchanged", fuel_type);
            (series.points()[0].price, ForecastMethod::SinglePoint)
        }
        _ => {
            let xs: Vec<f64> = series.points().iter().map(|p| p.day_offset as f64).collect();
            let ys: Vec<f64> = series.points().iter().map(|p| p.price).collect();
            match fit_line(&xs, &ys) {
                Some((slope, intercept)) => (
                    intercept + slope * target_day_offset as f64,
                    ForecastMethod::Linear { slope, intercept },
                ),
                // Unreachable with unique dates, but keep the mean rather than divide by zero.
                None => (series.mean_price().unwrap_or(DEFAULT_FUEL_PRICE), ForecastMethod::SinglePoint),
            }
        }
    };

    info!("Forecast {} price at day {}: {:.2}", fuel_type, target_day_offset, price);
    ForecastResult { fuel_type, price, observations, target_day_offset, method }
}

// src/services/pipeline.rs
use log::info;
use serde::Serialize;
use std::collections::BTreeMap;
use std::ops::RangeInclusive;

use crate::config::AppConfig;
use crate::errors::AssumptionError;
use crate::models::{FuelType, SeriesStats, TimeSeries};
use crate::services::calculations::{calculate_break_even, BreakEvenResult};
use crate::services::forecast::{forecast_next_year, ForecastResult};
use crate::services::repository::{load_all_series, LoadSummary};
use crate::services::store::PriceStore;

#[derive(Debug, Clone, Serialize)]
pub struct SeriesSummary {
    pub series: TimeSeries,
    pub stats: Option<SeriesStats>,
    pub load: LoadSummary,
}

/// Every fuel type's merged series with its stats and load counts.
pub fn summarize_series(
    store: &dyn PriceStore,
    years: RangeInclusive<i32>,
) -> BTreeMap<FuelType, SeriesSummary> {
    load_all_series(store, years)
        .into_iter()
        .map(|(f, (series, load))| {
            let stats = series.stats();
            (f, SeriesSummary { series, stats, load })
        })
        .collect()
}

/// Everything one run hands to reporting consumers.
#[derive(Debug, Clone, Serialize)]
pub struct AnalysisReport {
    pub history_start_year: i32,
    pub history_end_year: i32,
    pub series: BTreeMap<FuelType, SeriesSummary>,
    pub forecasts: BTreeMap<FuelType, ForecastResult>,
    pub reference_fuel: FuelType,
    pub reference_forecast: ForecastResult,
    pub break_even: BreakEvenResult,
}

pub fn run_analysis(store: &dyn PriceStore, config: &AppConfig) -> Result<AnalysisReport, AssumptionError> {
    let series = summarize_series(store, config.history_years.clone());

    let forecasts: BTreeMap<FuelType, ForecastResult> = series
        .iter()
        .filter(|(_, s)| !s.series.is_empty())
        .map(|(&f, s)| (f, forecast_next_year(&s.series)))
        .collect();

    // A reference fuel without history still gets the documented default.
    let reference_forecast = match forecasts.get(&config.reference_fuel) {
        Some(forecast) => *forecast,
        None => forecast_next_year(&TimeSeries::empty(config.reference_fuel)),
    };

    let break_even = calculate_break_even(&config.assumptions, reference_forecast.price)?;

    info!(
        "Analysis complete: {} fuel type(s) with data, reference {} at {:.2}",
        forecasts.len(),
        config.reference_fuel,
        reference_forecast.price
    );

    Ok(AnalysisReport {
        history_start_year: *config.history_years.start(),
        history_end_year: *config.history_years.end(),
        series,
        forecasts,
        reference_fuel: config.reference_fuel,
        reference_forecast,
        break_even,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::PricePoint;
    use crate::services::forecast::DEFAULT_FUEL_PRICE;
    use crate::services::store::MemoryPriceStore;
    use chrono::NaiveDate;

    #[test]
    fn empty_store_uses_default_reference_price() {
        let store = MemoryPriceStore::default();
        let report = run_analysis(&store, &AppConfig::default()).unwrap();
        assert!(report.forecasts.is_empty());
        assert_eq!(report.reference_forecast.price, DEFAULT_FUEL_PRICE);
        assert_eq!(report.break_even.fuel_price, DEFAULT_FUEL_PRICE);
        assert_eq!(report.series.len(), FuelType::ALL.len());
    }

    #[test]
    fn forecasts_only_fuel_types_with_data() {
        let store = MemoryPriceStore::default();
        let date = NaiveDate::from_ymd_opt(2022, 3, 1).unwrap();
        store
            .save_year(FuelType::Diesel, 2022, &[PricePoint { date, price: 29.94, fuel_type: FuelType::Diesel }])
            .unwrap();

        let report = run_analysis(&store, &AppConfig::default()).unwrap();
        assert_eq!(report.forecasts.len(), 1);
        assert_eq!(report.forecasts[&FuelType::Diesel].price, 29.94);
        assert_eq!(report.series[&FuelType::Diesel].stats.unwrap().latest, 29.94);
        assert_eq!(report.series[&FuelType::Diesel].load.years_loaded, 1);
        assert_eq!(report.series[&FuelType::Diesel].load.years_missing, 4);
    }
}

// src/services/repository.rs
use log::{info, warn};
use std::collections::BTreeMap;
use serde::Serialize;
use std::ops::RangeInclusive;

use crate::models::{FuelType, TimeSeries};
use crate::services::store::PriceStore;

/// What a series load kept and skipped, per persisted year and record.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct LoadSummary {
    pub years_loaded: usize,
    pub years_missing: usize,
    pub years_failed: usize,
    pub records_skipped: usize,
}

/// Loads and merges one fuel type over `years`, ascending, so later years
/// win on duplicate dates. Unreadable years and records are skipped and counted.
pub fn load_series_with_summary(
    store: &dyn PriceStore,
    fuel_type: FuelType,
    years: RangeInclusive<i32>,
) -> (TimeSeries, LoadSummary) {
    let mut series = TimeSeries::empty(fuel_type);
    let mut summary = LoadSummary::default();

    for year in years {
        match store.load_year(fuel_type, year) {
            Ok(Some(records)) => {
                series.merge(records.points);
                summary.years_loaded += 1;
                summary.records_skipped += records.skipped_records;
            }
            Ok(None) => summary.years_missing += 1,
            Err(e) => {
                warn!("Skipping {} prices for {}: {:#}", fuel_type, year, e);
                summary.years_failed += 1;
            }
        }
    }

    if series.is_empty() {
        warn!("No persisted price data for {}", fuel_type);
    } else {
        info!(
            "Loaded {} {} prices from {} year(s); {} year(s) failed, {} record(s) skipped",
            series.len(),
            fuel_type,
            summary.years_loaded,
            summary.years_failed,
            summary.records_skipped
        );
    }
    (series, summary)
}

pub fn load_series(store: &dyn PriceStore, fuel_type: FuelType, years: RangeInclusive<i32>) -> TimeSeries {
    load_series_with_summary(store, fuel_type, years).0
}

pub fn load_all_series(
    store: &dyn PriceStore,
    years: RangeInclusive<i32>,
) -> BTreeMap<FuelType, (TimeSeries, LoadSummary)> {
    FuelType::ALL
        .iter()
        .map(|&f| (f, load_series_with_summary(store, f, years.clone())))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::PricePoint;
    use crate::services::store::{CsvPriceStore, MemoryPriceStore};
    use chrono::NaiveDate;

    fn point(y: i32, m: u32, d: u32, price: f64) -> PricePoint {
        PricePoint {
            date: NaiveDate::from_ymd_opt(y, m, d).unwrap(),
            price,
            fuel_type: FuelType::Gasohol95,
        }
    }

    #[test]
    fn later_year_wins_on_overlap() {
        let store = MemoryPriceStore::default();
        store
            .save_year(FuelType::Gasohol95, 2023, &[point(2023, 12, 30, 35.0), point(2024, 1, 1, 35.5)])
            .unwrap();
        store
            .save_year(FuelType::Gasohol95, 2024, &[point(2024, 1, 1, 36.0), point(2024, 1, 2, 36.2)])
            .unwrap();

        let series = load_series(&store, FuelType::Gasohol95, 2020..=2024);
        assert_eq!(series.len(), 3);
        assert_eq!(series.points()[1].price, 36.0);
        assert!(series.points().windows(2).all(|w| w[0].date < w[1].date));
    }

    #[test]
    fn fuel_type_without_data_is_empty() {
        let store = MemoryPriceStore::default();
        let all = load_all_series(&store, 2020..=2024);
        assert_eq!(all.len(), FuelType::ALL.len());
        assert!(all.values().all(|(series, _)| series.is_empty()));
        assert!(all.values().all(|(_, summary)| summary.years_missing == 5));
    }

    #[test]
    fn malformed_record_keeps_rest_of_year() {
        let mut dir = std::env::temp_dir();
        dir.push(format!("fuel_breakeven_repo_malformed_{}", std::process::id()));
        let _ = std::fs::remove_dir_all(&dir);
        let store = CsvPriceStore::new(&dir);
        let path = store.year_path(FuelType::Gasohol95, 2024);
        std::fs::create_dir_all(path.parent().unwrap()).unwrap();
        std::fs::write(&path, "date,price\n2024-01-01,35.0\n2024-01-02,abc\n2024-01-03,35.2\n").unwrap();

        let (series, summary) = load_series_with_summary(&store, FuelType::Gasohol95, 2020..=2024);
        assert_eq!(series.len(), 2);
        assert_eq!(summary.years_loaded, 1);
        assert_eq!(summary.years_missing, 4);
        assert_eq!(summary.years_failed, 0);
        assert_eq!(summary.records_skipped, 1);

        let _ = std::fs::remove_dir_all(&dir);
    }
}

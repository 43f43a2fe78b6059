// src/models.rs
use serde::{Serialize, Deserialize};
use chrono::NaiveDate;
use log::warn;
use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;

use crate::errors::ScrapeError;

/// The closed set of fuel grades tracked by the price history.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FuelType {
    Diesel,
    #[serde(rename = "gasohol_91")]
    Gasohol91,
    #[serde(rename = "gasohol_95")]
    Gasohol95,
    GasoholE20,
    GasoholE85,
}

impl FuelType {
    pub const ALL: [FuelType; 5] = [
        FuelType::Diesel,
        FuelType::Gasohol91,
        FuelType::Gasohol95,
        FuelType::GasoholE20,
        FuelType::GasoholE85,
    ];

    /// Column title used by the historical price table for this grade.
    pub fn display_label(self) -> &'static str {
        match self {
            FuelType::Diesel => "Hi Diesel S",
            FuelType::Gasohol91 => "Gasohol 91 S EVO",
            FuelType::Gasohol95 => "Gasohol 95 S EVO",
            FuelType::GasoholE20 => "Gasohol E20 S EVO",
            FuelType::GasoholE85 => "Gasohol E85 S EVO",
        }
    }

    /// Identifier used for directories, config values and URLs.
    pub fn as_str(self) -> &'static str {
        match self {
            FuelType::Diesel => "diesel",
            FuelType::Gasohol91 => "gasohol_91",
            FuelType::Gasohol95 => "gasohol_95",
            FuelType::GasoholE20 => "gasohol_e20",
            FuelType::GasoholE85 => "gasohol_e85",
        }
    }
}

impl fmt::Display for FuelType {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl FromStr for FuelType {
    type Err = ScrapeError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        FuelType::ALL
            .iter()
            .copied()
            .find(|f| f.as_str() == s.trim())
            .ok_or_else(|| ScrapeError::UnknownFuelType(s.trim().to_string()))
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PricePoint {
    pub date: NaiveDate,
    pub price: f64,
    pub fuel_type: FuelType,
}

/// A merged point carrying its regressor for trend fitting.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct SeriesPoint {
    pub date: NaiveDate,
    pub price: f64,
    pub day_offset: i64,
}

/// Merged price history for one fuel type, strictly ascending by date.
#[derive(Debug, Clone, Serialize)]
pub struct TimeSeries {
    pub fuel_type: FuelType,
    points: Vec<SeriesPoint>,
}

impl TimeSeries {
    pub fn empty(fuel_type: FuelType) -> Self {
        TimeSeries { fuel_type, points: Vec::new() }
    }

    /// Builds a series from points in ingestion order; a later point
    /// replaces an earlier one on the same date.
    pub fn from_points(fuel_type: FuelType, points: impl IntoIterator<Item = PricePoint>) -> Self {
        let mut series = TimeSeries::empty(fuel_type);
        series.merge(points);
        series
    }

    /// Merges newly ingested points; they win over existing ones on shared dates.
    pub fn merge(&mut self, points: impl IntoIterator<Item = PricePoint>) {
        let mut by_date: BTreeMap<NaiveDate, f64> =
            self.points.iter().map(|p| (p.date, p.price)).collect();

        for p in points {
            if p.fuel_type != self.fuel_type {
                warn!("Ignoring {} point merged into {} series", p.fuel_type, self.fuel_type);
                continue;
            }
            if !(p.price > 0.0) {
                warn!("Dropping non-positive {} price {} on {}", p.fuel_type, p.price, p.date);
                continue;
            }
            by_date.insert(p.date, p.price);
        }

        let origin = by_date.keys().next().copied();
        self.points = by_date
            .into_iter()
            .map(|(date, price)| SeriesPoint {
                date,
                price,
                day_offset: origin.map(|o| (date - o).num_days()).unwrap_or(0),
            })
            .collect();
    }

    pub fn points(&self) -> &[SeriesPoint] {
        &self.points
    }

    pub fn len(&self) -> usize {
        self.points.len()
    }

    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }

    pub fn first_date(&self) -> Option<NaiveDate> {
        self.points.first().map(|p| p.date)
    }

    pub fn last_date(&self) -> Option<NaiveDate> {
        self.points.last().map(|p| p.date)
    }

    pub fn max_day_offset(&self) -> Option<i64> {
        self.points.iter().map(|p| p.day_offset).max()
    }

    pub fn mean_price(&self) -> Option<f64> {
        if self.points.is_empty() {
            None
        } else {
            Some(self.points.iter().map(|p| p.price).sum::<f64>() / self.points.len() as f64)
        }
    }

    pub fn stats(&self) -> Option<SeriesStats> {
        let latest = self.points.last()?.price;
        let (min, max) = self
            .points
            .iter()
            .fold((f64::INFINITY, f64::NEG_INFINITY), |(lo, hi), p| (lo.min(p.price), hi.max(p.price)));
        Some(SeriesStats {
            count: self.points.len(),
            min,
            max,
            mean: self.mean_price()?,
            latest,
        })
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct SeriesStats {
    pub count: usize,
    pub min: f64,
    pub max: f64,
    pub mean: f64,
    pub latest: f64,
}

/// Vehicle and economic inputs of one break-even run.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Assumptions {
    pub gasoline_car_price: f64,
    pub hybrid_car_price: f64,
    pub ev_car_price: f64,
    pub gasoline_car_kpl: f64,
    pub hybrid_car_kpl: f64,
    pub ev_kwh_per_km: f64,
    pub gasoline_maintenance_annual: f64,
    pub hybrid_maintenance_annual: f64,
    pub ev_maintenance_annual: f64,
    pub km_per_year: f64,
    pub electricity_price_per_kwh: f64,
    pub years_to_own: u32,
    pub depreciation_rate: f64,
}

impl Default for Assumptions {
    fn default() -> Self {
        Assumptions {
            gasoline_car_price: 990_000.0,
            hybrid_car_price: 1_290_000.0,
            ev_car_price: 1_590_000.0,
            gasoline_car_kpl: 12.0,
            hybrid_car_kpl: 25.0,
            ev_kwh_per_km: 0.15,
            gasoline_maintenance_annual: 10_000.0,
            hybrid_maintenance_annual: 10_000.0,
            ev_maintenance_annual: 4_000.0,
            km_per_year: 50_000.0,
            electricity_price_per_kwh: 4.30,
            years_to_own: 5,
            depreciation_rate: 0.05,
        }
    }
}

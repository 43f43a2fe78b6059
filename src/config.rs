// src/config.rs
use log::warn;
use std::env;
use std::fmt::Display;
use std::ops::RangeInclusive;
use std::path::PathBuf;
use std::str::FromStr;
use std::time::Duration;

use crate::models::{Assumptions, FuelType};
use crate::services::source::HISTORICAL_PRICE_URL;

#[derive(Debug, Clone)]
pub struct AppConfig {
    pub port: u16,
    pub data_dir: PathBuf,
    pub history_years: RangeInclusive<i32>,
    pub scrape_years: RangeInclusive<i32>,
    pub fetch_timeout: Duration,
    pub price_source_url: String,
    pub reference_fuel: FuelType,
    pub assumptions: Assumptions,
}

impl Default for AppConfig {
    fn default() -> Self {
        AppConfig {
            port: 3030,
            data_dir: PathBuf::from("fuel_data"),
            history_years: 2020..=2024,
            scrape_years: 2016..=2025,
            fetch_timeout: Duration::from_secs(30),
            price_source_url: HISTORICAL_PRICE_URL.to_string(),
            reference_fuel: FuelType::Gasohol95,
            assumptions: Assumptions::default(),
        }
    }
}

fn var_or<T>(key: &str, default: T) -> T
where
    T: FromStr + Display,
    T::Err: Display,
{
    match env::var(key) {
        Ok(raw) => raw.trim().parse().unwrap_or_else(|e| {
            warn!("Invalid ${} '{}' ({}), defaulting to {}", key, raw, e, default);
            default
        }),
        Err(_) => {
            warn!("${} not set, defaulting to {}", key, default);
            default
        }
    }
}

impl AppConfig {
    /// Reads configuration from the environment (and `.env`, if the caller
    /// loaded it). Anything unset or unparsable keeps its default.
    pub fn from_env() -> Self {
        let d = AppConfig::default();
        let a = d.assumptions.clone();

        let history_years = var_or("HISTORY_START_YEAR", *d.history_years.start())
            ..=var_or("HISTORY_END_YEAR", *d.history_years.end());
        let scrape_years = var_or("SCRAPE_START_YEAR", *d.scrape_years.start())
            ..=var_or("SCRAPE_END_YEAR", *d.scrape_years.end());

        AppConfig {
            port: var_or("PORT", d.port),
            data_dir: PathBuf::from(var_or("FUEL_DATA_DIR", d.data_dir.display().to_string())),
            history_years,
            scrape_years,
            fetch_timeout: Duration::from_secs(var_or("FETCH_TIMEOUT_SECS", d.fetch_timeout.as_secs())),
            price_source_url: var_or("PRICE_SOURCE_URL", d.price_source_url.clone()),
            reference_fuel: var_or("REFERENCE_FUEL", d.reference_fuel),
            assumptions: Assumptions {
                km_per_year: var_or("KM_PER_YEAR", a.km_per_year),
                years_to_own: var_or("YEARS_TO_OWN", a.years_to_own),
                electricity_price_per_kwh: var_or("ELECTRICITY_PRICE_PER_KWH", a.electricity_price_per_kwh),
                depreciation_rate: var_or("DEPRECIATION_RATE", a.depreciation_rate),
                ..a
            },
        }
    }
}

/// Keeps the known fuel type names, warning about the rest.
pub fn parse_fuel_types<S: AsRef<str>>(names: &[S]) -> Vec<FuelType> {
    let mut fuel_types = Vec::new();
    for name in names {
        match name.as_ref().parse::<FuelType>() {
            Ok(f) if !fuel_types.contains(&f) => fuel_types.push(f),
            Ok(_) => {}
            Err(e) => warn!("{}; skipping", e),
        }
    }
    fuel_types
}

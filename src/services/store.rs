// src/services/store.rs
use anyhow::{Context, Result};
use chrono::NaiveDate;
use csv::{Reader, Writer};
use log::{info, warn};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::Mutex;

use crate::models::{FuelType, PricePoint};
use crate::services::extractor::ExtractionResult;

/// One persisted record-set, minus the records that could not be read.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct YearRecords {
    pub points: Vec<PricePoint>,
    pub skipped_records: usize,
}

/// Yearly record-sets of (date, price), one per fuel type per year.
pub trait PriceStore {
    /// `Ok(None)` when nothing was ever persisted for that fuel type and year.
    /// `Err` is reserved for a record-set that cannot be read at all.
    fn load_year(&self, fuel_type: FuelType, year: i32) -> Result<Option<YearRecords>>;
    fn save_year(&self, fuel_type: FuelType, year: i32, points: &[PricePoint]) -> Result<()>;
}

#[derive(Debug, Serialize, Deserialize)]
struct PriceRecord {
    date: NaiveDate,
    price: f64,
}

/// CSV files laid out as `<root>/<fuel_type>/<year>.csv`.
#[derive(Debug, Clone)]
pub struct CsvPriceStore {
    root: PathBuf,
}

impl CsvPriceStore {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        CsvPriceStore { root: root.into() }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    pub fn year_path(&self, fuel_type: FuelType, year: i32) -> PathBuf {
        self.root.join(fuel_type.as_str()).join(format!("{}.csv", year))
    }
}

impl PriceStore for CsvPriceStore {
    fn load_year(&self, fuel_type: FuelType, year: i32) -> Result<Option<YearRecords>> {
        let path = self.year_path(fuel_type, year);
        if !path.exists() {
            return Ok(None);
        }

        let mut rdr = Reader::from_path(&path)
            .with_context(|| format!("Failed to open {}", path.display()))?;
        let mut loaded = YearRecords::default();
        for record in rdr.deserialize::<PriceRecord>() {
            match record {
                Ok(record) => loaded.points.push(PricePoint { date: record.date, price: record.price, fuel_type }),
                Err(e) if e.is_io_error() => {
                    return Err(e).with_context(|| format!("Failed to read {}", path.display()));
                }
                Err(e) => {
                    warn!("Skipping malformed record in {}: {}", path.display(), e);
                    loaded.skipped_records += 1;
                }
            }
        }
        Ok(Some(loaded))
    }

    fn save_year(&self, fuel_type: FuelType, year: i32, points: &[PricePoint]) -> Result<()> {
        if points.is_empty() {
            return Ok(());
        }
        let path = self.year_path(fuel_type, year);
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)
                .with_context(|| format!("Failed to create {}", parent.display()))?;
        }

        let mut sorted = points.to_vec();
        sorted.sort_by_key(|p| p.date);

        let mut wtr = Writer::from_path(&path)
            .with_context(|| format!("Failed to create {}", path.display()))?;
        for p in &sorted {
            wtr.serialize(PriceRecord { date: p.date, price: p.price })?;
        }
        wtr.flush()?;
        Ok(())
    }
}

/// In-process store, used when nothing should touch the filesystem.
#[derive(Debug, Default)]
pub struct MemoryPriceStore {
    years: Mutex<HashMap<(FuelType, i32), Vec<PricePoint>>>,
}

impl PriceStore for MemoryPriceStore {
    fn load_year(&self, fuel_type: FuelType, year: i32) -> Result<Option<YearRecords>> {
        let years = self.years.lock().map_err(|_| anyhow::anyhow!("price store lock poisoned"))?;
        Ok(years
            .get(&(fuel_type, year))
            .map(|points| YearRecords { points: points.clone(), skipped_records: 0 }))
    }

    fn save_year(&self, fuel_type: FuelType, year: i32, points: &[PricePoint]) -> Result<()> {
        if points.is_empty() {
            return Ok(());
        }
        let mut years = self.years.lock().map_err(|_| anyhow::anyhow!("price store lock poisoned"))?;
        years.insert((fuel_type, year), points.to_vec());
        Ok(())
    }
}

/// Saves every non-empty fuel type of one year's extraction.
/// Returns the number of record-sets written.
pub fn persist_extraction(store: &dyn PriceStore, result: &ExtractionResult) -> usize {
    let mut written = 0;
    for (&fuel_type, points) in &result.prices {
        if points.is_empty() {
            continue;
        }
        match store.save_year(fuel_type, result.year, points) {
            Ok(()) => {
                info!("Saved {} {} prices for {}", points.len(), fuel_type, result.year);
                written += 1;
            }
            Err(e) => warn!("Failed to save {} prices for {}: {:#}", fuel_type, result.year, e),
        }
    }
    written
}

#[cfg(test)]
mod tests {
    use super::*;

    fn scratch_dir(name: &str) -> PathBuf {
        let mut p = std::env::temp_dir();
        p.push(format!("fuel_breakeven_{}_{}", name, std::process::id()));
        let _ = fs::remove_dir_all(&p);
        p
    }

    fn point(y: i32, m: u32, d: u32, price: f64) -> PricePoint {
        PricePoint {
            date: NaiveDate::from_ymd_opt(y, m, d).unwrap(),
            price,
            fuel_type: FuelType::Diesel,
        }
    }

    #[test]
    fn csv_store_writes_sorted_and_reads_back() {
        let dir = scratch_dir("csv_roundtrip");
        let store = CsvPriceStore::new(&dir);
        store
            .save_year(FuelType::Diesel, 2023, &[point(2023, 5, 2, 31.5), point(2023, 5, 1, 31.0)])
            .unwrap();

        let text = fs::read_to_string(store.year_path(FuelType::Diesel, 2023)).unwrap();
        assert!(text.starts_with("date,price\n2023-05-01,31"));

        let loaded = store.load_year(FuelType::Diesel, 2023).unwrap().unwrap();
        assert_eq!(loaded.points.len(), 2);
        assert_eq!(loaded.skipped_records, 0);
        assert_eq!(loaded.points[0].date, NaiveDate::from_ymd_opt(2023, 5, 1).unwrap());
        assert_eq!(loaded.points[0].fuel_type, FuelType::Diesel);

        let _ = fs::remove_dir_all(&dir);
    }

    #[test]
    fn malformed_record_skips_only_that_record() {
        let dir = scratch_dir("malformed");
        let store = CsvPriceStore::new(&dir);
        let path = store.year_path(FuelType::Gasohol95, 2024);
        fs::create_dir_all(path.parent().unwrap()).unwrap();
        fs::write(&path, "date,price\n2024-01-01,35.0\n2024-01-02,abc\n2024-01-03,35.2\n").unwrap();

        let loaded = store.load_year(FuelType::Gasohol95, 2024).unwrap().unwrap();
        assert_eq!(loaded.skipped_records, 1);
        let prices: Vec<f64> = loaded.points.iter().map(|p| p.price).collect();
        assert_eq!(prices, vec![35.0, 35.2]);

        let _ = fs::remove_dir_all(&dir);
    }

    #[test]
    fn missing_year_is_none() {
        let store = CsvPriceStore::new(scratch_dir("missing"));
        assert!(store.load_year(FuelType::GasoholE85, 2020).unwrap().is_none());
    }

    #[test]
    fn empty_record_set_is_not_written() {
        let dir = scratch_dir("empty");
        let store = CsvPriceStore::new(&dir);
        store.save_year(FuelType::Diesel, 2021, &[]).unwrap();
        assert!(!store.year_path(FuelType::Diesel, 2021).exists());
    }
}

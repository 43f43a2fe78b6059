// src/services/extractor.rs
use chrono::NaiveDate;
use log::{debug, info, warn};
use scraper::{ElementRef, Html, Selector};
use serde::Serialize;
use std::collections::BTreeMap;

use crate::errors::ScrapeError;
use crate::models::{FuelType, PricePoint};

pub const PRICE_TABLE_SELECTOR: &str = "table.table--historical-oilprice";
pub const DATE_FORMAT: &str = "%d/%m/%Y";
const MISSING_MARKER: &str = "-";
// Body rows carry the date in a <th>, so td positions trail header positions by one.
const HEADER_BODY_OFFSET: usize = 1;

/// Where a fuel type's prices live in one year's table, if anywhere.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum ColumnResolution {
    Resolved { header_position: usize, cell_index: usize },
    Absent,
}

/// Column titles of one year's table: the date label followed by one
/// title per price column, in markup order.
#[derive(Debug, Clone, PartialEq)]
pub struct HeaderIndex {
    headers: Vec<String>,
}

impl HeaderIndex {
    pub fn new(date_label: String, column_titles: Vec<String>) -> Self {
        let mut headers = Vec::with_capacity(column_titles.len() + 1);
        headers.push(date_label);
        headers.extend(column_titles);
        HeaderIndex { headers }
    }

    pub fn headers(&self) -> &[String] {
        &self.headers
    }

    pub fn resolve(&self, fuel_type: FuelType) -> ColumnResolution {
        let label = fuel_type.display_label();
        match self.headers.iter().position(|h| h == label) {
            Some(pos) if pos >= HEADER_BODY_OFFSET => ColumnResolution::Resolved {
                header_position: pos,
                cell_index: pos - HEADER_BODY_OFFSET,
            },
            _ => ColumnResolution::Absent,
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct SkipCounts {
    pub rows_without_date: usize,
    pub unparsable_dates: usize,
    pub short_rows: usize,
    pub missing_values: usize,
    pub unparsable_prices: usize,
    pub non_positive_prices: usize,
}

/// Per-fuel-type prices extracted from one year's table.
#[derive(Debug, Clone, Serialize)]
pub struct ExtractionResult {
    pub year: i32,
    pub prices: BTreeMap<FuelType, Vec<PricePoint>>,
    pub missing_fuel_types: Vec<FuelType>,
    pub rows_read: usize,
    pub skipped: SkipCounts,
    pub diagnostic: Option<String>,
}

impl ExtractionResult {
    pub fn empty(year: i32, diagnostic: Option<String>) -> Self {
        ExtractionResult {
            year,
            prices: BTreeMap::new(),
            missing_fuel_types: Vec::new(),
            rows_read: 0,
            skipped: SkipCounts::default(),
            diagnostic,
        }
    }

    pub fn is_empty(&self) -> bool {
        self.prices.values().all(|points| points.is_empty())
    }

    pub fn points_for(&self, fuel_type: FuelType) -> &[PricePoint] {
        self.prices.get(&fuel_type).map(Vec::as_slice).unwrap_or(&[])
    }

    pub fn total_points(&self) -> usize {
        self.prices.values().map(Vec::len).sum()
    }
}

fn selector(css: &'static str) -> Result<Selector, ScrapeError> {
    Selector::parse(css).map_err(|e| ScrapeError::Selector(format!("{}: {:?}", css, e)))
}

fn cell_text(el: &ElementRef) -> String {
    el.text().collect::<String>().trim().to_string()
}

/// Parses one price cell. `Ok(None)` is a missing value, not a failure.
pub fn parse_price(text: &str) -> Result<Option<f64>, ScrapeError> {
    let text = text.trim();
    if text.is_empty() || text == MISSING_MARKER {
        return Ok(None);
    }
    text.parse::<f64>()
        .map(Some)
        .map_err(|e| ScrapeError::Parse { value: text.to_string(), message: e.to_string() })
}

pub fn parse_date(text: &str) -> Result<NaiveDate, ScrapeError> {
    NaiveDate::parse_from_str(text.trim(), DATE_FORMAT)
        .map_err(|e| ScrapeError::Parse { value: text.trim().to_string(), message: e.to_string() })
}

/// Reads the two header rows into a `HeaderIndex`.
pub fn resolve_headers(table: &ElementRef, year: i32) -> Result<HeaderIndex, ScrapeError> {
    let header_row_sel = selector("thead > tr")?;
    let th_sel = selector("th")?;

    let header_rows: Vec<ElementRef> = table.select(&header_row_sel).collect();
    if header_rows.len() < 2 {
        return Err(ScrapeError::Structure {
            year,
            message: format!("expected 2 header rows, found {}", header_rows.len()),
        });
    }

    let date_label = header_rows[0]
        .select(&th_sel)
        .next()
        .map(|th| cell_text(&th))
        .ok_or_else(|| ScrapeError::Structure {
            year,
            message: "first header row has no date header".to_string(),
        })?;

    // Columns are identified by their title attribute, not the visible text.
    let column_titles: Vec<String> = header_rows[1]
        .select(&th_sel)
        .map(|th| th.value().attr("title").unwrap_or("").trim().to_string())
        .collect();
    if column_titles.is_empty() {
        return Err(ScrapeError::Structure {
            year,
            message: "second header row has no price columns".to_string(),
        });
    }

    Ok(HeaderIndex::new(date_label, column_titles))
}

/// Extracts the requested fuel types from one year's markup.
///
/// Never fails: structural problems yield an empty result carrying a
/// diagnostic, and bad cells or rows are counted and skipped.
pub fn extract_year(markup: &str, year: i32, fuel_types: &[FuelType]) -> ExtractionResult {
    match try_extract(markup, year, fuel_types) {
        Ok(result) => result,
        Err(e) => {
            warn!("{}", e);
            ExtractionResult::empty(year, Some(e.to_string()))
        }
    }
}

fn try_extract(markup: &str, year: i32, fuel_types: &[FuelType]) -> Result<ExtractionResult, ScrapeError> {
    let document = Html::parse_document(markup);
    let table_sel = selector(PRICE_TABLE_SELECTOR)?;
    let body_row_sel = selector("tbody > tr")?;
    let th_sel = selector("th")?;
    let td_sel = selector("td")?;

    let table = document.select(&table_sel).next().ok_or_else(|| ScrapeError::Structure {
        year,
        message: "price table not found".to_string(),
    })?;

    let header_index = resolve_headers(&table, year)?;

    let mut result = ExtractionResult::empty(year, None);
    let mut columns: Vec<(FuelType, usize)> = Vec::new();
    for &fuel_type in fuel_types {
        if columns.iter().any(|(f, _)| *f == fuel_type) {
            continue;
        }
        match header_index.resolve(fuel_type) {
            ColumnResolution::Resolved { cell_index, .. } => columns.push((fuel_type, cell_index)),
            ColumnResolution::Absent => {
                warn!(
                    "'{}' not found in {} table headers; available: {:?}",
                    fuel_type.display_label(),
                    year,
                    header_index.headers()
                );
                result.missing_fuel_types.push(fuel_type);
            }
        }
    }

    if columns.is_empty() {
        warn!("No requested fuel types found in {} table headers", year);
        result.diagnostic = Some("no requested fuel types found in table headers".to_string());
        return Ok(result);
    }

    let mut rows: BTreeMap<FuelType, Vec<PricePoint>> =
        columns.iter().map(|(f, _)| (*f, Vec::new())).collect();

    for row in table.select(&body_row_sel) {
        let Some(date_cell) = row.select(&th_sel).next() else {
            result.skipped.rows_without_date += 1;
            continue;
        };
        let date = match parse_date(&cell_text(&date_cell)) {
            Ok(date) => date,
            Err(e) => {
                debug!("Skipping row in {}: {}", year, e);
                result.skipped.unparsable_dates += 1;
                continue;
            }
        };
        result.rows_read += 1;

        let cells: Vec<ElementRef> = row.select(&td_sel).collect();
        for &(fuel_type, cell_index) in &columns {
            let Some(cell) = cells.get(cell_index) else {
                result.skipped.short_rows += 1;
                continue;
            };
            match parse_price(&cell_text(cell)) {
                Ok(Some(price)) if price > 0.0 => {
                    if let Some(points) = rows.get_mut(&fuel_type) {
                        points.push(PricePoint { date, price, fuel_type });
                    }
                }
                Ok(Some(price)) => {
                    debug!("Dropping non-positive {} price {} on {}", fuel_type, price, date);
                    result.skipped.non_positive_prices += 1;
                }
                Ok(None) => result.skipped.missing_values += 1,
                Err(e) => {
                    debug!("Skipping {} cell on {}: {}", fuel_type, date, e);
                    result.skipped.unparsable_prices += 1;
                }
            }
        }
    }

    for (fuel_type, mut points) in rows {
        if points.is_empty() {
            warn!("No data found for {} in {}", fuel_type.display_label(), year);
        } else {
            points.sort_by_key(|p| p.date);
            info!("Extracted {} {} prices for {}", points.len(), fuel_type, year);
        }
        result.prices.insert(fuel_type, points);
    }

    Ok(result)
}

// src/errors.rs
use std::fmt;

/// Failures while obtaining or reading one year's price table.
///
/// Every variant is recoverable: the affected year, cell or fuel type is
/// skipped and the rest of the run continues.
#[derive(Debug, Clone, PartialEq)]
pub enum ScrapeError {
    Transport { year: i32, message: String },
    Structure { year: i32, message: String },
    Parse { value: String, message: String },
    UnknownFuelType(String),
    Selector(String),
}

impl fmt::Display for ScrapeError {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            ScrapeError::Transport { year, message } => {
                write!(f, "transport error for year {}: {}", year, message)
            }
            ScrapeError::Structure { year, message } => {
                write!(f, "unexpected table structure for year {}: {}", year, message)
            }
            ScrapeError::Parse { value, message } => {
                write!(f, "could not parse '{}': {}", value, message)
            }
            ScrapeError::UnknownFuelType(name) => write!(f, "unknown fuel type: {}", name),
            ScrapeError::Selector(message) => write!(f, "invalid selector: {}", message),
        }
    }
}

impl std::error::Error for ScrapeError {}

/// Assumption bundles the break-even model cannot be evaluated with.
#[derive(Debug, Clone, PartialEq)]
pub enum AssumptionError {
    ZeroHorizon,
    NonPositive(&'static str),
    DepreciationOutOfRange(f64),
}

impl fmt::Display for AssumptionError {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            AssumptionError::ZeroHorizon => write!(f, "years_to_own must be at least 1"),
            AssumptionError::NonPositive(field) => write!(f, "{} must be greater than zero", field),
            AssumptionError::DepreciationOutOfRange(rate) => {
                write!(f, "depreciation_rate {} must be within [0, 1)", rate)
            }
        }
    }
}

impl std::error::Error for AssumptionError {}

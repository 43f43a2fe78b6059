// src/services/calculations.rs
use serde::Serialize;
use log::{info, warn};

use crate::errors::AssumptionError;
use crate::models::Assumptions;

/// Vehicle prices are projected this many years ahead before comparison.
pub const DEPRECIATION_YEARS: u32 = 1;
const MONTHS_PER_YEAR: f64 = 12.0;

/// A break-even figure that may never be reached.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
#[serde(tag = "kind", content = "value", rename_all = "snake_case")]
pub enum Outcome {
    Finite(f64),
    Never,
}

impl Outcome {
    pub fn finite(&self) -> Option<f64> {
        match self {
            Outcome::Finite(v) => Some(*v),
            Outcome::Never => None,
        }
    }

    /// Numeric view for consumers that want positive infinity for `Never`.
    pub fn as_f64(&self) -> f64 {
        self.finite().unwrap_or(f64::INFINITY)
    }

    pub fn is_never(&self) -> bool {
        matches!(self, Outcome::Never)
    }
}

/// One alternative vehicle measured against the gasoline car.
#[derive(Debug, Clone, Serialize)]
pub struct VehicleComparison {
    pub future_price: f64,
    pub price_difference: f64,
    pub cost_per_km: f64,
    pub savings_per_km: f64,
    pub annual_fuel_savings: f64,
    pub annual_maintenance_savings: f64,
    pub annual_savings: f64,
    pub break_even_years: Outcome,
    pub required_monthly_km: Outcome,
}

#[derive(Debug, Clone, Serialize)]
pub struct BreakEvenResult {
    pub fuel_price: f64,
    pub gasoline_future_price: f64,
    pub gasoline_cost_per_km: f64,
    pub hybrid: VehicleComparison,
    pub ev: VehicleComparison,
    pub assumptions: Assumptions,
}

pub fn depreciate(price: f64, rate: f64, years: u32) -> f64 {
    price * (1.0 - rate).powi(years as i32)
}

fn require_positive(value: f64, field: &'static str) -> Result<(), AssumptionError> {
    if value > 0.0 {
        Ok(())
    } else {
        Err(AssumptionError::NonPositive(field))
    }
}

impl Assumptions {
    pub fn validate(&self) -> Result<(), AssumptionError> {
        if self.years_to_own == 0 {
            return Err(AssumptionError::ZeroHorizon);
        }
        if !(0.0..1.0).contains(&self.depreciation_rate) {
            return Err(AssumptionError::DepreciationOutOfRange(self.depreciation_rate));
        }
        require_positive(self.gasoline_car_price, "gasoline_car_price")?;
        require_positive(self.hybrid_car_price, "hybrid_car_price")?;
        require_positive(self.ev_car_price, "ev_car_price")?;
        require_positive(self.gasoline_car_kpl, "gasoline_car_kpl")?;
        require_positive(self.hybrid_car_kpl, "hybrid_car_kpl")?;
        require_positive(self.ev_kwh_per_km, "ev_kwh_per_km")?;
        require_positive(self.km_per_year, "km_per_year")?;
        Ok(())
    }
}

fn break_even_years(price_difference: f64, annual_savings: f64) -> Outcome {
    if annual_savings > 0.0 {
        // A cheaper alternative has paid for itself on day one.
        Outcome::Finite(price_difference.max(0.0) / annual_savings)
    } else {
        Outcome::Never
    }
}

/// Monthly distance needed to recoup `price_difference` within `years_to_own`.
pub fn required_monthly_km(
    price_difference: f64,
    years_to_own: u32,
    savings_per_km: f64,
    annual_maintenance_savings: f64,
) -> Outcome {
    if savings_per_km <= 0.0 {
        return Outcome::Never;
    }
    let required_annual_savings = price_difference / years_to_own as f64;
    let required_annual_km = (required_annual_savings - annual_maintenance_savings) / savings_per_km;
    Outcome::Finite(required_annual_km.max(0.0) / MONTHS_PER_YEAR)
}

fn compare(
    a: &Assumptions,
    gasoline_future_price: f64,
    gasoline_cost_per_km: f64,
    vehicle_price: f64,
    cost_per_km: f64,
    maintenance_annual: f64,
) -> VehicleComparison {
    let future_price = depreciate(vehicle_price, a.depreciation_rate, DEPRECIATION_YEARS);
    let price_difference = future_price - gasoline_future_price;
    let savings_per_km = gasoline_cost_per_km - cost_per_km;
    let annual_fuel_savings = savings_per_km * a.km_per_year;
    let annual_maintenance_savings = a.gasoline_maintenance_annual - maintenance_annual;
    let annual_savings = annual_fuel_savings + annual_maintenance_savings;

    VehicleComparison {
        future_price,
        price_difference,
        cost_per_km,
        savings_per_km,
        annual_fuel_savings,
        annual_maintenance_savings,
        annual_savings,
        break_even_years: break_even_years(price_difference, annual_savings),
        required_monthly_km: required_monthly_km(
            price_difference,
            a.years_to_own,
            savings_per_km,
            annual_maintenance_savings,
        ),
    }
}

/// Compares hybrid and EV ownership against gasoline at the forecast
/// `fuel_price` (THB per liter).
pub fn calculate_break_even(assumptions: &Assumptions, fuel_price: f64) -> Result<BreakEvenResult, AssumptionError> {
    assumptions.validate()?;
    let a = assumptions;

    let gasoline_future_price = depreciate(a.gasoline_car_price, a.depreciation_rate, DEPRECIATION_YEARS);
    let gasoline_cost_per_km = fuel_price / a.gasoline_car_kpl;
    let hybrid_cost_per_km = fuel_price / a.hybrid_car_kpl;
    let ev_cost_per_km = a.electricity_price_per_kwh * a.ev_kwh_per_km;

    let hybrid = compare(
        a,
        gasoline_future_price,
        gasoline_cost_per_km,
        a.hybrid_car_price,
        hybrid_cost_per_km,
        a.hybrid_maintenance_annual,
    );
    let ev = compare(
        a,
        gasoline_future_price,
        gasoline_cost_per_km,
        a.ev_car_price,
        ev_cost_per_km,
        a.ev_maintenance_annual,
    );

    for (name, cmp) in [("hybrid", &hybrid), ("EV", &ev)] {
        match cmp.break_even_years {
            Outcome::Finite(years) => info!("{} breaks even after {:.1} years", name, years),
            Outcome::Never => warn!("{} never recoups its price premium at {} km/year", name, a.km_per_year),
        }
    }

    Ok(BreakEvenResult {
        fuel_price,
        gasoline_future_price,
        gasoline_cost_per_km,
        hybrid,
        ev,
        assumptions: a.clone(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn close(a: f64, b: f64, tol: f64) -> bool {
        (a - b).abs() <= tol
    }

    #[test]
    fn hybrid_reference_scenario() {
        let result = calculate_break_even(&Assumptions::default(), 32.55).unwrap();
        let hybrid = &result.hybrid;

        let savings_per_km = 32.55 / 12.0 - 32.55 / 25.0;
        assert!(close(hybrid.savings_per_km, savings_per_km, 1e-9));
        assert!(close(hybrid.annual_fuel_savings, savings_per_km * 50_000.0, 1e-6));
        assert_eq!(hybrid.annual_maintenance_savings, 0.0);
        assert!(close(hybrid.price_difference, 300_000.0 * 0.95, 1e-6));

        let years = hybrid.break_even_years.finite().unwrap();
        assert!(close(years, 285_000.0 / (savings_per_km * 50_000.0), 1e-9));
        assert!(years > 4.0 && years < 4.2);
    }

    #[test]
    fn ev_uses_electricity_cost_and_maintenance_offset() {
        let result = calculate_break_even(&Assumptions::default(), 32.55).unwrap();
        let ev = &result.ev;
        assert!(close(ev.cost_per_km, 4.30 * 0.15, 1e-12));
        assert_eq!(ev.annual_maintenance_savings, 6_000.0);
        assert!(close(ev.annual_savings, ev.savings_per_km * 50_000.0 + 6_000.0, 1e-6));
    }

    #[test]
    fn required_mileage_for_five_years() {
        let result = calculate_break_even(&Assumptions::default(), 32.55).unwrap();
        let hybrid = &result.hybrid;
        let expected = (285_000.0 / 5.0) / hybrid.savings_per_km / 12.0;
        assert!(close(hybrid.required_monthly_km.finite().unwrap(), expected, 1e-6));
    }

    #[test]
    fn zero_annual_savings_never_breaks_even() {
        let a = Assumptions { hybrid_car_kpl: 12.0, ..Assumptions::default() };
        let result = calculate_break_even(&a, 32.55).unwrap();
        assert_eq!(result.hybrid.annual_savings, 0.0);
        assert!(result.hybrid.break_even_years.is_never());
        assert_eq!(result.hybrid.break_even_years.as_f64(), f64::INFINITY);
        assert!(result.hybrid.required_monthly_km.is_never());
    }

    #[test]
    fn cheaper_alternative_breaks_even_immediately() {
        let a = Assumptions { ev_car_price: 900_000.0, ..Assumptions::default() };
        let result = calculate_break_even(&a, 32.55).unwrap();
        assert_eq!(result.ev.break_even_years, Outcome::Finite(0.0));
        assert_eq!(result.ev.required_monthly_km, Outcome::Finite(0.0));
    }

    #[test]
    fn depreciation_is_one_geometric_step() {
        let result = calculate_break_even(&Assumptions::default(), 32.55).unwrap();
        assert!(close(result.gasoline_future_price, 940_500.0, 1e-6));
        assert!(close(result.ev.future_price, 1_510_500.0, 1e-6));
    }

    #[test]
    fn zero_horizon_is_rejected() {
        let a = Assumptions { years_to_own: 0, ..Assumptions::default() };
        assert_eq!(calculate_break_even(&a, 32.55).unwrap_err(), AssumptionError::ZeroHorizon);

        let a = Assumptions { gasoline_car_kpl: 0.0, ..Assumptions::default() };
        assert_eq!(
            calculate_break_even(&a, 32.55).unwrap_err(),
            AssumptionError::NonPositive("gasoline_car_kpl")
        );
    }

    #[test]
    fn outcome_serializes_tagged() {
        let json = serde_json::to_value(Outcome::Never).unwrap();
        assert_eq!(json["kind"], "never");
        let json = serde_json::to_value(Outcome::Finite(2.5)).unwrap();
        assert_eq!(json["value"], 2.5);
    }
}

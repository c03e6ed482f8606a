//! Retirement savings projection.
//!
//! Stateless and purely functional: `project` maps parameters to a result
//! using the closed-form ordinary-annuity future value
//! `FV = PV*(1+r)^n + PMT*((1+r)^n - 1)/r`, so recomputing on every
//! parameter change is exact and O(1) per point.

use serde::{Deserialize, Serialize};
use std::str::FromStr;

/// Statutory retirement age used when the caller does not override it
pub const DEFAULT_RETIREMENT_AGE: u32 = 67;

/// Fixed assumed monthly growth rate of invested savings
pub const ASSUMED_MONTHLY_RATE: f64 = 0.004;

/// Mandatory-savings tiers under the pension regulation. The rate applies to
/// gross monthly income and is added to the voluntary contribution stream.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
pub enum MandatoryRate {
    /// Employee deposit only
    #[serde(rename = "employee")]
    EmployeeOnly,
    /// Employee plus employer deposits
    #[serde(rename = "employee-employer")]
    EmployeeEmployer,
    /// Employee, employer, and severance deposits
    #[serde(rename = "full")]
    FullDeposit,
}

impl MandatoryRate {
    pub fn rate(self) -> f64 {
        match self {
            MandatoryRate::EmployeeOnly => 0.06,
            MandatoryRate::EmployeeEmployer => 0.125,
            MandatoryRate::FullDeposit => 0.2083,
        }
    }
}

impl FromStr for MandatoryRate {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim() {
            "employee" => Ok(MandatoryRate::EmployeeOnly),
            "employee-employer" => Ok(MandatoryRate::EmployeeEmployer),
            "full" => Ok(MandatoryRate::FullDeposit),
            other => Err(format!(
                "unknown mandatory rate: {other} (expected employee, employee-employer, or full)"
            )),
        }
    }
}

/// Pure projection input; no persistence, recomputed on every change
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct RetirementParameters {
    pub current_age: u32,
    pub retirement_age: u32,
    pub current_savings: f64,
    /// Gross monthly income, the base for the mandatory-savings stream
    pub monthly_income: f64,
    /// Voluntary monthly contribution on top of any mandatory stream
    pub monthly_contribution: f64,
    /// Desired monthly spending after retirement
    pub target_monthly_expense: f64,
    pub mandatory_savings: Option<MandatoryRate>,
}

/// One point of the discretized growth series
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq)]
pub struct SeriesPoint {
    pub year_offset: u32,
    pub balance: f64,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct RetirementProjection {
    /// Total monthly savings stream used in the projection
    pub monthly_saving: f64,
    /// Monthly contribution that would exactly fund the target expense
    pub monthly_target: f64,
    /// Capital needed at retirement to fund the target expense
    pub required_capital: f64,
    pub projected_at_retirement: f64,
    /// Positive = surplus, negative = shortfall
    pub surplus: f64,
    pub series: Vec<SeriesPoint>,
}

fn future_value(pv: f64, pmt: f64, r: f64, months: u32) -> f64 {
    let growth = (1.0 + r).powi(months as i32);
    pv * growth + pmt * ((growth - 1.0) / r)
}

/// Run the projection. Full precision throughout; round with
/// [`round_currency`] only when displaying.
pub fn project(params: &RetirementParameters) -> RetirementProjection {
    let r = ASSUMED_MONTHLY_RATE;
    let years = params.retirement_age.saturating_sub(params.current_age);
    let months = years * 12;

    let mandatory = params
        .mandatory_savings
        .map(|m| m.rate() * params.monthly_income)
        .unwrap_or(0.0);
    let monthly_saving = params.monthly_contribution + mandatory;

    // Perpetuity at the same assumed rate
    let required_capital = params.target_monthly_expense / r;

    let projected_at_retirement =
        future_value(params.current_savings, monthly_saving, r, months);

    let monthly_target = if months == 0 {
        0.0
    } else {
        let growth = (1.0 + r).powi(months as i32);
        let gap = required_capital - params.current_savings * growth;
        (gap * r / (growth - 1.0)).max(0.0)
    };

    let series = (0..=years)
        .map(|year| SeriesPoint {
            year_offset: year,
            balance: future_value(params.current_savings, monthly_saving, r, year * 12),
        })
        .collect();

    RetirementProjection {
        monthly_saving,
        monthly_target,
        required_capital,
        projected_at_retirement,
        surplus: projected_at_retirement - required_capital,
        series,
    }
}

/// Presentation-boundary rounding to whole currency units
pub fn round_currency(value: f64) -> f64 {
    value.round()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn params() -> RetirementParameters {
        RetirementParameters {
            current_age: 66,
            retirement_age: 67,
            current_savings: 0.0,
            monthly_income: 0.0,
            monthly_contribution: 1000.0,
            target_monthly_expense: 8000.0,
            mandatory_savings: None,
        }
    }

    #[test]
    fn test_matches_closed_form_over_twelve_months() {
        let projection = project(&params());
        // 1000 * [((1.004)^12 - 1) / 0.004]
        let expected = 1000.0 * ((1.004f64.powi(12) - 1.0) / 0.004);
        assert!((projection.projected_at_retirement - expected).abs() < 0.5);
    }

    #[test]
    fn test_series_is_yearly_and_starts_at_current_savings() {
        let mut p = params();
        p.current_age = 60;
        p.current_savings = 50_000.0;
        let projection = project(&p);
        assert_eq!(projection.series.len(), 8);
        assert_eq!(projection.series[0].year_offset, 0);
        assert!((projection.series[0].balance - 50_000.0).abs() < 1e-9);
        assert!(projection.series[7].balance > projection.series[0].balance);
    }

    #[test]
    fn test_mandatory_stream_adds_to_contribution() {
        let mut p = params();
        p.monthly_income = 20_000.0;
        let without = project(&p);
        p.mandatory_savings = Some(MandatoryRate::FullDeposit);
        let with = project(&p);
        assert!((with.monthly_saving - (1000.0 + 0.2083 * 20_000.0)).abs() < 1e-9);
        assert!(with.projected_at_retirement > without.projected_at_retirement);
    }

    #[test]
    fn test_already_retired() {
        let mut p = params();
        p.current_age = 70;
        p.current_savings = 123_456.0;
        let projection = project(&p);
        assert!((projection.projected_at_retirement - 123_456.0).abs() < 1e-9);
        assert_eq!(projection.monthly_target, 0.0);
        assert_eq!(projection.series.len(), 1);
    }

    #[test]
    fn test_monthly_target_funds_required_capital() {
        let mut p = params();
        p.current_age = 37;
        p.retirement_age = 67;
        p.current_savings = 100_000.0;
        let projection = project(&p);
        // Contributing exactly monthly_target reaches required_capital
        let months = 30 * 12;
        let reached = {
            let growth = (1.0 + ASSUMED_MONTHLY_RATE).powi(months);
            p.current_savings * growth
                + projection.monthly_target * ((growth - 1.0) / ASSUMED_MONTHLY_RATE)
        };
        assert!((reached - projection.required_capital).abs() < 1.0);
    }

    #[test]
    fn test_round_currency_only_at_presentation() {
        assert_eq!(round_currency(1234.49), 1234.0);
        assert_eq!(round_currency(1234.51), 1235.0);
    }

    #[test]
    fn test_mandatory_rate_parse() {
        assert_eq!("full".parse::<MandatoryRate>().unwrap(), MandatoryRate::FullDeposit);
        assert!("half".parse::<MandatoryRate>().is_err());
    }
}

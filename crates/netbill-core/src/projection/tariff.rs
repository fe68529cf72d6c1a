//! Export tariff schedules for the three regulatory routes.
//!
//! * **nominal**: one flat rate for the whole horizon, by capacity tier.
//! * **accelerated**: a short high-rate phase followed by a low-rate phase.
//! * **cpi**: a base rate indexed to inflation; systems above the route's
//!   eligibility cap fall back to the nominal flat rate.
//!
//! An optional urban premium is added on top of any route for a limited
//! number of initial years.

use std::fmt;
use std::str::FromStr;

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::config::TariffTable;
use crate::error::NetbillError;
use crate::time_value::escalate;
use crate::types::{AnnualSeries, Kwp, Money, Rate};
use crate::NetbillResult;

pub const DEFAULT_PREMIUM_YEARS: u32 = 15;

// ---------------------------------------------------------------------------
// Route
// ---------------------------------------------------------------------------

/// Regulatory tariff route applied to exported energy.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "snake_case")]
pub enum Route {
    Nominal,
    Accelerated,
    Cpi,
}

impl Route {
    pub fn as_str(&self) -> &'static str {
        match self {
            Route::Nominal => "nominal",
            Route::Accelerated => "accelerated",
            Route::Cpi => "cpi",
        }
    }
}

impl fmt::Display for Route {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Route {
    type Err = NetbillError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "nominal" => Ok(Route::Nominal),
            "accelerated" => Ok(Route::Accelerated),
            "cpi" => Ok(Route::Cpi),
            other => Err(NetbillError::invalid(
                "route",
                format!("'{other}' is not one of nominal / accelerated / cpi"),
            )),
        }
    }
}

// ---------------------------------------------------------------------------
// Input
// ---------------------------------------------------------------------------

/// Everything the tariff engine needs besides the tariff table.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TariffInput {
    pub route: Route,
    pub capacity_kwp: Kwp,
    pub lifetime_years: u32,
    /// Annual CPI used by the CPI-linked route
    pub cpi_rate: Rate,
    /// Added to the base rate during the premium window (0 disables it)
    pub urban_premium_amount: Money,
    #[serde(default = "default_premium_years")]
    pub premium_duration_years: u32,
}

fn default_premium_years() -> u32 {
    DEFAULT_PREMIUM_YEARS
}

// ---------------------------------------------------------------------------
// Core computation
// ---------------------------------------------------------------------------

/// Export tariff per year of operation, including any urban premium.
pub fn tariff_series(table: &TariffTable, input: &TariffInput) -> NetbillResult<AnnualSeries> {
    if input.capacity_kwp < Decimal::ZERO {
        return Err(NetbillError::invalid("capacity_kwp", "Capacity cannot be negative"));
    }

    let years = input.lifetime_years;
    let base = match input.route {
        Route::Nominal => nominal_series(table, input.capacity_kwp, years),
        Route::Accelerated => accelerated_series(table, input.capacity_kwp, years),
        Route::Cpi => cpi_series(table, input.capacity_kwp, years, input.cpi_rate),
    };

    Ok(apply_urban_premium(
        base,
        input.urban_premium_amount,
        input.premium_duration_years,
    ))
}

/// Flat nominal rate for the capacity's tier.
pub fn nominal_rate(table: &TariffTable, capacity_kwp: Kwp) -> Money {
    if table.is_tier1(capacity_kwp) {
        table.nominal.tier1
    } else {
        table.nominal.tier2
    }
}

fn nominal_series(table: &TariffTable, capacity_kwp: Kwp, years: u32) -> AnnualSeries {
    vec![nominal_rate(table, capacity_kwp); years as usize]
}

fn accelerated_series(table: &TariffTable, capacity_kwp: Kwp, years: u32) -> AnnualSeries {
    let acc = &table.accelerated;
    let rates = if table.is_tier1(capacity_kwp) {
        &acc.tier1
    } else {
        &acc.tier2
    };

    (0..years)
        .map(|t| {
            if t < acc.years_high {
                rates.high_phase
            } else {
                rates.low_phase
            }
        })
        .collect()
}

fn cpi_series(table: &TariffTable, capacity_kwp: Kwp, years: u32, cpi: Rate) -> AnnualSeries {
    // Over the eligibility cap the CPI route is unavailable; use the nominal rate
    if capacity_kwp > table.cpi.max_kw {
        return nominal_series(table, capacity_kwp, years);
    }
    escalate(table.cpi.base_rate, cpi, years)
}

/// Add `premium` to entries before `premium_years`; later entries unchanged.
pub fn apply_urban_premium(base: AnnualSeries, premium: Money, premium_years: u32) -> AnnualSeries {
    base.into_iter()
        .enumerate()
        .map(|(t, rate)| {
            if (t as u32) < premium_years {
                rate + premium
            } else {
                rate
            }
        })
        .collect()
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::{AcceleratedTariff, CpiTariff, NominalTariff, PhaseRates};
    use rust_decimal_macros::dec;

    fn table() -> TariffTable {
        TariffTable {
            tier_breakpoint_kw: dec!(15),
            nominal: NominalTariff {
                tier1: dec!(0.48),
                tier2: dec!(0.44),
            },
            accelerated: AcceleratedTariff {
                years_high: 5,
                tier1: PhaseRates {
                    high_phase: dec!(0.75),
                    low_phase: dec!(0.38),
                },
                tier2: PhaseRates {
                    high_phase: dec!(0.70),
                    low_phase: dec!(0.35),
                },
            },
            cpi: CpiTariff {
                base_rate: dec!(0.42),
                max_kw: dec!(15),
            },
        }
    }

    fn input(route: Route, capacity: Decimal) -> TariffInput {
        TariffInput {
            route,
            capacity_kwp: capacity,
            lifetime_years: 25,
            cpi_rate: dec!(0.02),
            urban_premium_amount: Decimal::ZERO,
            premium_duration_years: DEFAULT_PREMIUM_YEARS,
        }
    }

    #[test]
    fn test_nominal_tier1() {
        for kwp in [dec!(0.5), dec!(10), dec!(15)] {
            let s = tariff_series(&table(), &input(Route::Nominal, kwp)).unwrap();
            assert!(s.iter().all(|r| *r == dec!(0.48)), "kwp {kwp}");
        }
    }

    #[test]
    fn test_nominal_tier2() {
        for kwp in [dec!(15.01), dec!(20), dec!(30)] {
            let s = tariff_series(&table(), &input(Route::Nominal, kwp)).unwrap();
            assert!(s.iter().all(|r| *r == dec!(0.44)), "kwp {kwp}");
        }
    }

    #[test]
    fn test_accelerated_phases() {
        let s = tariff_series(&table(), &input(Route::Accelerated, dec!(20))).unwrap();
        assert_eq!(s.len(), 25);
        assert!(s[..5].iter().all(|r| *r == dec!(0.70)));
        assert!(s[5..].iter().all(|r| *r == dec!(0.35)));
    }

    #[test]
    fn test_accelerated_short_horizon_truncates_high_phase() {
        let mut i = input(Route::Accelerated, dec!(10));
        i.lifetime_years = 3;
        let s = tariff_series(&table(), &i).unwrap();
        assert_eq!(s, vec![dec!(0.75); 3]);
    }

    #[test]
    fn test_cpi_compounds() {
        let s = tariff_series(&table(), &input(Route::Cpi, dec!(10))).unwrap();
        assert_eq!(s[0], dec!(0.42));
        assert_eq!(s[1], dec!(0.4284));
        assert_eq!(s[2], dec!(0.436968));
    }

    #[test]
    fn test_cpi_over_cap_falls_back_to_nominal() {
        let s = tariff_series(&table(), &input(Route::Cpi, dec!(16))).unwrap();
        assert!(s.iter().all(|r| *r == dec!(0.44)));
    }

    #[test]
    fn test_urban_premium_window() {
        let mut i = input(Route::Nominal, dec!(10));
        i.urban_premium_amount = dec!(0.03);
        let s = tariff_series(&table(), &i).unwrap();
        assert!(s[..15].iter().all(|r| *r == dec!(0.51)));
        assert!(s[15..].iter().all(|r| *r == dec!(0.48)));
    }

    #[test]
    fn test_unknown_route_rejected() {
        assert!(matches!(
            "feed_in".parse::<Route>(),
            Err(NetbillError::InvalidArgument { .. })
        ));
        assert_eq!("cpi".parse::<Route>().unwrap(), Route::Cpi);
    }
}

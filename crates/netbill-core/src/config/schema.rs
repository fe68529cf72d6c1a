use std::collections::BTreeMap;

use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use serde::{Deserialize, Serialize};

use crate::error::NetbillError;
use crate::types::{Kwp, Money, Rate};
use crate::NetbillResult;

// ---------------------------------------------------------------------------
// Default assumptions (defaults.yaml)
// ---------------------------------------------------------------------------

/// Specific yield, either one figure for the whole country or per region.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(untagged)]
pub enum RegionalYield {
    Flat(Decimal),
    ByRegion(BTreeMap<String, Decimal>),
}

impl RegionalYield {
    /// kWh per kWp per year for `region`. A flat yield applies to every region.
    pub fn for_region(&self, region: &str) -> NetbillResult<Decimal> {
        match self {
            RegionalYield::Flat(y) => Ok(*y),
            RegionalYield::ByRegion(map) => map
                .get(region)
                .copied()
                .ok_or_else(|| NetbillError::lookup("yield_kwh_per_kwp_year", region)),
        }
    }
}

/// Leasing contract terms.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct LeasingTerms {
    /// Years during which the operator holds the system
    pub term_years: u32,
    /// Share of net operating cash paid to the roof owner during the term
    pub client_revenue_share: Rate,
}

/// Project-wide default assumptions.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Defaults {
    /// Analysis horizon in years of operation
    pub lifetime_years: u32,
    /// Annual module degradation (0.005 = 0.5%/yr)
    pub degradation_annual: Rate,
    /// Specific yield in kWh/kWp/yr
    pub yield_kwh_per_kwp_year: RegionalYield,
    /// Installable kWp per m² of roof
    pub power_density_kw_per_m2: Decimal,
    /// Upper bound of the regulated small-system segment
    #[serde(default = "default_max_capacity")]
    pub max_capacity_kwp: Kwp,
    /// Turnkey CAPEX per kWp by customer class
    pub capex_nis_per_kwp: BTreeMap<String, Money>,
    /// Year-1 OPEX as a fraction of total CAPEX
    pub opex_pct_of_capex: Rate,
    /// Retail electricity price per kWh by customer class
    pub retail_tariff_nis_per_kwh: BTreeMap<String, Money>,
    /// Urban premium added to the export tariff (NIS/kWh)
    pub urban_premium_addition: Money,
    #[serde(default = "default_premium_years")]
    pub urban_premium_years: u32,
    /// Real discount rate; the nominal rate is derived with the CPI track
    pub discount_rate_real: Rate,
    pub leasing: LeasingTerms,
}

fn default_max_capacity() -> Kwp {
    dec!(30)
}

fn default_premium_years() -> u32 {
    15
}

impl Defaults {
    pub fn capex_per_kwp(&self, class: &str) -> NetbillResult<Money> {
        self.capex_nis_per_kwp
            .get(class)
            .copied()
            .ok_or_else(|| NetbillError::lookup("capex_nis_per_kwp", class))
    }

    pub fn retail_tariff(&self, class: &str) -> NetbillResult<Money> {
        self.retail_tariff_nis_per_kwh
            .get(class)
            .copied()
            .ok_or_else(|| NetbillError::lookup("retail_tariff_nis_per_kwh", class))
    }

    pub(crate) fn validate(&self) -> Result<(), String> {
        if self.lifetime_years == 0 {
            return Err("lifetime_years must be at least 1".into());
        }
        if self.degradation_annual < Decimal::ZERO || self.degradation_annual >= Decimal::ONE {
            return Err("degradation_annual must be in [0, 1)".into());
        }
        if self.max_capacity_kwp <= Decimal::ZERO {
            return Err("max_capacity_kwp must be positive".into());
        }
        if self.opex_pct_of_capex < Decimal::ZERO {
            return Err("opex_pct_of_capex cannot be negative".into());
        }
        if self.discount_rate_real <= dec!(-1) {
            return Err("discount_rate_real must be greater than -100%".into());
        }
        let share = self.leasing.client_revenue_share;
        if share < Decimal::ZERO || share > Decimal::ONE {
            return Err("leasing.client_revenue_share must be in [0, 1]".into());
        }
        Ok(())
    }
}

// ---------------------------------------------------------------------------
// Tariff tables (tariffs.yaml)
// ---------------------------------------------------------------------------

/// Flat nominal export rate, two capacity tiers.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct NominalTariff {
    #[serde(rename = "up_to_15_kw")]
    pub tier1: Money,
    #[serde(rename = "from_16_to_30_kw")]
    pub tier2: Money,
}

/// High/low phase rates for one capacity tier of the accelerated route.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct PhaseRates {
    pub high_phase: Money,
    pub low_phase: Money,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct AcceleratedTariff {
    pub years_high: u32,
    #[serde(rename = "tier1_up_to_15_kw")]
    pub tier1: PhaseRates,
    #[serde(rename = "tier2_15_to_30_kw")]
    pub tier2: PhaseRates,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct CpiTariff {
    pub base_rate: Money,
    /// Largest system eligible for the CPI-linked route
    pub max_kw: Kwp,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct TariffTable {
    /// Systems at or below this size use tier 1
    #[serde(default = "default_breakpoint")]
    pub tier_breakpoint_kw: Kwp,
    pub nominal: NominalTariff,
    #[serde(rename = "accelerated_payback")]
    pub accelerated: AcceleratedTariff,
    #[serde(rename = "cpi_linked")]
    pub cpi: CpiTariff,
}

fn default_breakpoint() -> Kwp {
    dec!(15)
}

impl TariffTable {
    pub fn is_tier1(&self, capacity_kwp: Kwp) -> bool {
        capacity_kwp <= self.tier_breakpoint_kw
    }

    pub(crate) fn validate(&self) -> Result<(), String> {
        if self.tier_breakpoint_kw <= Decimal::ZERO {
            return Err("tier_breakpoint_kw must be positive".into());
        }
        let rates = [
            self.nominal.tier1,
            self.nominal.tier2,
            self.accelerated.tier1.high_phase,
            self.accelerated.tier1.low_phase,
            self.accelerated.tier2.high_phase,
            self.accelerated.tier2.low_phase,
            self.cpi.base_rate,
        ];
        if rates.iter().any(|r| r.is_sign_negative()) {
            return Err("tariff rates cannot be negative".into());
        }
        Ok(())
    }
}

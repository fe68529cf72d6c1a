use std::fmt;
use std::str::FromStr;

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::error::NetbillError;
use crate::time_value::escalate;
use crate::types::{AnnualSeries, Money, Rate};
use crate::NetbillResult;

/// Customer class; selects retail tariff and CAPEX per kWp.
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "snake_case")]
pub enum CustomerClass {
    #[default]
    Smb,
    Residential,
}

impl CustomerClass {
    pub fn key(&self) -> &'static str {
        match self {
            CustomerClass::Smb => "smb",
            CustomerClass::Residential => "residential",
        }
    }
}

impl FromStr for CustomerClass {
    type Err = NetbillError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "smb" => Ok(CustomerClass::Smb),
            "residential" => Ok(CustomerClass::Residential),
            other => Err(NetbillError::invalid(
                "customer_class",
                format!("'{other}' is not one of smb / residential"),
            )),
        }
    }
}

/// How generated energy is valued.
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "snake_case")]
pub enum AccountingMode {
    /// Self-consumed kWh at retail, exported kWh at the export tariff
    #[default]
    NetBilling,
    /// Every kWh at the export tariff. Recognised but not supported.
    Production,
}

impl fmt::Display for AccountingMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AccountingMode::NetBilling => f.write_str("net_billing"),
            AccountingMode::Production => f.write_str("production"),
        }
    }
}

impl FromStr for AccountingMode {
    type Err = NetbillError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "net_billing" => Ok(AccountingMode::NetBilling),
            "production" => Ok(AccountingMode::Production),
            other => Err(NetbillError::invalid(
                "accounting",
                format!("'{other}' is not a known accounting mode"),
            )),
        }
    }
}

/// Reject every accounting mode other than net billing.
pub fn ensure_net_billing(mode: AccountingMode) -> NetbillResult<()> {
    match mode {
        AccountingMode::NetBilling => Ok(()),
        AccountingMode::Production => Err(NetbillError::invalid(
            "accounting",
            "production accounting is not supported; use net_billing",
        )),
    }
}

/// Retail value of one self-consumed kWh per year. Escalates with the market
/// growth track only; CPI does not apply to retail prices.
pub fn retail_series(start_rate: Money, lifetime_years: u32, growth_rate: Rate) -> AnnualSeries {
    escalate(start_rate, growth_rate, lifetime_years)
}

/// OPEX per year: `opex_fraction` of total CAPEX in year 1, then CPI-indexed.
pub fn opex_series(
    total_capex: Money,
    opex_fraction: Rate,
    lifetime_years: u32,
    cpi_rate: Rate,
) -> AnnualSeries {
    escalate(opex_fraction * total_capex, cpi_rate, lifetime_years)
}

/// Operating revenue under net billing, before OPEX and financing.
pub fn cashflow_net_billing(
    energy_kwh: &[Decimal],
    self_consumption_share: Rate,
    retail: &[Money],
    export_tariff: &[Money],
) -> NetbillResult<AnnualSeries> {
    if self_consumption_share < Decimal::ZERO || self_consumption_share > Decimal::ONE {
        return Err(NetbillError::invalid(
            "self_consumption",
            "Self-consumption share must be in [0, 1]",
        ));
    }
    if energy_kwh.len() != retail.len() || energy_kwh.len() != export_tariff.len() {
        return Err(NetbillError::invalid(
            "series",
            format!(
                "Series lengths differ: energy {}, retail {}, export {}",
                energy_kwh.len(),
                retail.len(),
                export_tariff.len()
            ),
        ));
    }

    let s = self_consumption_share;
    Ok(energy_kwh
        .iter()
        .zip(retail)
        .zip(export_tariff)
        .map(|((e, rt), tx)| s * e * rt + (Decimal::ONE - s) * e * tx)
        .collect())
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    #[test]
    fn test_retail_escalates_by_growth() {
        let s = retail_series(dec!(0.60), 3, dec!(0.10));
        assert_eq!(s, vec![dec!(0.60), dec!(0.66), dec!(0.726)]);
    }

    #[test]
    fn test_opex_first_year_and_cpi() {
        let s = opex_series(dec!(100000), dec!(0.015), 2, dec!(0.02));
        assert_eq!(s[0], dec!(1500));
        assert_eq!(s[1], dec!(1530));
    }

    #[test]
    fn test_net_billing_split() {
        let cf = cashflow_net_billing(&[dec!(1000)], dec!(0.4), &[dec!(0.6)], &[dec!(0.5)]).unwrap();
        // 400 * 0.6 + 600 * 0.5
        assert_eq!(cf, vec![dec!(540)]);
    }

    #[test]
    fn test_full_export_and_full_self_use() {
        let all_export =
            cashflow_net_billing(&[dec!(1000)], Decimal::ZERO, &[dec!(0.6)], &[dec!(0.5)]).unwrap();
        assert_eq!(all_export, vec![dec!(500)]);
        let all_self =
            cashflow_net_billing(&[dec!(1000)], Decimal::ONE, &[dec!(0.6)], &[dec!(0.5)]).unwrap();
        assert_eq!(all_self, vec![dec!(600)]);
    }

    #[test]
    fn test_length_mismatch_rejected() {
        assert!(cashflow_net_billing(&[dec!(1), dec!(2)], dec!(0.5), &[dec!(1)], &[dec!(1)]).is_err());
    }

    #[test]
    fn test_share_out_of_range_rejected() {
        assert!(cashflow_net_billing(&[dec!(1)], dec!(1.1), &[dec!(1)], &[dec!(1)]).is_err());
    }

    #[test]
    fn test_production_mode_rejected() {
        assert!(ensure_net_billing(AccountingMode::NetBilling).is_ok());
        assert!(matches!(
            ensure_net_billing(AccountingMode::Production),
            Err(NetbillError::InvalidArgument { .. })
        ));
    }
}

use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::error::NetbillError;
use crate::types::Rate;
use crate::NetbillResult;

/// The named scenario tracks a request can select from.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "snake_case")]
pub enum ScenarioTrack {
    CpiTrack,
    RetailGrowth,
    LoanInterestRate,
    LoanTenorYears,
    Loan,
}

impl ScenarioTrack {
    pub const ALL: [ScenarioTrack; 5] = [
        ScenarioTrack::CpiTrack,
        ScenarioTrack::RetailGrowth,
        ScenarioTrack::LoanInterestRate,
        ScenarioTrack::LoanTenorYears,
        ScenarioTrack::Loan,
    ];

    pub fn key(&self) -> &'static str {
        match self {
            ScenarioTrack::CpiTrack => "cpi_track",
            ScenarioTrack::RetailGrowth => "retail_growth",
            ScenarioTrack::LoanInterestRate => "loan_interest_rate",
            ScenarioTrack::LoanTenorYears => "loan_tenor_years",
            ScenarioTrack::Loan => "loan",
        }
    }
}

impl fmt::Display for ScenarioTrack {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.key())
    }
}

impl FromStr for ScenarioTrack {
    type Err = NetbillError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        ScenarioTrack::ALL
            .into_iter()
            .find(|t| t.key() == s)
            .ok_or_else(|| {
                NetbillError::invalid("track", format!("'{s}' is not a scenario track"))
            })
    }
}

/// Loan scenario as written in scenarios.yaml: tiers refer to the
/// `loan_interest_rate` and `loan_tenor_years` tracks.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct LoanScenario {
    /// Share of CAPEX paid upfront; absent means the full CAPEX is financed
    #[serde(default)]
    pub downpayment_ratio: Rate,
    pub interest_tier: String,
    pub tenor_tier: String,
}

/// Loan scenario with its tiers resolved to concrete terms.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct LoanTerms {
    pub downpayment_ratio: Rate,
    pub interest_rate: Rate,
    pub tenor_years: u32,
}

/// Value of a scenario variant; the shape depends on the track.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(tag = "kind", content = "value", rename_all = "snake_case")]
pub enum ScenarioValue {
    Rate(Rate),
    Years(u32),
    Loan(LoanTerms),
}

/// All scenario tracks (scenarios.yaml).
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ScenarioTracks {
    pub cpi_track: BTreeMap<String, Rate>,
    pub retail_growth: BTreeMap<String, Rate>,
    pub loan_interest_rate: BTreeMap<String, Rate>,
    pub loan_tenor_years: BTreeMap<String, u32>,
    pub loan: BTreeMap<String, LoanScenario>,
}

impl ScenarioTracks {
    pub fn resolve(&self, track: ScenarioTrack, name: &str) -> NetbillResult<ScenarioValue> {
        let value = match track {
            ScenarioTrack::CpiTrack => self.cpi_track.get(name).copied().map(ScenarioValue::Rate),
            ScenarioTrack::RetailGrowth => {
                self.retail_growth.get(name).copied().map(ScenarioValue::Rate)
            }
            ScenarioTrack::LoanInterestRate => self
                .loan_interest_rate
                .get(name)
                .copied()
                .map(ScenarioValue::Rate),
            ScenarioTrack::LoanTenorYears => self
                .loan_tenor_years
                .get(name)
                .copied()
                .map(ScenarioValue::Years),
            ScenarioTrack::Loan => {
                return self.loan_terms(name).map(ScenarioValue::Loan);
            }
        };
        value.ok_or_else(|| NetbillError::lookup(track.key(), name))
    }

    pub fn cpi(&self, name: &str) -> NetbillResult<Rate> {
        self.cpi_track
            .get(name)
            .copied()
            .ok_or_else(|| NetbillError::lookup(ScenarioTrack::CpiTrack.key(), name))
    }

    pub fn retail_growth(&self, name: &str) -> NetbillResult<Rate> {
        self.retail_growth
            .get(name)
            .copied()
            .ok_or_else(|| NetbillError::lookup(ScenarioTrack::RetailGrowth.key(), name))
    }

    pub fn loan_terms(&self, name: &str) -> NetbillResult<LoanTerms> {
        let scenario = self
            .loan
            .get(name)
            .ok_or_else(|| NetbillError::lookup(ScenarioTrack::Loan.key(), name))?;
        let interest_rate = self
            .loan_interest_rate
            .get(&scenario.interest_tier)
            .copied()
            .ok_or_else(|| {
                NetbillError::lookup(ScenarioTrack::LoanInterestRate.key(), &scenario.interest_tier)
            })?;
        let tenor_years = self
            .loan_tenor_years
            .get(&scenario.tenor_tier)
            .copied()
            .ok_or_else(|| {
                NetbillError::lookup(ScenarioTrack::LoanTenorYears.key(), &scenario.tenor_tier)
            })?;

        Ok(LoanTerms {
            downpayment_ratio: scenario.downpayment_ratio,
            interest_rate,
            tenor_years,
        })
    }

    /// Variant names of a track, sorted.
    pub fn variants(&self, track: ScenarioTrack) -> Vec<String> {
        match track {
            ScenarioTrack::CpiTrack => self.cpi_track.keys().cloned().collect(),
            ScenarioTrack::RetailGrowth => self.retail_growth.keys().cloned().collect(),
            ScenarioTrack::LoanInterestRate => self.loan_interest_rate.keys().cloned().collect(),
            ScenarioTrack::LoanTenorYears => self.loan_tenor_years.keys().cloned().collect(),
            ScenarioTrack::Loan => self.loan.keys().cloned().collect(),
        }
    }

    pub(crate) fn validate(&self) -> Result<(), String> {
        for (name, scenario) in &self.loan {
            if !self.loan_interest_rate.contains_key(&scenario.interest_tier) {
                return Err(format!(
                    "loan.{name}: unknown interest_tier '{}'",
                    scenario.interest_tier
                ));
            }
            match self.loan_tenor_years.get(&scenario.tenor_tier) {
                None => {
                    return Err(format!(
                        "loan.{name}: unknown tenor_tier '{}'",
                        scenario.tenor_tier
                    ))
                }
                Some(0) => return Err(format!("loan.{name}: tenor must be at least 1 year")),
                Some(_) => {}
            }
            let dp = scenario.downpayment_ratio;
            if dp < Decimal::ZERO || dp > Decimal::ONE {
                return Err(format!("loan.{name}: downpayment_ratio must be in [0, 1]"));
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use rust_decimal_macros::dec;

    fn tracks() -> ScenarioTracks {
        serde_yaml::from_str(
            r#"
cpi_track: {low: 0.01, base: 0.02}
retail_growth: {base: 0.01}
loan_interest_rate: {base: 0.06}
loan_tenor_years: {base: 10}
loan:
  base: {downpayment_ratio: 0.2, interest_tier: base, tenor_tier: base}
  full: {interest_tier: base, tenor_tier: base}
"#,
        )
        .unwrap()
    }

    #[test]
    fn test_resolve_scalar_track() {
        let t = tracks();
        assert_eq!(
            t.resolve(ScenarioTrack::CpiTrack, "low").unwrap(),
            ScenarioValue::Rate(dec!(0.01))
        );
        assert_eq!(
            t.resolve(ScenarioTrack::LoanTenorYears, "base").unwrap(),
            ScenarioValue::Years(10)
        );
    }

    #[test]
    fn test_resolve_loan_track() {
        let t = tracks();
        assert_eq!(
            t.resolve(ScenarioTrack::Loan, "base").unwrap(),
            ScenarioValue::Loan(LoanTerms {
                downpayment_ratio: dec!(0.2),
                interest_rate: dec!(0.06),
                tenor_years: 10,
            })
        );
    }

    #[test]
    fn test_missing_downpayment_finances_everything() {
        let terms = tracks().loan_terms("full").unwrap();
        assert_eq!(terms.downpayment_ratio, Decimal::ZERO);
    }

    #[test]
    fn test_unknown_name_is_lookup_error() {
        let err = tracks().resolve(ScenarioTrack::RetailGrowth, "extreme").unwrap_err();
        assert!(matches!(err, NetbillError::Lookup { ref track, ref name }
            if track == "retail_growth" && name == "extreme"));
    }

    #[test]
    fn test_unknown_track_key() {
        let err = "inflation".parse::<ScenarioTrack>().unwrap_err();
        assert!(matches!(err, NetbillError::InvalidArgument { ref field, .. } if field == "track"));
        assert!(err.to_string().contains("'inflation' is not a scenario track"));
        assert_eq!("loan".parse::<ScenarioTrack>().unwrap(), ScenarioTrack::Loan);
    }

    #[test]
    fn test_validate_rejects_dangling_tier() {
        let mut t = tracks();
        t.loan.get_mut("base").unwrap().tenor_tier = "forever".into();
        assert!(t.validate().is_err());
    }
}

//! Financing structures applied to pre-financing operating cash flow.
//!
//! Every structure produces a period-indexed vector of length
//! `lifetime_years + 1`: period 0 is the upfront investment and periods
//! `1..=N` carry net operating cash after OPEX and any debt service.

use std::fmt;
use std::str::FromStr;

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::config::{LeasingTerms, LoanTerms};
use crate::error::NetbillError;
use crate::time_value::annuity_payment;
use crate::types::{AnnualSeries, Money, Rate};
use crate::NetbillResult;

// ---------------------------------------------------------------------------
// Modes and plans
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "snake_case")]
pub enum FinanceMode {
    #[default]
    Equity,
    Loan,
    Leasing,
}

impl FinanceMode {
    pub fn as_str(&self) -> &'static str {
        match self {
            FinanceMode::Equity => "equity",
            FinanceMode::Loan => "loan",
            FinanceMode::Leasing => "leasing",
        }
    }
}

impl fmt::Display for FinanceMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for FinanceMode {
    type Err = NetbillError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "equity" => Ok(FinanceMode::Equity),
            "loan" => Ok(FinanceMode::Loan),
            "leasing" => Ok(FinanceMode::Leasing),
            other => Err(NetbillError::invalid(
                "finance_mode",
                format!("'{other}' is not one of equity / loan / leasing"),
            )),
        }
    }
}

/// A financing mode together with the terms it needs.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(tag = "mode", rename_all = "snake_case")]
pub enum FinancingPlan {
    Equity,
    Loan(LoanTerms),
    Leasing(LeasingTerms),
}

impl FinancingPlan {
    pub fn mode(&self) -> FinanceMode {
        match self {
            FinancingPlan::Equity => FinanceMode::Equity,
            FinancingPlan::Loan(_) => FinanceMode::Loan,
            FinancingPlan::Leasing(_) => FinanceMode::Leasing,
        }
    }
}

// ---------------------------------------------------------------------------
// Output types
// ---------------------------------------------------------------------------

/// One year of a level-payment loan.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct LoanPeriod {
    pub year: u32,
    pub opening_balance: Money,
    pub interest: Money,
    pub principal: Money,
    pub payment: Money,
    pub closing_balance: Money,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct FinancedCashFlow {
    /// Period 0 investment followed by one entry per operating year
    pub cashflow: Vec<Money>,
    /// Debt service per operating year (all zero unless financed by loan)
    pub debt_service: AnnualSeries,
    /// Amortization table; empty unless financed by loan
    pub loan_schedule: Vec<LoanPeriod>,
}

// ---------------------------------------------------------------------------
// Core computation
// ---------------------------------------------------------------------------

/// Apply `plan` to operating revenue and OPEX (both one entry per year).
pub fn apply_financing(
    plan: &FinancingPlan,
    total_capex: Money,
    operating: &[Money],
    opex: &[Money],
) -> NetbillResult<FinancedCashFlow> {
    if operating.len() != opex.len() {
        return Err(NetbillError::invalid(
            "opex",
            format!(
                "OPEX series has {} years, operating series has {}",
                opex.len(),
                operating.len()
            ),
        ));
    }
    if total_capex < Decimal::ZERO {
        return Err(NetbillError::invalid("total_capex", "CAPEX cannot be negative"));
    }

    let years = operating.len();
    let net: Vec<Money> = operating.iter().zip(opex).map(|(ci, op)| ci - op).collect();

    match plan {
        FinancingPlan::Equity => {
            let mut cashflow = Vec::with_capacity(years + 1);
            cashflow.push(-total_capex);
            cashflow.extend(net);
            Ok(FinancedCashFlow {
                cashflow,
                debt_service: vec![Decimal::ZERO; years],
                loan_schedule: Vec::new(),
            })
        }
        FinancingPlan::Loan(terms) => {
            let dp = terms.downpayment_ratio;
            if dp < Decimal::ZERO || dp > Decimal::ONE {
                return Err(NetbillError::invalid(
                    "downpayment_ratio",
                    "Downpayment ratio must be in [0, 1]",
                ));
            }
            let downpayment = total_capex * dp;
            let principal = total_capex - downpayment;

            let debt_service =
                debt_service_series(principal, terms.interest_rate, terms.tenor_years, years as u32)?;
            let loan_schedule =
                amortization_schedule(principal, terms.interest_rate, terms.tenor_years)?;

            let mut cashflow = Vec::with_capacity(years + 1);
            cashflow.push(-downpayment);
            cashflow.extend(net.iter().zip(&debt_service).map(|(n, ds)| n - ds));
            Ok(FinancedCashFlow {
                cashflow,
                debt_service,
                loan_schedule,
            })
        }
        FinancingPlan::Leasing(terms) => {
            let share = terms.client_revenue_share;
            if share < Decimal::ZERO || share > Decimal::ONE {
                return Err(NetbillError::invalid(
                    "client_revenue_share",
                    "Revenue share must be in [0, 1]",
                ));
            }

            let mut cashflow = Vec::with_capacity(years + 1);
            cashflow.push(Decimal::ZERO);
            cashflow.extend(net.iter().enumerate().map(|(t, n)| {
                if (t as u32) < terms.term_years {
                    n * share
                } else {
                    *n
                }
            }));
            Ok(FinancedCashFlow {
                cashflow,
                debt_service: vec![Decimal::ZERO; years],
                loan_schedule: Vec::new(),
            })
        }
    }
}

/// Level annuity payment for each of the first `tenor_years` of `horizon`
/// years, zero afterwards.
pub fn debt_service_series(
    principal: Money,
    rate: Rate,
    tenor_years: u32,
    horizon: u32,
) -> NetbillResult<AnnualSeries> {
    if principal.is_zero() {
        return Ok(vec![Decimal::ZERO; horizon as usize]);
    }
    let payment = annuity_payment(principal, rate, tenor_years)?;
    Ok((0..horizon)
        .map(|t| if t < tenor_years { payment } else { Decimal::ZERO })
        .collect())
}

/// Year-by-year interest/principal split of a level-payment loan.
pub fn amortization_schedule(
    principal: Money,
    rate: Rate,
    tenor_years: u32,
) -> NetbillResult<Vec<LoanPeriod>> {
    if principal.is_zero() {
        return Ok(Vec::new());
    }
    let payment = annuity_payment(principal, rate, tenor_years)?;

    let mut balance = principal;
    let mut schedule = Vec::with_capacity(tenor_years as usize);
    for year in 1..=tenor_years {
        let interest = balance * rate;
        let repaid = payment - interest;
        let mut closing = balance - repaid;
        // Rounding residue on the final instalment
        if year == tenor_years || closing < Decimal::ZERO {
            closing = Decimal::ZERO;
        }
        schedule.push(LoanPeriod {
            year,
            opening_balance: balance,
            interest,
            principal: repaid,
            payment,
            closing_balance: closing,
        });
        balance = closing;
    }

    Ok(schedule)
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use rust_decimal_macros::dec;

    fn flows() -> (Vec<Money>, Vec<Money>) {
        (vec![dec!(300); 4], vec![dec!(50); 4])
    }

    #[test]
    fn test_equity_flows() {
        let (op, opex) = flows();
        let out = apply_financing(&FinancingPlan::Equity, dec!(1000), &op, &opex).unwrap();
        assert_eq!(
            out.cashflow,
            vec![dec!(-1000), dec!(250), dec!(250), dec!(250), dec!(250)]
        );
        assert!(out.loan_schedule.is_empty());
    }

    #[test]
    fn test_zero_rate_debt_service() {
        let ds = debt_service_series(dec!(1000), Decimal::ZERO, 5, 8).unwrap();
        assert_eq!(
            ds,
            vec![
                dec!(200),
                dec!(200),
                dec!(200),
                dec!(200),
                dec!(200),
                dec!(0),
                dec!(0),
                dec!(0)
            ]
        );
    }

    #[test]
    fn test_loan_with_downpayment() {
        let (op, opex) = flows();
        let plan = FinancingPlan::Loan(LoanTerms {
            downpayment_ratio: dec!(0.2),
            interest_rate: Decimal::ZERO,
            tenor_years: 2,
        });
        let out = apply_financing(&plan, dec!(1000), &op, &opex).unwrap();
        // 800 financed at 0% over 2 years = 400/yr
        assert_eq!(
            out.cashflow,
            vec![dec!(-200), dec!(-150), dec!(-150), dec!(250), dec!(250)]
        );
        assert_eq!(out.loan_schedule.len(), 2);
    }

    #[test]
    fn test_loan_without_downpayment_has_zero_period_zero() {
        let (op, opex) = flows();
        let plan = FinancingPlan::Loan(LoanTerms {
            downpayment_ratio: Decimal::ZERO,
            interest_rate: dec!(0.05),
            tenor_years: 3,
        });
        let out = apply_financing(&plan, dec!(1000), &op, &opex).unwrap();
        assert_eq!(out.cashflow[0], Decimal::ZERO);
        assert_eq!(out.cashflow.len(), 5);
        assert_eq!(out.debt_service[3], Decimal::ZERO);
    }

    #[test]
    fn test_amortization_pays_off_principal() {
        let schedule = amortization_schedule(dec!(10000), dec!(0.06), 10).unwrap();
        let repaid: Decimal = schedule.iter().map(|p| p.principal).sum();
        assert!((repaid - dec!(10000)).abs() < dec!(0.0001));
        assert_eq!(schedule.last().unwrap().closing_balance, Decimal::ZERO);
        assert_eq!(schedule[0].interest, dec!(600));
    }

    #[test]
    fn test_leasing_revenue_share() {
        let (op, opex) = flows();
        let plan = FinancingPlan::Leasing(LeasingTerms {
            term_years: 2,
            client_revenue_share: dec!(0.1),
        });
        let out = apply_financing(&plan, dec!(1000), &op, &opex).unwrap();
        assert_eq!(
            out.cashflow,
            vec![dec!(0), dec!(25), dec!(25), dec!(250), dec!(250)]
        );
    }

    #[test]
    fn test_mismatched_series_rejected() {
        let err = apply_financing(&FinancingPlan::Equity, dec!(1), &[dec!(1)], &[]).unwrap_err();
        assert!(matches!(err, NetbillError::InvalidArgument { .. }));
    }

    #[test]
    fn test_unknown_mode_rejected() {
        assert!(matches!(
            "crowdfunding".parse::<FinanceMode>(),
            Err(NetbillError::InvalidArgument { .. })
        ));
    }
}

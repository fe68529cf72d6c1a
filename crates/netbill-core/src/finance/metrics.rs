use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::finance::financing::FinanceMode;
use crate::time_value::{irr, npv, payback_year};
use crate::types::{Money, Rate};
use crate::NetbillResult;

const NPV_DP: u32 = 2;
const IRR_DP: u32 = 4;
const SURPLUS_DP: u32 = 2;

/// Metrics that can be reported as not applicable.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "snake_case")]
pub enum Metric {
    Irr,
    PaybackYear,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct MetricsResult {
    /// NPV at the nominal discount rate
    pub npv: Money,
    pub irr: Option<Rate>,
    pub payback_year: Option<u32>,
    /// Mean of periods 1..N; reported for leasing only
    #[serde(skip_serializing_if = "Option::is_none")]
    pub annual_surplus: Option<Money>,
    pub discount_rate: Rate,
    pub not_applicable: Vec<Metric>,
    pub warnings: Vec<String>,
}

/// NPV, IRR and payback for a financed cash-flow vector.
///
/// Leasing flows start with no investment, so IRR and payback carry no
/// meaning and are always flagged not applicable; the average annual
/// surplus is reported in their place. For other modes an absent IRR or
/// payback is flagged together with the reason.
pub fn format_metrics(
    cashflow: &[Money],
    discount_rate: Rate,
    mode: FinanceMode,
) -> NetbillResult<MetricsResult> {
    let the_npv = npv(discount_rate, cashflow)?.round_dp(NPV_DP);

    if mode == FinanceMode::Leasing {
        return Ok(MetricsResult {
            npv: the_npv,
            irr: None,
            payback_year: None,
            annual_surplus: annual_surplus(cashflow),
            discount_rate,
            not_applicable: vec![Metric::Irr, Metric::PaybackYear],
            warnings: vec!["IRR and payback are not applicable to leasing flows.".into()],
        });
    }

    let the_irr = irr(cashflow).map(|r| r.round_dp(IRR_DP));
    let the_payback = payback_year(cashflow);

    let mut not_applicable = Vec::new();
    let mut warnings = Vec::new();
    if the_irr.is_none() {
        not_applicable.push(Metric::Irr);
        warnings.push(irr_warning(cashflow));
    }
    if the_payback.is_none() {
        not_applicable.push(Metric::PaybackYear);
        warnings.push("Payback does not occur within the analysis horizon.".into());
    }

    Ok(MetricsResult {
        npv: the_npv,
        irr: the_irr,
        payback_year: the_payback,
        annual_surplus: None,
        discount_rate,
        not_applicable,
        warnings,
    })
}

fn irr_warning(cashflow: &[Money]) -> String {
    if crate::time_value::has_sign_change(cashflow) {
        "IRR is undefined (the rate search did not converge).".into()
    } else {
        "IRR is undefined (no sign change in cash flow).".into()
    }
}

fn annual_surplus(cashflow: &[Money]) -> Option<Money> {
    if cashflow.len() < 2 {
        return None;
    }
    let operating = &cashflow[1..];
    let total: Decimal = operating.iter().sum();
    Some((total / Decimal::from(operating.len() as u64)).round_dp(SURPLUS_DP))
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    #[test]
    fn test_equity_metrics_defined() {
        let m = format_metrics(&[dec!(-100), dec!(60), dec!(60)], dec!(0.05), FinanceMode::Equity)
            .unwrap();
        assert_eq!(m.payback_year, Some(2));
        assert!(m.irr.unwrap() > dec!(0.12) && m.irr.unwrap() < dec!(0.14));
        assert!(m.not_applicable.is_empty());
        assert!(m.warnings.is_empty());
    }

    #[test]
    fn test_absent_metrics_carry_warnings() {
        let m = format_metrics(&[dec!(100), dec!(100)], dec!(0.05), FinanceMode::Equity).unwrap();
        assert_eq!(m.irr, None);
        assert_eq!(m.not_applicable, vec![Metric::Irr]);
        assert!(m.warnings[0].contains("no sign change"));

        let m = format_metrics(&[dec!(-100), dec!(10), dec!(10)], dec!(0.05), FinanceMode::Loan)
            .unwrap();
        assert_eq!(m.payback_year, None);
        assert!(m.not_applicable.contains(&Metric::PaybackYear));
        assert_eq!(m.warnings.len(), m.not_applicable.len());
    }

    #[test]
    fn test_irr_search_failure_warns() {
        let m = format_metrics(&[dec!(-2), dec!(2.2), dec!(-1.21)], dec!(0.05), FinanceMode::Equity)
            .unwrap();
        assert_eq!(m.irr, None);
        assert_eq!(m.payback_year, Some(1));
        assert_eq!(m.not_applicable, vec![Metric::Irr]);
        assert_eq!(m.warnings.len(), 1);
        assert!(m.warnings[0].contains("did not converge"));
    }

    #[test]
    fn test_leasing_never_reports_irr_or_payback() {
        // Sign change present, still not applicable
        let m = format_metrics(
            &[dec!(0), dec!(-10), dec!(40), dec!(40)],
            dec!(0.05),
            FinanceMode::Leasing,
        )
        .unwrap();
        assert_eq!(m.irr, None);
        assert_eq!(m.payback_year, None);
        assert_eq!(m.not_applicable, vec![Metric::Irr, Metric::PaybackYear]);
        assert_eq!(m.annual_surplus, Some(dec!(23.33)));
        assert_eq!(m.warnings.len(), 1);
    }

    #[test]
    fn test_npv_rounded() {
        let m = format_metrics(&[dec!(-100), dec!(50), dec!(50), dec!(50)], Decimal::ZERO, FinanceMode::Equity)
            .unwrap();
        assert_eq!(m.npv, dec!(50.00));
    }
}

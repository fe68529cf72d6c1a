use rust_decimal::Decimal;
use rust_decimal_macros::dec;

use crate::error::NetbillError;
use crate::types::{AnnualSeries, Money, Rate};
use crate::NetbillResult;

pub const DEFAULT_IRR_GUESS: Rate = dec!(0.10);
pub const IRR_TOLERANCE: Decimal = dec!(0.000001);
pub const MAX_IRR_ITERATIONS: u32 = 100;
const IRR_FLOOR: Rate = dec!(-0.99);

/// Tuning knobs for the Newton-Raphson IRR search.
#[derive(Debug, Clone, Copy)]
pub struct IrrOptions {
    pub guess: Rate,
    pub tolerance: Decimal,
    pub max_iterations: u32,
}

impl Default for IrrOptions {
    fn default() -> Self {
        IrrOptions {
            guess: DEFAULT_IRR_GUESS,
            tolerance: IRR_TOLERANCE,
            max_iterations: MAX_IRR_ITERATIONS,
        }
    }
}

/// Net Present Value of a series of cash flows, period 0 undiscounted.
pub fn npv(rate: Rate, cash_flows: &[Money]) -> NetbillResult<Money> {
    if rate <= dec!(-1) {
        return Err(NetbillError::invalid(
            "discount_rate",
            "Discount rate must be greater than -100%",
        ));
    }

    let mut result = Decimal::ZERO;
    let one_plus_r = Decimal::ONE + rate;
    let mut discount = Decimal::ONE;

    for (t, cf) in cash_flows.iter().enumerate() {
        if t > 0 {
            discount *= one_plus_r;
        }
        if discount.is_zero() {
            return Err(NetbillError::invalid(
                "discount_rate",
                format!("NPV discount factor vanished at period {t}"),
            ));
        }
        result += cf / discount;
    }

    Ok(result)
}

/// True when the flows contain at least one strictly positive and one
/// strictly negative entry.
pub fn has_sign_change(cash_flows: &[Money]) -> bool {
    let has_pos = cash_flows.iter().any(|cf| cf.is_sign_positive() && !cf.is_zero());
    let has_neg = cash_flows.iter().any(|cf| cf.is_sign_negative() && !cf.is_zero());
    has_pos && has_neg
}

/// Internal Rate of Return with the default guess, tolerance and iteration cap.
///
/// Returns `None` when the IRR is undefined: no sign change in the flows,
/// a vanishing derivative, arithmetic overflow, or no convergence.
pub fn irr(cash_flows: &[Money]) -> Option<Rate> {
    irr_with(cash_flows, IrrOptions::default())
}

/// Internal Rate of Return using Newton-Raphson.
pub fn irr_with(cash_flows: &[Money], opts: IrrOptions) -> Option<Rate> {
    if !has_sign_change(cash_flows) {
        return None;
    }

    let mut rate = opts.guess;

    for _ in 0..opts.max_iterations {
        let (npv_val, dnpv) = npv_and_derivative(rate, cash_flows)?;

        if npv_val.abs() < opts.tolerance {
            return Some(rate);
        }
        if dnpv.is_zero() {
            return None;
        }

        let step = npv_val.checked_div(dnpv)?;
        rate = rate.checked_sub(step)?;

        // 1 + r must stay positive
        if rate < IRR_FLOOR {
            rate = IRR_FLOOR;
        }

        if step.abs() < opts.tolerance {
            return Some(rate);
        }
    }

    None
}

/// NPV and dNPV/dr at `rate`, built from powers of v = 1/(1+r) so that
/// high rates shrink the factors instead of growing them. `None` if any
/// intermediate overflows.
fn npv_and_derivative(rate: Rate, cash_flows: &[Money]) -> Option<(Decimal, Decimal)> {
    let one_plus_r = Decimal::ONE + rate;
    if one_plus_r <= Decimal::ZERO {
        return None;
    }
    let v = Decimal::ONE.checked_div(one_plus_r)?;

    let mut npv_val = Decimal::ZERO;
    let mut dnpv = Decimal::ZERO;
    let mut factor = Decimal::ONE;

    for (t, cf) in cash_flows.iter().enumerate() {
        if t > 0 {
            factor = factor.checked_mul(v)?;
        }
        npv_val = npv_val.checked_add(cf.checked_mul(factor)?)?;
        if t > 0 {
            // d/dr [cf * v^t] = -t * cf * v^(t+1)
            let term = Decimal::from(t as i64)
                .checked_mul(*cf)?
                .checked_mul(factor)?
                .checked_mul(v)?;
            dnpv = dnpv.checked_sub(term)?;
        }
    }

    Some((npv_val, dnpv))
}

/// First period index at which the running cumulative sum is >= 0.
pub fn payback_year(cash_flows: &[Money]) -> Option<u32> {
    let mut cumulative = Decimal::ZERO;
    for (t, cf) in cash_flows.iter().enumerate() {
        cumulative += cf;
        if cumulative >= Decimal::ZERO {
            return Some(t as u32);
        }
    }
    None
}

/// Level annuity payment that fully amortizes `principal` over `periods`.
/// PMT = P * r * (1+r)^n / ((1+r)^n - 1), or P / n when r = 0.
pub fn annuity_payment(principal: Money, rate: Rate, periods: u32) -> NetbillResult<Money> {
    if periods == 0 {
        return Err(NetbillError::invalid(
            "tenor_years",
            "Number of periods must be > 0",
        ));
    }
    if rate <= dec!(-1) {
        return Err(NetbillError::invalid(
            "interest_rate",
            "Interest rate must be greater than -100%",
        ));
    }
    if principal.is_zero() {
        return Ok(Decimal::ZERO);
    }
    if rate.is_zero() {
        return Ok(principal / Decimal::from(periods));
    }

    let compound = compound_factor(rate, periods);
    let denominator = compound - Decimal::ONE;
    if denominator.is_zero() {
        return Err(NetbillError::invalid(
            "interest_rate",
            "Annuity factor is zero",
        ));
    }

    Ok(principal * rate * compound / denominator)
}

/// (1+r)^n via iterative multiplication.
pub fn compound_factor(rate: Rate, periods: u32) -> Decimal {
    let one_plus_r = Decimal::ONE + rate;
    let mut compound = Decimal::ONE;
    for _ in 0..periods {
        compound *= one_plus_r;
    }
    compound
}

/// `start`, `start*(1+rate)`, `start*(1+rate)^2`, ... for `years` entries.
pub fn escalate(start: Decimal, rate: Rate, years: u32) -> AnnualSeries {
    let factor = Decimal::ONE + rate;
    let mut value = start;
    let mut out = Vec::with_capacity(years as usize);
    for _ in 0..years {
        out.push(value);
        value *= factor;
    }
    out
}

/// Convert a real rate to nominal given CPI: (1+nominal) = (1+real)(1+cpi).
pub fn nominal_rate_from_real(real: Rate, cpi: Rate) -> Rate {
    (Decimal::ONE + real) * (Decimal::ONE + cpi) - Decimal::ONE
}

use rust_decimal::Decimal;

use crate::error::NetbillError;
use crate::time_value::escalate;
use crate::types::{AnnualSeries, Kwp};
use crate::NetbillResult;

/// Annual generation in kWh for each year of operation.
///
/// Year 1 produces `capacity_kwp * yield_per_kwp`; every later year loses
/// `degradation_rate` relative to the previous one, so entry `t` equals
/// year-1 output times `(1 - degradation_rate)^t`.
pub fn generation_series(
    capacity_kwp: Kwp,
    lifetime_years: u32,
    yield_per_kwp: Decimal,
    degradation_rate: Decimal,
) -> NetbillResult<AnnualSeries> {
    if capacity_kwp < Decimal::ZERO {
        return Err(NetbillError::invalid("capacity_kwp", "Capacity cannot be negative"));
    }
    if yield_per_kwp < Decimal::ZERO {
        return Err(NetbillError::invalid("yield_per_kwp", "Yield cannot be negative"));
    }
    if degradation_rate < Decimal::ZERO || degradation_rate >= Decimal::ONE {
        return Err(NetbillError::invalid(
            "degradation_rate",
            "Degradation must be in [0, 1)",
        ));
    }

    let first_year = capacity_kwp * yield_per_kwp;
    Ok(escalate(first_year, -degradation_rate, lifetime_years))
}

/// Installable capacity for a roof area at the given power density (kWp/m²).
pub fn size_kwp_from_area(area_m2: Decimal, power_density: Decimal) -> NetbillResult<Kwp> {
    if area_m2 <= Decimal::ZERO {
        return Err(NetbillError::invalid("area_m2", "Roof area must be positive"));
    }
    if power_density <= Decimal::ZERO {
        return Err(NetbillError::invalid(
            "power_density_kw_per_m2",
            "Power density must be positive",
        ));
    }
    Ok(area_m2 * power_density)
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    #[test]
    fn test_first_year_undegraded() {
        let s = generation_series(dec!(10), 3, dec!(1650), dec!(0.005)).unwrap();
        assert_eq!(s.len(), 3);
        assert_eq!(s[0], dec!(16500));
    }

    #[test]
    fn test_degradation_compounds() {
        let s = generation_series(dec!(10), 3, dec!(1000), dec!(0.01)).unwrap();
        assert_eq!(s[1], dec!(9900));
        assert_eq!(s[2], dec!(9801));
    }

    #[test]
    fn test_zero_degradation_is_flat() {
        let s = generation_series(dec!(5), 4, dec!(1600), Decimal::ZERO).unwrap();
        assert!(s.iter().all(|e| *e == dec!(8000)));
    }

    #[test]
    fn test_invalid_inputs() {
        assert!(generation_series(dec!(-1), 3, dec!(1600), dec!(0.005)).is_err());
        assert!(generation_series(dec!(1), 3, dec!(-1), dec!(0.005)).is_err());
        assert!(generation_series(dec!(1), 3, dec!(1600), dec!(1)).is_err());
        assert!(generation_series(dec!(1), 3, dec!(1600), dec!(-0.1)).is_err());
    }

    #[test]
    fn test_size_from_area() {
        assert_eq!(size_kwp_from_area(dec!(100), dec!(0.2)).unwrap(), dec!(20));
        assert!(size_kwp_from_area(Decimal::ZERO, dec!(0.2)).is_err());
    }
}

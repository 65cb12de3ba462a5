//! Money and quantity helpers

use bigdecimal::{BigDecimal, RoundingMode};

/// Round to two decimal places, half away from zero
pub fn round2(value: &BigDecimal) -> BigDecimal {
    value.with_scale_round(2, RoundingMode::HalfUp)
}

/// `rate` percent of `amount`, at full precision
pub fn percent_of(amount: &BigDecimal, rate: &BigDecimal) -> BigDecimal {
    (amount * rate) / BigDecimal::from(100)
}

/// Whether a value carries exactly two decimal places
pub fn has_two_decimals(value: &BigDecimal) -> bool {
    let (_, scale) = value.as_bigint_and_exponent();
    scale == 2
}

#[cfg(test)]
mod tests {
    use super::*;

    fn dec(value: &str) -> BigDecimal {
        value.parse().unwrap()
    }

    #[test]
    fn test_round2_half_up() {
        assert_eq!(round2(&dec("2.345")), dec("2.35"));
        assert_eq!(round2(&dec("2.344")), dec("2.34"));
        assert_eq!(round2(&dec("-2.345")), dec("-2.35"));
    }

    #[test]
    fn test_round2_pads_integers() {
        let rounded = round2(&BigDecimal::from(2320));
        assert!(has_two_decimals(&rounded));
        assert_eq!(rounded.to_string(), "2320.00");
    }

    #[test]
    fn test_percent_of() {
        assert_eq!(percent_of(&BigDecimal::from(2000), &BigDecimal::from(16)), BigDecimal::from(320));
        assert_eq!(percent_of(&dec("1000.50"), &BigDecimal::from(4)), dec("40.02"));
    }
}

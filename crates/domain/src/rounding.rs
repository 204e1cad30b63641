//! Decimal rounding for reported figures
//!
//! Values are rounded through their shortest correctly-rounded decimal rendering,
//! so halves are judged on the exact binary value. `round_to(2.675, 2)` is `2.67`
//! because `2.675` is stored as `2.67499999...`.

/// Decimal places for per-year samples and means
pub const MEAN_DECIMALS: usize = 3;

/// Decimal places for threshold probabilities
pub const PROBABILITY_DECIMALS: usize = 2;

/// Round `value` to `decimals` places. Non-finite values pass through unchanged.
#[must_use]
pub fn round_to(value: f64, decimals: usize) -> f64 {
    if !value.is_finite() {
        return value;
    }
    format!("{value:.decimals$}").parse().unwrap_or(value)
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn rounds_kelvin_conversion_noise() {
        assert!((round_to(300.0 - 273.15, 3) - 26.85).abs() < f64::EPSILON);
    }

    #[test]
    fn rounds_rate_conversion_noise() {
        assert!((round_to(0.0001 * 3600.0, 3) - 0.36).abs() < f64::EPSILON);
    }

    #[test]
    fn ties_follow_binary_value() {
        assert!((round_to(2.675, 2) - 2.67).abs() < f64::EPSILON);
        assert!((round_to(1.0005, 3) - 1.0).abs() < f64::EPSILON);
    }

    #[test]
    fn negative_values_round_symmetrically() {
        assert!((round_to(-1.23456, 3) - -1.235).abs() < f64::EPSILON);
    }

    #[test]
    fn non_finite_passes_through() {
        assert!(round_to(f64::NAN, 3).is_nan());
        assert!(round_to(f64::INFINITY, 3).is_infinite());
    }

    proptest! {
        #[test]
        fn rounding_error_is_bounded(value in -1.0e6f64..1.0e6) {
            let rounded = round_to(value, 3);
            prop_assert!((rounded - value).abs() <= 0.000_5 + 1e-9);
        }

        #[test]
        fn rounding_is_idempotent(value in -1.0e6f64..1.0e6) {
            let once = round_to(value, 2);
            prop_assert_eq!(once, round_to(once, 2));
        }
    }
}

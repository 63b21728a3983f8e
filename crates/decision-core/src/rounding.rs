//! Display rounding shared by every 2-decimal value the core emits.

/// Rounds to two decimals, ties to even on the scaled value.
pub fn round2(value: f64) -> f64 {
    (value * 100.0).round_ties_even() / 100.0
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn thirds_round_to_two_places() {
        assert_eq!(round2(2.0 / 3.0), 0.67);
        assert_eq!(round2(1.0 / 3.0), 0.33);
    }

    #[test]
    fn exact_ties_go_to_even() {
        assert_eq!(round2(0.125), 0.12);
        assert_eq!(round2(0.375), 0.38);
        assert_eq!(round2(-0.125), -0.12);
    }

    #[test]
    fn negative_values_keep_sign() {
        assert_eq!(round2(-0.056), -0.06);
        assert_eq!(round2(0.0), 0.0);
    }
}

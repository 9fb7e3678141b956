//! Fixed-decimal rounding with an explicit midpoint strategy.
//!
//! `f64::round` always rounds halves away from zero. Progression percentages
//! need ties resolved upward instead, so the strategy is a parameter here.

/// How a value exactly halfway between two candidates is resolved.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MidpointRounding {
    /// Ties go toward positive infinity (`0.125 -> 0.13`, `-0.125 -> -0.12`).
    ToPositiveInfinity,
    /// Ties go away from zero (`0.125 -> 0.13`, `-0.125 -> -0.13`).
    AwayFromZero,
}

/// Rounds `value` to `decimals` fractional digits.
///
/// Non-finite values are returned unchanged.
#[must_use]
pub fn round_to(value: f64, decimals: u32, mode: MidpointRounding) -> f64 {
    if !value.is_finite() {
        return value;
    }
    let scale = 10_f64.powi(i32::try_from(decimals).unwrap_or(i32::MAX));
    let scaled = value * scale;
    let rounded = match mode {
        MidpointRounding::ToPositiveInfinity => (scaled + 0.5).floor(),
        MidpointRounding::AwayFromZero => scaled.round(),
    };
    rounded / scale
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_ties_to_positive_infinity() {
        assert_eq!(round_to(0.125, 2, MidpointRounding::ToPositiveInfinity), 0.13);
        assert_eq!(round_to(-0.125, 2, MidpointRounding::ToPositiveInfinity), -0.12);
        assert_eq!(round_to(2.5, 0, MidpointRounding::ToPositiveInfinity), 3.0);
        assert_eq!(round_to(-2.5, 0, MidpointRounding::ToPositiveInfinity), -2.0);
    }

    #[test]
    fn test_ties_away_from_zero() {
        assert_eq!(round_to(2.5, 0, MidpointRounding::AwayFromZero), 3.0);
        assert_eq!(round_to(-2.5, 0, MidpointRounding::AwayFromZero), -3.0);
        assert_eq!(round_to(70.38, 0, MidpointRounding::AwayFromZero), 70.0);
    }

    #[test]
    fn test_non_ties_round_to_nearest() {
        assert_eq!(round_to(33.333_333, 2, MidpointRounding::ToPositiveInfinity), 33.33);
        assert_eq!(round_to(66.666_666, 2, MidpointRounding::ToPositiveInfinity), 66.67);
    }

    #[test]
    fn test_non_finite_passthrough() {
        assert!(round_to(f64::NAN, 2, MidpointRounding::AwayFromZero).is_nan());
        assert_eq!(
            round_to(f64::INFINITY, 2, MidpointRounding::ToPositiveInfinity),
            f64::INFINITY
        );
    }
}

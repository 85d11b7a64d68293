//! Amount Validation
//!
//! Donation amounts arrive from clients in major currency units (10 for
//! ten euro); the processor wants minor units (1000 cents).

/// Convert a major-unit amount to minor units.
///
/// Returns `None` for anything that is not a positive, finite amount of
/// at least one minor unit: NaN, infinities, zero, negatives, and values
/// that round down to zero cents.
pub fn to_minor_units(major: f64) -> Option<i64> {
    if !major.is_finite() {
        return None;
    }
    let minor = (major * 100.0).round();
    if minor <= 0.0 || minor > i64::MAX as f64 {
        None
    } else {
        Some(minor as i64)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_whole_amounts() {
        assert_eq!(to_minor_units(10.0), Some(1000));
        assert_eq!(to_minor_units(1.0), Some(100));
    }

    #[test]
    fn test_fractional_amounts_round_to_cents() {
        assert_eq!(to_minor_units(2.5), Some(250));
        assert_eq!(to_minor_units(9.999), Some(1000));
        assert_eq!(to_minor_units(0.01), Some(1));
    }

    #[test]
    fn test_zero_and_negative_are_rejected() {
        assert_eq!(to_minor_units(0.0), None);
        assert_eq!(to_minor_units(-5.0), None);
        assert_eq!(to_minor_units(-0.01), None);
    }

    #[test]
    fn test_sub_cent_amounts_are_rejected() {
        assert_eq!(to_minor_units(0.004), None);
    }

    #[test]
    fn test_non_finite_amounts_are_rejected() {
        assert_eq!(to_minor_units(f64::NAN), None);
        assert_eq!(to_minor_units(f64::INFINITY), None);
        assert_eq!(to_minor_units(f64::NEG_INFINITY), None);
    }
}

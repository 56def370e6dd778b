//! Shared helpers for Decimal ↔ f64 conversions at the response boundary.
//!
//! All energy and price quantities come out of Postgres as `NUMERIC`
//! (`rust_decimal::Decimal`) and stay that way through the statistics
//! layer; conversion to `f64` happens only when building response DTOs.
//! Prices are rounded to 2 decimal places before conversion.

use rust_decimal::prelude::ToPrimitive;
use rust_decimal::{Decimal, RoundingStrategy};

/// Round a price to 2 decimal places, half away from zero.
///
/// Matches conventional currency rounding (2.335 → 2.34, -2.335 → -2.34)
/// rather than banker's rounding.
pub(crate) fn round_price(d: Decimal) -> Decimal {
    d.round_dp_with_strategy(2, RoundingStrategy::MidpointAwayFromZero)
}

/// Convert a Decimal to f64, defaulting to 0.0 for values that can't be
/// represented.
pub(crate) fn dec_to_f64(d: Decimal) -> f64 {
    d.to_f64().unwrap_or(0.0)
}

/// Convert an Option<Decimal> to Option<f64>.
pub(crate) fn opt_dec_to_f64(d: Option<Decimal>) -> Option<f64> {
    d.and_then(|v| v.to_f64())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::str::FromStr;

    #[test]
    fn test_round_price_truncates_to_2dp() {
        let d = Decimal::from_str("2.333333").unwrap();
        assert_eq!(round_price(d), Decimal::from_str("2.33").unwrap());
    }

    #[test]
    fn test_round_price_midpoint_away_from_zero() {
        let d = Decimal::from_str("2.335").unwrap();
        assert_eq!(round_price(d), Decimal::from_str("2.34").unwrap());
        let d = Decimal::from_str("-2.335").unwrap();
        assert_eq!(round_price(d), Decimal::from_str("-2.34").unwrap());
    }

    #[test]
    fn test_round_price_already_rounded() {
        let d = Decimal::from_str("5.1").unwrap();
        assert_eq!(round_price(d), Decimal::from_str("5.1").unwrap());
    }

    #[test]
    fn test_dec_to_f64_normal() {
        let d = Decimal::from_str("3.14").unwrap();
        assert!((dec_to_f64(d) - 3.14).abs() < 1e-10);
    }

    #[test]
    fn test_dec_to_f64_zero() {
        assert_eq!(dec_to_f64(Decimal::ZERO), 0.0);
    }

    #[test]
    fn test_opt_dec_to_f64() {
        assert_eq!(opt_dec_to_f64(None), None);
        let d = Decimal::from_str("3.14").unwrap();
        assert!((opt_dec_to_f64(Some(d)).unwrap() - 3.14).abs() < 1e-10);
    }
}

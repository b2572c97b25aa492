//! Lossless token-amount type backed by rust_decimal.
//!
//! Liquidity magnitudes, fee balances and amount bounds are opaque
//! non-negative counters; the projector only ever adds to them or
//! subtracts with an explicit floor at zero.

use rust_decimal::Decimal as RustDecimal;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Lossless token amount.
///
/// Serializes to a JSON string: on-chain magnitudes routinely exceed what
/// a float can represent exactly.
#[derive(
    Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize,
)]
pub struct Amount(#[serde(with = "rust_decimal::serde::str")] RustDecimal);

impl Amount {
    /// Parse an Amount from a string losslessly.
    ///
    /// # Errors
    /// Returns an error if the string is not a valid decimal number.
    pub fn from_str_canonical(s: &str) -> Result<Self, rust_decimal::Error> {
        RustDecimal::from_str(s).map(Amount)
    }

    /// Format as a canonical string (no exponent notation, no trailing zeros).
    pub fn to_canonical_string(&self) -> String {
        format!("{}", self.0.normalize())
    }

    /// The additive identity (0).
    pub fn zero() -> Self {
        Amount(RustDecimal::ZERO)
    }

    /// Returns true if the value is exactly zero.
    pub fn is_zero(&self) -> bool {
        self.0.is_zero()
    }

    /// Subtract, flooring at zero.
    ///
    /// Returns the floored result and whether the floor was applied. A
    /// clamp only happens on a malformed stream; callers log it.
    pub fn saturating_sub(self, rhs: Amount) -> (Amount, bool) {
        if rhs.0 > self.0 {
            (Amount::zero(), true)
        } else {
            (Amount(self.0 - rhs.0), false)
        }
    }
}

impl fmt::Display for Amount {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.to_canonical_string())
    }
}

impl FromStr for Amount {
    type Err = rust_decimal::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::from_str_canonical(s)
    }
}

impl From<u64> for Amount {
    fn from(value: u64) -> Self {
        Amount(RustDecimal::from(value))
    }
}

impl From<RustDecimal> for Amount {
    fn from(value: RustDecimal) -> Self {
        Amount(value)
    }
}

impl From<Amount> for RustDecimal {
    fn from(value: Amount) -> Self {
        value.0
    }
}

impl std::ops::Add for Amount {
    type Output = Amount;

    fn add(self, rhs: Amount) -> Amount {
        Amount(self.0 + rhs.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_amount_parse_roundtrip() {
        for s in ["0", "1", "1000000000000000000", "340282366920938463463"] {
            let amount = Amount::from_str_canonical(s).expect("parse failed");
            let reparsed =
                Amount::from_str_canonical(&amount.to_canonical_string()).expect("reparse failed");
            assert_eq!(amount, reparsed, "roundtrip failed for {}", s);
        }
    }

    #[test]
    fn test_amount_add() {
        let a = Amount::from(5u64);
        let b = Amount::from(7u64);
        assert_eq!((a + b).to_canonical_string(), "12");
    }

    #[test]
    fn test_saturating_sub_exact() {
        let a = Amount::from(10u64);
        let (result, clamped) = a.saturating_sub(Amount::from(10u64));
        assert!(result.is_zero());
        assert!(!clamped);
    }

    #[test]
    fn test_saturating_sub_floors_at_zero() {
        let a = Amount::from(3u64);
        let (result, clamped) = a.saturating_sub(Amount::from(10u64));
        assert!(result.is_zero());
        assert!(clamped);
    }

    #[test]
    fn test_amount_json_is_string() {
        let amount = Amount::from_str_canonical("1000000000000000000").unwrap();
        let json = serde_json::to_value(amount).unwrap();
        assert!(json.is_string());
        let back: Amount = serde_json::from_value(json).unwrap();
        assert_eq!(back, amount);
    }

    #[test]
    fn test_amount_canonical_strips_trailing_zeros() {
        let amount = Amount::from_str_canonical("5.000").unwrap();
        assert_eq!(amount.to_canonical_string(), "5");
    }
}

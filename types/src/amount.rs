//! Fixed-point amount type.
//!
//! Amounts are stored as integer nano-units (9 fractional digits) to avoid
//! floating-point drift in sums. The smallest unit is 1 nano.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::ops::Add;
use thiserror::Error;

/// Nano-units per whole token.
pub const NANOS_PER_UNIT: u128 = 1_000_000_000;

#[derive(Debug, Error, PartialEq)]
pub enum AmountError {
    #[error("amount is not a valid decimal: {0}")]
    Malformed(String),

    #[error("amount is negative: {0}")]
    Negative(f64),

    #[error("amount is out of range: {0}")]
    OutOfRange(String),
}

/// A token amount with 9-digit fractional precision.
///
/// Internally stored as raw nano-units (u128).
#[derive(
    Clone, Copy, Debug, Default, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize,
)]
pub struct Amount(u128);

impl Amount {
    pub const ZERO: Self = Self(0);

    pub fn from_raw(raw: u128) -> Self {
        Self(raw)
    }

    pub fn raw(&self) -> u128 {
        self.0
    }

    pub fn is_zero(&self) -> bool {
        self.0 == 0
    }

    pub fn is_positive(&self) -> bool {
        self.0 > 0
    }

    pub fn checked_add(self, other: Self) -> Option<Self> {
        self.0.checked_add(other.0).map(Self)
    }

    pub fn saturating_add(self, other: Self) -> Self {
        Self(self.0.saturating_add(other.0))
    }

    /// Parse a webhook-supplied floating-point amount, rounding to nanos.
    ///
    /// Webhook payloads carry amounts as JSON numbers; the precision loss of
    /// one f64 round-trip is below the 9-digit scale for realistic values.
    pub fn from_f64(value: f64) -> Result<Self, AmountError> {
        if !value.is_finite() {
            return Err(AmountError::Malformed(value.to_string()));
        }
        if value < 0.0 {
            return Err(AmountError::Negative(value));
        }
        let nanos = value * NANOS_PER_UNIT as f64;
        if nanos > u128::MAX as f64 {
            return Err(AmountError::OutOfRange(value.to_string()));
        }
        Ok(Self(nanos.round() as u128))
    }

    /// Parse a decimal string such as `"1.5"` or `"0.000000001"`.
    pub fn from_decimal_str(s: &str) -> Result<Self, AmountError> {
        let s = s.trim();
        if s.is_empty() || s.starts_with('-') {
            return Err(AmountError::Malformed(s.to_string()));
        }
        let (whole, frac) = match s.split_once('.') {
            Some((w, f)) => (w, f),
            None => (s, ""),
        };
        if frac.len() > 9 {
            return Err(AmountError::OutOfRange(s.to_string()));
        }
        let whole: u128 = if whole.is_empty() {
            0
        } else {
            whole
                .parse()
                .map_err(|_| AmountError::Malformed(s.to_string()))?
        };
        let frac_nanos: u128 = if frac.is_empty() {
            0
        } else {
            let padded = format!("{frac:0<9}");
            padded
                .parse()
                .map_err(|_| AmountError::Malformed(s.to_string()))?
        };
        whole
            .checked_mul(NANOS_PER_UNIT)
            .and_then(|n| n.checked_add(frac_nanos))
            .map(Self)
            .ok_or_else(|| AmountError::OutOfRange(s.to_string()))
    }

    /// Lossy conversion for rail API payloads, which take JSON numbers.
    pub fn as_f64(&self) -> f64 {
        self.0 as f64 / NANOS_PER_UNIT as f64
    }

    /// Canonical decimal rendering with trailing zeros trimmed.
    pub fn to_decimal_string(&self) -> String {
        let whole = self.0 / NANOS_PER_UNIT;
        let frac = self.0 % NANOS_PER_UNIT;
        if frac == 0 {
            return whole.to_string();
        }
        let frac = format!("{frac:09}");
        format!("{whole}.{}", frac.trim_end_matches('0'))
    }
}

impl Add for Amount {
    type Output = Self;
    fn add(self, rhs: Self) -> Self {
        Self(self.0 + rhs.0)
    }
}

impl fmt::Display for Amount {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.to_decimal_string())
    }
}

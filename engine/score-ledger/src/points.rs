//! Points type for exact score arithmetic with half-point support

use rust_decimal::{Decimal, RoundingStrategy};
use serde::{Deserialize, Serialize};
use std::ops::{Add, Neg, Sub};
use std::str::FromStr;

use crate::error::LedgerError;

/// A score or score delta.
///
/// Backed by a decimal so that thousands of 0.5 or 0.1 increments never drift
/// the way binary floats would.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Points(Decimal);

impl Points {
    pub const ZERO: Points = Points(Decimal::ZERO);

    /// Whole points
    pub fn new(points: i64) -> Self {
        Self(Decimal::from(points))
    }

    /// Create from decimal
    pub fn from_decimal(decimal: Decimal) -> Self {
        Self(decimal)
    }

    /// Get the value as a decimal
    pub fn to_decimal(self) -> Decimal {
        self.0
    }

    /// `tenths / 10` points, e.g. `from_tenths(5)` is half a point
    pub fn from_tenths(tenths: i64) -> Self {
        Self(Decimal::new(tenths, 1))
    }

    pub fn is_zero(self) -> bool {
        self.0.is_zero()
    }

    pub fn is_negative(self) -> bool {
        self.0.is_sign_negative() && !self.0.is_zero()
    }

    /// Replace a negative value with zero
    pub fn clamp_non_negative(self) -> Self {
        if self.is_negative() {
            Self::ZERO
        } else {
            self
        }
    }

    /// Sum that stops at the decimal range instead of overflowing
    pub fn saturating_add(self, other: Self) -> Self {
        Self(self.0.saturating_add(other.0))
    }

    pub fn saturating_sub(self, other: Self) -> Self {
        Self(self.0.saturating_sub(other.0))
    }

    /// Value rounded to one decimal place, half away from zero
    pub fn rounded(self) -> Self {
        Self(self.0.round_dp_with_strategy(1, RoundingStrategy::MidpointAwayFromZero))
    }
}

impl Add for Points {
    type Output = Self;

    fn add(self, other: Self) -> Self {
        Self(self.0 + other.0)
    }
}

impl Sub for Points {
    type Output = Self;

    fn sub(self, other: Self) -> Self {
        Self(self.0 - other.0)
    }
}

impl Neg for Points {
    type Output = Self;

    fn neg(self) -> Self {
        Self(-self.0)
    }
}

impl From<i64> for Points {
    fn from(points: i64) -> Self {
        Self::new(points)
    }
}

impl FromStr for Points {
    type Err = LedgerError;

    /// Parses `2`, `-1`, `+3`, `0.5`
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let trimmed = s.trim();
        let unsigned = trimmed.strip_prefix('+').unwrap_or(trimmed);
        Decimal::from_str(unsigned)
            .map(Self)
            .map_err(|_| LedgerError::InvalidAmount { input: s.to_string() })
    }
}

impl std::fmt::Display for Points {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&format_points(*self))
    }
}

/// One decimal place with a trailing `.0` dropped: `3`, `2.5`, `-1`
pub fn format_points(points: Points) -> String {
    let rounded = points.rounded().0.normalize();
    if rounded.is_zero() {
        return "0".to_string();
    }
    rounded.to_string()
}

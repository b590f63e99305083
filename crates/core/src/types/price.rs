//! Non-negative product price.
//!
//! Prices are held as [`Decimal`] to avoid binary floating point drift in
//! storage, but cross the JSON boundary as plain numbers.

use core::fmt;

use rust_decimal::Decimal;
use rust_decimal::prelude::FromPrimitive;
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use thiserror::Error;

/// Errors that can occur when constructing a [`Price`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum PriceError {
    /// The amount is below zero.
    #[error("price cannot be negative")]
    Negative,
    /// The amount is NaN or infinite.
    #[error("price must be a finite number")]
    NotFinite,
    /// The amount is at or above [`Price::MAX_EXCLUSIVE`].
    #[error("price is out of range")]
    OutOfRange,
    /// The amount has more than [`Price::MAX_SCALE`] decimal places.
    #[error("price has too many decimal places")]
    TooPrecise,
}

/// A price in the store's currency.
///
/// Always `>= 0`, below [`Price::MAX_EXCLUSIVE`] and with at most
/// [`Price::MAX_SCALE`] decimal places, so it fits a `NUMERIC(14, 4)` column
/// without rounding.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Price(Decimal);

impl Price {
    /// A price of zero.
    pub const ZERO: Self = Self(Decimal::ZERO);

    /// Maximum number of decimal places.
    pub const MAX_SCALE: u32 = 4;

    /// Smallest amount that is too large (10 integer digits).
    pub const MAX_EXCLUSIVE: Decimal = Decimal::from_parts(0x540B_E400, 0x2, 0, false, 0); // 10_000_000_000

    /// Create a price from a decimal amount.
    ///
    /// # Errors
    ///
    /// Returns [`PriceError::Negative`] if `amount < 0`,
    /// [`PriceError::OutOfRange`] if it is at or above [`Price::MAX_EXCLUSIVE`]
    /// and [`PriceError::TooPrecise`] if it has more than [`Price::MAX_SCALE`]
    /// decimal places.
    pub fn new(amount: Decimal) -> Result<Self, PriceError> {
        if amount.is_sign_negative() && !amount.is_zero() {
            return Err(PriceError::Negative);
        }
        let amount = amount.normalize();
        if amount >= Self::MAX_EXCLUSIVE {
            return Err(PriceError::OutOfRange);
        }
        if amount.scale() > Self::MAX_SCALE {
            return Err(PriceError::TooPrecise);
        }
        Ok(Self(amount))
    }

    /// Create a price from a JSON-style floating point number.
    ///
    /// # Errors
    ///
    /// Returns an error if the value is not finite, negative, or too large.
    pub fn from_f64(amount: f64) -> Result<Self, PriceError> {
        if !amount.is_finite() {
            return Err(PriceError::NotFinite);
        }
        if amount < 0.0 {
            return Err(PriceError::Negative);
        }
        let decimal = Decimal::from_f64(amount).ok_or(PriceError::OutOfRange)?;
        Self::new(decimal)
    }

    /// The decimal amount.
    #[must_use]
    pub const fn amount(&self) -> Decimal {
        self.0
    }
}

impl fmt::Display for Price {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:.2}", self.0)
    }
}

impl TryFrom<Decimal> for Price {
    type Error = PriceError;

    fn try_from(amount: Decimal) -> Result<Self, Self::Error> {
        Self::new(amount)
    }
}

impl Serialize for Price {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        rust_decimal::serde::float::serialize(&self.0, serializer)
    }
}

impl<'de> Deserialize<'de> for Price {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let amount = rust_decimal::serde::float::deserialize(deserializer)?;
        Self::new(amount).map_err(serde::de::Error::custom)
    }
}

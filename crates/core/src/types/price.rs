//! Unit price with decimal arithmetic.
//!
//! The shop sells in a single currency (USD), so a price is just a positive
//! amount with at most cent precision. Totals are computed on `Decimal` so
//! `2.50 * 2 + 2.75` is exactly `7.75`.

use core::fmt;

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// Errors that can occur when constructing a [`Price`].
#[derive(thiserror::Error, Debug, Clone, PartialEq, Eq)]
pub enum PriceError {
    /// The amount is zero or negative.
    #[error("price must be greater than 0 (got {0})")]
    NotPositive(Decimal),
    /// The amount has sub-cent digits.
    #[error("price must have at most 2 decimal places (got {0})")]
    TooPrecise(Decimal),
}

/// A positive unit price in dollars.
///
/// ```
/// use rust_decimal::Decimal;
/// use sweets_core::Price;
///
/// let price = Price::new(Decimal::new(250, 2)).unwrap();
/// assert_eq!(price.line_total(2), Decimal::new(500, 2));
/// assert_eq!(price.to_string(), "$2.50");
///
/// assert!(Price::new(Decimal::ZERO).is_err());
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(try_from = "Decimal", into = "Decimal")]
pub struct Price(Decimal);

impl Price {
    /// Largest number of fractional digits accepted.
    pub const MAX_SCALE: u32 = 2;

    /// Validate and wrap an amount.
    ///
    /// # Errors
    ///
    /// Returns `PriceError::NotPositive` for amounts `<= 0` and
    /// `PriceError::TooPrecise` for amounts with more than two decimals.
    pub fn new(amount: Decimal) -> Result<Self, PriceError> {
        if amount <= Decimal::ZERO {
            return Err(PriceError::NotPositive(amount));
        }

        let normalized = amount.normalize();
        if normalized.scale() > Self::MAX_SCALE {
            return Err(PriceError::TooPrecise(amount));
        }

        Ok(Self(amount))
    }

    /// Build a price from a whole number of cents.
    ///
    /// # Errors
    ///
    /// Returns `PriceError::NotPositive` if `cents <= 0`.
    pub fn from_cents(cents: i64) -> Result<Self, PriceError> {
        Self::new(Decimal::new(cents, 2))
    }

    #[must_use]
    pub const fn amount(&self) -> Decimal {
        self.0
    }

    /// Price multiplied by a quantity.
    #[must_use]
    pub fn line_total(&self, quantity: u32) -> Decimal {
        self.0 * Decimal::from(quantity)
    }
}

impl fmt::Display for Price {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "${:.2}", self.0)
    }
}

impl TryFrom<Decimal> for Price {
    type Error = PriceError;

    fn try_from(value: Decimal) -> Result<Self, Self::Error> {
        Self::new(value)
    }
}

impl From<Price> for Decimal {
    fn from(price: Price) -> Self {
        price.0
    }
}

// NUMERIC(10, 2) in the database
#[cfg(feature = "postgres")]
impl sqlx::Type<sqlx::Postgres> for Price {
    fn type_info() -> sqlx::postgres::PgTypeInfo {
        <Decimal as sqlx::Type<sqlx::Postgres>>::type_info()
    }

    fn compatible(ty: &sqlx::postgres::PgTypeInfo) -> bool {
        <Decimal as sqlx::Type<sqlx::Postgres>>::compatible(ty)
    }
}

#[cfg(feature = "postgres")]
impl<'r> sqlx::Decode<'r, sqlx::Postgres> for Price {
    fn decode(value: sqlx::postgres::PgValueRef<'r>) -> Result<Self, sqlx::error::BoxDynError> {
        let amount = <Decimal as sqlx::Decode<sqlx::Postgres>>::decode(value)?;
        Ok(Self::new(amount)?)
    }
}

#[cfg(feature = "postgres")]
impl sqlx::Encode<'_, sqlx::Postgres> for Price {
    fn encode_by_ref(
        &self,
        buf: &mut sqlx::postgres::PgArgumentBuffer,
    ) -> Result<sqlx::encode::IsNull, sqlx::error::BoxDynError> {
        <Decimal as sqlx::Encode<sqlx::Postgres>>::encode_by_ref(&self.0, buf)
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_rejects_zero_and_negative() {
        assert_eq!(
            Price::new(Decimal::ZERO),
            Err(PriceError::NotPositive(Decimal::ZERO))
        );
        assert!(matches!(
            Price::new(Decimal::new(-100, 2)),
            Err(PriceError::NotPositive(_))
        ));
    }

    #[test]
    fn test_rejects_sub_cent_amounts() {
        assert!(matches!(
            Price::new(Decimal::new(2505, 3)),
            Err(PriceError::TooPrecise(_))
        ));
    }

    #[test]
    fn test_trailing_zeros_are_not_extra_precision() {
        // 2.500 normalizes to 2.5
        assert!(Price::new(Decimal::new(2500, 3)).is_ok());
    }

    #[test]
    fn test_line_total_is_exact() {
        let chip = Price::from_cents(250).unwrap();
        let peanut = Price::from_cents(275).unwrap();
        let total = chip.line_total(2) + peanut.line_total(1);
        assert_eq!(total, Decimal::new(775, 2));
    }

    #[test]
    fn test_display_pads_cents() {
        let price = Price::new(Decimal::new(3, 0)).unwrap();
        assert_eq!(price.to_string(), "$3.00");
    }

    #[test]
    fn test_deserialize_validates() {
        let ok: Price = serde_json::from_str("\"2.25\"").unwrap();
        assert_eq!(ok.amount(), Decimal::new(225, 2));

        assert!(serde_json::from_str::<Price>("\"0\"").is_err());
        assert!(serde_json::from_str::<Price>("\"-1.00\"").is_err());
    }
}

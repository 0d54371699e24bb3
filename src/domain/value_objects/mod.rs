//! Value Objects for the orders service

mod id;

pub use id::*;

use rust_decimal::{Decimal, RoundingStrategy};
use serde::{Deserialize, Serialize};
use std::fmt;
use thiserror::Error;

/// Money value object.
///
/// Amounts carry no currency: every price in the catalog is quoted in the
/// same store currency.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Money(Decimal);

impl Money {
    pub const ZERO: Money = Money(Decimal::ZERO);

    pub fn new(amount: Decimal) -> Self { Self(amount) }
    pub fn amount(&self) -> Decimal { self.0 }
    pub fn checked_add(&self, other: Money) -> Option<Money> { self.0.checked_add(other.0).map(Money) }
    pub fn checked_multiply(&self, qty: u64) -> Option<Money> { self.0.checked_mul(Decimal::from(qty)).map(Money) }

    /// Rounds half away from zero to exactly `scale` decimal places.
    pub fn rounded(&self, scale: u32) -> Money {
        let mut amount = self.0.round_dp_with_strategy(scale, RoundingStrategy::MidpointAwayFromZero);
        amount.rescale(scale);
        Money(amount)
    }
}

impl fmt::Display for Money {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result { write!(f, "{}", self.0) }
}

/// Error for integer value objects read from storage or requests.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("value {value} is out of range")]
pub struct RangeError { pub value: i64 }

/// Quantity of a basket line. Always positive and fits a Postgres `INTEGER`.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Quantity(u32);

impl Quantity {
    const MAX: u32 = i32::MAX as u32;

    pub fn new(value: i64) -> Result<Self, RangeError> {
        match u32::try_from(value) {
            Ok(v) if v > 0 && v <= Self::MAX => Ok(Self(v)),
            _ => Err(RangeError { value }),
        }
    }
    pub fn value(&self) -> u32 { self.0 }
    pub fn as_i32(&self) -> i32 { self.0 as i32 }
    pub fn add(&self, other: Quantity) -> Self { Self(self.0.saturating_add(other.0).min(Self::MAX)) }
}

/// Delivery distance of a shop.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord)]
pub struct Distance(u32);

impl Distance {
    pub fn new(value: i64) -> Result<Self, RangeError> {
        u32::try_from(value).map(Self).map_err(|_| RangeError { value })
    }
    pub fn value(&self) -> u32 { self.0 }
}

/// Per-user delivery multiplier, stored as an integer where 100 means
/// "no discount".
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord)]
pub struct DiscountFactor(u32);

impl DiscountFactor {
    pub const NONE: DiscountFactor = DiscountFactor(100);

    pub fn new(value: i64) -> Result<Self, RangeError> {
        u32::try_from(value).map(Self).map_err(|_| RangeError { value })
    }
    pub fn value(&self) -> u32 { self.0 }
}

impl Default for DiscountFactor {
    fn default() -> Self { Self::NONE }
}

/// Normalized e-mail address used as the login identity.
#[derive(Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Email(String);

impl Email {
    pub fn parse(value: &str) -> Result<Self, EmailError> {
        let value = value.trim().to_lowercase();
        if value.is_empty() { return Err(EmailError::Empty); }
        if value.len() > 254 { return Err(EmailError::TooLong); }
        match value.split_once('@') {
            Some((local, domain)) if !local.is_empty() && domain.contains('.') && !domain.contains('@') => Ok(Self(value)),
            _ => Err(EmailError::Malformed),
        }
    }
    pub fn as_str(&self) -> &str { &self.0 }
    pub fn local_part(&self) -> &str { self.0.split('@').next().unwrap_or_default() }
}

impl fmt::Display for Email {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result { write!(f, "{}", self.0) }
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum EmailError {
    #[error("e-mail is empty")]
    Empty,
    #[error("e-mail is too long")]
    TooLong,
    #[error("e-mail is malformed")]
    Malformed,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_money_rounding_is_half_away_from_zero() {
        let m = Money::new(Decimal::new(727_275, 3));
        assert_eq!(m.rounded(2).amount(), Decimal::new(72_728, 2));
        assert_eq!(Money::new(Decimal::from(600)).rounded(2).to_string(), "600.00");
    }

    #[test]
    fn test_money_multiply() {
        let a = Money::new(Decimal::new(1999, 2));
        assert_eq!(a.checked_multiply(3).unwrap().amount(), Decimal::new(5997, 2));
    }

    #[test]
    fn test_quantity_must_be_positive() {
        assert!(Quantity::new(0).is_err());
        assert!(Quantity::new(-2).is_err());
        assert_eq!(Quantity::new(4).unwrap().value(), 4);
        assert!(Quantity::new(i64::from(i32::MAX) + 1).is_err());
    }

    #[test]
    fn test_negative_distance_and_discount_rejected() {
        assert_eq!(Distance::new(-1), Err(RangeError { value: -1 }));
        assert_eq!(DiscountFactor::new(-5), Err(RangeError { value: -5 }));
        assert_eq!(Distance::new(0).unwrap().value(), 0);
    }

    #[test]
    fn test_email() {
        let email = Email::parse("  Viktor@Mail.DE ").unwrap();
        assert_eq!(email.as_str(), "viktor@mail.de");
        assert_eq!(email.local_part(), "viktor");
        assert_eq!(Email::parse("no-at-sign"), Err(EmailError::Malformed));
        assert_eq!(Email::parse(""), Err(EmailError::Empty));
    }
}

use rust_decimal::Decimal;
use std::fmt;
use thiserror::Error;

/// The only currency this tool handles. Statements carrying anything else
/// abort the run instead of being silently converted.
pub const CURRENCY: &str = "EUR";

#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("unexpected currency '{0}' (only EUR is supported)")]
pub struct CurrencyMismatch(pub String);

/// A signed EUR amount with exact decimal precision.
///
/// The inner decimal keeps the scale of the statement text, so an amount
/// read as `1234.5` renders with one fractional digit, not two.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub struct Amount(Decimal);

impl Amount {
    /// Builds an amount from a statement value and its currency code.
    /// Any code other than `EUR` is a hard error.
    pub fn in_eur(value: Decimal, currency: &str) -> Result<Self, CurrencyMismatch> {
        if currency != CURRENCY {
            return Err(CurrencyMismatch(currency.to_string()));
        }
        Ok(Amount(value))
    }

    pub fn value(self) -> Decimal {
        self.0
    }

    pub fn is_negative(self) -> bool {
        self.0.is_sign_negative() && !self.0.is_zero()
    }
}

impl fmt::Display for Amount {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {}", self.0, CURRENCY)
    }
}

//! Amount type for the raw, signed value of a transaction.
//!
//! The raw value travels in the `data-tx-amount` attribute as a plain decimal string (e.g.
//! `-1234.50`). The display string is produced once, at render time, using an `AmountStyle`, and
//! is never parsed back into a value.

use rust_decimal::prelude::ToPrimitive;
use rust_decimal::Decimal;
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::error::Error;
use std::fmt;
use std::fmt::{Debug, Display, Formatter};
use std::str::FromStr;

/// Where the currency symbol goes relative to the number.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SymbolPosition {
    Prefix,
    #[default]
    Suffix,
}

serde_plain::derive_display_from_serialize!(SymbolPosition);
serde_plain::derive_fromstr_from_deserialize!(SymbolPosition);

/// Represents how amounts should be displayed.
///
/// # Examples
///  - `{ symbol: "€", position: Suffix, commas: true }` -> `-1,234.50€`
///  - `{ symbol: "$", position: Prefix, commas: false }` -> `-$1234.50`
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub struct AmountStyle {
    #[serde(default = "default_symbol")]
    pub symbol: String,
    #[serde(default)]
    pub position: SymbolPosition,
    #[serde(default = "default_commas")]
    pub commas: bool,
}

fn default_symbol() -> String {
    "€".to_string()
}

fn default_commas() -> bool {
    true
}

impl Default for AmountStyle {
    fn default() -> Self {
        Self {
            symbol: default_symbol(),
            position: SymbolPosition::default(),
            commas: default_commas(),
        }
    }
}

/// The raw, signed value of a transaction.
///
/// ```
/// # use tx_annotate::model::{Amount, AmountStyle};
/// # use std::str::FromStr;
/// let amount = Amount::from_str("-1234.5").unwrap();
/// assert_eq!(amount.display(&AmountStyle::default()), "-1,234.50€");
/// assert_eq!(amount.to_string(), "-1234.5");
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default)]
pub struct Amount {
    value: Decimal,
}

impl Amount {
    pub const fn new(value: Decimal) -> Self {
        Self { value }
    }

    /// Returns the underlying Decimal value.
    pub fn value(&self) -> Decimal {
        self.value
    }

    pub fn is_zero(&self) -> bool {
        self.value.is_zero()
    }

    pub fn is_positive(&self) -> bool {
        !self.is_zero() && self.value.is_sign_positive()
    }

    pub fn is_negative(&self) -> bool {
        !self.is_zero() && self.value.is_sign_negative()
    }

    /// Formats the amount for display with two decimal places.
    pub fn display(&self, style: &AmountStyle) -> String {
        let sign = if self.is_negative() { "-" } else { "" };
        let abs = self.value.abs().round_dp(2);
        let num = if style.commas {
            format_num::format_num!(",.2", abs.to_f64().unwrap_or_default())
        } else {
            format!("{abs:.2}")
        };
        match style.position {
            SymbolPosition::Prefix => format!("{sign}{}{num}", style.symbol),
            SymbolPosition::Suffix => format!("{sign}{num}{}", style.symbol),
        }
    }
}

/// An error that can occur when parsing a raw amount.
pub struct AmountError(rust_decimal::Error);

impl Debug for AmountError {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        Debug::fmt(&self.0, f)
    }
}

impl Display for AmountError {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        Display::fmt(&self.0, f)
    }
}

impl std::error::Error for AmountError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        Some(&self.0)
    }
}

impl FromStr for Amount {
    type Err = AmountError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let trimmed = s.trim();
        let value = Decimal::from_str(trimmed)
            .or_else(|_| Decimal::from_scientific(trimmed))
            .map_err(AmountError)?;
        Ok(Amount { value })
    }
}

impl Display for Amount {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.value)
    }
}

impl Serialize for Amount {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        serializer.serialize_str(&self.to_string())
    }
}

impl<'de> Deserialize<'de> for Amount {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        let s = String::deserialize(deserializer)?;
        Amount::from_str(&s).map_err(serde::de::Error::custom)
    }
}

impl From<Decimal> for Amount {
    fn from(value: Decimal) -> Self {
        Amount::new(value)
    }
}

impl From<Amount> for Decimal {
    fn from(amount: Amount) -> Self {
        amount.value()
    }
}

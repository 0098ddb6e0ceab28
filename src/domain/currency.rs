//! Currency codes and currency pairs.

use std::fmt;
use std::str::FromStr;

use super::DomainError;

/// ISO 4217 numeric currency code.
///
/// The upstream API identifies currencies by numeric code; the alpha names
/// below cover the currencies this deployment cares about. Unknown codes are
/// still representable and display as their numeric value.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct CurrencyCode(u16);

impl CurrencyCode {
    pub const UAH: Self = Self(980);
    pub const USD: Self = Self(840);
    pub const EUR: Self = Self(978);
    pub const GBP: Self = Self(826);
    pub const PLN: Self = Self(985);
    pub const CHF: Self = Self(756);

    #[must_use]
    pub const fn new(code: u16) -> Self {
        Self(code)
    }

    #[must_use]
    pub const fn value(self) -> u16 {
        self.0
    }

    /// Look up a code by its ISO alpha name.
    #[must_use]
    pub fn from_alpha(alpha: &str) -> Option<Self> {
        match alpha {
            "UAH" => Some(Self::UAH),
            "USD" => Some(Self::USD),
            "EUR" => Some(Self::EUR),
            "GBP" => Some(Self::GBP),
            "PLN" => Some(Self::PLN),
            "CHF" => Some(Self::CHF),
            _ => None,
        }
    }

    /// The ISO alpha name, when known.
    #[must_use]
    pub const fn alpha(self) -> Option<&'static str> {
        match self.0 {
            980 => Some("UAH"),
            840 => Some("USD"),
            978 => Some("EUR"),
            826 => Some("GBP"),
            985 => Some("PLN"),
            756 => Some("CHF"),
            _ => None,
        }
    }
}

impl fmt::Display for CurrencyCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.alpha() {
            Some(alpha) => f.write_str(alpha),
            None => write!(f, "{}", self.0),
        }
    }
}

/// A currency pair quoted as `base` priced in `quote`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Pair {
    pub base: CurrencyCode,
    pub quote: CurrencyCode,
}

impl Pair {
    #[must_use]
    pub const fn new(base: CurrencyCode, quote: CurrencyCode) -> Self {
        Self { base, quote }
    }
}

impl fmt::Display for Pair {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}/{}", self.base, self.quote)
    }
}

impl FromStr for Pair {
    type Err = DomainError;

    /// Parse the `"USD/UAH"` config syntax.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let (base, quote) = s
            .split_once('/')
            .ok_or_else(|| DomainError::InvalidPair(s.to_string()))?;

        let base = CurrencyCode::from_alpha(base.trim())
            .ok_or_else(|| DomainError::UnknownCurrency(base.trim().to_string()))?;
        let quote = CurrencyCode::from_alpha(quote.trim())
            .ok_or_else(|| DomainError::UnknownCurrency(quote.trim().to_string()))?;

        Ok(Self::new(base, quote))
    }
}

//! Per-country price display using decimal arithmetic.
//!
//! Catalog prices are whole amounts in the baseline currency (USD). Each
//! country maps to a currency symbol and a fixed multiplier; the table is
//! static configuration, not a live exchange-rate source.
//!
//! ```rust
//! use onlinestore_core::{Country, convert_price};
//!
//! assert_eq!(convert_price(100, Country::Brazil).to_string(), "R$ 500");
//! assert_eq!(convert_price(100, Country::Europe).to_string(), "€ 90");
//! ```

use core::fmt;
use core::str::FromStr;

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// Error returned when a country name is not in the conversion table.
#[derive(thiserror::Error, Debug, Clone, PartialEq, Eq)]
#[error("unknown country: {0}")]
pub struct UnknownCountryError(pub String);

/// Country a user shops from, which selects the display currency.
///
/// Serialized as the upper snake case name (`"UNITED_KINGDOM"`). Any name not
/// in the table deserializes to [`Country::Unknown`], which displays prices in
/// the baseline currency.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum Country {
    #[default]
    Usa,
    Brazil,
    Argentina,
    Mexico,
    Europe,
    UnitedKingdom,
    Japan,
    Russia,
    China,
    Unknown,
}

impl Country {
    /// Every country with a dedicated table entry.
    pub const ALL: [Self; 9] = [
        Self::Usa,
        Self::Brazil,
        Self::Argentina,
        Self::Mexico,
        Self::Europe,
        Self::UnitedKingdom,
        Self::Japan,
        Self::Russia,
        Self::China,
    ];

    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Usa => "USA",
            Self::Brazil => "BRAZIL",
            Self::Argentina => "ARGENTINA",
            Self::Mexico => "MEXICO",
            Self::Europe => "EUROPE",
            Self::UnitedKingdom => "UNITED_KINGDOM",
            Self::Japan => "JAPAN",
            Self::Russia => "RUSSIA",
            Self::China => "CHINA",
            Self::Unknown => "UNKNOWN",
        }
    }

    /// Currency symbol shown before converted amounts.
    #[must_use]
    pub const fn symbol(self) -> &'static str {
        match self {
            Self::Usa | Self::Argentina | Self::Mexico | Self::Unknown => "$",
            Self::Brazil => "R$",
            Self::Europe => "€",
            Self::UnitedKingdom => "£",
            Self::Japan | Self::China => "¥",
            Self::Russia => "₽",
        }
    }

    /// Fixed multiplier from the baseline currency.
    #[must_use]
    pub const fn multiplier(self) -> Decimal {
        match self {
            Self::Usa | Self::Unknown => Decimal::ONE,
            Self::Brazil => Decimal::from_parts(5, 0, 0, false, 0),
            Self::Argentina => Decimal::from_parts(877, 0, 0, false, 0),
            Self::Mexico => Decimal::from_parts(17, 0, 0, false, 0),
            Self::Europe => Decimal::from_parts(9, 0, 0, false, 1),
            Self::UnitedKingdom => Decimal::from_parts(8, 0, 0, false, 1),
            Self::Japan => Decimal::from_parts(156, 0, 0, false, 0),
            Self::Russia => Decimal::from_parts(90, 0, 0, false, 0),
            Self::China => Decimal::from_parts(7, 0, 0, false, 0),
        }
    }

    /// Parse a country name, mapping anything unrecognized to `Unknown`.
    #[must_use]
    pub fn parse_lossy(s: &str) -> Self {
        s.parse().unwrap_or(Self::Unknown)
    }
}

impl fmt::Display for Country {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Country {
    type Err = UnknownCountryError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let normalized = s.trim().to_ascii_uppercase().replace([' ', '-'], "_");
        Self::ALL
            .into_iter()
            .find(|country| country.as_str() == normalized)
            .ok_or_else(|| UnknownCountryError(s.to_string()))
    }
}

impl From<String> for Country {
    fn from(s: String) -> Self {
        Self::parse_lossy(&s)
    }
}

impl From<Country> for String {
    fn from(country: Country) -> Self {
        country.as_str().to_string()
    }
}

/// A price converted into a country's display currency.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ConvertedPrice {
    pub symbol: &'static str,
    pub amount: Decimal,
}

impl fmt::Display for ConvertedPrice {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {}", self.symbol, self.amount.normalize())
    }
}

/// Convert a baseline price for display in `country`.
#[must_use]
pub fn convert_price(amount: i64, country: Country) -> ConvertedPrice {
    ConvertedPrice {
        symbol: country.symbol(),
        amount: Decimal::from(amount) * country.multiplier(),
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_conversion_table() {
        let cases = [
            (Country::Usa, "$ 100"),
            (Country::Brazil, "R$ 500"),
            (Country::Argentina, "$ 87700"),
            (Country::Mexico, "$ 1700"),
            (Country::Europe, "€ 90"),
            (Country::UnitedKingdom, "£ 80"),
            (Country::Japan, "¥ 15600"),
            (Country::Russia, "₽ 9000"),
            (Country::China, "¥ 700"),
            (Country::Unknown, "$ 100"),
        ];

        for (country, expected) in cases {
            assert_eq!(convert_price(100, country).to_string(), expected, "{country}");
        }
    }

    #[test]
    fn test_fractional_multiplier_keeps_fraction() {
        assert_eq!(convert_price(15, Country::Europe).to_string(), "€ 13.5");
        assert_eq!(convert_price(3, Country::UnitedKingdom).to_string(), "£ 2.4");
    }

    #[test]
    fn test_default_country_is_usa() {
        assert_eq!(Country::default(), Country::Usa);
    }

    #[test]
    fn test_parse_accepts_loose_spelling() {
        assert_eq!("united kingdom".parse::<Country>().unwrap(), Country::UnitedKingdom);
        assert_eq!("Brazil".parse::<Country>().unwrap(), Country::Brazil);
        assert!("Atlantis".parse::<Country>().is_err());
        assert_eq!(Country::parse_lossy("Atlantis"), Country::Unknown);
    }

    #[test]
    fn test_serde_round_trip_and_unknown_fallback() {
        assert_eq!(
            serde_json::to_string(&Country::UnitedKingdom).unwrap(),
            "\"UNITED_KINGDOM\""
        );
        let country: Country = serde_json::from_str("\"CANADA\"").unwrap();
        assert_eq!(country, Country::Unknown);
    }
}

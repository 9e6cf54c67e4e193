//! # Corridor Value Objects
//!
//! Destination countries and currency codes that make up a remittance
//! corridor.
//!
//! - [`Country`] - Fixed set of supported destination countries
//! - [`CurrencyCode`] - Upper-case 3-letter ISO currency code
//!
//! # Examples
//!
//! ```
//! use remit_quote::domain::value_objects::corridor::{Country, CurrencyCode};
//!
//! let country: Country = "Sri Lanka".parse().unwrap();
//! assert_eq!(country, Country::SriLanka);
//! assert_eq!(country.iso_code(), "LK");
//!
//! let lkr = CurrencyCode::new("lkr").unwrap();
//! assert!(country.supports_currency(&lkr));
//! ```

use crate::domain::errors::{DomainError, DomainResult};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Upper-case ISO 4217 currency code.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct CurrencyCode([u8; 3]);

impl CurrencyCode {
    /// South Korean won, the fixed send currency.
    pub const KRW: Self = Self(*b"KRW");

    /// US dollar, accepted for every destination.
    pub const USD: Self = Self(*b"USD");

    /// Parses and normalizes a currency code.
    ///
    /// # Errors
    ///
    /// Returns `DomainError::InvalidCurrency` unless the trimmed input is
    /// exactly three ASCII letters.
    pub fn new(code: &str) -> DomainResult<Self> {
        let trimmed = code.trim();
        let bytes = trimmed.as_bytes();
        match bytes {
            [a, b, c] if bytes.iter().all(u8::is_ascii_alphabetic) => Ok(Self([
                a.to_ascii_uppercase(),
                b.to_ascii_uppercase(),
                c.to_ascii_uppercase(),
            ])),
            _ => Err(DomainError::InvalidCurrency(code.to_string())),
        }
    }

    /// Returns the code as a string slice.
    #[must_use]
    pub fn as_str(&self) -> &str {
        // Constructed from ASCII letters only.
        std::str::from_utf8(&self.0).unwrap_or("???")
    }
}

impl fmt::Display for CurrencyCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for CurrencyCode {
    type Err = DomainError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::new(s)
    }
}

impl TryFrom<String> for CurrencyCode {
    type Error = DomainError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::new(&value)
    }
}

impl From<CurrencyCode> for String {
    fn from(value: CurrencyCode) -> Self {
        value.as_str().to_string()
    }
}

/// Supported destination country.
///
/// Serialized as the lower-case name used in query strings and cache keys.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Country {
    /// Vietnam.
    Vietnam,
    /// Philippines.
    Philippines,
    /// Indonesia.
    Indonesia,
    /// Cambodia.
    Cambodia,
    /// Nepal.
    Nepal,
    /// Myanmar.
    Myanmar,
    /// Thailand.
    Thailand,
    /// Uzbekistan.
    Uzbekistan,
    /// Sri Lanka.
    #[serde(rename = "srilanka")]
    SriLanka,
    /// Bangladesh.
    Bangladesh,
    /// Mongolia.
    Mongolia,
}

impl Country {
    /// All supported countries.
    pub const ALL: [Self; 11] = [
        Self::Vietnam,
        Self::Philippines,
        Self::Indonesia,
        Self::Cambodia,
        Self::Nepal,
        Self::Myanmar,
        Self::Thailand,
        Self::Uzbekistan,
        Self::SriLanka,
        Self::Bangladesh,
        Self::Mongolia,
    ];

    /// Returns the lower-case key used in queries and cache keys.
    #[must_use]
    pub const fn key(self) -> &'static str {
        match self {
            Self::Vietnam => "vietnam",
            Self::Philippines => "philippines",
            Self::Indonesia => "indonesia",
            Self::Cambodia => "cambodia",
            Self::Nepal => "nepal",
            Self::Myanmar => "myanmar",
            Self::Thailand => "thailand",
            Self::Uzbekistan => "uzbekistan",
            Self::SriLanka => "srilanka",
            Self::Bangladesh => "bangladesh",
            Self::Mongolia => "mongolia",
        }
    }

    /// Returns the display name.
    #[must_use]
    pub const fn display_name(self) -> &'static str {
        match self {
            Self::Vietnam => "Vietnam",
            Self::Philippines => "Philippines",
            Self::Indonesia => "Indonesia",
            Self::Cambodia => "Cambodia",
            Self::Nepal => "Nepal",
            Self::Myanmar => "Myanmar",
            Self::Thailand => "Thailand",
            Self::Uzbekistan => "Uzbekistan",
            Self::SriLanka => "Srilanka",
            Self::Bangladesh => "Bangladesh",
            Self::Mongolia => "Mongolia",
        }
    }

    /// Returns the ISO 3166-1 alpha-2 code.
    #[must_use]
    pub const fn iso_code(self) -> &'static str {
        match self {
            Self::Vietnam => "VN",
            Self::Philippines => "PH",
            Self::Indonesia => "ID",
            Self::Cambodia => "KH",
            Self::Nepal => "NP",
            Self::Myanmar => "MM",
            Self::Thailand => "TH",
            Self::Uzbekistan => "UZ",
            Self::SriLanka => "LK",
            Self::Bangladesh => "BD",
            Self::Mongolia => "MN",
        }
    }

    /// Returns the local currency.
    #[must_use]
    pub const fn local_currency(self) -> CurrencyCode {
        CurrencyCode(match self {
            Self::Vietnam => *b"VND",
            Self::Philippines => *b"PHP",
            Self::Indonesia => *b"IDR",
            Self::Cambodia => *b"KHR",
            Self::Nepal => *b"NPR",
            Self::Myanmar => *b"MMK",
            Self::Thailand => *b"THB",
            Self::Uzbekistan => *b"UZS",
            Self::SriLanka => *b"LKR",
            Self::Bangladesh => *b"BDT",
            Self::Mongolia => *b"MNT",
        })
    }

    /// Returns true if quotes can be requested in `currency`.
    ///
    /// Every destination accepts its local currency and USD.
    #[must_use]
    pub fn supports_currency(self, currency: &CurrencyCode) -> bool {
        *currency == self.local_currency() || *currency == CurrencyCode::USD
    }
}

impl fmt::Display for Country {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.key())
    }
}

impl FromStr for Country {
    type Err = DomainError;

    /// Case-insensitive; spaces, hyphens and underscores are ignored.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let normalized: String = s
            .chars()
            .filter(|c| !matches!(c, ' ' | '-' | '_'))
            .flat_map(char::to_lowercase)
            .collect();

        Self::ALL
            .into_iter()
            .find(|country| country.key() == normalized)
            .ok_or_else(|| DomainError::UnsupportedCountry(s.to_string()))
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    mod currency {
        use super::*;

        #[test]
        fn normalizes_to_upper_case() {
            let code = CurrencyCode::new(" vnd ").unwrap();
            assert_eq!(code.as_str(), "VND");
        }

        #[test]
        fn rejects_wrong_length_and_digits() {
            assert!(CurrencyCode::new("VN").is_err());
            assert!(CurrencyCode::new("VNDX").is_err());
            assert!(CurrencyCode::new("V1D").is_err());
            assert!(CurrencyCode::new("").is_err());
        }

        #[test]
        fn serde_uses_plain_string() {
            let json = serde_json::to_string(&CurrencyCode::KRW).unwrap();
            assert_eq!(json, "\"KRW\"");
            let parsed: CurrencyCode = serde_json::from_str("\"php\"").unwrap();
            assert_eq!(parsed.as_str(), "PHP");
        }
    }

    mod country {
        use super::*;

        #[test]
        fn parse_is_case_insensitive() {
            assert_eq!("VIETNAM".parse::<Country>().unwrap(), Country::Vietnam);
            assert_eq!("Philippines".parse::<Country>().unwrap(), Country::Philippines);
            assert_eq!("sri-lanka".parse::<Country>().unwrap(), Country::SriLanka);
        }

        #[test]
        fn parse_rejects_unknown() {
            let err = "atlantis".parse::<Country>().unwrap_err();
            assert_eq!(err, DomainError::UnsupportedCountry("atlantis".to_string()));
        }

        #[test]
        fn every_country_round_trips_through_key() {
            for country in Country::ALL {
                assert_eq!(country.key().parse::<Country>().unwrap(), country);
            }
        }

        #[test]
        fn supports_local_currency_and_usd_only() {
            let vnd = CurrencyCode::new("VND").unwrap();
            let php = CurrencyCode::new("PHP").unwrap();
            assert!(Country::Vietnam.supports_currency(&vnd));
            assert!(Country::Vietnam.supports_currency(&CurrencyCode::USD));
            assert!(!Country::Vietnam.supports_currency(&php));
        }
    }
}

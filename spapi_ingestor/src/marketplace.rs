//! Marketplace identifiers and regional endpoints.

use serde::{Deserialize, Serialize};

/// A marketplace the sync engine can operate against.
///
/// Only the North American marketplaces are supported; they share one
/// regional API endpoint but differ in marketplace id and currency.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Marketplace {
    /// United States (ATVPDKIKX0DER).
    Us,
    /// Canada (A2EUQ1WTGCTBG2).
    Ca,
    /// Mexico (A1AM78C64UM0Y8).
    Mx,
}

impl Marketplace {
    /// The marketplace id used in API query parameters.
    pub fn id(&self) -> &'static str {
        match self {
            Marketplace::Us => "ATVPDKIKX0DER",
            Marketplace::Ca => "A2EUQ1WTGCTBG2",
            Marketplace::Mx => "A1AM78C64UM0Y8",
        }
    }

    /// Base URL of the regional API endpoint.
    pub fn endpoint(&self) -> &'static str {
        "https://sellingpartnerapi-na.amazon.com"
    }

    /// ISO currency code for listing prices in this marketplace.
    pub fn currency(&self) -> &'static str {
        match self {
            Marketplace::Us => "USD",
            Marketplace::Ca => "CAD",
            Marketplace::Mx => "MXN",
        }
    }

    /// Two-letter country code as reported by the sellers participation API.
    pub fn country_code(&self) -> &'static str {
        match self {
            Marketplace::Us => "US",
            Marketplace::Ca => "CA",
            Marketplace::Mx => "MX",
        }
    }
}

impl std::str::FromStr for Marketplace {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "us" => Ok(Marketplace::Us),
            "ca" => Ok(Marketplace::Ca),
            "mx" => Ok(Marketplace::Mx),
            other => Err(format!("unknown marketplace: {other}")),
        }
    }
}

impl std::fmt::Display for Marketplace {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let s = match self {
            Marketplace::Us => "us",
            Marketplace::Ca => "ca",
            Marketplace::Mx => "mx",
        };
        f.write_str(s)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn ids_match_marketplaces() {
        assert_eq!(Marketplace::Us.id(), "ATVPDKIKX0DER");
        assert_eq!(Marketplace::Ca.id(), "A2EUQ1WTGCTBG2");
        assert_eq!(Marketplace::Mx.id(), "A1AM78C64UM0Y8");
    }

    #[test]
    fn parse_is_case_insensitive() {
        assert_eq!("US".parse::<Marketplace>().unwrap(), Marketplace::Us);
        assert_eq!("mx".parse::<Marketplace>().unwrap(), Marketplace::Mx);
        assert!("gb".parse::<Marketplace>().is_err());
    }

    #[test]
    fn display_round_trips_through_parse() {
        for m in [Marketplace::Us, Marketplace::Ca, Marketplace::Mx] {
            assert_eq!(m.to_string().parse::<Marketplace>().unwrap(), m);
        }
    }
}

use serde::{Deserialize, Serialize};
use std::fmt;

/// ISO 4217 currencies accepted by the gateway
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum Currency {
    BGN,
    CHF,
    CZK,
    DKK,
    EUR,
    GBP,
    HRK,
    HUF,
    NOK,
    PLN,
    RON,
    RUB,
    SEK,
    UAH,
    USD,
}

impl Currency {
    /// All currencies the gateway accepts, in code order
    pub const ALL: [Currency; 15] = [
        Currency::BGN,
        Currency::CHF,
        Currency::CZK,
        Currency::DKK,
        Currency::EUR,
        Currency::GBP,
        Currency::HRK,
        Currency::HUF,
        Currency::NOK,
        Currency::PLN,
        Currency::RON,
        Currency::RUB,
        Currency::SEK,
        Currency::UAH,
        Currency::USD,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Currency::BGN => "BGN",
            Currency::CHF => "CHF",
            Currency::CZK => "CZK",
            Currency::DKK => "DKK",
            Currency::EUR => "EUR",
            Currency::GBP => "GBP",
            Currency::HRK => "HRK",
            Currency::HUF => "HUF",
            Currency::NOK => "NOK",
            Currency::PLN => "PLN",
            Currency::RON => "RON",
            Currency::RUB => "RUB",
            Currency::SEK => "SEK",
            Currency::UAH => "UAH",
            Currency::USD => "USD",
        }
    }
}

impl fmt::Display for Currency {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl std::str::FromStr for Currency {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_uppercase().as_str() {
            "BGN" => Ok(Currency::BGN),
            "CHF" => Ok(Currency::CHF),
            "CZK" => Ok(Currency::CZK),
            "DKK" => Ok(Currency::DKK),
            "EUR" => Ok(Currency::EUR),
            "GBP" => Ok(Currency::GBP),
            "HRK" => Ok(Currency::HRK),
            "HUF" => Ok(Currency::HUF),
            "NOK" => Ok(Currency::NOK),
            "PLN" => Ok(Currency::PLN),
            "RON" => Ok(Currency::RON),
            "RUB" => Ok(Currency::RUB),
            "SEK" => Ok(Currency::SEK),
            "UAH" => Ok(Currency::UAH),
            "USD" => Ok(Currency::USD),
            _ => Err(format!("Invalid currency: {}", s)),
        }
    }
}

impl TryFrom<&str> for Currency {
    type Error = String;

    fn try_from(s: &str) -> Result<Self, Self::Error> {
        s.parse()
    }
}

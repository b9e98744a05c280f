use serde::{Deserialize, Serialize};
use std::fmt;

/// Supported settlement currencies
///
/// All amounts in the ledger are pre-computed integer minor units; the
/// currency only determines how many minor-unit digits a display value has.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, sqlx::Type)]
#[sqlx(type_name = "VARCHAR(3)", rename_all = "UPPERCASE")]
#[serde(rename_all = "UPPERCASE")]
pub enum Currency {
    /// Ghanaian Cedi (pesewas, 2 minor digits)
    GHS,
    /// Nigerian Naira (kobo, 2 minor digits)
    NGN,
    /// Kenyan Shilling (cents, 2 minor digits)
    KES,
    /// US Dollar (cents, 2 minor digits)
    USD,
}

impl Currency {
    /// Number of minor-unit digits for this currency
    pub fn minor_digits(&self) -> u32 {
        match self {
            Currency::GHS | Currency::NGN | Currency::KES | Currency::USD => 2,
        }
    }

    /// Formats an integer minor-unit amount for display
    pub fn format_minor(&self, amount: i64) -> String {
        let divisor = 10i64.pow(self.minor_digits());
        // Sign is carried separately: `amount / divisor` truncates toward
        // zero, which would swallow it for amounts under one major unit.
        let sign = if amount < 0 { "-" } else { "" };
        let major = (amount / divisor).abs();
        let minor = (amount % divisor).abs();
        format!(
            "{} {}{}.{:0width$}",
            self,
            sign,
            major,
            minor,
            width = self.minor_digits() as usize
        )
    }
}

impl fmt::Display for Currency {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Currency::GHS => write!(f, "GHS"),
            Currency::NGN => write!(f, "NGN"),
            Currency::KES => write!(f, "KES"),
            Currency::USD => write!(f, "USD"),
        }
    }
}

impl std::str::FromStr for Currency {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_uppercase().as_str() {
            "GHS" => Ok(Currency::GHS),
            "NGN" => Ok(Currency::NGN),
            "KES" => Ok(Currency::KES),
            "USD" => Ok(Currency::USD),
            _ => Err(format!("Invalid currency: {}", s)),
        }
    }
}

impl TryFrom<String> for Currency {
    type Error = String;

    fn try_from(s: String) -> Result<Self, Self::Error> {
        s.parse()
    }
}

impl TryFrom<&str> for Currency {
    type Error = String;

    fn try_from(s: &str) -> Result<Self, Self::Error> {
        s.parse()
    }
}

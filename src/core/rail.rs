use serde::{Deserialize, Serialize};
use std::fmt;

/// Settlement channel for a payment
///
/// Invoices carry the subset of rails they accept (`allowed_payment_rails`);
/// consumers must treat that persisted array as an unordered set.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, sqlx::Type)]
#[sqlx(type_name = "VARCHAR(20)", rename_all = "SCREAMING_SNAKE_CASE")]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum PaymentRail {
    /// Mobile money
    Momo,
    BankTransfer,
    Card,
    /// Cash or other manually verified settlement
    Offline,
}

impl fmt::Display for PaymentRail {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PaymentRail::Momo => write!(f, "MOMO"),
            PaymentRail::BankTransfer => write!(f, "BANK_TRANSFER"),
            PaymentRail::Card => write!(f, "CARD"),
            PaymentRail::Offline => write!(f, "OFFLINE"),
        }
    }
}

impl std::str::FromStr for PaymentRail {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "MOMO" => Ok(PaymentRail::Momo),
            "BANK_TRANSFER" => Ok(PaymentRail::BankTransfer),
            "CARD" => Ok(PaymentRail::Card),
            "OFFLINE" => Ok(PaymentRail::Offline),
            _ => Err(format!("Invalid payment rail: {}", s)),
        }
    }
}

impl TryFrom<String> for PaymentRail {
    type Error = String;

    fn try_from(s: String) -> Result<Self, Self::Error> {
        s.parse()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::str::FromStr;

    #[test]
    fn test_rail_round_trip() {
        for rail in [
            PaymentRail::Momo,
            PaymentRail::BankTransfer,
            PaymentRail::Card,
            PaymentRail::Offline,
        ] {
            assert_eq!(PaymentRail::from_str(&rail.to_string()).unwrap(), rail);
        }
    }

    #[test]
    fn test_rail_serde_tokens() {
        assert_eq!(
            serde_json::to_string(&PaymentRail::BankTransfer).unwrap(),
            "\"BANK_TRANSFER\""
        );
        let rail: PaymentRail = serde_json::from_str("\"OFFLINE\"").unwrap();
        assert_eq!(rail, PaymentRail::Offline);
    }
}

//! Payment references
//!
//! A payment reference is the client- and gateway-visible identifier for a
//! single payment attempt. References take the form `<prefix>_<16-hex>`
//! where the prefix encodes the flow (standard, mobile money, test) so an
//! operator can read the origin of a payment straight off its reference.
//!
//! The random segment is a full 64-bit value drawn from the thread RNG,
//! which makes collisions negligible over the lifetime of the system; the
//! ledger additionally enforces uniqueness at insert time.

use rand::Rng;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use thiserror::Error;

/// The flow a reference was generated for
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ReferenceKind {
    /// Standard (card, bank transfer, USSD, QR) payments
    Standard,
    /// Mobile money charges
    MobileMoney,
    /// Test-mode payments
    Test,
}

impl ReferenceKind {
    /// Returns the reference prefix for this flow
    pub fn prefix(&self) -> &'static str {
        match self {
            ReferenceKind::Standard => "SIKA",
            ReferenceKind::MobileMoney => "SIKA_MOMO",
            ReferenceKind::Test => "SIKA_TEST",
        }
    }
}

/// Errors from parsing a reference string
#[derive(Debug, Error, PartialEq, Eq)]
pub enum ReferenceError {
    #[error("Malformed payment reference: {0}")]
    Malformed(String),
}

/// A validated payment reference
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct PaymentReference(String);

impl PaymentReference {
    /// Generates a fresh reference for the given flow
    pub fn generate(kind: ReferenceKind) -> Self {
        let random: u64 = rand::thread_rng().gen();
        Self(format!("{}_{:016X}", kind.prefix(), random))
    }

    /// Returns the reference as a string slice
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Returns the flow this reference was generated for, if recognizable
    pub fn kind(&self) -> Option<ReferenceKind> {
        // Longest prefix first: "SIKA" is a prefix of the other two
        for kind in [
            ReferenceKind::MobileMoney,
            ReferenceKind::Test,
            ReferenceKind::Standard,
        ] {
            if self.0.starts_with(kind.prefix()) {
                return Some(kind);
            }
        }
        None
    }
}

impl fmt::Display for PaymentReference {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl FromStr for PaymentReference {
    type Err = ReferenceError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let (prefix, random) = s
            .rsplit_once('_')
            .ok_or_else(|| ReferenceError::Malformed(s.to_string()))?;

        let known = [
            ReferenceKind::Standard,
            ReferenceKind::MobileMoney,
            ReferenceKind::Test,
        ]
        .iter()
        .any(|k| k.prefix() == prefix);

        if !known || random.len() != 16 || !random.chars().all(|c| c.is_ascii_hexdigit()) {
            return Err(ReferenceError::Malformed(s.to_string()));
        }

        Ok(Self(s.to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_generated_format() {
        let reference = PaymentReference::generate(ReferenceKind::Standard);
        let s = reference.as_str();
        assert!(s.starts_with("SIKA_"));
        let random = &s["SIKA_".len()..];
        assert_eq!(random.len(), 16);
        assert!(random.chars().all(|c| c.is_ascii_hexdigit()));
    }

    #[test]
    fn test_mobile_money_prefix() {
        let reference = PaymentReference::generate(ReferenceKind::MobileMoney);
        assert!(reference.as_str().starts_with("SIKA_MOMO_"));
        assert_eq!(reference.kind(), Some(ReferenceKind::MobileMoney));
    }

    #[test]
    fn test_round_trip() {
        let reference = PaymentReference::generate(ReferenceKind::Test);
        let parsed: PaymentReference = reference.as_str().parse().unwrap();
        assert_eq!(parsed, reference);
    }

    #[test]
    fn test_rejects_malformed() {
        assert!("SIKA".parse::<PaymentReference>().is_err());
        assert!("SIKA_short".parse::<PaymentReference>().is_err());
        assert!("OTHER_0123456789ABCDEF".parse::<PaymentReference>().is_err());
        assert!("SIKA_0123456789ABCDEG".parse::<PaymentReference>().is_err());
    }
}

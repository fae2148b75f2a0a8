//! Core Kernel - Foundational types for the payment platform
//!
//! This crate provides the fundamental building blocks used across all domain modules:
//! - Money types with precise decimal arithmetic and minor-unit conversion
//! - Strongly-typed identifiers and payment references
//! - Shared port traits for cross-domain capabilities

pub mod money;
pub mod identifiers;
pub mod reference;
pub mod ports;

pub use money::{Money, Currency, MoneyError};
pub use identifiers::{UserId, CollectionId, PaymentId, PaymentLogId};
pub use reference::{PaymentReference, ReferenceKind, ReferenceError};
pub use ports::{CollectionCreditPort, CreditError};

//! Gateway adapters
//!
//! Concrete implementations of [`crate::ports::GatewayPort`].

pub mod paystack;
pub mod signature;

pub use paystack::{PaystackConfig, PaystackGateway};

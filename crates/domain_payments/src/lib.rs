//! Payments Domain - Payment Lifecycle and Reconciliation
//!
//! This crate owns the payment lifecycle for the aggregator: it records
//! payments in an authoritative ledger, drives every status change through
//! a single validated transition path, and reconciles the two signal
//! sources (client verify-polls and gateway webhooks) into one consistent
//! outcome per payment reference.
//!
//! # Lifecycle
//!
//! ```text
//! PENDING ──► PROCESSING ──► SUCCESS
//!    │             │    └───► FAILED
//!    │             └────────► CANCELLED
//!    └──────────────────────► CANCELLED / SUCCESS / FAILED
//! ```
//!
//! SUCCESS, FAILED, and CANCELLED are terminal. A signal arriving after a
//! terminal state is an idempotent no-op: the same outcome again is a
//! duplicate, a different terminal outcome is a conflict that is logged and
//! never applied (first terminal wins).
//!
//! # Example
//!
//! ```rust,ignore
//! use domain_payments::{ReconciliationEngine, PaymentLedger};
//!
//! let engine = ReconciliationEngine::new(ledger, gateway, collections);
//! let initialized = engine.initialize_payment(request).await?;
//! // later: gateway calls back
//! engine.handle_webhook(&raw_body, Some(&signature)).await?;
//! ```

pub mod payment;
pub mod log;
pub mod ledger;
pub mod ports;
pub mod reconciliation;
pub mod adapters;
pub mod error;

pub use payment::{Payment, PaymentDraft, PaymentMethod, PaymentStatus, MobileMoneyProvider};
pub use log::{PaymentLog, LogLevel, AuditCondition};
pub use ledger::{
    PaymentLedger, PaymentStats, SignalSource, TransitionEvidence, TransitionOutcome,
};
pub use ports::{
    GatewayPort, GatewayError, GatewayStatus, InitializeRequest, InitializeResponse,
    MobileMoneyCharge, ChargeResponse, VerificationResponse,
};
pub use reconciliation::{
    ReconciliationEngine, InitiatePayment, InitializedPayment, MobileMoneyPayment,
    WebhookOutcome,
};
pub use error::{LedgerError, PaymentError};

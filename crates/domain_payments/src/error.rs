//! Payments domain errors

use thiserror::Error;

use crate::payment::PaymentStatus;
use crate::ports::GatewayError;

/// Errors from the payment ledger
#[derive(Debug, Error)]
pub enum LedgerError {
    /// No payment with the given reference
    #[error("Payment not found: {0}")]
    NotFound(String),

    /// A payment with this reference already exists
    ///
    /// With 64 bits of reference entropy this indicates a generator or
    /// ledger bug, so callers treat it as internal rather than retrying.
    #[error("Duplicate payment reference: {0}")]
    DuplicateReference(String),

    /// PENDING is an initial state only and can never be a transition target
    #[error("Invalid transition target: {0}")]
    InvalidTarget(PaymentStatus),
}

/// Errors surfaced by the reconciliation engine
#[derive(Debug, Error)]
pub enum PaymentError {
    /// Malformed or out-of-range input, rejected before touching the ledger
    #[error("Invalid request: {0}")]
    InvalidRequest(String),

    /// Unknown payment reference
    #[error("Payment not found: {0}")]
    NotFound(String),

    /// The gateway could not be reached; state is untouched and the call
    /// may be retried
    #[error("Payment gateway unavailable: {0}")]
    GatewayUnavailable(String),

    /// The gateway declined the request
    #[error("Payment gateway rejected the request: {0}")]
    GatewayRejected(String),

    /// Webhook signature verification failed; the event was dropped
    #[error("Invalid webhook signature")]
    InvalidSignature,

    /// Invariant violation inside the payments core
    #[error("Internal payment error: {0}")]
    Internal(String),
}

impl From<LedgerError> for PaymentError {
    fn from(err: LedgerError) -> Self {
        match err {
            LedgerError::NotFound(reference) => PaymentError::NotFound(reference),
            other => PaymentError::Internal(other.to_string()),
        }
    }
}

impl From<GatewayError> for PaymentError {
    fn from(err: GatewayError) -> Self {
        match err {
            GatewayError::Unavailable { message } => PaymentError::GatewayUnavailable(message),
            GatewayError::Rejected { message } => PaymentError::GatewayRejected(message),
            GatewayError::Malformed(message) => {
                PaymentError::Internal(format!("unexpected gateway response: {message}"))
            }
        }
    }
}

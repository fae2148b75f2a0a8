//! Gateway port
//!
//! The payments domain talks to the external payment gateway through the
//! [`GatewayPort`] trait. The production adapter lives in
//! [`crate::adapters::paystack`]; tests substitute a scripted mock. The
//! adapter is stateless, so one instance is shared across all concurrent
//! requests.
//!
//! All amounts crossing this boundary are integers in the currency's minor
//! unit (pesewas for GHS); conversion from the ledger's decimal amounts
//! happens at the call site via `Money::to_minor_units`.

use async_trait::async_trait;
use thiserror::Error;

use core_kernel::PaymentReference;

use crate::payment::MobileMoneyProvider;

/// Errors from gateway calls
///
/// Transport failures are deliberately collapsed into `Unavailable` so the
/// caller can choose a retry policy without inspecting I/O details; a
/// decline from the gateway itself is `Rejected`.
#[derive(Debug, Error)]
pub enum GatewayError {
    /// The gateway could not be reached (connect failure, timeout)
    #[error("Gateway unavailable: {message}")]
    Unavailable { message: String },

    /// The gateway answered and declined the request
    #[error("Gateway rejected the request: {message}")]
    Rejected { message: String },

    /// The gateway answered with a body we could not interpret
    #[error("Malformed gateway response: {0}")]
    Malformed(String),
}

impl GatewayError {
    /// Returns true if the call may succeed on retry
    pub fn is_transient(&self) -> bool {
        matches!(self, GatewayError::Unavailable { .. })
    }
}

/// Transaction status as reported by the gateway
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GatewayStatus {
    Success,
    Failed,
    Abandoned,
    Pending,
    Ongoing,
    Processing,
    Queued,
    /// A status code this client does not recognize
    Unknown,
}

impl GatewayStatus {
    /// Parses the gateway's status code
    pub fn from_code(code: &str) -> Self {
        match code {
            "success" => GatewayStatus::Success,
            "failed" => GatewayStatus::Failed,
            "abandoned" => GatewayStatus::Abandoned,
            "pending" => GatewayStatus::Pending,
            "ongoing" => GatewayStatus::Ongoing,
            "processing" => GatewayStatus::Processing,
            "queued" => GatewayStatus::Queued,
            _ => GatewayStatus::Unknown,
        }
    }
}

impl std::fmt::Display for GatewayStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let code = match self {
            GatewayStatus::Success => "success",
            GatewayStatus::Failed => "failed",
            GatewayStatus::Abandoned => "abandoned",
            GatewayStatus::Pending => "pending",
            GatewayStatus::Ongoing => "ongoing",
            GatewayStatus::Processing => "processing",
            GatewayStatus::Queued => "queued",
            GatewayStatus::Unknown => "unknown",
        };
        write!(f, "{code}")
    }
}

/// Request to open a hosted checkout transaction
#[derive(Debug, Clone)]
pub struct InitializeRequest {
    pub amount_minor: i64,
    pub email: String,
    pub reference: PaymentReference,
    pub callback_url: Option<String>,
}

/// A successfully initialized checkout transaction
#[derive(Debug, Clone)]
pub struct InitializeResponse {
    pub authorization_url: String,
    pub access_code: String,
}

/// Request to charge a mobile money wallet
#[derive(Debug, Clone)]
pub struct MobileMoneyCharge {
    pub amount_minor: i64,
    pub email: String,
    pub phone: String,
    pub provider: MobileMoneyProvider,
    pub reference: PaymentReference,
}

/// Outcome of submitting a charge
#[derive(Debug, Clone)]
pub struct ChargeResponse {
    pub status: GatewayStatus,
}

/// Gateway-side view of a transaction, from a verify call
#[derive(Debug, Clone)]
pub struct VerificationResponse {
    pub status: GatewayStatus,
    pub transaction_id: Option<String>,
    pub amount_minor: Option<i64>,
    pub currency: Option<String>,
}

/// Typed client for the external payment gateway
#[async_trait]
pub trait GatewayPort: Send + Sync + 'static {
    /// Opens a hosted checkout transaction for the reference
    async fn initialize(
        &self,
        request: InitializeRequest,
    ) -> Result<InitializeResponse, GatewayError>;

    /// Submits a mobile money charge
    async fn charge_mobile_money(
        &self,
        charge: MobileMoneyCharge,
    ) -> Result<ChargeResponse, GatewayError>;

    /// Asks the gateway for the current state of a transaction
    async fn verify(
        &self,
        reference: &PaymentReference,
    ) -> Result<VerificationResponse, GatewayError>;

    /// Checks the HMAC signature of a webhook delivery against the raw body
    ///
    /// Must be called before a webhook payload is trusted for anything.
    /// Implementations use a constant-time comparison.
    fn verify_webhook_signature(&self, raw_body: &[u8], signature: &str) -> bool;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_status_codes_round_trip() {
        for code in ["success", "failed", "abandoned", "pending", "ongoing", "processing", "queued"] {
            assert_eq!(GatewayStatus::from_code(code).to_string(), code);
        }
        assert_eq!(GatewayStatus::from_code("send_otp"), GatewayStatus::Unknown);
    }

    #[test]
    fn test_only_unavailable_is_transient() {
        assert!(GatewayError::Unavailable { message: "timeout".into() }.is_transient());
        assert!(!GatewayError::Rejected { message: "declined".into() }.is_transient());
        assert!(!GatewayError::Malformed("bad json".into()).is_transient());
    }
}

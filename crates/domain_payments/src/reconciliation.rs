//! Reconciliation engine
//!
//! The single state-transition authority for payments. Two signal paths
//! feed it: client-initiated verify-polls and gateway-initiated webhooks.
//! Both funnel into `PaymentLedger::apply_transition`, which linearizes
//! decisions per reference, so whichever path observes a terminal outcome
//! first wins and every later signal resolves to a logged no-op.
//!
//! Side effects follow the same discipline: a collection is credited only
//! on the one call that actually applied the SUCCESS transition, never on
//! a duplicate or conflicting signal.

use std::sync::Arc;

use rust_decimal::Decimal;
use serde::Deserialize;
use tracing::{debug, error, info, warn};

use core_kernel::{
    CollectionCreditPort, CollectionId, Currency, Money, PaymentReference, ReferenceKind, UserId,
};

use crate::error::{LedgerError, PaymentError};
use crate::ledger::{PaymentLedger, SignalSource, TransitionEvidence, TransitionOutcome};
use crate::log::{AuditCondition, LogLevel};
use crate::payment::{MobileMoneyProvider, Payment, PaymentDraft, PaymentMethod, PaymentStatus};
use crate::ports::{
    GatewayError, GatewayPort, GatewayStatus, InitializeRequest, MobileMoneyCharge,
};

/// The only currency the gateway settles in
const SETTLEMENT_CURRENCY: Currency = Currency::GHS;

/// Request to initialize a standard (checkout-page) payment
#[derive(Debug, Clone)]
pub struct InitiatePayment {
    pub user_id: UserId,
    pub amount: Decimal,
    pub email: String,
    pub method: PaymentMethod,
    pub callback_url: Option<String>,
    pub collection_id: Option<CollectionId>,
    pub description: Option<String>,
}

/// A created payment together with the gateway checkout handle
#[derive(Debug, Clone)]
pub struct InitializedPayment {
    pub payment: Payment,
    pub authorization_url: String,
    pub access_code: String,
}

/// Request to charge a mobile money wallet
#[derive(Debug, Clone)]
pub struct MobileMoneyPayment {
    pub user_id: UserId,
    pub amount: Decimal,
    pub phone: String,
    pub provider: MobileMoneyProvider,
    pub email: String,
    pub name: String,
    pub collection_id: Option<CollectionId>,
}

/// What a webhook delivery amounted to
#[derive(Debug, Clone)]
pub enum WebhookOutcome {
    /// The event moved the payment to a new status
    Applied { payment: Payment },
    /// The event re-reported an outcome already recorded
    Duplicate { payment: Payment },
    /// The event contradicted a recorded terminal outcome; preserved as-is
    Conflicting { payment: Payment },
    /// Unhandled event type or unknown reference; acknowledged and dropped
    Ignored,
}

/// Gateway webhook envelope
#[derive(Debug, Deserialize)]
struct WebhookEvent {
    event: String,
    data: WebhookData,
}

#[derive(Debug, Deserialize)]
struct WebhookData {
    reference: String,
    #[serde(default)]
    id: Option<serde_json::Value>,
}

impl WebhookData {
    fn transaction_id(&self) -> Option<String> {
        match &self.id {
            Some(serde_json::Value::String(s)) => Some(s.clone()),
            Some(serde_json::Value::Number(n)) => Some(n.to_string()),
            _ => None,
        }
    }
}

/// The payment lifecycle authority
///
/// Holds the ledger it owns, the gateway it delegates money movement to,
/// and the capability to credit collections on confirmed success.
pub struct ReconciliationEngine {
    ledger: Arc<PaymentLedger>,
    gateway: Arc<dyn GatewayPort>,
    collections: Arc<dyn CollectionCreditPort>,
}

impl ReconciliationEngine {
    pub fn new(
        ledger: Arc<PaymentLedger>,
        gateway: Arc<dyn GatewayPort>,
        collections: Arc<dyn CollectionCreditPort>,
    ) -> Self {
        Self {
            ledger,
            gateway,
            collections,
        }
    }

    /// Returns the ledger this engine writes to
    pub fn ledger(&self) -> &Arc<PaymentLedger> {
        &self.ledger
    }

    /// Creates a payment and opens a gateway checkout transaction
    ///
    /// The payment is recorded PENDING before the gateway is called, so a
    /// timed-out or rejected initialize leaves a retriable PENDING record
    /// rather than corrupted state.
    ///
    /// # Errors
    ///
    /// `InvalidRequest` for a non-positive amount or a mobile-money method
    /// (which must use [`Self::submit_mobile_money`]); `GatewayUnavailable`
    /// / `GatewayRejected` when the gateway call does not succeed.
    pub async fn initialize_payment(
        &self,
        request: InitiatePayment,
    ) -> Result<InitializedPayment, PaymentError> {
        if request.method == PaymentMethod::MobileMoney {
            return Err(PaymentError::InvalidRequest(
                "mobile money payments must use the mobile-money flow".into(),
            ));
        }
        let amount = self.validated_amount(request.amount)?;

        let reference = PaymentReference::generate(ReferenceKind::Standard);
        let mut draft = PaymentDraft::new(
            reference.clone(),
            request.user_id,
            amount,
            request.method,
            request.email.clone(),
        );
        if let Some(description) = request.description {
            draft = draft.with_description(description);
        }
        if let Some(collection_id) = request.collection_id {
            draft = draft.with_collection(collection_id);
        }
        let payment = self.ledger.create(draft).await?;

        let amount_minor = amount
            .to_minor_units()
            .map_err(|e| PaymentError::Internal(e.to_string()))?;

        match self
            .gateway
            .initialize(InitializeRequest {
                amount_minor,
                email: request.email,
                reference: reference.clone(),
                callback_url: request.callback_url,
            })
            .await
        {
            Ok(init) => {
                info!(reference = %reference, "checkout transaction opened");
                Ok(InitializedPayment {
                    payment,
                    authorization_url: init.authorization_url,
                    access_code: init.access_code,
                })
            }
            Err(GatewayError::Rejected { message }) => {
                // The payment stays PENDING; the caller may retry or the
                // operator may reconcile it later via verify.
                let _ = self
                    .ledger
                    .append_audit(
                        &reference,
                        LogLevel::Warning,
                        None,
                        format!("gateway rejected initialize: {message}"),
                    )
                    .await;
                warn!(reference = %reference, %message, "gateway rejected initialize");
                Err(PaymentError::GatewayRejected(message))
            }
            Err(e) => {
                warn!(reference = %reference, error = %e, "initialize did not reach the gateway");
                Err(e.into())
            }
        }
    }

    /// Creates a mobile money payment and submits the charge
    ///
    /// The payment is created PENDING and moves to PROCESSING once the
    /// gateway accepts the charge; an unreachable gateway leaves PENDING, a
    /// decline records FAILED.
    pub async fn submit_mobile_money(
        &self,
        request: MobileMoneyPayment,
    ) -> Result<Payment, PaymentError> {
        let amount = self.validated_amount(request.amount)?;
        if request.phone.trim().is_empty() {
            return Err(PaymentError::InvalidRequest(
                "mobile money phone number is required".into(),
            ));
        }

        let reference = PaymentReference::generate(ReferenceKind::MobileMoney);
        let mut draft = PaymentDraft::new(
            reference.clone(),
            request.user_id,
            amount,
            PaymentMethod::MobileMoney,
            request.email.clone(),
        )
        .with_customer_name(request.name)
        .with_mobile_money(request.provider, request.phone.clone());
        if let Some(collection_id) = request.collection_id {
            draft = draft.with_collection(collection_id);
        }
        self.ledger.create(draft).await?;

        let amount_minor = amount
            .to_minor_units()
            .map_err(|e| PaymentError::Internal(e.to_string()))?;

        match self
            .gateway
            .charge_mobile_money(MobileMoneyCharge {
                amount_minor,
                email: request.email,
                phone: request.phone,
                provider: request.provider,
                reference: reference.clone(),
            })
            .await
        {
            Ok(response) => {
                let target = if response.status == GatewayStatus::Failed {
                    PaymentStatus::Failed
                } else {
                    PaymentStatus::Processing
                };
                let evidence = TransitionEvidence::new(SignalSource::Initiation)
                    .with_detail(format!("charge submitted, gateway status {}", response.status));
                let outcome = self
                    .ledger
                    .apply_transition(&reference, target, evidence)
                    .await?;
                Ok(outcome.into_payment())
            }
            Err(GatewayError::Rejected { message }) => {
                let evidence = TransitionEvidence::new(SignalSource::Initiation)
                    .with_detail(format!("gateway rejected charge: {message}"));
                self.ledger
                    .apply_transition(&reference, PaymentStatus::Failed, evidence)
                    .await?;
                warn!(reference = %reference, %message, "mobile money charge rejected");
                Err(PaymentError::GatewayRejected(message))
            }
            Err(e) => {
                warn!(reference = %reference, error = %e, "mobile money charge did not reach the gateway");
                Err(e.into())
            }
        }
    }

    /// Verify-poll path: reconciles a payment against the gateway's view
    ///
    /// # Errors
    ///
    /// `NotFound` for an unknown reference; `GatewayUnavailable` when the
    /// gateway cannot be reached (state untouched, safe to retry).
    pub async fn verify(&self, reference: &PaymentReference) -> Result<Payment, PaymentError> {
        let payment = self.ledger.get(reference).await?;

        let verification = match self.gateway.verify(reference).await {
            Ok(v) => v,
            Err(GatewayError::Rejected { message }) => {
                // The gateway has no record (yet); nothing to reconcile.
                debug!(reference = %reference, %message, "gateway has no transaction for reference");
                return Ok(payment);
            }
            Err(e) => return Err(e.into()),
        };

        let Some(target) = map_gateway_status(verification.status) else {
            debug!(reference = %reference, status = %verification.status, "unmapped gateway status, no transition");
            return Ok(payment);
        };

        let evidence = TransitionEvidence::new(SignalSource::VerifyPoll)
            .with_optional_transaction_id(verification.transaction_id);
        let outcome = self
            .ledger
            .apply_transition(reference, target, evidence)
            .await?;
        self.settle_side_effects(&outcome).await;
        Ok(outcome.into_payment())
    }

    /// Webhook path: authenticates and applies a gateway event
    ///
    /// The signature is verified against the raw body before the payload is
    /// trusted for anything; a failed check drops the event without any
    /// state change and records an audit entry when the body still names a
    /// payment we know.
    pub async fn handle_webhook(
        &self,
        raw_body: &[u8],
        signature: Option<&str>,
    ) -> Result<WebhookOutcome, PaymentError> {
        let authentic = signature
            .map(|s| self.gateway.verify_webhook_signature(raw_body, s))
            .unwrap_or(false);
        if !authentic {
            warn!("webhook rejected: missing or invalid signature");
            if let Some(reference) = extract_reference(raw_body) {
                let _ = self
                    .ledger
                    .append_audit(
                        &reference,
                        LogLevel::Warning,
                        Some(AuditCondition::InvalidSignature),
                        "webhook rejected: signature verification failed",
                    )
                    .await;
            }
            return Err(PaymentError::InvalidSignature);
        }

        let event: WebhookEvent = serde_json::from_slice(raw_body)
            .map_err(|e| PaymentError::InvalidRequest(format!("malformed webhook payload: {e}")))?;

        let target = match event.event.as_str() {
            "charge.success" => PaymentStatus::Success,
            "charge.failed" => PaymentStatus::Failed,
            other => {
                debug!(event = other, "ignoring unhandled webhook event");
                return Ok(WebhookOutcome::Ignored);
            }
        };

        let reference: PaymentReference = match event.data.reference.parse() {
            Ok(r) => r,
            Err(_) => {
                warn!(reference = %event.data.reference, "webhook carries an unparseable reference");
                return Ok(WebhookOutcome::Ignored);
            }
        };

        let evidence = TransitionEvidence::new(SignalSource::Webhook)
            .with_optional_transaction_id(event.data.transaction_id());
        let outcome = match self
            .ledger
            .apply_transition(&reference, target, evidence)
            .await
        {
            Ok(outcome) => outcome,
            Err(LedgerError::NotFound(_)) => {
                warn!(reference = %reference, event = %event.event, "webhook for unknown payment reference");
                return Ok(WebhookOutcome::Ignored);
            }
            Err(e) => return Err(e.into()),
        };
        self.settle_side_effects(&outcome).await;

        Ok(match outcome {
            TransitionOutcome::Applied { payment, .. } => WebhookOutcome::Applied { payment },
            TransitionOutcome::Conflicting { payment, .. } => {
                WebhookOutcome::Conflicting { payment }
            }
            TransitionOutcome::Duplicate { payment }
            | TransitionOutcome::Unchanged { payment } => WebhookOutcome::Duplicate { payment },
        })
    }

    fn validated_amount(&self, amount: Decimal) -> Result<Money, PaymentError> {
        let money = Money::new(amount, SETTLEMENT_CURRENCY);
        if !money.is_positive() {
            return Err(PaymentError::InvalidRequest(
                "amount must be a positive value".into(),
            ));
        }
        Ok(money)
    }

    /// Runs post-transition side effects
    ///
    /// Only an `Applied` transition into SUCCESS credits the linked
    /// collection; duplicates and conflicts never reach this branch, which
    /// is what makes the credit exactly-once.
    async fn settle_side_effects(&self, outcome: &TransitionOutcome) {
        let TransitionOutcome::Applied { payment, .. } = outcome else {
            return;
        };
        if payment.status != PaymentStatus::Success {
            return;
        }
        let Some(collection_id) = payment.collection_id else {
            return;
        };

        match self
            .collections
            .apply_credit(collection_id, payment.amount)
            .await
        {
            Ok(new_total) => {
                info!(
                    reference = %payment.reference,
                    collection = %collection_id,
                    amount = %payment.amount,
                    total = %new_total,
                    "collection credited"
                );
            }
            Err(e) => {
                // The payment stands; the discrepancy goes to the audit
                // trail for manual reconciliation.
                error!(
                    reference = %payment.reference,
                    collection = %collection_id,
                    error = %e,
                    "collection credit failed after successful payment"
                );
                let _ = self
                    .ledger
                    .append_audit(
                        &payment.reference,
                        LogLevel::Error,
                        None,
                        format!("collection credit failed: {e}"),
                    )
                    .await;
            }
        }
    }
}

/// Maps the gateway's transaction status onto the local state machine
fn map_gateway_status(status: GatewayStatus) -> Option<PaymentStatus> {
    match status {
        GatewayStatus::Success => Some(PaymentStatus::Success),
        GatewayStatus::Failed => Some(PaymentStatus::Failed),
        GatewayStatus::Abandoned => Some(PaymentStatus::Cancelled),
        GatewayStatus::Pending
        | GatewayStatus::Ongoing
        | GatewayStatus::Processing
        | GatewayStatus::Queued => Some(PaymentStatus::Processing),
        GatewayStatus::Unknown => None,
    }
}

/// Best-effort reference extraction for audit attribution of rejected
/// webhooks; the payload is not trusted for anything else.
fn extract_reference(raw_body: &[u8]) -> Option<PaymentReference> {
    let value: serde_json::Value = serde_json::from_slice(raw_body).ok()?;
    value.get("data")?.get("reference")?.as_str()?.parse().ok()
}

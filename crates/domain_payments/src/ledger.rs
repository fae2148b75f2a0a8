//! Payment ledger
//!
//! The authoritative record of payments and their audit trail. The ledger
//! enforces the status state machine at its single mutation point,
//! [`PaymentLedger::apply_transition`], and serializes all writes to one
//! payment behind a per-reference mutex so that concurrent verify-polls and
//! webhook deliveries cannot interleave their read-decide-write sequences.
//!
//! # Invariants
//!
//! - A reference is inserted at most once and never reused
//! - Status changes are monotonic; terminal states are never left
//! - `processed_at` is set exactly when a terminal state is entered
//! - Every decision (including rejected duplicates/conflicts) appends an
//!   audit entry; entries are never updated or deleted

use std::collections::HashMap;
use std::sync::Arc;

use chrono::Utc;
use rust_decimal::Decimal;
use serde::Serialize;
use tokio::sync::{Mutex, RwLock};
use tracing::{debug, info, warn};

use core_kernel::PaymentReference;

use crate::error::LedgerError;
use crate::log::{AuditCondition, LogLevel, PaymentLog};
use crate::payment::{Payment, PaymentDraft, PaymentStatus};

/// Where a transition signal came from
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum SignalSource {
    /// The initiation flow itself (create / charge submission)
    Initiation,
    /// A client-initiated verify-poll against the gateway
    VerifyPoll,
    /// A gateway-initiated webhook delivery
    Webhook,
}

impl SignalSource {
    pub fn code(&self) -> &'static str {
        match self {
            SignalSource::Initiation => "initiation",
            SignalSource::VerifyPoll => "verify_poll",
            SignalSource::Webhook => "webhook",
        }
    }
}

/// Evidence accompanying a transition request
#[derive(Debug, Clone)]
pub struct TransitionEvidence {
    pub source: SignalSource,
    pub gateway_transaction_id: Option<String>,
    pub detail: Option<String>,
}

impl TransitionEvidence {
    pub fn new(source: SignalSource) -> Self {
        Self {
            source,
            gateway_transaction_id: None,
            detail: None,
        }
    }

    pub fn with_transaction_id(mut self, id: impl Into<String>) -> Self {
        self.gateway_transaction_id = Some(id.into());
        self
    }

    pub fn with_optional_transaction_id(mut self, id: Option<String>) -> Self {
        self.gateway_transaction_id = id;
        self
    }

    pub fn with_detail(mut self, detail: impl Into<String>) -> Self {
        self.detail = Some(detail.into());
        self
    }
}

/// Result of asking the ledger to apply a transition
///
/// Only `Applied` represents a state change; the other variants are
/// idempotent no-ops that still succeed, so signal deliverers (webhooks in
/// particular) can always be acknowledged.
#[derive(Debug, Clone)]
pub enum TransitionOutcome {
    /// The transition was valid and has been committed
    Applied {
        payment: Payment,
        previous: PaymentStatus,
    },
    /// The payment was already in the requested non-terminal state
    Unchanged { payment: Payment },
    /// The payment is terminal and the signal re-reported the recorded
    /// outcome (or a stale in-flight one); logged as a duplicate
    Duplicate { payment: Payment },
    /// The payment is terminal and the signal reported a different terminal
    /// outcome; the recorded outcome is preserved and the conflict logged
    Conflicting {
        payment: Payment,
        rejected: PaymentStatus,
    },
}

impl TransitionOutcome {
    /// Returns the payment as recorded after the call
    pub fn payment(&self) -> &Payment {
        match self {
            TransitionOutcome::Applied { payment, .. }
            | TransitionOutcome::Unchanged { payment }
            | TransitionOutcome::Duplicate { payment }
            | TransitionOutcome::Conflicting { payment, .. } => payment,
        }
    }

    /// Consumes the outcome, returning the recorded payment
    pub fn into_payment(self) -> Payment {
        match self {
            TransitionOutcome::Applied { payment, .. }
            | TransitionOutcome::Unchanged { payment }
            | TransitionOutcome::Duplicate { payment }
            | TransitionOutcome::Conflicting { payment, .. } => payment,
        }
    }

    /// Returns true if the call changed the payment's status
    pub fn changed(&self) -> bool {
        matches!(self, TransitionOutcome::Applied { .. })
    }
}

/// Aggregate, read-only view over the ledger
#[derive(Debug, Clone, Serialize)]
pub struct PaymentStats {
    pub total_payments: u64,
    pub successful_payments: u64,
    pub failed_payments: u64,
    pub total_revenue: Decimal,
    pub success_rate: f64,
}

/// A payment plus its append-only audit trail, guarded as one unit
#[derive(Debug)]
struct PaymentRecord {
    payment: Payment,
    logs: Vec<PaymentLog>,
}

/// The authoritative payment store
///
/// The outer map is only held long enough to resolve a reference to its
/// record; every decision about a payment happens under that record's own
/// mutex, which is the explicit transaction boundary for the
/// read-decide-write sequence.
#[derive(Debug, Default)]
pub struct PaymentLedger {
    records: RwLock<HashMap<String, Arc<Mutex<PaymentRecord>>>>,
}

impl PaymentLedger {
    /// Creates an empty ledger
    pub fn new() -> Self {
        Self::default()
    }

    /// Persists a new payment in its initial PENDING status
    ///
    /// # Errors
    ///
    /// Returns `LedgerError::DuplicateReference` if the reference already
    /// exists. The generator makes this effectively impossible, so a hit
    /// indicates a bug rather than a retriable condition.
    pub async fn create(&self, draft: PaymentDraft) -> Result<Payment, LedgerError> {
        let reference = draft.reference.clone();
        let payment = Payment::from_draft(draft);

        let mut records = self.records.write().await;
        if records.contains_key(reference.as_str()) {
            return Err(LedgerError::DuplicateReference(reference.to_string()));
        }

        let entry = PaymentLog::info(
            reference.clone(),
            format!(
                "payment created: {} {} via {}",
                payment.amount,
                payment.status,
                payment.method.code()
            ),
        );
        records.insert(
            reference.as_str().to_string(),
            Arc::new(Mutex::new(PaymentRecord {
                payment: payment.clone(),
                logs: vec![entry],
            })),
        );
        drop(records);

        info!(reference = %reference, amount = %payment.amount, method = payment.method.code(), "payment created");
        Ok(payment)
    }

    /// Returns the payment for a reference
    pub async fn get(&self, reference: &PaymentReference) -> Result<Payment, LedgerError> {
        let record = self.record(reference).await?;
        let guard = record.lock().await;
        Ok(guard.payment.clone())
    }

    /// Applies a status transition - the only sanctioned mutation path
    ///
    /// The whole read-decide-write sequence runs under the payment's own
    /// mutex. Duplicate and conflicting signals against a terminal payment
    /// succeed as no-ops and are recorded as audit entries.
    pub async fn apply_transition(
        &self,
        reference: &PaymentReference,
        target: PaymentStatus,
        evidence: TransitionEvidence,
    ) -> Result<TransitionOutcome, LedgerError> {
        if target == PaymentStatus::Pending {
            return Err(LedgerError::InvalidTarget(target));
        }

        let record = self.record(reference).await?;
        let mut guard = record.lock().await;
        let current = guard.payment.status;

        if current.is_terminal() {
            if target == current || !target.is_terminal() {
                let entry = PaymentLog::warning(
                    reference.clone(),
                    format!(
                        "duplicate {} signal for {} payment ignored",
                        evidence.source.code(),
                        current
                    ),
                )
                .with_condition(AuditCondition::DuplicateSignal);
                guard.logs.push(entry);

                debug!(reference = %reference, status = %current, source = evidence.source.code(), "duplicate signal");
                return Ok(TransitionOutcome::Duplicate {
                    payment: guard.payment.clone(),
                });
            }

            // Conflicting terminal outcome: first terminal wins, never
            // retracted automatically. Preserve and flag for review.
            let entry = PaymentLog::error(
                reference.clone(),
                format!(
                    "conflicting {} signal: recorded {} but gateway reported {}",
                    evidence.source.code(),
                    current,
                    target
                ),
            )
            .with_condition(AuditCondition::ConflictingSignal)
            .with_metadata(serde_json::json!({
                "recorded": current.code(),
                "rejected": target.code(),
                "source": evidence.source.code(),
            }));
            guard.logs.push(entry);

            warn!(reference = %reference, recorded = %current, rejected = %target, source = evidence.source.code(), "conflicting terminal signal preserved");
            return Ok(TransitionOutcome::Conflicting {
                payment: guard.payment.clone(),
                rejected: target,
            });
        }

        if !current.can_transition_to(target) {
            // Non-terminal and not a move: the same in-flight state was
            // re-observed (e.g. a verify-poll while still processing)
            debug!(reference = %reference, status = %current, "state re-observed, no change");
            return Ok(TransitionOutcome::Unchanged {
                payment: guard.payment.clone(),
            });
        }

        let previous = current;
        let now = Utc::now();
        guard.payment.status = target;
        guard.payment.updated_at = now;
        if target.is_terminal() {
            guard.payment.processed_at = Some(now);
        }
        if let Some(transaction_id) = evidence.gateway_transaction_id {
            guard.payment.gateway_transaction_id = Some(transaction_id);
        }

        let mut message = format!(
            "status {} -> {} via {}",
            previous,
            target,
            evidence.source.code()
        );
        if let Some(detail) = &evidence.detail {
            message.push_str(": ");
            message.push_str(detail);
        }
        guard.logs.push(PaymentLog::info(reference.clone(), message));

        info!(reference = %reference, from = %previous, to = %target, source = evidence.source.code(), "payment status transition");
        Ok(TransitionOutcome::Applied {
            payment: guard.payment.clone(),
            previous,
        })
    }

    /// Appends an audit-only entry without touching payment state
    pub async fn append_audit(
        &self,
        reference: &PaymentReference,
        level: LogLevel,
        condition: Option<AuditCondition>,
        message: impl Into<String>,
    ) -> Result<(), LedgerError> {
        let record = self.record(reference).await?;
        let mut guard = record.lock().await;
        let mut entry = PaymentLog::new(reference.clone(), level, message);
        if let Some(condition) = condition {
            entry = entry.with_condition(condition);
        }
        guard.logs.push(entry);
        Ok(())
    }

    /// Returns the audit trail for a payment, oldest first
    pub async fn logs(&self, reference: &PaymentReference) -> Result<Vec<PaymentLog>, LedgerError> {
        let record = self.record(reference).await?;
        let guard = record.lock().await;
        Ok(guard.logs.clone())
    }

    /// Returns all payments, oldest first
    pub async fn list(&self) -> Vec<Payment> {
        let records: Vec<_> = {
            let map = self.records.read().await;
            map.values().cloned().collect()
        };

        let mut payments = Vec::with_capacity(records.len());
        for record in records {
            payments.push(record.lock().await.payment.clone());
        }
        payments.sort_by_key(|p| p.created_at);
        payments
    }

    /// Derives aggregate statistics from the ledger
    pub async fn stats(&self) -> PaymentStats {
        let payments = self.list().await;

        let total = payments.len() as u64;
        let mut successful = 0u64;
        let mut failed = 0u64;
        let mut revenue = Decimal::ZERO;

        for payment in &payments {
            match payment.status {
                PaymentStatus::Success => {
                    successful += 1;
                    revenue += payment.amount.amount();
                }
                PaymentStatus::Failed => failed += 1,
                _ => {}
            }
        }

        let success_rate = if total > 0 {
            successful as f64 / total as f64 * 100.0
        } else {
            0.0
        };

        PaymentStats {
            total_payments: total,
            successful_payments: successful,
            failed_payments: failed,
            total_revenue: revenue,
            success_rate,
        }
    }

    async fn record(
        &self,
        reference: &PaymentReference,
    ) -> Result<Arc<Mutex<PaymentRecord>>, LedgerError> {
        let records = self.records.read().await;
        records
            .get(reference.as_str())
            .cloned()
            .ok_or_else(|| LedgerError::NotFound(reference.to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use core_kernel::{Currency, Money, ReferenceKind, UserId};
    use crate::payment::PaymentMethod;
    use rust_decimal_macros::dec;

    fn draft(reference: PaymentReference) -> PaymentDraft {
        PaymentDraft::new(
            reference,
            UserId::new(),
            Money::new(dec!(25.00), Currency::GHS),
            PaymentMethod::Card,
            "ama@example.com",
        )
    }

    #[tokio::test]
    async fn test_create_and_get() {
        let ledger = PaymentLedger::new();
        let reference = PaymentReference::generate(ReferenceKind::Standard);
        let created = ledger.create(draft(reference.clone())).await.unwrap();
        let fetched = ledger.get(&reference).await.unwrap();
        assert_eq!(created.id, fetched.id);
        assert_eq!(fetched.status, PaymentStatus::Pending);
    }

    #[tokio::test]
    async fn test_duplicate_reference_rejected() {
        let ledger = PaymentLedger::new();
        let reference = PaymentReference::generate(ReferenceKind::Standard);
        ledger.create(draft(reference.clone())).await.unwrap();
        let result = ledger.create(draft(reference)).await;
        assert!(matches!(result, Err(LedgerError::DuplicateReference(_))));
    }

    #[tokio::test]
    async fn test_pending_is_never_a_target() {
        let ledger = PaymentLedger::new();
        let reference = PaymentReference::generate(ReferenceKind::Standard);
        ledger.create(draft(reference.clone())).await.unwrap();
        let result = ledger
            .apply_transition(
                &reference,
                PaymentStatus::Pending,
                TransitionEvidence::new(SignalSource::VerifyPoll),
            )
            .await;
        assert!(matches!(result, Err(LedgerError::InvalidTarget(_))));
    }

    #[tokio::test]
    async fn test_applied_transition_stamps_processed_at() {
        let ledger = PaymentLedger::new();
        let reference = PaymentReference::generate(ReferenceKind::Standard);
        ledger.create(draft(reference.clone())).await.unwrap();

        let outcome = ledger
            .apply_transition(
                &reference,
                PaymentStatus::Success,
                TransitionEvidence::new(SignalSource::Webhook).with_transaction_id("12345"),
            )
            .await
            .unwrap();

        let payment = outcome.into_payment();
        assert_eq!(payment.status, PaymentStatus::Success);
        assert!(payment.processed_at.is_some());
        assert_eq!(payment.gateway_transaction_id.as_deref(), Some("12345"));
    }

    #[tokio::test]
    async fn test_duplicate_terminal_signal_is_noop() {
        let ledger = PaymentLedger::new();
        let reference = PaymentReference::generate(ReferenceKind::Standard);
        ledger.create(draft(reference.clone())).await.unwrap();

        ledger
            .apply_transition(
                &reference,
                PaymentStatus::Success,
                TransitionEvidence::new(SignalSource::Webhook),
            )
            .await
            .unwrap();
        let first = ledger.get(&reference).await.unwrap();

        let outcome = ledger
            .apply_transition(
                &reference,
                PaymentStatus::Success,
                TransitionEvidence::new(SignalSource::Webhook),
            )
            .await
            .unwrap();
        assert!(matches!(outcome, TransitionOutcome::Duplicate { .. }));

        let second = ledger.get(&reference).await.unwrap();
        assert_eq!(second.processed_at, first.processed_at);

        let logs = ledger.logs(&reference).await.unwrap();
        assert!(logs
            .iter()
            .any(|l| l.condition == Some(AuditCondition::DuplicateSignal)));
    }

    #[tokio::test]
    async fn test_conflicting_terminal_signal_preserved() {
        let ledger = PaymentLedger::new();
        let reference = PaymentReference::generate(ReferenceKind::Standard);
        ledger.create(draft(reference.clone())).await.unwrap();

        ledger
            .apply_transition(
                &reference,
                PaymentStatus::Success,
                TransitionEvidence::new(SignalSource::Webhook),
            )
            .await
            .unwrap();

        let outcome = ledger
            .apply_transition(
                &reference,
                PaymentStatus::Failed,
                TransitionEvidence::new(SignalSource::VerifyPoll),
            )
            .await
            .unwrap();
        assert!(matches!(
            outcome,
            TransitionOutcome::Conflicting {
                rejected: PaymentStatus::Failed,
                ..
            }
        ));

        let payment = ledger.get(&reference).await.unwrap();
        assert_eq!(payment.status, PaymentStatus::Success);

        let logs = ledger.logs(&reference).await.unwrap();
        assert!(logs
            .iter()
            .any(|l| l.condition == Some(AuditCondition::ConflictingSignal)));
    }

    #[tokio::test]
    async fn test_stale_in_flight_signal_after_terminal_is_duplicate() {
        let ledger = PaymentLedger::new();
        let reference = PaymentReference::generate(ReferenceKind::Standard);
        ledger.create(draft(reference.clone())).await.unwrap();

        ledger
            .apply_transition(
                &reference,
                PaymentStatus::Success,
                TransitionEvidence::new(SignalSource::Webhook),
            )
            .await
            .unwrap();

        let outcome = ledger
            .apply_transition(
                &reference,
                PaymentStatus::Processing,
                TransitionEvidence::new(SignalSource::VerifyPoll),
            )
            .await
            .unwrap();
        assert!(matches!(outcome, TransitionOutcome::Duplicate { .. }));
        assert_eq!(
            ledger.get(&reference).await.unwrap().status,
            PaymentStatus::Success
        );
    }

    #[tokio::test]
    async fn test_stats() {
        let ledger = PaymentLedger::new();
        for status in [
            PaymentStatus::Success,
            PaymentStatus::Success,
            PaymentStatus::Failed,
        ] {
            let reference = PaymentReference::generate(ReferenceKind::Standard);
            ledger.create(draft(reference.clone())).await.unwrap();
            ledger
                .apply_transition(
                    &reference,
                    status,
                    TransitionEvidence::new(SignalSource::Webhook),
                )
                .await
                .unwrap();
        }
        // One left pending
        let reference = PaymentReference::generate(ReferenceKind::Standard);
        ledger.create(draft(reference)).await.unwrap();

        let stats = ledger.stats().await;
        assert_eq!(stats.total_payments, 4);
        assert_eq!(stats.successful_payments, 2);
        assert_eq!(stats.failed_payments, 1);
        assert_eq!(stats.total_revenue, dec!(50.00));
        assert!((stats.success_rate - 50.0).abs() < f64::EPSILON);
    }
}

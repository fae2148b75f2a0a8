//! Append-only payment audit trail
//!
//! Every status decision leaves a `PaymentLog` entry behind, so the full
//! history of a payment (including duplicate and conflicting gateway
//! signals) can be reconstructed after the fact. Entries are write-once.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use core_kernel::{PaymentLogId, PaymentReference};

/// Severity of a log entry
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum LogLevel {
    Info,
    Warning,
    Error,
}

/// Notable audit conditions recorded for operational review
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AuditCondition {
    /// A terminal outcome was reported again after it had been recorded
    DuplicateSignal,
    /// A different terminal outcome arrived after one was already recorded
    ConflictingSignal,
    /// A webhook failed signature verification
    InvalidSignature,
}

/// An immutable audit entry tied to a payment
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PaymentLog {
    pub id: PaymentLogId,
    pub reference: PaymentReference,
    pub level: LogLevel,
    pub message: String,
    pub condition: Option<AuditCondition>,
    pub metadata: Option<serde_json::Value>,
    pub created_at: DateTime<Utc>,
}

impl PaymentLog {
    /// Creates an entry at the given level
    pub fn new(reference: PaymentReference, level: LogLevel, message: impl Into<String>) -> Self {
        Self {
            id: PaymentLogId::new_v7(),
            reference,
            level,
            message: message.into(),
            condition: None,
            metadata: None,
            created_at: Utc::now(),
        }
    }

    /// Creates an Info entry
    pub fn info(reference: PaymentReference, message: impl Into<String>) -> Self {
        Self::new(reference, LogLevel::Info, message)
    }

    /// Creates a Warning entry
    pub fn warning(reference: PaymentReference, message: impl Into<String>) -> Self {
        Self::new(reference, LogLevel::Warning, message)
    }

    /// Creates an Error entry
    pub fn error(reference: PaymentReference, message: impl Into<String>) -> Self {
        Self::new(reference, LogLevel::Error, message)
    }

    /// Tags the entry with an audit condition
    pub fn with_condition(mut self, condition: AuditCondition) -> Self {
        self.condition = Some(condition);
        self
    }

    /// Attaches structured metadata
    pub fn with_metadata(mut self, metadata: serde_json::Value) -> Self {
        self.metadata = Some(metadata);
        self
    }
}

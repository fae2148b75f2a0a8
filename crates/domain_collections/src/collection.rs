//! Collection entity

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use core_kernel::{CollectionId, Currency, Money, UserId};

/// Collection lifecycle status
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CollectionStatus {
    Active,
    Completed,
    Cancelled,
}

/// A contribution pot
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Collection {
    pub id: CollectionId,
    pub title: String,
    pub description: Option<String>,
    /// Goal for the pot; purely informational, credits are not capped by it
    pub target_amount: Option<Money>,
    /// Running total; only ever incremented by confirmed payments
    pub current_amount: Money,
    pub status: CollectionStatus,
    pub is_public: bool,
    pub created_by: UserId,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Collection {
    /// Creates an active collection with a zero running total
    pub fn new(draft: CollectionDraft) -> Self {
        let now = Utc::now();

        Self {
            id: CollectionId::new_v7(),
            title: draft.title,
            description: draft.description,
            target_amount: draft.target_amount,
            current_amount: Money::zero(draft.currency),
            status: CollectionStatus::Active,
            is_public: draft.is_public,
            created_by: draft.created_by,
            created_at: now,
            updated_at: now,
        }
    }

    /// Returns true if the running total has reached the target
    pub fn target_reached(&self) -> bool {
        match self.target_amount {
            Some(target) => self.current_amount.amount() >= target.amount(),
            None => false,
        }
    }
}

/// The fields a caller supplies when creating a collection
#[derive(Debug, Clone)]
pub struct CollectionDraft {
    pub title: String,
    pub description: Option<String>,
    pub target_amount: Option<Money>,
    pub currency: Currency,
    pub is_public: bool,
    pub created_by: UserId,
}

impl CollectionDraft {
    pub fn new(
        title: impl Into<String>,
        currency: Currency,
        created_by: UserId,
    ) -> Self {
        Self {
            title: title.into(),
            description: None,
            target_amount: None,
            currency,
            is_public: true,
            created_by,
        }
    }

    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }

    pub fn with_target(mut self, target: Money) -> Self {
        self.target_amount = Some(target);
        self
    }

    pub fn private(mut self) -> Self {
        self.is_public = false;
        self
    }
}

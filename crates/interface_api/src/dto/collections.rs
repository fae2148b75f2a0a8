//! Collection DTOs

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use validator::Validate;

use core_kernel::{CollectionId, UserId};
use domain_collections::{Collection, CollectionStatus};

#[derive(Debug, Deserialize, Validate)]
pub struct CreateCollectionRequest {
    #[validate(length(min = 1, max = 200))]
    pub title: String,
    #[validate(length(max = 2000))]
    pub description: Option<String>,
    pub target_amount: Option<Decimal>,
    /// ISO 4217 code; defaults to GHS
    pub currency: Option<String>,
    /// Defaults to public
    pub is_public: Option<bool>,
}

#[derive(Debug, Serialize)]
pub struct CollectionResponse {
    pub id: CollectionId,
    pub title: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub target_amount: Option<Decimal>,
    pub current_amount: Decimal,
    pub currency: String,
    pub status: CollectionStatus,
    pub is_public: bool,
    pub created_by: UserId,
    pub created_at: DateTime<Utc>,
}

impl From<Collection> for CollectionResponse {
    fn from(collection: Collection) -> Self {
        Self {
            id: collection.id,
            title: collection.title,
            description: collection.description,
            target_amount: collection.target_amount.map(|m| m.amount()),
            current_amount: collection.current_amount.amount(),
            currency: collection.current_amount.currency().to_string(),
            status: collection.status,
            is_public: collection.is_public,
            created_by: collection.created_by,
            created_at: collection.created_at,
        }
    }
}

//! Collection handlers

use axum::{
    extract::{Path, State},
    Extension, Json,
};
use validator::Validate;

use core_kernel::{CollectionId, Currency, Money};
use domain_collections::CollectionDraft;

use crate::auth::Claims;
use crate::dto::collections::{CollectionResponse, CreateCollectionRequest};
use crate::error::ApiError;
use crate::AppState;

/// Creates a new collection
pub async fn create_collection(
    State(state): State<AppState>,
    Extension(claims): Extension<Claims>,
    Json(request): Json<CreateCollectionRequest>,
) -> Result<Json<CollectionResponse>, ApiError> {
    request.validate()?;
    let user_id = claims.user_id().map_err(|_| ApiError::Unauthorized)?;

    let currency = match request.currency.as_deref() {
        None => Currency::GHS,
        Some(code) => Currency::parse(code)
            .ok_or_else(|| ApiError::BadRequest(format!("unsupported currency: {code}")))?,
    };

    let mut draft = CollectionDraft::new(request.title, currency, user_id);
    if let Some(description) = request.description {
        draft = draft.with_description(description);
    }
    if let Some(target) = request.target_amount {
        let target = Money::new(target, currency);
        if !target.is_positive() {
            return Err(ApiError::BadRequest(
                "target_amount must be positive".into(),
            ));
        }
        draft = draft.with_target(target);
    }
    if request.is_public == Some(false) {
        draft = draft.private();
    }

    let collection = state.collections.create(draft).await?;
    Ok(Json(CollectionResponse::from(collection)))
}

/// Lists public collections
pub async fn list_collections(
    State(state): State<AppState>,
) -> Result<Json<Vec<CollectionResponse>>, ApiError> {
    let collections = state.collections.list_public().await;
    Ok(Json(
        collections.into_iter().map(CollectionResponse::from).collect(),
    ))
}

/// Returns a collection by id
pub async fn get_collection(
    State(state): State<AppState>,
    Path(id): Path<CollectionId>,
) -> Result<Json<CollectionResponse>, ApiError> {
    let collection = state.collections.get(id).await?;
    Ok(Json(CollectionResponse::from(collection)))
}

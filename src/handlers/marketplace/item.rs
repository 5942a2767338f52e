use axum::{
    extract::{Extension, Path, State},
    Json,
};
use serde_json::{json, Value};
use uuid::Uuid;

use crate::database::models::ItemBody;
use crate::error::ApiError;
use crate::middleware::AuthUser;
use crate::services::OwnerResolution;
use crate::state::AppState;

/// GET /api/marketplace/:id - show a single item with its owner joined
pub async fn get(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<Json<Value>, ApiError> {
    let item = state
        .listings
        .get(id)
        .await
        .map_err(|err| {
            tracing::error!("Get marketplace item error: {}", err);
            ApiError::internal_server_error("Error fetching marketplace item")
        })?
        .ok_or_else(|| ApiError::not_found("Marketplace item not found"))?;

    Ok(Json(json!({ "success": true, "item": item })))
}

/// PUT /api/marketplace/:id - update a listing the caller owns.
/// A non-owner's id matches zero rows, so "not yours" and "does not exist"
/// are deliberately indistinguishable.
pub async fn put(
    State(state): State<AppState>,
    Extension(user): Extension<AuthUser>,
    Path(id): Path<Uuid>,
    Json(body): Json<ItemBody>,
) -> Result<Json<Value>, ApiError> {
    let owner = match state.owners.resolve(user.user_id, &user.role).await? {
        OwnerResolution::Found(owner) => owner,
        OwnerResolution::Missing => return Err(ApiError::bad_request("Profile required")),
    };

    let item = state
        .listings
        .update(id, &owner, body.update_payload())
        .await
        .map_err(|err| {
            tracing::error!("Update listing error: {}", err);
            ApiError::internal_server_error("Error updating listing")
        })?
        .ok_or_else(|| ApiError::not_found("Listing not found or not yours"))?;

    Ok(Json(json!({ "success": true, "item": item })))
}

/// DELETE /api/marketplace/:id - remove a listing the caller owns
pub async fn delete(
    State(state): State<AppState>,
    Extension(user): Extension<AuthUser>,
    Path(id): Path<Uuid>,
) -> Result<Json<Value>, ApiError> {
    let owner = match state.owners.resolve(user.user_id, &user.role).await? {
        OwnerResolution::Found(owner) => owner,
        OwnerResolution::Missing => return Err(ApiError::bad_request("Profile required")),
    };

    let removed = state.listings.delete(id, &owner).await.map_err(|err| {
        tracing::error!("Delete listing error: {}", err);
        ApiError::internal_server_error("Error deleting listing")
    })?;

    if !removed {
        return Err(ApiError::not_found("Listing not found or not yours"));
    }

    Ok(Json(json!({ "success": true, "message": "Listing removed" })))
}

use axum::{
    extract::{Extension, Query, State},
    http::StatusCode,
    Json,
};
use serde_json::{json, Value};

use crate::database::models::ItemBody;
use crate::error::ApiError;
use crate::filter::{ListingQuery, OwnerType};
use crate::middleware::AuthUser;
use crate::services::OwnerResolution;
use crate::state::AppState;

/// GET /api/marketplace - list items with optional filters
pub async fn get(
    State(state): State<AppState>,
    Query(query): Query<ListingQuery>,
) -> Result<Json<Value>, ApiError> {
    let items = state.listings.list(&query).await.map_err(|err| {
        tracing::error!("Get marketplace items error: {}", err);
        ApiError::internal_server_error("Error fetching marketplace items")
    })?;

    Ok(Json(json!({ "success": true, "items": items })))
}

/// POST /api/marketplace - create an item owned by the caller
pub async fn post(
    State(state): State<AppState>,
    Extension(user): Extension<AuthUser>,
    Json(body): Json<ItemBody>,
) -> Result<(StatusCode, Json<Value>), ApiError> {
    // Creation cannot proceed without an owning profile.
    let owner = match state.owners.resolve(user.user_id, &user.role).await? {
        OwnerResolution::Found(owner) => owner,
        OwnerResolution::Missing => {
            return Err(ApiError::bad_request(match OwnerType::from_role(&user.role) {
                Some(OwnerType::Freelancer) => "Freelancer profile required",
                Some(OwnerType::ServiceProvider) => "Service provider profile required",
                None => "Unsupported owner type",
            }))
        }
    };

    let item = state
        .listings
        .create(body.create_payload(), &owner)
        .await
        .map_err(|err| {
            tracing::error!("Create marketplace item error: {}", err);
            ApiError::internal_server_error("Error creating marketplace item")
        })?;

    Ok((StatusCode::CREATED, Json(json!({ "success": true, "item": item }))))
}

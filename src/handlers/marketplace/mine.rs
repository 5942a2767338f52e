use axum::{
    extract::{Extension, State},
    Json,
};
use serde_json::{json, Value};

use crate::error::ApiError;
use crate::middleware::AuthUser;
use crate::services::OwnerResolution;
use crate::state::AppState;

/// GET /api/marketplace/my - the caller's own listings, newest first
pub async fn get(
    State(state): State<AppState>,
    Extension(user): Extension<AuthUser>,
) -> Result<Json<Value>, ApiError> {
    let owner = match state.owners.resolve(user.user_id, &user.role).await? {
        OwnerResolution::Found(owner) => owner,
        OwnerResolution::Missing => {
            return Err(ApiError::bad_request("Profile required before listing services"))
        }
    };

    let items = state.listings.mine(&owner).await.map_err(|err| {
        tracing::error!("Get my listings error: {}", err);
        ApiError::internal_server_error("Error fetching listings")
    })?;

    Ok(Json(json!({ "success": true, "items": items })))
}

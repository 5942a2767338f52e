use axum::{
    extract::Request,
    middleware::Next,
    response::{IntoResponse, Response},
};

use super::auth::AuthUser;
use crate::error::ApiError;
use crate::filter::OwnerType;

/// Middleware gating routes to the two owning roles (freelancer,
/// service_provider). Must run after `jwt_auth_middleware`.
pub async fn require_owner_role(
    request: Request,
    next: Next,
) -> Result<Response, impl IntoResponse> {
    let auth_user = request
        .extensions()
        .get::<AuthUser>()
        .ok_or_else(|| ApiError::unauthorized("Authentication required"))?;

    if OwnerType::from_role(&auth_user.role).is_none() {
        tracing::warn!(
            "Role gate rejected user {} with role '{}'",
            auth_user.user_id,
            auth_user.role
        );
        return Err(ApiError::forbidden("This action requires a freelancer or service provider account"));
    }

    Ok(next.run(request).await)
}

pub mod auth;
pub mod roles;

pub use auth::{jwt_auth_middleware, AuthUser};
pub use roles::require_owner_role;

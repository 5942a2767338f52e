use sqlx::PgPool;

use crate::config;
use crate::services::{ChatService, ListingService, OwnerService, UserService};

/// Shared application state. Services own their pool/client handles and
/// the whole struct is cloned per request.
#[derive(Clone)]
pub struct AppState {
    pub listings: ListingService,
    pub owners: OwnerService,
    pub users: UserService,
    pub chat: ChatService,
}

impl AppState {
    pub fn new(pool: PgPool) -> Self {
        Self::with_chat(pool, ChatService::new(config::config().openai.clone()))
    }

    /// Construct with an explicit chat service (tests inject their own
    /// upstream config here).
    pub fn with_chat(pool: PgPool, chat: ChatService) -> Self {
        Self {
            listings: ListingService::new(pool.clone()),
            owners: OwnerService::new(pool.clone()),
            users: UserService::new(pool),
            chat,
        }
    }
}

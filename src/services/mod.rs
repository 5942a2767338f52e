pub mod chat;
pub mod listing;
pub mod owner;
pub mod user;

pub use chat::{ChatMessage, ChatPersona, ChatService};
pub use listing::ListingService;
pub use owner::{OwnerResolution, OwnerService};
pub use user::UserService;

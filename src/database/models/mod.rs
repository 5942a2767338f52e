pub mod marketplace_item;
pub mod profile;
pub mod user;

pub use marketplace_item::{ItemBody, ItemPayload, ItemWithOwner, MarketplaceItem};
pub use profile::{FreelancerProfile, ServiceProviderProfile};
pub use user::User;

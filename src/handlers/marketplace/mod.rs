pub mod item;
pub mod items;
pub mod mine;

// Re-export handler functions for use in routing
pub use item::delete as item_delete;
pub use item::get as item_get;
pub use item::put as item_put;
pub use items::get as items_get;
pub use items::post as items_post;
pub use mine::get as mine_get;

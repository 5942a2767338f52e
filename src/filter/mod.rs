pub mod types;
pub mod where_builder;

pub use types::*;
pub use where_builder::WhereBuilder;

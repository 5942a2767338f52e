pub mod marketplace;
pub mod support;

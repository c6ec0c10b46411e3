//! Product records and the on-disk catalog they live in.

pub mod models;
pub mod store;

pub use models::{slugify, Product};
pub use store::CatalogStore;

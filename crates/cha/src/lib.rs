//! Cha: a catalog of Chinese teas and where they come from.

pub mod catalog;
pub mod types;

pub use catalog::{slug, TeaCatalog};
pub use types::*;

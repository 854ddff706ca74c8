//! Products domain module.
//!
//! Catalog entries are plain immutable values: a name and a price fixed at
//! creation. No IO, no storage.

pub mod product;

pub use product::Product;

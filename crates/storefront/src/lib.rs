//! Application layer: in-memory stores and the order-to-delivery workflow.
//!
//! Domain crates stay pure; this crate owns every entity, wires collaborators
//! together, applies the status changes they request, records order events and
//! logs what happens.

pub mod journal;
pub mod service;
pub mod store;

pub use journal::OrderJournal;
pub use service::{OrderSummary, Storefront};
pub use store::InMemoryStore;

//! Orders domain module.
//!
//! This crate contains business rules for customer orders, implemented purely as
//! deterministic domain logic (no IO, no HTTP, no storage). The order is the only
//! aggregate whose status changes; payments and deliveries request transitions
//! through [`ChangeStatus`] commands and the order decides.

pub mod order;

pub use order::{
    AddProduct, ChangeStatus, LineAdded, LineQuantityIncreased, Order, OrderCommand, OrderEvent,
    OrderLine, OrderPlaced, OrderStatus, PlaceOrder, StatusChanged,
};

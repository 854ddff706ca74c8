//! Customers domain module.
//!
//! A customer is an identity plus an append-only history of the orders placed
//! for it. Orders are referenced by id; the customer does not own their lifecycle.

pub mod customer;

pub use customer::Customer;

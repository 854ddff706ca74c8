//! Shipping domain module.
//!
//! A delivery follows a paid order through transport to completion. Like
//! payments, it only requests order status changes; the order applies them.

pub mod delivery;
pub mod tracking;

pub use delivery::{Delivery, DeliveryStatus};
pub use tracking::TrackingCode;

//! Payments domain module (simulated processor).
//!
//! A payment evaluates its order's total against a fixed approval limit. It never
//! writes to the order; an approval hands back the status change for the order
//! to apply.

pub mod payment;

pub use payment::{APPROVAL_LIMIT, Payment, PaymentMethod, PaymentOutcome, PaymentStatus};

//! Value object trait: equality by value, not identity.

/// Marker trait for value objects.
///
/// Value objects are **immutable** and **compared by value**. Two value objects
/// with the same attributes are the same value; to "modify" one, build a new one.
///
/// - **Value Object**: `Money`, `TrackingCode`
/// - **Entity**: `Customer { id: CustomerId(...), .. }`
pub trait ValueObject: Clone + PartialEq + core::fmt::Debug {}

//! Value object trait: equality by value, not identity.

/// Marker trait for value objects.
///
/// Value objects are **immutable** and **compared by value**. To "modify" one,
/// build a new one. A listing's geolocation is a value object: two points with
/// the same coordinates are the same point.
pub trait ValueObject: Clone + PartialEq + core::fmt::Debug {}

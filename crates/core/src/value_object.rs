//! Value object trait: equality by value, not identity.

/// Marker trait for value objects.
///
/// Value objects are immutable and compared by their attribute values. `Price`
/// is one; a `Product` is not (two products with equal fields but different
/// ids are different products).
///
/// To "modify" a value object, build a new one; the constructor is the only
/// place its invariants are checked.
pub trait ValueObject: Clone + PartialEq + core::fmt::Debug {}

//! Bind strongly-typed object graphs to ordered dynamic mappings and JSON text.

/// Reflection contract, type registry, graph conversion, structural equality, and JSON codec.
pub mod bind;

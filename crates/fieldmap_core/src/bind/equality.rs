use std::hash::{Hash, Hasher};

use rustc_hash::FxHasher;

use crate::bind::{ConvertOptions, Mapping, Reflect, Value, to_mapping_with};

/// Structural equality over two objects' flattened mappings.
///
/// Runtime type names must match and both mappings must hold the same key set
/// with equal values. Integral floats compare equal to the matching integer.
pub fn equal(a: &dyn Reflect, b: &dyn Reflect) -> bool {
	if a.type_name() != b.type_name() {
		return false;
	}

	let options = ConvertOptions::default();
	to_mapping_with(a, &options).mapping == to_mapping_with(b, &options).mapping
}

/// Structural hash of an object's flattened mapping.
pub fn structural_hash(value: &dyn Reflect) -> u64 {
	mapping_hash(&to_mapping_with(value, &ConvertOptions::default()).mapping)
}

/// Fold `h = 31 * h + hash(value)` over entries in lexicographic key order.
pub fn mapping_hash(mapping: &Mapping) -> u64 {
	mapping
		.sorted()
		.into_iter()
		.fold(0_u64, |acc, (_, value)| acc.wrapping_mul(31).wrapping_add(value_hash(value)))
}

/// Seed-free hash of one dynamic value.
pub fn value_hash(value: &Value) -> u64 {
	let mut hasher = FxHasher::default();
	value.hash(&mut hasher);
	hasher.finish()
}

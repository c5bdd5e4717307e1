use std::fmt::Write;

use tracing::info;

use crate::bind::{ConvertOptions, Reflect, mapping_hash, to_mapping_with};

/// Multi-line dump of an object: type name, structural hash, then one line per field.
pub fn describe(value: &dyn Reflect) -> String {
	let mapping = to_mapping_with(value, &ConvertOptions::default()).mapping;
	let mut out = String::new();
	let _ = writeln!(out, "{} {{", value.type_name());
	let _ = writeln!(out, "   hash = {}", mapping_hash(&mapping));
	for (name, field) in &mapping {
		let _ = writeln!(out, "   key = {name}, value = {field}");
	}
	out.push_str("}\n");
	out
}

/// Emit [`describe`] output at info level.
pub fn log_object(value: &dyn Reflect) {
	info!(type_name = value.type_name(), "{}", describe(value));
}

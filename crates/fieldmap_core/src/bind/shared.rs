use crate::bind::{Conversion, ConvertOptions, Converter, Mapping, Rebuilt, Record, Reflect, Result, global, to_mapping_with};

/// Flatten a typed value with default options.
pub fn to_mapping(value: &dyn Reflect) -> Conversion {
	to_mapping_with(value, &ConvertOptions::default())
}

/// Rebuild a value of `type_name` using the global registry.
pub fn from_mapping(mapping: &Mapping, type_name: &str) -> Result<Rebuilt<Box<dyn Reflect>>> {
	let registry = global().read();
	Converter::new(&registry, ConvertOptions::default()).from_mapping(mapping, type_name)
}

/// Rebuild a `T` using the global registry for nested types.
pub fn from_mapping_as<T: Record>(mapping: &Mapping) -> Rebuilt<T> {
	let registry = global().read();
	Converter::new(&registry, ConvertOptions::default()).from_mapping_as::<T>(mapping)
}

/// Encode a typed value as pretty-printed JSON text.
pub fn object_to_json(value: &dyn Reflect) -> Result<String> {
	crate::bind::to_json_text(&to_mapping(value).mapping)
}

/// Decode JSON text into a value of `type_name` using the global registry.
pub fn object_from_json(text: &str, type_name: &str) -> Result<Rebuilt<Box<dyn Reflect>>> {
	let registry = global().read();
	Converter::new(&registry, ConvertOptions::default()).object_from_json(text, type_name)
}

/// Decode a JSON array into instances of `element_type` using the global registry.
pub fn array_from_json(text: &str, element_type: &str) -> Result<Rebuilt<Vec<Box<dyn Reflect>>>> {
	let registry = global().read();
	Converter::new(&registry, ConvertOptions::default()).array_from_json(text, element_type)
}

use indexmap::IndexMap;
use tracing::{debug, warn};

use crate::bind::coerce::{from_dynamic, to_dynamic};
use crate::bind::decl::OBJECT_TAG;
use crate::bind::{BASE_OBJECT, BindError, Mapping, Native, Raw, Record, Reflect, Result, TypeDecl, TypeRegistry, Value, field_mut, reflect_fields};

/// Limits and behavior switches for graph conversion.
#[derive(Debug, Clone)]
pub struct ConvertOptions {
	/// Maximum nested record depth in either direction.
	pub max_depth: u32,
	/// Record mapping keys with no matching field as issues.
	pub report_unknown_keys: bool,
}

impl Default for ConvertOptions {
	fn default() -> Self {
		Self {
			max_depth: 32,
			report_unknown_keys: false,
		}
	}
}

impl ConvertOptions {
	/// Preset that reports every mapping key the target type lacks.
	pub fn strict_keys() -> Self {
		Self {
			report_unknown_keys: true,
			..Self::default()
		}
	}
}

/// Field name to declared type table, parallel to a [`Mapping`].
///
/// Nested objects and sequence elements carry their own tables, so every
/// mapping in a converted tree has a matching table.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TypeTable {
	entries: IndexMap<Box<str>, FieldType>,
}

/// Declared type of one mapping entry plus the tables of what it nests.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FieldType {
	/// Declared type name.
	pub type_name: Box<str>,
	/// Tables for the nested object or sequence elements.
	pub nested: NestedTypes,
}

/// Type tables below one mapping entry.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub enum NestedTypes {
	/// Scalar, raw mapping, or absent value.
	#[default]
	None,
	/// Nested object.
	Object(TypeTable),
	/// One table per sequence element, in order.
	Elements(Vec<TypeTable>),
}

impl TypeTable {
	/// Insert or replace a scalar type name, keeping the first insertion position.
	pub fn insert(&mut self, name: impl Into<Box<str>>, type_name: impl Into<Box<str>>) {
		self.insert_field(
			name,
			FieldType {
				type_name: type_name.into(),
				nested: NestedTypes::None,
			},
		);
	}

	/// Insert or replace a full entry, keeping the first insertion position.
	pub fn insert_field(&mut self, name: impl Into<Box<str>>, field: FieldType) {
		self.entries.insert(name.into(), field);
	}

	/// Look up a field's type name.
	pub fn get(&self, name: &str) -> Option<&str> {
		self.entries.get(name).map(|field| &*field.type_name)
	}

	/// Look up a field's full entry.
	pub fn field(&self, name: &str) -> Option<&FieldType> {
		self.entries.get(name)
	}

	/// Table of a nested object field.
	pub fn object(&self, name: &str) -> Option<&TypeTable> {
		match &self.entries.get(name)?.nested {
			NestedTypes::Object(table) => Some(table),
			_ => None,
		}
	}

	/// Table of one element of a sequence field.
	pub fn element(&self, name: &str, index: usize) -> Option<&TypeTable> {
		match &self.entries.get(name)?.nested {
			NestedTypes::Elements(tables) => tables.get(index),
			_ => None,
		}
	}

	/// Number of entries.
	pub fn len(&self) -> usize {
		self.entries.len()
	}

	/// Whether the table is empty.
	pub fn is_empty(&self) -> bool {
		self.entries.is_empty()
	}

	/// Iterate `(field, type name)` pairs in insertion order.
	pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
		self.entries.iter().map(|(name, field)| (&**name, &*field.type_name))
	}

	/// Iterate field names in insertion order.
	pub fn keys(&self) -> impl Iterator<Item = &str> {
		self.entries.keys().map(|name| &**name)
	}
}

/// Typed-to-mapping output: the mapping, its type table, and per-field issues.
#[derive(Debug, Default)]
pub struct Conversion {
	/// Field name to dynamic value.
	pub mapping: Mapping,
	/// Field name to declared type name, key-for-key with `mapping`.
	pub types: TypeTable,
	/// Problems that degraded single fields.
	pub issues: Vec<BindError>,
}

/// Mapping-to-typed output: the rebuilt value and per-field issues.
#[derive(Debug)]
pub struct Rebuilt<T> {
	/// Reconstructed value.
	pub value: T,
	/// Fields or elements that were skipped.
	pub issues: Vec<BindError>,
}

/// Recursive converter between typed object graphs and dynamic mappings.
pub struct Converter<'r> {
	registry: &'r TypeRegistry,
	options: ConvertOptions,
}

impl<'r> Converter<'r> {
	/// Create a converter over `registry`.
	pub fn new(registry: &'r TypeRegistry, options: ConvertOptions) -> Self {
		Self { registry, options }
	}

	/// Registry used to construct nested types.
	pub fn registry(&self) -> &'r TypeRegistry {
		self.registry
	}

	/// Flatten a typed value into a mapping plus type table.
	pub fn to_mapping(&self, value: &dyn Reflect) -> Conversion {
		to_mapping_with(value, &self.options)
	}

	/// Rebuild a typed value of `type_name` from a mapping.
	///
	/// Fails only when `type_name` itself does not resolve.
	pub fn from_mapping(&self, mapping: &Mapping, type_name: &str) -> Result<Rebuilt<Box<dyn Reflect>>> {
		let mut value = self.registry.construct(type_name)?;
		let mut issues = Vec::new();
		self.apply_mapping(&mut *value, mapping, 0, &mut issues);
		Ok(Rebuilt { value, issues })
	}

	/// Rebuild a `T` from a mapping without a root registry lookup.
	pub fn from_mapping_as<T: Record>(&self, mapping: &Mapping) -> Rebuilt<T> {
		let mut value = T::default();
		let mut issues = Vec::new();
		self.apply_mapping(&mut value, mapping, 0, &mut issues);
		Rebuilt { value, issues }
	}

	/// Assign the mapping's entries onto an existing value.
	pub fn apply(&self, target: &mut dyn Reflect, mapping: &Mapping) -> Vec<BindError> {
		let mut issues = Vec::new();
		self.apply_mapping(target, mapping, 0, &mut issues);
		issues
	}

	/// Rebuild a sequence of records from dynamic values.
	///
	/// `type_name` is either the element type (`Invoice`) or a sequence type
	/// name (`Array;Invoice`). Elements that are not mappings are skipped.
	pub fn sequence_from_values(&self, values: &[Value], type_name: &str) -> Result<Rebuilt<Vec<Box<dyn Reflect>>>> {
		let decl: TypeDecl = type_name.parse()?;
		let element = match decl.sequence_element_object() {
			Some(element) => element.to_owned(),
			None => match decl.unwrap_optional() {
				TypeDecl::Object(name) => name.to_string(),
				_ => return Err(BindError::InvalidTypeDecl { text: type_name.to_owned() }),
			},
		};
		self.resolve_element(&element)?;

		let mut issues = Vec::new();
		let value = self.rebuild_sequence(type_name, &element, values, 0, &mut issues);
		Ok(Rebuilt { value, issues })
	}

	fn apply_mapping(&self, target: &mut dyn Reflect, mapping: &Mapping, depth: u32, issues: &mut Vec<BindError>) {
		let type_name = target.type_name();
		for (key, incoming) in mapping {
			let Some(field) = field_mut(target, key) else {
				debug!(type_name, field = key, "mapping key has no matching field");
				if self.options.report_unknown_keys {
					issues.push(BindError::UnknownField {
						type_name: type_name.to_owned(),
						field: key.to_owned(),
					});
				}
				continue;
			};

			let decl = field.declared();
			let native = match (decl.unwrap_optional(), decl.sequence_element_object(), incoming) {
				(TypeDecl::Object(nested), _, Value::Map(map)) => match self.rebuild_object(key, nested, map, depth + 1, issues) {
					Some(object) => Native::Object(object),
					None => continue,
				},
				(_, Some(element), Value::Array(items)) => {
					if let Err(err) = self.resolve_element(element) {
						warn!(field = key, element, "sequence element type does not resolve, field left unchanged");
						issues.push(err);
						continue;
					}
					let rebuilt = self.rebuild_sequence(key, element, items, depth + 1, issues);
					if rebuilt.is_empty() && !items.is_empty() {
						warn!(field = key, "no sequence element rebuilt, field left unchanged");
						continue;
					}
					Native::Objects(rebuilt)
				}
				_ => match from_dynamic(incoming, &decl) {
					Ok(native) => native,
					Err(rejected) => {
						reject(issues, key, rejected.0);
						continue;
					}
				},
			};

			if let Err(rejected) = field.assign(native) {
				reject(issues, key, rejected.0);
			}
		}
	}

	fn resolve_element(&self, element: &str) -> Result<()> {
		if element != BASE_OBJECT {
			self.registry.resolve(element)?;
		}
		Ok(())
	}

	fn rebuild_object(&self, field: &str, type_name: &str, mapping: &Mapping, depth: u32, issues: &mut Vec<BindError>) -> Option<Box<dyn Reflect>> {
		if depth > self.options.max_depth {
			warn!(field, type_name, max_depth = self.options.max_depth, "nested mapping too deep, skipping");
			issues.push(BindError::DepthExceeded {
				max_depth: self.options.max_depth,
			});
			return None;
		}

		match self.registry.construct(type_name) {
			Ok(mut object) => {
				self.apply_mapping(&mut *object, mapping, depth, issues);
				Some(object)
			}
			Err(err) => {
				warn!(field, type_name, "nested type does not resolve, skipping");
				issues.push(err);
				None
			}
		}
	}

	fn rebuild_sequence(&self, field: &str, element: &str, items: &[Value], depth: u32, issues: &mut Vec<BindError>) -> Vec<Box<dyn Reflect>> {
		let mut out = Vec::with_capacity(items.len());
		for (index, item) in items.iter().enumerate() {
			let Value::Map(map) = item else {
				reject(issues, field, format!("element {index} is {}, expected object", item.kind()));
				continue;
			};
			if let Some(object) = self.rebuild_object(field, element, map, depth, issues) {
				out.push(object);
			}
		}
		out
	}
}

/// Flatten a typed value into a mapping plus type table.
///
/// Needs no registry: only the reverse direction constructs types.
pub fn to_mapping_with(value: &dyn Reflect, options: &ConvertOptions) -> Conversion {
	let mut issues = Vec::new();
	let (mapping, types) = object_to_mapping(value, options, 0, &mut issues);
	Conversion { mapping, types, issues }
}

fn object_to_mapping(value: &dyn Reflect, options: &ConvertOptions, depth: u32, issues: &mut Vec<BindError>) -> (Mapping, TypeTable) {
	let slots = reflect_fields(value);
	let mut mapping = Mapping::with_capacity(slots.len());
	let mut types = TypeTable::default();

	for slot in slots {
		let raw = slot.field.raw();
		let sequence = matches!(raw, Raw::Objects(..));
		let mut tables = Vec::new();
		let mut nest = |object: &dyn Reflect| {
			let (value, table) = nested_to_value(object, options, depth + 1, issues);
			tables.push(table);
			value
		};
		let outcome = to_dynamic(raw, &mut nest);
		let (coerced, type_name) = match outcome {
			Ok(coerced) => coerced,
			Err(kind) => {
				warn!(field = slot.name, kind, "unsupported value kind, writing null");
				issues.push(BindError::UnsupportedValueKind {
					field: slot.name.to_owned(),
					kind: kind.to_owned(),
				});
				(Value::Null, OBJECT_TAG.into())
			}
		};

		let nested = if sequence {
			NestedTypes::Elements(tables)
		} else {
			tables.pop().map_or(NestedTypes::None, NestedTypes::Object)
		};
		mapping.insert(slot.name, coerced);
		types.insert_field(slot.name, FieldType { type_name, nested });
	}

	(mapping, types)
}

fn nested_to_value(object: &dyn Reflect, options: &ConvertOptions, depth: u32, issues: &mut Vec<BindError>) -> (Value, TypeTable) {
	if depth > options.max_depth {
		warn!(type_name = object.type_name(), max_depth = options.max_depth, "nested object too deep, writing null");
		issues.push(BindError::DepthExceeded {
			max_depth: options.max_depth,
		});
		return (Value::Null, TypeTable::default());
	}
	let (mapping, types) = object_to_mapping(object, options, depth, issues);
	(Value::Map(mapping), types)
}

fn reject(issues: &mut Vec<BindError>, field: &str, reason: String) {
	warn!(field, reason = %reason, "assignment rejected, field left unchanged");
	issues.push(BindError::ValidationRejected {
		field: field.to_owned(),
		reason,
	});
}

#[cfg(test)]
mod tests;

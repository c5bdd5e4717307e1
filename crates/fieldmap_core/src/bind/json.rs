use std::fmt;

use serde::de::{self, Deserialize, Deserializer, MapAccess, SeqAccess, Visitor};
use serde::ser::{Serialize, SerializeMap, Serializer};

use crate::bind::{BindError, Converter, Mapping, Record, Rebuilt, Reflect, Result, Value};

impl Serialize for Value {
	fn serialize<S: Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
		match self {
			Value::Null => serializer.serialize_unit(),
			Value::Bool(flag) => serializer.serialize_bool(*flag),
			Value::I64(int) => serializer.serialize_i64(*int),
			Value::U64(int) => serializer.serialize_u64(*int),
			Value::F64(float) => serializer.serialize_f64(*float),
			Value::String(text) => serializer.serialize_str(text),
			Value::Map(map) => map.serialize(serializer),
			Value::Array(items) => items.serialize(serializer),
		}
	}
}

impl Serialize for Mapping {
	fn serialize<S: Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
		let mut out = serializer.serialize_map(Some(self.len()))?;
		for (name, value) in self {
			out.serialize_entry(name, value)?;
		}
		out.end()
	}
}

struct ValueVisitor;

impl<'de> Visitor<'de> for ValueVisitor {
	type Value = Value;

	fn expecting(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		f.write_str("any JSON value")
	}

	fn visit_bool<E: de::Error>(self, value: bool) -> std::result::Result<Value, E> {
		Ok(Value::Bool(value))
	}

	fn visit_i64<E: de::Error>(self, value: i64) -> std::result::Result<Value, E> {
		Ok(Value::I64(value))
	}

	fn visit_u64<E: de::Error>(self, value: u64) -> std::result::Result<Value, E> {
		Ok(Value::from(value))
	}

	fn visit_f64<E: de::Error>(self, value: f64) -> std::result::Result<Value, E> {
		Ok(Value::F64(value))
	}

	fn visit_str<E: de::Error>(self, value: &str) -> std::result::Result<Value, E> {
		Ok(Value::String(value.into()))
	}

	fn visit_string<E: de::Error>(self, value: String) -> std::result::Result<Value, E> {
		Ok(Value::String(value.into_boxed_str()))
	}

	fn visit_unit<E: de::Error>(self) -> std::result::Result<Value, E> {
		Ok(Value::Null)
	}

	fn visit_none<E: de::Error>(self) -> std::result::Result<Value, E> {
		Ok(Value::Null)
	}

	fn visit_some<D: Deserializer<'de>>(self, deserializer: D) -> std::result::Result<Value, D::Error> {
		Value::deserialize(deserializer)
	}

	fn visit_seq<A: SeqAccess<'de>>(self, mut seq: A) -> std::result::Result<Value, A::Error> {
		let mut items = Vec::with_capacity(seq.size_hint().unwrap_or(0));
		while let Some(item) = seq.next_element()? {
			items.push(item);
		}
		Ok(Value::Array(items))
	}

	fn visit_map<A: MapAccess<'de>>(self, map: A) -> std::result::Result<Value, A::Error> {
		MappingVisitor.visit_map(map).map(Value::Map)
	}
}

struct MappingVisitor;

impl<'de> Visitor<'de> for MappingVisitor {
	type Value = Mapping;

	fn expecting(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		f.write_str("a JSON object")
	}

	fn visit_map<A: MapAccess<'de>>(self, mut access: A) -> std::result::Result<Mapping, A::Error> {
		let mut map = Mapping::with_capacity(access.size_hint().unwrap_or(0));
		while let Some((name, value)) = access.next_entry::<String, Value>()? {
			map.insert(name, value);
		}
		Ok(map)
	}
}

impl<'de> Deserialize<'de> for Value {
	fn deserialize<D: Deserializer<'de>>(deserializer: D) -> std::result::Result<Self, D::Error> {
		deserializer.deserialize_any(ValueVisitor)
	}
}

impl<'de> Deserialize<'de> for Mapping {
	fn deserialize<D: Deserializer<'de>>(deserializer: D) -> std::result::Result<Self, D::Error> {
		deserializer.deserialize_map(MappingVisitor)
	}
}

/// Encode a mapping as pretty-printed JSON text.
///
/// JSON has no NaN or infinity: non-finite floats are written as `null` and
/// decode back as `Value::Null`.
pub fn to_json_text(mapping: &Mapping) -> Result<String> {
	Ok(serde_json::to_string_pretty(mapping)?)
}

/// Decode JSON text whose top level is an object.
pub fn from_json_text(text: &str) -> Result<Mapping> {
	match parse_json(text)? {
		Value::Map(map) => Ok(map),
		other => Err(BindError::JsonShape {
			expected: "object",
			got: other.kind(),
		}),
	}
}

/// Decode JSON text whose top level is an array.
pub fn array_from_json_text(text: &str) -> Result<Vec<Value>> {
	match parse_json(text)? {
		Value::Array(items) => Ok(items),
		other => Err(BindError::JsonShape {
			expected: "array",
			got: other.kind(),
		}),
	}
}

fn parse_json(text: &str) -> Result<Value> {
	Ok(serde_json::from_str::<Value>(text)?)
}

impl Converter<'_> {
	/// Encode a typed value as pretty-printed JSON text.
	pub fn object_to_json(&self, value: &dyn Reflect) -> Result<String> {
		to_json_text(&self.to_mapping(value).mapping)
	}

	/// Decode JSON text into a typed value of `type_name`.
	pub fn object_from_json(&self, text: &str, type_name: &str) -> Result<Rebuilt<Box<dyn Reflect>>> {
		let mapping = from_json_text(text)?;
		self.from_mapping(&mapping, type_name)
	}

	/// Decode a JSON array of objects into instances of `element_type`.
	pub fn array_from_json(&self, text: &str, element_type: &str) -> Result<Rebuilt<Vec<Box<dyn Reflect>>>> {
		let items = array_from_json_text(text)?;
		self.sequence_from_values(&items, element_type)
	}

	/// Decode a JSON array of objects into `T` values.
	///
	/// Array items that are not objects are skipped and reported.
	pub fn array_from_json_as<T: Record>(&self, text: &str) -> Result<Rebuilt<Vec<T>>> {
		let items = array_from_json_text(text)?;
		let mut value = Vec::with_capacity(items.len());
		let mut issues = Vec::new();
		for (index, item) in items.iter().enumerate() {
			match item {
				Value::Map(map) => {
					let rebuilt = self.from_mapping_as::<T>(map);
					issues.extend(rebuilt.issues);
					value.push(rebuilt.value);
				}
				other => issues.push(BindError::ValidationRejected {
					field: format!("[{index}]"),
					reason: format!("expected object, got {}", other.kind()),
				}),
			}
		}
		Ok(Rebuilt { value, issues })
	}
}

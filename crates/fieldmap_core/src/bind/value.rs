use std::fmt;
use std::hash::{Hash, Hasher};

use indexmap::IndexMap;

/// Dynamic interchange value between typed objects and generic documents.
#[derive(Debug, Clone)]
pub enum Value {
	/// Explicit null, the canonical form of an absent or unset value.
	Null,
	/// Boolean scalar.
	Bool(bool),
	/// Signed integer scalar.
	I64(i64),
	/// Unsigned integer scalar above `i64::MAX`.
	U64(u64),
	/// 64-bit float scalar.
	F64(f64),
	/// UTF-8 string.
	String(Box<str>),
	/// Nested name-to-value mapping.
	Map(Mapping),
	/// Ordered sequence.
	Array(Vec<Value>),
}

impl Value {
	/// Short kind label used in diagnostics.
	pub fn kind(&self) -> &'static str {
		match self {
			Value::Null => "null",
			Value::Bool(_) => "bool",
			Value::I64(_) | Value::U64(_) | Value::F64(_) => "number",
			Value::String(_) => "string",
			Value::Map(_) => "object",
			Value::Array(_) => "array",
		}
	}

	/// Whether this value is `Null`.
	pub fn is_null(&self) -> bool {
		matches!(self, Value::Null)
	}

	/// Borrow the nested mapping, if this is one.
	pub fn as_map(&self) -> Option<&Mapping> {
		match self {
			Value::Map(map) => Some(map),
			_ => None,
		}
	}

	/// Borrow the sequence items, if this is one.
	pub fn as_array(&self) -> Option<&[Value]> {
		match self {
			Value::Array(items) => Some(items),
			_ => None,
		}
	}

	/// Borrow the string payload, if this is one.
	pub fn as_str(&self) -> Option<&str> {
		match self {
			Value::String(text) => Some(text),
			_ => None,
		}
	}

	/// Integer payload, including floats with no fractional part.
	pub fn as_i64(&self) -> Option<i64> {
		self.exact_int().and_then(|int| i64::try_from(int).ok())
	}

	/// Exact integer form of a numeric value, when it has one.
	fn exact_int(&self) -> Option<i128> {
		match *self {
			Value::I64(int) => Some(i128::from(int)),
			Value::U64(int) => Some(i128::from(int)),
			Value::F64(float) => integral(float),
			_ => None,
		}
	}
}

/// Exact integer form of a float within the `i64::MIN..=u64::MAX` range.
pub(crate) fn integral(value: f64) -> Option<i128> {
	(value.fract() == 0.0 && value >= i64::MIN as f64 && value < u64::MAX as f64).then_some(value as i128)
}

impl PartialEq for Value {
	fn eq(&self, other: &Self) -> bool {
		match (self, other) {
			(Value::Null, Value::Null) => true,
			(Value::Bool(a), Value::Bool(b)) => a == b,
			(Value::F64(a), Value::F64(b)) if a.is_nan() || b.is_nan() => a.is_nan() && b.is_nan(),
			(Value::I64(_) | Value::U64(_) | Value::F64(_), Value::I64(_) | Value::U64(_) | Value::F64(_)) => {
				match (self.exact_int(), other.exact_int()) {
					(Some(a), Some(b)) => a == b,
					(None, None) => matches!((self, other), (Value::F64(a), Value::F64(b)) if a == b),
					_ => false,
				}
			}
			(Value::String(a), Value::String(b)) => a == b,
			(Value::Map(a), Value::Map(b)) => a == b,
			(Value::Array(a), Value::Array(b)) => a == b,
			_ => false,
		}
	}
}

impl Hash for Value {
	fn hash<H: Hasher>(&self, state: &mut H) {
		match self {
			Value::Null => state.write_u8(0),
			Value::Bool(value) => {
				state.write_u8(1);
				value.hash(state);
			}
			Value::I64(_) | Value::U64(_) | Value::F64(_) => match self.exact_int() {
				Some(int) => match i64::try_from(int) {
					Ok(small) => {
						state.write_u8(2);
						small.hash(state);
					}
					Err(_) => {
						state.write_u8(7);
						int.hash(state);
					}
				},
				None => {
					state.write_u8(3);
					let bits = match self {
						Value::F64(float) if !float.is_nan() => float.to_bits(),
						_ => f64::NAN.to_bits(),
					};
					bits.hash(state);
				}
			},
			Value::String(text) => {
				state.write_u8(4);
				text.hash(state);
			}
			Value::Map(map) => {
				state.write_u8(5);
				map.hash(state);
			}
			Value::Array(items) => {
				state.write_u8(6);
				items.hash(state);
			}
		}
	}
}

impl fmt::Display for Value {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		match self {
			Value::String(text) => f.write_str(text),
			other => {
				let text = serde_json::to_string(other).map_err(|_| fmt::Error)?;
				f.write_str(&text)
			}
		}
	}
}

impl From<bool> for Value {
	fn from(value: bool) -> Self {
		Value::Bool(value)
	}
}

impl From<i64> for Value {
	fn from(value: i64) -> Self {
		Value::I64(value)
	}
}

impl From<i32> for Value {
	fn from(value: i32) -> Self {
		Value::I64(i64::from(value))
	}
}

impl From<u64> for Value {
	fn from(value: u64) -> Self {
		i64::try_from(value).map(Value::I64).unwrap_or(Value::U64(value))
	}
}

impl From<f64> for Value {
	fn from(value: f64) -> Self {
		Value::F64(value)
	}
}

impl From<&str> for Value {
	fn from(value: &str) -> Self {
		Value::String(value.into())
	}
}

impl From<String> for Value {
	fn from(value: String) -> Self {
		Value::String(value.into_boxed_str())
	}
}

impl From<Mapping> for Value {
	fn from(value: Mapping) -> Self {
		Value::Map(value)
	}
}

impl From<Vec<Value>> for Value {
	fn from(value: Vec<Value>) -> Self {
		Value::Array(value)
	}
}

/// Insertion-ordered mapping of unique names to dynamic values.
///
/// Re-inserting an existing name replaces the value in place and keeps the
/// original position. Equality ignores order.
#[derive(Debug, Clone, Default)]
pub struct Mapping {
	entries: IndexMap<Box<str>, Value>,
}

impl Mapping {
	/// Create an empty mapping.
	pub fn new() -> Self {
		Self::default()
	}

	/// Create an empty mapping with room for `capacity` entries.
	pub fn with_capacity(capacity: usize) -> Self {
		Self {
			entries: IndexMap::with_capacity(capacity),
		}
	}

	/// Number of entries.
	pub fn len(&self) -> usize {
		self.entries.len()
	}

	/// Whether the mapping has no entries.
	pub fn is_empty(&self) -> bool {
		self.entries.is_empty()
	}

	/// Insert or replace a value, returning the previous one.
	pub fn insert(&mut self, name: impl Into<Box<str>>, value: Value) -> Option<Value> {
		self.entries.insert(name.into(), value)
	}

	/// Look up a value by name.
	pub fn get(&self, name: &str) -> Option<&Value> {
		self.entries.get(name)
	}

	/// Whether `name` is present, including entries holding `Null`.
	pub fn contains_key(&self, name: &str) -> bool {
		self.entries.contains_key(name)
	}

	/// Remove an entry, preserving the order of the rest.
	pub fn remove(&mut self, name: &str) -> Option<Value> {
		self.entries.shift_remove(name)
	}

	/// Iterate `(name, value)` pairs in insertion order.
	pub fn iter(&self) -> impl Iterator<Item = (&str, &Value)> {
		self.entries.iter().map(|(name, value)| (&**name, value))
	}

	/// Iterate names in insertion order.
	pub fn keys(&self) -> impl Iterator<Item = &str> {
		self.entries.keys().map(|name| &**name)
	}

	/// Entries sorted lexicographically by name.
	pub fn sorted(&self) -> Vec<(&str, &Value)> {
		let mut sorted: Vec<(&str, &Value)> = self.iter().collect();
		sorted.sort_unstable_by(|a, b| a.0.cmp(b.0));
		sorted
	}
}

impl PartialEq for Mapping {
	fn eq(&self, other: &Self) -> bool {
		self.len() == other.len() && other.iter().all(|(name, value)| self.get(name) == Some(value))
	}
}

impl Hash for Mapping {
	fn hash<H: Hasher>(&self, state: &mut H) {
		state.write_usize(self.len());
		for (name, value) in self.sorted() {
			name.hash(state);
			value.hash(state);
		}
	}
}

impl<K: Into<Box<str>>> FromIterator<(K, Value)> for Mapping {
	fn from_iter<I: IntoIterator<Item = (K, Value)>>(iter: I) -> Self {
		let mut map = Mapping::new();
		for (name, value) in iter {
			map.insert(name, value);
		}
		map
	}
}

impl<'a> IntoIterator for &'a Mapping {
	type Item = (&'a str, &'a Value);
	type IntoIter = std::iter::Map<indexmap::map::Iter<'a, Box<str>, Value>, fn((&'a Box<str>, &'a Value)) -> (&'a str, &'a Value)>;

	fn into_iter(self) -> Self::IntoIter {
		fn pair<'e>((name, value): (&'e Box<str>, &'e Value)) -> (&'e str, &'e Value) {
			(&**name, value)
		}
		self.entries.iter().map(pair as fn((&'a Box<str>, &'a Value)) -> (&'a str, &'a Value))
	}
}

#[cfg(test)]
mod tests {
	use super::{Mapping, Value};

	#[test]
	fn reinsert_replaces_in_place() {
		let mut map = Mapping::new();
		map.insert("a", Value::from(1));
		map.insert("b", Value::from(2));
		let previous = map.insert("a", Value::from(3));

		assert_eq!(previous, Some(Value::from(1)));
		assert_eq!(map.keys().collect::<Vec<_>>(), vec!["a", "b"]);
		assert_eq!(map.get("a"), Some(&Value::from(3)));
	}

	#[test]
	fn equality_ignores_entry_order() {
		let left: Mapping = [("x", Value::from(1)), ("y", Value::from("two"))].into_iter().collect();
		let right: Mapping = [("y", Value::from("two")), ("x", Value::from(1))].into_iter().collect();
		assert_eq!(left, right);
	}

	#[test]
	fn integral_float_equals_integer() {
		assert_eq!(Value::I64(31), Value::F64(31.0));
		assert_ne!(Value::I64(31), Value::F64(31.5));
		assert_ne!(Value::Bool(true), Value::I64(1));
	}

	#[test]
	fn null_entry_is_distinct_from_missing_key() {
		let map: Mapping = [("address", Value::Null)].into_iter().collect();
		assert!(map.contains_key("address"));
		assert!(!map.contains_key("city"));
	}

	#[test]
	fn nan_equals_itself() {
		let nan = Value::F64(f64::NAN);
		assert_eq!(nan, nan.clone());
		assert_ne!(nan, Value::F64(1.5));
		assert_ne!(nan, Value::Null);
	}

	#[test]
	fn unsigned_above_signed_range_compares_exactly() {
		assert_eq!(Value::from(u64::MAX), Value::U64(u64::MAX));
		assert_eq!(Value::from(7_u64), Value::I64(7));
		assert_eq!(Value::U64(7), Value::I64(7));
		assert_ne!(Value::U64(u64::MAX), Value::U64(u64::MAX - 1));
		assert_eq!(Value::U64(u64::MAX).as_i64(), None);
	}

	#[test]
	fn remove_keeps_remaining_order() {
		let mut map: Mapping = [("a", Value::from(1)), ("b", Value::from(2)), ("c", Value::from(3))].into_iter().collect();
		assert_eq!(map.remove("b"), Some(Value::from(2)));
		assert_eq!(map.keys().collect::<Vec<_>>(), vec!["a", "c"]);
	}
}

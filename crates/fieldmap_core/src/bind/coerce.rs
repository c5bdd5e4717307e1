use crate::bind::decl::{MAPPING_TAG, NUMBER_TAG, SEQUENCE_CONTAINER, STRING_TAG};
use crate::bind::{Native, Raw, Reflect, Rejected, TypeDecl, Value};

/// Coerce one field's native view into a dynamic value and its type tag.
///
/// Nested records are handed to `nest`, which owns the recursion. An
/// unsupported value kind comes back as `Err` with its Rust type name.
pub fn to_dynamic(raw: Raw<'_>, nest: &mut dyn FnMut(&dyn Reflect) -> Value) -> Result<(Value, Box<str>), &'static str> {
	let coerced = match raw {
		Raw::Absent(decl) => (Value::Null, decl.to_string().into_boxed_str()),
		Raw::Bool(flag) => (Value::Bool(flag), NUMBER_TAG.into()),
		Raw::Int(int) => (Value::I64(int), NUMBER_TAG.into()),
		Raw::UInt(int) => (Value::U64(int), NUMBER_TAG.into()),
		Raw::Float(float) => (Value::F64(float), NUMBER_TAG.into()),
		Raw::Str(text) => (Value::String(text.into()), STRING_TAG.into()),
		Raw::Map(map) => (Value::Map(map.clone()), MAPPING_TAG.into()),
		Raw::Object(object) => (nest(object), object.type_name().into()),
		Raw::Objects(items, element) => {
			let values = items.into_iter().map(|item| nest(item)).collect();
			(Value::Array(values), format!("{SEQUENCE_CONTAINER};{element}").into_boxed_str())
		}
		Raw::Unsupported(kind) => return Err(kind),
	};
	Ok(coerced)
}

/// Coerce a dynamic value toward a field's declared scalar type.
///
/// The declaration, not the value's own tag, picks the target: a float bound
/// for an integer field truncates, and numeric strings parse. `Null` always
/// becomes `Native::Null`.
pub fn from_dynamic(value: &Value, decl: &TypeDecl) -> Result<Native, Rejected> {
	if value.is_null() {
		return Ok(Native::Null);
	}

	match decl.unwrap_optional() {
		TypeDecl::Int => to_int(value),
		TypeDecl::Float => to_float(value).map(Native::Float),
		TypeDecl::Bool => to_bool(value).map(Native::Bool),
		TypeDecl::String => to_string(value).map(Native::Str),
		TypeDecl::Mapping => match value {
			Value::Map(map) => Ok(Native::Map(map.clone())),
			other => Err(shape(decl, other)),
		},
		TypeDecl::Object(_) | TypeDecl::Sequence(_) | TypeDecl::Unsupported | TypeDecl::Optional(_) => Err(shape(decl, value)),
	}
}

fn shape(decl: &TypeDecl, value: &Value) -> Rejected {
	Rejected(format!("cannot coerce {} into {decl}", value.kind()))
}

fn to_int(value: &Value) -> Result<Native, Rejected> {
	match value {
		Value::I64(int) => Ok(Native::Int(*int)),
		Value::U64(int) => Ok(native_int(i128::from(*int))),
		Value::F64(float) => truncate(*float).map(native_int).ok_or_else(|| shape(&TypeDecl::Int, value)),
		Value::Bool(flag) => Ok(Native::Int(i64::from(*flag))),
		Value::String(text) => {
			let text = text.trim();
			text.parse::<i128>()
				.ok()
				.filter(|int| u64::try_from(*int).is_ok() || i64::try_from(*int).is_ok())
				.or_else(|| text.parse::<f64>().ok().and_then(truncate))
				.map(native_int)
				.ok_or_else(|| Rejected(format!("{text:?} is not an integer")))
		}
		other => Err(shape(&TypeDecl::Int, other)),
	}
}

/// Integer in the `i64::MIN..=u64::MAX` range as the narrowest native form.
fn native_int(int: i128) -> Native {
	match (i64::try_from(int), u64::try_from(int)) {
		(Ok(signed), _) => Native::Int(signed),
		(_, Ok(unsigned)) => Native::UInt(unsigned),
		_ => Native::Int(if int < 0 { i64::MIN } else { i64::MAX }),
	}
}

fn truncate(float: f64) -> Option<i128> {
	crate::bind::value::integral(float.trunc())
}

fn to_float(value: &Value) -> Result<f64, Rejected> {
	match value {
		Value::F64(float) => Ok(*float),
		Value::I64(int) => Ok(*int as f64),
		Value::U64(int) => Ok(*int as f64),
		Value::Bool(flag) => Ok(if *flag { 1.0 } else { 0.0 }),
		Value::String(text) => text.trim().parse::<f64>().map_err(|_| Rejected(format!("{text:?} is not a number"))),
		other => Err(shape(&TypeDecl::Float, other)),
	}
}

fn to_bool(value: &Value) -> Result<bool, Rejected> {
	match value {
		Value::Bool(flag) => Ok(*flag),
		Value::I64(int) => Ok(*int != 0),
		Value::U64(_) => Ok(true),
		Value::F64(float) => Ok(*float != 0.0),
		Value::String(text) => match text.trim() {
			"true" | "1" => Ok(true),
			"false" | "0" => Ok(false),
			_ => Err(Rejected(format!("{text:?} is not a boolean"))),
		},
		other => Err(shape(&TypeDecl::Bool, other)),
	}
}

fn to_string(value: &Value) -> Result<String, Rejected> {
	match value {
		Value::String(text) => Ok(text.to_string()),
		Value::I64(int) => Ok(int.to_string()),
		Value::U64(int) => Ok(int.to_string()),
		Value::F64(float) => Ok(float.to_string()),
		Value::Bool(flag) => Ok(flag.to_string()),
		other => Err(shape(&TypeDecl::String, other)),
	}
}

use thiserror::Error;

/// Crate-local result type.
pub type Result<T> = std::result::Result<T, BindError>;

/// Errors and per-field issues produced while binding objects and mappings.
///
/// Only root-level lookups and JSON decoding return these as `Err`. Everything
/// scoped to one field is collected as an issue next to the successful result.
#[derive(Debug, Error)]
pub enum BindError {
	/// Type name did not resolve through the registry.
	#[error("type not found: {name}")]
	TypeNotFound {
		/// Name as requested, before namespace qualification.
		name: String,
	},
	/// Field value matched no coercion rule and was replaced by null.
	#[error("unsupported value kind for field {field}: {kind}")]
	UnsupportedValueKind {
		/// Field identifier.
		field: String,
		/// Rust type name of the offending value.
		kind: String,
	},
	/// Target field refused an incoming value.
	#[error("value rejected for field {field}: {reason}")]
	ValidationRejected {
		/// Field identifier.
		field: String,
		/// Reason reported by the field or the coercer.
		reason: String,
	},
	/// Mapping key has no matching field on the target type.
	#[error("unknown field {field} on {type_name}")]
	UnknownField {
		/// Target type name.
		type_name: String,
		/// Mapping key that matched nothing.
		field: String,
	},
	/// Nested object recursion exceeded the configured limit.
	#[error("conversion depth exceeded (max={max_depth})")]
	DepthExceeded {
		/// Configured depth ceiling.
		max_depth: u32,
	},
	/// Input text is not valid JSON.
	#[error("malformed json: {0}")]
	MalformedJson(#[from] serde_json::Error),
	/// JSON parsed, but the top-level value has the wrong shape.
	#[error("json shape mismatch: expected {expected}, got {got}")]
	JsonShape {
		/// Expected top-level kind.
		expected: &'static str,
		/// Actual top-level kind.
		got: &'static str,
	},
	/// Declared type text could not be parsed.
	#[error("invalid type declaration: {text:?}")]
	InvalidTypeDecl {
		/// Offending text.
		text: String,
	},
}

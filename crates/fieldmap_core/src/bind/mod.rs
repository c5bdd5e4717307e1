mod coerce;
mod convert;
mod decl;
mod describe;
mod equality;
mod error;
mod json;
mod reflect;
mod registry;
mod shared;
mod value;

/// Per-field coercion between native field values and dynamic values.
pub use coerce::{from_dynamic, to_dynamic};
/// Graph conversion options, outputs, and entry points.
pub use convert::{Conversion, ConvertOptions, Converter, FieldType, NestedTypes, Rebuilt, TypeTable, to_mapping_with};
/// Declared type descriptors and runtime type tags.
pub use decl::{MAPPING_TAG, MAX_DECL_DEPTH, NUMBER_TAG, OBJECT_TAG, OPTIONAL_CONTAINER, SEQUENCE_CONTAINER, STRING_TAG, TypeDecl};
/// Human-readable object dumps.
pub use describe::{describe, log_object};
/// Structural equality and hashing.
pub use equality::{equal, mapping_hash, structural_hash, value_hash};
/// Error and result aliases.
pub use error::{BindError, Result};
/// JSON text codec for mappings and arrays.
pub use json::{array_from_json_text, from_json_text, to_json_text};
/// Reflection contract and built-in field kinds.
pub use reflect::{BaseObject, Field, FieldSlot, Native, Opaque, Raw, Record, Reflect, Rejected, field_mut, object_assign, object_raw, reflect_fields};
/// Type registry and namespace resolution.
pub use registry::{BASE_OBJECT, DEFAULT_NAMESPACE, NAMESPACE_ENV, TypeDescriptor, TypeRegistry, app_namespace, global, register, short_type_name};
/// Conversions against the process-wide registry.
pub use shared::{array_from_json, from_mapping, from_mapping_as, object_from_json, object_to_json, to_mapping};
/// Dynamic value and ordered mapping types.
pub use value::{Mapping, Value};

use std::fmt;
use std::str::FromStr;

use crate::bind::BindError;

/// Container name written in front of a sequence's element type.
pub const SEQUENCE_CONTAINER: &str = "Array";
/// Container name written in front of an optional's element type.
pub const OPTIONAL_CONTAINER: &str = "Optional";
/// Runtime type tag for integer, float, and boolean values.
pub const NUMBER_TAG: &str = "number";
/// Runtime type tag for string values.
pub const STRING_TAG: &str = "string";
/// Runtime type tag for values no coercion rule accepts.
pub const OBJECT_TAG: &str = "object";
/// Runtime type tag for raw dynamic sub-documents.
pub const MAPPING_TAG: &str = "Mapping";
/// Deepest container nesting accepted when parsing type-name text.
pub const MAX_DECL_DEPTH: usize = 64;

/// Structured declared type of one field slot.
///
/// `Display` writes the canonical type-name text and `FromStr` reads it back.
/// Containers use `<container>;<element>`, so `Vec<Invoice>` is `Array;Invoice`.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum TypeDecl {
	/// Any integer width.
	Int,
	/// `f32` or `f64`.
	Float,
	/// Boolean.
	Bool,
	/// Owned string.
	String,
	/// Raw dynamic sub-document, assigned without reconstruction.
	Mapping,
	/// Nested record, by bare type name.
	Object(Box<str>),
	/// Ordered sequence of the element type.
	Sequence(Box<TypeDecl>),
	/// Value that may be absent.
	Optional(Box<TypeDecl>),
	/// Field kind the binder does not coerce.
	Unsupported,
}

impl TypeDecl {
	/// Nested record declaration for a bare type name.
	pub fn object(name: impl Into<Box<str>>) -> Self {
		TypeDecl::Object(name.into())
	}

	/// Sequence declaration wrapping `element`.
	pub fn sequence(element: TypeDecl) -> Self {
		TypeDecl::Sequence(Box::new(element))
	}

	/// Optional declaration wrapping `element`.
	pub fn optional(element: TypeDecl) -> Self {
		TypeDecl::Optional(Box::new(element))
	}

	/// Strip every optional layer.
	pub fn unwrap_optional(&self) -> &TypeDecl {
		match self {
			TypeDecl::Optional(inner) => inner.unwrap_optional(),
			other => other,
		}
	}

	/// Whether at least one optional layer wraps this declaration.
	pub fn is_optional(&self) -> bool {
		matches!(self, TypeDecl::Optional(_))
	}

	/// Record type name when this is a sequence of records.
	pub fn sequence_element_object(&self) -> Option<&str> {
		match self.unwrap_optional() {
			TypeDecl::Sequence(element) => match element.unwrap_optional() {
				TypeDecl::Object(name) => Some(name),
				_ => None,
			},
			_ => None,
		}
	}
}

impl fmt::Display for TypeDecl {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		match self {
			TypeDecl::Int => f.write_str("Int"),
			TypeDecl::Float => f.write_str("Float"),
			TypeDecl::Bool => f.write_str("Bool"),
			TypeDecl::String => f.write_str("String"),
			TypeDecl::Mapping => f.write_str(MAPPING_TAG),
			TypeDecl::Object(name) => f.write_str(name),
			TypeDecl::Sequence(element) => write!(f, "{SEQUENCE_CONTAINER};{element}"),
			TypeDecl::Optional(element) => write!(f, "{OPTIONAL_CONTAINER};{element}"),
			TypeDecl::Unsupported => f.write_str(OBJECT_TAG),
		}
	}
}

impl FromStr for TypeDecl {
	type Err = BindError;

	fn from_str(text: &str) -> Result<Self, Self::Err> {
		parse_type_decl(text.trim()).ok_or_else(|| BindError::InvalidTypeDecl { text: text.to_owned() })
	}
}

fn parse_type_decl(text: &str) -> Option<TypeDecl> {
	let mut sequences = Vec::new();
	let mut rest = text;
	while let Some((container, element)) = split_container(rest) {
		if sequences.len() == MAX_DECL_DEPTH {
			return None;
		}
		match container {
			SEQUENCE_CONTAINER => sequences.push(true),
			OPTIONAL_CONTAINER => sequences.push(false),
			_ => return None,
		}
		rest = element.trim();
	}

	let leaf = match rest {
		"" => return None,
		"Int" => TypeDecl::Int,
		"Float" | NUMBER_TAG => TypeDecl::Float,
		"Bool" => TypeDecl::Bool,
		"String" | STRING_TAG => TypeDecl::String,
		MAPPING_TAG => TypeDecl::Mapping,
		OBJECT_TAG => TypeDecl::Unsupported,
		name if name.contains(['<', '>', ';']) => return None,
		name => TypeDecl::object(name),
	};
	let decl = sequences.into_iter().rev().fold(leaf, |element, sequence| {
		if sequence {
			TypeDecl::sequence(element)
		} else {
			TypeDecl::optional(element)
		}
	});
	Some(decl)
}

/// Split `Array;Elem` or the legacy `Array<Elem>` into container and element.
fn split_container(text: &str) -> Option<(&str, &str)> {
	let semi = text.find(';');
	let angle = text.find('<');
	match (semi, angle) {
		(Some(semi), Some(angle)) if angle < semi => split_angle(text, angle),
		(Some(semi), _) => Some((&text[..semi], &text[semi + 1..])),
		(None, Some(angle)) => split_angle(text, angle),
		(None, None) => None,
	}
}

fn split_angle(text: &str, open: usize) -> Option<(&str, &str)> {
	let inner = text[open + 1..].strip_suffix('>')?;
	Some((&text[..open], inner))
}

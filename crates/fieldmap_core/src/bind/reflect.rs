use std::any::Any;
use std::fmt;

use crate::bind::{Mapping, TypeDecl};

/// Introspection contract for a bindable object.
///
/// Implementations list their own fields in declaration order and expose the
/// ancestor field group, if any, through [`Reflect::base`]. Most types get this
/// from [`reflect_record!`](crate::reflect_record).
pub trait Reflect: Any {
	/// Bare runtime type name, without application namespace.
	fn type_name(&self) -> &'static str;

	/// Own fields in declaration order.
	fn fields(&self) -> Vec<(&'static str, &dyn Field)>;

	/// Own fields in declaration order, mutably.
	fn fields_mut(&mut self) -> Vec<(&'static str, &mut dyn Field)>;

	/// Ancestor field group, flattened in front of the own fields.
	fn base(&self) -> Option<&dyn Reflect> {
		None
	}

	/// Ancestor field group, mutably.
	fn base_mut(&mut self) -> Option<&mut dyn Reflect> {
		None
	}

	/// Upcast for downcasting by reference.
	fn as_any(&self) -> &dyn Any;

	/// Upcast for downcasting an owned box.
	fn into_any(self: Box<Self>) -> Box<dyn Any>;
}

impl fmt::Debug for dyn Reflect {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		f.debug_struct("dyn Reflect").field("type_name", &self.type_name()).finish_non_exhaustive()
	}
}

/// Constructible reflectable type with a static name.
pub trait Record: Reflect + Default + Sized {
	/// Bare type name, equal to [`Reflect::type_name`].
	const TYPE_NAME: &'static str;
}

/// Borrowed native view of one field's current value.
pub enum Raw<'a> {
	/// Optional slot with no payload; carries the wrapped declaration.
	Absent(TypeDecl),
	/// Boolean.
	Bool(bool),
	/// Any integer width, widened.
	Int(i64),
	/// Unsigned integer above `i64::MAX`.
	UInt(u64),
	/// Any float width, widened.
	Float(f64),
	/// String slice.
	Str(&'a str),
	/// Raw dynamic sub-document.
	Map(&'a Mapping),
	/// Nested record.
	Object(&'a dyn Reflect),
	/// Sequence of nested records plus the element declaration.
	Objects(Vec<&'a dyn Reflect>, TypeDecl),
	/// Value matching no coercion rule; carries its Rust type name.
	Unsupported(&'static str),
}

/// Owned native value ready to be assigned to a field.
pub enum Native {
	/// Clear to the unset representation.
	Null,
	/// Boolean.
	Bool(bool),
	/// Integer, narrowed by the receiving field.
	Int(i64),
	/// Unsigned integer above `i64::MAX`, narrowed by the receiving field.
	UInt(u64),
	/// Float, narrowed by the receiving field.
	Float(f64),
	/// Owned string.
	Str(String),
	/// Raw dynamic sub-document.
	Map(Mapping),
	/// Reconstructed nested record.
	Object(Box<dyn Reflect>),
	/// Reconstructed records in input order.
	Objects(Vec<Box<dyn Reflect>>),
}

impl Native {
	/// Short kind label used in rejection messages.
	pub fn kind(&self) -> &'static str {
		match self {
			Native::Null => "null",
			Native::Bool(_) => "bool",
			Native::Int(_) | Native::UInt(_) => "int",
			Native::Float(_) => "float",
			Native::Str(_) => "string",
			Native::Map(_) => "mapping",
			Native::Object(_) => "object",
			Native::Objects(_) => "sequence",
		}
	}
}

/// Reason a field refused an assignment.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Rejected(pub String);

impl Rejected {
	/// Rejection for a value kind the field cannot hold.
	pub fn mismatch(expected: &TypeDecl, got: &Native) -> Self {
		Rejected(format!("expected {expected}, got {}", got.kind()))
	}
}

impl fmt::Display for Rejected {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		f.write_str(&self.0)
	}
}

/// One settable, readable field slot.
pub trait Field {
	/// Declared type without an instance.
	fn decl() -> TypeDecl
	where
		Self: Sized;

	/// Declared type of this slot.
	fn declared(&self) -> TypeDecl;

	/// Current value as a borrowed native view.
	fn raw(&self) -> Raw<'_>;

	/// Validate and store an incoming value.
	///
	/// `Native::Null` on a non-optional slot leaves the current value untouched.
	fn assign(&mut self, value: Native) -> Result<(), Rejected>;
}

macro_rules! int_field {
	($($ty:ty),* $(,)?) => {$(
		impl Field for $ty {
			fn decl() -> TypeDecl {
				TypeDecl::Int
			}

			fn declared(&self) -> TypeDecl {
				TypeDecl::Int
			}

			fn raw(&self) -> Raw<'_> {
				match i64::try_from(*self) {
					Ok(value) => Raw::Int(value),
					Err(_) => Raw::UInt(*self as u64),
				}
			}

			fn assign(&mut self, value: Native) -> Result<(), Rejected> {
				match value {
					Native::Null => Ok(()),
					Native::Int(int) => {
						*self = <$ty>::try_from(int).map_err(|_| Rejected(format!("{int} out of range for {}", stringify!($ty))))?;
						Ok(())
					}
					Native::UInt(int) => {
						*self = <$ty>::try_from(int).map_err(|_| Rejected(format!("{int} out of range for {}", stringify!($ty))))?;
						Ok(())
					}
					other => Err(Rejected::mismatch(&TypeDecl::Int, &other)),
				}
			}
		}
	)*};
}

int_field!(i8, i16, i32, i64, isize, u8, u16, u32, u64, usize);

macro_rules! float_field {
	($($ty:ty),* $(,)?) => {$(
		impl Field for $ty {
			fn decl() -> TypeDecl {
				TypeDecl::Float
			}

			fn declared(&self) -> TypeDecl {
				TypeDecl::Float
			}

			fn raw(&self) -> Raw<'_> {
				Raw::Float(f64::from(*self))
			}

			fn assign(&mut self, value: Native) -> Result<(), Rejected> {
				match value {
					Native::Null => Ok(()),
					Native::Float(float) => {
						*self = float as $ty;
						Ok(())
					}
					other => Err(Rejected::mismatch(&TypeDecl::Float, &other)),
				}
			}
		}
	)*};
}

float_field!(f32, f64);

impl Field for bool {
	fn decl() -> TypeDecl {
		TypeDecl::Bool
	}

	fn declared(&self) -> TypeDecl {
		TypeDecl::Bool
	}

	fn raw(&self) -> Raw<'_> {
		Raw::Bool(*self)
	}

	fn assign(&mut self, value: Native) -> Result<(), Rejected> {
		match value {
			Native::Null => Ok(()),
			Native::Bool(flag) => {
				*self = flag;
				Ok(())
			}
			other => Err(Rejected::mismatch(&TypeDecl::Bool, &other)),
		}
	}
}

impl Field for String {
	fn decl() -> TypeDecl {
		TypeDecl::String
	}

	fn declared(&self) -> TypeDecl {
		TypeDecl::String
	}

	fn raw(&self) -> Raw<'_> {
		Raw::Str(self)
	}

	fn assign(&mut self, value: Native) -> Result<(), Rejected> {
		match value {
			Native::Null => Ok(()),
			Native::Str(text) => {
				*self = text;
				Ok(())
			}
			other => Err(Rejected::mismatch(&TypeDecl::String, &other)),
		}
	}
}

impl Field for Mapping {
	fn decl() -> TypeDecl {
		TypeDecl::Mapping
	}

	fn declared(&self) -> TypeDecl {
		TypeDecl::Mapping
	}

	fn raw(&self) -> Raw<'_> {
		Raw::Map(self)
	}

	fn assign(&mut self, value: Native) -> Result<(), Rejected> {
		match value {
			Native::Null => Ok(()),
			Native::Map(map) => {
				*self = map;
				Ok(())
			}
			other => Err(Rejected::mismatch(&TypeDecl::Mapping, &other)),
		}
	}
}

impl<T: Field + Default> Field for Option<T> {
	fn decl() -> TypeDecl {
		TypeDecl::optional(T::decl())
	}

	fn declared(&self) -> TypeDecl {
		Self::decl()
	}

	fn raw(&self) -> Raw<'_> {
		match self {
			Some(inner) => inner.raw(),
			None => Raw::Absent(T::decl()),
		}
	}

	fn assign(&mut self, value: Native) -> Result<(), Rejected> {
		if let Native::Null = value {
			*self = None;
			return Ok(());
		}
		let was_set = self.is_some();
		let mut inner = self.take().unwrap_or_default();
		let outcome = inner.assign(value);
		if outcome.is_ok() || was_set {
			*self = Some(inner);
		}
		outcome
	}
}

impl<T: Record> Field for Vec<T> {
	fn decl() -> TypeDecl {
		TypeDecl::sequence(TypeDecl::object(T::TYPE_NAME))
	}

	fn declared(&self) -> TypeDecl {
		Self::decl()
	}

	fn raw(&self) -> Raw<'_> {
		let items = self.iter().map(|item| item as &dyn Reflect).collect();
		Raw::Objects(items, TypeDecl::object(T::TYPE_NAME))
	}

	fn assign(&mut self, value: Native) -> Result<(), Rejected> {
		match value {
			Native::Null => Ok(()),
			Native::Objects(items) => {
				let mut out = Vec::with_capacity(items.len());
				for item in items {
					out.push(downcast_record::<T>(item)?);
				}
				*self = out;
				Ok(())
			}
			other => Err(Rejected::mismatch(&Self::decl(), &other)),
		}
	}
}

/// Field wrapper for a value the binder passes over.
///
/// Converting reports an unsupported value kind and writes `Null`; rebuilding
/// never overwrites it.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Opaque<T>(pub T);

impl<T: 'static> Field for Opaque<T> {
	fn decl() -> TypeDecl {
		TypeDecl::Unsupported
	}

	fn declared(&self) -> TypeDecl {
		TypeDecl::Unsupported
	}

	fn raw(&self) -> Raw<'_> {
		Raw::Unsupported(std::any::type_name::<T>())
	}

	fn assign(&mut self, value: Native) -> Result<(), Rejected> {
		match value {
			Native::Null => Ok(()),
			other => Err(Rejected::mismatch(&TypeDecl::Unsupported, &other)),
		}
	}
}

/// `Field::raw` for a nested record slot.
pub fn object_raw<T: Record>(value: &T) -> Raw<'_> {
	Raw::Object(value)
}

/// `Field::assign` for a nested record slot.
pub fn object_assign<T: Record>(slot: &mut T, value: Native) -> Result<(), Rejected> {
	match value {
		Native::Null => Ok(()),
		Native::Object(object) => {
			*slot = downcast_record::<T>(object)?;
			Ok(())
		}
		other => Err(Rejected::mismatch(&TypeDecl::object(T::TYPE_NAME), &other)),
	}
}

fn downcast_record<T: Record>(object: Box<dyn Reflect>) -> Result<T, Rejected> {
	let got = object.type_name();
	object
		.into_any()
		.downcast::<T>()
		.map(|boxed| *boxed)
		.map_err(|_| Rejected(format!("expected {}, got {got}", T::TYPE_NAME)))
}

/// One entry of a flattened field list.
pub struct FieldSlot<'a> {
	/// Field identifier.
	pub name: &'static str,
	/// Field slot.
	pub field: &'a dyn Field,
}

/// Flatten a value's field list, ancestor fields first.
///
/// A name declared on both a descendant and an ancestor appears once, at the
/// ancestor's position, with the descendant's slot.
pub fn reflect_fields(value: &dyn Reflect) -> Vec<FieldSlot<'_>> {
	let mut out: Vec<FieldSlot<'_>> = match value.base() {
		Some(base) => reflect_fields(base),
		None => Vec::new(),
	};

	for (name, field) in value.fields() {
		match out.iter_mut().find(|slot| slot.name == name) {
			Some(slot) => slot.field = field,
			None => out.push(FieldSlot { name, field }),
		}
	}
	out
}

/// Find a settable field by name, searching own fields before the ancestor chain.
pub fn field_mut<'a>(value: &'a mut dyn Reflect, name: &str) -> Option<&'a mut dyn Field> {
	if value.fields().iter().any(|(own, _)| *own == name) {
		return value.fields_mut().into_iter().find(|(own, _)| *own == name).map(|(_, field)| field);
	}
	field_mut(value.base_mut()?, name)
}

/// Generic empty instance returned for the base object type name.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct BaseObject;

impl Reflect for BaseObject {
	fn type_name(&self) -> &'static str {
		crate::bind::BASE_OBJECT
	}

	fn fields(&self) -> Vec<(&'static str, &dyn Field)> {
		Vec::new()
	}

	fn fields_mut(&mut self) -> Vec<(&'static str, &mut dyn Field)> {
		Vec::new()
	}

	fn as_any(&self) -> &dyn Any {
		self
	}

	fn into_any(self: Box<Self>) -> Box<dyn Any> {
		self
	}
}

impl Record for BaseObject {
	const TYPE_NAME: &'static str = crate::bind::BASE_OBJECT;
}

/// Implement [`Reflect`], [`Record`], and [`Field`] for a struct.
///
/// ```
/// use fieldmap::reflect_record;
///
/// #[derive(Debug, Default)]
/// struct Animal {
/// 	name: String,
/// 	legs: i64,
/// }
///
/// #[derive(Debug, Default)]
/// struct Dog {
/// 	base: Animal,
/// 	legs: i64,
/// 	good: bool,
/// }
///
/// reflect_record!(Animal { name, legs });
/// reflect_record!(Dog extends base { legs, good });
/// ```
#[macro_export]
macro_rules! reflect_record {
	(@impl $ty:ident { $($field:ident),* } { $($extra:tt)* }) => {
		impl $crate::bind::Reflect for $ty {
			fn type_name(&self) -> &'static str {
				stringify!($ty)
			}

			fn fields(&self) -> ::std::vec::Vec<(&'static str, &dyn $crate::bind::Field)> {
				::std::vec![$((stringify!($field), &self.$field as &dyn $crate::bind::Field)),*]
			}

			fn fields_mut(&mut self) -> ::std::vec::Vec<(&'static str, &mut dyn $crate::bind::Field)> {
				::std::vec![$((stringify!($field), &mut self.$field as &mut dyn $crate::bind::Field)),*]
			}

			$($extra)*

			fn as_any(&self) -> &dyn ::std::any::Any {
				self
			}

			fn into_any(self: ::std::boxed::Box<Self>) -> ::std::boxed::Box<dyn ::std::any::Any> {
				self
			}
		}

		impl $crate::bind::Record for $ty {
			const TYPE_NAME: &'static str = stringify!($ty);
		}

		impl $crate::bind::Field for $ty {
			fn decl() -> $crate::bind::TypeDecl {
				$crate::bind::TypeDecl::object(stringify!($ty))
			}

			fn declared(&self) -> $crate::bind::TypeDecl {
				$crate::bind::TypeDecl::object(stringify!($ty))
			}

			fn raw(&self) -> $crate::bind::Raw<'_> {
				$crate::bind::object_raw(self)
			}

			fn assign(&mut self, value: $crate::bind::Native) -> ::std::result::Result<(), $crate::bind::Rejected> {
				$crate::bind::object_assign(self, value)
			}
		}
	};
	($ty:ident extends $base:ident { $($field:ident),* $(,)? }) => {
		$crate::reflect_record!(@impl $ty { $($field),* } {
			fn base(&self) -> ::std::option::Option<&dyn $crate::bind::Reflect> {
				::std::option::Option::Some(&self.$base as &dyn $crate::bind::Reflect)
			}

			fn base_mut(&mut self) -> ::std::option::Option<&mut dyn $crate::bind::Reflect> {
				::std::option::Option::Some(&mut self.$base as &mut dyn $crate::bind::Reflect)
			}
		});
	};
	($ty:ident { $($field:ident),* $(,)? }) => {
		$crate::reflect_record!(@impl $ty { $($field),* } {});
	};
}

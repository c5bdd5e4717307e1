use std::any::TypeId;
use std::borrow::Cow;
use std::collections::HashMap;
use std::collections::hash_map::Entry;
use std::sync::OnceLock;

use parking_lot::RwLock;
use tracing::{debug, warn};

use crate::bind::{BaseObject, BindError, Record, Reflect, Result};

/// Type name that always resolves to a generic empty instance.
pub const BASE_OBJECT: &str = "Object";
/// Environment variable that overrides the application namespace.
pub const NAMESPACE_ENV: &str = "FIELDMAP_NAMESPACE";
/// Namespace used when nothing else is available.
pub const DEFAULT_NAMESPACE: &str = "app";

/// Constructible type known to a registry.
#[derive(Debug, Clone)]
pub struct TypeDescriptor {
	/// Namespace-qualified name, e.g. `shop.Invoice`.
	pub name: Box<str>,
	/// Bare runtime type name, e.g. `Invoice`.
	pub bare: &'static str,
	type_id: TypeId,
	factory: fn() -> Box<dyn Reflect>,
}

impl TypeDescriptor {
	/// Rust type the factory builds.
	pub fn rust_type(&self) -> TypeId {
		self.type_id
	}

	/// Build a fresh default instance.
	pub fn construct(&self) -> Box<dyn Reflect> {
		(self.factory)()
	}
}

fn build_default<T: Record>() -> Box<dyn Reflect> {
	Box::new(T::default())
}

/// Name-to-factory table used to rebuild typed objects.
#[derive(Debug)]
pub struct TypeRegistry {
	namespace: Box<str>,
	types: HashMap<Box<str>, TypeDescriptor>,
}

impl TypeRegistry {
	/// Create an empty registry that qualifies bare names with `namespace`.
	pub fn new(namespace: impl Into<Box<str>>) -> Self {
		Self {
			namespace: namespace.into(),
			types: HashMap::new(),
		}
	}

	/// Namespace prefixed onto bare type names.
	pub fn namespace(&self) -> &str {
		&self.namespace
	}

	/// Number of registered types.
	pub fn len(&self) -> usize {
		self.types.len()
	}

	/// Whether no types are registered.
	pub fn is_empty(&self) -> bool {
		self.types.is_empty()
	}

	/// Register `T` under the registry namespace. Re-registering is a no-op.
	pub fn register<T: Record>(&mut self) -> &TypeDescriptor {
		let name = format!("{}.{}", self.namespace, T::TYPE_NAME);
		self.insert::<T>(name)
	}

	/// Register `T` under an explicit, already qualified name.
	pub fn register_as<T: Record>(&mut self, qualified: &str) -> &TypeDescriptor {
		self.insert::<T>(qualified.to_owned())
	}

	/// Builder-style [`TypeRegistry::register`].
	pub fn with<T: Record>(mut self) -> Self {
		self.register::<T>();
		self
	}

	fn insert<T: Record>(&mut self, name: String) -> &TypeDescriptor {
		match self.types.entry(name.clone().into_boxed_str()) {
			Entry::Occupied(slot) => {
				let existing = slot.into_mut();
				if existing.type_id != TypeId::of::<T>() {
					warn!(name = %existing.name, kept = existing.bare, "a different type is already registered under this name, keeping the first");
				}
				existing
			}
			Entry::Vacant(slot) => slot.insert(TypeDescriptor {
				name: name.into_boxed_str(),
				bare: T::TYPE_NAME,
				type_id: TypeId::of::<T>(),
				factory: build_default::<T>,
			}),
		}
	}

	/// Qualify a bare name with the namespace; dotted names pass through.
	pub fn qualify<'a>(&self, name: &'a str) -> Cow<'a, str> {
		if name.contains('.') {
			Cow::Borrowed(name)
		} else {
			Cow::Owned(format!("{}.{}", self.namespace, name))
		}
	}

	/// Resolve a bare or qualified type name.
	pub fn resolve(&self, name: &str) -> Result<&TypeDescriptor> {
		let qualified = self.qualify(name);
		self.types.get(qualified.as_ref()).ok_or_else(|| BindError::TypeNotFound { name: name.to_owned() })
	}

	/// Construct a default instance of a bare or qualified type name.
	pub fn construct(&self, name: &str) -> Result<Box<dyn Reflect>> {
		if name == BASE_OBJECT {
			return Ok(Box::new(BaseObject));
		}
		Ok(self.resolve(name)?.construct())
	}

	/// Strip this registry's namespace from a qualified type name.
	///
	/// A dot left after stripping means the name came from another namespace;
	/// the last segment is returned.
	pub fn short_name<'a>(&self, name: &'a str) -> &'a str {
		let stripped = name
			.strip_prefix(&*self.namespace)
			.and_then(|rest| rest.strip_prefix('.'))
			.unwrap_or(name);
		match stripped.rsplit_once('.') {
			Some((_, last)) => {
				warn!(name, namespace = %self.namespace, "type name carries a foreign namespace");
				last
			}
			None => stripped,
		}
	}
}

/// Application namespace, resolved once per process.
///
/// Taken from `FIELDMAP_NAMESPACE`, then the running executable's file stem,
/// then [`DEFAULT_NAMESPACE`]. Spaces become underscores.
pub fn app_namespace() -> &'static str {
	static NAMESPACE: OnceLock<String> = OnceLock::new();
	NAMESPACE.get_or_init(|| {
		let raw = std::env::var(NAMESPACE_ENV)
			.ok()
			.filter(|value| !value.trim().is_empty())
			.or_else(executable_stem)
			.unwrap_or_else(|| DEFAULT_NAMESPACE.to_owned());
		let namespace = clean_namespace(&raw);
		debug!(namespace, "resolved application namespace");
		namespace
	})
}

fn executable_stem() -> Option<String> {
	let exe = std::env::current_exe().ok()?;
	let stem = exe.file_stem()?.to_str()?;
	(!stem.is_empty()).then(|| stem.to_owned())
}

fn clean_namespace(raw: &str) -> String {
	raw.trim().replace(' ', "_")
}

/// Process-wide registry, created on first use with [`app_namespace`].
pub fn global() -> &'static RwLock<TypeRegistry> {
	static GLOBAL: OnceLock<RwLock<TypeRegistry>> = OnceLock::new();
	GLOBAL.get_or_init(|| RwLock::new(TypeRegistry::new(app_namespace())))
}

/// Register `T` in the process-wide registry.
pub fn register<T: Record>() {
	global().write().register::<T>();
}

/// Strip the application namespace from a qualified type name.
pub fn short_type_name(name: &str) -> &str {
	global().read().short_name(name)
}

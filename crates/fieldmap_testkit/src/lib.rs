//! Shared fixtures and helpers for workspace tests.

use std::path::{Path, PathBuf};

use fieldmap::bind::{Mapping, TypeRegistry, from_json_text};
use fieldmap::reflect_record;

/// Namespace used by [`registry`].
pub const NAMESPACE: &str = "fixtures";

/// Postal address.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Address {
	/// City name.
	pub city: String,
}

/// Person with an optional nested address.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Person {
	/// Display name.
	pub name: String,
	/// Age in years.
	pub age: i64,
	/// Home address, when known.
	pub address: Option<Address>,
}

/// Single invoice line item.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Invoice {
	/// Invoice number.
	pub number: String,
	/// Total amount.
	pub amount: f64,
	/// Whether the invoice is settled.
	pub paid: bool,
}

/// Customer owning an ordered list of invoices.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Customer {
	/// Customer name.
	pub name: String,
	/// Invoices in issue order.
	pub invoices: Vec<Invoice>,
	/// Billing address.
	pub billing: Option<Address>,
	/// Free-form note.
	pub note: Option<String>,
}

/// Base of the inheritance fixture.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Animal {
	/// Animal name.
	pub name: String,
	/// Leg count.
	pub legs: i64,
}

/// Derived fixture that redeclares `legs` and adds `good`.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Dog {
	/// Ancestor field group.
	pub base: Animal,
	/// Redeclared leg count.
	pub legs: i64,
	/// Whether the dog is good.
	pub good: bool,
}

reflect_record!(Address { city });
reflect_record!(Person { name, age, address });
reflect_record!(Invoice { number, amount, paid });
reflect_record!(Customer { name, invoices, billing, note });
reflect_record!(Animal { name, legs });
reflect_record!(Dog extends base { legs, good });

/// Registry holding every fixture type under [`NAMESPACE`].
pub fn registry() -> TypeRegistry {
	TypeRegistry::new(NAMESPACE)
		.with::<Address>()
		.with::<Person>()
		.with::<Invoice>()
		.with::<Customer>()
		.with::<Animal>()
		.with::<Dog>()
}

/// `Person { name: "Ann", age: 30, address: None }`.
pub fn ann() -> Person {
	Person {
		name: "Ann".into(),
		age: 30,
		address: None,
	}
}

/// Customer with three invoices in a fixed order.
pub fn customer() -> Customer {
	Customer {
		name: "Acme".into(),
		invoices: vec![
			Invoice {
				number: "INV-1".into(),
				amount: 10.5,
				paid: true,
			},
			Invoice {
				number: "INV-2".into(),
				amount: 20.0,
				paid: false,
			},
			Invoice {
				number: "INV-3".into(),
				amount: 7.25,
				paid: true,
			},
		],
		billing: Some(Address { city: "Oslo".into() }),
		note: None,
	}
}

/// Resolve the workspace root path.
pub fn workspace_root() -> PathBuf {
	let manifest_dir = Path::new(env!("CARGO_MANIFEST_DIR"));
	manifest_dir
		.join("..")
		.join("..")
		.canonicalize()
		.unwrap_or_else(|_| manifest_dir.join("..").join(".."))
}

/// Resolve a fixture path under `<workspace>/fixtures`.
pub fn fixture_path(name: &str) -> PathBuf {
	workspace_root().join("fixtures").join(name)
}

/// Read a fixture file as text.
pub fn load_fixture(name: &str) -> String {
	let path = fixture_path(name);
	std::fs::read_to_string(&path).unwrap_or_else(|err| panic!("read fixture {}: {err}", path.display()))
}

/// Read a fixture whose top level is a JSON object.
pub fn load_mapping(name: &str) -> Mapping {
	from_json_text(&load_fixture(name)).unwrap_or_else(|err| panic!("decode fixture {name}: {err}"))
}

/// Parse JSON text into an order-insensitive `serde_json::Value` for comparisons.
pub fn json_value(text: &str) -> serde_json::Value {
	serde_json::from_str(text).unwrap_or_else(|err| panic!("parse json: {err}"))
}

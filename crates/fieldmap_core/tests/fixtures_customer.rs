#![allow(missing_docs)]

use fieldmap::bind::{BindError, ConvertOptions, Converter, TypeRegistry, Value, from_json_text, structural_hash};
use fieldmap_testkit::{Address, Customer, Invoice, customer, load_fixture, load_mapping, registry};

#[test]
fn customer_mapping_matches_fixture() {
	let registry = registry();
	let conversion = Converter::new(&registry, ConvertOptions::default()).to_mapping(&customer());

	assert_eq!(conversion.mapping, load_mapping("customer.json"));
	assert_eq!(conversion.types.get("invoices"), Some("Array;Invoice"));
	assert_eq!(conversion.types.get("billing"), Some("Address"));
	assert_eq!(conversion.types.get("note"), Some("String"));
	assert_eq!(conversion.mapping.get("note"), Some(&Value::Null));
}

#[test]
fn invoice_sequence_round_trips_in_order() {
	let registry = registry();
	let converter = Converter::new(&registry, ConvertOptions::default());
	let original = customer();

	let conversion = converter.to_mapping(&original);
	let invoices = conversion.mapping.get("invoices").and_then(Value::as_array).expect("invoices flatten to an array");
	assert_eq!(invoices.len(), 3);

	let rebuilt = converter.from_mapping(&conversion.mapping, "Customer").expect("Customer is registered");
	assert!(rebuilt.issues.is_empty(), "unexpected issues: {:?}", rebuilt.issues);
	let back = rebuilt.value.as_any().downcast_ref::<Customer>().expect("rebuilt a Customer");
	assert_eq!(back, &original);
	assert_eq!(structural_hash(back), structural_hash(&original));
}

#[test]
fn json_text_is_idempotent_for_customer() {
	let registry = registry();
	let converter = Converter::new(&registry, ConvertOptions::default());
	let mapping = converter.to_mapping(&customer()).mapping;

	let text = converter.object_to_json(&customer()).expect("customer encodes");
	assert_eq!(from_json_text(&text).expect("customer decodes"), mapping);

	let rebuilt = converter.object_from_json(&text, "Customer").expect("Customer is registered");
	let back = rebuilt.value.as_any().downcast_ref::<Customer>().expect("rebuilt a Customer");
	assert_eq!(back, &customer());
}

#[test]
fn typed_array_decode_skips_non_objects() {
	let registry = registry();
	let converter = Converter::new(&registry, ConvertOptions::default());
	let rebuilt = converter.array_from_json_as::<Invoice>(&load_fixture("invoices.json")).expect("array decodes");

	assert_eq!(
		rebuilt.value,
		vec![
			Invoice {
				number: "INV-7".into(),
				amount: 12.5,
				paid: true,
			},
			Invoice {
				number: "INV-8".into(),
				amount: 3.0,
				paid: false,
			},
		]
	);
	assert!(matches!(&rebuilt.issues[..], [BindError::ValidationRejected { field, .. }] if field == "[2]"));
}

#[test]
fn named_array_decode_uses_explicit_element_type() {
	let registry = registry();
	let converter = Converter::new(&registry, ConvertOptions::default());
	let text = load_fixture("invoices.json");

	let rebuilt = converter.array_from_json(&text, "Array;Invoice").expect("array decodes");
	let numbers: Vec<&str> = rebuilt
		.value
		.iter()
		.map(|item| item.as_any().downcast_ref::<Invoice>().expect("element is an Invoice").number.as_str())
		.collect();
	assert_eq!(numbers, ["INV-7", "INV-8"]);
	assert_eq!(rebuilt.issues.len(), 1);

	assert!(matches!(converter.array_from_json(&text, "Ghost"), Err(BindError::TypeNotFound { .. })));
	assert!(matches!(converter.object_from_json(&text, "Invoice"), Err(BindError::JsonShape { .. })));
}

#[test]
fn nested_type_tables_describe_address_and_invoices() {
	let registry = registry();
	let types = Converter::new(&registry, ConvertOptions::default()).to_mapping(&customer()).types;

	let billing = types.object("billing").expect("billing has a table");
	assert_eq!(billing.get("city"), Some("string"));
	for index in 0..3 {
		let invoice = types.element("invoices", index).expect("each invoice has a table");
		assert_eq!(invoice.get("amount"), Some("number"));
		assert_eq!(invoice.get("number"), Some("string"));
	}
}

#[test]
fn apply_without_invoice_type_keeps_invoices() {
	let registry = TypeRegistry::new("partial").with::<Customer>().with::<Address>();
	let converter = Converter::new(&registry, ConvertOptions::default());
	let mapping = converter.to_mapping(&customer()).mapping;
	let mut target = customer();

	let issues = converter.apply(&mut target, &mapping);

	assert_eq!(target, customer());
	assert!(matches!(&issues[..], [BindError::TypeNotFound { name }] if name == "Invoice"));
}

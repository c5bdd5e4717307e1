#![allow(missing_docs)]

use fieldmap::bind::{app_namespace, from_mapping, from_mapping_as, object_from_json, object_to_json, register, short_type_name, to_mapping};
use fieldmap_testkit::{Address, Person, ann};

fn register_fixtures() {
	register::<Person>();
	register::<Address>();
}

#[test]
fn global_registry_rebuilds_registered_types() {
	register_fixtures();
	let person = Person {
		address: Some(Address { city: "NY".into() }),
		..ann()
	};

	let conversion = to_mapping(&person);
	let rebuilt = from_mapping(&conversion.mapping, "Person").expect("Person is registered globally");
	let back = rebuilt.value.as_any().downcast_ref::<Person>().expect("rebuilt a Person");
	assert_eq!(back, &person);

	let typed = from_mapping_as::<Person>(&conversion.mapping);
	assert_eq!(typed.value, person);
}

#[test]
fn global_json_helpers_round_trip() {
	register_fixtures();
	let text = object_to_json(&ann()).expect("person encodes");
	let rebuilt = object_from_json(&text, "Person").expect("person decodes");
	let back = rebuilt.value.as_any().downcast_ref::<Person>().expect("rebuilt a Person");
	assert_eq!(back, &ann());
}

#[test]
fn qualified_names_shorten_to_bare_names() {
	let qualified = format!("{}.Person", app_namespace());
	assert_eq!(short_type_name(&qualified), "Person");
	assert_eq!(short_type_name("Person"), "Person");
	assert_eq!(short_type_name("other.Person"), "Person");
}

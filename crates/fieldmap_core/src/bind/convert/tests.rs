use crate::bind::{BindError, ConvertOptions, Converter, Mapping, NestedTypes, Opaque, TypeRegistry, Value, equal};

#[derive(Debug, Default)]
struct Line {
	sku: String,
	qty: u32,
}

#[derive(Debug, Default)]
struct Order {
	id: i64,
	lines: Vec<Line>,
	note: Option<String>,
	extra: Mapping,
	handle: Opaque<(u8, u8)>,
}

#[derive(Debug, Default)]
struct Counter {
	hits: u64,
	small: u8,
}

#[derive(Debug, Default)]
struct Chain {
	depth: i64,
	next: Option<Box<Chain>>,
}

crate::reflect_record!(Line { sku, qty });
crate::reflect_record!(Order { id, lines, note, extra, handle });
crate::reflect_record!(Counter { hits, small });

impl crate::bind::Reflect for Chain {
	fn type_name(&self) -> &'static str {
		"Chain"
	}

	fn fields(&self) -> Vec<(&'static str, &dyn crate::bind::Field)> {
		let mut out: Vec<(&'static str, &dyn crate::bind::Field)> = vec![("depth", &self.depth as &dyn crate::bind::Field)];
		if let Some(next) = &self.next {
			out.push(("next", &**next as &dyn crate::bind::Field));
		}
		out
	}

	fn fields_mut(&mut self) -> Vec<(&'static str, &mut dyn crate::bind::Field)> {
		vec![("depth", &mut self.depth as &mut dyn crate::bind::Field)]
	}

	fn as_any(&self) -> &dyn std::any::Any {
		self
	}

	fn into_any(self: Box<Self>) -> Box<dyn std::any::Any> {
		self
	}
}

impl crate::bind::Field for Chain {
	fn decl() -> crate::bind::TypeDecl {
		crate::bind::TypeDecl::object("Chain")
	}

	fn declared(&self) -> crate::bind::TypeDecl {
		Self::decl()
	}

	fn raw(&self) -> crate::bind::Raw<'_> {
		crate::bind::Raw::Object(self)
	}

	fn assign(&mut self, _: crate::bind::Native) -> Result<(), crate::bind::Rejected> {
		Err(crate::bind::Rejected("read only".into()))
	}
}

fn registry() -> TypeRegistry {
	TypeRegistry::new("test").with::<Line>().with::<Order>()
}

fn order() -> Order {
	Order {
		id: 9,
		lines: vec![
			Line {
				sku: "a".into(),
				qty: 1,
			},
			Line {
				sku: "b".into(),
				qty: 2,
			},
		],
		note: None,
		extra: [("k", Value::from(true))].into_iter().collect(),
		handle: Opaque((1, 2)),
	}
}

#[test]
fn type_table_tracks_mapping_keys() {
	let registry = registry();
	let conversion = Converter::new(&registry, ConvertOptions::default()).to_mapping(&order());

	let keys: Vec<&str> = conversion.mapping.keys().collect();
	let typed: Vec<&str> = conversion.types.keys().collect();
	assert_eq!(keys, typed);
	assert_eq!(conversion.types.get("id"), Some("number"));
	assert_eq!(conversion.types.get("lines"), Some("Array;Line"));
	assert_eq!(conversion.types.get("note"), Some("String"));
	assert_eq!(conversion.types.get("extra"), Some("Mapping"));
	assert_eq!(conversion.types.get("handle"), Some("object"));
}

#[test]
fn unsupported_field_becomes_null_with_issue() {
	let registry = registry();
	let conversion = Converter::new(&registry, ConvertOptions::default()).to_mapping(&order());

	assert_eq!(conversion.mapping.get("handle"), Some(&Value::Null));
	assert_eq!(conversion.issues.len(), 1);
	assert!(matches!(&conversion.issues[0], BindError::UnsupportedValueKind { field, .. } if field == "handle"));
}

#[test]
fn raw_mapping_field_is_assigned_verbatim() {
	let registry = registry();
	let converter = Converter::new(&registry, ConvertOptions::default());
	let conversion = converter.to_mapping(&order());
	let rebuilt = converter.from_mapping_as::<Order>(&conversion.mapping);

	assert_eq!(rebuilt.value.extra.get("k"), Some(&Value::Bool(true)));
	assert_eq!(rebuilt.value.lines.len(), 2);
	assert_eq!(rebuilt.value.lines[1].sku, "b");
	assert_eq!(rebuilt.value.handle, Opaque((0, 0)));
	assert!(rebuilt.issues.is_empty(), "null into opaque is a no-op: {:?}", rebuilt.issues);
}

#[test]
fn unknown_keys_are_reported_only_when_asked() {
	let registry = registry();
	let mapping: Mapping = [("id", Value::from(1)), ("color", Value::from("red"))].into_iter().collect();

	let lenient = Converter::new(&registry, ConvertOptions::default()).from_mapping_as::<Order>(&mapping);
	assert!(lenient.issues.is_empty());
	assert_eq!(lenient.value.id, 1);

	let strict = Converter::new(&registry, ConvertOptions::strict_keys()).from_mapping_as::<Order>(&mapping);
	assert!(matches!(&strict.issues[..], [BindError::UnknownField { field, .. }] if field == "color"));
}

#[test]
fn non_mapping_sequence_element_is_skipped() {
	let registry = registry();
	let line: Mapping = [("sku", Value::from("z")), ("qty", Value::from(4))].into_iter().collect();
	let mapping: Mapping = [("lines", Value::Array(vec![Value::from(3), Value::Map(line)]))].into_iter().collect();

	let rebuilt = Converter::new(&registry, ConvertOptions::default()).from_mapping_as::<Order>(&mapping);
	assert_eq!(rebuilt.value.lines.len(), 1);
	assert_eq!(rebuilt.value.lines[0].qty, 4);
	assert!(matches!(&rebuilt.issues[..], [BindError::ValidationRejected { field, .. }] if field == "lines"));
}

#[test]
fn sequence_from_values_accepts_element_or_sequence_name() {
	let registry = registry();
	let converter = Converter::new(&registry, ConvertOptions::default());
	let line: Mapping = [("sku", Value::from("q"))].into_iter().collect();
	let values = vec![Value::Map(line.clone()), Value::Map(line)];

	let by_element = converter.sequence_from_values(&values, "Line").expect("element name resolves");
	let by_sequence = converter.sequence_from_values(&values, "Array;Line").expect("sequence name resolves");
	assert_eq!(by_element.value.len(), 2);
	assert_eq!(by_sequence.value.len(), 2);
	assert_eq!(by_sequence.value[0].type_name(), "Line");

	assert!(matches!(converter.sequence_from_values(&values, "Array;Ghost"), Err(BindError::TypeNotFound { .. })));
	assert!(matches!(converter.sequence_from_values(&values, "Int"), Err(BindError::InvalidTypeDecl { .. })));
}

#[test]
fn deep_nesting_degrades_to_null() {
	let mut chain = Chain::default();
	for depth in (0..5).rev() {
		chain = Chain {
			depth,
			next: Some(Box::new(chain)),
		};
	}

	let registry = registry();
	let options = ConvertOptions {
		max_depth: 2,
		..ConvertOptions::default()
	};
	let conversion = Converter::new(&registry, options).to_mapping(&chain);

	let first = conversion.mapping.get("next").and_then(Value::as_map).expect("depth 1 converts");
	let second = first.get("next").and_then(Value::as_map).expect("depth 2 converts");
	assert_eq!(second.get("next"), Some(&Value::Null));
	assert!(matches!(&conversion.issues[..], [BindError::DepthExceeded { max_depth: 2 }]));
}

#[test]
fn missing_root_type_is_an_error() {
	let registry = registry();
	let converter = Converter::new(&registry, ConvertOptions::default());
	let err = converter.from_mapping(&Mapping::new(), "Ghost").expect_err("Ghost is not registered");
	assert!(matches!(err, BindError::TypeNotFound { name } if name == "Ghost"));
}

#[test]
fn nested_type_tables_follow_the_mapping_tree() {
	let registry = registry();
	let conversion = Converter::new(&registry, ConvertOptions::default()).to_mapping(&order());

	let first = conversion.types.element("lines", 0).expect("first line has a table");
	assert_eq!(first.get("sku"), Some("string"));
	assert_eq!(first.get("qty"), Some("number"));
	assert!(conversion.types.element("lines", 2).is_none());
	assert_eq!(conversion.types.field("id").map(|field| &field.nested), Some(&NestedTypes::None));
	assert!(conversion.types.object("note").is_none());
}

#[test]
fn unsigned_beyond_signed_range_round_trips() {
	let registry = TypeRegistry::new("test").with::<Counter>();
	let converter = Converter::new(&registry, ConvertOptions::default());
	let original = Counter { hits: u64::MAX, small: 7 };

	let conversion = converter.to_mapping(&original);
	assert_eq!(conversion.mapping.get("hits"), Some(&Value::U64(u64::MAX)));

	let rebuilt = converter.from_mapping_as::<Counter>(&conversion.mapping);
	assert!(rebuilt.issues.is_empty(), "unexpected issues: {:?}", rebuilt.issues);
	assert_eq!(rebuilt.value.hits, u64::MAX);
	assert!(equal(&original, &rebuilt.value));
}

#[test]
fn unsigned_too_large_for_narrow_field_is_rejected() {
	let registry = TypeRegistry::new("test").with::<Counter>();
	let mapping: Mapping = [("small", Value::U64(u64::MAX))].into_iter().collect();

	let rebuilt = Converter::new(&registry, ConvertOptions::default()).from_mapping_as::<Counter>(&mapping);
	assert_eq!(rebuilt.value.small, 0);
	assert!(matches!(&rebuilt.issues[..], [BindError::ValidationRejected { field, .. }] if field == "small"));
}

#[test]
fn apply_keeps_sequence_when_element_type_is_unknown() {
	let registry = TypeRegistry::new("test").with::<Order>();
	let converter = Converter::new(&registry, ConvertOptions::default());
	let mapping = converter.to_mapping(&order()).mapping;
	let mut target = order();

	let issues = converter.apply(&mut target, &mapping);

	assert_eq!(target.lines.len(), 2);
	assert_eq!(target.lines[0].sku, "a");
	assert!(matches!(&issues[..], [BindError::TypeNotFound { name }] if name == "Line"));
}

#[test]
fn apply_keeps_sequence_when_no_element_rebuilds() {
	let registry = registry();
	let mapping: Mapping = [("lines", Value::Array(vec![Value::from(1), Value::from("x")]))].into_iter().collect();
	let mut target = order();

	let issues = Converter::new(&registry, ConvertOptions::default()).apply(&mut target, &mapping);

	assert_eq!(target.lines.len(), 2);
	assert_eq!(issues.len(), 2);
}

#[test]
fn empty_sequence_still_clears() {
	let registry = registry();
	let mapping: Mapping = [("lines", Value::Array(Vec::new()))].into_iter().collect();
	let mut target = order();

	let issues = Converter::new(&registry, ConvertOptions::default()).apply(&mut target, &mapping);

	assert!(issues.is_empty());
	assert!(target.lines.is_empty());
}

#![allow(missing_docs)]

use forceset::{FieldShape, Key, MapSeqMode, MapValue, RecordShape, SeqValue, SetError, SetOptions, Shape, Value, set, set_with};

#[test]
fn map_entries_coerce_into_destination_key_and_value_shapes() {
	let mut dest = Shape::map(Shape::Str, Shape::Int).zero();
	set(&mut dest, &Value::Map(int_keyed_source())).expect("map to map");

	let map = dest.as_map().expect("map");
	assert_eq!(map.get(&Key::from("1")), Some(&Value::I64(2)));
	assert_eq!(map.get(&Key::from("3")), Some(&Value::I64(4)));
}

#[test]
fn array_like_mode_places_entries_at_their_integer_index() {
	let mut dest = Shape::seq(Shape::Int).zero();
	set(&mut dest, &Value::Map(int_keyed_source())).expect("array-like");

	let seq = dest.as_seq().expect("seq");
	assert_eq!(seq.items, vec![Value::I64(0), Value::I64(2), Value::I64(0), Value::I64(4)]);
}

#[test]
fn array_like_mode_accepts_digit_string_keys() {
	let mut src = MapValue::new(Shape::Str, Shape::Str);
	src.insert(Key::from("2"), Value::from("9"));

	let mut dest = Shape::seq(Shape::Int).zero();
	set(&mut dest, &Value::Map(src)).expect("digit keys index");
	assert_eq!(dest.as_seq().expect("seq").items, vec![Value::I64(0), Value::I64(0), Value::I64(9)]);
}

#[test]
fn array_like_mode_rejects_non_numeric_keys() {
	let mut src = MapValue::new(Shape::Str, Shape::Str);
	src.insert(Key::from("nope"), Value::from("9"));

	let mut dest = Shape::seq(Shape::Int).zero();
	let err = set(&mut dest, &Value::Map(src)).expect_err("bad index");
	assert!(matches!(err, SetError::ScalarParse { target: "int", .. }));
}

#[test]
fn empty_maps_leave_sequence_destinations_untouched() {
	let mut dest = Value::Seq(SeqValue {
		elem: Shape::Int,
		items: vec![Value::I64(9)],
	});
	let empty = MapValue::new(Shape::Int, Shape::Str);
	set(&mut dest, &Value::Map(empty)).expect("no-op");
	assert_eq!(dest.as_seq().expect("seq").items, vec![Value::I64(9)]);
}

#[test]
fn pairs_mode_emits_one_element_per_entry_in_source_order() {
	let opt = SetOptions::new().map_seq_mode(MapSeqMode::Pairs);

	let mut dest = Shape::seq(pair_shape()).zero();
	set_with(&mut dest, &Value::Map(int_keyed_source()), &opt).expect("pairs");

	let seq = dest.as_seq().expect("seq");
	let rendered: Vec<(String, String)> = seq
		.items
		.iter()
		.map(|item| {
			let record = item.as_record().expect("pair record");
			(
				record.field("Key").and_then(Value::as_str).expect("key").to_owned(),
				record.field("Value").and_then(Value::as_str).expect("value").to_owned(),
			)
		})
		.collect();
	assert_eq!(rendered, vec![("1".into(), "2".into()), ("3".into(), "4".into())]);
}

#[test]
fn pairs_mode_requires_two_visible_leading_fields() {
	let opt = SetOptions::new().map_seq_mode(MapSeqMode::Pairs);

	let narrow = Shape::record(RecordShape::new("Single", vec![FieldShape::new("Key", Shape::Str)]));
	let mut dest = Shape::seq(narrow).zero();
	let err = set_with(&mut dest, &Value::Map(int_keyed_source()), &opt).expect_err("one field");
	assert!(matches!(err, SetError::PairShapeInvalid { .. }));

	let embedded = Shape::record(RecordShape::new(
		"Bad",
		vec![
			FieldShape::new("Key", Shape::Str).embedded(),
			FieldShape::new("Value", Shape::Str),
		],
	));
	let mut dest = Shape::seq(embedded).zero();
	let err = set_with(&mut dest, &Value::Map(int_keyed_source()), &opt).expect_err("embedded lead");
	assert!(matches!(err, SetError::PairShapeInvalid { .. }));
}

#[test]
fn sequences_coerce_element_wise() {
	let src = Value::Seq(SeqValue {
		elem: Shape::Str,
		items: vec![Value::from("1"), Value::from("2")],
	});

	let mut dest = Shape::seq(Shape::Int).zero();
	set(&mut dest, &src).expect("elementwise");
	assert_eq!(dest.as_seq().expect("seq").items, vec![Value::I64(1), Value::I64(2)]);

	let mut dest = Shape::seq(Shape::any()).zero();
	set(&mut dest, &src).expect("dynamic elements");
	let seq = dest.as_seq().expect("seq");
	assert_eq!(seq.items[0].as_any(), Some(&Value::Str("1".into())));
}

#[test]
fn dynamic_map_values_contribute_their_inner_value() {
	let mut src = MapValue::new(Shape::Str, Shape::any());
	src.insert(Key::from("a"), Value::from(1));

	let mut dest = Shape::map(Shape::Str, Shape::Str).zero();
	set(&mut dest, &Value::Map(src)).expect("inner value converts");
	assert_eq!(dest.as_map().expect("map").get(&Key::from("a")), Some(&Value::Str("1".into())));
}

fn int_keyed_source() -> MapValue {
	let mut src = MapValue::new(Shape::Int, Shape::Str);
	src.insert(Key::I64(1), Value::from("2"));
	src.insert(Key::I64(3), Value::from("4"));
	src
}

fn pair_shape() -> Shape {
	Shape::record(RecordShape::new(
		"Pair",
		vec![
			FieldShape::new("Key", Shape::Str),
			FieldShape::new("Value", Shape::Str),
		],
	))
}

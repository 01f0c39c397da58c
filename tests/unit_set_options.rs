#![allow(missing_docs)]

use forceset::{FieldShape, Key, MapValue, RecordShape, SetError, SetOptions, Shape, Value, set_with};

#[test]
fn mappers_take_precedence_over_built_in_rules() {
	let opt = SetOptions::new().mapper(Shape::Int, Shape::Int, |dest, _src, _tag| {
		*dest = Value::I64(99);
		Ok(())
	});

	let mut dest = Value::I64(0);
	set_with(&mut dest, &Value::I64(5), &opt).expect("mapper runs");
	assert_eq!(dest, Value::I64(99));
}

#[test]
fn mappers_receive_the_raw_field_tag() {
	let timestamp = Shape::named("Timestamp", Shape::Int);
	let shape = Shape::record(RecordShape::new(
		"Event",
		vec![
			FieldShape::new("When", Shape::ptr(timestamp.clone())).tag("json", "when;format:seconds"),
			FieldShape::new("Next", Shape::ptr(timestamp.clone())),
		],
	));

	let opt = SetOptions::new().mapper(timestamp, Shape::Str, |dest, src, tag| {
		let format = tag
			.split(';')
			.find_map(|segment| segment.strip_prefix("format:"))
			.unwrap_or("seconds");
		assert_eq!(format, "seconds");

		let text = src.as_str().unwrap_or_default();
		let parsed = text.parse::<i64>().map_err(|_| SetError::ScalarParse {
			target: "timestamp",
			text: text.to_owned(),
		})?;
		*dest = Value::newtype("Timestamp", Value::I64(parsed));
		Ok(())
	});

	let mut src = MapValue::new(Shape::Str, Shape::any());
	src.insert(Key::from("when"), Value::from("1589905217"));

	let mut dest = shape.zero();
	set_with(&mut dest, &Value::Map(src), &opt).expect("mapper parses the directive");

	let record = dest.as_record().expect("record");
	assert_eq!(
		record.field("When").and_then(Value::pointee),
		Some(&Value::newtype("Timestamp", Value::I64(1589905217)))
	);
	// untouched optional fields stay nil
	assert_eq!(record.field("Next").and_then(Value::pointee), None);
}

#[test]
fn mapper_errors_propagate_verbatim() {
	let opt = SetOptions::new().mapper(Shape::Int, Shape::Str, |_dest, _src, _tag| {
		Err(SetError::custom(std::io::Error::other("refused")))
	});

	let mut dest = Value::I64(0);
	let err = set_with(&mut dest, &Value::from("5"), &opt).expect_err("mapper error");
	assert_eq!(err.to_string(), "refused");
}

#[test]
fn tag_keys_select_the_active_namespace() {
	let shape = Shape::record(RecordShape::new(
		"Row",
		vec![FieldShape::new("Id", Shape::Int).tag("db", "row_id")],
	));

	let mut src = MapValue::new(Shape::Str, Shape::any());
	src.insert(Key::from("row_id"), Value::from(4));

	// under the default json namespace the field falls back to its name
	let mut dest = shape.zero();
	set_with(&mut dest, &Value::Map(src.clone()), &SetOptions::new()).expect("fallback to name");
	assert_eq!(dest.as_record().and_then(|r| r.field("Id")), Some(&Value::I64(0)));

	let mut dest = shape.zero();
	set_with(&mut dest, &Value::Map(src), &SetOptions::new().tag_key("db")).expect("db tag");
	assert_eq!(dest.as_record().and_then(|r| r.field("Id")), Some(&Value::I64(4)));
}

#[test]
fn candidate_names_probe_in_order() {
	let shape = Shape::record(RecordShape::new(
		"Aliased",
		vec![FieldShape::new("Host", Shape::Str).tag("json", "hostname host")],
	));

	let mut src = MapValue::new(Shape::Str, Shape::any());
	src.insert(Key::from("host"), Value::from("fallback"));
	src.insert(Key::from("hostname"), Value::from("primary"));

	let mut dest = shape.zero();
	set_with(&mut dest, &Value::Map(src), &SetOptions::new()).expect("first candidate wins");
	assert_eq!(dest.as_record().and_then(|r| r.field("Host")), Some(&Value::Str("primary".into())));
}

#[test]
fn removing_the_decoder_disables_text_payloads() {
	let user = Shape::record(RecordShape::new("User", vec![FieldShape::new("Name", Shape::Str)]));

	let mut dest = user.zero();
	let err = set_with(&mut dest, &Value::from(r#"{"Name":"Peter"}"#), &SetOptions::new().no_decoder())
		.expect_err("no decoder configured");
	assert!(matches!(err, SetError::ShapeMismatch { .. }));
}

#[test]
fn replacement_decoders_are_invoked_with_raw_bytes() {
	let user = Shape::record(RecordShape::new("User", vec![FieldShape::new("Name", Shape::Str)]));

	let opt = SetOptions::new().decoder(std::sync::Arc::new(|data: &[u8], dest: &mut Value| {
		let text = String::from_utf8_lossy(data).into_owned();
		if let Value::Record(record) = dest {
			record.set_field("Name", Value::Str(text));
		}
		Ok(())
	}));

	let mut dest = user.zero();
	set_with(&mut dest, &Value::from("verbatim"), &opt).expect("custom decoder");
	assert_eq!(dest.as_record().and_then(|r| r.field("Name")), Some(&Value::Str("verbatim".into())));
}

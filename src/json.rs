use std::sync::Arc;

use crate::error::SetError;
use crate::options::Decoder;
use crate::shape::Shape;
use crate::value::{Key, MapValue, SeqValue, Value};

/// The default structured decoder: parses JSON text/bytes into a dynamic
/// value and coerces it into the destination under default options.
pub(crate) fn decoder() -> Decoder {
	Arc::new(|data: &[u8], dest: &mut Value| {
		let parsed: serde_json::Value = serde_json::from_slice(data).map_err(|err| SetError::Decode {
			source: Box::new(err),
		})?;
		crate::set::set(dest, &from_json(parsed))
	})
}

/// Convert a parsed JSON document into a dynamic value.
///
/// Objects become string-keyed mappings with dynamic values, arrays become
/// dynamic-element sequences, and numbers pick the narrowest of signed,
/// unsigned, and 64-bit float storage.
pub fn from_json(json: serde_json::Value) -> Value {
	match json {
		serde_json::Value::Null => Value::Null,
		serde_json::Value::Bool(v) => Value::Bool(v),
		serde_json::Value::Number(number) => {
			if let Some(v) = number.as_i64() {
				Value::I64(v)
			} else if let Some(v) = number.as_u64() {
				Value::U64(v)
			} else {
				Value::F64(number.as_f64().unwrap_or(0.0))
			}
		}
		serde_json::Value::String(text) => Value::Str(text),
		serde_json::Value::Array(items) => Value::Seq(SeqValue {
			elem: Shape::any(),
			items: items.into_iter().map(from_json).collect(),
		}),
		serde_json::Value::Object(entries) => {
			let mut map = MapValue::new(Shape::Str, Shape::any());
			for (key, value) in entries {
				map.insert(Key::Str(key), from_json(value));
			}
			Value::Map(map)
		}
	}
}

#[cfg(test)]
mod tests {
	use crate::value::{Key, Value};

	use super::from_json;

	#[test]
	fn objects_become_ordered_string_keyed_maps() {
		let json: serde_json::Value = serde_json::from_str(r#"{"b": 1, "a": "x"}"#).expect("valid json");
		let value = from_json(json);

		let map = value.as_map().expect("map value");
		assert_eq!(map.get(&Key::from("b")), Some(&Value::I64(1)));
		assert_eq!(map.get(&Key::from("a")), Some(&Value::Str("x".into())));
	}

	#[test]
	fn numbers_pick_the_narrowest_storage() {
		assert_eq!(from_json(serde_json::json!(-2)), Value::I64(-2));
		assert_eq!(from_json(serde_json::json!(u64::MAX)), Value::U64(u64::MAX));
		assert_eq!(from_json(serde_json::json!(0.5)), Value::F64(0.5));
	}

	#[test]
	fn null_and_arrays_map_through() {
		assert_eq!(from_json(serde_json::Value::Null), Value::Null);
		let seq = from_json(serde_json::json!([1, "two"]));
		let seq = seq.as_seq().expect("seq value");
		assert_eq!(seq.items.len(), 2);
	}
}

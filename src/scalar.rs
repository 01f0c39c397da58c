use base64::Engine as _;
use base64::engine::general_purpose::STANDARD as BASE64;

use crate::error::{Result, SetError};
use crate::options::{BytesMode, SetOptions};
use crate::value::Value;

/// Render any source value as text. Total: unsupported shapes fall back to
/// the value's generic rendering.
pub(crate) fn to_text(src: &Value, opt: &SetOptions) -> String {
	match src {
		Value::Str(text) => text.clone(),
		Value::Bool(v) => v.to_string(),
		Value::I64(v) => v.to_string(),
		Value::U64(v) => v.to_string(),
		Value::F32(v) => v.to_string(),
		Value::F64(v) => v.to_string(),
		Value::Bytes(data) => match opt.bytes {
			BytesMode::Base64 => BASE64.encode(data),
			_ => String::from_utf8_lossy(data).into_owned(),
		},
		other => other.to_string(),
	}
}

/// Convert a source value into a signed integer.
pub(crate) fn to_i64(src: &Value, opt: &SetOptions) -> Result<i64> {
	match src {
		Value::I64(v) => Ok(*v),
		Value::U64(v) => Ok(*v as i64),
		Value::F32(v) => Ok(*v as i64),
		Value::F64(v) => Ok(*v as i64),
		Value::Bool(v) => Ok(i64::from(*v)),
		Value::Str(text) => parse_int(text),
		Value::Bytes(data) => match opt.bytes {
			BytesMode::AsString => parse_int(&String::from_utf8_lossy(data)),
			// a malformed varint decodes to zero, not an error
			BytesMode::Binary => Ok(varint(data)),
			BytesMode::Base64 => Err(unsupported(src, "int")),
		},
		_ => Err(unsupported(src, "int")),
	}
}

/// Convert a source value into an unsigned integer.
pub(crate) fn to_u64(src: &Value, opt: &SetOptions) -> Result<u64> {
	match src {
		Value::I64(v) => Ok(*v as u64),
		Value::U64(v) => Ok(*v),
		Value::F32(v) => Ok(*v as u64),
		Value::F64(v) => Ok(*v as u64),
		Value::Bool(v) => Ok(u64::from(*v)),
		Value::Str(text) => parse_uint(text),
		Value::Bytes(data) => match opt.bytes {
			BytesMode::AsString => parse_uint(&String::from_utf8_lossy(data)),
			BytesMode::Binary => Ok(uvarint(data)),
			BytesMode::Base64 => Err(unsupported(src, "uint")),
		},
		_ => Err(unsupported(src, "uint")),
	}
}

/// Convert a source value into a 64-bit float. Byte sources always parse as
/// decimal text, regardless of the bytes mode.
pub(crate) fn to_f64(src: &Value, _opt: &SetOptions) -> Result<f64> {
	match src {
		Value::I64(v) => Ok(*v as f64),
		Value::U64(v) => Ok(*v as f64),
		Value::F32(v) => Ok(f64::from(*v)),
		Value::F64(v) => Ok(*v),
		Value::Bool(v) => Ok(f64::from(u8::from(*v))),
		Value::Str(text) => parse_float(text),
		Value::Bytes(data) => parse_float(&String::from_utf8_lossy(data)),
		_ => Err(unsupported(src, "float")),
	}
}

/// Convert a source value into a boolean.
///
/// Text is matched case-insensitively: `"true"`/`"1"` are true, `""`,
/// `"false"`, `"0"`, `"null"`, `"nil"` are false, and any other non-empty
/// text is true. Byte sources use the strict boolean-literal grammar instead.
pub(crate) fn to_bool(src: &Value, _opt: &SetOptions) -> Result<bool> {
	match src {
		Value::Null => Ok(false),
		Value::Bool(v) => Ok(*v),
		Value::I64(v) => Ok(*v != 0),
		Value::U64(v) => Ok(*v != 0),
		Value::F32(v) => Ok(*v != 0.0),
		Value::F64(v) => Ok(*v != 0.0),
		Value::Str(text) => Ok(match text.to_lowercase().as_str() {
			"true" | "1" => true,
			"" | "false" | "0" | "null" | "nil" => false,
			_ => true,
		}),
		Value::Bytes(data) => {
			let text = String::from_utf8_lossy(data);
			bool_literal(&text).ok_or_else(|| SetError::ScalarParse {
				target: "bool",
				text: text.into_owned(),
			})
		}
		_ => Err(unsupported(src, "bool")),
	}
}

/// Convert a source value into raw bytes.
pub(crate) fn to_bytes(src: &Value, opt: &SetOptions) -> Result<Vec<u8>> {
	match src {
		Value::Bytes(data) => return Ok(data.clone()),
		Value::Str(text) => {
			return match opt.bytes {
				BytesMode::Base64 => Ok(BASE64.decode(text.as_bytes())?),
				_ => Ok(text.clone().into_bytes()),
			};
		}
		_ => {}
	}
	if opt.bytes == BytesMode::AsString {
		return Ok(to_text(src, opt).into_bytes());
	}
	match src {
		Value::Bool(v) => Ok(vec![u8::from(*v)]),
		Value::I64(v) => Ok(v.to_le_bytes().to_vec()),
		Value::U64(v) => Ok(v.to_le_bytes().to_vec()),
		Value::F32(v) => Ok(v.to_le_bytes().to_vec()),
		Value::F64(v) => Ok(v.to_le_bytes().to_vec()),
		_ => Err(unsupported(src, "bytes")),
	}
}

/// Decode an unsigned base-128 varint. Truncated or overlong input decodes
/// to zero.
pub(crate) fn uvarint(data: &[u8]) -> u64 {
	let mut value = 0_u64;
	let mut shift = 0_u32;
	for (index, byte) in data.iter().enumerate() {
		if index == 10 {
			return 0;
		}
		if *byte < 0x80 {
			if index == 9 && *byte > 1 {
				return 0;
			}
			return value | (u64::from(*byte) << shift);
		}
		value |= u64::from(byte & 0x7f) << shift;
		shift += 7;
	}
	0
}

/// Decode a zigzag-encoded signed varint. Malformed input decodes to zero.
pub(crate) fn varint(data: &[u8]) -> i64 {
	let raw = uvarint(data);
	let value = (raw >> 1) as i64;
	if raw & 1 != 0 { !value } else { value }
}

fn bool_literal(text: &str) -> Option<bool> {
	match text {
		"1" | "t" | "T" | "true" | "TRUE" | "True" => Some(true),
		"0" | "f" | "F" | "false" | "FALSE" | "False" => Some(false),
		_ => None,
	}
}

fn parse_int(text: &str) -> Result<i64> {
	text.parse::<i64>().map_err(|_| SetError::ScalarParse {
		target: "int",
		text: text.to_owned(),
	})
}

fn parse_uint(text: &str) -> Result<u64> {
	text.parse::<u64>().map_err(|_| SetError::ScalarParse {
		target: "uint",
		text: text.to_owned(),
	})
}

fn parse_float(text: &str) -> Result<f64> {
	text.parse::<f64>().map_err(|_| SetError::ScalarParse {
		target: "float",
		text: text.to_owned(),
	})
}

fn unsupported(src: &Value, target: &'static str) -> SetError {
	SetError::ScalarUnsupported {
		src: src.shape().to_string(),
		target,
	}
}

#[cfg(test)]
mod tests {
	use crate::options::{BytesMode, SetOptions};
	use crate::value::Value;

	use super::{to_bool, to_bytes, to_f64, to_i64, to_text, to_u64, uvarint, varint};

	fn opts(bytes: BytesMode) -> SetOptions {
		SetOptions::new().bytes_mode(bytes)
	}

	#[test]
	fn numeric_widening_is_exact() {
		let opt = SetOptions::new();
		assert_eq!(to_i64(&Value::U64(5), &opt).unwrap(), 5);
		assert_eq!(to_f64(&Value::I64(-3), &opt).unwrap(), -3.0);
		assert_eq!(to_u64(&Value::Bool(true), &opt).unwrap(), 1);
	}

	#[test]
	fn float_to_int_truncates() {
		let opt = SetOptions::new();
		assert_eq!(to_i64(&Value::F64(3.9), &opt).unwrap(), 3);
		assert_eq!(to_i64(&Value::F64(-3.9), &opt).unwrap(), -3);
	}

	#[test]
	fn text_bool_table() {
		let opt = SetOptions::new();
		for (text, expected) in [
			("", false),
			("0", false),
			("false", false),
			("NULL", false),
			("nil", false),
			("TRUE", true),
			("1", true),
			("yes", true),
			("anything", true),
		] {
			assert_eq!(to_bool(&Value::Str(text.into()), &opt).unwrap(), expected, "text {text:?}");
		}
	}

	#[test]
	fn byte_bools_use_the_strict_literal_grammar() {
		let opt = SetOptions::new();
		assert!(to_bool(&Value::Bytes(b"True".to_vec()), &opt).unwrap());
		assert!(!to_bool(&Value::Bytes(b"0".to_vec()), &opt).unwrap());
		assert!(to_bool(&Value::Bytes(b"yes".to_vec()), &opt).is_err());
	}

	#[test]
	fn text_formats_canonically() {
		let opt = SetOptions::new();
		assert_eq!(to_text(&Value::I64(-12), &opt), "-12");
		assert_eq!(to_text(&Value::F64(2.5), &opt), "2.5");
		assert_eq!(to_text(&Value::Bool(false), &opt), "false");
		assert_eq!(to_text(&Value::Bytes(b"raw".to_vec()), &opt), "raw");
	}

	#[test]
	fn base64_mode_round_trips_bytes_through_text() {
		let opt = opts(BytesMode::Base64);
		assert_eq!(to_text(&Value::Bytes(b"hi".to_vec()), &opt), "aGk=");
		assert_eq!(to_bytes(&Value::Str("aGk=".into()), &opt).unwrap(), b"hi".to_vec());
		assert!(to_bytes(&Value::Str("!!".into()), &opt).is_err());
	}

	#[test]
	fn as_string_mode_stringifies_any_bytes_source() {
		let opt = opts(BytesMode::AsString);
		assert_eq!(to_bytes(&Value::I64(17), &opt).unwrap(), b"17".to_vec());
		assert_eq!(to_i64(&Value::Bytes(b"42".to_vec()), &opt).unwrap(), 42);
	}

	#[test]
	fn binary_mode_encodes_fixed_width_little_endian() {
		let opt = opts(BytesMode::Binary);
		assert_eq!(to_bytes(&Value::U64(1), &opt).unwrap(), vec![1, 0, 0, 0, 0, 0, 0, 0]);
		assert_eq!(to_bytes(&Value::Bool(true), &opt).unwrap(), vec![1]);
	}

	#[test]
	fn varints_decode_and_malformed_input_yields_zero() {
		// 300 = 0b10101100 0b00000010
		assert_eq!(uvarint(&[0xac, 0x02]), 300);
		// zigzag: 1 encodes -1
		assert_eq!(varint(&[0x01]), -1);
		assert_eq!(varint(&[0x02]), 1);
		// truncated continuation byte
		assert_eq!(uvarint(&[0x80]), 0);
		// eleven continuation bytes overflow
		assert_eq!(uvarint(&[0x80; 11]), 0);

		let opt = opts(BytesMode::Binary);
		assert_eq!(to_u64(&Value::Bytes(vec![0xac, 0x02]), &opt).unwrap(), 300);
		assert_eq!(to_i64(&Value::Bytes(vec![0x80]), &opt).unwrap(), 0);
	}

	#[test]
	fn unsupported_sources_name_both_sides() {
		let opt = SetOptions::new();
		let err = to_i64(&Value::ptr_to(Value::I64(1)), &opt).unwrap_err();
		assert_eq!(err.to_string(), "cannot convert *int to int");
	}
}

//! Best-effort coercion of dynamically-typed values into shaped storage.
//!
//! A destination is mutable [`Value`] storage whose structure is described
//! by a [`Shape`]; a source is any dynamically-typed [`Value`]. [`set`] and
//! [`set_with`] rewrite the destination in place to hold a best-effort
//! equivalent of the source, recursing across records, mappings, sequences,
//! and pointer indirection, with tag-driven field matching, custom per-pair
//! mappers, and pluggable structured decoding for raw text payloads.
//!
//! ```
//! use forceset::{FieldShape, Key, MapValue, RecordShape, Shape, Value};
//!
//! let shape = Shape::record(RecordShape::new(
//! 	"Address",
//! 	vec![
//! 		FieldShape::new("Code", Shape::Int),
//! 		FieldShape::new("Text", Shape::ptr(Shape::Str)).tag("json", "TEXT"),
//! 	],
//! ));
//!
//! let mut src = MapValue::new(Shape::Str, Shape::any());
//! src.insert(Key::from("Code"), Value::from("2"));
//! src.insert(Key::from("TEXT"), Value::from(1));
//!
//! let mut dest = shape.zero();
//! forceset::set(&mut dest, &Value::Map(src))?;
//!
//! let record = dest.as_record().unwrap();
//! assert_eq!(record.field("Code"), Some(&Value::I64(2)));
//! assert_eq!(
//! 	record.field("Text").and_then(Value::pointee),
//! 	Some(&Value::Str("1".into()))
//! );
//! # Ok::<(), forceset::SetError>(())
//! ```

mod error;
mod json;
mod options;
mod scalar;
mod set;
mod shape;
mod tag;
mod value;

/// Error and result aliases.
pub use error::{Result, SetError};
/// JSON-document-to-dynamic-value conversion.
pub use json::from_json;
/// Coercion configuration, modes, and extension points.
pub use options::{BytesMode, Decoder, MapSeqMode, Mapper, MapperKey, SetOptions};
/// Coercion entry points.
pub use set::{set, set_with};
/// Structural shape descriptors.
pub use shape::{FieldShape, RecordShape, Shape};
/// Dynamic value storage and mapping keys.
pub use value::{AnyValue, Key, MapValue, NewtypeValue, PtrValue, RecordValue, SeqValue, Value};

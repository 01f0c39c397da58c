use std::fmt;
use std::sync::Arc;

use indexmap::IndexMap;

use crate::shape::{RecordShape, Shape};

/// Dynamically-typed storage usable as both coercion source and destination.
///
/// Every aggregate variant carries enough shape information that
/// [`Value::shape`] reports the full structural shape of the value, so a
/// `&mut Value` acts as a self-describing handle to typed storage.
#[derive(Debug, Clone, PartialEq)]
pub enum Value {
	/// Absent value.
	Null,
	/// Boolean scalar.
	Bool(bool),
	/// Signed integer scalar.
	I64(i64),
	/// Unsigned integer scalar.
	U64(u64),
	/// 32-bit floating point scalar.
	F32(f32),
	/// 64-bit floating point scalar.
	F64(f64),
	/// UTF-8 text.
	Str(String),
	/// Raw byte sequence.
	Bytes(Vec<u8>),
	/// Ordered homogeneous sequence.
	Seq(SeqValue),
	/// Associative mapping with insertion-ordered entries.
	Map(MapValue),
	/// Record instance with fields aligned to its shape.
	Record(RecordValue),
	/// Owned optional indirection.
	Ptr(PtrValue),
	/// Dynamically-typed slot.
	Any(AnyValue),
	/// Alias-branded value.
	Newtype(NewtypeValue),
}

/// Sequence storage with its element shape.
#[derive(Debug, Clone, PartialEq)]
pub struct SeqValue {
	/// Element shape.
	pub elem: Shape,
	/// Elements in order.
	pub items: Vec<Value>,
}

/// Mapping storage with insertion-ordered entries.
#[derive(Debug, Clone, PartialEq)]
pub struct MapValue {
	/// Key shape.
	pub key: Shape,
	/// Value shape.
	pub value: Shape,
	/// Entries in insertion order.
	pub entries: IndexMap<Key, Value>,
}

/// Record storage with one slot per declared field.
#[derive(Debug, Clone, PartialEq)]
pub struct RecordValue {
	/// Shape the field slots align to.
	pub shape: Arc<RecordShape>,
	/// Field values in declaration order.
	pub fields: Vec<Value>,
}

/// Pointer storage: owned, allocated on first write.
#[derive(Debug, Clone, PartialEq)]
pub struct PtrValue {
	/// Pointee shape.
	pub target: Shape,
	/// Current pointee, `None` while nil.
	pub inner: Option<Box<Value>>,
}

/// Dynamic slot storage with its capability constraints.
#[derive(Debug, Clone, PartialEq)]
pub struct AnyValue {
	/// Capabilities a stored value's shape must expose.
	pub caps: Vec<Arc<str>>,
	/// Currently stored value.
	pub inner: Option<Box<Value>>,
}

/// Alias brand around an underlying value.
#[derive(Debug, Clone, PartialEq)]
pub struct NewtypeValue {
	/// Alias name.
	pub name: Arc<str>,
	/// Wrapped value.
	pub inner: Box<Value>,
}

/// Hashable scalar usable as a mapping key.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum Key {
	/// Text key.
	Str(String),
	/// Signed integer key.
	I64(i64),
	/// Unsigned integer key.
	U64(u64),
	/// Boolean key.
	Bool(bool),
}

impl SeqValue {
	/// Empty sequence of `elem`-shaped elements.
	pub fn new(elem: Shape) -> Self {
		Self {
			elem,
			items: Vec::new(),
		}
	}
}

impl MapValue {
	/// Empty mapping with the given key and value shapes.
	pub fn new(key: Shape, value: Shape) -> Self {
		Self {
			key,
			value,
			entries: IndexMap::new(),
		}
	}

	/// Insert an entry, replacing any previous value under the same key.
	pub fn insert(&mut self, key: Key, value: Value) {
		self.entries.insert(key, value);
	}

	/// Value stored under `key`, if present.
	pub fn get(&self, key: &Key) -> Option<&Value> {
		self.entries.get(key)
	}

	/// Number of entries.
	pub fn len(&self) -> usize {
		self.entries.len()
	}

	/// Whether the mapping has no entries.
	pub fn is_empty(&self) -> bool {
		self.entries.is_empty()
	}
}

impl RecordValue {
	/// Record instance with every field at its zero value.
	pub fn new(shape: Arc<RecordShape>) -> Self {
		let fields = shape.fields.iter().map(|field| field.shape.zero()).collect();
		Self { shape, fields }
	}

	/// Value of the field named `name`, if declared.
	pub fn field(&self, name: &str) -> Option<&Value> {
		self.shape.field_index(name).map(|index| &self.fields[index])
	}

	/// Overwrite the field named `name`. Returns false for unknown names.
	pub fn set_field(&mut self, name: &str, value: Value) -> bool {
		match self.shape.field_index(name) {
			Some(index) => {
				self.fields[index] = value;
				true
			}
			None => false,
		}
	}
}

impl Key {
	/// Shape of this key.
	pub fn shape(&self) -> Shape {
		match self {
			Key::Str(_) => Shape::Str,
			Key::I64(_) => Shape::Int,
			Key::U64(_) => Shape::Uint,
			Key::Bool(_) => Shape::Bool,
		}
	}

	/// This key as a plain value.
	pub fn to_value(&self) -> Value {
		match self {
			Key::Str(text) => Value::Str(text.clone()),
			Key::I64(v) => Value::I64(*v),
			Key::U64(v) => Value::U64(*v),
			Key::Bool(v) => Value::Bool(*v),
		}
	}

	/// Build a key from a hashable scalar value. Alias brands are dropped.
	pub fn from_value(value: &Value) -> Option<Key> {
		let mut value = value;
		while let Value::Newtype(wrap) = value {
			value = &wrap.inner;
		}
		match value {
			Value::Str(text) => Some(Key::Str(text.clone())),
			Value::I64(v) => Some(Key::I64(*v)),
			Value::U64(v) => Some(Key::U64(*v)),
			Value::Bool(v) => Some(Key::Bool(*v)),
			_ => None,
		}
	}
}

impl Shape {
	/// Construct this shape's zero value.
	pub fn zero(&self) -> Value {
		match self {
			Shape::Str => Value::Str(String::new()),
			Shape::Int => Value::I64(0),
			Shape::Uint => Value::U64(0),
			Shape::Bool => Value::Bool(false),
			Shape::F32 => Value::F32(0.0),
			Shape::F64 => Value::F64(0.0),
			Shape::Bytes => Value::Bytes(Vec::new()),
			Shape::Record(shape) => Value::Record(RecordValue::new(shape.clone())),
			Shape::Map { key, value } => Value::Map(MapValue::new((**key).clone(), (**value).clone())),
			Shape::Seq(elem) => Value::Seq(SeqValue::new((**elem).clone())),
			Shape::Ptr(target) => Value::Ptr(PtrValue {
				target: (**target).clone(),
				inner: None,
			}),
			Shape::Any { caps } => Value::Any(AnyValue {
				caps: caps.clone(),
				inner: None,
			}),
			Shape::Named { name, underlying } => Value::Newtype(NewtypeValue {
				name: name.clone(),
				inner: Box::new(underlying.zero()),
			}),
		}
	}
}

impl Value {
	/// Alias-branded value.
	pub fn newtype(name: &str, inner: Value) -> Self {
		Value::Newtype(NewtypeValue {
			name: Arc::from(name),
			inner: Box::new(inner),
		})
	}

	/// Pointer holding `inner`.
	pub fn ptr_to(inner: Value) -> Self {
		Value::Ptr(PtrValue {
			target: inner.shape(),
			inner: Some(Box::new(inner)),
		})
	}

	/// The full structural shape of this value.
	pub fn shape(&self) -> Shape {
		match self {
			Value::Null => Shape::any(),
			Value::Bool(_) => Shape::Bool,
			Value::I64(_) => Shape::Int,
			Value::U64(_) => Shape::Uint,
			Value::F32(_) => Shape::F32,
			Value::F64(_) => Shape::F64,
			Value::Str(_) => Shape::Str,
			Value::Bytes(_) => Shape::Bytes,
			Value::Seq(seq) => Shape::Seq(Box::new(seq.elem.clone())),
			Value::Map(map) => Shape::Map {
				key: Box::new(map.key.clone()),
				value: Box::new(map.value.clone()),
			},
			Value::Record(record) => Shape::Record(record.shape.clone()),
			Value::Ptr(ptr) => Shape::Ptr(Box::new(ptr.target.clone())),
			Value::Any(slot) => Shape::Any {
				caps: slot.caps.clone(),
			},
			Value::Newtype(wrap) => Shape::Named {
				name: wrap.name.clone(),
				underlying: Box::new(wrap.inner.shape()),
			},
		}
	}

	/// Whether this value is `Null`.
	pub fn is_null(&self) -> bool {
		matches!(self, Value::Null)
	}

	/// Boolean payload.
	pub fn as_bool(&self) -> Option<bool> {
		match self {
			Value::Bool(v) => Some(*v),
			_ => None,
		}
	}

	/// Signed integer payload.
	pub fn as_i64(&self) -> Option<i64> {
		match self {
			Value::I64(v) => Some(*v),
			_ => None,
		}
	}

	/// Unsigned integer payload.
	pub fn as_u64(&self) -> Option<u64> {
		match self {
			Value::U64(v) => Some(*v),
			_ => None,
		}
	}

	/// 64-bit float payload.
	pub fn as_f64(&self) -> Option<f64> {
		match self {
			Value::F64(v) => Some(*v),
			_ => None,
		}
	}

	/// Text payload.
	pub fn as_str(&self) -> Option<&str> {
		match self {
			Value::Str(text) => Some(text),
			_ => None,
		}
	}

	/// Byte payload.
	pub fn as_bytes(&self) -> Option<&[u8]> {
		match self {
			Value::Bytes(data) => Some(data),
			_ => None,
		}
	}

	/// Sequence payload.
	pub fn as_seq(&self) -> Option<&SeqValue> {
		match self {
			Value::Seq(seq) => Some(seq),
			_ => None,
		}
	}

	/// Mapping payload.
	pub fn as_map(&self) -> Option<&MapValue> {
		match self {
			Value::Map(map) => Some(map),
			_ => None,
		}
	}

	/// Record payload.
	pub fn as_record(&self) -> Option<&RecordValue> {
		match self {
			Value::Record(record) => Some(record),
			_ => None,
		}
	}

	/// Pointee of a pointer value, if allocated.
	pub fn pointee(&self) -> Option<&Value> {
		match self {
			Value::Ptr(ptr) => ptr.inner.as_deref(),
			_ => None,
		}
	}

	/// Value stored in a dynamic slot, if any.
	pub fn as_any(&self) -> Option<&Value> {
		match self {
			Value::Any(slot) => slot.inner.as_deref(),
			_ => None,
		}
	}
}

impl From<bool> for Value {
	fn from(v: bool) -> Self {
		Value::Bool(v)
	}
}

impl From<i32> for Value {
	fn from(v: i32) -> Self {
		Value::I64(i64::from(v))
	}
}

impl From<i64> for Value {
	fn from(v: i64) -> Self {
		Value::I64(v)
	}
}

impl From<u64> for Value {
	fn from(v: u64) -> Self {
		Value::U64(v)
	}
}

impl From<f32> for Value {
	fn from(v: f32) -> Self {
		Value::F32(v)
	}
}

impl From<f64> for Value {
	fn from(v: f64) -> Self {
		Value::F64(v)
	}
}

impl From<&str> for Value {
	fn from(v: &str) -> Self {
		Value::Str(v.to_owned())
	}
}

impl From<String> for Value {
	fn from(v: String) -> Self {
		Value::Str(v)
	}
}

impl From<Vec<u8>> for Value {
	fn from(v: Vec<u8>) -> Self {
		Value::Bytes(v)
	}
}

impl From<&str> for Key {
	fn from(v: &str) -> Self {
		Key::Str(v.to_owned())
	}
}

impl From<i64> for Key {
	fn from(v: i64) -> Self {
		Key::I64(v)
	}
}

impl fmt::Display for Key {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		match self {
			Key::Str(text) => write!(f, "{text}"),
			Key::I64(v) => write!(f, "{v}"),
			Key::U64(v) => write!(f, "{v}"),
			Key::Bool(v) => write!(f, "{v}"),
		}
	}
}

// Generic rendering, used as the last-resort textual form of a value.
impl fmt::Display for Value {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		match self {
			Value::Null => write!(f, "null"),
			Value::Bool(v) => write!(f, "{v}"),
			Value::I64(v) => write!(f, "{v}"),
			Value::U64(v) => write!(f, "{v}"),
			Value::F32(v) => write!(f, "{v}"),
			Value::F64(v) => write!(f, "{v}"),
			Value::Str(text) => write!(f, "{text}"),
			Value::Bytes(data) => write!(f, "{data:?}"),
			Value::Seq(seq) => {
				write!(f, "[")?;
				for (index, item) in seq.items.iter().enumerate() {
					if index > 0 {
						write!(f, ", ")?;
					}
					write!(f, "{item}")?;
				}
				write!(f, "]")
			}
			Value::Map(map) => {
				write!(f, "{{")?;
				for (index, (key, value)) in map.entries.iter().enumerate() {
					if index > 0 {
						write!(f, ", ")?;
					}
					write!(f, "{key}: {value}")?;
				}
				write!(f, "}}")
			}
			Value::Record(record) => {
				write!(f, "{}{{", record.shape.name)?;
				for (index, (field, value)) in record.shape.fields.iter().zip(&record.fields).enumerate() {
					if index > 0 {
						write!(f, ", ")?;
					}
					write!(f, "{}: {}", field.name, value)?;
				}
				write!(f, "}}")
			}
			Value::Ptr(ptr) => match &ptr.inner {
				Some(inner) => write!(f, "&{inner}"),
				None => write!(f, "null"),
			},
			Value::Any(slot) => match &slot.inner {
				Some(inner) => write!(f, "{inner}"),
				None => write!(f, "null"),
			},
			Value::Newtype(wrap) => write!(f, "{}", wrap.inner),
		}
	}
}

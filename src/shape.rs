use std::fmt;
use std::sync::Arc;

/// Structural description of a value's kind and nested structure.
///
/// Shapes are plain owned trees, so shape graphs are finite by construction
/// and shape recursion always terminates.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum Shape {
	/// UTF-8 text.
	Str,
	/// Signed integer, stored as `i64`.
	Int,
	/// Unsigned integer, stored as `u64`.
	Uint,
	/// Boolean.
	Bool,
	/// 32-bit floating point.
	F32,
	/// 64-bit floating point.
	F64,
	/// Raw byte sequence.
	Bytes,
	/// Fixed set of named, typed fields.
	Record(Arc<RecordShape>),
	/// Associative key-value container.
	Map {
		/// Key shape.
		key: Box<Shape>,
		/// Value shape.
		value: Box<Shape>,
	},
	/// Ordered homogeneous container.
	Seq(Box<Shape>),
	/// Owned optional indirection, allocated on first write.
	Ptr(Box<Shape>),
	/// Dynamically-typed slot, optionally constrained by capabilities.
	Any {
		/// Capabilities a stored value's shape must expose. Empty accepts all.
		caps: Vec<Arc<str>>,
	},
	/// Named alias over an underlying representation.
	Named {
		/// Alias name.
		name: Arc<str>,
		/// Underlying representation.
		underlying: Box<Shape>,
	},
}

/// Record shape: an ordered list of named field declarations.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct RecordShape {
	/// Record label. Part of exact identity, ignored by convertibility.
	pub name: Arc<str>,
	/// Field declarations in source order.
	pub fields: Vec<FieldShape>,
	/// Capabilities instances of this record expose.
	pub caps: Vec<Arc<str>>,
}

/// One record field declaration.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct FieldShape {
	/// Declared field name.
	pub name: Arc<str>,
	/// Declared field shape.
	pub shape: Shape,
	/// Raw tag strings keyed by tag namespace.
	pub tags: Vec<(Arc<str>, Arc<str>)>,
	/// Whether the field is embedded (flattened into its record).
	pub embedded: bool,
	/// Whether the field participates in conversion.
	pub visible: bool,
}

impl FieldShape {
	/// Plain visible field with no tags.
	pub fn new(name: &str, shape: Shape) -> Self {
		Self {
			name: Arc::from(name),
			shape,
			tags: Vec::new(),
			embedded: false,
			visible: true,
		}
	}

	/// Attach a raw tag under a tag namespace.
	pub fn tag(mut self, key: &str, raw: &str) -> Self {
		self.tags.push((Arc::from(key), Arc::from(raw)));
		self
	}

	/// Mark the field embedded.
	pub fn embedded(mut self) -> Self {
		self.embedded = true;
		self
	}

	/// Exclude the field from conversion.
	pub fn hidden(mut self) -> Self {
		self.visible = false;
		self
	}

	/// Raw tag registered under `key`, if any.
	pub fn tag_for(&self, key: &str) -> Option<&str> {
		self.tags.iter().find(|(k, _)| &**k == key).map(|(_, raw)| &**raw)
	}
}

impl RecordShape {
	/// Record shape from a label and its fields.
	pub fn new(name: &str, fields: Vec<FieldShape>) -> Self {
		Self {
			name: Arc::from(name),
			fields,
			caps: Vec::new(),
		}
	}

	/// Declare capabilities instances of this record expose.
	pub fn with_caps(mut self, caps: &[&str]) -> Self {
		self.caps = caps.iter().map(|cap| Arc::from(*cap)).collect();
		self
	}

	/// Index of the field named `name`, if declared.
	pub fn field_index(&self, name: &str) -> Option<usize> {
		self.fields.iter().position(|field| &*field.name == name)
	}
}

impl Shape {
	/// Record shape.
	pub fn record(shape: RecordShape) -> Self {
		Self::Record(Arc::new(shape))
	}

	/// Mapping shape.
	pub fn map(key: Shape, value: Shape) -> Self {
		Self::Map {
			key: Box::new(key),
			value: Box::new(value),
		}
	}

	/// Sequence shape.
	pub fn seq(elem: Shape) -> Self {
		Self::Seq(Box::new(elem))
	}

	/// Pointer shape.
	pub fn ptr(target: Shape) -> Self {
		Self::Ptr(Box::new(target))
	}

	/// Unconstrained dynamic slot shape.
	pub fn any() -> Self {
		Self::Any { caps: Vec::new() }
	}

	/// Dynamic slot shape constrained by capabilities.
	pub fn any_with(caps: &[&str]) -> Self {
		Self::Any {
			caps: caps.iter().map(|cap| Arc::from(*cap)).collect(),
		}
	}

	/// Named alias shape over an underlying representation.
	pub fn named(name: &str, underlying: Shape) -> Self {
		Self::Named {
			name: Arc::from(name),
			underlying: Box::new(underlying),
		}
	}

	/// Strip all top-level alias wrappers.
	pub fn underlying(&self) -> &Shape {
		let mut shape = self;
		while let Shape::Named { underlying, .. } = shape {
			shape = underlying;
		}
		shape
	}

	/// Whether this shape is an alias wrapper.
	pub fn is_named(&self) -> bool {
		matches!(self, Shape::Named { .. })
	}

	/// Implicit convertibility: identical underlying representations,
	/// ignoring only the top-level record label.
	pub fn convertible_to(&self, dest: &Shape) -> bool {
		underlying_eq(self.underlying(), dest.underlying())
	}

	/// Assignability without conversion: convertible and at most one side
	/// carries an alias name.
	pub fn assignable_to(&self, dest: &Shape) -> bool {
		self.convertible_to(dest) && (!self.is_named() || !dest.is_named())
	}

	/// Whether this shape exposes every capability in `caps`.
	pub fn satisfies(&self, caps: &[Arc<str>]) -> bool {
		if caps.is_empty() {
			return true;
		}
		let exposed = match self.underlying() {
			Shape::Record(record) => &record.caps,
			Shape::Ptr(target) => match target.underlying() {
				Shape::Record(record) => &record.caps,
				_ => return false,
			},
			_ => return false,
		};
		caps.iter().all(|cap| exposed.contains(cap))
	}
}

// Underlying comparison applies only at the top level; nested shapes must
// match exactly, tags included. Record labels and capabilities are not part
// of the underlying representation.
fn underlying_eq(a: &Shape, b: &Shape) -> bool {
	match (a, b) {
		(Shape::Record(a), Shape::Record(b)) => a.fields == b.fields,
		_ => a == b,
	}
}

impl fmt::Display for Shape {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		match self {
			Shape::Str => write!(f, "string"),
			Shape::Int => write!(f, "int"),
			Shape::Uint => write!(f, "uint"),
			Shape::Bool => write!(f, "bool"),
			Shape::F32 => write!(f, "float32"),
			Shape::F64 => write!(f, "float64"),
			Shape::Bytes => write!(f, "bytes"),
			Shape::Record(record) => write!(f, "{}", record.name),
			Shape::Map { key, value } => write!(f, "map[{key}]{value}"),
			Shape::Seq(elem) => write!(f, "[]{elem}"),
			Shape::Ptr(target) => write!(f, "*{target}"),
			Shape::Any { caps } if caps.is_empty() => write!(f, "any"),
			Shape::Any { caps } => {
				write!(f, "any(")?;
				for (index, cap) in caps.iter().enumerate() {
					if index > 0 {
						write!(f, "+")?;
					}
					write!(f, "{cap}")?;
				}
				write!(f, ")")
			}
			Shape::Named { name, .. } => write!(f, "{name}"),
		}
	}
}

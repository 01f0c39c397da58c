use thiserror::Error;

/// Crate-local result type.
pub type Result<T> = std::result::Result<T, SetError>;

/// Errors produced while coercing a source value into destination storage.
#[derive(Debug, Error)]
pub enum SetError {
	/// No scalar, identity, convertibility, or aggregate rule bridged the pair.
	#[error("cannot force {src} into {dest}")]
	ShapeMismatch {
		/// Destination shape after pointer dereferencing.
		dest: String,
		/// Source shape.
		src: String,
	},
	/// Source shape has no conversion rule for the requested scalar domain.
	#[error("cannot convert {src} to {target}")]
	ScalarUnsupported {
		/// Source shape.
		src: String,
		/// Target scalar domain.
		target: &'static str,
	},
	/// Source text failed to parse into the requested scalar domain.
	#[error("invalid {target} text {text:?}")]
	ScalarParse {
		/// Target scalar domain.
		target: &'static str,
		/// Offending text.
		text: String,
	},
	/// Base64 decode failed under [`BytesMode::Base64`](crate::BytesMode::Base64).
	#[error("base64: {0}")]
	Base64(#[from] base64::DecodeError),
	/// Mapping-to-record conversion requires a textual source key shape.
	#[error("map key shape must be string, got {key}")]
	MapKeyNotString {
		/// Offending key shape.
		key: String,
	},
	/// Pairs-mode sequence element shape is not a usable two-field record.
	#[error("invalid pair element shape {elem}: {reason}")]
	PairShapeInvalid {
		/// Offending element shape.
		elem: String,
		/// Which pair requirement failed.
		reason: &'static str,
	},
	/// An array-like mapping key coerced to an index outside sequence range.
	#[error("sequence index out of range: {index}")]
	SeqIndexOutOfRange {
		/// Coerced index value.
		index: i64,
	},
	/// A coerced mapping key is not a hashable scalar.
	#[error("shape {shape} cannot be used as a map key")]
	KeyUnsupported {
		/// Offending key shape.
		shape: String,
	},
	/// The injected structured decoder rejected its input.
	#[error("decode: {source}")]
	Decode {
		/// Decoder-reported failure.
		source: Box<dyn std::error::Error + Send + Sync>,
	},
	/// A registered mapper returned its own error, propagated verbatim.
	#[error(transparent)]
	Custom(Box<dyn std::error::Error + Send + Sync>),
}

impl SetError {
	/// Wrap an arbitrary error for return from a custom mapper.
	pub fn custom(err: impl std::error::Error + Send + Sync + 'static) -> Self {
		Self::Custom(Box::new(err))
	}
}

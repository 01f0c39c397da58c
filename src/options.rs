use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;

use crate::error::Result;
use crate::shape::Shape;
use crate::value::Value;

/// How byte sequences convert to and from other scalar domains.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum BytesMode {
	/// Bytes carry the textual rendering of the value.
	#[default]
	AsString,
	/// Text carries standard base64.
	Base64,
	/// Bytes carry binary scalar encodings (varint integers).
	Binary,
}

/// How mappings convert into sequences.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum MapSeqMode {
	/// Integer-keyed entries land at their index, gaps zero-filled.
	#[default]
	ArrayLike,
	/// One two-field record element per entry.
	Pairs,
}

/// Custom conversion override for one exact (destination, source) shape pair.
///
/// Invoked with the destination storage, the source value, and the raw tag
/// of the field being set. The mapper's result is returned verbatim.
pub type Mapper = Arc<dyn Fn(&mut Value, &Value, &str) -> Result<()> + Send + Sync>;

/// Injected structured decoder: raw text/bytes into destination storage.
pub type Decoder = Arc<dyn Fn(&[u8], &mut Value) -> Result<()> + Send + Sync>;

/// Registry key for custom mappers: exact destination and source shapes.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct MapperKey {
	/// Destination shape after pointer dereferencing.
	pub dest: Shape,
	/// Source shape as supplied.
	pub src: Shape,
}

/// Configuration for one coercion call tree.
///
/// Built once per top-level call, mutated only through the builder methods
/// before the call begins, then shared read-only through the recursion.
#[derive(Clone)]
pub struct SetOptions {
	/// Active field-tag namespace.
	pub tag_key: String,
	/// Byte conversion mode.
	pub bytes: BytesMode,
	/// Mapping-to-sequence mode.
	pub map_seq: MapSeqMode,
	/// Custom mappers by exact shape pair, consulted before built-in rules.
	pub mappers: HashMap<MapperKey, Mapper>,
	/// Structured decoder for text/bytes landing on record destinations.
	pub decoder: Option<Decoder>,
}

impl Default for SetOptions {
	fn default() -> Self {
		Self {
			tag_key: "json".to_owned(),
			bytes: BytesMode::default(),
			map_seq: MapSeqMode::default(),
			mappers: HashMap::new(),
			decoder: Some(crate::json::decoder()),
		}
	}
}

impl SetOptions {
	/// Options with the default tag key, the JSON decoder, and no mappers.
	pub fn new() -> Self {
		Self::default()
	}

	/// Set the active tag namespace.
	pub fn tag_key(mut self, key: &str) -> Self {
		self.tag_key = key.to_owned();
		self
	}

	/// Set the byte conversion mode.
	pub fn bytes_mode(mut self, mode: BytesMode) -> Self {
		self.bytes = mode;
		self
	}

	/// Set the mapping-to-sequence mode.
	pub fn map_seq_mode(mut self, mode: MapSeqMode) -> Self {
		self.map_seq = mode;
		self
	}

	/// Replace the structured decoder.
	pub fn decoder(mut self, decoder: Decoder) -> Self {
		self.decoder = Some(decoder);
		self
	}

	/// Remove the structured decoder.
	pub fn no_decoder(mut self) -> Self {
		self.decoder = None;
		self
	}

	/// Register a custom mapper for an exact (destination, source) pair.
	pub fn mapper(
		mut self,
		dest: Shape,
		src: Shape,
		mapper: impl Fn(&mut Value, &Value, &str) -> Result<()> + Send + Sync + 'static,
	) -> Self {
		self.mappers.insert(MapperKey { dest, src }, Arc::new(mapper));
		self
	}
}

impl fmt::Debug for SetOptions {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		f.debug_struct("SetOptions")
			.field("tag_key", &self.tag_key)
			.field("bytes", &self.bytes)
			.field("map_seq", &self.map_seq)
			.field("mappers", &self.mappers.len())
			.field("decoder", &self.decoder.is_some())
			.finish()
	}
}

use crate::error::{Result, SetError};
use crate::options::{MapSeqMode, MapperKey, SetOptions};
use crate::scalar;
use crate::shape::Shape;
use crate::tag;
use crate::value::{Key, MapValue, NewtypeValue, RecordValue, SeqValue, Value};

/// Coerce `src` into `dest` under default options.
pub fn set(dest: &mut Value, src: &Value) -> Result<()> {
	set_with(dest, src, &SetOptions::default())
}

/// Coerce `src` into `dest` under explicit options.
///
/// Mutates `dest` in place, recursing across aggregate and pointer
/// boundaries; `src` is never mutated. The first matching rule wins: custom
/// mappers, then scalar conversion, identity, dynamic-slot assignment,
/// alias conversion, and finally the aggregate policies.
pub fn set_with(dest: &mut Value, src: &Value, opt: &SetOptions) -> Result<()> {
	force_set(dest, src, opt, "")
}

fn force_set(dest: &mut Value, src: &Value, opt: &SetOptions, tag: &str) -> Result<()> {
	// absent sources never mutate the destination
	let Some(mut src) = unwrap_dynamic(src) else {
		return Ok(());
	};

	let dest = deref_alloc(dest);
	let dest_shape = dest.shape();
	let src_shape = src.shape();

	if !opt.mappers.is_empty() {
		let key = MapperKey {
			dest: dest_shape.clone(),
			src: src_shape.clone(),
		};
		if let Some(mapper) = opt.mappers.get(&key) {
			return mapper(dest, src, tag);
		}
	}

	// scalar destinations convert eagerly; a failure is remembered and only
	// surfaced once every fallback below has been exhausted
	let mut scalar_err = None;
	match unbrand_mut(dest) {
		Value::Str(out) => {
			*out = scalar::to_text(src, opt);
			return Ok(());
		}
		Value::I64(out) => match scalar::to_i64(src, opt) {
			Ok(v) => {
				*out = v;
				return Ok(());
			}
			Err(err) => scalar_err = Some(err),
		},
		Value::U64(out) => match scalar::to_u64(src, opt) {
			Ok(v) => {
				*out = v;
				return Ok(());
			}
			Err(err) => scalar_err = Some(err),
		},
		Value::Bool(out) => match scalar::to_bool(src, opt) {
			Ok(v) => {
				*out = v;
				return Ok(());
			}
			Err(err) => scalar_err = Some(err),
		},
		Value::F32(out) => match scalar::to_f64(src, opt) {
			Ok(v) => {
				*out = v as f32;
				return Ok(());
			}
			Err(err) => scalar_err = Some(err),
		},
		Value::F64(out) => match scalar::to_f64(src, opt) {
			Ok(v) => {
				*out = v;
				return Ok(());
			}
			Err(err) => scalar_err = Some(err),
		},
		Value::Bytes(out) => match scalar::to_bytes(src, opt) {
			Ok(v) => {
				*out = v;
				return Ok(());
			}
			Err(err) => scalar_err = Some(err),
		},
		_ => {}
	}

	if src_shape == dest_shape {
		*dest = src.clone();
		return Ok(());
	}

	if let Value::Any(slot) = unbrand_mut(dest) {
		if src_shape.satisfies(&slot.caps) {
			slot.inner = Some(Box::new(src.clone()));
			return Ok(());
		}
	}

	if src_shape.convertible_to(&dest_shape) {
		*dest = convert(src, &dest_shape);
		return Ok(());
	}

	if matches!(dest_shape.underlying(), Shape::Seq(_) | Shape::Record(_) | Shape::Map { .. }) {
		// aggregates look through source pointers; a nil source pointer
		// leaves the destination untouched
		src = match strip_src_ptrs(src) {
			Some(inner) => inner,
			None => return Ok(()),
		};
		let src_shape = src.shape();
		if src_shape == dest_shape {
			*dest = src.clone();
			return Ok(());
		}
		if src_shape.convertible_to(&dest_shape) {
			*dest = convert(src, &dest_shape);
			return Ok(());
		}

		if matches!(dest_shape.underlying(), Shape::Record(_)) {
			if let Some(decoder) = &opt.decoder {
				match unbrand_ref(src) {
					Value::Str(text) => return decoder(text.as_bytes(), unbrand_mut(dest)),
					Value::Bytes(data) => return decoder(data, unbrand_mut(dest)),
					_ => {}
				}
			}
		}

		match (unbrand_mut(dest), unbrand_ref(src)) {
			(Value::Seq(out), Value::Seq(items)) => return seq_to_seq(out, items, opt),
			(Value::Seq(out), Value::Map(entries)) => return map_to_seq(out, entries, opt),
			(Value::Seq(out), Value::Record(record)) => return record_to_seq(out, record, opt),
			(Value::Record(out), Value::Record(record)) => return record_to_record(out, record, opt),
			(Value::Record(out), Value::Map(entries)) => {
				map_to_record(out, entries, opt)?;
				return Ok(());
			}
			(Value::Map(out), Value::Record(record)) => return record_to_map(out, record, opt),
			(Value::Map(out), Value::Map(entries)) => return map_to_map(out, entries, opt),
			_ => {}
		}
	}

	if let Some(err) = scalar_err {
		return Err(err);
	}
	Err(SetError::ShapeMismatch {
		dest: dest_shape.to_string(),
		src: src.shape().to_string(),
	})
}

// Look through dynamic-slot wrappers to the contributing source value.
fn unwrap_dynamic(src: &Value) -> Option<&Value> {
	match src {
		Value::Null => None,
		Value::Any(slot) => slot.inner.as_deref().and_then(unwrap_dynamic),
		other => Some(other),
	}
}

// Walk destination pointer levels, allocating zero storage into each nil
// level encountered. Alias brands around pointers are consumed like the
// pointers themselves; brands on the pointee are preserved.
fn deref_alloc(mut slot: &mut Value) -> &mut Value {
	enum Step {
		Ptr,
		Brand,
		Stop,
	}
	loop {
		// Decide the next action under a read-only borrow that ends before
		// the mutable reborrow below, sidestepping an NLL borrow-check
		// limitation with the guarded arm.
		let step = match &*slot {
			Value::Ptr(_) => Step::Ptr,
			Value::Newtype(wrap) if matches!(*wrap.inner, Value::Ptr(_)) => Step::Brand,
			_ => Step::Stop,
		};
		match step {
			Step::Ptr => {
				let Value::Ptr(ptr) = slot else { unreachable!() };
				slot = &mut **ptr.inner.get_or_insert_with(|| Box::new(ptr.target.zero()));
			}
			Step::Brand => {
				let Value::Newtype(wrap) = slot else { unreachable!() };
				slot = &mut wrap.inner;
			}
			Step::Stop => return slot,
		}
	}
}

// Mutable storage behind alias brands.
fn unbrand_mut(mut slot: &mut Value) -> &mut Value {
	while let Value::Newtype(wrap) = slot {
		slot = &mut wrap.inner;
	}
	slot
}

fn unbrand_ref(mut value: &Value) -> &Value {
	while let Value::Newtype(wrap) = value {
		value = &wrap.inner;
	}
	value
}

// Dereference source pointer levels; `None` when a nil level is reached.
fn strip_src_ptrs(mut value: &Value) -> Option<&Value> {
	loop {
		match value {
			Value::Ptr(ptr) => match ptr.inner.as_deref() {
				Some(inner) => value = inner,
				None => return None,
			},
			Value::Newtype(wrap) if matches!(*wrap.inner, Value::Ptr(_)) => value = &wrap.inner,
			_ => return Some(value),
		}
	}
}

// Rebrand a convertible value to the destination shape: strip source alias
// brands, relabel records, and re-apply destination brands outside-in.
fn convert(src: &Value, dest_shape: &Shape) -> Value {
	let mut core = unbrand_ref(src).clone();
	if let Shape::Record(shape) = dest_shape.underlying() {
		if let Value::Record(record) = &mut core {
			record.shape = shape.clone();
		}
	}
	rebrand(dest_shape, core)
}

fn rebrand(shape: &Shape, core: Value) -> Value {
	match shape {
		Shape::Named { name, underlying } => Value::Newtype(NewtypeValue {
			name: name.clone(),
			inner: Box::new(rebrand(underlying, core)),
		}),
		_ => core,
	}
}

// Pointer fields re-allocate on write rather than writing through a pointee
// that may be aliased from an earlier conversion.
fn set_fresh(dest: &mut Value, src: &Value, opt: &SetOptions, tag: &str) -> Result<()> {
	if let Value::Ptr(ptr) = dest {
		ptr.inner = None;
	}
	force_set(dest, src, opt, tag)
}

fn seq_to_seq(out: &mut SeqValue, src: &SeqValue, opt: &SetOptions) -> Result<()> {
	let mut items = Vec::with_capacity(src.items.len());
	for item in &src.items {
		let mut slot = out.elem.zero();
		force_set(&mut slot, item, opt, "")?;
		items.push(slot);
	}
	out.items = items;
	Ok(())
}

// Destination fields are matched by declared source field name; embedded
// fields see the whole source record (flattening promotion).
fn record_to_record(out: &mut RecordValue, src: &RecordValue, opt: &SetOptions) -> Result<()> {
	let shape = out.shape.clone();
	for (index, field) in shape.fields.iter().enumerate() {
		if field.embedded {
			let slot = deref_alloc(&mut out.fields[index]);
			if let Value::Record(nested) = unbrand_mut(slot) {
				record_to_record(nested, src, opt)?;
			}
			continue;
		}
		if !field.visible {
			continue;
		}
		let Some(src_index) = src.shape.field_index(&field.name) else {
			continue;
		};
		if src.shape.fields[src_index].shape == field.shape {
			out.fields[index] = src.fields[src_index].clone();
			continue;
		}
		set_fresh(&mut out.fields[index], &src.fields[src_index], opt, "")?;
	}
	Ok(())
}

// Destination fields probe the source mapping under their tag-resolved
// candidate names. Returns how many fields were populated; embedded pointer
// records that receive zero fields are discarded and left nil.
fn map_to_record(out: &mut RecordValue, src: &MapValue, opt: &SetOptions) -> Result<usize> {
	if !matches!(src.key.underlying(), Shape::Str) {
		return Err(SetError::MapKeyNotString {
			key: src.key.to_string(),
		});
	}
	let shape = out.shape.clone();
	let mut count = 0_usize;
	for (index, field) in shape.fields.iter().enumerate() {
		if field.embedded {
			if !matches!(field.shape.underlying(), Shape::Ptr(_)) {
				continue;
			}
			let mut probe = field.shape.zero();
			let populated = match unbrand_mut(deref_alloc(&mut probe)) {
				Value::Record(nested) => map_to_record(nested, src, opt)?,
				_ => 0,
			};
			if populated > 0 {
				out.fields[index] = probe;
				count += 1;
			}
			continue;
		}
		if !field.visible {
			continue;
		}
		let raw_tag = field.tag_for(&opt.tag_key).unwrap_or("");
		let names = tag::candidate_names(raw_tag);
		let value = if names.is_empty() {
			src.entries.get(&Key::Str(field.name.to_string()))
		} else {
			names.iter().find_map(|name| src.entries.get(&Key::Str((*name).to_owned())))
		};
		let Some(value) = value else {
			continue;
		};
		force_set(&mut out.fields[index], value, opt, raw_tag)?;
		count += 1;
	}
	Ok(count)
}

// Emits one entry per visible source field; embedded records are flattened
// into the same mapping and later fields overwrite equal keys.
fn record_to_map(out: &mut MapValue, src: &RecordValue, opt: &SetOptions) -> Result<()> {
	let key_shape = out.key.clone();
	let value_shape = out.value.clone();
	for (index, field) in src.shape.fields.iter().enumerate() {
		let stored = &src.fields[index];
		if field.embedded {
			let Some(nested) = strip_src_ptrs(stored) else {
				continue;
			};
			if let Value::Record(record) = unbrand_ref(nested) {
				record_to_map(out, record, opt)?;
			}
			continue;
		}
		if !field.visible {
			continue;
		}
		let raw_tag = field.tag_for(&opt.tag_key).unwrap_or("");

		let mut value_slot = value_shape.zero();
		deref_alloc(&mut value_slot);
		force_set(&mut value_slot, stored, opt, raw_tag)?;

		let key_name = tag::key_name(raw_tag).unwrap_or(&field.name);
		let mut key_slot = key_shape.zero();
		force_set(&mut key_slot, &Value::Str(key_name.to_owned()), opt, raw_tag)?;
		let key = Key::from_value(&key_slot).ok_or_else(|| SetError::KeyUnsupported {
			shape: key_shape.to_string(),
		})?;
		out.entries.insert(key, value_slot);
	}
	Ok(())
}

fn map_to_map(out: &mut MapValue, src: &MapValue, opt: &SetOptions) -> Result<()> {
	let key_shape = out.key.clone();
	let value_shape = out.value.clone();
	for (key, value) in &src.entries {
		let mut key_slot = key_shape.zero();
		deref_alloc(&mut key_slot);
		force_set(&mut key_slot, &key.to_value(), opt, "")?;
		let key = Key::from_value(&key_slot).ok_or_else(|| SetError::KeyUnsupported {
			shape: key_shape.to_string(),
		})?;

		let mut value_slot = value_shape.zero();
		deref_alloc(&mut value_slot);
		force_set(&mut value_slot, value, opt, "")?;
		out.entries.insert(key, value_slot);
	}
	Ok(())
}

// Array-like conversion: every key must coerce to a sequence index; the
// result spans zero through the largest index, gaps zero-filled.
fn map_to_seq(out: &mut SeqValue, src: &MapValue, opt: &SetOptions) -> Result<()> {
	if opt.map_seq == MapSeqMode::Pairs {
		return map_to_pairs(out, src, opt);
	}
	if src.entries.is_empty() {
		return Ok(());
	}

	let mut max = 0_i64;
	for key in src.entries.keys() {
		let index = seq_index(key, opt)?;
		if index > max {
			max = index;
		}
	}
	let len = usize::try_from(max)
		.ok()
		.and_then(|max| max.checked_add(1))
		.ok_or(SetError::SeqIndexOutOfRange { index: max })?;

	let mut items: Vec<Value> = (0..len).map(|_| out.elem.zero()).collect();
	for (key, value) in &src.entries {
		let index = seq_index(key, opt)?;
		let slot = usize::try_from(index).map_err(|_| SetError::SeqIndexOutOfRange { index })?;
		let mut element = out.elem.zero();
		deref_alloc(&mut element);
		force_set(&mut element, value, opt, "")?;
		items[slot] = element;
	}
	out.items = items;
	Ok(())
}

fn seq_index(key: &Key, opt: &SetOptions) -> Result<i64> {
	let mut slot = Value::I64(0);
	force_set(&mut slot, &key.to_value(), opt, "")?;
	match slot {
		Value::I64(index) => Ok(index),
		_ => Ok(0),
	}
}

// Pairs conversion: one element per entry, first field takes the key and
// second field the value.
fn map_to_pairs(out: &mut SeqValue, src: &MapValue, opt: &SetOptions) -> Result<()> {
	let elem = out.elem.clone();
	let mut core = elem.underlying();
	while let Shape::Ptr(target) = core {
		core = target.underlying();
	}
	let Shape::Record(record) = core else {
		return Err(SetError::PairShapeInvalid {
			elem: elem.to_string(),
			reason: "element shape is not a record",
		});
	};
	if record.fields.len() < 2 {
		return Err(SetError::PairShapeInvalid {
			elem: elem.to_string(),
			reason: "record has fewer than two fields",
		});
	}
	if record.fields[..2].iter().any(|field| field.embedded || !field.visible) {
		return Err(SetError::PairShapeInvalid {
			elem: elem.to_string(),
			reason: "leading pair fields must be plain visible fields",
		});
	}

	let mut items = Vec::with_capacity(src.entries.len());
	for (key, value) in &src.entries {
		let mut slot = elem.zero();
		if let Value::Record(pair) = unbrand_mut(deref_alloc(&mut slot)) {
			force_set(&mut pair.fields[0], &key.to_value(), opt, "")?;
			force_set(&mut pair.fields[1], value, opt, "")?;
		}
		items.push(slot);
	}
	out.items = items;
	Ok(())
}

// One element per visible source field; embedded records splice their
// elements positionally.
fn record_to_seq(out: &mut SeqValue, src: &RecordValue, opt: &SetOptions) -> Result<()> {
	let mut items = Vec::with_capacity(src.fields.len());
	collect_record_elems(&mut items, &out.elem, src, opt)?;
	out.items = items;
	Ok(())
}

fn collect_record_elems(items: &mut Vec<Value>, elem: &Shape, src: &RecordValue, opt: &SetOptions) -> Result<()> {
	for (index, field) in src.shape.fields.iter().enumerate() {
		let stored = &src.fields[index];
		if field.embedded {
			let Some(nested) = strip_src_ptrs(stored) else {
				continue;
			};
			if let Value::Record(record) = unbrand_ref(nested) {
				collect_record_elems(items, elem, record, opt)?;
			}
			continue;
		}
		if !field.visible {
			continue;
		}
		let mut slot = elem.zero();
		force_set(&mut slot, stored, opt, "")?;
		items.push(slot);
	}
	Ok(())
}

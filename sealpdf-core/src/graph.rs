//! Indirect object graph.
//!
//! [`ObjectGraph`] owns every indirect object of a document, keyed by
//! [`ObjectId`]. It hands out fresh references, resolves them with type
//! checks, converts between native [`Literal`]s and objects, and carries the
//! trailer metadata the writer needs.

use crate::error::{PdfError, Result};
use crate::objects::{
    Dictionary, Literal, LiteralConfig, Object, ObjectId, ObjectKind, Operator, Stream,
};
use crate::version::PdfVersion;
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use std::collections::HashMap;

const SUFFIX_SEED: u64 = 1;

/// Largest object number a cross-reference table may hold.
pub const MAX_OBJECT_NUMBER: u32 = 8_388_607;

/// Trailer entries tracked alongside the objects.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct TrailerInfo {
    pub root: Option<ObjectId>,
    pub info: Option<ObjectId>,
    pub encrypt: Option<ObjectId>,
    /// File identifier array, written directly into the trailer
    pub id: Option<Object>,
}

/// Indirect objects of one document plus its trailer metadata.
#[derive(Debug)]
pub struct ObjectGraph {
    objects: HashMap<ObjectId, Object>,
    largest_object_number: u32,
    version: PdfVersion,
    trailer: TrailerInfo,
    push_graphics_state: Option<ObjectId>,
    pop_graphics_state: Option<ObjectId>,
    suffix_rng: StdRng,
}

impl ObjectGraph {
    pub fn new() -> Self {
        Self {
            objects: HashMap::new(),
            largest_object_number: 0,
            version: PdfVersion::default(),
            trailer: TrailerInfo::default(),
            push_graphics_state: None,
            pop_graphics_state: None,
            suffix_rng: StdRng::seed_from_u64(SUFFIX_SEED),
        }
    }

    pub fn version(&self) -> PdfVersion {
        self.version
    }

    pub fn set_version(&mut self, version: PdfVersion) {
        self.version = version;
    }

    pub fn trailer(&self) -> &TrailerInfo {
        &self.trailer
    }

    pub fn trailer_mut(&mut self) -> &mut TrailerInfo {
        &mut self.trailer
    }

    pub fn largest_object_number(&self) -> u32 {
        self.largest_object_number
    }

    pub fn object_count(&self) -> usize {
        self.objects.len()
    }

    /// Store `object` under `id`, replacing any previous object with the
    /// same number.
    ///
    /// A cross-reference table holds one entry per object number, so
    /// assigning `5 1` drops a stored `5 0`. Number 0 is the head of the free
    /// list and numbers above [`MAX_OBJECT_NUMBER`] cannot be written; both
    /// are rejected with [`PdfError::InvalidReference`].
    pub fn assign(&mut self, id: ObjectId, object: impl Into<Object>) -> Result<()> {
        if id.number() == 0 || id.number() > MAX_OBJECT_NUMBER {
            return Err(PdfError::InvalidReference(id));
        }

        let stale: Vec<ObjectId> = self
            .objects
            .keys()
            .filter(|other| other.number() == id.number() && **other != id)
            .copied()
            .collect();
        for other in stale {
            tracing::warn!("Replacing indirect object {} with {}", other, id);
            self.objects.remove(&other);
        }

        if self.objects.insert(id, object.into()).is_some() {
            tracing::warn!("Overwriting indirect object {}", id);
        }
        self.largest_object_number = self.largest_object_number.max(id.number());
        Ok(())
    }

    /// Reserve the next object number. Numbers are never reused, even after
    /// [`delete`](Self::delete).
    ///
    /// The counter saturates at `u32::MAX`; anything past
    /// [`MAX_OBJECT_NUMBER`] is refused by the writer.
    pub fn next_ref(&mut self) -> ObjectId {
        self.largest_object_number = self.largest_object_number.saturating_add(1);
        ObjectId::new(self.largest_object_number, 0)
    }

    /// Store `object` under a fresh reference.
    pub fn register(&mut self, object: impl Into<Object>) -> ObjectId {
        let id = self.next_ref();
        self.objects.insert(id, object.into());
        tracing::trace!("Registered object {}", id);
        id
    }

    /// Remove `id`. Returns whether an object was stored there.
    pub fn delete(&mut self, id: ObjectId) -> bool {
        self.objects.remove(&id).is_some()
    }

    pub fn get(&self, id: ObjectId) -> Option<&Object> {
        self.objects.get(&id)
    }

    pub fn get_mut(&mut self, id: ObjectId) -> Option<&mut Object> {
        self.objects.get_mut(&id)
    }

    /// Resolve `object` (following a reference) and check it against `kinds`.
    ///
    /// An empty `kinds` list accepts any resolved object.
    pub fn lookup<'a>(&'a self, object: &'a Object, kinds: &[ObjectKind]) -> Result<&'a Object> {
        match object {
            Object::Reference(id) => self.lookup_id(*id, kinds),
            direct => check_kind(direct, kinds),
        }
    }

    /// Like [`lookup`](Self::lookup), but unassigned references and nulls
    /// resolve to `None` unless [`ObjectKind::Null`] is requested.
    pub fn lookup_maybe<'a>(
        &'a self,
        object: &'a Object,
        kinds: &[ObjectKind],
    ) -> Result<Option<&'a Object>> {
        match object {
            Object::Reference(id) => self.lookup_id_maybe(*id, kinds),
            direct => maybe_kind(direct, kinds),
        }
    }

    /// Resolve the object stored under `id`.
    ///
    /// Same checks as [`lookup`](Self::lookup), but the result borrows only
    /// the graph, so no reference object has to outlive the call.
    pub fn lookup_id(&self, id: ObjectId, kinds: &[ObjectKind]) -> Result<&Object> {
        match self.objects.get(&id) {
            Some(found) => check_kind(found, kinds),
            None if kinds.is_empty() => Err(PdfError::InvalidReference(id)),
            None => Err(PdfError::TypeMismatch {
                expected: describe_kinds(kinds),
                found: "undefined".to_string(),
            }),
        }
    }

    pub fn lookup_id_maybe(&self, id: ObjectId, kinds: &[ObjectKind]) -> Result<Option<&Object>> {
        match self.objects.get(&id) {
            Some(found) => maybe_kind(found, kinds),
            None => Ok(None),
        }
    }

    pub fn lookup_dict_id(&self, id: ObjectId) -> Result<&Dictionary> {
        let kinds = [ObjectKind::Dictionary];
        narrow(self.lookup_id(id, &kinds)?, &kinds, Object::as_dict)
    }

    pub fn lookup_dict_id_maybe(&self, id: ObjectId) -> Result<Option<&Dictionary>> {
        let kinds = [ObjectKind::Dictionary];
        narrow_maybe(self.lookup_id_maybe(id, &kinds)?, &kinds, Object::as_dict)
    }

    pub fn lookup_stream_id(&self, id: ObjectId) -> Result<&Stream> {
        let kinds = [ObjectKind::Stream];
        narrow(self.lookup_id(id, &kinds)?, &kinds, Object::as_stream)
    }

    pub fn lookup_dict<'a>(&'a self, object: &'a Object) -> Result<&'a Dictionary> {
        self.typed(object, &[ObjectKind::Dictionary], Object::as_dict)
    }

    pub fn lookup_array<'a>(&'a self, object: &'a Object) -> Result<&'a [Object]> {
        self.typed(object, &[ObjectKind::Array], |o| o.as_array().map(Vec::as_slice))
    }

    pub fn lookup_stream<'a>(&'a self, object: &'a Object) -> Result<&'a Stream> {
        self.typed(object, &[ObjectKind::Stream], Object::as_stream)
    }

    pub fn lookup_name<'a>(&'a self, object: &'a Object) -> Result<&'a str> {
        self.typed(object, &[ObjectKind::Name], Object::as_name)
    }

    /// Integers are widened to `f64`.
    pub fn lookup_number(&self, object: &Object) -> Result<f64> {
        self.typed(object, &[ObjectKind::Number], Object::as_real)
    }

    /// Bytes of a literal or hex string.
    pub fn lookup_string<'a>(&'a self, object: &'a Object) -> Result<&'a [u8]> {
        self.typed(
            object,
            &[ObjectKind::String, ObjectKind::HexString],
            Object::as_string_bytes,
        )
    }

    pub fn lookup_bool(&self, object: &Object) -> Result<bool> {
        self.typed(object, &[ObjectKind::Boolean], Object::as_bool)
    }

    pub fn lookup_dict_maybe<'a>(&'a self, object: &'a Object) -> Result<Option<&'a Dictionary>> {
        self.typed_maybe(object, &[ObjectKind::Dictionary], Object::as_dict)
    }

    pub fn lookup_array_maybe<'a>(&'a self, object: &'a Object) -> Result<Option<&'a [Object]>> {
        self.typed_maybe(object, &[ObjectKind::Array], |o| {
            o.as_array().map(Vec::as_slice)
        })
    }

    pub fn lookup_stream_maybe<'a>(&'a self, object: &'a Object) -> Result<Option<&'a Stream>> {
        self.typed_maybe(object, &[ObjectKind::Stream], Object::as_stream)
    }

    pub fn lookup_name_maybe<'a>(&'a self, object: &'a Object) -> Result<Option<&'a str>> {
        self.typed_maybe(object, &[ObjectKind::Name], Object::as_name)
    }

    pub fn lookup_number_maybe(&self, object: &Object) -> Result<Option<f64>> {
        self.typed_maybe(object, &[ObjectKind::Number], Object::as_real)
    }

    pub fn lookup_string_maybe<'a>(&'a self, object: &'a Object) -> Result<Option<&'a [u8]>> {
        self.typed_maybe(
            object,
            &[ObjectKind::String, ObjectKind::HexString],
            Object::as_string_bytes,
        )
    }

    pub fn lookup_bool_maybe(&self, object: &Object) -> Result<Option<bool>> {
        self.typed_maybe(object, &[ObjectKind::Boolean], Object::as_bool)
    }

    fn typed<'a, T>(
        &'a self,
        object: &'a Object,
        kinds: &[ObjectKind],
        view: impl FnOnce(&'a Object) -> Option<T>,
    ) -> Result<T> {
        narrow(self.lookup(object, kinds)?, kinds, view)
    }

    fn typed_maybe<'a, T>(
        &'a self,
        object: &'a Object,
        kinds: &[ObjectKind],
        view: impl FnOnce(&'a Object) -> Option<T>,
    ) -> Result<Option<T>> {
        narrow_maybe(self.lookup_maybe(object, kinds)?, kinds, view)
    }

    /// Reference under which this exact object instance is stored.
    ///
    /// Compares addresses, not values, so only a borrow obtained from this
    /// graph can be found. Linear in the number of objects.
    pub fn get_object_ref(&self, object: &Object) -> Option<ObjectId> {
        self.objects
            .iter()
            .find(|(_, candidate)| std::ptr::eq(*candidate, object))
            .map(|(id, _)| *id)
    }

    /// All indirect objects in ascending reference order.
    pub fn enumerate_indirect_objects(&self) -> Vec<(ObjectId, &Object)> {
        let mut entries: Vec<_> = self.objects.iter().map(|(id, obj)| (*id, obj)).collect();
        entries.sort_by_key(|(id, _)| *id);
        entries
    }

    pub fn obj(&self, literal: impl Into<Literal>) -> Object {
        literal.into().into_object()
    }

    pub fn get_literal(&self, object: &Object, config: LiteralConfig) -> Literal {
        Literal::from_object(object, config)
    }

    /// Raw stream with `contents` stored as given.
    pub fn stream(&self, contents: impl Into<Vec<u8>>, dict: Literal) -> Result<Stream> {
        Ok(Stream::with_dictionary(literal_dict(dict)?, contents.into()))
    }

    /// Stream with `contents` deflated and `Filter /FlateDecode` set.
    #[cfg(feature = "compression")]
    pub fn flate_stream(&self, contents: impl AsRef<[u8]>, dict: Literal) -> Result<Stream> {
        let compressed = crate::objects::deflate(contents.as_ref())?;
        let mut stream = Stream::with_dictionary(literal_dict(dict)?, compressed);
        stream.set_filter("FlateDecode");
        Ok(stream)
    }

    #[cfg(not(feature = "compression"))]
    pub fn flate_stream(&self, _contents: impl AsRef<[u8]>, _dict: Literal) -> Result<Stream> {
        Err(PdfError::CompressionError(
            "flate support is disabled; enable the `compression` feature".to_string(),
        ))
    }

    /// Content stream rendered from `operators` at write time.
    pub fn content_stream(&self, operators: Vec<Operator>, dict: Literal) -> Result<Stream> {
        Ok(Stream::from_operators(literal_dict(dict)?, operators))
    }

    /// Form XObject content stream. Entries in `dict` override the defaults.
    pub fn form_xobject(&self, operators: Vec<Operator>, dict: Literal) -> Result<Stream> {
        let mut merged = Dictionary::new();
        merged.set("Type", Object::name("XObject"));
        merged.set("Subtype", Object::name("Form"));
        merged.set("BBox", numbers(&[0, 0, 0, 0]));
        merged.set("Matrix", numbers(&[1, 0, 0, 1, 0, 0]));
        for (key, value) in literal_dict(dict)? {
            merged.set(key, value);
        }
        Ok(Stream::from_operators(merged, operators))
    }

    /// Shared `q` stream, registered on first use.
    pub fn push_graphics_state_content_stream(&mut self) -> ObjectId {
        if let Some(id) = self.push_graphics_state {
            return id;
        }
        let stream = Stream::from_operators(Dictionary::new(), vec![Operator::push_graphics_state()]);
        let id = self.register(stream);
        self.push_graphics_state = Some(id);
        id
    }

    /// Shared `Q` stream, registered on first use.
    pub fn pop_graphics_state_content_stream(&mut self) -> ObjectId {
        if let Some(id) = self.pop_graphics_state {
            return id;
        }
        let stream = Stream::from_operators(Dictionary::new(), vec![Operator::pop_graphics_state()]);
        let id = self.register(stream);
        self.pop_graphics_state = Some(id);
        id
    }

    /// `"{prefix}-{n}"` with `n` drawn from `0..10^suffix_length`.
    ///
    /// The generator is seeded, so a fresh graph always yields the same
    /// sequence. Not suitable for anything security related.
    pub fn add_random_suffix(&mut self, prefix: &str, suffix_length: u32) -> String {
        let bound = 10u64.checked_pow(suffix_length).unwrap_or(u64::MAX);
        let n = self.suffix_rng.gen_range(0..bound);
        format!("{prefix}-{n}")
    }
}

impl Default for ObjectGraph {
    fn default() -> Self {
        Self::new()
    }
}

fn literal_dict(literal: Literal) -> Result<Dictionary> {
    match literal.into_object() {
        Object::Dictionary(dict) => Ok(dict),
        Object::Null => Ok(Dictionary::new()),
        other => Err(PdfError::TypeMismatch {
            expected: ObjectKind::Dictionary.to_string(),
            found: other.kind().to_string(),
        }),
    }
}

fn numbers(values: &[i64]) -> Object {
    Object::Array(values.iter().map(|&v| Object::Integer(v)).collect())
}

fn describe_kinds(kinds: &[ObjectKind]) -> String {
    kinds
        .iter()
        .map(ToString::to_string)
        .collect::<Vec<_>>()
        .join(" or ")
}

fn check_kind<'a>(resolved: &'a Object, kinds: &[ObjectKind]) -> Result<&'a Object> {
    if kinds.is_empty() || kinds.iter().any(|kind| kind.matches(resolved)) {
        Ok(resolved)
    } else {
        Err(PdfError::TypeMismatch {
            expected: describe_kinds(kinds),
            found: resolved.kind().to_string(),
        })
    }
}

fn maybe_kind<'a>(resolved: &'a Object, kinds: &[ObjectKind]) -> Result<Option<&'a Object>> {
    if resolved.is_null() && !kinds.contains(&ObjectKind::Null) {
        return Ok(None);
    }
    check_kind(resolved, kinds).map(Some)
}

fn narrow<'a, T>(
    object: &'a Object,
    kinds: &[ObjectKind],
    view: impl FnOnce(&'a Object) -> Option<T>,
) -> Result<T> {
    view(object).ok_or_else(|| PdfError::TypeMismatch {
        expected: describe_kinds(kinds),
        found: object.kind().to_string(),
    })
}

fn narrow_maybe<'a, T>(
    object: Option<&'a Object>,
    kinds: &[ObjectKind],
    view: impl FnOnce(&'a Object) -> Option<T>,
) -> Result<Option<T>> {
    object.map(|found| narrow(found, kinds, view)).transpose()
}

//! Write-once registry of record types and the public transcoding
//! entry points
//!
//! A [`Registry`] maps single-character tags to [`RecordCodec`] entries:
//! the tag's field layout plus the build/extract closure pair that
//! converts between ordered field lists and concrete instances. The
//! registry is an explicit value: construct one, populate it, and pass
//! it wherever transcoding happens. There is deliberately no hidden
//! process-global registry: tests and embedders get a fresh, isolated
//! namespace per instance.
//!
//! Registration is write-once per tag and single-writer: `register`
//! takes `&mut self`, so the borrow checker enforces that population
//! completes before the registry is shared. Once populated, a `Registry`
//! is `Send + Sync` and may be used from any number of threads, provided
//! each decode/encode call owns its source or sink exclusively for the
//! duration of the call.

use std::collections::HashMap;
use std::fmt::{self, Debug, Formatter};

use crate::decode;
use crate::encode;
use crate::error::{CodecResult, FormatError, RegistryError};
use crate::layout::Layout;
use crate::parse::Parser;
use crate::prim::Prim;
use crate::target::Target;
use crate::value::{Record, Value};

/// Constructor half of a registered record type: ordered fields in,
/// instance out.
///
/// The engine only ever invokes this with a field list decoded from the
/// tag's own layout, so implementations may assume the list's length and
/// shapes match.
pub type BuildFn = Box<dyn Fn(Vec<Value>) -> Box<dyn Record> + Send + Sync>;

/// Serializer half of a registered record type: instance in, ordered
/// fields out.
///
/// Returns `None` when the instance is not of the concrete type
/// registered under the tag, which the encoder reports as a type
/// mismatch.
pub type ExtractFn = Box<dyn Fn(&dyn Record) -> Option<Vec<Value>> + Send + Sync>;

/// One registered record type: layout plus both conversion directions.
///
/// Immutable once registered; lives as long as its registry.
pub struct RecordCodec {
    layout: Layout,
    build: BuildFn,
    extract: ExtractFn,
}

impl RecordCodec {
    /// Borrows the parsed field layout of this record type.
    #[must_use]
    pub fn layout(&self) -> &Layout {
        &self.layout
    }

    pub(crate) fn construct(&self, fields: Vec<Value>) -> Box<dyn Record> {
        (self.build)(fields)
    }

    pub(crate) fn fields_of(&self, rec: &dyn Record) -> Option<Vec<Value>> {
        (self.extract)(rec)
    }
}

impl Debug for RecordCodec {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        f.debug_struct("RecordCodec")
            .field("layout", &self.layout)
            .finish_non_exhaustive()
    }
}

/// Explicit, write-once-per-tag mapping from record tags to
/// [`RecordCodec`] entries, and the home of the `decode`/`encode` entry
/// points.
#[derive(Debug, Default)]
pub struct Registry {
    codecs: HashMap<char, RecordCodec>,
}

impl Registry {
    /// Constructs a fresh registry with no record types.
    #[must_use]
    pub fn new() -> Self {
        Self {
            codecs: HashMap::new(),
        }
    }

    /// Registers a record type under `tag` with the given field layout
    /// and conversion pair.
    ///
    /// The layout string is parsed eagerly, so malformed layouts surface
    /// here rather than at first use. Both conversion closures are
    /// mandatory: a tag that cannot extract cannot take the encode path,
    /// and this crate requires the capability up front rather than
    /// discovering its absence mid-write.
    ///
    /// # Errors
    ///
    /// * [`RegistryError::DuplicateTag`] if `tag` is already registered
    ///   (first registration wins, layout equality notwithstanding);
    /// * [`RegistryError::ReservedCode`] if `tag` is a primitive code;
    /// * [`RegistryError::UnusableTag`] if `tag` is a bracket or not a
    ///   printable character;
    /// * [`FormatError`](crate::error::FormatError) if `layout` does not
    ///   parse.
    pub fn register<B, X>(&mut self, tag: char, layout: &str, build: B, extract: X) -> CodecResult<()>
    where
        B: Fn(Vec<Value>) -> Box<dyn Record> + Send + Sync + 'static,
        X: Fn(&dyn Record) -> Option<Vec<Value>> + Send + Sync + 'static,
    {
        if tag == '[' || tag == ']' || tag.is_whitespace() || tag.is_control() {
            return Err(RegistryError::UnusableTag(tag).into());
        }
        if Prim::is_code(tag) {
            return Err(RegistryError::ReservedCode(tag).into());
        }
        if self.codecs.contains_key(&tag) {
            return Err(RegistryError::DuplicateTag(tag).into());
        }
        let layout = Layout::parse(layout)?;
        self.codecs.insert(
            tag,
            RecordCodec {
                layout,
                build: Box::new(build),
                extract: Box::new(extract),
            },
        );
        Ok(())
    }

    /// Returns `true` if a record type is registered under `tag`.
    #[must_use]
    pub fn contains(&self, tag: char) -> bool {
        self.codecs.contains_key(&tag)
    }

    /// Returns the number of registered record types.
    #[must_use]
    pub fn len(&self) -> usize {
        self.codecs.len()
    }

    /// Returns `true` if no record types are registered.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.codecs.is_empty()
    }

    /// Iterates over the registered tags, in no particular order.
    pub fn tags(&self) -> impl Iterator<Item = char> + '_ {
        self.codecs.keys().copied()
    }

    /// Looks up the codec registered under `tag`, if any.
    ///
    /// Every lookup after a successful registration returns the same
    /// entry; entries are never replaced or removed.
    #[must_use]
    pub fn codec(&self, tag: char) -> Option<&RecordCodec> {
        self.codecs.get(&tag)
    }

    /// Looks up the codec for `tag`, failing with
    /// [`FormatError::UnknownTag`] if absent. Callers only reach this
    /// for characters that are not primitive codes.
    pub(crate) fn codec_for(&self, tag: char) -> Result<&RecordCodec, FormatError> {
        self.codecs.get(&tag).ok_or(FormatError::UnknownTag(tag))
    }

    /// Decodes one pass of `format` from `source`.
    ///
    /// One value is produced per top-level atom of the layout; a layout
    /// with exactly one top-level atom returns that bare value, any other
    /// layout returns a [`Value::Seq`] in atom order. Bytes remaining in
    /// the source after the pass are left unconsumed.
    ///
    /// # Errors
    ///
    /// Fails with the format class on a malformed layout or an
    /// unregistered tag, and with the parse class if the source is
    /// exhausted mid-field or mid-array; no partial value is returned.
    pub fn decode<P: Parser>(&self, format: &str, source: &mut P) -> CodecResult<Value> {
        let layout = Layout::parse(format)?;
        decode::single_pass(self, &layout, source)
    }

    /// Decodes `format` from `source` repeatedly until the source is
    /// exhausted.
    ///
    /// Re-runs the full top-level pass as long as the remaining-length
    /// probe reports unread bytes, and returns the list of per-run
    /// results (each collapsed exactly as in [`decode`](Self::decode)).
    /// A source whose length is not an exact multiple of one pass's size
    /// fails with the parse class partway through.
    pub fn decode_repeat<P: Parser>(&self, format: &str, source: &mut P) -> CodecResult<Value> {
        let layout = Layout::parse(format)?;
        decode::repeat_passes(self, &layout, source)
    }

    /// Encodes `value` under `format` into `sink`, returning the number
    /// of bytes written.
    ///
    /// A value that is neither a string nor a sequence is broadcast as a
    /// one-element sequence onto the first atom. The elements of a
    /// sequence (or the characters of a string) are then paired with
    /// atoms by cycling the atom index modulo the layout length, which is
    /// what lets a single-tag format write an arbitrarily long flat list
    /// of records, and a multi-atom format write a flat list of
    /// interleaved tuple fields.
    ///
    /// # Errors
    ///
    /// Fails with the encode class when an element's shape does not match
    /// its atom. On any error the sink is left in an undefined
    /// partially-written state and should be discarded.
    pub fn encode<T: Target>(&self, format: &str, value: &Value, sink: &mut T) -> CodecResult<usize> {
        let layout = Layout::parse(format)?;
        encode::write_value(self, &layout, value, sink)
    }
}

#[cfg(test)]
pub(crate) mod fixtures {
    //! Shared record type for engine tests: the layout exercises every
    //! atom kind (scalars, float array, coalesced string, trailing
    //! double).

    use super::Registry;
    use crate::value::{Record, Value};

    pub(crate) const READING_TAG: char = 'T';
    pub(crate) const READING_LAYOUT: &str = "bb[f]f[s]d";

    #[derive(Debug, Clone, PartialEq)]
    pub(crate) struct Reading {
        pub id: i8,
        pub channel: i8,
        pub samples: Vec<f64>,
        pub gain: f64,
        pub label: String,
        pub offset: f64,
    }

    pub(crate) fn build_reading(fields: Vec<Value>) -> Box<dyn Record> {
        let mut it = fields.into_iter();
        let id = it.next().unwrap().as_int().unwrap() as i8;
        let channel = it.next().unwrap().as_int().unwrap() as i8;
        let samples = it
            .next()
            .unwrap()
            .into_seq()
            .unwrap()
            .iter()
            .map(|v| v.as_float().unwrap())
            .collect();
        let gain = it.next().unwrap().as_float().unwrap();
        let label = it.next().unwrap().into_string().unwrap();
        let offset = it.next().unwrap().as_float().unwrap();
        Box::new(Reading {
            id,
            channel,
            samples,
            gain,
            label,
            offset,
        })
    }

    pub(crate) fn extract_reading(rec: &dyn Record) -> Option<Vec<Value>> {
        let r = rec.downcast_ref::<Reading>()?;
        Some(vec![
            Value::Int(r.id as i64),
            Value::Int(r.channel as i64),
            Value::Seq(r.samples.iter().map(|&x| Value::Float(x)).collect()),
            Value::Float(r.gain),
            Value::Str(r.label.clone()),
            Value::Float(r.offset),
        ])
    }

    pub(crate) fn reading_registry() -> Registry {
        let mut reg = Registry::new();
        reg.register(READING_TAG, READING_LAYOUT, build_reading, extract_reading)
            .unwrap();
        reg
    }

    pub(crate) fn sample_reading() -> Reading {
        Reading {
            id: 1,
            channel: 2,
            samples: vec![1.0, 2.0, 3.0],
            gain: 3.0,
            label: "Hallo Welt".to_owned(),
            offset: 4.0,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::fixtures::{self, Reading};
    use super::*;
    use crate::error::CodecError;
    use crate::parse::{byteparser::ByteParser, TryIntoParser};

    #[test]
    fn duplicate_tag_always_fails() {
        let mut reg = fixtures::reading_registry();
        // identical layout, still rejected
        let err = reg
            .register('T', fixtures::READING_LAYOUT, fixtures::build_reading, fixtures::extract_reading)
            .unwrap_err();
        assert!(matches!(
            err,
            CodecError::Registry(RegistryError::DuplicateTag('T'))
        ));
        assert_eq!(reg.len(), 1);
    }

    fn accept_none(_: &dyn Record) -> Option<Vec<Value>> {
        None
    }

    #[test]
    fn reserved_and_unusable_tags_rejected() {
        let mut reg = Registry::new();
        let err = reg
            .register('b', "i", fixtures::build_reading, accept_none)
            .unwrap_err();
        assert!(matches!(
            err,
            CodecError::Registry(RegistryError::ReservedCode('b'))
        ));
        for bad in ['[', ']', ' ', '\n'] {
            let err = reg
                .register(bad, "i", fixtures::build_reading, accept_none)
                .unwrap_err();
            assert!(matches!(
                err,
                CodecError::Registry(RegistryError::UnusableTag(t)) if t == bad
            ));
        }
        assert!(reg.is_empty());
    }

    #[test]
    fn malformed_layout_surfaces_at_registration() {
        let mut reg = Registry::new();
        let err = reg
            .register('Z', "b[f", fixtures::build_reading, accept_none)
            .unwrap_err();
        assert!(matches!(err, CodecError::Format(_)));
        assert!(!reg.contains('Z'));
    }

    #[test]
    fn unknown_tag_fails_at_decode_time() {
        let reg = Registry::new();
        let mut p: ByteParser = vec![0u8; 8].try_into_parser().unwrap();
        let err = reg.decode("Z", &mut p).unwrap_err();
        assert!(matches!(
            err,
            CodecError::Format(FormatError::UnknownTag('Z'))
        ));
    }

    #[test]
    fn registry_is_shareable_once_populated() {
        fn dummy<T: Send + Sync>(_: &T) {}
        let reg = fixtures::reading_registry();
        dummy(&reg);
        assert!(reg.contains('T'));
        assert_eq!(reg.tags().collect::<Vec<_>>(), vec!['T']);
    }

    #[test]
    fn lookup_is_stable() {
        let reg = fixtures::reading_registry();
        let first = reg.codec('T').unwrap().layout().clone();
        let second = reg.codec('T').unwrap().layout().clone();
        assert_eq!(first, second);
        assert_eq!(
            first,
            crate::layout::Layout::parse(fixtures::READING_LAYOUT).unwrap()
        );
        assert!(reg.codec('U').is_none());
    }

    #[test]
    fn canonical_record_round_trip() {
        let reg = fixtures::reading_registry();
        let original = fixtures::sample_reading();

        let mut sink: Vec<u8> = Vec::new();
        reg.encode("T", &Value::record(original.clone()), &mut sink)
            .unwrap();

        let mut source: ByteParser = sink.try_into_parser().unwrap();
        let decoded = reg.decode("T", &mut source).unwrap();
        assert_eq!(decoded.downcast_ref::<Reading>(), Some(&original));
    }

    #[test]
    fn repeated_record_stream_round_trip() {
        let reg = fixtures::reading_registry();
        let original = fixtures::sample_reading();
        const COUNT: usize = 100;

        let stream = Value::Seq(
            std::iter::repeat_with(|| Value::record(original.clone()))
                .take(COUNT)
                .collect(),
        );
        let mut sink: Vec<u8> = Vec::new();
        reg.encode("T", &stream, &mut sink).unwrap();

        let mut source: ByteParser = sink.try_into_parser().unwrap();
        let decoded = reg.decode_repeat("T", &mut source).unwrap();
        let runs = decoded.into_seq().unwrap();
        assert_eq!(runs.len(), COUNT);
        for run in &runs {
            assert_eq!(run.downcast_ref::<Reading>(), Some(&original));
        }
    }
}

//! Engine for transcoding streams of tagged binary records
//!
//! # Overview
//!
//! This library decodes raw byte streams into dynamically-typed values
//! and encodes such values back to bytes, driven entirely by declarative
//! *layout strings* rather than by a hand-written codec per record type.
//! A layout string is a flat sequence of single-character primitive codes
//! (see [`prim`] for the fixed table), bracketed array sections, and
//! record tags; application code registers each record type once, under a
//! tag, in a [`Registry`], together with a pair of closures that convert
//! between the concrete type and its ordered field list. From then on,
//! any layout string mentioning that tag can transcode instances in
//! either direction, and round-trips are byte-identical.
//!
//! The layout string is parsed once, up front, into a small tree of atoms
//! ([`layout`]); both engines interpret that tree recursively: the
//! decoder ([`Registry::decode`]) against a [`Parser`] byte source, the
//! encoder ([`Registry::encode`]) against a [`Target`] byte sink. Array
//! sections are framed on the wire as a native-order `u32` element count
//! followed by the element encodings; records are the plain
//! concatenation of their declared fields, with no tag byte; the stream
//! is not self-describing, and the reading side must know the layout out
//! of band. A stream of concatenated records is drained with
//! [`Registry::decode_repeat`], which re-runs the layout until the
//! source's remaining-length probe reports zero.
//!
//! All fixed-width values are transcoded in the **native byte order** of
//! the host. This is a storage format for data written and read by the
//! same machine (dataset shards, caches, spools), not a portable
//! interchange format; there is no varint encoding, no schema
//! versioning, and no compression.
//!
//! # Example
//!
//! ```
//! use binrec::parse::{byteparser::ByteParser, TryIntoParser};
//! use binrec::{Registry, Value};
//!
//! #[derive(Debug, PartialEq)]
//! struct Point {
//!     x: i32,
//!     y: i32,
//! }
//!
//! let mut registry = Registry::new();
//! registry
//!     .register(
//!         'P',
//!         "ii",
//!         |fields| {
//!             Box::new(Point {
//!                 x: fields[0].as_int().unwrap() as i32,
//!                 y: fields[1].as_int().unwrap() as i32,
//!             })
//!         },
//!         |rec| {
//!             let p = rec.downcast_ref::<Point>()?;
//!             Some(vec![Value::from(p.x), Value::from(p.y)])
//!         },
//!     )
//!     .unwrap();
//!
//! let mut sink: Vec<u8> = Vec::new();
//! registry
//!     .encode("P", &Value::record(Point { x: 3, y: -4 }), &mut sink)
//!     .unwrap();
//! assert_eq!(sink.len(), 8);
//!
//! let mut source: ByteParser = sink.try_into_parser().unwrap();
//! let decoded = registry.decode("P", &mut source).unwrap();
//! assert_eq!(decoded.downcast_ref::<Point>(), Some(&Point { x: 3, y: -4 }));
//! ```
//!
//! # Error taxonomy
//!
//! Failures partition into four classes, aggregated by
//! [`CodecError`](error::CodecError): registration errors and layout
//! errors are programmer/schema mistakes, while truncated input and value
//! shape mismatches are data mistakes. Every error aborts its call
//! immediately; no partial value is ever returned, and a sink that
//! received a failing encode must be discarded.
//!
//! # Concurrency
//!
//! Both engines are single-threaded and synchronous. A populated
//! [`Registry`] is `Send + Sync` and may be shared freely; each
//! decode/encode call must own its source or sink exclusively for the
//! duration of the call.

pub mod builder;
mod decode;
mod encode;
pub mod error;
pub mod layout;
pub mod parse;
pub mod prelude;
pub mod prim;
pub mod registry;
pub mod target;
pub mod value;

#[cfg(feature = "expose_internal")]
pub mod internal;
#[cfg(not(feature = "expose_internal"))]
pub(crate) mod internal;

pub use crate::builder::{strict::StrictBuilder, Builder};
pub use crate::error::{CodecError, CodecResult, EncodeError, FormatError, RegistryError};
pub use crate::layout::{Atom, AtomKind, Layout};
pub use crate::parse::{
    byteparser::ByteParser, error::ParseError, sliceparser::SliceParser, Parser, TryIntoParser,
};
pub use crate::prim::Prim;
pub use crate::registry::{BuildFn, ExtractFn, RecordCodec, Registry};
pub use crate::target::{ByteCounter, Target};
pub use crate::value::{Record, Value, ValueKind};

//! Byte-source abstraction for the decoder
//!
//! This module defines the [`Parser`] trait, the readable-and-seekable
//! source model that the decode engine walks, together with two
//! implementing types: [`ByteParser`](byteparser::ByteParser) over an
//! owned buffer, and [`SliceParser`](sliceparser::SliceParser) over a
//! borrowed slice.
//!
//! # Model
//!
//! * A `Parser` is constructed over an immutable byte buffer.
//! * All consumption is non-backtracking and zero-lookahead: a byte can
//!   only be viewed by consuming it, only after every preceding byte has
//!   been consumed, and never twice.
//! * [`remainder`](Parser::remainder) is the remaining-length probe: it
//!   reports how many bytes are still unconsumed, which is what the
//!   decoder's repeat mode uses to decide when a stream of records has
//!   been fully drained.
//!
//! All fixed-width numeric `take_*` methods convert in the **native**
//! byte order of the host. The record wire format is a storage format for
//! one machine, not a portable interchange format.
//!
//! The utility trait [`TryIntoParser`] facilitates generic instantiation
//! of parser types from a variety of source values (vectors, slices,
//! arrays, strings).

pub mod error;

pub use error::{ParseResult, TruncatedInput};

use error::ParseError;

/// Stateful, non-backtracking reader over a fixed-length byte source.
///
/// Implementations provide the raw [`consume`](Self::consume) operations;
/// the monomorphic `take_*` conversions are defined on top of them and
/// rarely need overriding.
pub trait Parser {
    /// Buffer type a new `Parser` object can be safely and infallibly
    /// instantiated from a value of.
    type Buffer;

    /// Constructs an initialized `Parser` value over a buffer
    fn from_buffer(buf: Self::Buffer) -> Self;

    /// Returns the total length of the underlying source in bytes,
    /// independent of how much has been consumed.
    fn len(&self) -> usize;

    /// Returns `true` if the underlying source contains zero bytes.
    fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Returns the number of bytes consumed so far.
    ///
    /// This increases by exactly the number of bytes returned by every
    /// successful consume operation, and is never decremented.
    fn offset(&self) -> usize;

    /// Computes the remaining number of bytes that can be safely
    /// consumed: the remaining-length probe.
    ///
    /// Even where it can be implemented directly, this must always equal
    /// `self.len() - self.offset()`.
    fn remainder(&self) -> usize {
        self.len() - self.offset()
    }

    /// Consumes and returns a single byte from the current offset.
    ///
    /// Functionally equivalent to a [`consume`](Self::consume) call of
    /// length `1`, aside from the return type.
    fn consume_byte(&mut self) -> ParseResult<u8>;

    /// Attempts to consume and return a slice of length `nbytes`,
    /// starting from the first unconsumed byte.
    ///
    /// # Invariants
    ///
    /// This method **must** return `Ok(s)` when and only when
    /// `nbytes <= self.remainder()` held beforehand, with
    /// `s.len() == nbytes`; on `Err(_)` no bytes may be consumed.
    fn consume(&mut self, nbytes: usize) -> ParseResult<&[u8]>;

    /// Consumes `N` bytes and returns them in array form.
    fn consume_arr<const N: usize>(&mut self) -> ParseResult<[u8; N]> {
        error::coerce_slice(self.consume(N)?)
    }

    /// Consumes one byte and returns it as a `u8` value
    #[inline]
    fn take_u8(&mut self) -> ParseResult<u8> {
        self.consume_byte()
    }

    /// Consumes one byte and returns it as an `i8` value
    #[inline]
    fn take_i8(&mut self) -> ParseResult<i8> {
        Ok(self.consume_byte()? as i8)
    }

    /// Consumes two bytes and returns the corresponding `u16` value
    ///
    /// As with all fixed-width multi-byte numeric `take_*` methods, the
    /// conversion is performed in native byte order.
    #[inline]
    fn take_u16(&mut self) -> ParseResult<u16> {
        self.consume_arr::<2>().map(u16::from_ne_bytes)
    }

    /// Consumes two bytes and returns the corresponding `i16` value
    #[inline]
    fn take_i16(&mut self) -> ParseResult<i16> {
        self.consume_arr::<2>().map(i16::from_ne_bytes)
    }

    /// Consumes four bytes and returns the corresponding `u32` value
    #[inline]
    fn take_u32(&mut self) -> ParseResult<u32> {
        self.consume_arr::<4>().map(u32::from_ne_bytes)
    }

    /// Consumes four bytes and returns the corresponding `i32` value
    #[inline]
    fn take_i32(&mut self) -> ParseResult<i32> {
        self.consume_arr::<4>().map(i32::from_ne_bytes)
    }

    /// Consumes eight bytes and returns the corresponding `u64` value
    #[inline]
    fn take_u64(&mut self) -> ParseResult<u64> {
        self.consume_arr::<8>().map(u64::from_ne_bytes)
    }

    /// Consumes eight bytes and returns the corresponding `i64` value
    #[inline]
    fn take_i64(&mut self) -> ParseResult<i64> {
        self.consume_arr::<8>().map(i64::from_ne_bytes)
    }

    /// Consumes four bytes and returns the corresponding `f32` value
    #[inline]
    fn take_f32(&mut self) -> ParseResult<f32> {
        self.consume_arr::<4>().map(f32::from_ne_bytes)
    }

    /// Consumes eight bytes and returns the corresponding `f64` value
    #[inline]
    fn take_f64(&mut self) -> ParseResult<f64> {
        self.consume_arr::<8>().map(f64::from_ne_bytes)
    }
}

cfg_if::cfg_if! {
    if #[cfg(feature = "strict_strings")] {
        /// Converts consumed bytes into a `String`, rejecting invalid UTF-8.
        pub(crate) fn string_of_bytes(bytes: &[u8]) -> ParseResult<String> {
            String::from_utf8(bytes.to_vec()).map_err(ParseError::NonUtf8)
        }
    } else {
        /// Converts consumed bytes into a `String`, substituting the
        /// replacement character for invalid UTF-8.
        pub(crate) fn string_of_bytes(bytes: &[u8]) -> ParseResult<String> {
            Ok(String::from_utf8_lossy(bytes).into_owned())
        }
    }
}

pub mod buffer {
    //! Common buffer types for `Parser` implementors

    /// Newtype around `Vec<u8>` that only permits immutable access
    ///
    /// Used as the underlying buffer of [`ByteParser`]; its contents are
    /// never mutated after construction.
    ///
    /// [`ByteParser`]: super::byteparser::ByteParser
    #[derive(Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
    #[repr(transparent)]
    pub struct VecBuffer(Vec<u8>);

    impl VecBuffer {
        /// Returns the number of bytes in a `VecBuffer`
        #[must_use]
        pub fn len(&self) -> usize {
            self.0.len()
        }

        /// Returns `true` if the buffer contains zero bytes
        #[must_use]
        pub fn is_empty(&self) -> bool {
            self.0.is_empty()
        }

        /// Borrows a range of bytes starting at index `ix`, of length `len`.
        ///
        /// # Panics
        ///
        /// Will panic if `ix + len` is out-of-bounds
        #[must_use]
        pub fn get_slice(&self, ix: usize, len: usize) -> &[u8] {
            &self.0[ix..ix + len]
        }

        /// Returns the byte at the specified index.
        ///
        /// # Panics
        ///
        /// Will panic if `ix` is out-of-bounds
        #[must_use]
        pub fn get_byte(&self, ix: usize) -> u8 {
            self.0[ix]
        }
    }

    impl std::fmt::Debug for VecBuffer {
        fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
            <Vec<u8> as std::fmt::Debug>::fmt(&self.0, f)
        }
    }

    impl From<&[u8]> for VecBuffer {
        fn from(bytes: &[u8]) -> Self {
            Self(bytes.to_owned())
        }
    }

    impl From<Vec<u8>> for VecBuffer {
        fn from(bytes: Vec<u8>) -> Self {
            Self(bytes)
        }
    }

    impl<const N: usize> From<[u8; N]> for VecBuffer {
        fn from(bytes: [u8; N]) -> Self {
            Self(bytes.to_vec())
        }
    }

    impl<const N: usize> From<&'_ [u8; N]> for VecBuffer {
        fn from(bytes: &'_ [u8; N]) -> Self {
            Self(bytes.to_vec())
        }
    }

    impl From<&'_ str> for VecBuffer {
        fn from(s: &'_ str) -> Self {
            Self(s.as_bytes().to_owned())
        }
    }

    impl From<String> for VecBuffer {
        fn from(s: String) -> Self {
            Self(s.into_bytes())
        }
    }

    /// Newtype around a lifetime-annotated immutable slice `&'a [u8]`
    ///
    /// Used only as the buffer type of [`SliceParser`]; the newtype
    /// prevents overlapping interpretations of what role a bare
    /// `&'a [u8]` plays in this crate.
    ///
    /// [`SliceParser`]: super::sliceparser::SliceParser
    #[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
    #[repr(transparent)]
    pub struct SliceBuffer<'a>(&'a [u8]);

    impl<'a> SliceBuffer<'a> {
        /// Creates a `SliceBuffer<'a>` from a slice of type `&'a [u8]`
        #[must_use]
        pub const fn new(slice: &'a [u8]) -> Self {
            Self(slice)
        }

        /// Extracts a copy of the internal `&'a [u8]`
        #[must_use]
        pub const fn as_slice(&self) -> &'a [u8] {
            self.0
        }

        /// Returns the number of bytes in a `SliceBuffer`.
        #[inline]
        #[must_use]
        pub const fn len(&self) -> usize {
            self.0.len()
        }

        /// Returns `true` if the `SliceBuffer` has a length of 0
        #[must_use]
        pub const fn is_empty(&self) -> bool {
            self.0.is_empty()
        }

        /// Attempts to extract the first byte of a `SliceBuffer`,
        /// returning both the extracted byte and the remainder of the
        /// buffer, or `None` if the buffer is empty.
        #[must_use]
        pub const fn cut_first(&self) -> Option<(u8, Self)> {
            if let [first, tail @ ..] = self.0 {
                Some((*first, Self(tail)))
            } else {
                None
            }
        }

        /// Extracts the first `n` bytes of a `SliceBuffer` as a slice,
        /// along with the remainder as a `SliceBuffer`.
        ///
        /// # Panics
        ///
        /// Will panic if `n` exceeds the length of the buffer
        #[must_use]
        pub fn take(&self, n: usize) -> (&'a [u8], Self) {
            let (head, tail) = self.0.split_at(n);
            (head, Self(tail))
        }
    }

    impl<'a> From<&'a [u8]> for SliceBuffer<'a> {
        #[inline]
        fn from(bytes: &'a [u8]) -> Self {
            Self(bytes)
        }
    }

    impl<'a, const N: usize> From<&'a [u8; N]> for SliceBuffer<'a> {
        #[inline]
        fn from(bytes: &'a [u8; N]) -> Self {
            Self(bytes)
        }
    }
}

macro_rules! impl_iterator_parser {
    ( $t:ty ) => {
        impl Iterator for $t {
            type Item = u8;

            fn next(&mut self) -> Option<Self::Item> {
                <$t as $crate::parse::Parser>::consume_byte(self).ok()
            }
        }
    };
}

pub(self) use impl_iterator_parser;

pub mod byteparser {
    use super::buffer::VecBuffer;
    use super::error::{ParseError, ParseResult, TruncatedInput};
    use super::Parser;
    use crate::internal::offset::LimitOffset;

    /// `Parser` over an owned, immutable byte buffer.
    ///
    /// This is the default parser type of the crate, and the one that
    /// [`TryIntoParser`](super::TryIntoParser) instantiates when no other
    /// type is requested.
    #[derive(Debug)]
    pub struct ByteParser {
        buffer: VecBuffer,
        offset: LimitOffset,
    }

    impl ByteParser {
        /// Reads the full contents of `r` into a fresh buffer and
        /// returns a parser positioned at its start.
        ///
        /// # Errors
        ///
        /// Propagates any error returned while draining the reader.
        pub fn from_reader<R: std::io::Read>(mut r: R) -> std::io::Result<Self> {
            let mut buf = Vec::new();
            r.read_to_end(&mut buf)?;
            Ok(<Self as Parser>::from_buffer(buf.into()))
        }

        fn truncated(&self, requested: usize) -> ParseError {
            ParseError::Truncated(TruncatedInput {
                offset: self.offset.index(),
                requested,
                limit: self.offset.limit(),
            })
        }
    }

    impl Parser for ByteParser {
        type Buffer = VecBuffer;

        /// Creates a `ByteParser` over a buffer, with an offset of 0 at
        /// time of creation.
        fn from_buffer(buffer: Self::Buffer) -> Self {
            let offset = LimitOffset::with_limit(buffer.len());
            Self { buffer, offset }
        }

        #[inline]
        #[must_use]
        fn len(&self) -> usize {
            self.offset.limit()
        }

        #[inline]
        #[must_use]
        fn offset(&self) -> usize {
            self.offset.index()
        }

        #[inline]
        fn remainder(&self) -> usize {
            self.offset.rem()
        }

        fn consume_byte(&mut self) -> ParseResult<u8> {
            let (ix, adv) = self.offset.advance(1);
            if adv {
                Ok(self.buffer.get_byte(ix))
            } else {
                Err(self.truncated(1))
            }
        }

        fn consume(&mut self, nbytes: usize) -> ParseResult<&[u8]> {
            let (ix, adv) = self.offset.advance(nbytes);
            if adv {
                Ok(self.buffer.get_slice(ix, nbytes))
            } else {
                Err(self.truncated(nbytes))
            }
        }
    }

    super::impl_iterator_parser!(ByteParser);
}

pub mod sliceparser {
    use super::buffer::SliceBuffer;
    use super::error::{ParseError, ParseResult, TruncatedInput};
    use super::Parser;

    /// `Parser` over a borrowed byte slice.
    ///
    /// Operates on a shrinking view of the original slice; nothing is
    /// copied until a consume operation's caller decides to keep the
    /// returned bytes.
    #[derive(Debug)]
    pub struct SliceParser<'a> {
        buffer: SliceBuffer<'a>,
        consumed: usize,
    }

    impl<'a> Parser for SliceParser<'a> {
        type Buffer = SliceBuffer<'a>;

        fn from_buffer(buffer: Self::Buffer) -> Self {
            Self {
                buffer,
                consumed: 0,
            }
        }

        #[inline]
        fn len(&self) -> usize {
            self.consumed + self.buffer.len()
        }

        #[inline]
        fn offset(&self) -> usize {
            self.consumed
        }

        #[inline]
        fn remainder(&self) -> usize {
            self.buffer.len()
        }

        fn consume_byte(&mut self) -> ParseResult<u8> {
            match self.buffer.cut_first() {
                Some((byte, rest)) => {
                    self.buffer = rest;
                    self.consumed += 1;
                    Ok(byte)
                }
                None => Err(ParseError::Truncated(TruncatedInput {
                    offset: self.consumed,
                    requested: 1,
                    limit: self.len(),
                })),
            }
        }

        fn consume(&mut self, nbytes: usize) -> ParseResult<&[u8]> {
            if nbytes <= self.buffer.len() {
                let (head, rest) = self.buffer.take(nbytes);
                self.buffer = rest;
                self.consumed += nbytes;
                Ok(head)
            } else {
                Err(ParseError::Truncated(TruncatedInput {
                    offset: self.consumed,
                    requested: nbytes,
                    limit: self.len(),
                }))
            }
        }
    }

    super::impl_iterator_parser!(SliceParser<'_>);
}

use byteparser::ByteParser;

/// Helper trait marking types that can be converted, possibly fallibly,
/// into `Parser` objects of the specified type.
///
/// When no generic argument is provided, the default `Parser` type used
/// is [`ByteParser`].
pub trait TryIntoParser<P = ByteParser>
where
    P: Parser,
{
    /// Attempts to produce a parser object of type `P` over the bytes
    /// represented by `self`.
    ///
    /// # Errors
    ///
    /// Returns an error if the conversion from `self` into the buffer
    /// type of `P` failed; the conversions defined within this crate are
    /// all infallible.
    fn try_into_parser(self) -> ParseResult<P>;
}

impl<P, T> TryIntoParser<P> for T
where
    P: Parser,
    <P as Parser>::Buffer: TryFrom<T>,
    <T as TryInto<<P as Parser>::Buffer>>::Error: Into<ParseError>,
{
    fn try_into_parser(self) -> ParseResult<P> {
        let buffer = match <<P as Parser>::Buffer as TryFrom<T>>::try_from(self) {
            Ok(x) => x,
            Err(err) => return Err(err.into()),
        };
        Ok(P::from_buffer(buffer))
    }
}

#[cfg(test)]
mod tests {
    use super::sliceparser::SliceParser;
    use super::*;

    fn probe_drains<P: Parser>(mut p: P) {
        assert_eq!(p.len(), 4);
        assert_eq!(p.remainder(), 4);
        assert_eq!(p.take_u16().unwrap(), u16::from_ne_bytes([1, 2]));
        assert_eq!(p.remainder(), 2);
        assert_eq!(p.consume(2).unwrap(), &[3, 4]);
        assert_eq!(p.remainder(), 0);
        assert!(matches!(
            p.consume_byte(),
            Err(error::ParseError::Truncated(TruncatedInput {
                offset: 4,
                requested: 1,
                limit: 4,
            }))
        ));
    }

    #[test]
    fn byteparser_probe() {
        probe_drains(TryIntoParser::<ByteParser>::try_into_parser(vec![1u8, 2, 3, 4]).unwrap());
    }

    #[test]
    fn sliceparser_probe() {
        let buf: &[u8] = &[1, 2, 3, 4];
        probe_drains(TryIntoParser::<SliceParser>::try_into_parser(buf).unwrap());
    }

    #[test]
    fn failed_consume_leaves_offset_unchanged() {
        let mut p: ByteParser = vec![1u8, 2].try_into_parser().unwrap();
        assert!(p.consume(3).is_err());
        assert_eq!(p.offset(), 0);
        assert_eq!(p.consume(2).unwrap(), &[1, 2]);
    }

    #[test]
    fn native_order_round_trip() {
        let mut bytes = Vec::new();
        bytes.extend(0x1234_5678u32.to_ne_bytes());
        bytes.extend((-9.25f64).to_ne_bytes());
        let mut p: ByteParser = bytes.try_into_parser().unwrap();
        assert_eq!(p.take_u32().unwrap(), 0x1234_5678);
        assert_eq!(p.take_f64().unwrap(), -9.25);
    }
}

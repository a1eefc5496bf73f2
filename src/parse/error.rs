//! Error types used to report failure in low-level stream consumption
//!
//! This module defines the primary type [`ParseError`] and the alias
//! [`ParseResult<T>`], returned by the methods of
//! [`Parser`](super::Parser) implementors. The dominant class by far is
//! truncation: the source ran out of bytes before a field, an array
//! count, or an array body could be fully read.

use std::array::TryFromSliceError;
use std::error::Error;
use std::fmt::{Display, Formatter, Result};
use std::string::FromUtf8Error;

/// Enumeration type over all errors that may be encountered when calling
/// methods on `Parser` types.
#[derive(Clone, Debug)]
pub enum ParseError {
    /// The source was exhausted before the requested bytes could be
    /// consumed. No partial value is ever produced; the walk that hit
    /// this error aborts immediately.
    Truncated(TruncatedInput),
    /// An internal invariant or precondition was violated; indicates an
    /// implementation bug rather than bad input.
    Internal(InternalError),
    /// Bytes that were required to form valid UTF-8 did not.
    ///
    /// Only produced when the `strict_strings` feature is enabled; the
    /// default behavior substitutes replacement characters instead.
    NonUtf8(FromUtf8Error),
}

impl Display for ParseError {
    fn fmt(&self, f: &mut Formatter<'_>) -> Result {
        match self {
            ParseError::Truncated(err) => Display::fmt(err, f),
            ParseError::Internal(err) => Display::fmt(err, f),
            ParseError::NonUtf8(err) => write!(f, "string data was not valid UTF-8: {err}"),
        }
    }
}

impl From<std::convert::Infallible> for ParseError {
    fn from(_void: std::convert::Infallible) -> Self {
        match _void {}
    }
}

impl Error for ParseError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            ParseError::Truncated(err) => Some(err),
            ParseError::Internal(err) => Some(err),
            ParseError::NonUtf8(err) => Some(err),
        }
    }
}

/// Type alias for Result with an error type of [`ParseError`]
pub type ParseResult<T> = std::result::Result<T, ParseError>;

/// Error case when a consume operation would read past the end of the
/// source.
///
/// The reported `offset` is the position the source had reached when the
/// oversized request of `requested` bytes was made against a source of
/// `limit` total bytes.
#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub struct TruncatedInput {
    pub offset: usize,
    pub requested: usize,
    pub limit: usize,
}

impl Display for TruncatedInput {
    fn fmt(&self, f: &mut Formatter<'_>) -> Result {
        write!(
            f,
            "source exhausted: cannot consume {} bytes at offset {} of {}-byte source",
            self.requested, self.offset, self.limit
        )
    }
}

impl Error for TruncatedInput {}

impl From<TruncatedInput> for ParseError {
    fn from(err: TruncatedInput) -> Self {
        Self::Truncated(err)
    }
}

/// Implementation-internal errors
///
/// This error class represents certain 'impossible' cases which signify
/// an implementation bug in a `Parser` type, rather than a property of
/// the input.
#[derive(Clone, Copy, Debug)]
pub enum InternalError {
    SliceCoerceFailure(TryFromSliceError),
}

impl From<TryFromSliceError> for InternalError {
    fn from(err: TryFromSliceError) -> Self {
        Self::SliceCoerceFailure(err)
    }
}

impl From<InternalError> for ParseError {
    fn from(err: InternalError) -> Self {
        Self::Internal(err)
    }
}

impl Display for InternalError {
    fn fmt(&self, f: &mut Formatter<'_>) -> Result {
        match self {
            InternalError::SliceCoerceFailure(_err) => {
                write!(f, "failed to coerce from byte-slice to fixed-length array")
            }
        }
    }
}

impl Error for InternalError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            InternalError::SliceCoerceFailure(err) => Some(err),
        }
    }
}

/// Converts a borrowed byte-slice into an owned byte-array
///
/// Returns a [`ParseError`] corresponding to the reason for failure if
/// this conversion cannot be performed; such an error is guaranteed to be
/// an [`InternalError`], as every caller requests exactly the slice
/// length it consumed.
pub(crate) fn coerce_slice<const N: usize>(bytes: &'_ [u8]) -> ParseResult<[u8; N]> {
    match <[u8; N] as TryFrom<&'_ [u8]>>::try_from(bytes) {
        Ok(array) => Ok(array),
        Err(err) => Err(ParseError::from(InternalError::from(err))),
    }
}

//! Extension trait for Targets with explicit finalization
//!
//! A `Builder` is a kind of [`Target`] intended for a potentially large
//! number of build-up operations followed by a single terminal
//! [`finalize`](Builder::finalize), which freezes the contents and hands
//! them over to whatever endpoint the serialized bytes are destined for.
//!
//! This module contains the definition of the `Builder` trait itself and
//! one implementing type, [`strict::StrictBuilder`].

use crate::target::Target;

/// `Target` extension trait with constructors for small segments and an
/// explicit freeze operation.
///
/// `Final` is implementation-dependent, but at the very least must
/// implement `Into<Vec<u8>>`; it is intended as a read-oriented analogue
/// of the write-optimized `Self`. The finalized value must contain the
/// same bytes in the same order, but may have a completely different
/// structural layout or metadata.
pub trait Builder
where
    Self: Target + Sized,
{
    /// Type suitable for presenting the finalized contents of a
    /// `Builder` object
    type Final: Into<Vec<u8>>;

    /// Creates a `Self` object containing a single byte
    fn word(b: u8) -> Self;

    /// Creates a `Self` object containing a fixed number of bytes
    fn words<const N: usize>(arr: [u8; N]) -> Self;

    /// Converts a `Self` value into a `Self::Final` value once it is
    /// fully built.
    fn finalize(self) -> Self::Final;

    /// Consumes the Builder object and returns a vector of its contents
    fn into_vec(self) -> Vec<u8> {
        self.finalize().into()
    }

    /// Returns a Builder object containing zero bytes. Defaults to
    /// `words` over an empty array.
    fn empty() -> Self {
        Self::words([])
    }

    /// Determines the length of the Builder value in bytes
    fn len(&self) -> usize;

    /// Returns `true` if the receiver contains no bytes
    fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

pub mod strict;

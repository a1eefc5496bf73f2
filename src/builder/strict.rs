//! Builder type implemented as a newtype around `Vec<u8>`
//!
//! `StrictBuilder` accumulates every pushed byte eagerly into a single
//! contiguous vector. Most of its methods delegate directly to the
//! underlying `Vec<u8>` and are not individually documented.

use std::borrow::Borrow;

use crate::target::Target;

/// Newtype around `Vec<u8>` to use as Builder
#[derive(PartialEq, Eq, PartialOrd, Ord, Clone, Debug, Default)]
#[repr(transparent)]
pub struct StrictBuilder(Vec<u8>);

impl Borrow<[u8]> for StrictBuilder {
    fn borrow(&self) -> &[u8] {
        self.0.borrow()
    }
}

impl From<StrictBuilder> for Vec<u8> {
    fn from(val: StrictBuilder) -> Self {
        val.0
    }
}

impl From<Vec<u8>> for StrictBuilder {
    fn from(buf: Vec<u8>) -> StrictBuilder {
        StrictBuilder(buf)
    }
}

impl From<&[u8]> for StrictBuilder {
    fn from(buf: &[u8]) -> StrictBuilder {
        StrictBuilder(buf.into())
    }
}

impl std::io::Write for StrictBuilder {
    /// Calls `<Vec<u8> as Write>::write` on the inner vector
    fn write(&mut self, buf: &[u8]) -> std::io::Result<usize> {
        self.0.write(buf)
    }

    /// Calls `<Vec<u8> as Write>::flush` on the inner vector
    fn flush(&mut self) -> std::io::Result<()> {
        self.0.flush()
    }
}

impl Target for StrictBuilder {
    fn anticipate(&mut self, extra: usize) {
        self.0.anticipate(extra)
    }

    fn create() -> Self {
        Self(Vec::create())
    }

    fn push_one(&mut self, b: u8) -> usize {
        self.0.push_one(b)
    }

    fn push_many<const N: usize>(&mut self, arr: [u8; N]) -> usize {
        self.0.push_many(arr)
    }

    fn push_all(&mut self, buf: &[u8]) -> usize {
        self.0.push_all(buf)
    }

    fn resolve(&mut self) {
        self.0.resolve()
    }
}

impl super::Builder for StrictBuilder {
    /// In order to distinguish between finalized and non-finalized
    /// `StrictBuilder`s, `Final := Vec<u8>` is used over `Final := Self`
    type Final = Vec<u8>;

    fn word(b: u8) -> Self {
        vec![b].into()
    }

    fn words<const N: usize>(arr: [u8; N]) -> Self {
        arr.to_vec().into()
    }

    fn finalize(self) -> Self::Final {
        self.0
    }

    fn len(&self) -> usize {
        Vec::len(&self.0)
    }
}

//! Monotone cursor for buffer-backed parsers
//!
//! [`LimitOffset`] tracks the position of a non-backtracking parser over
//! a fixed-length buffer: an index that only ever moves forward, and an
//! absolute limit it may reach but never exceed.

/// Wrapper around [`usize`] that represents monotonically increasing
/// indices into a buffer.
#[derive(Copy, Clone, Eq, PartialEq, Ord, PartialOrd, Hash, Debug, Default)]
#[repr(transparent)]
pub struct Index(usize);

impl Index {
    /// Constructs a new `Index` object initialized to `0`
    #[inline(always)]
    #[must_use]
    pub fn new() -> Self {
        Self(0usize)
    }

    /// Advances the held value by `n` unless this would cause it to
    /// exceed `lim`.
    ///
    /// Returns the original value (before incrementation), along with a
    /// boolean that is `true` if and only if the increment occurred. The
    /// increment always occurs when `n == 0`, and in general whenever
    /// `ix + n <= lim` for the currently held `ix`.
    #[inline]
    pub fn increment_checked(&mut self, n: usize, lim: usize) -> (usize, bool) {
        let ret = self.0;
        let is_valid = self.0 + n <= lim;
        if is_valid {
            self.0 += n;
        }
        (ret, is_valid)
    }

    /// Unwraps the `usize` stored within an `Index` value.
    #[must_use]
    #[inline(always)]
    pub fn to_usize(self) -> usize {
        self.0
    }
}

impl From<usize> for Index {
    #[inline]
    fn from(ix: usize) -> Self {
        Self(ix)
    }
}

impl From<Index> for usize {
    #[inline]
    fn from(ix: Index) -> Self {
        ix.0
    }
}

/// An [`Index`] paired with the invariant absolute limit it is tracked
/// against.
///
/// The limit is fixed at construction time; there is no mechanism for
/// narrowing or widening it afterwards, as the record wire format frames
/// arrays by element count rather than by byte length.
#[derive(Copy, Clone, Debug)]
pub struct LimitOffset {
    lim: usize,
    cur: Index,
}

impl LimitOffset {
    /// Constructs a tracker over `lim` total indices, positioned at `0`.
    #[must_use]
    pub fn with_limit(lim: usize) -> Self {
        Self {
            lim,
            cur: Index::new(),
        }
    }

    /// Returns the current index value.
    #[inline]
    #[must_use]
    pub fn index(&self) -> usize {
        self.cur.to_usize()
    }

    /// Returns the absolute upper bound on the index.
    #[inline]
    #[must_use]
    pub fn limit(&self) -> usize {
        self.lim
    }

    /// Returns the number of indices remaining in `index..limit`.
    #[inline]
    #[must_use]
    pub fn rem(&self) -> usize {
        debug_assert!(self.cur.to_usize() <= self.lim);
        self.lim - self.cur.to_usize()
    }

    /// Attempts to advance the index by `n`.
    ///
    /// Returns the original index along with a boolean indicating whether
    /// the advance was in-bounds and therefore performed. Saturation is
    /// not an option: the index either remains unchanged or increases by
    /// exactly `n`.
    #[inline]
    pub fn advance(&mut self, n: usize) -> (usize, bool) {
        self.cur.increment_checked(n, self.lim)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn advance_up_to_limit() {
        let mut off = LimitOffset::with_limit(4);
        assert_eq!(off.advance(3), (0, true));
        assert_eq!(off.rem(), 1);
        assert_eq!(off.advance(2), (3, false));
        assert_eq!(off.index(), 3);
        assert_eq!(off.advance(1), (3, true));
        assert_eq!(off.rem(), 0);
    }

    #[test]
    fn zero_advance_always_succeeds() {
        let mut off = LimitOffset::with_limit(0);
        assert_eq!(off.advance(0), (0, true));
        assert_eq!(off.advance(1), (0, false));
    }
}

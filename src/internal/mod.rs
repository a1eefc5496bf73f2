//! Implementation-internal helper types
//!
//! Nothing in this module is part of the stable API; it is only exported
//! when the `expose_internal` feature is enabled, for downstream code
//! that wants to build its own `Parser` implementations on the same
//! bookkeeping primitives.

pub mod offset;

pub use offset::{Index, LimitOffset};

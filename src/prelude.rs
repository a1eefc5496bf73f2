//! Common imports for downstream users of the crate
//!
//! Blanket-importing this module brings the registry, the value model,
//! both source parser types, and both sink types into scope.

pub use crate::builder::{strict::StrictBuilder, Builder};
pub use crate::error::{CodecError, CodecResult, EncodeError, FormatError, RegistryError};
pub use crate::layout::Layout;
pub use crate::parse::{byteparser::ByteParser, sliceparser::SliceParser, Parser, TryIntoParser};
pub use crate::registry::Registry;
pub use crate::target::{ByteCounter, Target};
pub use crate::value::{Record, Value, ValueKind};
pub use crate::vals;

//! Fixed table of primitive layout codes
//!
//! Every primitive is a single character with a fixed byte width and a
//! fixed native-order binary representation, shared identically by the
//! decoder and the encoder. The table is closed: there is no mechanism
//! for registering additional primitive codes at runtime (record tags
//! serve that purpose).
//!
//! | code | meaning                 | width |
//! |------|-------------------------|-------|
//! | `b`  | signed 8-bit integer    | 1     |
//! | `B`  | unsigned 8-bit integer  | 1     |
//! | `h`  | signed 16-bit integer   | 2     |
//! | `H`  | unsigned 16-bit integer | 2     |
//! | `i`  | signed 32-bit integer   | 4     |
//! | `I`  | unsigned 32-bit integer | 4     |
//! | `q`  | signed 64-bit integer   | 8     |
//! | `Q`  | unsigned 64-bit integer | 8     |
//! | `f`  | IEEE-754 binary32 float | 4     |
//! | `d`  | IEEE-754 binary64 float | 8     |
//! | `s`  | one-byte string unit    | 1     |
//!
//! The `s` code is a single UTF-8 code unit, not a counted string: on its
//! own it transcodes one byte, and it becomes useful as the inner layout
//! of an array section (`[s]`), where the decoded run of units coalesces
//! into one string value.

use crate::parse::{string_of_bytes, ParseResult, Parser};
use crate::value::Value;

/// A primitive layout code.
///
/// Signed integer variants widen to [`Value::Int`] when decoded, unsigned
/// variants to [`Value::UInt`], and both float variants to
/// [`Value::Float`]; the widening is exact in all cases, so a decoded
/// value re-encoded under the same code reproduces the original bytes.
#[derive(Clone, Copy, PartialEq, Eq, Hash, Debug)]
pub enum Prim {
    I8,
    U8,
    I16,
    U16,
    I32,
    U32,
    I64,
    U64,
    F32,
    F64,
    Str,
}

impl Prim {
    /// Looks up the primitive for a layout-string character.
    #[must_use]
    pub const fn from_code(c: char) -> Option<Self> {
        match c {
            'b' => Some(Prim::I8),
            'B' => Some(Prim::U8),
            'h' => Some(Prim::I16),
            'H' => Some(Prim::U16),
            'i' => Some(Prim::I32),
            'I' => Some(Prim::U32),
            'q' => Some(Prim::I64),
            'Q' => Some(Prim::U64),
            'f' => Some(Prim::F32),
            'd' => Some(Prim::F64),
            's' => Some(Prim::Str),
            _ => None,
        }
    }

    /// Returns the layout-string character for this primitive.
    #[must_use]
    pub const fn code(self) -> char {
        match self {
            Prim::I8 => 'b',
            Prim::U8 => 'B',
            Prim::I16 => 'h',
            Prim::U16 => 'H',
            Prim::I32 => 'i',
            Prim::U32 => 'I',
            Prim::I64 => 'q',
            Prim::U64 => 'Q',
            Prim::F32 => 'f',
            Prim::F64 => 'd',
            Prim::Str => 's',
        }
    }

    /// Returns the fixed number of bytes this primitive occupies on the wire.
    #[must_use]
    pub const fn width(self) -> usize {
        match self {
            Prim::I8 | Prim::U8 | Prim::Str => 1,
            Prim::I16 | Prim::U16 => 2,
            Prim::I32 | Prim::U32 | Prim::F32 => 4,
            Prim::I64 | Prim::U64 | Prim::F64 => 8,
        }
    }

    /// Returns `true` if `c` is one of the fixed primitive codes.
    #[must_use]
    pub const fn is_code(c: char) -> bool {
        Self::from_code(c).is_some()
    }

    /// Consumes this primitive's fixed width from `p` and converts the
    /// bytes per its native-order representation.
    pub(crate) fn read<P: Parser>(self, p: &mut P) -> ParseResult<Value> {
        Ok(match self {
            Prim::I8 => Value::Int(p.take_i8()? as i64),
            Prim::U8 => Value::UInt(p.take_u8()? as u64),
            Prim::I16 => Value::Int(p.take_i16()? as i64),
            Prim::U16 => Value::UInt(p.take_u16()? as u64),
            Prim::I32 => Value::Int(p.take_i32()? as i64),
            Prim::U32 => Value::UInt(p.take_u32()? as u64),
            Prim::I64 => Value::Int(p.take_i64()?),
            Prim::U64 => Value::UInt(p.take_u64()?),
            Prim::F32 => Value::Float(p.take_f32()? as f64),
            Prim::F64 => Value::Float(p.take_f64()?),
            Prim::Str => Value::Str(string_of_bytes(p.consume(1)?)?),
        })
    }
}

//! Dynamically-typed transcoded values
//!
//! The decoder produces, and the encoder consumes, values of the
//! [`Value`] enum: scalars, strings, ordered sequences, and constructed
//! record instances. Ownership of a decoded `Value` passes to the caller
//! immediately; the engine keeps nothing.
//!
//! Record instances are carried as `Box<dyn Record>`. [`Record`] is a
//! blanket-implemented capability trait (any `'static` type that is
//! `Debug + Send + Sync` qualifies) whose only job is to permit
//! downcasting back to the concrete type via [`Any`]. Conversion between
//! an instance and its ordered field list is *not* part of the trait; it
//! is the build/extract pair supplied at registration time (see
//! [`Registry::register`](crate::registry::Registry::register)).

use std::any::Any;
use std::fmt::{self, Debug, Display, Formatter};

/// Object-safe capability bound for record instances stored inside a
/// [`Value`].
///
/// Implemented automatically for every eligible type; there is never a
/// reason to implement it by hand.
pub trait Record: Any + Debug + Send + Sync {
    /// Upcasts the receiver for downcasting via [`Any`].
    fn as_any(&self) -> &dyn Any;
}

impl<T: Any + Debug + Send + Sync> Record for T {
    fn as_any(&self) -> &dyn Any {
        self
    }
}

impl dyn Record {
    /// Returns `true` if the boxed instance is of concrete type `T`.
    #[must_use]
    pub fn is<T: Any>(&self) -> bool {
        self.as_any().is::<T>()
    }

    /// Borrows the instance as its concrete type, if it is a `T`.
    #[must_use]
    pub fn downcast_ref<T: Any>(&self) -> Option<&T> {
        self.as_any().downcast_ref::<T>()
    }
}

/// A decoded (or encodable) value.
///
/// Numeric variants are deliberately wider than the wire primitives:
/// every signed integer code widens to `Int`, every unsigned code to
/// `UInt`, and both float codes to `Float`. All of these widenings are
/// exact, and the layout string, not the value, determines the width
/// written back out, so round-trips are byte-identical.
#[derive(Debug)]
pub enum Value {
    /// Signed integral scalar.
    Int(i64),
    /// Unsigned integral scalar.
    UInt(u64),
    /// Floating-point scalar.
    Float(f64),
    /// String, either a single decoded `s` unit or a coalesced array.
    Str(String),
    /// Ordered sequence of values.
    Seq(Vec<Value>),
    /// Constructed record instance.
    Record(Box<dyn Record>),
}

impl Value {
    /// Wraps a record instance.
    #[must_use]
    pub fn record<R: Record>(rec: R) -> Self {
        Value::Record(Box::new(rec))
    }

    /// Shape descriptor used in diagnostics.
    #[must_use]
    pub fn kind(&self) -> ValueKind {
        match self {
            Value::Int(_) => ValueKind::Int,
            Value::UInt(_) => ValueKind::UInt,
            Value::Float(_) => ValueKind::Float,
            Value::Str(_) => ValueKind::Str,
            Value::Seq(_) => ValueKind::Seq,
            Value::Record(_) => ValueKind::Record,
        }
    }

    /// Returns the integral value, if the receiver is an integer that
    /// fits in `i64`.
    #[must_use]
    pub fn as_int(&self) -> Option<i64> {
        match *self {
            Value::Int(i) => Some(i),
            Value::UInt(u) => i64::try_from(u).ok(),
            _ => None,
        }
    }

    /// Returns the integral value, if the receiver is a non-negative
    /// integer.
    #[must_use]
    pub fn as_uint(&self) -> Option<u64> {
        match *self {
            Value::UInt(u) => Some(u),
            Value::Int(i) => u64::try_from(i).ok(),
            _ => None,
        }
    }

    /// Returns the floating-point value, if the receiver is a float.
    #[must_use]
    pub fn as_float(&self) -> Option<f64> {
        match *self {
            Value::Float(x) => Some(x),
            _ => None,
        }
    }

    /// Borrows the string contents, if the receiver is a string.
    #[must_use]
    pub fn as_str(&self) -> Option<&str> {
        match self {
            Value::Str(s) => Some(s.as_str()),
            _ => None,
        }
    }

    /// Borrows the elements, if the receiver is a sequence.
    #[must_use]
    pub fn as_seq(&self) -> Option<&[Value]> {
        match self {
            Value::Seq(elems) => Some(elems.as_slice()),
            _ => None,
        }
    }

    /// Borrows the record instance, if the receiver is a record.
    #[must_use]
    pub fn as_record(&self) -> Option<&dyn Record> {
        match self {
            Value::Record(rec) => Some(rec.as_ref()),
            _ => None,
        }
    }

    /// Borrows the record instance as its concrete type, if the receiver
    /// is a record of type `T`.
    #[must_use]
    pub fn downcast_ref<T: Any>(&self) -> Option<&T> {
        self.as_record()?.downcast_ref::<T>()
    }

    /// Destructs the receiver into its elements, if it is a sequence.
    #[must_use]
    pub fn into_seq(self) -> Option<Vec<Value>> {
        match self {
            Value::Seq(elems) => Some(elems),
            _ => None,
        }
    }

    /// Destructs the receiver into its string contents, if it is a
    /// string.
    #[must_use]
    pub fn into_string(self) -> Option<String> {
        match self {
            Value::Str(s) => Some(s),
            _ => None,
        }
    }
}

/// Coarse classification of a [`Value`], carried inside
/// [`EncodeError::Mismatch`](crate::error::EncodeError::Mismatch).
#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub enum ValueKind {
    Int,
    UInt,
    Float,
    Str,
    Seq,
    Record,
}

impl Display for ValueKind {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        let name = match self {
            ValueKind::Int => "a signed integer",
            ValueKind::UInt => "an unsigned integer",
            ValueKind::Float => "a float",
            ValueKind::Str => "a string",
            ValueKind::Seq => "a sequence",
            ValueKind::Record => "a record instance",
        };
        f.write_str(name)
    }
}

macro_rules! value_from_signed {
    ( $( $t:ty ),+ $(,)? ) => {
        $( impl From<$t> for Value {
            fn from(x: $t) -> Self {
                Value::Int(x as i64)
            }
        }
        )+
    };
}

macro_rules! value_from_unsigned {
    ( $( $t:ty ),+ $(,)? ) => {
        $( impl From<$t> for Value {
            fn from(x: $t) -> Self {
                Value::UInt(x as u64)
            }
        }
        )+
    };
}

value_from_signed![i8, i16, i32, i64];
value_from_unsigned![u8, u16, u32, u64];

impl From<f32> for Value {
    fn from(x: f32) -> Self {
        Value::Float(x as f64)
    }
}

impl From<f64> for Value {
    fn from(x: f64) -> Self {
        Value::Float(x)
    }
}

impl From<&str> for Value {
    fn from(s: &str) -> Self {
        Value::Str(s.to_owned())
    }
}

impl From<String> for Value {
    fn from(s: String) -> Self {
        Value::Str(s)
    }
}

impl From<char> for Value {
    fn from(c: char) -> Self {
        Value::Str(c.to_string())
    }
}

impl From<Vec<Value>> for Value {
    fn from(elems: Vec<Value>) -> Self {
        Value::Seq(elems)
    }
}

/// Builds a [`Value::Seq`] from a comma-separated list of expressions,
/// each converted through `Value::from`.
///
/// ```
/// # use binrec::{vals, Value};
/// let v = vals![1i8, 2.5f64, "abc"];
/// assert_eq!(v.as_seq().unwrap().len(), 3);
/// ```
#[macro_export]
macro_rules! vals {
    () => { $crate::value::Value::Seq(Vec::new()) };
    ( $( $x:expr ),+ $(,)? ) => {
        $crate::value::Value::Seq(vec![ $( $crate::value::Value::from($x) ),+ ])
    };
}

//! Recursive encode engine
//!
//! Walks a parsed [`Layout`] against a [`Value`] and pushes the
//! serialized bytes into a [`Target`], symmetric to the decode engine.
//!
//! The top-level value is first normalized into a stream of elements: a
//! sequence contributes its elements, a string contributes its
//! characters, and anything else is broadcast as a single element. Each
//! element is then paired with an atom by cycling the atom index modulo
//! the layout length, so a one-atom layout absorbs arbitrarily many
//! elements and a multi-atom layout absorbs a flat list of interleaved
//! tuple fields.
//!
//! Shape errors abort the walk immediately; the sink is then in an
//! undefined partially-written state and must be discarded by the
//! caller.

use crate::error::{CodecError, CodecResult, EncodeError};
use crate::layout::{coalesces, Atom, AtomKind, Layout};
use crate::prim::Prim;
use crate::registry::Registry;
use crate::target::Target;
use crate::value::{Value, ValueKind};

/// One normalized element of the value stream.
///
/// `Unit` carries a character split off a string value, so that string
/// iteration does not have to allocate a `Value::Str` per character.
#[derive(Clone, Copy)]
enum Elem<'a> {
    Val(&'a Value),
    Unit(char),
}

impl Elem<'_> {
    fn found(&self) -> ValueKind {
        match self {
            Elem::Val(v) => v.kind(),
            Elem::Unit(_) => ValueKind::Str,
        }
    }
}

fn mismatch(expected: AtomKind, found: ValueKind) -> CodecError {
    EncodeError::Mismatch { expected, found }.into()
}

fn group_count(len: usize) -> CodecResult<u32> {
    u32::try_from(len).map_err(|_| EncodeError::OversizedSeq { len }.into())
}

/// Encodes `value` against `layout`, returning the number of bytes
/// pushed into `sink`.
pub(crate) fn write_value<T: Target>(
    reg: &Registry,
    layout: &Layout,
    value: &Value,
    sink: &mut T,
) -> CodecResult<usize> {
    let atoms = layout.atoms();
    let mut written = 0usize;
    match value {
        Value::Str(s) => {
            for (k, c) in s.chars().enumerate() {
                written += write_elem(reg, &atoms[k % atoms.len()], Elem::Unit(c), sink)?;
            }
        }
        // An empty sequence bound to an array section is the empty array
        // itself, not an empty element stream: it still owes the sink its
        // zero count.
        Value::Seq(elems) if elems.is_empty() && matches!(atoms[0], Atom::Group(_)) => {
            written += write_elem(reg, &atoms[0], Elem::Val(value), sink)?;
        }
        Value::Seq(elems) => {
            for (k, elem) in elems.iter().enumerate() {
                written += write_elem(reg, &atoms[k % atoms.len()], Elem::Val(elem), sink)?;
            }
        }
        scalar => {
            written += write_elem(reg, &atoms[0], Elem::Val(scalar), sink)?;
        }
    }
    Ok(written + sink.resolve_zero())
}

fn write_elem<T: Target>(
    reg: &Registry,
    atom: &Atom,
    elem: Elem<'_>,
    sink: &mut T,
) -> CodecResult<usize> {
    match atom {
        Atom::Prim(prim) => write_prim(*prim, elem, sink),
        Atom::Group(inner) => write_group(reg, inner, elem, sink),
        Atom::Record(tag) => write_record(reg, *tag, elem, sink),
    }
}

fn write_prim<T: Target>(prim: Prim, elem: Elem<'_>, sink: &mut T) -> CodecResult<usize> {
    if prim == Prim::Str {
        return match elem {
            Elem::Unit(c) => {
                let mut buf = [0u8; 4];
                Ok(sink.push_all(c.encode_utf8(&mut buf).as_bytes()))
            }
            Elem::Val(Value::Str(s)) => Ok(sink.push_all(s.as_bytes())),
            Elem::Val(v) => Err(mismatch(AtomKind::Primitive('s'), v.kind())),
        };
    }
    let value = match elem {
        Elem::Val(v) => v,
        Elem::Unit(_) => return Err(mismatch(AtomKind::Primitive(prim.code()), ValueKind::Str)),
    };
    match prim {
        Prim::F32 => Ok(sink.push_many((float_of(prim, value)? as f32).to_ne_bytes())),
        Prim::F64 => Ok(sink.push_many(float_of(prim, value)?.to_ne_bytes())),
        _ => write_integral(prim, value, sink),
    }
}

/// Numeric view of a value for the float codes; integral values are
/// accepted and widened.
fn float_of(prim: Prim, value: &Value) -> CodecResult<f64> {
    match *value {
        Value::Float(x) => Ok(x),
        Value::Int(i) => Ok(i as f64),
        Value::UInt(u) => Ok(u as f64),
        ref other => Err(mismatch(AtomKind::Primitive(prim.code()), other.kind())),
    }
}

fn write_integral<T: Target>(prim: Prim, value: &Value, sink: &mut T) -> CodecResult<usize> {
    let wide: i128 = match *value {
        Value::Int(i) => i as i128,
        Value::UInt(u) => u as i128,
        ref other => return Err(mismatch(AtomKind::Primitive(prim.code()), other.kind())),
    };
    macro_rules! narrow {
        ( $t:ty ) => {
            match <$t>::try_from(wide) {
                Ok(x) => sink.push_many(x.to_ne_bytes()),
                Err(_) => {
                    return Err(EncodeError::IntOutOfRange {
                        code: prim.code(),
                        value: wide,
                    }
                    .into())
                }
            }
        };
    }
    let n = match prim {
        Prim::I8 => narrow!(i8),
        Prim::U8 => narrow!(u8),
        Prim::I16 => narrow!(i16),
        Prim::U16 => narrow!(u16),
        Prim::I32 => narrow!(i32),
        Prim::U32 => narrow!(u32),
        Prim::I64 => narrow!(i64),
        Prim::U64 => narrow!(u64),
        Prim::F32 | Prim::F64 | Prim::Str => {
            unreachable!("non-integral codes are handled by write_prim")
        }
    };
    Ok(n)
}

fn write_group<T: Target>(
    reg: &Registry,
    inner: &[Atom],
    elem: Elem<'_>,
    sink: &mut T,
) -> CodecResult<usize> {
    match elem {
        Elem::Val(Value::Seq(elems)) => {
            let count = group_count(elems.len())?;
            let mut n = sink.push_many(count.to_ne_bytes());
            for (k, e) in elems.iter().enumerate() {
                n += write_elem(reg, &inner[k % inner.len()], Elem::Val(e), sink)?;
            }
            Ok(n)
        }
        Elem::Val(Value::Str(s)) => {
            if let [Atom::Prim(Prim::Str)] = inner {
                // count is the byte length: one unit per byte
                let count = group_count(s.len())?;
                let n = sink.push_many(count.to_ne_bytes());
                Ok(n + sink.push_all(s.as_bytes()))
            } else if coalesces(inner) {
                let count = group_count(s.chars().count())?;
                let mut n = sink.push_many(count.to_ne_bytes());
                for c in s.chars() {
                    n += write_elem(reg, &inner[0], Elem::Unit(c), sink)?;
                }
                Ok(n)
            } else {
                Err(mismatch(AtomKind::Group, ValueKind::Str))
            }
        }
        Elem::Unit(c) => {
            if let [Atom::Prim(Prim::Str)] = inner {
                let mut buf = [0u8; 4];
                let encoded = c.encode_utf8(&mut buf).as_bytes();
                let n = sink.push_many((encoded.len() as u32).to_ne_bytes());
                Ok(n + sink.push_all(encoded))
            } else if coalesces(inner) {
                let n = sink.push_many(1u32.to_ne_bytes());
                Ok(n + write_elem(reg, &inner[0], Elem::Unit(c), sink)?)
            } else {
                Err(mismatch(AtomKind::Group, ValueKind::Str))
            }
        }
        Elem::Val(v) => Err(mismatch(AtomKind::Group, v.kind())),
    }
}

fn write_record<T: Target>(
    reg: &Registry,
    tag: char,
    elem: Elem<'_>,
    sink: &mut T,
) -> CodecResult<usize> {
    let codec = reg.codec_for(tag)?;
    let instance = match elem {
        Elem::Val(Value::Record(rec)) => rec.as_ref(),
        other => return Err(mismatch(AtomKind::Record(tag), other.found())),
    };
    let fields = codec
        .fields_of(instance)
        .ok_or(EncodeError::NotExtractable { tag })?;
    let atoms = codec.layout().atoms();
    let mut n = 0usize;
    for (k, field) in fields.iter().enumerate() {
        n += write_elem(reg, &atoms[k % atoms.len()], Elem::Val(field), sink)?;
    }
    Ok(n)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::CodecError;
    use crate::parse::{byteparser::ByteParser, TryIntoParser};
    use crate::registry::fixtures;
    use crate::target::ByteCounter;
    use crate::vals;

    #[test]
    fn scalar_broadcasts_onto_first_atom() {
        let reg = Registry::new();
        let mut sink: Vec<u8> = Vec::new();
        let n = reg.encode("i", &Value::Int(7), &mut sink).unwrap();
        assert_eq!(n, 4);
        assert_eq!(sink, 7i32.to_ne_bytes().to_vec());
    }

    #[test]
    fn flat_list_cycles_over_the_layout() {
        let reg = Registry::new();
        let mut sink: Vec<u8> = Vec::new();
        reg.encode("bf", &vals![1i8, 1.0f32, 2i8, 2.0f32], &mut sink)
            .unwrap();

        let mut expected = Vec::new();
        for (b, x) in [(1i8, 1.0f32), (2, 2.0)] {
            expected.extend(b.to_ne_bytes());
            expected.extend(x.to_ne_bytes());
        }
        assert_eq!(sink, expected);

        // and back: repeat decode regroups the pairs per run
        let mut p: ByteParser = sink.try_into_parser().unwrap();
        let runs = reg.decode_repeat("bf", &mut p).unwrap().into_seq().unwrap();
        assert_eq!(runs.len(), 2);
        assert_eq!(runs[1].as_seq().unwrap()[0].as_int(), Some(2));
        assert_eq!(runs[1].as_seq().unwrap()[1].as_float(), Some(2.0));
    }

    #[test]
    fn string_element_fills_an_s_array() {
        let reg = Registry::new();
        let mut sink: Vec<u8> = Vec::new();
        let n = reg
            .encode("[s]", &vals!["Hallo Welt"], &mut sink)
            .unwrap();
        assert_eq!(n, 4 + 10);
        let mut expected = 10u32.to_ne_bytes().to_vec();
        expected.extend(b"Hallo Welt");
        assert_eq!(sink, expected);

        // a bare string is an element *stream*, so each character lands
        // in its own length-1 array
        let mut per_char: Vec<u8> = Vec::new();
        reg.encode("[s]", &Value::from("ab"), &mut per_char).unwrap();
        let mut expected = 1u32.to_ne_bytes().to_vec();
        expected.extend(b"a");
        expected.extend(1u32.to_ne_bytes());
        expected.extend(b"b");
        assert_eq!(per_char, expected);
    }

    #[test]
    fn empty_sequence_writes_only_the_zero_count() {
        let reg = Registry::new();
        let mut sink: Vec<u8> = Vec::new();
        let n = reg.encode("[b]", &vals![], &mut sink).unwrap();
        assert_eq!(n, 4);
        assert_eq!(sink, 0u32.to_ne_bytes().to_vec());
    }

    #[test]
    fn nested_array_sections() {
        let reg = Registry::new();
        let inner = vals![1i8, 2i8];
        let outer = Value::Seq(vec![Value::Seq(vec![inner])]);
        let mut sink: Vec<u8> = Vec::new();
        reg.encode("[[b]]", &outer, &mut sink).unwrap();

        let mut expected = 1u32.to_ne_bytes().to_vec();
        expected.extend(2u32.to_ne_bytes());
        expected.extend([1u8, 2]);
        assert_eq!(sink, expected);
    }

    #[test]
    fn shape_mismatch_is_reported_with_both_sides() {
        let reg = Registry::new();
        let mut sink: Vec<u8> = Vec::new();
        let err = reg.encode("i", &vals!["oops"], &mut sink).unwrap_err();
        assert!(matches!(
            err,
            CodecError::Encode(EncodeError::Mismatch {
                expected: AtomKind::Primitive('i'),
                found: ValueKind::Str,
            })
        ));
    }

    #[test]
    fn numeric_value_against_array_section_is_a_mismatch() {
        let reg = Registry::new();
        let mut sink: Vec<u8> = Vec::new();
        let err = reg.encode("[b]", &vals![1i8], &mut sink).unwrap_err();
        assert!(matches!(
            err,
            CodecError::Encode(EncodeError::Mismatch {
                expected: AtomKind::Group,
                found: ValueKind::Int,
            })
        ));
    }

    #[test]
    fn out_of_range_integral_is_rejected() {
        let reg = Registry::new();
        let mut sink: Vec<u8> = Vec::new();
        let err = reg.encode("b", &Value::Int(300), &mut sink).unwrap_err();
        assert!(matches!(
            err,
            CodecError::Encode(EncodeError::IntOutOfRange {
                code: 'b',
                value: 300,
            })
        ));
        let err = reg.encode("B", &Value::Int(-1), &mut sink).unwrap_err();
        assert!(matches!(
            err,
            CodecError::Encode(EncodeError::IntOutOfRange { code: 'B', .. })
        ));
    }

    #[test]
    fn foreign_record_type_is_not_extractable() {
        let reg = fixtures::reading_registry();
        #[derive(Debug)]
        struct Alien;
        let mut sink: Vec<u8> = Vec::new();
        let err = reg
            .encode("T", &Value::record(Alien), &mut sink)
            .unwrap_err();
        assert!(matches!(
            err,
            CodecError::Encode(EncodeError::NotExtractable { tag: 'T' })
        ));
    }

    #[test]
    fn byte_counter_predicts_serialized_length() {
        let reg = fixtures::reading_registry();
        let value = Value::record(fixtures::sample_reading());

        let mut counter = ByteCounter::create();
        let predicted = reg.encode("T", &value, &mut counter).unwrap();

        let mut sink: Vec<u8> = Vec::new();
        let written = reg.encode("T", &value, &mut sink).unwrap();
        assert_eq!(predicted, written);
        assert_eq!(sink.len(), written);
    }

    #[test]
    fn strict_builder_matches_vec_sink() {
        use crate::builder::{strict::StrictBuilder, Builder};
        let reg = fixtures::reading_registry();
        let value = Value::record(fixtures::sample_reading());

        let mut vec_sink: Vec<u8> = Vec::new();
        reg.encode("T", &value, &mut vec_sink).unwrap();

        let mut builder = StrictBuilder::create();
        reg.encode("T", &value, &mut builder).unwrap();
        assert_eq!(builder.into_vec(), vec_sink);
    }

    #[test]
    fn float_codes_accept_integral_values() {
        let reg = Registry::new();
        let mut sink: Vec<u8> = Vec::new();
        reg.encode("d", &Value::Int(3), &mut sink).unwrap();
        assert_eq!(sink, 3.0f64.to_ne_bytes().to_vec());
    }

    #[test]
    fn string_scalar_cycles_per_character() {
        let reg = Registry::new();
        let mut sink: Vec<u8> = Vec::new();
        let n = reg.encode("s", &Value::from("abc"), &mut sink).unwrap();
        assert_eq!(n, 3);
        assert_eq!(sink, b"abc".to_vec());
    }
}

//! Recursive-descent decode engine
//!
//! Walks a parsed [`Layout`] against a [`Parser`] source, producing one
//! [`Value`] per top-level atom. The walk is strictly left-to-right and
//! non-backtracking: every error aborts the call with no partial value,
//! leaving the source wherever the failure occurred (callers must
//! reposition or discard it before reuse).

use crate::error::CodecResult;
use crate::layout::{coalesces, Atom, Layout};
use crate::parse::{string_of_bytes, Parser};
use crate::prim::Prim;
use crate::registry::Registry;
use crate::value::Value;

/// Runs one full pass of `layout` against `source` and collapses the
/// result.
pub(crate) fn single_pass<P: Parser>(
    reg: &Registry,
    layout: &Layout,
    source: &mut P,
) -> CodecResult<Value> {
    let values = run_atoms(reg, layout.atoms(), source)?;
    Ok(collapse(values, layout.is_single()))
}

/// Re-runs full passes of `layout` until the remaining-length probe
/// reports an exhausted source, returning the list of per-run results.
pub(crate) fn repeat_passes<P: Parser>(
    reg: &Registry,
    layout: &Layout,
    source: &mut P,
) -> CodecResult<Value> {
    let mut runs = Vec::new();
    while source.remainder() > 0 {
        let values = run_atoms(reg, layout.atoms(), source)?;
        runs.push(collapse(values, layout.is_single()));
    }
    Ok(Value::Seq(runs))
}

/// A single-atom pass returns its one value bare; anything else stays a
/// sequence in atom order.
fn collapse(mut values: Vec<Value>, single: bool) -> Value {
    if single && values.len() == 1 {
        return values.pop().unwrap_or(Value::Seq(Vec::new()));
    }
    Value::Seq(values)
}

fn run_atoms<P: Parser>(reg: &Registry, atoms: &[Atom], source: &mut P) -> CodecResult<Vec<Value>> {
    let mut values = Vec::with_capacity(atoms.len());
    for atom in atoms {
        values.push(run_atom(reg, atom, source)?);
    }
    Ok(values)
}

fn run_atom<P: Parser>(reg: &Registry, atom: &Atom, source: &mut P) -> CodecResult<Value> {
    match atom {
        Atom::Prim(prim) => Ok(prim.read(source)?),
        Atom::Record(tag) => {
            let codec = reg.codec_for(*tag)?;
            let fields = run_atoms(reg, codec.layout().atoms(), source)?;
            Ok(Value::Record(codec.construct(fields)))
        }
        Atom::Group(inner) => run_group(reg, inner, source),
    }
}

fn run_group<P: Parser>(reg: &Registry, inner: &[Atom], source: &mut P) -> CodecResult<Value> {
    let count = source.take_u32()? as usize;

    // A run of bare string units is consumed in one piece: one byte per
    // unit, one UTF-8 decision for the whole run.
    if let [Atom::Prim(Prim::Str)] = inner {
        let bytes = source.consume(count)?;
        return Ok(Value::Str(string_of_bytes(bytes)?));
    }

    // Each element consumes at least one byte, so `remainder` bounds the
    // preallocation no matter what the count prefix claims.
    let mut elems = Vec::with_capacity(count.min(source.remainder()));
    let single = inner.len() == 1;
    for _ in 0..count {
        let values = run_atoms(reg, inner, source)?;
        elems.push(collapse(values, single));
    }

    if coalesces(inner) {
        let mut joined = String::new();
        for elem in elems {
            match elem {
                Value::Str(part) => joined.push_str(&part),
                _ => unreachable!("coalescing inner layouts only decode to strings"),
            }
        }
        Ok(Value::Str(joined))
    } else {
        Ok(Value::Seq(elems))
    }
}

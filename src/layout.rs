//! Layout-string grammar
//!
//! A layout string is parsed exactly once, before any transcoding walk,
//! into a tree of [`Atom`] nodes that both engines interpret; the raw
//! string is never re-scanned during recursion.
//!
//! The grammar is deliberately small:
//!
//! ```text
//! layout ::= atom+
//! atom   ::= primitive-code | '[' atom+ ']' | record-tag
//! ```
//!
//! where a primitive code is one of the characters in the fixed table of
//! [`Prim`], and any other non-bracket character is taken to be a record
//! tag. Tags are not resolved here: whether a tag is actually registered
//! is only known to the [`Registry`](crate::registry::Registry) at walk
//! time.
//!
//! Bracket balance is validated during parsing, and both the empty layout
//! string and the empty array section `[]` are rejected outright: a
//! layout with no atoms would make the encoder's index-cycling
//! ill-defined.

use crate::error::FormatError;
use crate::prim::Prim;

/// One node of a parsed layout.
#[derive(Clone, PartialEq, Eq, Debug)]
pub enum Atom {
    /// A fixed-width primitive code.
    Prim(Prim),
    /// A bracketed array section: a `u32` element count followed by that
    /// many encodings of the inner layout.
    Group(Vec<Atom>),
    /// A registered record tag, transcoded via the layout and the
    /// build/extract pair registered under it.
    Record(char),
}

impl Atom {
    /// Shape descriptor used in diagnostics.
    #[must_use]
    pub fn kind(&self) -> AtomKind {
        match self {
            Atom::Prim(p) => AtomKind::Primitive(p.code()),
            Atom::Group(_) => AtomKind::Group,
            Atom::Record(tag) => AtomKind::Record(*tag),
        }
    }

    /// Returns `true` if one decoded occurrence of this atom is always a
    /// string value.
    ///
    /// This drives array coalescing and is purely structural: a lone `s`
    /// unit yields a string, and so does an array section that itself
    /// coalesces.
    pub(crate) fn yields_str(&self) -> bool {
        match self {
            Atom::Prim(p) => *p == Prim::Str,
            Atom::Group(inner) => coalesces(inner),
            Atom::Record(_) => false,
        }
    }
}

/// Returns `true` if an array section with inner layout `atoms` collapses
/// its decoded elements into a single string value.
pub(crate) fn coalesces(atoms: &[Atom]) -> bool {
    matches!(atoms, [single] if single.yields_str())
}

/// Coarse classification of an [`Atom`], carried inside
/// [`EncodeError::Mismatch`](crate::error::EncodeError::Mismatch).
#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub enum AtomKind {
    Primitive(char),
    Group,
    Record(char),
}

impl std::fmt::Display for AtomKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match *self {
            AtomKind::Primitive(code) => write!(f, "primitive code `{code}`"),
            AtomKind::Group => write!(f, "an array section"),
            AtomKind::Record(tag) => write!(f, "record tag `{tag}`"),
        }
    }
}

/// A fully parsed layout string.
#[derive(Clone, PartialEq, Eq, Debug)]
pub struct Layout {
    atoms: Vec<Atom>,
}

impl Layout {
    /// Parses a layout string into its atom tree.
    ///
    /// # Errors
    ///
    /// Returns a [`FormatError`] on unbalanced brackets, on an empty
    /// string, or on an empty array section. Unknown tags are *not*
    /// rejected here; see the module docs.
    pub fn parse(fmt: &str) -> Result<Self, FormatError> {
        let chars: Vec<char> = fmt.chars().collect();
        let (atoms, end) = parse_run(&chars, 0, None)?;
        debug_assert_eq!(end, chars.len());
        if atoms.is_empty() {
            return Err(FormatError::EmptyFormat);
        }
        Ok(Self { atoms })
    }

    /// Borrows the top-level atoms in declaration order.
    #[must_use]
    pub fn atoms(&self) -> &[Atom] {
        &self.atoms
    }

    /// Returns `true` if the layout consists of exactly one top-level
    /// atom, in which case a single decode pass returns the bare value
    /// rather than a one-element sequence.
    #[must_use]
    pub fn is_single(&self) -> bool {
        self.atoms.len() == 1
    }
}

/// Parses atoms from `chars[i..]` until the end of input (`open == None`)
/// or the `]` matching the `[` at position `open`.
///
/// Returns the parsed atoms together with the index of the first
/// unconsumed character.
fn parse_run(
    chars: &[char],
    mut i: usize,
    open: Option<usize>,
) -> Result<(Vec<Atom>, usize), FormatError> {
    let mut atoms = Vec::new();
    while i < chars.len() {
        match chars[i] {
            '[' => {
                let (inner, next) = parse_run(chars, i + 1, Some(i))?;
                if inner.is_empty() {
                    return Err(FormatError::EmptyGroup { pos: i });
                }
                atoms.push(Atom::Group(inner));
                i = next;
            }
            ']' => {
                return match open {
                    Some(_) => Ok((atoms, i + 1)),
                    None => Err(FormatError::UnmatchedClose { pos: i }),
                };
            }
            c => {
                atoms.push(match Prim::from_code(c) {
                    Some(p) => Atom::Prim(p),
                    None => Atom::Record(c),
                });
                i += 1;
            }
        }
    }
    match open {
        Some(pos) => Err(FormatError::UnmatchedOpen { pos }),
        None => Ok((atoms, i)),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_mixed_layout() {
        let layout = Layout::parse("bb[f]f[s]d").unwrap();
        assert_eq!(
            layout.atoms(),
            &[
                Atom::Prim(Prim::I8),
                Atom::Prim(Prim::I8),
                Atom::Group(vec![Atom::Prim(Prim::F32)]),
                Atom::Prim(Prim::F32),
                Atom::Group(vec![Atom::Prim(Prim::Str)]),
                Atom::Prim(Prim::F64),
            ]
        );
        assert!(!layout.is_single());
    }

    #[test]
    fn unregistered_characters_become_tags() {
        let layout = Layout::parse("T").unwrap();
        assert_eq!(layout.atoms(), &[Atom::Record('T')]);
        assert!(layout.is_single());
    }

    #[test]
    fn nested_groups() {
        let layout = Layout::parse("[[h]]").unwrap();
        assert_eq!(
            layout.atoms(),
            &[Atom::Group(vec![Atom::Group(vec![Atom::Prim(Prim::I16)])])]
        );
    }

    #[test]
    fn bracket_balance_is_enforced() {
        assert_eq!(
            Layout::parse("b[f"),
            Err(FormatError::UnmatchedOpen { pos: 1 })
        );
        assert_eq!(
            Layout::parse("bf]"),
            Err(FormatError::UnmatchedClose { pos: 2 })
        );
        assert_eq!(Layout::parse(""), Err(FormatError::EmptyFormat));
        assert_eq!(
            Layout::parse("b[]"),
            Err(FormatError::EmptyGroup { pos: 1 })
        );
    }

    #[test]
    fn coalescing_is_structural() {
        let yes = |fmt: &str| {
            let layout = Layout::parse(fmt).unwrap();
            match &layout.atoms()[0] {
                Atom::Group(inner) => coalesces(inner),
                other => panic!("expected group, got {other:?}"),
            }
        };
        assert!(yes("[s]"));
        assert!(yes("[[s]]"));
        assert!(!yes("[ss]"));
        assert!(!yes("[b]"));
        assert!(!yes("[T]"));
    }
}

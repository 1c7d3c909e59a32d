//! Type-name compatibility between a schema named by a pattern and the
//! scrutinee's schema.

use crate::{SchemaId, SchemaKind, SchemaPool};

/// Outcome of a compatibility check, ordered from strongest to weakest.
#[derive(Copy, Clone, Eq, PartialEq, Ord, PartialOrd, Hash, Debug)]
pub enum Compat {
    /// Same type, modulo aliases and indirections, or an ancestor of it.
    Exact,
    /// Different widths of the same numeric family.
    Numeric,
    /// The pattern names a type derived from the scrutinee's; only a runtime
    /// type test can decide.
    Deferred,
    Incompatible,
}

impl Compat {
    #[inline]
    pub fn is_compatible(self) -> bool {
        self != Compat::Incompatible
    }

    /// Weakest of two component results. A deferred component inside a
    /// container cannot be tested at runtime, so it becomes incompatible.
    fn and(self, other: Compat) -> Compat {
        match self.max(other) {
            Compat::Deferred => Compat::Incompatible,
            weakest => weakest,
        }
    }
}

/// Container nesting deeper than this is not compared structurally.
const MAX_DEPTH: u32 = 32;

/// Whether a value of `scrutinee` may match a pattern naming `pattern`.
///
/// Aliases are transparent and indirections are unwrapped on both sides.
/// Primitive widths follow the numeric-family rules. Records compare
/// nominally, with ancestry: naming an ancestor of the scrutinee is exact,
/// naming a descendant of an open scrutinee is deferred.
pub fn compat(pool: &SchemaPool, pattern: SchemaId, scrutinee: SchemaId) -> Compat {
    compat_at(pool, pattern, scrutinee, 0)
}

fn compat_at(pool: &SchemaPool, pattern: SchemaId, scrutinee: SchemaId, depth: u32) -> Compat {
    if depth > MAX_DEPTH {
        return Compat::Incompatible;
    }
    let p = pool.unwrap_indirections(pattern);
    let s = pool.unwrap_indirections(scrutinee);
    if p == s {
        return Compat::Exact;
    }
    let ps = pool.get(p);
    let ss = pool.get(s);

    let elem = |a: Option<SchemaId>, b: Option<SchemaId>| match (a, b) {
        (Some(a), Some(b)) => compat_at(pool, a, b, depth + 1),
        _ => Compat::Incompatible,
    };

    match (ps.kind, ss.kind) {
        (SchemaKind::Primitive, SchemaKind::Primitive) => match (ps.primitive, ss.primitive) {
            (Some(a), Some(b)) if a == b => Compat::Exact,
            (Some(a), Some(b)) if a.compatible_with(b) => Compat::Numeric,
            _ => Compat::Incompatible,
        },
        (SchemaKind::Sequence, SchemaKind::Sequence)
        | (SchemaKind::Set, SchemaKind::Set)
        | (SchemaKind::Optional, SchemaKind::Optional) => Compat::Exact.and(elem(ps.element, ss.element)),
        (SchemaKind::Array, SchemaKind::Array) => {
            if ps.array_len == ss.array_len {
                Compat::Exact.and(elem(ps.element, ss.element))
            } else {
                Compat::Incompatible
            }
        }
        (SchemaKind::Map, SchemaKind::Map) => elem(ps.key, ss.key).and(elem(ps.value, ss.value)),
        (SchemaKind::Tuple, SchemaKind::Tuple) => {
            if ps.fields.len() != ss.fields.len() {
                return Compat::Incompatible;
            }
            ps.fields
                .iter()
                .zip(&ss.fields)
                .fold(Compat::Exact, |acc, (a, b)| acc.and(compat_at(pool, a.schema, b.schema, depth + 1)))
        }
        (pk, sk) if pk == sk && ps.name == ss.name => Compat::Exact,
        _ => {
            if ss.ancestors.iter().any(|a| pool.unwrap_indirections(*a) == p) {
                Compat::Exact
            } else if ss.is_open() && ps.ancestors.iter().any(|a| pool.unwrap_indirections(*a) == s) {
                Compat::Deferred
            } else {
                Compat::Incompatible
            }
        }
    }
}

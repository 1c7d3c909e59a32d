//! Access paths from the scrutinee to sub-values.
//!
//! Every test and binding in a clause reads its operand through an
//! [`Access`]. Paths are trees rather than flat instruction lists because
//! two forms choose between sub-paths at runtime: [`Access::ByLength`] (slot
//! positions that depend on the input length under rightmost priority) and
//! [`Access::Choice`] (a name bound differently by each alternative).

use pmatch_ir::{Literal, Name};
use pmatch_patterns::{Index, SlotSource};

use crate::Test;

#[derive(Clone, Eq, PartialEq, Hash, Debug)]
pub enum Access {
    /// The matched value itself.
    Scrutinee,
    /// Named field of an object; dereferences a reference first.
    Field { base: Box<Access>, field: Name },
    /// Element of a sequence, array or tuple.
    Index { base: Box<Access>, index: Index },
    /// Sub-sequence `[start, len - end_from_end)`.
    Slice {
        base: Box<Access>,
        start: u32,
        end_from_end: u32,
    },
    /// Payload of a present optional.
    Payload(Box<Access>),
    MapValue { base: Box<Access>, key: Literal },
    /// A constant (a slot's declared default).
    Const(Literal),
    /// Length-dependent access: `cases` for the listed input lengths of
    /// `base`, `otherwise` for every other length.
    ByLength {
        base: Box<Access>,
        cases: Vec<(u32, Access)>,
        otherwise: Box<Access>,
    },
    /// The access of whichever branch of the [`Test::Alt`] numbered `alt`
    /// matched.
    Choice { alt: u32, choices: Vec<Alternative> },
}

/// One branch of an [`Access::Choice`].
#[derive(Clone, Eq, PartialEq, Hash, Debug)]
pub struct Alternative {
    /// Position of the branch in its [`Test::Alt`].
    pub branch: usize,
    /// The branch's test, inline guards included.
    pub test: Test,
    /// Names the branch binds, as seen by guards in `test`.
    pub bindings: Vec<(Name, Access)>,
    pub access: Access,
}

impl Access {
    #[must_use]
    pub fn field(self, field: Name) -> Access {
        Access::Field {
            base: Box::new(self),
            field,
        }
    }

    #[must_use]
    pub fn index(self, index: Index) -> Access {
        Access::Index {
            base: Box::new(self),
            index,
        }
    }

    #[must_use]
    pub fn slice(self, start: u32, end_from_end: u32) -> Access {
        Access::Slice {
            base: Box::new(self),
            start,
            end_from_end,
        }
    }

    #[must_use]
    pub fn payload(self) -> Access {
        Access::Payload(Box::new(self))
    }

    #[must_use]
    pub fn map_value(self, key: Literal) -> Access {
        Access::MapValue {
            base: Box::new(self),
            key,
        }
    }

    /// Where a sequence slot's value comes from, relative to `base`.
    pub fn slot(base: &Access, source: SlotSource) -> Access {
        match source {
            SlotSource::Element(index) => base.clone().index(index),
            SlotSource::Default(literal) => Access::Const(literal),
        }
    }

    /// The same access with a `FromEnd` index on `base` rewritten for an
    /// input of exactly `len` elements. `None` when the index falls before
    /// the first element.
    pub(crate) fn at_len(&self, base: &Access, len: u32) -> Option<Access> {
        match self {
            Access::Index {
                base: b,
                index: Index::FromEnd(i),
            } if **b == *base => Some(base.clone().index(Index::FromStart(len.checked_sub(*i)?))),
            other => Some(other.clone()),
        }
    }

    /// Depth of nested projections, for rendering decisions.
    pub fn depth(&self) -> usize {
        match self {
            Access::Scrutinee | Access::Const(_) | Access::Choice { .. } => 0,
            Access::Field { base, .. }
            | Access::Index { base, .. }
            | Access::Slice { base, .. }
            | Access::MapValue { base, .. }
            | Access::ByLength { base, .. }
            | Access::Payload(base) => base.depth() + 1,
        }
    }
}

//! Boolean test trees.

use pmatch_ir::{Literal, Name};
use pmatch_patterns::GuardId;

use crate::Access;

/// A condition over the scrutinee. Conjunctions evaluate left to right and
/// short-circuit, so a test may rely on every test before it in the same
/// `And` (a field read after its nil check, a branch field after its
/// discriminator test).
#[derive(Clone, Eq, PartialEq, Hash, Debug)]
pub enum Test {
    True,
    False,
    And(Vec<Test>),
    Or(Vec<Test>),
    /// Disjunction whose branches bind some name at different accesses.
    /// Evaluates like `Or` and records the branch that matched, which every
    /// [`Access::Choice`] with the same `id` then reads through.
    Alt {
        id: u32,
        branches: Vec<Test>,
    },
    LitEq {
        access: Access,
        literal: Literal,
    },
    /// Discrete value set: equal to any of `literals`.
    OneOf {
        access: Access,
        literals: Vec<Literal>,
    },
    /// Hash-set membership over strings.
    StrIn {
        access: Access,
        values: Vec<Name>,
    },
    /// Enumeration or discriminator value, compared by ordinal.
    TagIs {
        access: Access,
        label: Name,
        ordinal: i64,
    },
    TagIn {
        access: Access,
        labels: Vec<(Name, i64)>,
    },
    LenEq {
        access: Access,
        len: u32,
    },
    LenGe {
        access: Access,
        len: u32,
    },
    /// `min <= len <= max`.
    LenRange {
        access: Access,
        min: u32,
        max: u32,
    },
    IsNil(Access),
    IsNotNil(Access),
    /// Runtime type is `type_name` or derives from it.
    TypeIs {
        access: Access,
        type_name: Name,
    },
    OptIsSome(Access),
    OptIsNone(Access),
    HasKey {
        access: Access,
        key: Literal,
    },
    /// Every member present; `exact` also requires nothing else.
    SetContains {
        access: Access,
        members: Vec<Literal>,
        exact: bool,
    },
    /// [`Test::SetContains`] over an ordinal domain, as a bitmask.
    SetMask {
        access: Access,
        mask: u128,
        exact: bool,
    },
    /// Host guard, evaluated with the clause's bindings.
    Guard(GuardId),
}

impl Test {
    pub fn is_true(&self) -> bool {
        matches!(self, Test::True)
    }

    pub fn has_guard(&self) -> bool {
        match self {
            Test::Guard(_) => true,
            Test::And(tests) | Test::Or(tests) | Test::Alt { branches: tests, .. } => {
                tests.iter().any(Test::has_guard)
            }
            _ => false,
        }
    }

    /// Number of leaf tests.
    pub fn size(&self) -> usize {
        match self {
            Test::And(tests) | Test::Or(tests) | Test::Alt { branches: tests, .. } => {
                tests.iter().map(Test::size).sum()
            }
            _ => 1,
        }
    }
}

use pmatch_ir::Name;
use pmatch_schema::SchemaId;

use crate::{Access, Test};

/// One lowered arm: the arm matches when `test` holds, binding each name to
/// the value its access reads.
#[derive(Clone, Eq, PartialEq, Hash, Debug)]
pub struct Clause {
    /// Index of the source arm.
    pub arm_index: usize,
    pub test: Test,
    pub bindings: Vec<(Name, Access)>,
}

impl Clause {
    /// Matches every value without consulting a guard.
    pub fn is_catch_all(&self) -> bool {
        self.test.is_true()
    }

    pub fn binding(&self, name: Name) -> Option<&Access> {
        self.bindings.iter().find(|(n, _)| *n == name).map(|(_, access)| access)
    }
}

/// The executable form of a match over one scrutinee schema.
///
/// Clauses are tried in order and the first whose test holds wins. When
/// `exhaustive` is false and no clause is a catch-all, an unmatched value
/// raises the no-match fault.
#[derive(Clone, Eq, PartialEq, Debug)]
pub struct MatchProcedure {
    pub clauses: Vec<Clause>,
    pub scrutinee: SchemaId,
    /// Statically proved to cover every value of the scrutinee.
    pub exhaustive: bool,
}

impl MatchProcedure {
    pub fn clause_for_arm(&self, arm_index: usize) -> Option<&Clause> {
        self.clauses.iter().find(|c| c.arm_index == arm_index)
    }

    /// Some clause matches every value.
    pub fn has_catch_all(&self) -> bool {
        self.clauses.iter().any(Clause::is_catch_all)
    }

    /// A value can fall through every clause.
    pub fn can_fail(&self) -> bool {
        !self.exhaustive && !self.has_catch_all()
    }
}

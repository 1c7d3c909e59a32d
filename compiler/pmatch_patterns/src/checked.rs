//! Validated, resolved patterns.
//!
//! Everything the code generator needs is decided here: which field each
//! sub-pattern reads, which branch labels a constructor pins, which
//! constructors need a runtime type test, and where each sequence slot
//! comes from.

use smallvec::SmallVec;

use pmatch_ir::{Literal, Name, Span};
use pmatch_schema::SchemaId;

use crate::{GuardId, SeqLayout};

#[derive(Clone, Eq, PartialEq, Hash, Debug)]
pub struct CheckedPattern {
    pub node: CheckedNode,
    pub span: Span,
}

#[derive(Clone, Eq, PartialEq, Hash, Debug)]
pub enum CheckedNode {
    Wildcard,
    /// Bind the value and match `inner`.
    Bind {
        name: Name,
        inner: Box<CheckedPattern>,
    },
    /// Equality with a literal.
    Literal(Literal),
    /// Enumeration member, by ordinal.
    Member { name: Name, ordinal: i64 },
    /// Nil reference.
    Nil,
    /// Empty optional.
    None,
    Alt(Vec<CheckedPattern>),
    Guard {
        inner: Box<CheckedPattern>,
        guard: GuardId,
    },
    Object(ObjectPattern),
    /// Present optional, matching the payload.
    Some(Box<CheckedPattern>),
    Tuple(Vec<(u32, CheckedPattern)>),
    Seq(SeqPattern),
    /// Every key present, each value matching.
    Map(Vec<(Literal, CheckedPattern)>),
    Set(SetPattern),
    /// Runtime type test against a derived type.
    TypeIs { schema: SchemaId, type_name: Name },
}

/// Constructor pattern over a record, union, or reference to one.
#[derive(Clone, Eq, PartialEq, Hash, Debug)]
pub struct ObjectPattern {
    /// Schema the fields were validated against (the derived schema when
    /// `runtime_type` is set).
    pub schema: SchemaId,
    /// The scrutinee is a reference: test for nil before reading fields.
    pub nil_check: bool,
    /// Derived type the value must have at runtime.
    pub runtime_type: Option<Name>,
    /// Labels the constructor pins through its case name.
    pub pin: Option<Pin>,
    /// Field sub-patterns, discriminator first.
    pub fields: Vec<FieldMatch>,
}

#[derive(Copy, Clone, Eq, PartialEq, Hash, Debug)]
pub struct PinnedLabel {
    pub label: Name,
    pub ordinal: i64,
}

/// Discriminator constraint: the discriminator field holds one of `labels`.
#[derive(Clone, Eq, PartialEq, Hash, Debug)]
pub struct Pin {
    pub discriminator: Name,
    pub labels: SmallVec<[PinnedLabel; 2]>,
}

#[derive(Clone, Eq, PartialEq, Hash, Debug)]
pub struct FieldMatch {
    pub field: Name,
    pub position: u32,
    pub pattern: CheckedPattern,
}

#[derive(Clone, Eq, PartialEq, Hash, Debug)]
pub struct SeqPattern {
    pub layout: SeqLayout,
    /// Statically known length (fixed arrays); no runtime length test.
    pub fixed_len: Option<u32>,
    /// One pattern per layout slot.
    pub items: Vec<CheckedPattern>,
    /// Pattern for the spread slice, if it is bound.
    pub spread: Option<Box<CheckedPattern>>,
}

#[derive(Copy, Clone, Eq, PartialEq, Hash, Debug)]
pub struct SetMember {
    pub literal: Literal,
    /// Position in the element domain, when the domain is ordinal.
    pub ordinal: Option<u32>,
}

#[derive(Clone, Eq, PartialEq, Hash, Debug)]
pub struct SetPattern {
    pub members: Vec<SetMember>,
    pub exact: bool,
    /// Size of the element domain, when ordinal.
    pub domain: Option<u32>,
}

/// A name bound by an arm, with the schema it is bound at.
#[derive(Copy, Clone, Eq, PartialEq, Hash, Debug)]
pub struct Binding {
    pub name: Name,
    pub schema: SchemaId,
    pub span: Span,
}

/// A pattern that passed validation.
#[derive(Clone, Eq, PartialEq, Hash, Debug)]
pub struct ValidatedArm {
    pub pattern: CheckedPattern,
    pub bindings: Vec<Binding>,
}

impl CheckedPattern {
    pub fn new(node: CheckedNode, span: Span) -> Self {
        CheckedPattern { node, span }
    }

    pub fn wildcard(span: Span) -> Self {
        CheckedPattern::new(CheckedNode::Wildcard, span)
    }

    /// Matches every value (wildcard or bindings of one).
    pub fn is_catch_all(&self) -> bool {
        match &self.node {
            CheckedNode::Wildcard => true,
            CheckedNode::Bind { inner, .. } => inner.is_catch_all(),
            CheckedNode::Alt(branches) => branches.iter().any(CheckedPattern::is_catch_all),
            _ => false,
        }
    }

    pub fn is_guarded(&self) -> bool {
        match &self.node {
            CheckedNode::Guard { .. } => true,
            CheckedNode::Bind { inner, .. } => inner.is_guarded(),
            _ => false,
        }
    }
}

impl ValidatedArm {
    /// Guarded arms never count towards exhaustiveness.
    pub fn is_guarded(&self) -> bool {
        self.pattern.is_guarded()
    }

    pub fn binding(&self, name: Name) -> Option<&Binding> {
        self.bindings.iter().find(|b| b.name == name)
    }
}

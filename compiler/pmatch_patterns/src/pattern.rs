//! Pattern trees as built by a front end.

use std::fmt;

use pmatch_ir::{Literal, Name, Span};
use pmatch_schema::DescriptorId;

/// Identifies a host guard expression. The host evaluates guards; the
/// compiler only orders them.
#[derive(Copy, Clone, Eq, PartialEq, Hash, Ord, PartialOrd)]
#[repr(transparent)]
pub struct GuardId(u32);

impl GuardId {
    #[inline]
    pub const fn new(raw: u32) -> Self {
        GuardId(raw)
    }

    #[inline]
    pub const fn raw(self) -> u32 {
        self.0
    }
}

impl fmt::Debug for GuardId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "GuardId({})", self.0)
    }
}

/// A guard condition: opaque host code plus the pattern names it reads.
#[derive(Clone, Eq, PartialEq, Hash, Debug)]
pub struct GuardExpr {
    pub id: GuardId,
    /// Source text, used when rendering the procedure.
    pub text: String,
    pub uses: Vec<Name>,
}

#[derive(Clone, Eq, PartialEq, Hash, Debug)]
pub struct Pattern {
    pub kind: PatternKind,
    pub span: Span,
}

#[derive(Clone, Eq, PartialEq, Hash, Debug)]
pub enum PatternKind {
    Literal(Literal),
    /// Bind the value to a name.
    Bind(Name),
    Wildcard,
    /// `p1 | p2 | ...`
    Alt(Vec<Pattern>),
    /// `p if cond`
    Guard {
        inner: Box<Pattern>,
        guard: GuardExpr,
    },
    /// `name @ p`: match `p` and bind the whole value.
    As {
        name: Name,
        inner: Box<Pattern>,
    },
    Ctor(CtorPattern),
    /// `[p1, p2 = default, *rest, p3]`
    Destructure(Vec<SeqElem>),
    /// `of Type`: runtime type test without binding.
    TypeTest(DescriptorId),
    /// `name of Type`: type test plus a binding at the narrowed type.
    Narrow {
        name: Name,
        target: DescriptorId,
    },
    /// `{key: p, ...}` over a map; matches when every listed key is present.
    Map(Vec<(Literal, Pattern)>),
    /// `{a, b}` over a finite set; subset by default, `exact` for equality.
    Set {
        members: Vec<Literal>,
        exact: bool,
    },
}

/// `Type(field: p, ...)`, `Type(p, ...)` or `Type.Case(...)`.
///
/// Partial by default: unlisted fields are not tested.
#[derive(Clone, Eq, PartialEq, Hash, Debug, Default)]
pub struct CtorPattern {
    /// Head identifier: the type name, an optional's `Some`/`None`, or a
    /// branch label.
    pub type_name: Option<Name>,
    /// Case name after the type (`Node.Ident`), resolved against branch
    /// labels.
    pub case: Option<Name>,
    /// Descriptor of a derived type named by the head, for open-extension
    /// scrutinees.
    pub target: Option<DescriptorId>,
    pub fields: Vec<FieldPattern>,
    pub args: Vec<Pattern>,
}

#[derive(Clone, Eq, PartialEq, Hash, Debug)]
pub struct FieldPattern {
    pub name: Name,
    pub span: Span,
    pub pattern: Pattern,
}

#[derive(Clone, Eq, PartialEq, Hash, Debug)]
pub enum SeqElem {
    /// One position, optionally defaulted when the input is too short.
    Item {
        pattern: Pattern,
        default: Option<Literal>,
    },
    /// `*rest` / `*_`: zero or more positions.
    Spread {
        binding: Option<Box<Pattern>>,
        span: Span,
    },
}

impl Pattern {
    pub fn new(kind: PatternKind, span: Span) -> Self {
        Pattern { kind, span }
    }

    pub fn wildcard(span: Span) -> Self {
        Pattern::new(PatternKind::Wildcard, span)
    }

    pub fn bind(name: Name, span: Span) -> Self {
        Pattern::new(PatternKind::Bind(name), span)
    }

    pub fn literal(literal: Literal, span: Span) -> Self {
        Pattern::new(PatternKind::Literal(literal), span)
    }

    pub fn alt(branches: Vec<Pattern>, span: Span) -> Self {
        Pattern::new(PatternKind::Alt(branches), span)
    }

    pub fn ctor(ctor: CtorPattern, span: Span) -> Self {
        Pattern::new(PatternKind::Ctor(ctor), span)
    }

    pub fn guarded(self, guard: GuardExpr, span: Span) -> Self {
        Pattern::new(
            PatternKind::Guard {
                inner: Box::new(self),
                guard,
            },
            span,
        )
    }

    /// Matches every value without testing it (wildcard, plain binding, or
    /// an as-binding of one).
    pub fn is_irrefutable(&self) -> bool {
        match &self.kind {
            PatternKind::Wildcard | PatternKind::Bind(_) => true,
            PatternKind::As { inner, .. } => inner.is_irrefutable(),
            PatternKind::Alt(branches) => branches.iter().any(Pattern::is_irrefutable),
            _ => false,
        }
    }

    pub fn is_guarded(&self) -> bool {
        match &self.kind {
            PatternKind::Guard { .. } => true,
            PatternKind::As { inner, .. } => inner.is_guarded(),
            _ => false,
        }
    }
}

impl CtorPattern {
    pub fn named(type_name: Name) -> Self {
        CtorPattern {
            type_name: Some(type_name),
            ..CtorPattern::default()
        }
    }

    #[must_use]
    pub fn with_case(mut self, case: Name) -> Self {
        self.case = Some(case);
        self
    }

    #[must_use]
    pub fn with_target(mut self, target: DescriptorId) -> Self {
        self.target = Some(target);
        self
    }

    #[must_use]
    pub fn with_field(mut self, name: Name, span: Span, pattern: Pattern) -> Self {
        self.fields.push(FieldPattern { name, span, pattern });
        self
    }

    #[must_use]
    pub fn with_arg(mut self, pattern: Pattern) -> Self {
        self.args.push(pattern);
        self
    }
}

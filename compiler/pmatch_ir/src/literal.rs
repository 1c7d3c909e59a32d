//! Literal values.
//!
//! Used in three places: literal patterns, declared defaults of sequence
//! slots, and the constant operands of generated tests.

use std::fmt;

use crate::{Name, PrimitiveKind, StringInterner};

/// A literal value.
///
/// Floats are stored as IEEE-754 bits so literals are `Eq + Hash` and can key
/// value-set tests.
#[derive(Copy, Clone, Eq, PartialEq, Hash, Debug)]
pub enum Literal {
    /// Integer literal; `suffix` pins an exact width (`42'u8`).
    Int {
        value: i128,
        suffix: Option<PrimitiveKind>,
    },
    /// Float literal; `suffix` pins an exact width (`1.5'f32`).
    Float {
        bits: u64,
        suffix: Option<PrimitiveKind>,
    },
    Str(Name),
    Char(char),
    Bool(bool),
    /// The null reference / empty optional.
    Nil,
    /// An enumeration member or branch label, referenced by name.
    Symbol(Name),
}

impl Literal {
    /// Unsuffixed integer literal.
    #[inline]
    pub const fn int(value: i128) -> Self {
        Literal::Int {
            value,
            suffix: None,
        }
    }

    /// Unsuffixed float literal.
    #[inline]
    pub fn float(value: f64) -> Self {
        Literal::Float {
            bits: value.to_bits(),
            suffix: None,
        }
    }

    /// Width suffix, if any.
    pub const fn suffix(&self) -> Option<PrimitiveKind> {
        match self {
            Literal::Int { suffix, .. } | Literal::Float { suffix, .. } => *suffix,
            _ => None,
        }
    }

    /// Short description of the literal's category, for diagnostics.
    pub const fn category(&self) -> &'static str {
        match self {
            Literal::Int { .. } => "integer literal",
            Literal::Float { .. } => "float literal",
            Literal::Str(_) => "string literal",
            Literal::Char(_) => "char literal",
            Literal::Bool(_) => "bool literal",
            Literal::Nil => "`nil`",
            Literal::Symbol(_) => "symbol",
        }
    }

    /// Display adapter resolving interned names.
    pub fn display<'a>(&'a self, interner: &'a StringInterner) -> LiteralDisplay<'a> {
        LiteralDisplay {
            literal: self,
            interner,
        }
    }
}

/// Renders a [`Literal`] the way it is written in generated code.
pub struct LiteralDisplay<'a> {
    literal: &'a Literal,
    interner: &'a StringInterner,
}

impl fmt::Display for LiteralDisplay<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.literal {
            Literal::Int { value, suffix } => {
                write!(f, "{value}")?;
                if let Some(width) = suffix {
                    write!(f, "'{width}")?;
                }
                Ok(())
            }
            Literal::Float { bits, suffix } => {
                write!(f, "{:?}", f64::from_bits(*bits))?;
                if let Some(width) = suffix {
                    write!(f, "'{width}")?;
                }
                Ok(())
            }
            Literal::Str(name) => write!(f, "{:?}", self.interner.lookup(*name)),
            Literal::Char(c) => write!(f, "{c:?}"),
            Literal::Bool(b) => write!(f, "{b}"),
            Literal::Nil => f.write_str("nil"),
            Literal::Symbol(name) => f.write_str(self.interner.lookup(*name)),
        }
    }
}

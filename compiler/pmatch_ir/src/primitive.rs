//! Primitive types and numeric-family rules.
//!
//! Numeric compatibility is decided by family, not width:
//!
//! - all signed integer widths are mutually compatible
//! - all unsigned integer widths are mutually compatible
//! - all float widths are mutually compatible
//! - integers and floats never mix
//!
//! An unsuffixed integer literal fits either integer family; a suffixed
//! literal pins one exact width.

use std::fmt;

/// Numeric family of a primitive.
#[derive(Copy, Clone, Eq, PartialEq, Hash, Debug)]
pub enum NumericFamily {
    Signed,
    Unsigned,
    Float,
}

impl NumericFamily {
    #[inline]
    pub const fn is_integer(self) -> bool {
        matches!(self, NumericFamily::Signed | NumericFamily::Unsigned)
    }
}

/// Primitive (non-composite) types known to the schema model.
#[derive(Copy, Clone, Eq, PartialEq, Hash, Debug)]
pub enum PrimitiveKind {
    I8,
    I16,
    I32,
    I64,
    I128,
    Isize,
    U8,
    U16,
    U32,
    U64,
    U128,
    Usize,
    F32,
    F64,
    Bool,
    Char,
    Str,
    Unit,
}

impl PrimitiveKind {
    pub const ALL: [PrimitiveKind; 18] = [
        PrimitiveKind::I8,
        PrimitiveKind::I16,
        PrimitiveKind::I32,
        PrimitiveKind::I64,
        PrimitiveKind::I128,
        PrimitiveKind::Isize,
        PrimitiveKind::U8,
        PrimitiveKind::U16,
        PrimitiveKind::U32,
        PrimitiveKind::U64,
        PrimitiveKind::U128,
        PrimitiveKind::Usize,
        PrimitiveKind::F32,
        PrimitiveKind::F64,
        PrimitiveKind::Bool,
        PrimitiveKind::Char,
        PrimitiveKind::Str,
        PrimitiveKind::Unit,
    ];

    /// Numeric family, or `None` for non-numeric primitives.
    pub const fn family(self) -> Option<NumericFamily> {
        match self {
            PrimitiveKind::I8
            | PrimitiveKind::I16
            | PrimitiveKind::I32
            | PrimitiveKind::I64
            | PrimitiveKind::I128
            | PrimitiveKind::Isize => Some(NumericFamily::Signed),
            PrimitiveKind::U8
            | PrimitiveKind::U16
            | PrimitiveKind::U32
            | PrimitiveKind::U64
            | PrimitiveKind::U128
            | PrimitiveKind::Usize => Some(NumericFamily::Unsigned),
            PrimitiveKind::F32 | PrimitiveKind::F64 => Some(NumericFamily::Float),
            PrimitiveKind::Bool | PrimitiveKind::Char | PrimitiveKind::Str | PrimitiveKind::Unit => {
                None
            }
        }
    }

    #[inline]
    pub const fn is_integer(self) -> bool {
        matches!(
            self.family(),
            Some(NumericFamily::Signed | NumericFamily::Unsigned)
        )
    }

    #[inline]
    pub const fn is_float(self) -> bool {
        matches!(self.family(), Some(NumericFamily::Float))
    }

    /// Numeric-family compatibility: same family, any width.
    ///
    /// Non-numeric primitives are only compatible with themselves.
    pub fn compatible_with(self, other: PrimitiveKind) -> bool {
        match (self.family(), other.family()) {
            (Some(a), Some(b)) => a == b,
            (None, None) => self == other,
            _ => false,
        }
    }

    /// Inclusive value range of an integer width.
    ///
    /// `U128` is clamped to `i128::MAX`; pointer-sized widths assume 64 bits.
    pub const fn int_range(self) -> Option<(i128, i128)> {
        match self {
            PrimitiveKind::I8 => Some((i8::MIN as i128, i8::MAX as i128)),
            PrimitiveKind::I16 => Some((i16::MIN as i128, i16::MAX as i128)),
            PrimitiveKind::I32 => Some((i32::MIN as i128, i32::MAX as i128)),
            PrimitiveKind::I64 | PrimitiveKind::Isize => Some((i64::MIN as i128, i64::MAX as i128)),
            PrimitiveKind::I128 => Some((i128::MIN, i128::MAX)),
            PrimitiveKind::U8 => Some((0, u8::MAX as i128)),
            PrimitiveKind::U16 => Some((0, u16::MAX as i128)),
            PrimitiveKind::U32 => Some((0, u32::MAX as i128)),
            PrimitiveKind::U64 | PrimitiveKind::Usize => Some((0, u64::MAX as i128)),
            PrimitiveKind::U128 => Some((0, i128::MAX)),
            _ => None,
        }
    }

    /// Size of the value domain when it is small enough to enumerate as
    /// ordinals (finite-set element types).
    pub const fn ordinal_domain(self) -> Option<u32> {
        match self {
            PrimitiveKind::Bool => Some(2),
            PrimitiveKind::I8 | PrimitiveKind::U8 | PrimitiveKind::Char => Some(256),
            PrimitiveKind::I16 | PrimitiveKind::U16 => Some(65_536),
            _ => None,
        }
    }

    pub const fn as_str(self) -> &'static str {
        match self {
            PrimitiveKind::I8 => "i8",
            PrimitiveKind::I16 => "i16",
            PrimitiveKind::I32 => "i32",
            PrimitiveKind::I64 => "i64",
            PrimitiveKind::I128 => "i128",
            PrimitiveKind::Isize => "isize",
            PrimitiveKind::U8 => "u8",
            PrimitiveKind::U16 => "u16",
            PrimitiveKind::U32 => "u32",
            PrimitiveKind::U64 => "u64",
            PrimitiveKind::U128 => "u128",
            PrimitiveKind::Usize => "usize",
            PrimitiveKind::F32 => "f32",
            PrimitiveKind::F64 => "f64",
            PrimitiveKind::Bool => "bool",
            PrimitiveKind::Char => "char",
            PrimitiveKind::Str => "str",
            PrimitiveKind::Unit => "()",
        }
    }

    pub fn from_name(name: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|p| p.as_str() == name)
    }
}

impl fmt::Display for PrimitiveKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

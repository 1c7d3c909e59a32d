//! Interned string identifier.

use std::fmt;

/// Interned identifier: field names, branch labels, binding names, type names.
///
/// Comparison and hashing are O(1) on the 32-bit index. The text is recovered
/// with [`StringInterner::lookup`](crate::StringInterner::lookup).
#[derive(Copy, Clone, Eq, PartialEq, Ord, PartialOrd, Hash, Default)]
#[repr(transparent)]
pub struct Name(u32);

impl Name {
    /// Pre-interned empty string.
    pub const EMPTY: Name = Name(0);

    #[inline]
    pub(crate) const fn from_index(index: u32) -> Self {
        Name(index)
    }

    #[inline]
    pub const fn index(self) -> usize {
        self.0 as usize
    }

    #[inline]
    pub const fn raw(self) -> u32 {
        self.0
    }

    #[inline]
    pub const fn is_empty(self) -> bool {
        self.0 == 0
    }
}

impl fmt::Debug for Name {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Name({})", self.0)
    }
}

crate::static_assert_size!(Name, 4);

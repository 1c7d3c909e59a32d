//! String interner for identifiers.
//!
//! One interner lives for a whole compilation session. Interning takes `&self`
//! so schemas, patterns and diagnostics can all hold a shared reference.

// Arc is needed for SharedInterner: sessions hand the interner to the emitter
// and to host-side builders that outlive a single borrow.
#![allow(clippy::disallowed_types)]

use std::fmt;
use std::sync::Arc;

use parking_lot::RwLock;
use rustc_hash::FxHashMap;

use crate::Name;

/// Error when interning a string fails.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum InternError {
    /// More than `u32::MAX` distinct strings.
    Overflow { count: usize },
}

impl fmt::Display for InternError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            InternError::Overflow { count } => {
                write!(f, "interner exceeded capacity: {count} strings, max is {}", u32::MAX)
            }
        }
    }
}

impl std::error::Error for InternError {}

struct Table {
    map: FxHashMap<&'static str, Name>,
    strings: Vec<&'static str>,
}

/// Interner mapping identifier text to [`Name`] and back.
pub struct StringInterner {
    table: RwLock<Table>,
}

impl StringInterner {
    /// Create an interner with the empty string pre-interned at [`Name::EMPTY`].
    pub fn new() -> Self {
        let empty: &'static str = "";
        let mut map = FxHashMap::default();
        map.insert(empty, Name::EMPTY);
        StringInterner {
            table: RwLock::new(Table {
                map,
                strings: vec![empty],
            }),
        }
    }

    /// Intern `s`, returning its `Name` or an error on overflow.
    pub fn try_intern(&self, s: &str) -> Result<Name, InternError> {
        if let Some(&name) = self.table.read().map.get(s) {
            return Ok(name);
        }

        let mut table = self.table.write();
        // Another writer may have inserted between the two locks.
        if let Some(&name) = table.map.get(s) {
            return Ok(name);
        }

        let index = u32::try_from(table.strings.len()).map_err(|_| InternError::Overflow {
            count: table.strings.len(),
        })?;
        // Interned strings live for the whole session; leaking gives them a
        // 'static lifetime so lookups can hand out plain references.
        let leaked: &'static str = Box::leak(s.to_owned().into_boxed_str());
        let name = Name::from_index(index);
        table.strings.push(leaked);
        table.map.insert(leaked, name);
        Ok(name)
    }

    /// Intern `s`.
    ///
    /// # Panics
    /// Panics past `u32::MAX` distinct strings. Use [`try_intern`](Self::try_intern)
    /// to handle that case.
    #[inline]
    pub fn intern(&self, s: &str) -> Name {
        self.try_intern(s).unwrap_or_else(|e| panic!("{e}"))
    }

    /// Look up an already-interned string without inserting it.
    pub fn get(&self, s: &str) -> Option<Name> {
        self.table.read().map.get(s).copied()
    }

    /// Text of an interned name. Unknown names resolve to the empty string.
    pub fn lookup(&self, name: Name) -> &'static str {
        self.table
            .read()
            .strings
            .get(name.index())
            .copied()
            .unwrap_or("")
    }

    pub fn len(&self) -> usize {
        self.table.read().strings.len()
    }

    /// `true` when only the empty string is interned.
    pub fn is_empty(&self) -> bool {
        self.len() <= 1
    }
}

impl Default for StringInterner {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Debug for StringInterner {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("StringInterner")
            .field("len", &self.len())
            .finish()
    }
}

/// Reference-counted interner shared between a session and its collaborators.
#[derive(Clone, Default, Debug)]
pub struct SharedInterner(Arc<StringInterner>);

impl SharedInterner {
    pub fn new() -> Self {
        SharedInterner(Arc::new(StringInterner::new()))
    }
}

impl std::ops::Deref for SharedInterner {
    type Target = StringInterner;

    fn deref(&self) -> &Self::Target {
        &self.0
    }
}

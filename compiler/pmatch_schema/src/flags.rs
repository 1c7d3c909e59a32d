//! Schema flags.

use bitflags::bitflags;

bitflags! {
    /// Properties of a schema fixed at extraction time.
    #[derive(Copy, Clone, Eq, PartialEq, Hash, Debug, Default)]
    pub struct SchemaFlags: u8 {
        /// Derived shapes may appear at runtime: the record has a base or is
        /// declared inheritable. Patterns naming a derived type compile to a
        /// runtime type test.
        const SUPPORTS_OPEN_EXTENSION = 1 << 0;
        /// The value is a nullable reference; lowered code tests for nil
        /// before reading through it.
        const IS_INDIRECTION = 1 << 1;
        /// Union declared through the tagged-union generator with every label
        /// carrying the branch marker. Cosmetic: rendering only.
        const TAGGED_UNION = 1 << 2;
        /// Reached through an alias; `Schema::alias_name` holds the alias.
        const ALIASED = 1 << 3;
    }
}

impl SchemaFlags {
    /// Flags an indirection or alias view inherits from its target.
    pub const INHERITED: SchemaFlags = SchemaFlags::SUPPORTS_OPEN_EXTENSION.union(SchemaFlags::TAGGED_UNION);

    #[inline]
    pub fn is_open(self) -> bool {
        self.contains(SchemaFlags::SUPPORTS_OPEN_EXTENSION)
    }

    #[inline]
    pub fn is_indirection(self) -> bool {
        self.contains(SchemaFlags::IS_INDIRECTION)
    }
}

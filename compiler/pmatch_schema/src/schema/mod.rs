//! Normalized schemas.

use std::fmt;

use pmatch_ir::{Name, PrimitiveKind, StringInterner};

use crate::{DescriptorId, SchemaFlags};

/// Index of a schema in its [`SchemaPool`](crate::SchemaPool).
///
/// Schemas refer to each other only through ids, which is how recursive
/// types are represented.
#[derive(Copy, Clone, Eq, PartialEq, Hash, Ord, PartialOrd)]
#[repr(transparent)]
pub struct SchemaId(u32);

impl SchemaId {
    #[inline]
    pub const fn from_raw(raw: u32) -> Self {
        SchemaId(raw)
    }

    #[inline]
    pub const fn raw(self) -> u32 {
        self.0
    }

    #[inline]
    pub const fn index(self) -> usize {
        self.0 as usize
    }
}

impl fmt::Debug for SchemaId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "SchemaId({})", self.0)
    }
}

pmatch_ir::static_assert_size!(SchemaId, 4);

#[derive(Copy, Clone, Eq, PartialEq, Hash, Debug)]
pub enum SchemaKind {
    Primitive,
    Record,
    Union,
    Tuple,
    Sequence,
    Array,
    Map,
    Set,
    Enumeration,
    Optional,
    Indirection,
    Opaque,
}

impl SchemaKind {
    /// Kinds whose cases can be enumerated for exhaustiveness.
    pub const fn is_closed(self) -> bool {
        matches!(
            self,
            SchemaKind::Enumeration | SchemaKind::Optional | SchemaKind::Union
        )
    }

    /// Kinds whose fields a constructor pattern can read.
    pub const fn has_fields(self) -> bool {
        matches!(
            self,
            SchemaKind::Record | SchemaKind::Union | SchemaKind::Indirection
        )
    }

    pub const fn as_str(self) -> &'static str {
        match self {
            SchemaKind::Primitive => "primitive",
            SchemaKind::Record => "record",
            SchemaKind::Union => "discriminated union",
            SchemaKind::Tuple => "tuple",
            SchemaKind::Sequence => "sequence",
            SchemaKind::Array => "fixed array",
            SchemaKind::Map => "map",
            SchemaKind::Set => "set",
            SchemaKind::Enumeration => "enumeration",
            SchemaKind::Optional => "optional",
            SchemaKind::Indirection => "reference",
            SchemaKind::Opaque => "opaque type",
        }
    }
}

impl fmt::Display for SchemaKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Copy, Clone, Eq, PartialEq, Hash, Debug, Default)]
pub enum Visibility {
    #[default]
    Public,
    Private,
}

#[derive(Copy, Clone, Eq, PartialEq, Hash, Debug)]
pub struct FieldDescriptor {
    pub name: Name,
    pub schema: SchemaId,
    /// 0-based position for positional sub-patterns.
    pub position: u32,
    pub visibility: Visibility,
}

/// One case of a discriminated union.
#[derive(Clone, Eq, PartialEq, Hash, Debug)]
pub struct VariantBranch {
    pub label: Name,
    /// Ordinal of `label` in the discriminator's domain.
    pub ordinal: i64,
    /// Fields readable only when the discriminator equals `label`.
    pub fields: Vec<FieldDescriptor>,
}

#[derive(Copy, Clone, Eq, PartialEq, Hash, Debug)]
pub struct EnumMember {
    pub name: Name,
    pub ordinal: i64,
}

#[derive(Copy, Clone, Eq, PartialEq, Hash, Debug)]
pub struct Discriminator {
    pub field: Name,
    pub schema: SchemaId,
}

/// Normalized structural description of a type.
///
/// Immutable once extracted. Which optional parts are populated depends on
/// `kind`:
///
/// | kind | populated |
/// |------|-----------|
/// | `Primitive` | `primitive` |
/// | `Record` | `fields`, `ancestors` |
/// | `Union` | `fields` (shared, including the discriminator), `branches`, `discriminator` |
/// | `Tuple` | `fields` |
/// | `Sequence`, `Set`, `Optional` | `element` |
/// | `Array` | `element`, `array_len` |
/// | `Map` | `key`, `value` |
/// | `Enumeration` | `members` |
/// | `Indirection` | `target` (pointee) plus the pointee's fields and branches |
#[derive(Clone, Eq, PartialEq, Hash, Debug)]
pub struct Schema {
    pub kind: SchemaKind,
    pub name: Name,
    /// Alias this schema was reached through.
    pub alias_name: Option<Name>,
    pub flags: SchemaFlags,
    pub primitive: Option<PrimitiveKind>,
    pub fields: Vec<FieldDescriptor>,
    pub branches: Vec<VariantBranch>,
    pub discriminator: Option<Discriminator>,
    pub element: Option<SchemaId>,
    pub key: Option<SchemaId>,
    pub value: Option<SchemaId>,
    pub array_len: Option<u32>,
    pub members: Vec<EnumMember>,
    /// Base types, nearest first.
    pub ancestors: Vec<SchemaId>,
    /// Pointee of an indirection, or target of an alias.
    pub target: Option<SchemaId>,
    pub descriptor: Option<DescriptorId>,
}

impl Schema {
    pub fn new(kind: SchemaKind, name: Name) -> Self {
        Schema {
            kind,
            name,
            alias_name: None,
            flags: SchemaFlags::empty(),
            primitive: None,
            fields: Vec::new(),
            branches: Vec::new(),
            discriminator: None,
            element: None,
            key: None,
            value: None,
            array_len: None,
            members: Vec::new(),
            ancestors: Vec::new(),
            target: None,
            descriptor: None,
        }
    }

    pub fn primitive(kind: PrimitiveKind, name: Name) -> Self {
        let mut schema = Schema::new(SchemaKind::Primitive, name);
        schema.primitive = Some(kind);
        schema
    }

    pub fn opaque(name: Name) -> Self {
        Schema::new(SchemaKind::Opaque, name)
    }

    #[inline]
    pub fn is_indirection(&self) -> bool {
        self.kind == SchemaKind::Indirection
    }

    #[inline]
    pub fn is_open(&self) -> bool {
        self.flags.is_open()
    }

    /// The kind the value has once an indirection is dereferenced.
    ///
    /// Indirections carry their pointee's fields and branches, so a reference
    /// to a union behaves as a union after the nil check.
    pub fn structural_kind(&self) -> SchemaKind {
        if self.kind != SchemaKind::Indirection {
            return self.kind;
        }
        if self.discriminator.is_some() {
            SchemaKind::Union
        } else {
            SchemaKind::Record
        }
    }

    /// Shared (branch-independent) field by name.
    pub fn field(&self, name: Name) -> Option<&FieldDescriptor> {
        self.fields.iter().find(|f| f.name == name)
    }

    pub fn field_at(&self, position: u32) -> Option<&FieldDescriptor> {
        self.fields.iter().find(|f| f.position == position)
    }

    pub fn branch(&self, label: Name) -> Option<&VariantBranch> {
        self.branches.iter().find(|b| b.label == label)
    }

    /// Labels of every branch declaring `field`.
    pub fn branches_with_field(&self, field: Name) -> impl Iterator<Item = Name> + '_ {
        self.branches
            .iter()
            .filter(move |b| b.fields.iter().any(|f| f.name == field))
            .map(|b| b.label)
    }

    /// Every field name a constructor may mention: shared fields then branch
    /// fields, deduplicated, in declaration order.
    pub fn all_field_names(&self) -> Vec<Name> {
        let mut names: Vec<Name> = self.fields.iter().map(|f| f.name).collect();
        for branch in &self.branches {
            for field in &branch.fields {
                if !names.contains(&field.name) {
                    names.push(field.name);
                }
            }
        }
        names
    }

    /// Case labels of a closed kind: union branch labels, enumeration members,
    /// or `Some`/`None` for optionals (resolved through `interner`).
    pub fn case_labels(&self, interner: &StringInterner) -> Vec<Name> {
        match self.structural_kind() {
            SchemaKind::Union => self.branches.iter().map(|b| b.label).collect(),
            SchemaKind::Enumeration => self.members.iter().map(|m| m.name).collect(),
            SchemaKind::Optional => vec![interner.intern("Some"), interner.intern("None")],
            _ => Vec::new(),
        }
    }

    pub fn member(&self, name: Name) -> Option<&EnumMember> {
        self.members.iter().find(|m| m.name == name)
    }

    /// Name as written by the user: the alias if reached through one.
    pub fn display_name(&self) -> Name {
        self.alias_name.unwrap_or(self.name)
    }
}

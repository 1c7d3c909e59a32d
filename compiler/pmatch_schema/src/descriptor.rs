//! Host type descriptors: the extractor's input model.
//!
//! A [`TypeTable`] is what the host's reflection facility (derive macros,
//! hand-written registrations, a front end's type checker) hands to the
//! compiler. Descriptors reference each other by [`DescriptorId`], so
//! recursive types need no special encoding.

use std::fmt;

use pmatch_ir::{Name, PrimitiveKind};

use crate::schema::Visibility;

/// Index of a descriptor in its [`TypeTable`].
#[derive(Copy, Clone, Eq, PartialEq, Hash, Ord, PartialOrd)]
#[repr(transparent)]
pub struct DescriptorId(u32);

impl DescriptorId {
    #[inline]
    pub const fn from_raw(raw: u32) -> Self {
        DescriptorId(raw)
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

impl fmt::Debug for DescriptorId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "DescriptorId({})", self.0)
    }
}

/// A reference to a type from inside a descriptor.
#[derive(Copy, Clone, Eq, PartialEq, Hash, Debug)]
pub enum TypeRef {
    Desc(DescriptorId),
    /// The `i`-th parameter of the enclosing generic template.
    Param(u32),
}

impl From<DescriptorId> for TypeRef {
    fn from(id: DescriptorId) -> Self {
        TypeRef::Desc(id)
    }
}

/// Where a descriptor came from.
///
/// Only used to pick the cosmetic tagged-union flavor.
#[derive(Copy, Clone, Eq, PartialEq, Hash, Debug, Default)]
pub enum Origin {
    #[default]
    Host,
    /// Built by the discriminated-union declaration generator.
    UnionGenerator,
    /// Built by the nominal tagged-union generator.
    TaggedUnionGenerator,
}

#[derive(Copy, Clone, Eq, PartialEq, Hash, Debug)]
pub enum ContainerKind {
    /// Ordered sequence: one argument.
    Seq,
    /// Fixed-length array: one argument.
    Array(u32),
    /// Associative map: key and value arguments.
    Map,
    /// Finite set: one argument.
    Set,
    /// Optional value: one argument.
    Optional,
}

impl ContainerKind {
    pub const fn arity(self) -> usize {
        match self {
            ContainerKind::Map => 2,
            _ => 1,
        }
    }
}

#[derive(Clone, Eq, PartialEq, Hash, Debug)]
pub struct FieldDecl {
    pub name: Name,
    pub ty: TypeRef,
    pub visibility: Visibility,
}

impl FieldDecl {
    pub fn new(name: Name, ty: impl Into<TypeRef>) -> Self {
        FieldDecl {
            name,
            ty: ty.into(),
            visibility: Visibility::Public,
        }
    }

    #[must_use]
    pub fn private(mut self) -> Self {
        self.visibility = Visibility::Private;
        self
    }
}

/// Which discriminator values select a declared branch.
#[derive(Clone, Eq, PartialEq, Hash, Debug)]
pub enum BranchSelector {
    /// One or more labels (enumeration members, or `true`/`false`).
    Labels(Vec<Name>),
    /// Every label not named by another branch.
    Else,
}

#[derive(Clone, Eq, PartialEq, Hash, Debug)]
pub struct VariantDecl {
    pub selector: BranchSelector,
    pub fields: Vec<FieldDecl>,
}

/// The variant part of an object: a discriminator field (enumeration or
/// bool typed) and the fields each of its values makes readable.
#[derive(Clone, Eq, PartialEq, Hash, Debug)]
pub struct VariantPart {
    pub discriminator: FieldDecl,
    pub branches: Vec<VariantDecl>,
}

#[derive(Clone, Eq, PartialEq, Hash, Debug, Default)]
pub struct ObjectShape {
    pub base: Option<TypeRef>,
    /// Fields outside the variant part, in declaration order.
    pub fields: Vec<FieldDecl>,
    /// Declared open for inheritance.
    pub inheritable: bool,
    pub variant: Option<VariantPart>,
}

#[derive(Clone, Eq, PartialEq, Hash, Debug)]
pub enum Shape {
    Primitive(PrimitiveKind),
    Alias(TypeRef),
    /// Nullable reference to the target.
    Indirection(TypeRef),
    /// A generic template applied to arguments. The template's fields use
    /// [`TypeRef::Param`] for its parameters.
    Instance {
        template: DescriptorId,
        args: Vec<TypeRef>,
    },
    Container {
        kind: ContainerKind,
        args: Vec<TypeRef>,
    },
    Object(ObjectShape),
    /// Tuple; unnamed elements are named by position (`0`, `1`, ...).
    Tuple(Vec<(Option<Name>, TypeRef)>),
    Enum(Vec<(Name, i64)>),
    /// Anything the host cannot describe.
    Unknown,
}

impl Shape {
    /// Type references appearing directly in this shape.
    pub fn refs(&self) -> Vec<TypeRef> {
        match self {
            Shape::Primitive(_) | Shape::Enum(_) | Shape::Unknown => Vec::new(),
            Shape::Alias(target) | Shape::Indirection(target) => vec![*target],
            Shape::Instance { template, args } => {
                let mut refs = vec![TypeRef::Desc(*template)];
                refs.extend(args.iter().copied());
                refs
            }
            Shape::Container { args, .. } => args.clone(),
            Shape::Object(obj) => {
                let mut refs: Vec<TypeRef> = obj.base.into_iter().collect();
                refs.extend(obj.fields.iter().map(|f| f.ty));
                if let Some(variant) = &obj.variant {
                    refs.push(variant.discriminator.ty);
                    for branch in &variant.branches {
                        refs.extend(branch.fields.iter().map(|f| f.ty));
                    }
                }
                refs
            }
            Shape::Tuple(elems) => elems.iter().map(|(_, ty)| *ty).collect(),
        }
    }
}

#[derive(Clone, Eq, PartialEq, Hash, Debug)]
pub struct TypeDescriptor {
    pub name: Name,
    pub shape: Shape,
    pub origin: Origin,
    /// Number of generic parameters (templates only).
    pub params: u32,
}

impl TypeDescriptor {
    pub fn new(name: Name, shape: Shape) -> Self {
        TypeDescriptor {
            name,
            shape,
            origin: Origin::Host,
            params: 0,
        }
    }

    #[must_use]
    pub fn with_origin(mut self, origin: Origin) -> Self {
        self.origin = origin;
        self
    }

    #[must_use]
    pub fn with_params(mut self, params: u32) -> Self {
        self.params = params;
        self
    }
}

/// The host's type universe for one session.
#[derive(Clone, Debug, Default)]
pub struct TypeTable {
    descriptors: Vec<TypeDescriptor>,
}

impl TypeTable {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add(&mut self, descriptor: TypeDescriptor) -> DescriptorId {
        let id = DescriptorId(u32::try_from(self.descriptors.len()).unwrap_or(u32::MAX));
        self.descriptors.push(descriptor);
        id
    }

    /// Shorthand for `add(TypeDescriptor::new(name, shape))`.
    pub fn define(&mut self, name: Name, shape: Shape) -> DescriptorId {
        self.add(TypeDescriptor::new(name, shape))
    }

    /// Reserve an id for a descriptor whose shape refers back to itself.
    ///
    /// The slot reads as [`Shape::Unknown`] until [`TypeTable::set_shape`].
    pub fn declare(&mut self, name: Name) -> DescriptorId {
        self.define(name, Shape::Unknown)
    }

    pub fn set_shape(&mut self, id: DescriptorId, shape: Shape) {
        if let Some(desc) = self.descriptors.get_mut(id.index()) {
            desc.shape = shape;
        }
    }

    pub fn get(&self, id: DescriptorId) -> Option<&TypeDescriptor> {
        self.descriptors.get(id.index())
    }

    pub fn len(&self) -> usize {
        self.descriptors.len()
    }

    pub fn is_empty(&self) -> bool {
        self.descriptors.is_empty()
    }

    /// Find a descriptor by name (first match).
    pub fn lookup(&self, name: Name) -> Option<DescriptorId> {
        self.descriptors
            .iter()
            .position(|d| d.name == name)
            .and_then(|i| u32::try_from(i).ok())
            .map(DescriptorId)
    }
}

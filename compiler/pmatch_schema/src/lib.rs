//! Schema extraction for the pmatch pattern compiler.
//!
//! The host describes its types through a [`TypeTable`] of
//! [`TypeDescriptor`]s. [`SchemaRegistry::schema_of`] normalizes a descriptor
//! into a [`Schema`] stored in a [`SchemaPool`] arena and addressed by
//! [`SchemaId`]. Extraction is total: anything the host cannot describe
//! becomes [`SchemaKind::Opaque`].
//!
//! # Cycles
//!
//! A record holding a reference to its own type, or two unions referring to
//! each other, form cycles in the descriptor graph. The registry reserves a
//! pool slot for a descriptor before visiting its children, so a cycle back
//! to it resolves to the reserved id. Views that copy a pending schema
//! (indirections, aliases) are completed when the outermost extraction
//! returns.
//!
//! # Compatibility
//!
//! [`compat`] decides whether a schema named by a pattern can stand for the
//! scrutinee's schema, including the numeric-family rules and deferred
//! runtime type tests for derived types.

mod compat;
mod descriptor;
mod extract;
mod flags;
mod pool;
mod schema;

pub use compat::{compat, Compat};
pub use descriptor::{
    BranchSelector, ContainerKind, DescriptorId, FieldDecl, ObjectShape, Origin, Shape, TypeDescriptor,
    TypeRef, TypeTable, VariantDecl, VariantPart,
};
pub use extract::{CacheStats, ExtractOptions, SchemaRegistry};
pub use flags::SchemaFlags;
pub use pool::SchemaPool;
pub use schema::{
    Discriminator, EnumMember, FieldDescriptor, Schema, SchemaId, SchemaKind, VariantBranch, Visibility,
};

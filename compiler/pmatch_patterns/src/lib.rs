//! Pattern trees and their validation against schemas.
//!
//! A front end builds one [`Pattern`] per match arm. [`Validator::validate`]
//! checks it against the scrutinee's schema and either produces a
//! [`ValidatedArm`] (the resolved [`CheckedPattern`] plus its binding table)
//! or the diagnostics explaining every offending node.
//!
//! The checked form is what the code generator consumes: constructor heads
//! and case names are resolved to branch labels, literal symbols to
//! enumeration ordinals, derived-type constructors to runtime type tests,
//! and every sequence destructure carries its [`SeqLayout`].

mod checked;
mod layout;
mod pattern;
mod resolve;
mod validate;

pub use checked::{
    Binding, CheckedNode, CheckedPattern, FieldMatch, ObjectPattern, Pin, PinnedLabel, SeqPattern, SetMember,
    SetPattern, ValidatedArm,
};
pub use layout::{Index, Resolution, SeqLayout, SlotSource};
pub use pattern::{CtorPattern, FieldPattern, GuardExpr, GuardId, Pattern, PatternKind, SeqElem};
pub use resolve::{resolve_case, CaseResolution};
pub use validate::{ValidateOptions, ValidationResult, Validator};

//! Shared primitives for the pmatch pattern compiler.
//!
//! Everything in here is used by at least two of the pipeline stages:
//!
//! ```text
//! TypeTable → Extract (pmatch_schema) → Validate (pmatch_patterns) → Lower (pmatch_codegen)
//! ```
//!
//! - [`Span`]: byte range of a pattern node, carried into diagnostics
//! - [`Name`] / [`StringInterner`]: interned identifiers (field names,
//!   labels, bindings)
//! - [`PrimitiveKind`] / [`NumericFamily`]: primitive types and the
//!   numeric-family compatibility rules
//! - [`Literal`]: literal values as they appear in patterns, defaults and
//!   generated tests
//! - [`ensure_sufficient_stack`]: stack growth for deep pattern recursion

mod interner;
mod literal;
mod name;
mod primitive;
mod span;
mod stack;

pub use interner::{InternError, SharedInterner, StringInterner};
pub use literal::{Literal, LiteralDisplay};
pub use name::Name;
pub use primitive::{NumericFamily, PrimitiveKind};
pub use span::Span;
pub use stack::ensure_sufficient_stack;

/// Compile-time size assertion for hot types.
#[macro_export]
macro_rules! static_assert_size {
    ($ty:ty, $size:expr) => {
        const _: [(); $size] = [(); ::std::mem::size_of::<$ty>()];
    };
}

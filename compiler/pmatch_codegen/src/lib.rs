//! Lowering validated patterns into executable match procedures.
//!
//! [`lower`] turns each [`ValidatedArm`](pmatch_patterns::ValidatedArm) into
//! a [`Clause`]: a [`Test`] tree over [`Access`] paths plus the accesses of
//! every bound name. Within a clause the order of tests is fixed:
//!
//! 1. shape (length, optional presence, runtime type),
//! 2. nil check on references,
//! 3. discriminator,
//! 4. nested field tests,
//! 5. guards, after every structural test has succeeded.
//!
//! [`optimize`] then groups literal alternations into value-set tests and
//! flattens the boolean structure. [`check_coverage`] proves exhaustiveness
//! over closed scrutinee kinds and reports redundant arms.
//!
//! A [`MatchProcedure`] is immutable once built. It can be rendered as
//! `if / elif / else` source ([`MatchProcedure::render`]) or executed
//! directly against a runtime [`Value`] ([`MatchProcedure::execute`]).

mod access;
mod cond;
mod coverage;
mod exec;
mod lower;
mod optimize;
mod options;
mod procedure;
mod render;

pub use access::{Access, Alternative};
pub use cond::Test;
pub use coverage::{check_coverage, Coverage};
pub use exec::{GuardHost, MatchFault, MatchOutcome, Value};
pub use lower::lower;
pub use optimize::optimize;
pub use options::LowerOptions;
pub use procedure::{Clause, MatchProcedure};

#[cfg(test)]
mod test_helpers;

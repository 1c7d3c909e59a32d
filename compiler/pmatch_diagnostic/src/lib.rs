//! Diagnostics for the pattern compiler.
//!
//! Every rejection in the pipeline surfaces as a [`Diagnostic`]:
//! - an [`ErrorCode`] for searchability
//! - a message saying what went wrong
//! - a primary label on the offending pattern node
//! - notes and suggestions, including the closest declared names by edit
//!   distance ([`suggest`])
//!
//! Diagnostics are values. Stages return them; the session decides how to
//! render them ([`emitter`]).

mod diagnostic;
pub mod emitter;
mod error_code;
pub mod queue;
pub mod suggest;

pub use diagnostic::{Diagnostic, Label, Severity};
pub use error_code::ErrorCode;
pub use queue::{DiagnosticQueue, ErrorGuaranteed};

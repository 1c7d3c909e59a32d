//! Diagnostic emitters.
//!
//! The compiler hands back `Vec<Diagnostic>`; hosts render them through a
//! [`DiagnosticEmitter`]. Only a terminal emitter ships here. Hosts with
//! their own error channel read the `Diagnostic` fields directly.

mod terminal;

pub use terminal::{ColorMode, TerminalEmitter};

use crate::Diagnostic;

pub trait DiagnosticEmitter {
    fn emit(&mut self, diagnostic: &Diagnostic);

    fn emit_all(&mut self, diagnostics: &[Diagnostic]) {
        for diag in diagnostics {
            self.emit(diag);
        }
    }

    fn flush(&mut self);

    /// Trailing "aborting due to N errors" line.
    fn emit_summary(&mut self, error_count: usize, warning_count: usize);
}

/// 1-based line and column of a byte offset in `source`.
///
/// Offsets past the end clamp to the last position.
pub fn line_col(source: &str, offset: u32) -> (u32, u32) {
    let offset = (offset as usize).min(source.len());
    let before = source.get(..offset).unwrap_or(source);
    let line = before.matches('\n').count() + 1;
    let column = before
        .rfind('\n')
        .map_or(before.chars().count(), |nl| before[nl + 1..].chars().count())
        + 1;
    (
        u32::try_from(line).unwrap_or(u32::MAX),
        u32::try_from(column).unwrap_or(u32::MAX),
    )
}

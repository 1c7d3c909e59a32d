//! Session driver for the pmatch pattern compiler.
//!
//! ```text
//! TypeTable ─┐
//!            ├─ Session::compile_match ─→ CompiledMatch { MatchProcedure, warnings }
//! Pattern[] ─┘                        └─→ Vec<Diagnostic>
//! ```
//!
//! A [`Session`] owns the interner, the host's type table and the schema
//! cache; it is reused for every match statement of a compilation unit.
//! Each `compile_match` call validates the arms in source order, checks
//! exhaustiveness once over the whole arm list, then lowers. The resulting
//! [`MatchProcedure`] can be rendered to source or executed directly.

mod options;
mod session;

use std::sync::Once;

use pmatch_diagnostic::emitter::{DiagnosticEmitter, TerminalEmitter};

pub use options::MatchOptions;
pub use session::{CompiledMatch, Session};

pub use pmatch_codegen::{GuardHost, LowerOptions, MatchFault, MatchOutcome, MatchProcedure, Value};
pub use pmatch_diagnostic::emitter::ColorMode;
pub use pmatch_diagnostic::{Diagnostic, ErrorCode, Severity};

static TRACING_INIT: Once = Once::new();

/// Initialize tracing output.
///
/// Does nothing unless `RUST_LOG` is set (`RUST_LOG=pmatch_codegen=debug`).
/// `PMATCH_LOG_TREE=1` switches to indented span trees. Safe to call
/// multiple times.
pub fn init_tracing() {
    TRACING_INIT.call_once(|| {
        use tracing_subscriber::{fmt, prelude::*, EnvFilter};

        if std::env::var_os("RUST_LOG").is_none() {
            return;
        }
        let filter = EnvFilter::from_default_env();
        let registry = tracing_subscriber::registry().with(filter);
        let result = if std::env::var("PMATCH_LOG_TREE").is_ok_and(|v| v == "1") {
            registry
                .with(
                    tracing_tree::HierarchicalLayer::new(2)
                        .with_targets(true)
                        .with_indent_lines(true)
                        .with_bracketed_fields(true)
                        .with_writer(std::io::stderr),
                )
                .try_init()
        } else {
            registry
                .with(fmt::layer().with_target(true).with_level(true).with_writer(std::io::stderr))
                .try_init()
        };
        // A host that installed its own subscriber keeps it.
        if let Err(err) = result {
            eprintln!("pmatch: tracing output disabled: {err}");
        }
    });
}

/// Render diagnostics as terminal text, with source excerpts when `source`
/// is given, followed by the error/warning summary line.
pub fn render_diagnostics(diagnostics: &[Diagnostic], source: Option<&str>, mode: ColorMode) -> String {
    let mut emitter = TerminalEmitter::with_color_mode(Vec::new(), mode, false);
    if let Some(source) = source {
        emitter = emitter.with_source(source);
    }
    emitter.emit_all(diagnostics);
    let errors = diagnostics.iter().filter(|d| d.is_error()).count();
    emitter.emit_summary(errors, diagnostics.len() - errors);
    emitter.flush();
    String::from_utf8_lossy(&emitter.into_inner()).into_owned()
}

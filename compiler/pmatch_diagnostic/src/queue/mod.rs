//! Diagnostic queue for collecting and ordering a compilation's diagnostics.
//!
//! Each offending pattern node produces exactly one diagnostic, so the queue
//! drops a second diagnostic with the same code and message at the same
//! span. Distinct problems sharing a span (two bad members of one set
//! pattern) differ in their messages and are all kept. Flushing
//! sorts by source position (arms are validated in source order, so this is
//! usually a no-op).

use std::hash::{Hash, Hasher};

use rustc_hash::{FxHashSet, FxHasher};

use pmatch_ir::Span;

use crate::{Diagnostic, ErrorCode};

fn message_hash(message: &str) -> u64 {
    let mut hasher = FxHasher::default();
    message.hash(&mut hasher);
    hasher.finish()
}

/// Proof that at least one error diagnostic was recorded.
///
/// Only obtainable from [`DiagnosticQueue::emit_error`] or
/// [`DiagnosticQueue::has_errors`], so a stage returning
/// `Result<T, ErrorGuaranteed>` cannot fail without reporting.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub struct ErrorGuaranteed(());

impl ErrorGuaranteed {
    pub(crate) fn new() -> Self {
        ErrorGuaranteed(())
    }

    pub fn from_error_count(count: usize) -> Option<Self> {
        (count > 0).then(Self::new)
    }
}

impl std::fmt::Display for ErrorGuaranteed {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "error(s) emitted")
    }
}

#[derive(Clone, Debug, Eq, PartialEq, Hash)]
pub struct DiagnosticConfig {
    /// Maximum number of errors kept (0 = unlimited).
    pub error_limit: usize,
    /// Drop a diagnostic whose code, primary span and message repeat an
    /// earlier one.
    pub deduplicate: bool,
}

impl Default for DiagnosticConfig {
    fn default() -> Self {
        DiagnosticConfig {
            error_limit: 0,
            deduplicate: true,
        }
    }
}

#[derive(Clone, Debug, Default)]
pub struct DiagnosticQueue {
    diagnostics: Vec<Diagnostic>,
    seen: FxHashSet<(ErrorCode, Span, u64)>,
    error_count: usize,
    warning_count: usize,
    config: DiagnosticConfig,
}

impl DiagnosticQueue {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_config(config: DiagnosticConfig) -> Self {
        DiagnosticQueue {
            config,
            ..Self::default()
        }
    }

    /// Record a diagnostic. Returns `false` if it was filtered.
    pub fn add(&mut self, diag: Diagnostic) -> bool {
        let is_error = diag.is_error();
        if is_error && self.limit_reached() {
            return false;
        }
        if self.config.deduplicate {
            let key = (
                diag.code,
                diag.primary_span().unwrap_or(Span::DUMMY),
                message_hash(&diag.message),
            );
            if !self.seen.insert(key) {
                return false;
            }
        }
        if is_error {
            self.error_count += 1;
        } else {
            self.warning_count += 1;
        }
        self.diagnostics.push(diag);
        true
    }

    pub fn extend(&mut self, diags: impl IntoIterator<Item = Diagnostic>) {
        for diag in diags {
            self.add(diag);
        }
    }

    /// Record an error and get proof it was recorded.
    pub fn emit_error(&mut self, diag: Diagnostic) -> ErrorGuaranteed {
        self.add(diag);
        ErrorGuaranteed::new()
    }

    pub fn has_errors(&self) -> Option<ErrorGuaranteed> {
        ErrorGuaranteed::from_error_count(self.error_count)
    }

    pub fn error_count(&self) -> usize {
        self.error_count
    }

    pub fn warning_count(&self) -> usize {
        self.warning_count
    }

    pub fn limit_reached(&self) -> bool {
        self.config.error_limit > 0 && self.error_count >= self.config.error_limit
    }

    pub fn is_empty(&self) -> bool {
        self.diagnostics.is_empty()
    }

    pub fn peek(&self) -> impl Iterator<Item = &Diagnostic> {
        self.diagnostics.iter()
    }

    /// Sort by primary span start and drain the queue.
    pub fn flush(&mut self) -> Vec<Diagnostic> {
        let already_sorted = self
            .diagnostics
            .windows(2)
            .all(|w| sort_key(&w[0]) <= sort_key(&w[1]));
        if !already_sorted {
            // Stable: diagnostics at one position keep emission order.
            self.diagnostics.sort_by_key(sort_key);
        }
        self.seen.clear();
        self.error_count = 0;
        self.warning_count = 0;
        std::mem::take(&mut self.diagnostics)
    }
}

fn sort_key(diag: &Diagnostic) -> u32 {
    diag.primary_span().map_or(u32::MAX, |span| span.start)
}

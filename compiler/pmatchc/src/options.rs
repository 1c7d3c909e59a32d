use pmatch_codegen::LowerOptions;
use pmatch_diagnostic::queue::DiagnosticConfig;
use pmatch_patterns::ValidateOptions;
use pmatch_schema::ExtractOptions;

/// Session-wide settings for compiling match statements.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct MatchOptions {
    /// Separator between a label's prefix and its case name (`k` in
    /// `nkIdent`), used by extraction and by case resolution.
    pub branch_marker: char,
    /// Run the exhaustiveness check; when off, every procedure can fail.
    pub check_exhaustiveness: bool,
    /// Keep redundant-arm warnings.
    pub report_redundancy: bool,
    /// Errors kept per `compile_match` (0 = unlimited).
    pub error_limit: usize,
    pub lower: LowerOptions,
}

impl Default for MatchOptions {
    fn default() -> Self {
        MatchOptions {
            branch_marker: 'k',
            check_exhaustiveness: true,
            report_redundancy: true,
            error_limit: 0,
            lower: LowerOptions::default(),
        }
    }
}

impl MatchOptions {
    #[must_use]
    pub fn with_branch_marker(mut self, marker: char) -> Self {
        self.branch_marker = marker;
        self
    }

    #[must_use]
    pub fn with_exhaustiveness(mut self, check: bool) -> Self {
        self.check_exhaustiveness = check;
        self
    }

    #[must_use]
    pub fn with_redundancy_warnings(mut self, report: bool) -> Self {
        self.report_redundancy = report;
        self
    }

    #[must_use]
    pub fn with_error_limit(mut self, limit: usize) -> Self {
        self.error_limit = limit;
        self
    }

    #[must_use]
    pub fn with_lowering(mut self, lower: LowerOptions) -> Self {
        self.lower = lower;
        self
    }

    pub(crate) fn extract(&self) -> ExtractOptions {
        ExtractOptions {
            branch_marker: self.branch_marker,
        }
    }

    pub(crate) fn validate(&self) -> ValidateOptions {
        ValidateOptions {
            branch_marker: self.branch_marker,
        }
    }

    pub(crate) fn diagnostics(&self) -> DiagnosticConfig {
        DiagnosticConfig {
            error_limit: self.error_limit,
            deduplicate: true,
        }
    }
}

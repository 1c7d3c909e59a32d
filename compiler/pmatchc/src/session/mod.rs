//! The compilation session.

use tracing::debug;

use pmatch_codegen::{check_coverage, lower, MatchProcedure};
use pmatch_diagnostic::{Diagnostic, DiagnosticQueue, ErrorCode};
use pmatch_ir::{Name, SharedInterner, Span, StringInterner};
use pmatch_patterns::{Pattern, Validator};
use pmatch_schema::{CacheStats, DescriptorId, SchemaId, SchemaRegistry, TypeTable};

use crate::MatchOptions;

/// A successfully compiled match statement.
#[derive(Clone, Debug)]
pub struct CompiledMatch {
    pub procedure: MatchProcedure,
    /// Warnings in source order; never contains errors.
    pub warnings: Vec<Diagnostic>,
}

/// Owns everything that outlives a single match statement: the interner,
/// the host's type table and the schema cache.
///
/// Descriptors are immutable once a schema has been extracted from them.
/// Define the whole type table before the first `compile_match`.
#[derive(Debug)]
pub struct Session {
    interner: SharedInterner,
    table: TypeTable,
    registry: SchemaRegistry,
    options: MatchOptions,
}

impl Default for Session {
    fn default() -> Self {
        Self::new()
    }
}

impl Session {
    pub fn new() -> Self {
        Self::with_options(MatchOptions::default())
    }

    pub fn with_options(options: MatchOptions) -> Self {
        Session {
            interner: SharedInterner::new(),
            table: TypeTable::new(),
            registry: SchemaRegistry::with_options(options.extract()),
            options,
        }
    }

    /// Share an interner with a front end that already produced names.
    #[must_use]
    pub fn with_interner(mut self, interner: SharedInterner) -> Self {
        self.interner = interner;
        self
    }

    pub fn interner(&self) -> &StringInterner {
        &self.interner
    }

    pub fn intern(&self, s: &str) -> Name {
        self.interner.intern(s)
    }

    pub fn options(&self) -> &MatchOptions {
        &self.options
    }

    pub fn table(&self) -> &TypeTable {
        &self.table
    }

    pub fn table_mut(&mut self) -> &mut TypeTable {
        &mut self.table
    }

    pub fn registry(&self) -> &SchemaRegistry {
        &self.registry
    }

    pub fn cache_stats(&self) -> CacheStats {
        self.registry.stats()
    }

    pub fn schema_of(&mut self, descriptor: DescriptorId) -> SchemaId {
        self.registry.schema_of(&self.table, &self.interner, descriptor)
    }

    /// Validate every arm against the scrutinee, check exhaustiveness, and
    /// lower.
    ///
    /// All arms are validated even after a failure, so one call reports
    /// every offending node. `span` is the span of the whole statement and
    /// anchors exhaustiveness errors.
    #[tracing::instrument(level = "debug", skip_all, fields(arms = arms.len()))]
    pub fn compile_match(
        &mut self,
        scrutinee: DescriptorId,
        arms: &[Pattern],
        span: Span,
    ) -> Result<CompiledMatch, Vec<Diagnostic>> {
        let schema = self.registry.schema_of(&self.table, &self.interner, scrutinee);
        let mut queue = DiagnosticQueue::with_config(self.options.diagnostics());

        let mut validator = Validator::new(&mut self.registry, &self.table, &self.interner, self.options.validate());
        let mut validated = Vec::with_capacity(arms.len());
        for arm in arms {
            match validator.validate(arm, schema) {
                Ok(checked) => validated.push(checked),
                Err(diagnostics) => queue.extend(diagnostics),
            }
        }
        if queue.has_errors().is_some() {
            debug!(errors = queue.error_count(), "arms rejected");
            return Err(queue.flush());
        }

        let exhaustive = if self.options.check_exhaustiveness {
            let coverage = check_coverage(&validated, schema, self.registry.pool(), &self.interner, span);
            let report_redundancy = self.options.report_redundancy;
            queue.extend(
                coverage
                    .diagnostics
                    .into_iter()
                    .filter(|d| report_redundancy || d.code != ErrorCode::E3002),
            );
            if queue.has_errors().is_some() {
                return Err(queue.flush());
            }
            coverage.exhaustive
        } else {
            false
        };

        let procedure = lower(&validated, schema, exhaustive, &self.options.lower);
        Ok(CompiledMatch {
            procedure,
            warnings: queue.flush(),
        })
    }
}

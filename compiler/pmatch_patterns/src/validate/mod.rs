//! Pattern validation.
//!
//! Dispatches on `(pattern kind, schema kind)`. Every offending node gets
//! exactly one diagnostic; validation continues past it (the node is
//! replaced by a wildcard) so one pass reports every problem in the arm.
//!
//! Submodules:
//! - `literal`: literal, nil and member patterns; the numeric-family law
//! - `object`: constructor patterns over records, unions and optionals;
//!   the branch safety rule
//! - `container`: destructures, maps, sets

mod container;
mod literal;
mod object;

use tracing::{debug, trace};

use pmatch_diagnostic::{suggest, Diagnostic, ErrorCode};
use pmatch_ir::{ensure_sufficient_stack, Name, Span, StringInterner};
use pmatch_schema::{compat, Compat, DescriptorId, Schema, SchemaId, SchemaRegistry, TypeTable};

use crate::{Binding, CheckedNode, CheckedPattern, GuardExpr, Pattern, PatternKind, ValidatedArm};

#[derive(Copy, Clone, Eq, PartialEq, Hash, Debug)]
pub struct ValidateOptions {
    /// Branch marker for implicit case resolution.
    pub branch_marker: char,
}

impl Default for ValidateOptions {
    fn default() -> Self {
        ValidateOptions { branch_marker: 'k' }
    }
}

/// The checked arm, or every diagnostic explaining why it was rejected.
pub type ValidationResult = Result<ValidatedArm, Vec<Diagnostic>>;

pub struct Validator<'a> {
    registry: &'a mut SchemaRegistry,
    table: &'a TypeTable,
    interner: &'a StringInterner,
    options: ValidateOptions,
    diagnostics: Vec<Diagnostic>,
    /// Names bound so far on the current path.
    bindings: Vec<Binding>,
}

impl<'a> Validator<'a> {
    pub fn new(
        registry: &'a mut SchemaRegistry,
        table: &'a TypeTable,
        interner: &'a StringInterner,
        options: ValidateOptions,
    ) -> Self {
        Validator {
            registry,
            table,
            interner,
            options,
            diagnostics: Vec::new(),
            bindings: Vec::new(),
        }
    }

    pub fn validate(&mut self, pattern: &Pattern, schema: SchemaId) -> ValidationResult {
        debug!(span = ?pattern.span, schema = ?schema, "validate pattern");
        self.diagnostics.clear();
        self.bindings.clear();

        let checked = self.check(pattern, schema);

        if self.diagnostics.is_empty() {
            Ok(ValidatedArm {
                pattern: checked,
                bindings: std::mem::take(&mut self.bindings),
            })
        } else {
            debug!(errors = self.diagnostics.len(), "pattern rejected");
            self.bindings.clear();
            Err(std::mem::take(&mut self.diagnostics))
        }
    }

    fn check(&mut self, pattern: &Pattern, schema: SchemaId) -> CheckedPattern {
        ensure_sufficient_stack(|| self.check_inner(pattern, schema))
    }

    fn check_inner(&mut self, pattern: &Pattern, schema: SchemaId) -> CheckedPattern {
        let span = pattern.span;
        let node = match &pattern.kind {
            PatternKind::Wildcard => CheckedNode::Wildcard,
            PatternKind::Bind(name) => {
                self.bind(*name, schema, span);
                CheckedNode::Bind {
                    name: *name,
                    inner: Box::new(CheckedPattern::wildcard(span)),
                }
            }
            PatternKind::As { name, inner } => {
                let inner = self.check(inner, schema);
                self.bind(*name, schema, span);
                CheckedNode::Bind {
                    name: *name,
                    inner: Box::new(inner),
                }
            }
            PatternKind::Literal(lit) => self.check_literal(*lit, schema, span),
            PatternKind::Alt(branches) => self.check_alt(branches, schema),
            PatternKind::Guard { inner, guard } => self.check_guard(inner, guard, schema, span),
            PatternKind::Ctor(ctor) => self.check_ctor(ctor, schema, span),
            PatternKind::Destructure(elems) => self.check_destructure(elems, schema, span),
            PatternKind::TypeTest(target) => self.check_type_test(*target, None, schema, span),
            PatternKind::Narrow { name, target } => self.check_type_test(*target, Some(*name), schema, span),
            PatternKind::Map(entries) => self.check_map(entries, schema, span),
            PatternKind::Set { members, exact } => self.check_set(members, *exact, schema, span),
        };
        CheckedPattern::new(node, span)
    }

    // ── bindings ──

    fn bind(&mut self, name: Name, schema: SchemaId, span: Span) {
        if let Some(previous) = self.bindings.iter().find(|b| b.name == name) {
            let diag = Diagnostic::error(ErrorCode::E2015)
                .with_message(format!("`{}` is bound more than once in this pattern", self.text(name)))
                .with_label(span, "bound again here")
                .with_secondary_label(previous.span, "first bound here");
            self.error(diag);
            return;
        }
        self.bindings.push(Binding { name, schema, span });
    }

    fn check_alt(&mut self, branches: &[Pattern], schema: SchemaId) -> CheckedNode {
        let before = self.bindings.len();
        let mut checked = Vec::with_capacity(branches.len());
        let mut first: Option<Vec<Binding>> = None;

        for branch in branches {
            self.bindings.truncate(before);
            checked.push(self.check(branch, schema));
            let bound: Vec<Binding> = self.bindings[before..].to_vec();

            match &first {
                None => first = Some(bound),
                Some(reference) => self.compare_alternative(reference, &bound, branch.span),
            }
        }

        self.bindings.truncate(before);
        self.bindings.extend(first.unwrap_or_default());
        CheckedNode::Alt(checked)
    }

    /// Every alternative binds the same names at family-compatible types.
    fn compare_alternative(&mut self, reference: &[Binding], bound: &[Binding], span: Span) {
        let missing: Vec<Name> = reference
            .iter()
            .map(|b| b.name)
            .filter(|n| !bound.iter().any(|b| b.name == *n))
            .collect();
        let extra: Vec<Name> = bound
            .iter()
            .map(|b| b.name)
            .filter(|n| !reference.iter().any(|b| b.name == *n))
            .collect();

        if !missing.is_empty() || !extra.is_empty() {
            let mut diag = Diagnostic::error(ErrorCode::E2013)
                .with_message("alternatives must bind the same names")
                .with_label(span, "this alternative binds a different set of names");
            if !missing.is_empty() {
                diag = diag.with_note(format!("missing here: {}", self.quoted_list(&missing)));
            }
            if !extra.is_empty() {
                diag = diag.with_note(format!("not bound by the first alternative: {}", self.quoted_list(&extra)));
            }
            self.error(diag);
            return;
        }

        for b in bound {
            let Some(r) = reference.iter().find(|r| r.name == b.name) else {
                continue;
            };
            let relation = compat(self.registry.pool(), b.schema, r.schema);
            if !matches!(relation, Compat::Exact | Compat::Numeric) {
                let diag = Diagnostic::error(ErrorCode::E2014)
                    .with_message(format!(
                        "`{}` is bound as `{}` here but as `{}` in the first alternative",
                        self.text(b.name),
                        self.type_name(b.schema),
                        self.type_name(r.schema)
                    ))
                    .with_label(b.span, "incompatible binding")
                    .with_secondary_label(r.span, "first bound here");
                self.error(diag);
                return;
            }
        }
    }

    fn check_guard(&mut self, inner: &Pattern, guard: &GuardExpr, schema: SchemaId, span: Span) -> CheckedNode {
        let inner = self.check(inner, schema);
        let unbound: Vec<Name> = guard
            .uses
            .iter()
            .copied()
            .filter(|n| !self.bindings.iter().any(|b| b.name == *n))
            .collect();
        if !unbound.is_empty() {
            let bound: Vec<&str> = self.bindings.iter().map(|b| self.text(b.name)).collect();
            let similar: Vec<&str> = unbound
                .iter()
                .filter_map(|n| suggest::suggest_similar(self.text(*n), bound.iter().copied()))
                .collect();
            let diag = Diagnostic::error(ErrorCode::E2019)
                .with_message(format!(
                    "guard uses {}, which this pattern does not bind",
                    self.quoted_list(&unbound)
                ))
                .with_label(span, "guard evaluated here")
                .with_similar_names(similar);
            self.error(diag);
        }
        CheckedNode::Guard {
            inner: Box::new(inner),
            guard: guard.id,
        }
    }

    fn check_type_test(
        &mut self,
        target: DescriptorId,
        bind: Option<Name>,
        schema: SchemaId,
        span: Span,
    ) -> CheckedNode {
        let target = self.registry.schema_of(self.table, self.interner, target);
        let test = match compat(self.registry.pool(), target, schema) {
            Compat::Exact | Compat::Numeric => CheckedNode::Wildcard,
            Compat::Deferred => CheckedNode::TypeIs {
                schema: target,
                type_name: self.schema(target).name,
            },
            Compat::Incompatible => {
                let diag = Diagnostic::error(ErrorCode::E2017)
                    .with_message(format!(
                        "`{}` can never be a `{}`",
                        self.type_name(schema),
                        self.type_name(target)
                    ))
                    .with_label(span, "impossible type test");
                self.error(diag);
                CheckedNode::Wildcard
            }
        };
        match bind {
            None => test,
            Some(name) => {
                self.bind(name, target, span);
                CheckedNode::Bind {
                    name,
                    inner: Box::new(CheckedPattern::new(test, span)),
                }
            }
        }
    }

    // ── helpers ──

    fn error(&mut self, diag: Diagnostic) {
        trace!(code = %diag.code, message = %diag.message, "validation error");
        self.diagnostics.push(diag);
    }

    fn schema(&self, id: SchemaId) -> &Schema {
        self.registry.get(id)
    }

    fn text(&self, name: Name) -> &'static str {
        self.interner.lookup(name)
    }

    /// Name of a schema as the user wrote it.
    fn type_name(&self, id: SchemaId) -> &'static str {
        self.text(self.schema(id).display_name())
    }

    fn quoted_list(&self, names: &[Name]) -> String {
        names
            .iter()
            .map(|n| format!("`{}`", self.text(*n)))
            .collect::<Vec<_>>()
            .join(", ")
    }

    /// Closest candidates to `name` among `candidates`.
    fn similar(&self, name: Name, candidates: &[Name]) -> Vec<&'static str> {
        let texts: Vec<&'static str> = candidates.iter().map(|c| self.text(*c)).collect();
        suggest::similar_names(self.text(name), texts)
    }
}

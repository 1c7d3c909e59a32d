//! Exhaustiveness and redundancy.
//!
//! Coverage is computed over the case labels of the scrutinee's closed kind:
//! enumeration members, `Some`/`None` for optionals, union branch labels,
//! plus `nil` when the scrutinee is a reference. Each arm contributes two
//! label sets:
//!
//! - its *footprint*: labels it may match at all;
//! - its *cover*: labels it matches for every value carrying them.
//!
//! Guarded arms and arms with refutable sub-patterns have a footprint but no
//! cover. Nested values are not analyzed: `Some(1)` has `Some` in its
//! footprint and covers nothing.

use rustc_hash::FxHashSet;
use tracing::debug;

use pmatch_diagnostic::{Diagnostic, ErrorCode};
use pmatch_ir::{Literal, Name, Span, StringInterner};
use pmatch_patterns::{CheckedNode, CheckedPattern, ObjectPattern, ValidatedArm};
use pmatch_schema::{Schema, SchemaId, SchemaPool};

/// Result of [`check_coverage`].
#[derive(Clone, Debug, Default)]
pub struct Coverage {
    /// Every value of the scrutinee matches some unguarded arm.
    pub exhaustive: bool,
    /// Labels no unguarded arm covers, in declaration order. Empty when the
    /// scrutinee kind is not closed.
    pub missing: Vec<Name>,
    /// Arms that can never be selected.
    pub redundant: Vec<usize>,
    /// `E3001` for missing labels, one `E3002` warning per redundant arm.
    pub diagnostics: Vec<Diagnostic>,
}

impl Coverage {
    pub fn has_errors(&self) -> bool {
        self.diagnostics.iter().any(Diagnostic::is_error)
    }
}

/// Check `arms` (in source order) for exhaustiveness over `scrutinee` and
/// find redundant arms. `span` locates the whole match for the `E3001`
/// diagnostic.
#[tracing::instrument(level = "debug", skip_all, fields(arms = arms.len()))]
pub fn check_coverage(
    arms: &[ValidatedArm],
    scrutinee: SchemaId,
    pool: &SchemaPool,
    interner: &StringInterner,
    span: Span,
) -> Coverage {
    let schema = pool.get(scrutinee);
    let closed = schema.structural_kind().is_closed();
    let labels = Labels::new(schema, interner);

    let mut coverage = Coverage::default();
    let mut covered: FxHashSet<Name> = FxHashSet::default();
    let mut catch_all: Option<Span> = None;

    for (index, arm) in arms.iter().enumerate() {
        let pattern = &arm.pattern;
        if let Some(earlier) = catch_all {
            coverage.redundant.push(index);
            coverage.diagnostics.push(
                Diagnostic::warning(ErrorCode::E3002)
                    .with_message("unreachable match arm")
                    .with_label(pattern.span, "this arm never matches")
                    .with_secondary_label(earlier, "every value already matches here"),
            );
            continue;
        }

        if closed {
            let footprint = labels.footprint(pattern);
            if !footprint.is_empty() && footprint.iter().all(|l| covered.contains(l)) {
                coverage.redundant.push(index);
                coverage.diagnostics.push(
                    Diagnostic::warning(ErrorCode::E3002)
                        .with_message("unreachable match arm")
                        .with_label(pattern.span, "this arm never matches")
                        .with_note(format!("{} already covered by earlier arms", labels.quoted(&footprint))),
                );
                continue;
            }
            covered.extend(labels.cover(pattern));
        }

        if pattern.is_catch_all() {
            catch_all = Some(pattern.span);
        }
    }

    if catch_all.is_some() {
        coverage.exhaustive = true;
    } else if closed {
        coverage.missing = labels.all.iter().copied().filter(|l| !covered.contains(l)).collect();
        coverage.exhaustive = coverage.missing.is_empty();
        if !coverage.exhaustive {
            let diag = labels.not_exhaustive(&coverage.missing, arms, span);
            coverage.diagnostics.insert(0, diag);
        }
    }

    debug!(
        exhaustive = coverage.exhaustive,
        missing = coverage.missing.len(),
        redundant = coverage.redundant.len(),
        "checked coverage"
    );
    coverage
}

/// The label universe of one scrutinee.
struct Labels<'a> {
    schema: &'a Schema,
    interner: &'a StringInterner,
    all: Vec<Name>,
    nil: Name,
    some: Name,
    none: Name,
}

impl<'a> Labels<'a> {
    fn new(schema: &'a Schema, interner: &'a StringInterner) -> Self {
        let nil = interner.intern("nil");
        let mut all = schema.case_labels(interner);
        if schema.is_indirection() {
            all.push(nil);
        }
        Labels {
            schema,
            interner,
            all,
            nil,
            some: interner.intern("Some"),
            none: interner.intern("None"),
        }
    }

    /// Labels of a union's branches (the universe without `nil`).
    fn branches(&self) -> Vec<Name> {
        self.schema.branches.iter().map(|b| b.label).collect()
    }

    fn cover(&self, pattern: &CheckedPattern) -> Vec<Name> {
        match &pattern.node {
            CheckedNode::Wildcard => self.all.clone(),
            CheckedNode::Bind { inner, .. } => self.cover(inner),
            CheckedNode::Member { name, .. } => vec![*name],
            CheckedNode::Nil => vec![self.nil],
            CheckedNode::None => vec![self.none],
            CheckedNode::Some(inner) if inner.is_catch_all() => vec![self.some],
            CheckedNode::Alt(branches) => branches.iter().flat_map(|b| self.cover(b)).collect(),
            CheckedNode::Object(object) if self.object_is_total(object) => self.object_labels(object, true),
            _ => Vec::new(),
        }
    }

    fn footprint(&self, pattern: &CheckedPattern) -> Vec<Name> {
        match &pattern.node {
            CheckedNode::Wildcard | CheckedNode::TypeIs { .. } => self.all.clone(),
            CheckedNode::Bind { inner, .. } | CheckedNode::Guard { inner, .. } => self.footprint(inner),
            CheckedNode::Member { name, .. } => vec![*name],
            CheckedNode::Nil => vec![self.nil],
            CheckedNode::None => vec![self.none],
            CheckedNode::Some(_) => vec![self.some],
            CheckedNode::Alt(branches) => branches.iter().flat_map(|b| self.footprint(b)).collect(),
            CheckedNode::Object(object) => self.object_labels(object, false),
            _ => Vec::new(),
        }
    }

    /// Every non-discriminator field pattern is a catch-all and no runtime
    /// type test narrows the object.
    fn object_is_total(&self, object: &ObjectPattern) -> bool {
        let discriminator = self.schema.discriminator.map(|d| d.field);
        object.runtime_type.is_none()
            && object
                .fields
                .iter()
                .filter(|f| Some(f.field) != discriminator)
                .all(|f| f.pattern.is_catch_all())
    }

    /// Branch labels an object pattern selects: the case pin intersected
    /// with the discriminator sub-pattern.
    fn object_labels(&self, object: &ObjectPattern, total: bool) -> Vec<Name> {
        let mut labels = self.branches();
        if let Some(pin) = &object.pin {
            labels.retain(|l| pin.labels.iter().any(|p| p.label == *l));
        }
        let discriminator = self.schema.discriminator.map(|d| d.field);
        if let Some(field) = object.fields.iter().find(|f| Some(f.field) == discriminator) {
            let selected = self.discriminator_labels(&field.pattern, total);
            labels.retain(|l| selected.contains(l));
        }
        labels
    }

    fn discriminator_labels(&self, pattern: &CheckedPattern, total: bool) -> Vec<Name> {
        match &pattern.node {
            CheckedNode::Wildcard => self.branches(),
            CheckedNode::Bind { inner, .. } => self.discriminator_labels(inner, total),
            CheckedNode::Guard { inner, .. } if !total => self.discriminator_labels(inner, total),
            CheckedNode::Member { name, .. } => vec![*name],
            CheckedNode::Literal(Literal::Bool(b)) => {
                let label = self.interner.intern(if *b { "true" } else { "false" });
                vec![label]
            }
            CheckedNode::Alt(branches) => branches
                .iter()
                .flat_map(|b| self.discriminator_labels(b, total))
                .collect(),
            _ => Vec::new(),
        }
    }

    fn quoted(&self, labels: &[Name]) -> String {
        let mut seen = FxHashSet::default();
        labels
            .iter()
            .filter(|l| seen.insert(**l))
            .map(|l| format!("`{}`", self.interner.lookup(*l)))
            .collect::<Vec<_>>()
            .join(", ")
    }

    fn not_exhaustive(&self, missing: &[Name], arms: &[ValidatedArm], span: Span) -> Diagnostic {
        let list = self.quoted(missing);
        let noun = if missing.len() == 1 { "case" } else { "cases" };
        let first = missing.first().map_or("", |l| self.interner.lookup(*l));
        let mut diag = Diagnostic::error(ErrorCode::E3001)
            .with_message(format!(
                "match on `{}` is not exhaustive: {noun} {list} not covered",
                self.interner.lookup(self.schema.display_name())
            ))
            .with_label(span, format!("{list} not covered"))
            .with_suggestion(format!("add an arm for `{first}` or a wildcard `_` arm"));
        let guarded: Vec<&ValidatedArm> = arms
            .iter()
            .filter(|arm| {
                has_guard(&arm.pattern) && self.footprint(&arm.pattern).iter().any(|l| missing.contains(l))
            })
            .collect();
        for arm in guarded {
            diag = diag.with_secondary_label(arm.pattern.span, "guarded arms do not count towards exhaustiveness");
        }
        diag
    }
}

fn has_guard(pattern: &CheckedPattern) -> bool {
    match &pattern.node {
        CheckedNode::Guard { .. } => true,
        CheckedNode::Bind { inner, .. } | CheckedNode::Some(inner) => has_guard(inner),
        CheckedNode::Alt(branches) => branches.iter().any(has_guard),
        CheckedNode::Object(object) => object.fields.iter().any(|f| has_guard(&f.pattern)),
        CheckedNode::Tuple(items) => items.iter().any(|(_, p)| has_guard(p)),
        CheckedNode::Seq(seq) => seq.items.iter().chain(seq.spread.as_deref()).any(has_guard),
        CheckedNode::Map(entries) => entries.iter().any(|(_, p)| has_guard(p)),
        _ => false,
    }
}

//! Constructor patterns over records, discriminated unions and optionals.
//!
//! A field read is safe when the field is shared (the discriminator or a
//! branch-independent field) or declared by every branch the pattern pins.
//! Pins come from the case name (`Node.Ident`) and from a literal label or
//! alternation of labels on the discriminator field.

use smallvec::SmallVec;

use pmatch_diagnostic::{Diagnostic, ErrorCode};
use pmatch_ir::{Literal, Name, Span};
use pmatch_schema::{compat, Compat, FieldDescriptor, Schema, SchemaId, SchemaKind};

use super::Validator;
use crate::{
    resolve_case, CaseResolution, CheckedNode, CheckedPattern, CtorPattern, FieldMatch, ObjectPattern, Pin,
    PinnedLabel,
};

type Labels = SmallVec<[PinnedLabel; 2]>;

impl Validator<'_> {
    pub(super) fn check_ctor(&mut self, ctor: &CtorPattern, schema: SchemaId, span: Span) -> CheckedNode {
        let kind = self.schema(schema).structural_kind();
        match kind {
            SchemaKind::Optional => self.check_optional_ctor(ctor, schema, span),
            SchemaKind::Record | SchemaKind::Union => self.check_object_ctor(ctor, schema, span),
            SchemaKind::Opaque => {
                let diag = Diagnostic::error(ErrorCode::E2008)
                    .with_message(format!(
                        "cannot destructure `{}`: its structure is unknown",
                        self.type_name(schema)
                    ))
                    .with_label(span, "constructor pattern over an opaque type")
                    .with_note("literals, wildcards and bindings still match it");
                self.error(diag);
                CheckedNode::Wildcard
            }
            other => {
                let diag = Diagnostic::error(ErrorCode::E2008)
                    .with_message(format!(
                        "constructor pattern cannot match `{}`, a {other}",
                        self.type_name(schema)
                    ))
                    .with_label(span, "constructor pattern here");
                self.error(diag);
                CheckedNode::Wildcard
            }
        }
    }

    fn check_optional_ctor(&mut self, ctor: &CtorPattern, schema: SchemaId, span: Span) -> CheckedNode {
        let head = ctor.case.or(ctor.type_name);
        let element = self.schema(schema).element;

        match head.map(|h| self.text(h)) {
            Some("Some") => {
                if ctor.args.len() != 1 || !ctor.fields.is_empty() {
                    let diag = Diagnostic::error(ErrorCode::E2009)
                        .with_message(format!(
                            "`Some` takes exactly one positional sub-pattern, found {}",
                            ctor.args.len() + ctor.fields.len()
                        ))
                        .with_label(span, "in this pattern");
                    self.error(diag);
                    return CheckedNode::Wildcard;
                }
                let payload = match element {
                    Some(element) => self.check(&ctor.args[0], element),
                    None => CheckedPattern::wildcard(ctor.args[0].span),
                };
                CheckedNode::Some(Box::new(payload))
            }
            Some("None") => {
                if !ctor.args.is_empty() || !ctor.fields.is_empty() {
                    let diag = Diagnostic::error(ErrorCode::E2009)
                        .with_message("`None` takes no sub-patterns")
                        .with_label(span, "in this pattern");
                    self.error(diag);
                    return CheckedNode::Wildcard;
                }
                CheckedNode::None
            }
            other => {
                let written = other.unwrap_or("");
                let diag = Diagnostic::error(ErrorCode::E2002)
                    .with_message(format!(
                        "`{written}` is not a case of `{}`",
                        self.type_name(schema)
                    ))
                    .with_label(span, "expected `Some` or `None`")
                    .with_similar_names(pmatch_diagnostic::suggest::similar_names(written, ["Some", "None"]));
                self.error(diag);
                CheckedNode::Wildcard
            }
        }
    }

    fn check_object_ctor(&mut self, ctor: &CtorPattern, scrutinee: SchemaId, span: Span) -> CheckedNode {
        let nil_check = self.schema(scrutinee).is_indirection();
        let mut case = ctor.case;
        let mut target = scrutinee;
        let mut runtime_type = None;

        if let Some(head) = ctor.type_name {
            if self.names_schema(scrutinee, head) {
                // The scrutinee's own type, its alias, pointee or an ancestor.
            } else if let Some(descriptor) = ctor.target {
                let derived = self.registry.schema_of(self.table, self.interner, descriptor);
                match compat(self.registry.pool(), derived, scrutinee) {
                    Compat::Exact => target = derived,
                    Compat::Deferred => {
                        target = derived;
                        runtime_type = Some(self.schema(derived).name);
                    }
                    Compat::Numeric | Compat::Incompatible => {
                        let diag = Diagnostic::error(ErrorCode::E2016)
                            .with_message(format!(
                                "`{}` is neither `{}` nor derived from it",
                                self.text(head),
                                self.type_name(scrutinee)
                            ))
                            .with_label(span, "constructor names an unrelated type");
                        self.error(diag);
                        return CheckedNode::Wildcard;
                    }
                }
            } else if case.is_none() && self.is_case_label(scrutinee, head) {
                case = Some(head);
            } else {
                let candidates = self.head_candidates(scrutinee);
                let diag = Diagnostic::error(ErrorCode::E2016)
                    .with_message(format!(
                        "expected a `{}` constructor, found `{}`",
                        self.type_name(scrutinee),
                        self.text(head)
                    ))
                    .with_label(span, "constructor names a different type")
                    .with_similar_names(self.similar(head, &candidates));
                self.error(diag);
                return CheckedNode::Wildcard;
            }
        }

        let schema = self.schema(target).clone();

        let case_pin = match case {
            Some(case) => match self.pin_case(&schema, target, case, span) {
                Some(labels) => Some(labels),
                None => return CheckedNode::Wildcard,
            },
            None => None,
        };

        let mut fields = Vec::with_capacity(ctor.fields.len() + ctor.args.len());

        // Discriminator first: its pattern may pin branches for the rest.
        let mut pinned = case_pin.clone();
        if let Some(disc) = schema.discriminator {
            if let Some(fp) = ctor.fields.iter().find(|f| f.name == disc.field) {
                let checked = self.check(&fp.pattern, disc.schema);
                if let Some(labels) = self.labels_of(&checked, &schema) {
                    pinned = Some(match pinned {
                        None => labels,
                        Some(from_case) => {
                            let both: Labels = labels
                                .iter()
                                .copied()
                                .filter(|l| from_case.iter().any(|c| c.label == l.label))
                                .collect();
                            if both.is_empty() {
                                let diag = Diagnostic::error(ErrorCode::E2005)
                                    .with_message(format!(
                                        "`{}` contradicts the case named by the constructor",
                                        self.text(disc.field)
                                    ))
                                    .with_label(fp.span, "no branch satisfies both");
                                self.error(diag);
                            }
                            both
                        }
                    });
                }
                let position = schema.field(disc.field).map_or(0, |f| f.position);
                fields.push(FieldMatch {
                    field: disc.field,
                    position,
                    pattern: checked,
                });
            }
        }

        let discriminator = schema.discriminator.map(|d| d.field);
        for fp in ctor.fields.iter().filter(|f| Some(f.name) != discriminator) {
            let Some(field) = self.readable_field(&schema, target, fp.name, pinned.as_deref(), fp.span) else {
                continue;
            };
            let pattern = self.check(&fp.pattern, field.schema);
            fields.push(FieldMatch {
                field: field.name,
                position: field.position,
                pattern,
            });
        }

        if !ctor.args.is_empty() {
            let positional = self.positional_fields(&schema, pinned.as_deref());
            if ctor.args.len() > positional.len() {
                let diag = Diagnostic::error(ErrorCode::E2009)
                    .with_message(format!(
                        "`{}` has {} positional field{}, found {} sub-patterns",
                        self.type_name(target),
                        positional.len(),
                        if positional.len() == 1 { "" } else { "s" },
                        ctor.args.len()
                    ))
                    .with_label(span, "too many positional sub-patterns");
                self.error(diag);
            }
            for (arg, field) in ctor.args.iter().zip(positional) {
                let pattern = self.check(arg, field.schema);
                fields.push(FieldMatch {
                    field: field.name,
                    position: field.position,
                    pattern,
                });
            }
        }

        let pin = case_pin.map(|labels| Pin {
            discriminator: discriminator.unwrap_or(schema.name),
            labels,
        });
        CheckedNode::Object(ObjectPattern {
            schema: target,
            nil_check,
            runtime_type,
            pin,
            fields,
        })
    }

    /// The head names the scrutinee: its name, the alias it was reached
    /// through, the pointee of a reference, or an ancestor.
    fn names_schema(&self, id: SchemaId, head: Name) -> bool {
        let pool = self.registry.pool();
        let pointee = pool.unwrap_indirections(id);
        [id, pool.canonical(id), pointee]
            .into_iter()
            .map(|s| pool.get(s))
            .any(|s| s.name == head || s.alias_name == Some(head))
            || pool
                .get(pointee)
                .ancestors
                .iter()
                .any(|&a| pool.get(a).display_name() == head)
    }

    fn is_case_label(&self, id: SchemaId, head: Name) -> bool {
        let schema = self.schema(id);
        if schema.structural_kind() != SchemaKind::Union {
            return false;
        }
        let labels: Vec<Name> = schema.branches.iter().map(|b| b.label).collect();
        resolve_case(&labels, self.text(head), self.options.branch_marker, self.interner)
            .label()
            .is_some()
    }

    fn head_candidates(&self, id: SchemaId) -> Vec<Name> {
        let pool = self.registry.pool();
        let schema = self.schema(id);
        let mut names = vec![schema.name];
        names.extend(schema.alias_name);
        names.push(pool.get(pool.unwrap_indirections(id)).name);
        if schema.structural_kind() == SchemaKind::Union {
            names.extend(schema.branches.iter().map(|b| b.label));
        }
        names.dedup();
        names
    }

    /// Resolve a case name to the single branch it pins.
    fn pin_case(&mut self, schema: &Schema, id: SchemaId, case: Name, span: Span) -> Option<Labels> {
        if schema.structural_kind() != SchemaKind::Union {
            let diag = Diagnostic::error(ErrorCode::E2002)
                .with_message(format!(
                    "`{}` has no cases; `{}` is not one of them",
                    self.type_name(id),
                    self.text(case)
                ))
                .with_label(span, "case name on a type without branches");
            self.error(diag);
            return None;
        }
        let labels: Vec<Name> = schema.branches.iter().map(|b| b.label).collect();
        match resolve_case(&labels, self.text(case), self.options.branch_marker, self.interner) {
            CaseResolution::Exact(label) | CaseResolution::Marked(label) => {
                let ordinal = schema.branch(label).map_or(0, |b| b.ordinal);
                Some(SmallVec::from_elem(PinnedLabel { label, ordinal }, 1))
            }
            CaseResolution::Ambiguous(candidates) => {
                let diag = Diagnostic::error(ErrorCode::E2003)
                    .with_message(format!(
                        "case `{}` matches several branches of `{}`: {}",
                        self.text(case),
                        self.type_name(id),
                        self.quoted_list(&candidates)
                    ))
                    .with_label(span, "ambiguous case name")
                    .with_suggestion("write the full branch label");
                self.error(diag);
                None
            }
            CaseResolution::Unknown => {
                let diag = Diagnostic::error(ErrorCode::E2002)
                    .with_message(format!(
                        "`{}` is not a case of `{}`",
                        self.text(case),
                        self.type_name(id)
                    ))
                    .with_label(span, "unknown case")
                    .with_similar_names(self.similar(case, &labels));
                self.error(diag);
                None
            }
        }
    }

    /// Branches a checked discriminator pattern restricts the value to, or
    /// `None` when it does not restrict it.
    fn labels_of(&self, pattern: &CheckedPattern, schema: &Schema) -> Option<Labels> {
        match &pattern.node {
            CheckedNode::Member { name, ordinal } => Some(SmallVec::from_elem(
                PinnedLabel {
                    label: *name,
                    ordinal: *ordinal,
                },
                1,
            )),
            CheckedNode::Literal(Literal::Bool(b)) => {
                let text = if *b { "true" } else { "false" };
                let label = self.interner.get(text)?;
                let branch = schema.branch(label)?;
                Some(SmallVec::from_elem(
                    PinnedLabel {
                        label,
                        ordinal: branch.ordinal,
                    },
                    1,
                ))
            }
            CheckedNode::Literal(Literal::Symbol(name)) => {
                let branch = schema.branch(*name)?;
                Some(SmallVec::from_elem(
                    PinnedLabel {
                        label: *name,
                        ordinal: branch.ordinal,
                    },
                    1,
                ))
            }
            CheckedNode::Alt(branches) => {
                let mut labels = Labels::new();
                for branch in branches {
                    for label in self.labels_of(branch, schema)? {
                        if !labels.iter().any(|l| l.label == label.label) {
                            labels.push(label);
                        }
                    }
                }
                Some(labels)
            }
            CheckedNode::Bind { inner, .. } | CheckedNode::Guard { inner, .. } => self.labels_of(inner, schema),
            _ => None,
        }
    }

    /// Field `name` if reading it is safe under `pinned`; reports otherwise.
    fn readable_field(
        &mut self,
        schema: &Schema,
        id: SchemaId,
        name: Name,
        pinned: Option<&[PinnedLabel]>,
        span: Span,
    ) -> Option<FieldDescriptor> {
        if let Some(field) = schema.field(name) {
            return Some(*field);
        }

        let owners: Vec<Name> = schema.branches_with_field(name).collect();
        if owners.is_empty() {
            let candidates = schema.all_field_names();
            let diag = Diagnostic::error(ErrorCode::E2001)
                .with_message(format!(
                    "`{}` has no field `{}`",
                    self.type_name(id),
                    self.text(name)
                ))
                .with_label(span, "unknown field")
                .with_similar_names(self.similar(name, &candidates));
            self.error(diag);
            return None;
        }

        let discriminator = schema.discriminator.map_or(schema.name, |d| d.field);
        let Some(pinned) = pinned else {
            let diag = Diagnostic::error(ErrorCode::E2004)
                .with_message(format!(
                    "field `{}` exists only when `{}` is {}",
                    self.text(name),
                    self.text(discriminator),
                    self.quoted_list(&owners)
                ))
                .with_label(span, "read without testing the discriminator")
                .with_suggestion(format!(
                    "pin the branch first, e.g. `{}: {}`",
                    self.text(discriminator),
                    self.text(owners[0])
                ));
            self.error(diag);
            return None;
        };

        let outside: Vec<Name> = pinned
            .iter()
            .map(|p| p.label)
            .filter(|label| !owners.contains(label))
            .collect();
        if !outside.is_empty() {
            let diag = Diagnostic::error(ErrorCode::E2005)
                .with_message(format!(
                    "field `{}` is not readable when `{}` is {}",
                    self.text(name),
                    self.text(discriminator),
                    self.quoted_list(&outside)
                ))
                .with_label(span, "field of another branch")
                .with_note(format!("`{}` belongs to {}", self.text(name), self.quoted_list(&owners)));
            self.error(diag);
            return None;
        }

        pinned
            .first()
            .and_then(|p| schema.branch(p.label))
            .and_then(|b| b.fields.iter().find(|f| f.name == name))
            .copied()
    }

    /// Fields bound by positional sub-patterns: the pinned branch's own
    /// fields when exactly one branch is pinned, the shared fields otherwise.
    fn positional_fields(&self, schema: &Schema, pinned: Option<&[PinnedLabel]>) -> Vec<FieldDescriptor> {
        if let Some([only]) = pinned {
            if let Some(branch) = schema.branch(only.label) {
                return branch.fields.clone();
            }
        }
        let discriminator = schema.discriminator.map(|d| d.field);
        schema
            .fields
            .iter()
            .filter(|f| Some(f.name) != discriminator)
            .copied()
            .collect()
    }
}

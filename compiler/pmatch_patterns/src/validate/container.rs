//! Destructures, map patterns and finite-set patterns.

use pmatch_diagnostic::{Diagnostic, ErrorCode};
use pmatch_ir::{Literal, PrimitiveKind, Span};
use pmatch_schema::{SchemaId, SchemaKind};

use super::Validator;
use crate::{CheckedNode, CheckedPattern, Pattern, SeqElem, SeqLayout, SeqPattern, SetMember, SetPattern};

impl Validator<'_> {
    pub(super) fn check_destructure(&mut self, elems: &[SeqElem], schema: SchemaId, span: Span) -> CheckedNode {
        let spreads: Vec<Span> = elems
            .iter()
            .filter_map(|e| match e {
                SeqElem::Spread { span, .. } => Some(*span),
                SeqElem::Item { .. } => None,
            })
            .collect();
        if let [first, second, ..] = spreads.as_slice() {
            let diag = Diagnostic::error(ErrorCode::E2010)
                .with_message("a destructure may contain at most one spread")
                .with_label(*second, "second spread")
                .with_secondary_label(*first, "first spread here");
            self.error(diag);
            return CheckedNode::Wildcard;
        }

        let target = self.schema(schema);
        let kind = target.structural_kind();
        let element = target.element;
        let array_len = target.array_len;
        match (kind, element) {
            (SchemaKind::Sequence | SchemaKind::Array, Some(element)) => {
                self.check_sequence(elems, element, array_len.filter(|_| kind == SchemaKind::Array), schema, span)
            }
            (SchemaKind::Tuple, _) => self.check_tuple(elems, schema, span),
            (SchemaKind::Opaque, _) => {
                let diag = Diagnostic::error(ErrorCode::E2008)
                    .with_message(format!(
                        "cannot destructure `{}`: its structure is unknown",
                        self.type_name(schema)
                    ))
                    .with_label(span, "destructure of an opaque type");
                self.error(diag);
                CheckedNode::Wildcard
            }
            _ => {
                let diag = Diagnostic::error(ErrorCode::E2008)
                    .with_message(format!(
                        "cannot destructure `{}`, a {kind}, by position",
                        self.type_name(schema)
                    ))
                    .with_label(span, "positional destructure here");
                self.error(diag);
                CheckedNode::Wildcard
            }
        }
    }

    fn check_sequence(
        &mut self,
        elems: &[SeqElem],
        element: SchemaId,
        fixed_len: Option<u32>,
        schema: SchemaId,
        span: Span,
    ) -> CheckedNode {
        let mut defaults = Vec::with_capacity(elems.len());
        let mut item_patterns: Vec<&Pattern> = Vec::with_capacity(elems.len());
        let mut spread_at = None;
        let mut spread_binding = None;

        for elem in elems {
            match elem {
                SeqElem::Item { pattern, default } => {
                    if let Some(default) = default {
                        if let Err(diag) = self.literal_node(*default, element) {
                            self.reject_default(diag, *default, element, pattern.span);
                        }
                    }
                    defaults.push(*default);
                    item_patterns.push(pattern);
                }
                SeqElem::Spread { binding, .. } => {
                    spread_at = Some(item_patterns.len());
                    spread_binding = binding.as_deref();
                }
            }
        }

        let layout = SeqLayout::new(defaults, spread_at);

        if let Some(len) = fixed_len {
            if !layout.accepts(len) {
                let needs = match layout.max_len() {
                    Some(max) if len > max => format!("at most {max}"),
                    _ => format!("at least {}", layout.min_len()),
                };
                let diag = Diagnostic::error(ErrorCode::E2012)
                    .with_message(format!(
                        "`{}` always has {len} elements, but this pattern needs {needs}",
                        self.type_name(schema)
                    ))
                    .with_label(span, "can never match");
                self.error(diag);
                return CheckedNode::Wildcard;
            }
        }

        let items: Vec<CheckedPattern> = item_patterns.iter().map(|p| self.check(p, element)).collect();
        let spread = spread_binding.map(|binding| {
            let slice = self.registry.pool_mut().sequence_of(element, self.interner);
            Box::new(self.check(binding, slice))
        });

        CheckedNode::Seq(SeqPattern {
            layout,
            fixed_len,
            items,
            spread,
        })
    }

    fn check_tuple(&mut self, elems: &[SeqElem], schema: SchemaId, span: Span) -> CheckedNode {
        let fields = self.schema(schema).fields.clone();
        let mut checked = Vec::with_capacity(elems.len());

        for elem in elems {
            match elem {
                SeqElem::Spread { span: spread, .. } => {
                    let diag = Diagnostic::error(ErrorCode::E2011)
                        .with_message(format!(
                            "`{}` is a tuple; spreads need a sequence or array",
                            self.type_name(schema)
                        ))
                        .with_label(*spread, "spread over a tuple");
                    self.error(diag);
                    return CheckedNode::Wildcard;
                }
                SeqElem::Item {
                    pattern,
                    default: Some(_),
                } => {
                    let diag = Diagnostic::error(ErrorCode::E2020)
                        .with_message("tuple positions cannot have defaults")
                        .with_label(pattern.span, "every tuple position is always present");
                    self.error(diag);
                    return CheckedNode::Wildcard;
                }
                SeqElem::Item { .. } => {}
            }
        }

        if elems.len() != fields.len() {
            let diag = Diagnostic::error(ErrorCode::E2009)
                .with_message(format!(
                    "`{}` has {} elements, found {} sub-patterns",
                    self.type_name(schema),
                    fields.len(),
                    elems.len()
                ))
                .with_label(span, "wrong number of positions");
            self.error(diag);
            return CheckedNode::Wildcard;
        }

        for (elem, field) in elems.iter().zip(&fields) {
            if let SeqElem::Item { pattern, .. } = elem {
                checked.push((field.position, self.check(pattern, field.schema)));
            }
        }
        CheckedNode::Tuple(checked)
    }

    fn reject_default(&mut self, cause: Diagnostic, default: Literal, element: SchemaId, span: Span) {
        let mut diag = Diagnostic::error(ErrorCode::E2020)
            .with_message(format!(
                "default `{}` is not a valid `{}`",
                default.display(self.interner),
                self.type_name(element)
            ))
            .with_label(span, "default for this position")
            .with_note(cause.message);
        diag.suggestions = cause.suggestions;
        self.error(diag);
    }

    pub(super) fn check_map(&mut self, entries: &[(Literal, Pattern)], schema: SchemaId, span: Span) -> CheckedNode {
        let target = self.schema(schema);
        let (Some(key), Some(value)) = (target.key, target.value) else {
            let kind = target.structural_kind();
            let diag = Diagnostic::error(ErrorCode::E2008)
                .with_message(format!(
                    "map pattern cannot match `{}`, a {kind}",
                    self.type_name(schema)
                ))
                .with_label(span, "map pattern here");
            self.error(diag);
            return CheckedNode::Wildcard;
        };

        let mut checked = Vec::with_capacity(entries.len());
        for (lit, pattern) in entries {
            match self.literal_node(*lit, key) {
                Ok(_) => checked.push((*lit, self.check(pattern, value))),
                Err(diag) => {
                    let diag = diag.with_label(pattern.span, format!("keys are `{}`", self.type_name(key)));
                    self.error(diag);
                }
            }
        }
        CheckedNode::Map(checked)
    }

    pub(super) fn check_set(&mut self, members: &[Literal], exact: bool, schema: SchemaId, span: Span) -> CheckedNode {
        let target = self.schema(schema);
        let element = match (target.structural_kind(), target.element) {
            (SchemaKind::Set, Some(element)) => element,
            (kind, _) => {
                let diag = Diagnostic::error(ErrorCode::E2008)
                    .with_message(format!(
                        "set pattern cannot match `{}`, a {kind}",
                        self.type_name(schema)
                    ))
                    .with_label(span, "set pattern here");
                self.error(diag);
                return CheckedNode::Wildcard;
            }
        };

        let domain = self.ordinal_domain(element);
        let mut checked = Vec::with_capacity(members.len());
        for lit in members {
            match self.literal_node(*lit, element) {
                Ok(node) => {
                    let ordinal = domain.and_then(|_| ordinal_of(&node));
                    let literal = match node {
                        CheckedNode::Literal(resolved) => resolved,
                        _ => *lit,
                    };
                    checked.push(SetMember { literal, ordinal });
                }
                Err(diag) => {
                    let diag = diag.with_label(span, format!("members are `{}`", self.type_name(element)));
                    self.error(diag);
                }
            }
        }

        CheckedNode::Set(SetPattern {
            members: checked,
            exact,
            domain,
        })
    }

    /// Domain size of an ordinal element type (enumerations, `bool`).
    fn ordinal_domain(&self, element: SchemaId) -> Option<u32> {
        let schema = self.schema(element);
        match schema.structural_kind() {
            SchemaKind::Enumeration => {
                let mut max = 0u32;
                for member in &schema.members {
                    let ordinal = u32::try_from(member.ordinal).ok()?;
                    max = max.max(ordinal.checked_add(1)?);
                }
                Some(max)
            }
            SchemaKind::Primitive if schema.primitive == Some(PrimitiveKind::Bool) => Some(2),
            _ => None,
        }
    }
}

fn ordinal_of(node: &CheckedNode) -> Option<u32> {
    match node {
        CheckedNode::Member { ordinal, .. } => u32::try_from(*ordinal).ok(),
        CheckedNode::Literal(Literal::Bool(b)) => Some(u32::from(*b)),
        _ => None,
    }
}

//! Literal, nil and enumeration-member patterns.
//!
//! Numeric-family law: an unsuffixed integer matches every integer width
//! (and must fit it), an unsuffixed float every float width; a suffix pins
//! exactly one width.

use pmatch_diagnostic::{Diagnostic, ErrorCode};
use pmatch_ir::{Literal, Name, PrimitiveKind, Span};
use pmatch_schema::{SchemaId, SchemaKind};

use super::Validator;
use crate::{resolve_case, CaseResolution, CheckedNode};

impl Validator<'_> {
    pub(super) fn check_literal(&mut self, lit: Literal, schema: SchemaId, span: Span) -> CheckedNode {
        match self.literal_node(lit, schema) {
            Ok(node) => node,
            Err(diag) => {
                let diag = diag.with_label(span, format!("expected `{}`", self.type_name(schema)));
                self.error(diag);
                CheckedNode::Wildcard
            }
        }
    }

    /// Checked form of `lit` against `schema`. The error carries no label;
    /// the caller attaches one at the offending node.
    pub(super) fn literal_node(&self, lit: Literal, schema_id: SchemaId) -> Result<CheckedNode, Diagnostic> {
        let schema = self.schema(schema_id);
        match (schema.structural_kind(), lit) {
            (_, Literal::Nil) if schema.is_indirection() => Ok(CheckedNode::Nil),
            (SchemaKind::Optional, Literal::Nil) => Ok(CheckedNode::None),
            (SchemaKind::Opaque, Literal::Nil) => Ok(CheckedNode::Nil),
            (SchemaKind::Opaque, lit) => Ok(CheckedNode::Literal(lit)),
            (SchemaKind::Optional, lit) => Err(self
                .incompatible(lit, schema_id)
                .with_suggestion(format!("write `Some({})`", lit.display(self.interner)))),
            (SchemaKind::Primitive, lit) => match schema.primitive {
                Some(kind) => self.primitive_literal(lit, kind, schema_id),
                None => Err(self.incompatible(lit, schema_id)),
            },
            (SchemaKind::Enumeration, Literal::Symbol(name)) => self.member_node(name, schema_id),
            (_, lit) => Err(self.incompatible(lit, schema_id)),
        }
    }

    fn primitive_literal(&self, lit: Literal, kind: PrimitiveKind, schema: SchemaId) -> Result<CheckedNode, Diagnostic> {
        match lit {
            Literal::Int { value, suffix } => {
                let width = suffix.unwrap_or(kind);
                if suffix.is_some_and(PrimitiveKind::is_float) {
                    return self.float_literal(lit, suffix, kind, schema);
                }
                if suffix.is_some_and(|s| s != kind) || !kind.is_integer() {
                    return Err(self.incompatible(lit, schema));
                }
                match width.int_range() {
                    Some((lo, hi)) if value < lo || value > hi => Err(Diagnostic::error(ErrorCode::E2007)
                        .with_message(format!("`{}` does not fit in `{width}`", lit.display(self.interner)))
                        .with_note(format!("`{width}` holds {lo}..={hi}"))),
                    _ => Ok(CheckedNode::Literal(lit)),
                }
            }
            Literal::Float { suffix, .. } => self.float_literal(lit, suffix, kind, schema),
            Literal::Str(_) if kind == PrimitiveKind::Str => Ok(CheckedNode::Literal(lit)),
            Literal::Char(_) if kind == PrimitiveKind::Char => Ok(CheckedNode::Literal(lit)),
            Literal::Bool(_) if kind == PrimitiveKind::Bool => Ok(CheckedNode::Literal(lit)),
            // `true` / `false` written as bare identifiers.
            Literal::Symbol(name) if kind == PrimitiveKind::Bool => match self.text(name) {
                "true" => Ok(CheckedNode::Literal(Literal::Bool(true))),
                "false" => Ok(CheckedNode::Literal(Literal::Bool(false))),
                _ => Err(self.incompatible(lit, schema)),
            },
            _ => Err(self.incompatible(lit, schema)),
        }
    }

    fn float_literal(
        &self,
        lit: Literal,
        suffix: Option<PrimitiveKind>,
        kind: PrimitiveKind,
        schema: SchemaId,
    ) -> Result<CheckedNode, Diagnostic> {
        let pinned_elsewhere = suffix.is_some_and(|s| s != kind);
        if !kind.is_float() || pinned_elsewhere {
            return Err(self.incompatible(lit, schema));
        }
        Ok(CheckedNode::Literal(lit))
    }

    fn member_node(&self, name: Name, schema_id: SchemaId) -> Result<CheckedNode, Diagnostic> {
        let schema = self.schema(schema_id);
        if let Some(member) = schema.member(name) {
            return Ok(CheckedNode::Member {
                name: member.name,
                ordinal: member.ordinal,
            });
        }

        let names: Vec<Name> = schema.members.iter().map(|m| m.name).collect();
        let resolved = resolve_case(&names, self.text(name), self.options.branch_marker, self.interner);
        match resolved {
            CaseResolution::Exact(label) | CaseResolution::Marked(label) => {
                let ordinal = schema.member(label).map_or(0, |m| m.ordinal);
                Ok(CheckedNode::Member { name: label, ordinal })
            }
            CaseResolution::Ambiguous(labels) => Err(Diagnostic::error(ErrorCode::E2003)
                .with_message(format!(
                    "`{}` could name any of {} in `{}`",
                    self.text(name),
                    self.quoted_list(&labels),
                    self.type_name(schema_id)
                ))
                .with_suggestion("write the full member name")),
            CaseResolution::Unknown => Err(Diagnostic::error(ErrorCode::E2018)
                .with_message(format!(
                    "`{}` is not a member of `{}`",
                    self.text(name),
                    self.type_name(schema_id)
                ))
                .with_similar_names(self.similar(name, &names))),
        }
    }

    fn incompatible(&self, lit: Literal, schema: SchemaId) -> Diagnostic {
        let what = match (lit, lit.suffix()) {
            (Literal::Nil, _) => "`nil`".to_owned(),
            (_, Some(suffix)) => format!("`{suffix}` literal `{}`", lit.display(self.interner)),
            (_, None) => format!("{} `{}`", lit.category(), lit.display(self.interner)),
        };
        Diagnostic::error(ErrorCode::E2006).with_message(format!(
            "{what} cannot match a value of type `{}`",
            self.type_name(schema)
        ))
    }
}

//! Rejected arms: codes, labels, suggestions and terminal rendering.

use pmatch_ir::{Literal, PrimitiveKind, Span};
use pmatch_patterns::{Pattern, PatternKind};
use pmatch_schema::ContainerKind;
use pmatchc::{render_diagnostics, ColorMode, ErrorCode, Severity};
use pretty_assertions::assert_eq;

use crate::common::*;

fn codes(diags: &[pmatchc::Diagnostic]) -> Vec<ErrorCode> {
    diags.iter().map(|d| d.code).collect()
}

#[test]
fn misspelled_field_suggests_the_declared_one() {
    let mut h = Harness::new();
    let node = h.node();
    let arm = ctor(h.with(h.ctor("Node"), "nme", h.bind("n")));

    let errors = h.errors(node, &[arm]);
    assert_eq!(codes(&errors), vec![ErrorCode::E2001]);
    assert_eq!(errors[0].similar_names, vec!["name".to_owned()]);
    assert_eq!(errors[0].severity, Severity::Error);
}

#[test]
fn branch_fields_need_the_discriminator_pinned() {
    let mut h = Harness::new();
    let node = h.node();

    let unpinned = ctor(h.with(h.ctor("Node"), "intVal", h.bind("v")));
    let errors = h.errors(node, &[unpinned]);
    assert_eq!(codes(&errors), vec![ErrorCode::E2004]);
    assert!(
        errors[0].suggestions.iter().any(|s| s.contains("kind: nkIntLit")),
        "{:?}",
        errors[0].suggestions
    );

    let other_branch = ctor(h.with(h.with(h.ctor("Node"), "kind", h.sym("nkCall")), "name", h.bind("n")));
    assert_eq!(codes(&h.errors(node, &[other_branch])), vec![ErrorCode::E2005]);

    let pinned = ctor(h.with(h.with(h.ctor("Node"), "kind", h.sym("nkIdent")), "name", h.bind("n")));
    let case = ctor(h.with(h.case("Node", "IntLit"), "intVal", h.bind("v")));
    let compiled = h.compile(node, &[pinned, case, wildcard()]);
    assert_eq!(compiled.procedure.clauses.len(), 3);
}

#[test]
fn every_arm_is_checked_before_failing() {
    let mut h = Harness::new();
    let color = h.color();
    let arms = [
        Pattern::literal(Literal::Symbol(h.name("Redd")), sp(10)),
        h.sym("Green"),
        Pattern::literal(Literal::int(3), sp(30)),
    ];

    let errors = h.errors(color, &arms);
    assert_eq!(codes(&errors), vec![ErrorCode::E2018, ErrorCode::E2006]);
    assert_eq!(errors[0].similar_names, vec!["Red".to_owned()]);
    assert_eq!(errors[1].primary_span(), Some(sp(30)));
}

#[test]
fn alternatives_must_agree_on_bindings() {
    let mut h = Harness::new();
    let int_ty = h.prim("int", PrimitiveKind::I64);
    let seq = h.container("seq[int]", ContainerKind::Seq, &[int_ty]);
    let arm = Pattern::alt(
        vec![destructure(vec![item(h.bind("x"))]), destructure(vec![item(h.bind("y"))])],
        sp(0),
    );
    assert_eq!(codes(&h.errors(seq, &[arm, wildcard()])), vec![ErrorCode::E2013]);
}

#[test]
fn spreads_are_limited_to_one() {
    let mut h = Harness::new();
    let int_ty = h.prim("int", PrimitiveKind::I64);
    let seq = h.container("seq[int]", ContainerKind::Seq, &[int_ty]);
    let arm = destructure(vec![spread(None), item(int(1)), spread(None)]);
    assert_eq!(codes(&h.errors(seq, &[arm, wildcard()])), vec![ErrorCode::E2010]);
}

#[test]
fn every_bad_set_member_is_reported() {
    let mut h = Harness::new();
    let color = h.color();
    let colors = h.container("set[Color]", ContainerKind::Set, &[color]);
    let members = ["Red", "Purple", "Teal"].map(|m| Literal::Symbol(h.name(m))).to_vec();
    let arm = Pattern::new(PatternKind::Set { members, exact: false }, sp(2));

    let errors = h.errors(colors, &[arm]);
    assert_eq!(codes(&errors), vec![ErrorCode::E2018, ErrorCode::E2018]);
    assert!(errors[0].message.contains("`Purple`"), "{}", errors[0].message);
    assert!(errors[1].message.contains("`Teal`"), "{}", errors[1].message);
}

#[test]
fn rendered_with_source_excerpt() {
    let mut h = Harness::new();
    let node = h.node();
    let source = "case n\nof Node(nme: x): discard\n";
    let field = h.ctor("Node").with_field(h.name("nme"), Span::new(15, 18), h.bind("x"));
    let errors = h.errors(node, &[ctor(field)]);

    let text = render_diagnostics(&errors, Some(source), ColorMode::Never);
    assert!(text.starts_with("error[E2001]: "), "{text}");
    assert!(text.contains("has no field `nme`"), "{text}");
    assert!(text.contains("  --> 2:9\n"), "{text}");
    assert!(text.contains("of Node(nme: x): discard"), "{text}");
    assert!(text.contains("^^^ unknown field"), "{text}");
    assert!(text.ends_with("error: aborting due to previous error\n"), "{text}");
}

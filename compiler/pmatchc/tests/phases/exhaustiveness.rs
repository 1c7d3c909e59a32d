//! Coverage over closed schemas, as seen through `compile_match`.

use pmatch_ir::{Literal, PrimitiveKind};
use pmatch_patterns::Pattern;
use pmatch_schema::ContainerKind;
use pmatchc::ErrorCode;
use pretty_assertions::assert_eq;

use crate::common::*;

#[test]
fn missing_member_is_named_in_the_error() {
    let mut h = Harness::new();
    let color = h.color();
    let errors = h.errors(color, &[h.sym("Red"), h.sym("Green")]);

    assert_eq!(errors.len(), 1);
    assert_eq!(errors[0].code, ErrorCode::E3001);
    assert!(errors[0].message.contains("`Blue`"), "{}", errors[0].message);
    assert_eq!(errors[0].primary_span(), Some(stmt()));
}

#[test]
fn completing_the_enum_proves_the_match() {
    let mut h = Harness::new();
    let color = h.color();

    let compiled = h.compile(color, &[h.sym("Red"), h.sym("Green"), h.sym("Blue")]);
    assert!(compiled.procedure.exhaustive);
    assert!(!compiled.procedure.can_fail());

    let compiled = h.compile(color, &[h.sym("Red"), wildcard()]);
    assert!(compiled.procedure.has_catch_all());
}

#[test]
fn guarded_arm_leaves_its_member_uncovered() {
    let mut h = Harness::new();
    let color = h.color();
    let guarded = h.sym("Blue").guarded(guard(0, Vec::new()), sp(7));
    let errors = h.errors(color, &[h.sym("Red"), h.sym("Green"), guarded]);

    assert_eq!(errors[0].code, ErrorCode::E3001);
    assert!(errors[0].labels.iter().any(|l| !l.is_primary && l.span == sp(7)));
}

#[test]
fn union_reference_needs_nil_and_every_case() {
    let mut h = Harness::new();
    let node = h.node();
    let cases = ["Empty", "Ident", "IntLit", "Call"];

    let mut arms: Vec<Pattern> = cases.iter().map(|c| ctor(h.case("Node", c))).collect();
    let errors = h.errors(node, &arms);
    assert_eq!(errors[0].code, ErrorCode::E3001);
    assert!(errors[0].message.contains("`nil`"), "{}", errors[0].message);

    arms.push(lit(Literal::Nil));
    assert!(h.compile(node, &arms).procedure.exhaustive);
}

#[test]
fn discriminator_alternation_covers_several_cases() {
    let mut h = Harness::new();
    let node = h.node();
    let leaves = Pattern::alt(vec![h.sym("nkEmpty"), h.sym("nkIdent"), h.sym("nkIntLit")], sp(0));
    let arms = [
        lit(Literal::Nil),
        ctor(h.with(h.ctor("Node"), "kind", leaves)),
        ctor(h.with(h.ctor("Node"), "kind", h.sym("nkCall"))),
    ];
    assert!(h.compile(node, &arms).procedure.exhaustive);
}

#[test]
fn optional_needs_both_states() {
    let mut h = Harness::new();
    let int_ty = h.prim("int", PrimitiveKind::I64);
    let opt = h.container("Option[int]", ContainerKind::Optional, &[int_ty]);
    let some = ctor(h.ctor("Some").with_arg(h.bind("x")));

    let errors = h.errors(opt, &[some.clone()]);
    assert!(errors[0].message.contains("`None`"), "{}", errors[0].message);
    assert!(h.compile(opt, &[some, ctor(h.ctor("None"))]).procedure.exhaustive);
}

#[test]
fn unreachable_arm_is_a_warning() {
    let mut h = Harness::new();
    let color = h.color();
    let arms = [h.sym("Red"), Pattern::wildcard(sp(3)), h.sym("Green")];
    let compiled = h.compile(color, &arms);

    assert_eq!(compiled.warnings.len(), 1);
    assert_eq!(compiled.warnings[0].code, ErrorCode::E3002);
    assert!(!compiled.warnings[0].is_error());
}

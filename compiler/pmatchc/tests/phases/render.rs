//! Generated source for complete match statements.

use pmatch_ir::{Literal, PrimitiveKind};
use pmatch_patterns::{GuardId, Pattern};
use pmatch_schema::ContainerKind;
use pmatchc::MatchOptions;
use pretty_assertions::assert_eq;
use rustc_hash::FxHashMap;

use crate::common::*;

#[test]
fn exhaustive_enum_has_no_fallback() {
    let mut h = Harness::new();
    let color = h.color();
    let arms = [h.sym("Red"), Pattern::alt(vec![h.sym("Green"), h.sym("Blue")], sp(0))];
    let rendered = h.compile(color, &arms).procedure.render(h.session.interner());
    assert_eq!(
        rendered,
        "if value == Red:\n  arm(0)\nelif value == Green or value == Blue:\n  arm(1)\n"
    );
}

#[test]
fn union_cases_read_the_discriminator() {
    let mut h = Harness::new();
    let node = h.node();
    let arms = [
        lit(Literal::Nil),
        ctor(h.case("Node", "Call").with_arg(h.bind("f")).with_arg(wildcard())),
        wildcard(),
    ];
    let rendered = h.compile(node, &arms).procedure.render(h.session.interner());
    assert_eq!(
        rendered,
        "if value.isNil:\n  arm(0)\n\
         elif not value.isNil and value.kind == nkCall:\n  let f = value.callee\n  arm(1)\n\
         else:\n  arm(2)\n"
    );
}

#[test]
fn unproved_match_raises() {
    let mut h = Harness::with_options(MatchOptions::default().with_exhaustiveness(false));
    let int_ty = h.prim("int", PrimitiveKind::I64);
    let rendered = h.compile(int_ty, &[int(1), int(2)]).procedure.render(h.session.interner());
    assert_eq!(
        rendered,
        "if value == 1:\n  arm(0)\nelif value == 2:\n  arm(1)\nelse:\n  raise newException(NoMatchError, \"no match\")\n"
    );
}

#[test]
fn guard_text_comes_from_the_host() {
    let mut h = Harness::new();
    let int_ty = h.prim("int", PrimitiveKind::I64);
    let n = h.name("n");
    let arms = [h.bind("n").guarded(guard(3, vec![n]), sp(0)), wildcard()];
    let procedure = h.compile(int_ty, &arms).procedure;

    let mut texts = FxHashMap::default();
    texts.insert(GuardId::new(3), "n mod 2 == 0".to_owned());
    assert_eq!(
        procedure.render_with_guards(h.session.interner(), &texts),
        "if (block: let n = value; n mod 2 == 0):\n  let n = value\n  arm(0)\nelse:\n  arm(1)\n"
    );
}

#[test]
fn defaulted_slots_render_as_length_conditionals() {
    let mut h = Harness::new();
    let int_ty = h.prim("int", PrimitiveKind::I64);
    let seq = h.container("seq[int]", ContainerKind::Seq, &[int_ty]);
    let arm = destructure(vec![spread(Some(h.bind("rest"))), defaulted(h.bind("last"), Literal::int(0))]);
    let rendered = h.compile(seq, &[arm]).procedure.render(h.session.interner());

    assert!(rendered.contains("let last = (if value.len == 0: 0 else: value[^1])"), "{rendered}");
    assert!(rendered.contains("let rest = (if value.len == 0: "), "{rendered}");
    assert!(!rendered.contains("NoMatchError"), "{rendered}");
}

//! Compiled procedures executed against runtime values.

use pmatch_ir::{Literal, Name, PrimitiveKind};
use pmatch_patterns::{GuardId, Pattern, PatternKind};
use pmatch_schema::ContainerKind;
use pmatchc::{MatchFault, Value};
use pretty_assertions::assert_eq;

use crate::common::*;

#[test]
fn node_dispatch() {
    let mut h = Harness::new();
    let node = h.node();
    let arms = [
        lit(Literal::Nil),
        ctor(h.with(h.case("Node", "Ident"), "name", h.bind("id"))),
        ctor(h.with(h.case("Node", "IntLit"), "intVal", int(0))),
        ctor(h.with(h.case("Node", "IntLit"), "intVal", h.bind("v"))),
        ctor(h.case("Node", "Call").with_arg(h.bind("f")).with_arg(h.bind("args"))),
        wildcard(),
    ];
    let procedure = h.compile(node, &arms).procedure;
    assert!(!procedure.can_fail());

    let node_value = |h: &Harness, kind: &str, ordinal, fields: Vec<(&str, Value)>| {
        let mut all = vec![("line", Value::Int(1)), ("kind", h.enum_value(kind, ordinal))];
        all.extend(fields);
        h.object(&["NodeObj"], all)
    };
    let ident = node_value(&h, "nkIdent", 1, vec![("name", Value::Str(h.name("x")))]);
    let zero = node_value(&h, "nkIntLit", 2, vec![("intVal", Value::Int(0))]);
    let seven = node_value(&h, "nkIntLit", 2, vec![("intVal", Value::Int(7))]);
    let call = node_value(
        &h,
        "nkCall",
        3,
        vec![("callee", ident.clone()), ("sons", Value::Seq(vec![zero.clone()]))],
    );
    let empty = node_value(&h, "nkEmpty", 0, Vec::new());

    let run = |value: &Value| procedure.execute(value, &mut no_guards).map(|o| o.arm_index);
    assert_eq!(run(&Value::Nil), Ok(0));
    assert_eq!(run(&ident), Ok(1));
    assert_eq!(run(&zero), Ok(2));
    assert_eq!(run(&seven), Ok(3));
    assert_eq!(run(&call), Ok(4));
    assert_eq!(run(&empty), Ok(5));

    let outcome = procedure.execute(&call, &mut no_guards).unwrap();
    assert_eq!(outcome.binding(h.name("f")), Some(&ident));
    assert_eq!(outcome.binding(h.name("args")), Some(&Value::Seq(vec![zero])));
}

#[test]
fn derived_types_are_tested_at_runtime() {
    let mut h = Harness::new();
    let (shape, circle, square) = h.shapes();
    let arms = [
        ctor(h.with(h.ctor("Circle").with_target(circle), "radius", h.bind("r"))),
        Pattern::new(PatternKind::TypeTest(square), sp(0)),
        ctor(h.with(h.ctor("Shape"), "id", h.bind("id"))),
    ];
    let procedure = h.compile(shape, &arms).procedure;

    let circle_value = h.object(
        &["Circle", "Shape"],
        vec![("id", Value::Int(1)), ("radius", Value::Int(5))],
    );
    let square_value = h.object(&["Square", "Shape"], vec![("id", Value::Int(2)), ("side", Value::Int(3))]);
    let plain = h.object(&["Shape"], vec![("id", Value::Int(3))]);

    let outcome = procedure.execute(&circle_value, &mut no_guards).unwrap();
    assert_eq!(outcome.arm_index, 0);
    assert_eq!(outcome.binding(h.name("r")), Some(&Value::Int(5)));
    assert_eq!(procedure.execute(&square_value, &mut no_guards).unwrap().arm_index, 1);
    let outcome = procedure.execute(&plain, &mut no_guards).unwrap();
    assert_eq!((outcome.arm_index, outcome.bindings), (2, vec![(h.name("id"), Value::Int(3))]));
}

#[test]
fn guards_fall_through_to_later_arms() {
    let mut h = Harness::new();
    let int_ty = h.prim("int", PrimitiveKind::I64);
    let seq = h.container("seq[int]", ContainerKind::Seq, &[int_ty]);
    let (head, tail) = (h.name("head"), h.name("tail"));
    let arms = [
        destructure(vec![item(h.bind("head")), spread(Some(h.bind("tail")))])
            .guarded(guard(0, vec![head, tail]), sp(1)),
        destructure(vec![item(h.bind("head")), spread(None)]),
        destructure(Vec::new()),
    ];
    let procedure = h.compile(seq, &arms).procedure;

    // head > len(tail)
    let mut host = |_: GuardId, bindings: &[(Name, Value)]| match bindings {
        [(_, Value::Int(first)), (_, Value::Seq(rest))] => *first > i128::try_from(rest.len()).unwrap(),
        other => panic!("unexpected guard bindings {other:?}"),
    };
    let mut run = |values: &[i128]| procedure.execute(&ints(values), &mut host).map(|o| o.arm_index);
    assert_eq!(run(&[5, 1, 2]), Ok(0));
    assert_eq!(run(&[1, 1, 2]), Ok(1));
    assert_eq!(run(&[]), Ok(2));
}

#[test]
fn unproved_match_reports_no_match() {
    let mut h = Harness::with_options(pmatchc::MatchOptions::default().with_exhaustiveness(false));
    let color = h.color();
    let procedure = h.compile(color, &[h.sym("Red")]).procedure;

    let green = h.enum_value("Green", 1);
    assert_eq!(procedure.execute(&green, &mut no_guards), Err(MatchFault::NoMatch));
    assert!(matches!(
        procedure.execute(&Value::Int(1), &mut no_guards),
        Err(MatchFault::ShapeMismatch(_))
    ));
}

#[test]
fn tokens_by_keyword_set() {
    let mut h = Harness::new();
    let string = h.prim("string", PrimitiveKind::Str);
    let keywords = ["if", "elif", "else", "while", "for", "case", "of", "proc", "func", "iterator"];
    let arms = [
        Pattern::alt(keywords.iter().map(|k| h.str_lit(k)).collect(), sp(0)),
        h.str_lit(""),
        h.bind("ident"),
    ];
    let procedure = h.compile(string, &arms).procedure;

    let run = |s: &str| {
        procedure
            .execute(&Value::Str(h.name(s)), &mut no_guards)
            .map(|o| o.arm_index)
    };
    assert_eq!(run("while"), Ok(0));
    assert_eq!(run(""), Ok(1));
    assert_eq!(run("whilst"), Ok(2));
}

#[test]
fn guard_rejection_rebinds_from_the_next_alternative() {
    let mut h = Harness::new();
    let int_ty = h.prim("int", PrimitiveKind::I64);
    let name = h.name("(int, int)");
    let pair = h.session.table_mut().define(
        name,
        pmatch_schema::Shape::Tuple(vec![(None, int_ty.into()), (None, int_ty.into())]),
    );
    let x = h.name("x");
    let left = destructure(vec![item(h.bind("x")), item(wildcard())]).guarded(guard(0, vec![x]), sp(1));
    let right = destructure(vec![item(wildcard()), item(h.bind("x"))]);
    let procedure = h.compile(pair, &[Pattern::alt(vec![left, right], sp(0))]).procedure;

    let mut positive = |_: GuardId, bindings: &[(Name, Value)]| matches!(bindings, [(_, Value::Int(v))] if *v > 0);
    let pair_value = |a, b| Value::Tuple(vec![Value::Int(a), Value::Int(b)]);

    let outcome = procedure.execute(&pair_value(-1, 3), &mut positive).unwrap();
    assert_eq!(outcome.binding(x), Some(&Value::Int(3)));
    let outcome = procedure.execute(&pair_value(2, 3), &mut positive).unwrap();
    assert_eq!(outcome.binding(x), Some(&Value::Int(2)));
}

#[test]
fn required_slot_reads_the_only_element() {
    let mut h = Harness::new();
    let int_ty = h.prim("int", PrimitiveKind::I64);
    let seq = h.container("seq[int]", ContainerKind::Seq, &[int_ty]);
    let arm = destructure(vec![spread(None), item(h.bind("x")), defaulted(wildcard(), Literal::int(0))]);
    let procedure = h.compile(seq, &[arm]).procedure;

    let outcome = procedure.execute(&ints(&[7]), &mut no_guards).unwrap();
    assert_eq!(outcome.binding(h.name("x")), Some(&Value::Int(7)));
}

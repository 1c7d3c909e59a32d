//! Pipeline laws checked over generated patterns and values.

use pmatch_ir::{Literal, PrimitiveKind};
use pmatch_patterns::{Pattern, SeqElem};
use pmatch_schema::ContainerKind;
use pmatchc::{MatchFault, MatchOptions, Value};
use proptest::prelude::*;

use crate::common::*;

/// One generated sequence slot: `0` wildcard, `1` binding, `2` literal.
type SlotSpec = (u8, i128, Option<i128>);

fn slot(h: &Harness, index: usize, (kind, value, default): SlotSpec) -> SeqElem {
    let pattern = match kind {
        0 => wildcard(),
        1 => h.bind(&format!("x{index}")),
        _ => int(value),
    };
    match default {
        Some(d) => defaulted(pattern, Literal::int(d)),
        None => item(pattern),
    }
}

fn seq_pattern(h: &Harness, slots: &[SlotSpec], spread_at: Option<usize>, bind_rest: bool) -> Pattern {
    let mut elems: Vec<SeqElem> = slots.iter().enumerate().map(|(i, s)| slot(h, i, *s)).collect();
    if let Some(at) = spread_at {
        let binding = bind_rest.then(|| h.bind("rest"));
        elems.insert(at.min(elems.len()), spread(binding));
    }
    destructure(elems)
}

fn int_seq(h: &mut Harness) -> pmatch_schema::DescriptorId {
    let int_ty = h.prim("int", PrimitiveKind::I64);
    h.container("seq[int]", ContainerKind::Seq, &[int_ty])
}

proptest! {
    /// Whatever the validator accepts lowers into a procedure that runs on
    /// every well-typed value without a shape fault, and binds exactly the
    /// names the arm declares.
    #[test]
    fn accepted_sequence_patterns_execute_cleanly(
        slots in prop::collection::vec((0u8..3, -3i128..3, prop::option::of(-3i128..3)), 0..5),
        spread_at in prop::option::of(0usize..6),
        bind_rest in any::<bool>(),
        inputs in prop::collection::vec(prop::collection::vec(-3i128..3, 0..7), 1..6),
    ) {
        let mut h = Harness::with_options(MatchOptions::default().with_exhaustiveness(false));
        let seq = int_seq(&mut h);
        let pattern = seq_pattern(&h, &slots, spread_at, bind_rest);
        let Ok(compiled) = h.session.compile_match(seq, &[pattern], stmt()) else {
            return Ok(());
        };
        let expected_bindings = slots.iter().filter(|s| s.0 == 1).count()
            + usize::from(spread_at.is_some() && bind_rest);

        for input in &inputs {
            match compiled.procedure.execute(&ints(input), &mut no_guards) {
                Ok(outcome) => prop_assert_eq!(outcome.bindings.len(), expected_bindings),
                Err(MatchFault::NoMatch) => {}
                Err(fault) => prop_assert!(false, "{fault} on {input:?}"),
            }
        }
    }

    /// `[*rest, a = D1, b = D2]`: elements fill the rightmost slots first.
    #[test]
    fn rightmost_defaults(values in prop::collection::vec(-100i128..100, 0..6), d1 in -5i128..5, d2 in -5i128..5) {
        let mut h = Harness::new();
        let seq = int_seq(&mut h);
        let pattern = destructure(vec![
            spread(Some(h.bind("rest"))),
            defaulted(h.bind("a"), Literal::int(d1)),
            defaulted(h.bind("b"), Literal::int(d2)),
        ]);
        let procedure = h.compile(seq, &[pattern]).procedure;
        let outcome = procedure.execute(&ints(&values), &mut no_guards).unwrap();

        let n = values.len();
        let (rest, a, b) = match n {
            0 => (Vec::new(), d1, d2),
            1 => (Vec::new(), d1, values[0]),
            _ => (values[..n - 2].to_vec(), values[n - 2], values[n - 1]),
        };
        prop_assert_eq!(outcome.binding(h.name("rest")), Some(&ints(&rest)));
        prop_assert_eq!(outcome.binding(h.name("a")), Some(&Value::Int(a)));
        prop_assert_eq!(outcome.binding(h.name("b")), Some(&Value::Int(b)));
    }

    /// An unsuffixed integer literal matches every integer width it fits.
    #[test]
    fn unsuffixed_literals_fit_their_width(value in -300i128..300) {
        let mut h = Harness::with_options(MatchOptions::default().with_exhaustiveness(false));
        let byte = h.prim("uint8", PrimitiveKind::U8);
        let small = h.prim("int8", PrimitiveKind::I8);

        let byte_ok = h.session.compile_match(byte, &[int(value)], stmt()).is_ok();
        let small_ok = h.session.compile_match(small, &[int(value)], stmt()).is_ok();
        prop_assert_eq!(byte_ok, (0..=255).contains(&value));
        prop_assert_eq!(small_ok, (-128..=127).contains(&value));
    }

    /// A reference to a union is covered exactly when `nil` and every case
    /// are listed.
    #[test]
    fn union_coverage(mask in 0u8..32) {
        let mut h = Harness::new();
        let node = h.node();
        let cases = ["Empty", "Ident", "IntLit", "Call"];
        let mut arms: Vec<Pattern> = cases
            .iter()
            .enumerate()
            .filter(|(i, _)| mask & (1 << i) != 0)
            .map(|(_, c)| ctor(h.case("Node", c)))
            .collect();
        if mask & 0b1_0000 != 0 {
            arms.push(lit(Literal::Nil));
        }

        let result = h.session.compile_match(node, &arms, stmt());
        prop_assert_eq!(result.is_ok(), mask == 0b1_1111);
    }

    /// `(x, c) | (c, x)` binds `x` from whichever branch matched.
    #[test]
    fn alternation_binds_symmetrically(a in -3i128..3, b in -3i128..3, c in -3i128..3) {
        let mut h = Harness::new();
        let int_ty = h.prim("int", PrimitiveKind::I64);
        let name = h.name("(int, int)");
        let pair = h.session.table_mut().define(
            name,
            pmatch_schema::Shape::Tuple(vec![(None, int_ty.into()), (None, int_ty.into())]),
        );
        let left = destructure(vec![item(h.bind("x")), item(int(c))]);
        let right = destructure(vec![item(int(c)), item(h.bind("x"))]);
        let arms = [Pattern::alt(vec![left, right], sp(0)), wildcard()];
        let procedure = h.compile(pair, &arms).procedure;

        let value = Value::Tuple(vec![Value::Int(a), Value::Int(b)]);
        let outcome = procedure.execute(&value, &mut no_guards).unwrap();
        let expected = if b == c {
            Some(a)
        } else if a == c {
            Some(b)
        } else {
            None
        };
        match expected {
            Some(x) => {
                prop_assert_eq!(outcome.arm_index, 0);
                prop_assert_eq!(outcome.binding(h.name("x")), Some(&Value::Int(x)));
            }
            None => prop_assert_eq!(outcome.arm_index, 1),
        }
    }
}

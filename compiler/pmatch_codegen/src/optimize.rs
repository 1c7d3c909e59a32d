//! Post-lowering simplification.
//!
//! Flattens nested conjunctions and disjunctions, drops trivially true
//! conjuncts, and replaces long runs of equality tests on one operand with a
//! single set-membership test. Only adjacent tests are grouped, so the
//! evaluation order of what remains is unchanged. [`Test::Alt`] branches are
//! simplified in place but never merged or dropped.

use pmatch_ir::Literal;

use crate::{Access, LowerOptions, Test};

pub fn optimize(test: Test, options: &LowerOptions) -> Test {
    match test {
        Test::And(tests) => simplify_and(tests.into_iter().map(|t| optimize(t, options)).collect()),
        Test::Or(tests) => simplify_or(tests.into_iter().map(|t| optimize(t, options)).collect(), options),
        // Branch positions are observable through `Access::Choice`.
        Test::Alt { id, branches } => Test::Alt {
            id,
            branches: branches.into_iter().map(|t| optimize(t, options)).collect(),
        },
        other => other,
    }
}

fn simplify_and(tests: Vec<Test>) -> Test {
    let mut flat = Vec::with_capacity(tests.len());
    for test in tests {
        match test {
            Test::True => {}
            Test::False => return Test::False,
            Test::And(inner) => flat.extend(inner),
            other => flat.push(other),
        }
    }
    collapse(flat, Test::True, Test::And)
}

fn simplify_or(tests: Vec<Test>, options: &LowerOptions) -> Test {
    let mut flat = Vec::with_capacity(tests.len());
    for test in tests {
        match test {
            Test::True => return Test::True,
            Test::False => {}
            Test::Or(inner) => flat.extend(inner),
            other => flat.push(other),
        }
    }
    collapse(group_runs(flat, options), Test::False, Test::Or)
}

fn collapse(mut tests: Vec<Test>, empty: Test, wrap: fn(Vec<Test>) -> Test) -> Test {
    match tests.len() {
        0 => empty,
        1 => tests.pop().unwrap_or(empty),
        _ => wrap(tests),
    }
}

#[derive(Copy, Clone, Eq, PartialEq)]
enum RunKind {
    Literal,
    Tag,
}

fn run_key(test: &Test) -> Option<(&Access, RunKind)> {
    match test {
        Test::LitEq { access, .. } => Some((access, RunKind::Literal)),
        Test::TagIs { access, .. } => Some((access, RunKind::Tag)),
        _ => None,
    }
}

fn group_runs(tests: Vec<Test>, options: &LowerOptions) -> Vec<Test> {
    let mut out = Vec::with_capacity(tests.len());
    let mut run: Vec<Test> = Vec::new();
    for test in tests {
        let joins = match (run.first().and_then(run_key), run_key(&test)) {
            (Some(a), Some(b)) => a == b,
            _ => false,
        };
        if !joins {
            flush(&mut run, &mut out, options);
        }
        run.push(test);
    }
    flush(&mut run, &mut out, options);
    out
}

fn flush(run: &mut Vec<Test>, out: &mut Vec<Test>, options: &LowerOptions) {
    if run.len() <= options.literal_set_threshold {
        out.append(run);
        return;
    }
    let tests = std::mem::take(run);
    match grouped(tests, options) {
        Ok(test) => out.push(test),
        Err(tests) => out.extend(tests),
    }
}

/// One membership test for a run, or the run unchanged.
fn grouped(tests: Vec<Test>, options: &LowerOptions) -> Result<Test, Vec<Test>> {
    let Some((access, kind)) = tests.first().and_then(run_key) else {
        return Err(tests);
    };
    let access = access.clone();
    match kind {
        RunKind::Literal => {
            let mut literals: Vec<Literal> = Vec::with_capacity(tests.len());
            for test in &tests {
                if let Test::LitEq { literal, .. } = test {
                    if !literals.contains(literal) {
                        literals.push(*literal);
                    }
                }
            }
            let strings: Option<Vec<_>> = literals
                .iter()
                .map(|lit| match lit {
                    Literal::Str(name) => Some(*name),
                    _ => None,
                })
                .collect();
            match strings {
                Some(values) if values.len() > options.string_hash_threshold => Ok(Test::StrIn { access, values }),
                _ => Ok(Test::OneOf { access, literals }),
            }
        }
        RunKind::Tag => {
            let mut labels = Vec::with_capacity(tests.len());
            for test in &tests {
                if let Test::TagIs { label, ordinal, .. } = test {
                    if !labels.iter().any(|(_, o)| o == ordinal) {
                        labels.push((*label, *ordinal));
                    }
                }
            }
            Ok(Test::TagIn { access, labels })
        }
    }
}

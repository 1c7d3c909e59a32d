//! Lowering checked patterns to clauses.
//!
//! Each node becomes a conjunction over the access of the value it matches.
//! Names are bound to accesses, never to copies, so lowering a binding costs
//! nothing at runtime until the name is read.
//!
//! Guards are hoisted to the end of the clause so they run only after the
//! whole structure has matched. A guard inside an alternation stays with its
//! branch: hoisting it would make it apply to every branch.

mod seq;

use tracing::{debug, trace};

use pmatch_ir::{ensure_sufficient_stack, Name};
use pmatch_patterns::{CheckedNode, CheckedPattern, GuardId, Index, ObjectPattern, SetPattern, ValidatedArm};
use pmatch_schema::SchemaId;

use crate::{optimize, Access, Alternative, Clause, LowerOptions, MatchProcedure, Test};

/// Lower validated arms, in source order, into a match procedure.
///
/// `exhaustive` records whether coverage was proved; the procedure itself
/// does not check it.
#[tracing::instrument(level = "debug", skip_all, fields(arms = arms.len()))]
pub fn lower(arms: &[ValidatedArm], scrutinee: SchemaId, exhaustive: bool, options: &LowerOptions) -> MatchProcedure {
    let clauses: Vec<Clause> = arms
        .iter()
        .enumerate()
        .map(|(arm_index, arm)| ArmLowerer::new(options).lower(arm_index, arm))
        .collect();
    debug!(
        clauses = clauses.len(),
        size = clauses.iter().map(|c| c.test.size()).sum::<usize>(),
        exhaustive,
        "lowered match"
    );
    MatchProcedure {
        clauses,
        scrutinee,
        exhaustive,
    }
}

pub(crate) struct ArmLowerer<'a> {
    options: &'a LowerOptions,
    bindings: Vec<(Name, Access)>,
    /// Hoisted guards, in source order.
    guards: Vec<GuardId>,
    alt_depth: u32,
    /// Next [`Test::Alt`] id.
    alts: u32,
}

impl<'a> ArmLowerer<'a> {
    fn new(options: &'a LowerOptions) -> Self {
        ArmLowerer {
            options,
            bindings: Vec::new(),
            guards: Vec::new(),
            alt_depth: 0,
            alts: 0,
        }
    }

    fn lower(mut self, arm_index: usize, arm: &ValidatedArm) -> Clause {
        let structural = self.node(&arm.pattern, &Access::Scrutinee);
        let mut conjuncts = vec![structural];
        conjuncts.extend(self.guards.iter().copied().map(Test::Guard));
        let test = optimize(Test::And(conjuncts), self.options);
        trace!(arm_index, size = test.size(), bindings = self.bindings.len(), "lowered arm");
        Clause {
            arm_index,
            test,
            bindings: self.bindings,
        }
    }

    fn node(&mut self, pattern: &CheckedPattern, access: &Access) -> Test {
        ensure_sufficient_stack(|| self.node_inner(pattern, access))
    }

    fn node_inner(&mut self, pattern: &CheckedPattern, access: &Access) -> Test {
        match &pattern.node {
            CheckedNode::Wildcard => Test::True,
            CheckedNode::Bind { name, inner } => {
                self.bindings.push((*name, access.clone()));
                self.node(inner, access)
            }
            CheckedNode::Literal(literal) => Test::LitEq {
                access: access.clone(),
                literal: *literal,
            },
            CheckedNode::Member { name, ordinal } => Test::TagIs {
                access: access.clone(),
                label: *name,
                ordinal: *ordinal,
            },
            CheckedNode::Nil => Test::IsNil(access.clone()),
            CheckedNode::None => Test::OptIsNone(access.clone()),
            CheckedNode::Alt(branches) => self.alt(branches, access),
            CheckedNode::Guard { inner, guard } => {
                let test = self.node(inner, access);
                if self.alt_depth == 0 {
                    self.guards.push(*guard);
                    test
                } else {
                    Test::And(vec![test, Test::Guard(*guard)])
                }
            }
            CheckedNode::Object(object) => self.object(object, access),
            CheckedNode::Some(inner) => {
                let payload = self.node(inner, &access.clone().payload());
                Test::And(vec![Test::OptIsSome(access.clone()), payload])
            }
            CheckedNode::Tuple(items) => Test::And(
                items
                    .iter()
                    .map(|(position, item)| self.node(item, &access.clone().index(Index::FromStart(*position))))
                    .collect(),
            ),
            CheckedNode::Seq(seq) => self.seq(seq, access),
            CheckedNode::Map(entries) => {
                let mut tests = Vec::with_capacity(entries.len() * 2);
                for (key, value) in entries {
                    tests.push(Test::HasKey {
                        access: access.clone(),
                        key: *key,
                    });
                    tests.push(self.node(value, &access.clone().map_value(*key)));
                }
                Test::And(tests)
            }
            CheckedNode::Set(set) => self.set(set, access),
            CheckedNode::TypeIs { type_name, .. } => Test::TypeIs {
                access: access.clone(),
                type_name: *type_name,
            },
        }
    }

    /// Alternation. Every branch binds the same names; a name whose access
    /// differs between branches reads through an [`Access::Choice`] on the
    /// branch that matched.
    fn alt(&mut self, branches: &[CheckedPattern], access: &Access) -> Test {
        let start = self.bindings.len();
        self.alt_depth += 1;
        let mut tests = Vec::with_capacity(branches.len());
        let mut per_branch = Vec::with_capacity(branches.len());
        for branch in branches {
            tests.push(self.node(branch, access));
            per_branch.push(self.bindings.split_off(start));
        }
        self.alt_depth -= 1;

        let Some(first) = per_branch.first() else {
            return Test::False;
        };
        let mut id = None;
        for (name, first_access) in first {
            let accesses: Vec<(usize, &Access)> = per_branch
                .iter()
                .enumerate()
                .filter_map(|(i, bound)| bound.iter().find(|(n, _)| n == name).map(|(_, a)| (i, a)))
                .collect();
            if accesses.iter().all(|(_, a)| *a == first_access) {
                self.bindings.push((*name, first_access.clone()));
                continue;
            }
            let alt = *id.get_or_insert_with(|| {
                self.alts += 1;
                self.alts - 1
            });
            let choices = accesses
                .into_iter()
                .map(|(branch, a)| Alternative {
                    branch,
                    test: optimize(tests[branch].clone(), self.options),
                    bindings: per_branch[branch].clone(),
                    access: a.clone(),
                })
                .collect();
            self.bindings.push((*name, Access::Choice { alt, choices }));
        }
        match id {
            Some(id) => Test::Alt { id, branches: tests },
            None => Test::Or(tests),
        }
    }

    fn object(&mut self, object: &ObjectPattern, access: &Access) -> Test {
        let mut tests = Vec::with_capacity(object.fields.len() + 3);
        // A nil reference fails the runtime type test too.
        if let Some(type_name) = object.runtime_type {
            tests.push(Test::TypeIs {
                access: access.clone(),
                type_name,
            });
        }
        if object.nil_check {
            tests.push(Test::IsNotNil(access.clone()));
        }
        if let Some(pin) = &object.pin {
            let tag = access.clone().field(pin.discriminator);
            tests.push(match pin.labels.as_slice() {
                [only] => Test::TagIs {
                    access: tag,
                    label: only.label,
                    ordinal: only.ordinal,
                },
                labels => Test::TagIn {
                    access: tag,
                    labels: labels.iter().map(|l| (l.label, l.ordinal)).collect(),
                },
            });
        }
        for field in &object.fields {
            tests.push(self.node(&field.pattern, &access.clone().field(field.field)));
        }
        Test::And(tests)
    }

    fn set(&mut self, set: &SetPattern, access: &Access) -> Test {
        let ordinals: Option<Vec<u32>> = set.members.iter().map(|m| m.ordinal).collect();
        match (set.domain, ordinals) {
            (Some(domain), Some(ordinals)) if domain <= self.options.bitset_limit() => {
                let mask = ordinals
                    .into_iter()
                    .filter(|&o| o < LowerOptions::MAX_BITSET_DOMAIN)
                    .fold(0u128, |mask, o| mask | (1u128 << o));
                Test::SetMask {
                    access: access.clone(),
                    mask,
                    exact: set.exact,
                }
            }
            _ => Test::SetContains {
                access: access.clone(),
                members: set.members.iter().map(|m| m.literal).collect(),
                exact: set.exact,
            },
        }
    }
}

//! Direct execution of match procedures.
//!
//! Evaluates clauses in order against a [`Value`]. Accesses are resolved on
//! demand and borrow from the input wherever possible; only slices and
//! constants allocate. Bindings are materialized once, for the winning
//! clause, and for each guard that runs.

mod value;

use std::borrow::Cow;

use rustc_hash::FxHashMap;
use thiserror::Error;
use tracing::trace;

use pmatch_ir::Name;
use pmatch_patterns::{GuardId, Index};

use crate::{Access, Clause, MatchProcedure, Test};

pub use value::Value;

/// Evaluates host guards.
pub trait GuardHost {
    /// `bindings` holds every name the clause has bound so far.
    fn eval_guard(&mut self, guard: GuardId, bindings: &[(Name, Value)]) -> bool;
}

impl<F> GuardHost for F
where
    F: FnMut(GuardId, &[(Name, Value)]) -> bool,
{
    fn eval_guard(&mut self, guard: GuardId, bindings: &[(Name, Value)]) -> bool {
        self(guard, bindings)
    }
}

/// The selected arm and the values of its bindings.
#[derive(Clone, PartialEq, Debug)]
pub struct MatchOutcome {
    pub arm_index: usize,
    pub bindings: Vec<(Name, Value)>,
}

impl MatchOutcome {
    pub fn binding(&self, name: Name) -> Option<&Value> {
        self.bindings.iter().find(|(n, _)| *n == name).map(|(_, v)| v)
    }
}

#[derive(Clone, PartialEq, Eq, Debug, Error)]
pub enum MatchFault {
    /// No clause matched and the procedure has no catch-all.
    #[error("no match arm accepts the value")]
    NoMatch,

    /// The value does not have the shape the procedure was compiled for.
    #[error("value does not fit the match: {0}")]
    ShapeMismatch(String),
}

type EvalResult<T> = Result<T, MatchFault>;

impl MatchProcedure {
    /// Run the procedure: the first clause whose test holds wins.
    pub fn execute(&self, value: &Value, guards: &mut impl GuardHost) -> EvalResult<MatchOutcome> {
        for clause in &self.clauses {
            let mut eval = Eval {
                root: value,
                clause,
                guards: &mut *guards,
                chosen: FxHashMap::default(),
            };
            if eval.test(&clause.test)? {
                let bindings = eval.bindings()?;
                trace!(arm_index = clause.arm_index, "clause matched");
                return Ok(MatchOutcome {
                    arm_index: clause.arm_index,
                    bindings,
                });
            }
        }
        Err(MatchFault::NoMatch)
    }
}

struct Eval<'v, 'c, G: ?Sized> {
    root: &'v Value,
    clause: &'c Clause,
    guards: &'c mut G,
    /// Branch of each [`Test::Alt`] that matched, or is being tried.
    chosen: FxHashMap<u32, usize>,
}

fn mismatch<T>(message: impl Into<String>) -> EvalResult<T> {
    Err(MatchFault::ShapeMismatch(message.into()))
}

/// Apply a projection to a resolved value, borrowing when the base is
/// borrowed.
fn project<'v>(
    base: Cow<'v, Value>,
    f: impl FnOnce(&Value) -> EvalResult<&Value>,
) -> EvalResult<Cow<'v, Value>> {
    match base {
        Cow::Borrowed(value) => f(value).map(Cow::Borrowed),
        Cow::Owned(value) => f(&value).map(|v| Cow::Owned(v.clone())),
    }
}

fn element(items: &[Value], index: Index) -> Option<&Value> {
    match index {
        Index::FromStart(i) => items.get(usize::try_from(i).ok()?),
        Index::FromEnd(i) => items.get(items.len().checked_sub(usize::try_from(i).ok()?)?),
    }
}

fn positional(value: &Value) -> EvalResult<&[Value]> {
    match value {
        Value::Seq(items) | Value::Tuple(items) => Ok(items),
        other => mismatch(format!("expected a sequence, found {}", other.kind_name())),
    }
}

impl<'v, G: GuardHost + ?Sized> Eval<'v, '_, G> {
    fn bindings(&mut self) -> EvalResult<Vec<(Name, Value)>> {
        let clause = self.clause;
        let mut bindings = Vec::with_capacity(clause.bindings.len());
        for (name, access) in &clause.bindings {
            bindings.push((*name, self.resolve(access)?.into_owned()));
        }
        Ok(bindings)
    }

    /// Bindings visible to a guard: those resolvable at this point.
    fn guard_bindings(&mut self) -> Vec<(Name, Value)> {
        let clause = self.clause;
        clause
            .bindings
            .iter()
            .filter_map(|(name, access)| Some((*name, self.resolve(access).ok()?.into_owned())))
            .collect()
    }

    fn resolve(&mut self, access: &Access) -> EvalResult<Cow<'v, Value>> {
        match access {
            Access::Scrutinee => Ok(Cow::Borrowed(self.root)),
            Access::Field { base, field } => {
                let base = self.resolve(base)?;
                project(base, |value| match value {
                    Value::Object { .. } => value
                        .field(*field)
                        .map_or_else(|| mismatch("object lacks a matched field"), Ok),
                    other => mismatch(format!("field read on {}", other.kind_name())),
                })
            }
            Access::Index { base, index } => {
                let base = self.resolve(base)?;
                project(base, |value| {
                    element(positional(value)?, *index).map_or_else(|| mismatch("index out of bounds"), Ok)
                })
            }
            Access::Slice {
                base,
                start,
                end_from_end,
            } => {
                let base = self.resolve(base)?;
                let items = positional(&base)?;
                let start = usize::try_from(*start).unwrap_or(usize::MAX).min(items.len());
                let end = items
                    .len()
                    .saturating_sub(usize::try_from(*end_from_end).unwrap_or(usize::MAX))
                    .max(start);
                Ok(Cow::Owned(Value::Seq(items[start..end].to_vec())))
            }
            Access::Payload(base) => {
                let base = self.resolve(base)?;
                project(base, |value| match value {
                    Value::Opt(Some(payload)) => Ok(&**payload),
                    other => mismatch(format!("payload read on {}", other.kind_name())),
                })
            }
            Access::MapValue { base, key } => {
                let base = self.resolve(base)?;
                project(base, |value| match value {
                    Value::Map(entries) => entries
                        .iter()
                        .find(|(k, _)| k.matches_literal(key))
                        .map_or_else(|| mismatch("map lacks a matched key"), |(_, v)| Ok(v)),
                    other => mismatch(format!("key read on {}", other.kind_name())),
                })
            }
            Access::Const(literal) => Ok(Cow::Owned(Value::from(*literal))),
            Access::ByLength { base, cases, otherwise } => {
                let len = self.len(base)?;
                let chosen = cases
                    .iter()
                    .find(|(l, _)| usize::try_from(*l).is_ok_and(|l| l == len))
                    .map_or(&**otherwise, |(_, access)| access);
                self.resolve(chosen)
            }
            Access::Choice { alt, choices } => {
                let Some(&branch) = self.chosen.get(alt) else {
                    return mismatch("alternation not evaluated");
                };
                match choices.iter().find(|c| c.branch == branch) {
                    Some(choice) => self.resolve(&choice.access),
                    None => mismatch("no alternative binds the name"),
                }
            }
        }
    }

    fn len(&mut self, access: &Access) -> EvalResult<usize> {
        let value = self.resolve(access)?;
        value
            .len()
            .map_or_else(|| mismatch(format!("length of {}", value.kind_name())), Ok)
    }

    fn test(&mut self, test: &Test) -> EvalResult<bool> {
        Ok(match test {
            Test::True => true,
            Test::False => false,
            Test::And(tests) => {
                for t in tests {
                    if !self.test(t)? {
                        return Ok(false);
                    }
                }
                true
            }
            Test::Or(tests) => {
                for t in tests {
                    if self.test(t)? {
                        return Ok(true);
                    }
                }
                false
            }
            Test::Alt { id, branches } => {
                for (branch, t) in branches.iter().enumerate() {
                    // Guards inside the branch read its bindings.
                    self.chosen.insert(*id, branch);
                    if self.test(t)? {
                        return Ok(true);
                    }
                }
                self.chosen.remove(id);
                false
            }
            Test::LitEq { access, literal } => self.resolve(access)?.matches_literal(literal),
            Test::OneOf { access, literals } => {
                let value = self.resolve(access)?;
                literals.iter().any(|l| value.matches_literal(l))
            }
            Test::StrIn { access, values } => match &*self.resolve(access)? {
                Value::Str(s) => values.contains(s),
                _ => false,
            },
            Test::TagIs { access, ordinal, .. } => self.ordinal(access)? == *ordinal,
            Test::TagIn { access, labels } => {
                let ordinal = self.ordinal(access)?;
                labels.iter().any(|(_, o)| *o == ordinal)
            }
            Test::LenEq { access, len } => self.len(access)? == widen(*len),
            Test::LenGe { access, len } => self.len(access)? >= widen(*len),
            Test::LenRange { access, min, max } => (widen(*min)..=widen(*max)).contains(&self.len(access)?),
            Test::IsNil(access) => matches!(*self.resolve(access)?, Value::Nil),
            Test::IsNotNil(access) => !matches!(*self.resolve(access)?, Value::Nil),
            Test::TypeIs { access, type_name } => match &*self.resolve(access)? {
                Value::Object { type_chain, .. } => type_chain.contains(type_name),
                _ => false,
            },
            Test::OptIsSome(access) | Test::OptIsNone(access) => {
                let some = match &*self.resolve(access)? {
                    Value::Opt(opt) => opt.is_some(),
                    other => return mismatch(format!("presence test on {}", other.kind_name())),
                };
                some == matches!(test, Test::OptIsSome(_))
            }
            Test::HasKey { access, key } => match &*self.resolve(access)? {
                Value::Map(entries) => entries.iter().any(|(k, _)| k.matches_literal(key)),
                other => return mismatch(format!("key test on {}", other.kind_name())),
            },
            Test::SetContains { access, members, exact } => match &*self.resolve(access)? {
                Value::Set(items) => {
                    let all_present = members.iter().all(|m| items.iter().any(|i| i.matches_literal(m)));
                    all_present && (!exact || items.iter().all(|i| members.iter().any(|m| i.matches_literal(m))))
                }
                other => return mismatch(format!("membership test on {}", other.kind_name())),
            },
            Test::SetMask { access, mask, exact } => {
                let bits = self.set_bits(access)?;
                if *exact {
                    bits == *mask
                } else {
                    bits & mask == *mask
                }
            }
            Test::Guard(guard) => {
                let bindings = self.guard_bindings();
                self.guards.eval_guard(*guard, &bindings)
            }
        })
    }

    fn ordinal(&mut self, access: &Access) -> EvalResult<i64> {
        let value = self.resolve(access)?;
        value
            .ordinal()
            .map_or_else(|| mismatch(format!("tag test on {}", value.kind_name())), Ok)
    }

    fn set_bits(&mut self, access: &Access) -> EvalResult<u128> {
        let value = self.resolve(access)?;
        let Value::Set(items) = &*value else {
            return mismatch(format!("membership test on {}", value.kind_name()));
        };
        let mut bits = 0u128;
        for item in items {
            match item.ordinal().and_then(|o| u32::try_from(o).ok()).filter(|o| *o < 128) {
                Some(o) => bits |= 1u128 << o,
                None => return mismatch("set element outside the ordinal domain"),
            }
        }
        Ok(bits)
    }
}

fn widen(n: u32) -> usize {
    usize::try_from(n).unwrap_or(usize::MAX)
}

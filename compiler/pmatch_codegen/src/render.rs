//! Source rendering of match procedures.
//!
//! Produces an `if / elif / else` chain over a scrutinee named `value`.
//! Each branch introduces the clause's bindings with `let` and then runs
//! `arm(N)`. Guards are rendered in a block that repeats the bindings, since
//! they are evaluated before the branch body binds anything.

use std::fmt::{self, Write};

use rustc_hash::FxHashMap;

use pmatch_ir::{Literal, Name, StringInterner};
use pmatch_patterns::{GuardId, Index};

use crate::{Access, Clause, MatchProcedure, Test};

const INDENT: &str = "  ";

impl MatchProcedure {
    /// Render with placeholder guard text (`guard0`, `guard1`, ...).
    pub fn render(&self, interner: &StringInterner) -> String {
        self.render_with_guards(interner, &FxHashMap::default())
    }

    /// Render with the host's source text for each guard.
    pub fn render_with_guards(&self, interner: &StringInterner, guards: &FxHashMap<GuardId, String>) -> String {
        ProcedureDisplay {
            procedure: self,
            interner,
            guards,
        }
        .to_string()
    }
}

struct ProcedureDisplay<'a> {
    procedure: &'a MatchProcedure,
    interner: &'a StringInterner,
    guards: &'a FxHashMap<GuardId, String>,
}

impl fmt::Display for ProcedureDisplay<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut first = true;
        let mut closed = false;
        for clause in &self.procedure.clauses {
            if clause.is_catch_all() && !first {
                f.write_str("else:\n")?;
                closed = true;
            } else {
                f.write_str(if first { "if " } else { "elif " })?;
                self.test(f, &clause.test, &clause.bindings, false)?;
                f.write_str(":\n")?;
            }
            self.body(f, clause)?;
            first = false;
            if closed || clause.is_catch_all() {
                closed = true;
                break;
            }
        }
        if !closed && !self.procedure.exhaustive {
            if first {
                f.write_str("if true:\n")?;
            } else {
                f.write_str("else:\n")?;
            }
            writeln!(f, "{INDENT}raise newException(NoMatchError, \"no match\")")?;
        }
        Ok(())
    }
}

impl ProcedureDisplay<'_> {
    fn name(&self, name: Name) -> &'static str {
        self.interner.lookup(name)
    }

    fn body(&self, f: &mut fmt::Formatter<'_>, clause: &Clause) -> fmt::Result {
        for (name, access) in &clause.bindings {
            write!(f, "{INDENT}let {} = ", self.name(*name))?;
            self.access(f, access)?;
            f.write_char('\n')?;
        }
        writeln!(f, "{INDENT}arm({})", clause.arm_index)
    }

    fn literal(&self, f: &mut fmt::Formatter<'_>, literal: &Literal) -> fmt::Result {
        write!(f, "{}", literal.display(self.interner))
    }

    fn literals<'l>(
        &self,
        f: &mut fmt::Formatter<'_>,
        literals: impl IntoIterator<Item = &'l Literal>,
    ) -> fmt::Result {
        f.write_char('{')?;
        for (i, literal) in literals.into_iter().enumerate() {
            if i > 0 {
                f.write_str(", ")?;
            }
            self.literal(f, literal)?;
        }
        f.write_char('}')
    }

    fn access(&self, f: &mut fmt::Formatter<'_>, access: &Access) -> fmt::Result {
        match access {
            Access::Scrutinee => f.write_str("value"),
            Access::Field { base, field } => {
                self.access(f, base)?;
                write!(f, ".{}", self.name(*field))
            }
            Access::Index { base, index } => {
                self.access(f, base)?;
                match index {
                    Index::FromStart(i) => write!(f, "[{i}]"),
                    Index::FromEnd(i) => write!(f, "[^{i}]"),
                }
            }
            Access::Slice {
                base,
                start,
                end_from_end,
            } => {
                self.access(f, base)?;
                write!(f, "[{start} .. ^{}]", end_from_end + 1)
            }
            Access::Payload(base) => {
                self.access(f, base)?;
                f.write_str(".get")
            }
            Access::MapValue { base, key } => {
                self.access(f, base)?;
                f.write_char('[')?;
                self.literal(f, key)?;
                f.write_char(']')
            }
            Access::Const(literal) => self.literal(f, literal),
            Access::ByLength { base, cases, otherwise } => {
                f.write_char('(')?;
                for (i, (len, case)) in cases.iter().enumerate() {
                    f.write_str(if i == 0 { "if " } else { " elif " })?;
                    self.access(f, base)?;
                    write!(f, ".len == {len}: ")?;
                    self.access(f, case)?;
                }
                f.write_str(" else: ")?;
                self.access(f, otherwise)?;
                f.write_char(')')
            }
            Access::Choice { choices, .. } => {
                let Some((last, rest)) = choices.split_last() else {
                    return f.write_str("value");
                };
                if rest.is_empty() {
                    return self.access(f, &last.access);
                }
                f.write_char('(')?;
                for (i, choice) in rest.iter().enumerate() {
                    f.write_str(if i == 0 { "if " } else { " elif " })?;
                    self.test(f, &choice.test, &choice.bindings, false)?;
                    f.write_str(": ")?;
                    self.access(f, &choice.access)?;
                }
                f.write_str(" else: ")?;
                self.access(f, &last.access)?;
                f.write_char(')')
            }
        }
    }

    /// `bindings` are the names in scope for guards in `test`.
    fn test(&self, f: &mut fmt::Formatter<'_>, test: &Test, bindings: &[(Name, Access)], nested: bool) -> fmt::Result {
        match test {
            Test::True => f.write_str("true"),
            Test::False => f.write_str("false"),
            Test::And(tests) | Test::Or(tests) | Test::Alt { branches: tests, .. } => {
                let op = if matches!(test, Test::And(_)) { " and " } else { " or " };
                if nested {
                    f.write_char('(')?;
                }
                for (i, t) in tests.iter().enumerate() {
                    if i > 0 {
                        f.write_str(op)?;
                    }
                    self.test(f, t, bindings, true)?;
                }
                if nested {
                    f.write_char(')')?;
                }
                Ok(())
            }
            Test::LitEq { access, literal } => {
                self.access(f, access)?;
                f.write_str(" == ")?;
                self.literal(f, literal)
            }
            Test::OneOf { access, literals } => {
                self.access(f, access)?;
                f.write_str(" in ")?;
                self.literals(f, literals)
            }
            Test::StrIn { access, values } => {
                self.access(f, access)?;
                f.write_str(" in toHashSet([")?;
                for (i, value) in values.iter().enumerate() {
                    if i > 0 {
                        f.write_str(", ")?;
                    }
                    write!(f, "{:?}", self.name(*value))?;
                }
                f.write_str("])")
            }
            Test::TagIs { access, label, .. } => {
                self.access(f, access)?;
                write!(f, " == {}", self.name(*label))
            }
            Test::TagIn { access, labels } => {
                self.access(f, access)?;
                f.write_str(" in {")?;
                for (i, (label, _)) in labels.iter().enumerate() {
                    if i > 0 {
                        f.write_str(", ")?;
                    }
                    f.write_str(self.name(*label))?;
                }
                f.write_char('}')
            }
            Test::LenEq { access, len } => {
                self.access(f, access)?;
                write!(f, ".len == {len}")
            }
            Test::LenGe { access, len } => {
                self.access(f, access)?;
                write!(f, ".len >= {len}")
            }
            Test::LenRange { access, min, max } => {
                self.access(f, access)?;
                write!(f, ".len in {min} .. {max}")
            }
            Test::IsNil(access) => {
                self.access(f, access)?;
                f.write_str(".isNil")
            }
            Test::IsNotNil(access) => {
                f.write_str("not ")?;
                self.access(f, access)?;
                f.write_str(".isNil")
            }
            Test::TypeIs { access, type_name } => {
                self.access(f, access)?;
                write!(f, " of {}", self.name(*type_name))
            }
            Test::OptIsSome(access) => {
                self.access(f, access)?;
                f.write_str(".isSome")
            }
            Test::OptIsNone(access) => {
                self.access(f, access)?;
                f.write_str(".isNone")
            }
            Test::HasKey { access, key } => {
                self.access(f, access)?;
                f.write_str(".hasKey(")?;
                self.literal(f, key)?;
                f.write_char(')')
            }
            Test::SetContains { access, members, exact } => {
                if *exact {
                    self.access(f, access)?;
                    f.write_str(" == ")?;
                    self.literals(f, members)
                } else {
                    self.literals(f, members)?;
                    f.write_str(" <= ")?;
                    self.access(f, access)
                }
            }
            Test::SetMask { access, mask, exact } => {
                if *exact {
                    self.access(f, access)?;
                    write!(f, ".bits == {mask:#x}")
                } else {
                    f.write_char('(')?;
                    self.access(f, access)?;
                    write!(f, ".bits and {mask:#x}) == {mask:#x}")
                }
            }
            Test::Guard(id) => self.guard(f, *id, bindings),
        }
    }

    fn guard(&self, f: &mut fmt::Formatter<'_>, id: GuardId, bindings: &[(Name, Access)]) -> fmt::Result {
        let text = self.guards.get(&id);
        if bindings.is_empty() {
            return match text {
                Some(text) => f.write_str(text),
                None => write!(f, "guard{}", id.raw()),
            };
        }
        f.write_str("(block: ")?;
        for (name, access) in bindings {
            write!(f, "let {} = ", self.name(*name))?;
            self.access(f, access)?;
            f.write_str("; ")?;
        }
        match text {
            Some(text) => f.write_str(text)?,
            None => write!(f, "guard{}", id.raw())?,
        }
        f.write_char(')')
    }
}

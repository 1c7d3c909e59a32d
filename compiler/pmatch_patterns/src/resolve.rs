//! Implicit branch-name resolution for `Type.Case(...)` patterns.
//!
//! Labels of generated unions carry a prefix ending in the branch marker
//! (`nk` + `Ident` with marker `k`). A case name resolves to the label equal
//! to it, or else to the label it is a suffix of when the character right
//! before the suffix is the marker. `Active` therefore selects `markActive`
//! but not `markXActive`.

use pmatch_ir::{Name, StringInterner};

#[derive(Clone, Eq, PartialEq, Hash, Debug)]
pub enum CaseResolution {
    /// A label equal to the case name.
    Exact(Name),
    /// The single label ending in marker + case name.
    Marked(Name),
    /// Several labels end in marker + case name.
    Ambiguous(Vec<Name>),
    Unknown,
}

impl CaseResolution {
    pub fn label(&self) -> Option<Name> {
        match self {
            CaseResolution::Exact(label) | CaseResolution::Marked(label) => Some(*label),
            CaseResolution::Ambiguous(_) | CaseResolution::Unknown => None,
        }
    }
}

pub fn resolve_case(labels: &[Name], case: &str, marker: char, interner: &StringInterner) -> CaseResolution {
    if case.is_empty() {
        return CaseResolution::Unknown;
    }
    if let Some(&label) = labels.iter().find(|&&label| interner.lookup(label) == case) {
        return CaseResolution::Exact(label);
    }

    let marked: Vec<Name> = labels
        .iter()
        .copied()
        .filter(|&label| {
            let text = interner.lookup(label);
            text.len() > case.len()
                && text.ends_with(case)
                && text[..text.len() - case.len()].chars().next_back() == Some(marker)
        })
        .collect();

    match marked.as_slice() {
        [] => CaseResolution::Unknown,
        [only] => CaseResolution::Marked(*only),
        _ => CaseResolution::Ambiguous(marked),
    }
}

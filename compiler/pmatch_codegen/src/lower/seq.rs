//! Sequence destructures.
//!
//! The length test and every slot access come from the same
//! [`SeqLayout`](pmatch_patterns::SeqLayout) resolution. Lengths at or above
//! the saturated length share one resolution (slots after the spread read
//! from the end). Each shorter accepted length gets its own resolution, and
//! an access that differs between them becomes an [`Access::ByLength`].

use pmatch_patterns::{Resolution, SeqLayout, SeqPattern};

use super::ArmLowerer;
use crate::{Access, Test};

impl ArmLowerer<'_> {
    pub(super) fn seq(&mut self, seq: &SeqPattern, access: &Access) -> Test {
        let layout = &seq.layout;
        let (length, slots, spread) = match seq.fixed_len {
            Some(len) => {
                let Some(resolution) = layout.resolve(len) else {
                    return Test::False;
                };
                let slots: Vec<Access> = resolution.slots.iter().map(|&s| Access::slot(access, s)).collect();
                let spread = resolution.spread.map(|(start, end)| access.clone().slice(start, end));
                (None, slots, spread)
            }
            None => (length_test(layout, access), slot_accesses(layout, access), spread_access(layout, access)),
        };

        let mut tests = Vec::with_capacity(seq.items.len() + 2);
        tests.extend(length);
        for (item, slot) in seq.items.iter().zip(&slots) {
            tests.push(self.node(item, slot));
        }
        if let (Some(pattern), Some(slice)) = (&seq.spread, &spread) {
            tests.push(self.node(pattern, slice));
        }
        Test::And(tests)
    }
}

fn length_test(layout: &SeqLayout, access: &Access) -> Option<Test> {
    let min = layout.min_len();
    let access = access.clone();
    match layout.max_len() {
        None if min == 0 => None,
        None => Some(Test::LenGe { access, len: min }),
        Some(max) if max == min => Some(Test::LenEq { access, len: min }),
        Some(max) => Some(Test::LenRange { access, min, max }),
    }
}

/// Accepted lengths below the saturated length, with their resolutions.
fn short_resolutions(layout: &SeqLayout) -> Vec<(u32, Resolution)> {
    (layout.min_len()..layout.saturated_len())
        .filter_map(|len| layout.resolve(len).map(|r| (len, r)))
        .collect()
}

fn slot_accesses(layout: &SeqLayout, access: &Access) -> Vec<Access> {
    let saturated = layout.resolve_saturated();
    let short = short_resolutions(layout);
    saturated
        .slots
        .iter()
        .enumerate()
        .map(|(slot, &source)| {
            let otherwise = Access::slot(access, source);
            let cases: Vec<(u32, Access)> = short
                .iter()
                .filter_map(|(len, resolution)| {
                    let at_len = Access::slot(access, *resolution.slots.get(slot)?);
                    let same = otherwise.at_len(access, *len).is_some_and(|o| o == at_len);
                    (!same).then_some((*len, at_len))
                })
                .collect();
            by_length(access, cases, otherwise)
        })
        .collect()
}

fn spread_access(layout: &SeqLayout, access: &Access) -> Option<Access> {
    let (start, end) = layout.resolve_saturated().spread?;
    let otherwise = access.clone().slice(start, end);
    let cases: Vec<(u32, Access)> = short_resolutions(layout)
        .into_iter()
        .filter_map(|(len, resolution)| {
            let (s, e) = resolution.spread?;
            let at_len = access.clone().slice(s, e);
            (at_len != otherwise).then_some((len, at_len))
        })
        .collect();
    Some(by_length(access, cases, otherwise))
}

fn by_length(access: &Access, cases: Vec<(u32, Access)>, otherwise: Access) -> Access {
    if cases.is_empty() {
        return otherwise;
    }
    Access::ByLength {
        base: Box::new(access.clone()),
        cases,
        otherwise: Box::new(otherwise),
    }
}

//! Sequence position resolution.
//!
//! A destructure `[a, b = 1, *rest, c = 2]` has item slots (some with
//! defaults) and at most one spread. When the input is shorter than the
//! number of slots, rightmost priority decides which slots read elements:
//!
//! 1. Required slots (no default) always read an element.
//! 2. The `len - required` remaining elements go to defaulted slots from
//!    the rightmost inward; slots left over take their default.
//! 3. Whatever is still left goes to the spread.
//! 4. Element indices are then assigned left to right.
//!
//! [`SeqLayout::resolve`] is the only implementation of this rule. The code
//! generator derives both the length test and every element access from it.

use pmatch_ir::Literal;

/// Element index, from either end of the sequence.
#[derive(Copy, Clone, Eq, PartialEq, Hash, Debug)]
pub enum Index {
    FromStart(u32),
    /// `FromEnd(1)` is the last element.
    FromEnd(u32),
}

/// Where a slot's value comes from for a given input length.
#[derive(Copy, Clone, Eq, PartialEq, Hash, Debug)]
pub enum SlotSource {
    Element(Index),
    Default(Literal),
}

/// Slots and spread for one input length (or for every length at least
/// [`SeqLayout::saturated_len`], see [`SeqLayout::resolve_saturated`]).
#[derive(Clone, Eq, PartialEq, Hash, Debug)]
pub struct Resolution {
    pub slots: Vec<SlotSource>,
    /// Spread slice `[start, len - end_from_end)`.
    pub spread: Option<(u32, u32)>,
}

#[derive(Clone, Eq, PartialEq, Hash, Debug, Default)]
pub struct SeqLayout {
    defaults: Vec<Option<Literal>>,
    /// Number of slots before the spread.
    spread_at: Option<usize>,
}

impl SeqLayout {
    pub fn new(defaults: Vec<Option<Literal>>, spread_at: Option<usize>) -> Self {
        let spread_at = spread_at.map(|at| at.min(defaults.len()));
        SeqLayout { defaults, spread_at }
    }

    pub fn slot_count(&self) -> usize {
        self.defaults.len()
    }

    pub fn spread_at(&self) -> Option<usize> {
        self.spread_at
    }

    pub fn default_of(&self, slot: usize) -> Option<Literal> {
        self.defaults.get(slot).copied().flatten()
    }

    /// Slots without a default.
    pub fn required(&self) -> u32 {
        count(self.defaults.iter().filter(|d| d.is_none()).count())
    }

    pub fn defaulted(&self) -> u32 {
        count(self.defaults.iter().filter(|d| d.is_some()).count())
    }

    pub fn min_len(&self) -> u32 {
        self.required()
    }

    /// `None` when a spread makes the length unbounded.
    pub fn max_len(&self) -> Option<u32> {
        match self.spread_at {
            Some(_) => None,
            None => Some(self.required() + self.defaulted()),
        }
    }

    pub fn accepts(&self, len: u32) -> bool {
        len >= self.min_len() && self.max_len().map_or(true, |max| len <= max)
    }

    /// Smallest length at which every defaulted slot reads an element.
    pub fn saturated_len(&self) -> u32 {
        self.required() + self.defaulted()
    }

    /// Slot sources for an input of exactly `len` elements, or `None` when
    /// the layout cannot match that length.
    pub fn resolve(&self, len: u32) -> Option<Resolution> {
        if !self.accepts(len) {
            return None;
        }
        let mut extra = len - self.required();

        // Rightmost defaulted slots read elements first.
        let mut reads = vec![false; self.defaults.len()];
        for (slot, default) in self.defaults.iter().enumerate().rev() {
            if default.is_none() {
                reads[slot] = true;
            } else if extra > 0 {
                reads[slot] = true;
                extra -= 1;
            }
        }
        let spread_len = if self.spread_at.is_some() { extra } else { 0 };

        let mut slots = Vec::with_capacity(self.defaults.len());
        let mut next = 0u32;
        let mut spread = None;
        for (slot, default) in self.defaults.iter().enumerate() {
            if self.spread_at == Some(slot) {
                spread = Some((next, len - next - spread_len));
                next += spread_len;
            }
            match (reads[slot], default) {
                (true, _) | (false, None) => {
                    slots.push(SlotSource::Element(Index::FromStart(next)));
                    next += 1;
                }
                (false, Some(lit)) => slots.push(SlotSource::Default(*lit)),
            }
        }
        if self.spread_at == Some(self.defaults.len()) {
            spread = Some((next, len - next - spread_len));
        }
        Some(Resolution { slots, spread })
    }

    /// Slot sources valid for every length `>= saturated_len()`.
    ///
    /// Derived from `resolve(saturated_len())`: slots after the spread are
    /// re-expressed from the end so the spread can grow between them.
    pub fn resolve_saturated(&self) -> Resolution {
        let len = self.saturated_len();
        let Some(mut resolution) = self.resolve(len) else {
            return Resolution {
                slots: Vec::new(),
                spread: None,
            };
        };
        if let Some(spread_at) = self.spread_at {
            for source in resolution.slots.iter_mut().skip(spread_at) {
                if let SlotSource::Element(Index::FromStart(index)) = *source {
                    *source = SlotSource::Element(Index::FromEnd(len - index));
                }
            }
        }
        resolution
    }
}

fn count(n: usize) -> u32 {
    u32::try_from(n).unwrap_or(u32::MAX)
}

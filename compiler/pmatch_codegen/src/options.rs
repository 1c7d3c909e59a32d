/// Thresholds for the post-lowering optimizations.
#[derive(Copy, Clone, Eq, PartialEq, Hash, Debug)]
pub struct LowerOptions {
    /// Literal alternations longer than this become one value-set test.
    pub literal_set_threshold: usize,
    /// String alternations longer than this become a hash-membership test.
    pub string_hash_threshold: usize,
    /// Finite-set patterns over ordinal domains up to this size compile to
    /// bitmask tests. Capped at 128.
    pub bitset_domain_limit: u32,
}

impl LowerOptions {
    pub const MAX_BITSET_DOMAIN: u32 = 128;

    #[must_use]
    pub fn with_literal_set_threshold(mut self, threshold: usize) -> Self {
        self.literal_set_threshold = threshold;
        self
    }

    #[must_use]
    pub fn with_string_hash_threshold(mut self, threshold: usize) -> Self {
        self.string_hash_threshold = threshold;
        self
    }

    #[must_use]
    pub fn with_bitset_domain_limit(mut self, limit: u32) -> Self {
        self.bitset_domain_limit = limit.min(Self::MAX_BITSET_DOMAIN);
        self
    }

    pub(crate) fn bitset_limit(&self) -> u32 {
        self.bitset_domain_limit.min(Self::MAX_BITSET_DOMAIN)
    }
}

impl Default for LowerOptions {
    fn default() -> Self {
        LowerOptions {
            literal_set_threshold: 4,
            string_hash_threshold: 8,
            bitset_domain_limit: Self::MAX_BITSET_DOMAIN,
        }
    }
}

//! Construction-time configuration for a hopscotch table.
//!
//! The neighborhood size is a const generic on `HopscotchTable` itself (see
//! `crate::engine`), since it governs the on-disk layout of every bucket.
//! Everything else that's tunable without changing the type is collected here
//! as a small builder.

/// Default maximum load factor, matching `tsl::hopscotch_map`'s
/// `DEFAULT_MAX_LOAD_FACTOR`.
pub const DEFAULT_MAX_LOAD_FACTOR: f32 = 0.95;

/// Default neighborhood size when a caller doesn't pick one explicitly.
pub const DEFAULT_NEIGHBORHOOD_SIZE: usize = 30;

/// Largest neighborhood size the bitmap layout can address (62 presence bits
/// plus 2 reserved bits fit in a `u64`).
pub const MAX_NEIGHBORHOOD_SIZE: usize = 62;

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TableConfig {
    pub(crate) max_load_factor: f32,
    pub(crate) max_probes_for_empty_bucket: usize,
    pub(crate) growth_ratio: f32,
    pub(crate) store_hash: bool,
}

impl TableConfig {
    /// `max_probes_for_empty_bucket` defaults to `10 * neighborhood_size`,
    /// per `tsl::hopscotch_map::DEFAULT_MAX_PROBES_FOR_EMPTY_BUCKET`.
    pub fn new(neighborhood_size: usize) -> Self {
        Self {
            max_load_factor: DEFAULT_MAX_LOAD_FACTOR,
            max_probes_for_empty_bucket: 10 * neighborhood_size,
            growth_ratio: 2.0,
            store_hash: false,
        }
    }

    pub fn with_max_load_factor(mut self, factor: f32) -> Self {
        assert!(
            factor > 0.0 && factor <= 1.0,
            "max_load_factor must be in (0, 1]"
        );
        self.max_load_factor = factor;
        self
    }

    pub fn with_max_probes_for_empty_bucket(mut self, probes: usize) -> Self {
        assert!(probes >= 1, "max_probes_for_empty_bucket must be >= 1");
        self.max_probes_for_empty_bucket = probes;
        self
    }

    pub fn with_growth_ratio(mut self, ratio: f32) -> Self {
        assert!(ratio >= 1.1, "growth_ratio must be >= 1.1");
        self.growth_ratio = ratio;
        self
    }

    pub fn with_store_hash(mut self, store_hash: bool) -> Self {
        self.store_hash = store_hash;
        self
    }

    pub fn max_load_factor(&self) -> f32 {
        self.max_load_factor
    }

    pub fn max_probes_for_empty_bucket(&self) -> usize {
        self.max_probes_for_empty_bucket
    }

    pub fn growth_ratio(&self) -> f32 {
        self.growth_ratio
    }

    pub fn store_hash(&self) -> bool {
        self.store_hash
    }
}

impl Default for TableConfig {
    fn default() -> Self {
        Self::new(DEFAULT_NEIGHBORHOOD_SIZE)
    }
}

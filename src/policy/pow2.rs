use super::BucketPolicy;

/// `index = hash & (bucket_count - 1)`, `bucket_count` always a power of two.
///
/// This is the default policy: masking is cheaper than a division, and a
/// power-of-two `growth_ratio` (the default, 2.0) keeps every rehash an exact
/// doubling.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PowerOfTwoPolicy {
    mask: usize,
}

impl PowerOfTwoPolicy {
    #[inline]
    fn from_bucket_count(bucket_count: usize) -> Self {
        debug_assert!(bucket_count.is_power_of_two());
        Self {
            mask: bucket_count - 1,
        }
    }
}

impl BucketPolicy for PowerOfTwoPolicy {
    #[inline]
    fn with_count_at_least(requested: usize) -> Self {
        let bucket_count = requested.max(1).next_power_of_two();
        Self::from_bucket_count(bucket_count)
    }

    #[inline]
    fn bucket_count(&self) -> usize {
        self.mask + 1
    }

    #[inline]
    fn index(&self, hash: u64) -> usize {
        (hash as usize) & self.mask
    }

    #[inline]
    fn next_bucket_count(&self, growth_ratio: f32) -> usize {
        let grown = ((self.bucket_count() as f32) * growth_ratio).ceil() as usize;
        grown.max(self.bucket_count() + 1).next_power_of_two()
    }

    #[inline]
    fn max_bucket_count() -> usize {
        // Largest power of two representable by usize.
        1usize << (usize::BITS - 1)
    }
}

use super::BucketPolicy;

/// A fixed, precomputed prime ladder used by most `std::unordered_map`
/// implementations (libstdc++, Boost.Unordered). Indexing by a prime rather
/// than a power of two spreads out hash functions with poor low-bit entropy,
/// at the cost of a division (`hash % p`) instead of a mask.
const PRIMES: &[u64] = &[
    2, 3, 5, 7, 11, 13, 17, 19, 23, 29, 37, 47, 59, 73, 97, 127, 151, 197, 251, 313, 397, 499,
    631, 797, 1009, 1259, 1597, 2011, 2539, 3203, 4027, 5087, 6421, 8089, 10193, 12853, 16193,
    20399, 25717, 32401, 40823, 51437, 64811, 81647, 102877, 129607, 163307, 205759, 259229,
    326617, 411527, 518509, 653267, 823117, 1037059, 1306601, 1646237, 2074129, 2613229, 3292489,
    4148279, 5226491, 6584983, 8296553, 10453007, 13169977, 16593127, 20906033, 26339969,
    33186281, 41812097, 52679969, 66372617, 83624237, 105359939, 132745199, 167248483,
    210719881, 265490441, 334496971, 421439783, 530980861, 668993977, 842879579, 1061961721,
    1337987929, 1685759167, 2123923447,
];

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PrimePolicy {
    prime: u64,
}

impl PrimePolicy {
    fn smallest_prime_at_least(requested: usize) -> u64 {
        let requested = requested.max(1) as u64;
        match PRIMES.iter().find(|&&p| p >= requested) {
            Some(&p) => p,
            // Past the precomputed ladder: fall back to trial division so the
            // policy degrades gracefully instead of hitting a hard ceiling.
            None => next_prime(*PRIMES.last().unwrap_or(&2) * 2),
        }
    }
}

fn is_prime(n: u64) -> bool {
    if n < 2 {
        return false;
    }
    if n % 2 == 0 {
        return n == 2;
    }
    let mut d = 3u64;
    while d.saturating_mul(d) <= n {
        if n % d == 0 {
            return false;
        }
        d += 2;
    }
    true
}

fn next_prime(mut n: u64) -> u64 {
    if n <= 2 {
        return 2;
    }
    n |= 1;
    while !is_prime(n) {
        n += 2;
    }
    n
}

impl BucketPolicy for PrimePolicy {
    #[inline]
    fn with_count_at_least(requested: usize) -> Self {
        Self {
            prime: Self::smallest_prime_at_least(requested),
        }
    }

    #[inline]
    fn bucket_count(&self) -> usize {
        self.prime as usize
    }

    #[inline]
    fn index(&self, hash: u64) -> usize {
        (hash % self.prime) as usize
    }

    #[inline]
    fn next_bucket_count(&self, growth_ratio: f32) -> usize {
        let grown = ((self.prime as f32) * growth_ratio).ceil() as u64;
        Self::smallest_prime_at_least((grown.max(self.prime + 1)) as usize) as usize
    }

    #[inline]
    fn max_bucket_count() -> usize {
        usize::MAX
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn picks_prime_from_ladder() {
        let p = PrimePolicy::with_count_at_least(100);
        assert_eq!(p.bucket_count(), 127);
    }

    #[test]
    fn index_is_modulo() {
        let p = PrimePolicy::with_count_at_least(10);
        assert_eq!(p.index(23), 23 % p.bucket_count() as u64);
    }

    #[test]
    fn falls_back_past_ladder() {
        let huge = *PRIMES.last().unwrap() as usize * 3;
        let p = PrimePolicy::with_count_at_least(huge);
        assert!(p.bucket_count() >= huge);
        assert!(is_prime(p.bucket_count() as u64));
    }
}

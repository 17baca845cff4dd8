use thiserror::Error;

/// Errors surfaced by a hopscotch table's fallible operations.
///
/// Ordinary `insert`/`find`/`erase` calls never fail outright (they panic only on
/// allocation failure, same as the rest of `std`); these variants are for the
/// explicit checked entry points (`try_insert`, `at`, `reserve`, ...).
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum HopscotchError {
    /// `at`/`at_mut` was called with a key that isn't present.
    #[error("key not found")]
    KeyNotFound,
    /// Growing the table would require more buckets than the growth policy
    /// can address (see `BucketPolicy::max_bucket_count`).
    #[error("capacity exceeded: requested {requested}, max supported is {max}")]
    CapacityExceeded { requested: usize, max: usize },
    /// The global allocator reported an allocation failure while growing the
    /// bucket array.
    #[error("allocation failure for {requested_bytes} bytes")]
    AllocError { requested_bytes: usize },
}

pub type Result<T> = std::result::Result<T, HopscotchError>;

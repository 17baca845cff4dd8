//! Bucket slot and bucket array.
//!
//! A slot owns at most one entry, constructed in place only once it's
//! claimed, and is never dropped while empty. Each bucket carries its own
//! neighborhood bitmap rather than a separate control-byte array, since slot
//! state and presence bitmap are always read together here.
//!
//! The neighborhood bitmap is always stored as a `u64` regardless of the
//! configured neighborhood size `N` (`N <= 62`), trading away a memory-density
//! optimization (picking the narrowest width that still fits `N + 2` bits) for
//! a single monomorphic slot type instead of a four-way tagged union. See
//! `DESIGN.md`.

use std::mem::MaybeUninit;

/// A single cell in the bucket array.
///
/// `occupied` and `neighborhood` are meaningful for every slot. `overflow` is
/// only meaningful when this slot is a *home* bucket (index `< home_count`);
/// trailing slots that exist solely to give the last home buckets room for
/// their neighborhood never have entries homed on them.
pub(crate) struct Slot<E> {
    value: MaybeUninit<E>,
    occupied: bool,
    overflow: bool,
    neighborhood: u64,
}

impl<E> Slot<E> {
    #[inline]
    fn empty() -> Self {
        Self {
            value: MaybeUninit::uninit(),
            occupied: false,
            overflow: false,
            neighborhood: 0,
        }
    }

    #[inline]
    pub(crate) fn is_empty(&self) -> bool {
        !self.occupied
    }

    #[inline]
    pub(crate) fn has_overflow(&self) -> bool {
        self.overflow
    }

    #[inline]
    pub(crate) fn set_overflow(&mut self, has: bool) {
        self.overflow = has;
    }

    #[inline]
    pub(crate) fn neighborhood_bit(&self, offset: usize) -> bool {
        self.neighborhood & (1u64 << offset) != 0
    }

    #[inline]
    pub(crate) fn toggle_neighborhood_bit(&mut self, offset: usize) {
        self.neighborhood ^= 1u64 << offset;
    }

    #[inline]
    pub(crate) fn neighborhood(&self) -> u64 {
        self.neighborhood
    }

    /// Requires `!self.occupied`.
    #[inline]
    unsafe fn emplace(&mut self, entry: E) {
        debug_assert!(!self.occupied);
        self.value.as_mut_ptr().write(entry);
        self.occupied = true;
    }

    /// Requires `self.occupied`.
    #[inline]
    unsafe fn take(&mut self) -> E {
        debug_assert!(self.occupied);
        self.occupied = false;
        self.value.as_ptr().read()
    }

    #[inline]
    unsafe fn get(&self) -> &E {
        debug_assert!(self.occupied);
        &*self.value.as_ptr()
    }

    #[inline]
    unsafe fn get_mut(&mut self) -> &mut E {
        debug_assert!(self.occupied);
        &mut *self.value.as_mut_ptr()
    }
}

impl<E> Drop for Slot<E> {
    #[inline]
    fn drop(&mut self) {
        if self.occupied {
            unsafe {
                self.value.as_mut_ptr().drop_in_place();
            }
        }
    }
}

/// The contiguous bucket array `B[0 .. L)`, `L = home_count + N - 1`.
///
/// Only `[0, home_count)` are valid home buckets; the trailing `N - 1` slots
/// exist only to be reached as neighbors of the last home buckets.
pub(crate) struct BucketArray<E, const N: usize> {
    slots: Vec<Slot<E>>,
    home_count: usize,
}

impl<E, const N: usize> BucketArray<E, N> {
    pub(crate) fn new(home_count: usize) -> Self {
        Self::try_new(home_count).expect("bucket array allocation failed")
    }

    /// Same as [`new`](Self::new) but reports allocation failure instead of
    /// aborting, so a rehash to an attacker- or caller-chosen size can
    /// surface `HopscotchError::AllocError` rather than crash the process.
    pub(crate) fn try_new(home_count: usize) -> std::result::Result<Self, std::collections::TryReserveError> {
        assert!(home_count >= 1, "home_count must be >= 1");
        let total = home_count + N - 1;
        let mut slots = Vec::new();
        slots.try_reserve_exact(total)?;
        slots.resize_with(total, Slot::empty);
        Ok(Self { slots, home_count })
    }

    #[inline]
    pub(crate) fn home_count(&self) -> usize {
        self.home_count
    }

    #[inline]
    pub(crate) fn total_len(&self) -> usize {
        self.slots.len()
    }

    #[inline]
    pub(crate) fn is_empty(&self, index: usize) -> bool {
        self.slots[index].is_empty()
    }

    #[inline]
    pub(crate) fn has_overflow(&self, home: usize) -> bool {
        self.slots[home].has_overflow()
    }

    #[inline]
    pub(crate) fn set_overflow(&mut self, home: usize, has: bool) {
        self.slots[home].set_overflow(has);
    }

    #[inline]
    pub(crate) fn neighborhood(&self, home: usize) -> u64 {
        self.slots[home].neighborhood()
    }

    #[inline]
    pub(crate) fn neighborhood_bit(&self, home: usize, offset: usize) -> bool {
        self.slots[home].neighborhood_bit(offset)
    }

    #[inline]
    pub(crate) fn set_neighborhood_bit(&mut self, home: usize, offset: usize) {
        debug_assert!(!self.slots[home].neighborhood_bit(offset));
        self.slots[home].toggle_neighborhood_bit(offset);
    }

    #[inline]
    pub(crate) fn clear_neighborhood_bit(&mut self, home: usize, offset: usize) {
        debug_assert!(self.slots[home].neighborhood_bit(offset));
        self.slots[home].toggle_neighborhood_bit(offset);
    }

    /// Requires slot `index` to be empty.
    #[inline]
    pub(crate) fn emplace(&mut self, index: usize, entry: E) {
        unsafe { self.slots[index].emplace(entry) }
    }

    /// Requires slot `index` to be occupied. Does not touch any neighborhood
    /// bitmap; callers own that bookkeeping.
    #[inline]
    pub(crate) fn take(&mut self, index: usize) -> E {
        unsafe { self.slots[index].take() }
    }

    #[inline]
    pub(crate) fn get(&self, index: usize) -> &E {
        unsafe { self.slots[index].get() }
    }

    #[inline]
    pub(crate) fn get_mut(&mut self, index: usize) -> &mut E {
        unsafe { self.slots[index].get_mut() }
    }

    /// Moves the occupied entry at `from` into the empty slot `at`, leaving
    /// `from` empty. Neighborhood bitmaps are the caller's responsibility.
    #[inline]
    pub(crate) fn move_slot(&mut self, from: usize, to: usize) {
        debug_assert_ne!(from, to);
        let entry = self.take(from);
        self.emplace(to, entry);
    }

    /// Iterates occupied slot indices in `[0, total_len())`, in order.
    pub(crate) fn occupied_indices(&self) -> impl Iterator<Item = usize> + '_ {
        (0..self.slots.len()).filter(move |&i| !self.slots[i].is_empty())
    }

    /// Finds an occupied slot that can be hopped into the empty slot at `e`:
    /// the lowest-offset entry of the lowest-indexed home `c` in
    /// `[e - N + 1, e)` whose neighborhood reaches some slot `s < e`.
    /// Returns `(c, s)`. Requires `e >= N`.
    pub(crate) fn find_hoppable(&self, e: usize) -> Option<(usize, usize)> {
        let w = e + 1 - N;
        for c in w..e {
            let bits = self.neighborhood(c);
            if bits == 0 {
                continue;
            }
            let i = bits.trailing_zeros() as usize;
            let s = c + i;
            if s < e {
                return Some((c, s));
            }
        }
        None
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn emplace_and_take_roundtrip() {
        let mut arr: BucketArray<(u64, u64), 4> = BucketArray::new(8);
        assert!(arr.is_empty(2));
        arr.emplace(2, (10, 20));
        assert!(!arr.is_empty(2));
        assert_eq!(*arr.get(2), (10, 20));
        let entry = arr.take(2);
        assert_eq!(entry, (10, 20));
        assert!(arr.is_empty(2));
    }

    #[test]
    fn total_len_accounts_for_trailing_neighbors() {
        let arr: BucketArray<u64, 6> = BucketArray::new(8);
        assert_eq!(arr.total_len(), 8 + 6 - 1);
        assert_eq!(arr.home_count(), 8);
    }

    #[test]
    fn neighborhood_bits_toggle() {
        let mut arr: BucketArray<u64, 4> = BucketArray::new(4);
        assert!(!arr.neighborhood_bit(0, 2));
        arr.set_neighborhood_bit(0, 2);
        assert!(arr.neighborhood_bit(0, 2));
        assert_eq!(arr.neighborhood(0), 0b100);
        arr.clear_neighborhood_bit(0, 2);
        assert!(!arr.neighborhood_bit(0, 2));
    }

    #[test]
    fn drop_only_runs_destructors_on_occupied_slots() {
        use std::cell::RefCell;
        use std::rc::Rc;

        let drops = Rc::new(RefCell::new(0));
        struct Counted(Rc<RefCell<i32>>);
        impl Drop for Counted {
            fn drop(&mut self) {
                *self.0.borrow_mut() += 1;
            }
        }

        {
            let mut arr: BucketArray<Counted, 4> = BucketArray::new(4);
            arr.emplace(0, Counted(drops.clone()));
            arr.emplace(1, Counted(drops.clone()));
            let _ = arr.take(1);
            assert_eq!(*drops.borrow(), 1);
        }
        assert_eq!(*drops.borrow(), 2);
    }
}

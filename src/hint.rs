// Branch prediction hints. `core::intrinsics::{likely, unlikely}` are
// nightly-only, so on stable these fall back to plain passthroughs.
cfg_if::cfg_if! {
    if #[cfg(feature = "nightly")] {
        pub use core::intrinsics::{likely, unlikely};
    } else {
        #[inline]
        pub fn likely(b: bool) -> bool {
            b
        }

        #[inline]
        pub fn unlikely(b: bool) -> bool {
            b
        }
    }
}

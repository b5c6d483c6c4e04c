//! Parallel-or-sequential iteration switch.
//!
//! Batch kriging calls `.into_par_iter()` on its query slice. With the
//! `parallel` feature that resolves to rayon; without it (WASM, embedded,
//! or simply a smaller build) the local trait below turns the same call into
//! a plain `into_iter()`, so `.map()` and `.collect()` fall through to
//! `std::iter::Iterator` and callers need no `cfg` of their own.
#[cfg(feature = "parallel")]
pub use rayon::prelude::*;

#[cfg(not(feature = "parallel"))]
pub use self::serial::IntoParallelIterator;

#[cfg(not(feature = "parallel"))]
mod serial {
    /// Drop-in for `rayon::iter::IntoParallelIterator` that stays on the
    /// calling thread.
    pub trait IntoParallelIterator: IntoIterator + Sized {
        fn into_par_iter(self) -> Self::IntoIter {
            self.into_iter()
        }
    }

    impl<I: IntoIterator> IntoParallelIterator for I {}
}

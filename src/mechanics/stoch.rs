//! Stochastic mechanics: uniform indices, shuffles and permutations.
//! Generic over `rand_core::RngCore` so callers inject the generator
//! (a seeded `bevy_prng::WyRand` in tests, an OS-seeded one otherwise).

use rand::Rng;
use rand::seq::SliceRandom;
use rand_core::RngCore;

/// Uniform index in `0..n`. `n` must be non-zero.
#[inline]
pub fn below<R: RngCore + ?Sized>(rng: &mut R, n: usize) -> usize {
    debug_assert!(n > 0, "below(0) has no valid outcome");
    rng.random_range(0..n)
}

/// In-place uniform shuffle.
#[inline]
pub fn shuffle<T, R: RngCore + ?Sized>(rng: &mut R, items: &mut [T]) {
    items.shuffle(rng);
}

/// Uniform random permutation of `0..n`.
#[inline]
pub fn permutation<R: RngCore + ?Sized>(rng: &mut R, n: usize) -> Vec<usize> {
    let mut order: Vec<usize> = (0..n).collect();
    shuffle(rng, &mut order);
    order
}

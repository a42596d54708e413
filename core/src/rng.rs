//! Deterministic random number generation for target selection.
//!
//! Nothing in the crate calls a platform RNG. Each play session draws from
//! its own stream, derived from the engine seed and the session's ordinal,
//! so a replay with the same seed spawns the same targets.

use rand::{RngCore, SeedableRng};
use rand_pcg::Pcg64Mcg;

pub struct SpawnRng {
    inner: Pcg64Mcg,
}

impl SpawnRng {
    pub fn new(seed: u64) -> Self {
        Self {
            inner: Pcg64Mcg::seed_from_u64(seed),
        }
    }

    /// Stream for the `ordinal`-th session started with `master_seed`.
    pub fn for_session(master_seed: u64, ordinal: u64) -> Self {
        Self::new(master_seed ^ ordinal.wrapping_mul(0x9e37_79b9_7f4a_7c15))
    }

    /// Roll a u64 in [0, n).
    pub fn next_u64_below(&mut self, n: u64) -> u64 {
        assert!(n > 0, "n must be > 0");
        self.inner.next_u64() % n
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn same_seed_same_stream() {
        let mut a = SpawnRng::for_session(42, 3);
        let mut b = SpawnRng::for_session(42, 3);
        for _ in 0..32 {
            assert_eq!(a.next_u64_below(4), b.next_u64_below(4));
        }
    }

    #[test]
    fn sessions_get_distinct_streams() {
        let mut a = SpawnRng::for_session(42, 1);
        let mut b = SpawnRng::for_session(42, 2);
        let rolls_a: Vec<u64> = (0..16).map(|_| a.next_u64_below(1000)).collect();
        let rolls_b: Vec<u64> = (0..16).map(|_| b.next_u64_below(1000)).collect();
        assert_ne!(rolls_a, rolls_b);
    }
}

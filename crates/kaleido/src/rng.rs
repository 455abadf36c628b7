//! Deterministic per-task random streams.
//!
//! A batch derives one `StdRng` per image from `(seed, index)`, so images can be
//! generated in any order or in parallel and still reproduce for a given seed.

use rand::rngs::StdRng;
use rand::SeedableRng;

/// Replay token to make draws reproducible and indexable.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct ReplayToken {
    pub seed: u64,
    pub index: u64,
}

impl ReplayToken {
    #[inline]
    pub fn new(seed: u64, index: u64) -> Self {
        Self { seed, index }
    }

    /// Independent stream for this `(seed, index)` pair.
    pub fn to_std_rng(self) -> StdRng {
        // SplitMix64-style mixing, cheap and stable.
        fn mix(mut x: u64) -> u64 {
            x ^= x >> 30;
            x = x.wrapping_mul(0xbf58476d1ce4e5b9);
            x ^= x >> 27;
            x = x.wrapping_mul(0x94d049bb133111eb);
            x ^ (x >> 31)
        }
        let k = mix(self.seed ^ mix(self.index.wrapping_add(0x9e3779b97f4a7c15)));
        StdRng::seed_from_u64(k)
    }
}

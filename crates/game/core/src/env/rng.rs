//! Deterministic roll generation.
//!
//! Every player owns a [`Pcg32`] whose seed is derived from the player id, so
//! a reloaded game replays the same roll sequence. The session-level RNG used
//! for random starting positions is the same type seeded from the game seed.

use serde::{Deserialize, Serialize};

use crate::state::PlayerId;

/// PCG-XSH-RR random number generator (32-bit output, 64-bit state).
///
/// Small, fast, and deterministic: the same seed always yields the same
/// sequence. The full generator state serializes with the player, so a
/// save/load round trip continues the sequence rather than restarting it.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Pcg32 {
    seed: u64,
    state: u64,
}

impl Pcg32 {
    const MULTIPLIER: u64 = 6364136223846793005;
    const INCREMENT: u64 = 1442695040888963407;

    pub fn new(seed: u64) -> Self {
        Self { seed, state: seed }
    }

    /// Derives a per-player generator deterministically from the player id.
    pub fn for_player(id: PlayerId) -> Self {
        Self::new(mix(0x7461_62756c61, id.0 as u64))
    }

    /// Derives a session generator from the game seed.
    pub fn for_session(game_seed: u64) -> Self {
        Self::new(mix(game_seed, 0x5e55_1015))
    }

    /// Replaces the seed and restarts the sequence.
    pub fn set_seed(&mut self, seed: u64) {
        self.seed = seed;
        self.state = seed;
    }

    /// Restarts the sequence from the current seed.
    pub fn reset_seed(&mut self) {
        self.state = self.seed;
    }

    pub fn next_u32(&mut self) -> u32 {
        self.state = self
            .state
            .wrapping_mul(Self::MULTIPLIER)
            .wrapping_add(Self::INCREMENT);
        let state = self.state;
        let xorshifted = (((state >> 18) ^ state) >> 27) as u32;
        let rot = (state >> 59) as u32;
        xorshifted.rotate_right(rot)
    }

    /// Uniform value in `[min, max]` inclusive. Degenerate ranges return `min`.
    pub fn roll(&mut self, min: u32, max: u32) -> u32 {
        if min >= max {
            return min;
        }
        let range = max - min + 1;
        min + self.next_u32() % range
    }

    /// Uniform index into a non-empty slice length.
    pub fn pick_index(&mut self, len: usize) -> usize {
        debug_assert!(len > 0);
        (self.next_u32() as usize) % len
    }
}

/// SplitMix-style seed mixer combining two entropy sources.
fn mix(a: u64, b: u64) -> u64 {
    let mut hash = a ^ b.wrapping_mul(0x9e3779b97f4a7c15);
    hash ^= hash >> 33;
    hash = hash.wrapping_mul(0xff51afd7ed558ccd);
    hash ^= hash >> 33;
    hash
}

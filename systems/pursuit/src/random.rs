//! Randomness used by the unstick fallback.

use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;

/// Source of uniform picks for the otherwise deterministic engine.
pub trait RandomSource {
    /// Returns an index in `0..len`. Callers never pass zero.
    fn pick(&mut self, len: usize) -> usize;
}

/// Reproducible generator seeded from a single integer.
#[derive(Clone, Debug)]
pub struct SeededRandom {
    rng: ChaCha8Rng,
}

impl SeededRandom {
    /// Creates a generator from the provided seed.
    #[must_use]
    pub fn from_seed(seed: u64) -> Self {
        Self {
            rng: ChaCha8Rng::seed_from_u64(seed),
        }
    }
}

impl RandomSource for SeededRandom {
    fn pick(&mut self, len: usize) -> usize {
        if len <= 1 {
            return 0;
        }
        self.rng.gen_range(0..len)
    }
}

/// Replays a fixed sequence of picks, wrapping when exhausted.
#[derive(Clone, Debug, Default)]
pub struct ScriptedRandom {
    script: Vec<usize>,
    draws: usize,
}

impl ScriptedRandom {
    /// Creates a source that answers with `script` in order.
    #[must_use]
    pub fn new(script: impl Into<Vec<usize>>) -> Self {
        Self {
            script: script.into(),
            draws: 0,
        }
    }

    /// Number of picks served so far.
    #[must_use]
    pub fn draws(&self) -> usize {
        self.draws
    }
}

impl RandomSource for ScriptedRandom {
    fn pick(&mut self, len: usize) -> usize {
        let value = if self.script.is_empty() {
            0
        } else {
            self.script[self.draws % self.script.len()]
        };
        self.draws += 1;
        value % len.max(1)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn seeded_picks_are_reproducible_and_in_range() {
        let mut first = SeededRandom::from_seed(11);
        let mut second = SeededRandom::from_seed(11);

        for len in 1..20 {
            let pick = first.pick(len);
            assert!(pick < len);
            assert_eq!(pick, second.pick(len));
        }
    }

    #[test]
    fn scripted_picks_wrap_and_clamp() {
        let mut random = ScriptedRandom::new(vec![1, 5]);

        assert_eq!(random.pick(3), 1);
        assert_eq!(random.pick(3), 2);
        assert_eq!(random.pick(3), 1);
        assert_eq!(random.draws(), 3);
    }
}

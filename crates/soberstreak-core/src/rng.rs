//! Random sources for score rewards and penalties.
//!
//! Score deltas are drawn from inclusive ranges. The draw goes through
//! [`ScoreRng`] so callers can swap the PCG generator for a scripted source.

use std::collections::VecDeque;
use std::ops::RangeInclusive;

use rand::prelude::*;
use rand_pcg::Mcg128Xsl64;

/// Source of integer rolls in an inclusive range.
pub trait ScoreRng {
    fn roll(&mut self, range: RangeInclusive<i32>) -> i32;
}

/// PCG-backed generator, seeded from entropy or a fixed seed.
#[derive(Debug, Clone)]
pub struct PcgScoreRng {
    rng: Mcg128Xsl64,
}

impl PcgScoreRng {
    pub fn new(seed: Option<u64>) -> Self {
        let rng = match seed {
            Some(seed) => Mcg128Xsl64::seed_from_u64(seed),
            None => Mcg128Xsl64::from_entropy(),
        };
        Self { rng }
    }
}

impl Default for PcgScoreRng {
    fn default() -> Self {
        Self::new(None)
    }
}

impl ScoreRng for PcgScoreRng {
    fn roll(&mut self, range: RangeInclusive<i32>) -> i32 {
        if range.is_empty() {
            return *range.start();
        }
        self.rng.gen_range(range)
    }
}

/// Replays a fixed list of values, clamped into the requested range.
///
/// When the script runs out it keeps returning the lower bound.
#[derive(Debug, Clone, Default)]
pub struct ScriptedRng {
    values: VecDeque<i32>,
    requested: Vec<RangeInclusive<i32>>,
}

impl ScriptedRng {
    pub fn new(values: impl IntoIterator<Item = i32>) -> Self {
        Self {
            values: values.into_iter().collect(),
            requested: Vec::new(),
        }
    }

    /// Ranges asked for so far, in call order.
    pub fn requested(&self) -> &[RangeInclusive<i32>] {
        &self.requested
    }
}

impl ScoreRng for ScriptedRng {
    fn roll(&mut self, range: RangeInclusive<i32>) -> i32 {
        let (lo, hi) = (*range.start(), *range.end());
        self.requested.push(range);
        match self.values.pop_front() {
            Some(v) => v.clamp(lo, hi.max(lo)),
            None => lo,
        }
    }
}

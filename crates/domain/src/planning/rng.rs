//! Seeded generators for planners.
//!
//! Planners never read ambient randomness. They draw from a [`PlanRng`]
//! handed in by the caller, so a `(snapshot, seed)` pair always produces
//! the same plan.

/// Source of uniform draws in `[0, 1)`.
pub trait PlanRng {
    fn next_f64(&mut self) -> f64;

    /// Uniform pick from `items`. Draws nothing when `items` is empty.
    fn pick<'a, T>(&mut self, items: &'a [T]) -> Option<&'a T>
    where
        Self: Sized,
    {
        if items.is_empty() {
            return None;
        }
        let index = (self.next_f64() * items.len() as f64).floor() as usize;
        items.get(index.min(items.len() - 1))
    }
}

const LCG_MULTIPLIER: i64 = 9301;
const LCG_INCREMENT: i64 = 49297;
const LCG_MODULUS: i64 = 233_280;

/// Seed used when a caller does not provide one.
pub const DEFAULT_SEED: i64 = 42;

/// Linear congruential generator: `state = (state * 9301 + 49297) mod 233280`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LcgRng {
    state: i64,
}

impl LcgRng {
    /// Negative seeds are normalised with a Euclidean remainder.
    pub fn new(seed: i64) -> Self {
        Self {
            state: seed.rem_euclid(LCG_MODULUS),
        }
    }
}

impl Default for LcgRng {
    fn default() -> Self {
        Self::new(DEFAULT_SEED)
    }
}

impl PlanRng for LcgRng {
    fn next_f64(&mut self) -> f64 {
        self.state = (self.state * LCG_MULTIPLIER + LCG_INCREMENT) % LCG_MODULUS;
        self.state as f64 / LCG_MODULUS as f64
    }
}

/// Replays a fixed list of draws, then repeats the last one.
#[cfg(test)]
#[derive(Debug, Clone)]
pub(crate) struct ScriptedRng {
    draws: Vec<f64>,
    cursor: usize,
}

#[cfg(test)]
impl ScriptedRng {
    pub(crate) fn new(draws: &[f64]) -> Self {
        Self {
            draws: draws.to_vec(),
            cursor: 0,
        }
    }

    pub(crate) fn consumed(&self) -> usize {
        self.cursor
    }
}

#[cfg(test)]
impl PlanRng for ScriptedRng {
    fn next_f64(&mut self) -> f64 {
        let value = self
            .draws
            .get(self.cursor)
            .or(self.draws.last())
            .copied()
            .unwrap_or(0.0);
        self.cursor += 1;
        value
    }
}

//! Injectable randomness for crafting rolls.

/// Source of uniform rolls in `[0, 1)`.
pub trait RandomSource {
    /// Next roll in `[0, 1)`.
    fn next_f64(&mut self) -> f64;

    /// Rolls against a probability.
    fn chance(&mut self, probability: f64) -> bool {
        probability > 0.0 && self.next_f64() < probability
    }
}

impl RandomSource for fastrand::Rng {
    fn next_f64(&mut self) -> f64 {
        self.f64()
    }
}

/// Creates a deterministic generator from a seed.
#[must_use]
pub fn seeded(seed: u64) -> fastrand::Rng {
    fastrand::Rng::with_seed(seed)
}

/// Replays a fixed list of rolls, then repeats the last one.
#[derive(Debug, Clone)]
pub struct ScriptedRolls {
    rolls: Vec<f64>,
    cursor: usize,
}

impl ScriptedRolls {
    /// Creates a script. An empty script always rolls 0.
    #[must_use]
    pub fn new(rolls: impl Into<Vec<f64>>) -> Self {
        Self {
            rolls: rolls.into(),
            cursor: 0,
        }
    }

    /// A script that always rolls the same value.
    #[must_use]
    pub fn constant(roll: f64) -> Self {
        Self::new(vec![roll])
    }

    /// Number of rolls drawn so far.
    #[must_use]
    pub const fn drawn(&self) -> usize {
        self.cursor
    }
}

impl RandomSource for ScriptedRolls {
    fn next_f64(&mut self) -> f64 {
        let roll = self
            .rolls
            .get(self.cursor)
            .or_else(|| self.rolls.last())
            .copied()
            .unwrap_or(0.0);
        self.cursor += 1;
        roll
    }
}

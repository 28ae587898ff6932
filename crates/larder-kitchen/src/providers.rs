//! Host-supplied rules consulted during cooking.
//!
//! This module provides:
//! - Burn chance curves
//! - Seasonings that raise output quality
//! - The extra portion bonus
//! - Hooks for statistics and experience

use ahash::AHashMap;
use larder_common::{ItemTypeId, Quality, RecipeId};
use serde::{Deserialize, Serialize};

use crate::random::RandomSource;
use crate::recipe::Recipe;

// ============================================================================
// Burn chance
// ============================================================================

/// Probability that one cooked unit burns.
pub trait BurnChance {
    /// Chance in `[0, 1)` for a recipe at the given skill and tool levels.
    fn burn_chance(&self, recipe: &Recipe, skill_level: u32, tool_level: u32) -> f64;
}

impl<F> BurnChance for F
where
    F: Fn(&Recipe, u32, u32) -> f64,
{
    fn burn_chance(&self, recipe: &Recipe, skill_level: u32, tool_level: u32) -> f64 {
        self(recipe, skill_level, tool_level)
    }
}

/// Linear burn curve: complex recipes burn more, skill and tools reduce it.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct BurnCurve {
    /// Chance before any adjustment
    pub base: f64,
    /// Added per recipe requirement
    pub per_ingredient: f64,
    /// Removed per skill level
    pub skill_reduction: f64,
    /// Removed per tool level
    pub tool_reduction: f64,
    /// Upper bound, below 1
    pub max: f64,
}

impl BurnCurve {
    /// A curve that never burns anything.
    pub const NEVER: Self = Self {
        base: 0.0,
        per_ingredient: 0.0,
        skill_reduction: 0.0,
        tool_reduction: 0.0,
        max: 0.0,
    };
}

impl Default for BurnCurve {
    fn default() -> Self {
        Self {
            base: 0.04,
            per_ingredient: 0.02,
            skill_reduction: 0.004,
            tool_reduction: 0.01,
            max: 0.3,
        }
    }
}

impl BurnChance for BurnCurve {
    fn burn_chance(&self, recipe: &Recipe, skill_level: u32, tool_level: u32) -> f64 {
        let raw = self.base + self.per_ingredient * recipe.complexity() as f64
            - self.skill_reduction * f64::from(skill_level)
            - self.tool_reduction * f64::from(tool_level);
        raw.clamp(0.0, self.max.max(0.0))
    }
}

// ============================================================================
// Seasoning
// ============================================================================

/// An item that lifts one craft's output to a higher quality tier.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Seasoning {
    /// Seasoning item
    pub item: ItemTypeId,
    /// Quality the seasoned output is raised to
    pub quality: Quality,
}

impl Seasoning {
    /// Creates a seasoning entry.
    #[must_use]
    pub const fn new(item: ItemTypeId, quality: Quality) -> Self {
        Self { item, quality }
    }
}

/// Supplies seasonings ranked by descending quality bonus.
pub trait SeasoningProvider {
    /// Seasonings, best first.
    fn ranked(&self) -> &[Seasoning];
}

impl SeasoningProvider for () {
    fn ranked(&self) -> &[Seasoning] {
        &[]
    }
}

/// Fixed list of seasonings.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SeasoningTable {
    ranked: Vec<Seasoning>,
}

impl SeasoningTable {
    /// Creates a table, ranking entries by descending quality. Entries that
    /// would not raise quality are dropped.
    #[must_use]
    pub fn new(mut seasonings: Vec<Seasoning>) -> Self {
        seasonings.retain(|s| s.quality > Quality::Normal);
        seasonings.sort_by(|a, b| b.quality.cmp(&a.quality));
        Self { ranked: seasonings }
    }

    /// Returns true if there are no seasonings.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.ranked.is_empty()
    }
}

impl SeasoningProvider for SeasoningTable {
    fn ranked(&self) -> &[Seasoning] {
        &self.ranked
    }
}

// ============================================================================
// Extra portion
// ============================================================================

/// Whether a craft yields a second portion for the same ingredients.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub enum ExtraPortion {
    /// No bonus
    #[default]
    Never,
    /// Every craft
    Always,
    /// Each craft rolls independently
    Chance(f64),
}

impl ExtraPortion {
    /// Builds the bonus from a configured probability.
    #[must_use]
    pub fn from_chance(chance: f64) -> Self {
        if chance <= 0.0 {
            Self::Never
        } else if chance >= 1.0 {
            Self::Always
        } else {
            Self::Chance(chance)
        }
    }

    /// Decides the bonus for one craft.
    pub fn roll(self, rng: &mut dyn RandomSource) -> bool {
        match self {
            Self::Never => false,
            Self::Always => true,
            Self::Chance(p) => rng.chance(p),
        }
    }
}

// ============================================================================
// Statistics hooks
// ============================================================================

/// Receives the result of each completed cook.
pub trait CookingHook {
    /// Called once per cook with the net cooked and burnt unit counts.
    fn on_cooked(&mut self, recipe: &Recipe, cooked: u32, burnt: u32);
}

impl CookingHook for () {
    fn on_cooked(&mut self, _recipe: &Recipe, _cooked: u32, _burnt: u32) {}
}

/// Per-recipe cooking statistics.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RecipeTally {
    /// Units successfully cooked
    pub cooked: u32,
    /// Units burnt
    pub burnt: u32,
}

/// Tallies cooking statistics and experience.
#[derive(Debug, Clone, Default)]
pub struct CookingTally {
    per_recipe: AHashMap<RecipeId, RecipeTally>,
    experience: u32,
    experience_per_unit: u32,
}

impl CookingTally {
    /// Creates a tally awarding `experience_per_unit` per cooked unit.
    #[must_use]
    pub fn new(experience_per_unit: u32) -> Self {
        Self {
            experience_per_unit,
            ..Self::default()
        }
    }

    /// Statistics for one recipe.
    #[must_use]
    pub fn recipe(&self, id: RecipeId) -> RecipeTally {
        self.per_recipe.get(&id).copied().unwrap_or_default()
    }

    /// Experience accumulated so far.
    #[must_use]
    pub const fn experience(&self) -> u32 {
        self.experience
    }
}

impl CookingHook for CookingTally {
    fn on_cooked(&mut self, recipe: &Recipe, cooked: u32, burnt: u32) {
        let tally = self.per_recipe.entry(recipe.id).or_default();
        tally.cooked = tally.cooked.saturating_add(cooked);
        tally.burnt = tally.burnt.saturating_add(burnt);
        self.experience = self
            .experience
            .saturating_add(cooked.saturating_mul(self.experience_per_unit));
    }
}

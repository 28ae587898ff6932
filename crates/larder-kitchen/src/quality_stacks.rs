//! Per-quality output tallies for one crafting call.

use std::collections::BTreeMap;

use larder_common::Quality;

/// Produced quantity per quality tier.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct QualityStacks {
    buckets: BTreeMap<Quality, u32>,
}

impl QualityStacks {
    /// Creates an empty tally.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Quantity in a tier.
    #[must_use]
    pub fn get(&self, quality: Quality) -> u32 {
        self.buckets.get(&quality).copied().unwrap_or(0)
    }

    /// Adds to a tier.
    pub fn add(&mut self, quality: Quality, amount: u32) {
        if amount > 0 {
            let bucket = self.buckets.entry(quality).or_insert(0);
            *bucket = bucket.saturating_add(amount);
        }
    }

    /// Removes up to `amount` from a tier, returning how much was removed.
    pub fn take(&mut self, quality: Quality, amount: u32) -> u32 {
        let Some(bucket) = self.buckets.get_mut(&quality) else {
            return 0;
        };
        let taken = amount.min(*bucket);
        *bucket -= taken;
        if *bucket == 0 {
            self.buckets.remove(&quality);
        }
        taken
    }

    /// Moves up to `amount` from one tier to another.
    pub fn transfer(&mut self, from: Quality, to: Quality, amount: u32) -> u32 {
        let moved = self.take(from, amount);
        self.add(to, moved);
        moved
    }

    /// Total across all tiers.
    #[must_use]
    pub fn total(&self) -> u32 {
        self.buckets
            .values()
            .fold(0u32, |total, &amount| total.saturating_add(amount))
    }

    /// Returns true if every tier is empty.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.buckets.is_empty()
    }

    /// Non-empty tiers in ascending quality order.
    pub fn iter(&self) -> impl Iterator<Item = (Quality, u32)> + '_ {
        self.buckets.iter().map(|(&quality, &amount)| (quality, amount))
    }
}

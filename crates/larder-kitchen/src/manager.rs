//! Cooking manager: staged ingredient slots and the crafting transaction.
//!
//! The manager owns the ingredient slots shown in the cooking menu. The UI
//! stages stacks into slots (by hand or through auto-fill), queries how often
//! the recipe can be cooked, then commits a cook. Each crafted unit re-plans
//! its consumption against the containers as the previous unit left them.

use larder_common::{ItemTypeId, Quality, RecipeId, StackHandle};
use serde::{Deserialize, Serialize};
use tracing::{debug, info, trace, warn};

use crate::container::{ContainerError, ItemContainer};
use crate::item::{ItemFactory, ItemStack};
use crate::matcher::{self, Consumption};
use crate::providers::{BurnChance, BurnCurve, CookingHook, ExtraPortion, SeasoningProvider};
use crate::quality_stacks::QualityStacks;
use crate::random::RandomSource;
use crate::recipe::{Recipe, Requirement};
use crate::slots::{Ingredient, SlotCapacity};

/// Index of the container that receives cooked food.
pub const PLAYER_INVENTORY: usize = 0;

/// Session state and host rules for one cooking call.
pub struct CookingContext<'a> {
    /// Cooking skill level
    pub skill_level: u32,
    /// Cooking tool upgrade level
    pub tool_level: u32,
    /// Burn chance provider
    pub burn: &'a dyn BurnChance,
    /// Seasoning provider
    pub seasoning: &'a dyn SeasoningProvider,
    /// Extra portion bonus
    pub extra_portion: ExtraPortion,
    /// Creates output stacks
    pub factory: &'a dyn ItemFactory,
    /// Consolation item for burnt units
    pub burnt_item: Option<ItemTypeId>,
    /// Random rolls
    pub rng: &'a mut dyn RandomSource,
}

impl<'a> CookingContext<'a> {
    /// Creates a context with no burning, no seasonings and no bonus.
    pub fn new(factory: &'a dyn ItemFactory, rng: &'a mut dyn RandomSource) -> Self {
        Self {
            skill_level: 0,
            tool_level: 0,
            burn: &BurnCurve::NEVER,
            seasoning: &(),
            extra_portion: ExtraPortion::Never,
            factory,
            burnt_item: None,
            rng,
        }
    }

    /// Sets skill and tool levels.
    #[must_use]
    pub fn with_levels(mut self, skill_level: u32, tool_level: u32) -> Self {
        self.skill_level = skill_level;
        self.tool_level = tool_level;
        self
    }

    /// Sets the burn chance provider.
    #[must_use]
    pub fn with_burn(mut self, burn: &'a dyn BurnChance) -> Self {
        self.burn = burn;
        self
    }

    /// Sets the seasoning provider.
    #[must_use]
    pub fn with_seasoning(mut self, seasoning: &'a dyn SeasoningProvider) -> Self {
        self.seasoning = seasoning;
        self
    }

    /// Sets the extra portion bonus.
    #[must_use]
    pub fn with_extra_portion(mut self, extra_portion: ExtraPortion) -> Self {
        self.extra_portion = extra_portion;
        self
    }

    /// Sets the consolation item for burnt units.
    #[must_use]
    pub fn with_burnt_item(mut self, item: ItemTypeId) -> Self {
        self.burnt_item = Some(item);
        self
    }
}

/// Result of [`CookingManager::craft_item_and_consume_ingredients`].
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CraftOutcome {
    /// Crafts whose ingredients were consumed
    pub crafted: u32,
    /// Units produced before burning, extra portions included
    pub produced: u32,
    /// Units lost to burning
    pub burnt: u32,
    /// Seasoning units consumed
    pub seasonings_used: u32,
    /// Surviving output, one stack per non-empty quality tier
    pub output: Vec<ItemStack>,
}

impl CraftOutcome {
    /// Units that survived burning.
    #[must_use]
    pub fn net(&self) -> u32 {
        self.produced - self.burnt
    }
}

/// Result of [`CookingManager::cook_recipe`].
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CookReport {
    /// Units cooked successfully (produced minus burnt)
    pub cooked: u32,
    /// Units burnt
    pub burnt: u32,
    /// Crafts whose ingredients were consumed
    pub crafted: u32,
    /// Seasoning units consumed
    pub seasonings_used: u32,
    /// Everything handed out, consolation items included
    pub delivered: Vec<ItemStack>,
    /// The part of `delivered` that did not fit and must be dropped
    pub dropped: Vec<ItemStack>,
}

/// Owns the staged ingredient slots and runs cooking transactions.
#[derive(Debug, Clone)]
pub struct CookingManager {
    slots: Vec<Option<Ingredient>>,
    usable: usize,
    active_recipe: Option<RecipeId>,
}

impl CookingManager {
    /// Opens a set of slots sized for the given tool level.
    #[must_use]
    pub fn new(capacity: &impl SlotCapacity, tool_level: u32) -> Self {
        let max = capacity.max_slots();
        Self {
            slots: vec![None; max],
            usable: capacity.usable_slots(tool_level).min(max),
            active_recipe: None,
        }
    }

    /// Re-derives usable slots after a tool upgrade. Slots that become
    /// locked are cleared.
    pub fn set_tool_level(&mut self, capacity: &impl SlotCapacity, tool_level: u32) {
        let max = capacity.max_slots();
        self.slots.resize(max, None);
        self.usable = capacity.usable_slots(tool_level).min(max);
        for slot in self.slots.iter_mut().skip(self.usable) {
            *slot = None;
        }
    }

    /// Slots displayed, locked ones included.
    #[must_use]
    pub fn max_slots(&self) -> usize {
        self.slots.len()
    }

    /// Slots that can hold an ingredient.
    #[must_use]
    pub const fn usable_slots(&self) -> usize {
        self.usable
    }

    /// All slots in display order.
    #[must_use]
    pub fn slots(&self) -> &[Option<Ingredient>] {
        &self.slots
    }

    /// Staged references in slot order.
    #[must_use]
    pub fn staged(&self) -> Vec<Ingredient> {
        self.slots.iter().flatten().copied().collect()
    }

    /// Number of occupied slots.
    #[must_use]
    pub fn staged_count(&self) -> usize {
        self.slots.iter().flatten().count()
    }

    /// First empty usable slot.
    #[must_use]
    pub fn first_empty_slot(&self) -> Option<usize> {
        self.slots[..self.usable].iter().position(Option::is_none)
    }

    /// Returns true if the stack at a container position is staged.
    pub fn is_inventory_item_in_current_ingredients<C: ItemContainer>(
        &self,
        containers: &[C],
        container: usize,
        position: usize,
    ) -> bool {
        containers
            .get(container)
            .and_then(|c| c.entry_at(position))
            .is_some_and(|(handle, _)| self.slot_of(container, handle).is_some())
    }

    /// Stages the stack at a container position into the first empty slot.
    ///
    /// Fails if the position is empty, the stack is already staged, or no
    /// usable slot is free.
    pub fn add_to_ingredients<C: ItemContainer>(
        &mut self,
        containers: &[C],
        container: usize,
        position: usize,
    ) -> bool {
        let Some((handle, stack)) = containers.get(container).and_then(|c| c.entry_at(position))
        else {
            return false;
        };
        if stack.is_empty() || self.slot_of(container, handle).is_some() {
            return false;
        }
        let Some(slot) = self.first_empty_slot() else {
            return false;
        };
        self.slots[slot] = Some(Ingredient::new(container, handle, stack.item));
        debug!(
            "Staged {} x{} from container {} into slot {}",
            stack.item, stack.quantity, container, slot
        );
        true
    }

    /// Clears a slot by index.
    pub fn remove_from_ingredients(&mut self, slot: usize) -> bool {
        match self.slots.get_mut(slot) {
            Some(entry) if entry.is_some() => {
                *entry = None;
                true
            }
            _ => false,
        }
    }

    /// Clears the slot holding the stack at a container position.
    pub fn remove_stack_from_ingredients<C: ItemContainer>(
        &mut self,
        containers: &[C],
        container: usize,
        position: usize,
    ) -> bool {
        let slot = containers
            .get(container)
            .and_then(|c| c.entry_at(position))
            .and_then(|(handle, _)| self.slot_of(container, handle));
        slot.is_some_and(|slot| self.remove_from_ingredients(slot))
    }

    /// Clears every slot.
    pub fn clear_ingredients(&mut self) {
        self.slots.iter_mut().for_each(|slot| *slot = None);
    }

    /// Clears slots whose stack no longer resolves. Returns how many.
    pub fn prune<C: ItemContainer>(&mut self, containers: &[C]) -> usize {
        let mut cleared = 0;
        for slot in &mut self.slots {
            if slot.is_some_and(|ingredient| ingredient.resolve(containers).is_none()) {
                *slot = None;
                cleared += 1;
            }
        }
        cleared
    }

    /// How many times the recipe can be cooked, from staged slots only or
    /// from everything in the containers.
    pub fn amount_craftable<C: ItemContainer>(
        &self,
        recipe: &Recipe,
        containers: &[C],
        staged_only: bool,
    ) -> u32 {
        if staged_only {
            let staged = self.staged();
            matcher::amount_craftable(recipe, containers, Some(&staged))
        } else {
            matcher::amount_craftable(recipe, containers, None)
        }
    }

    /// Fills the slots with ingredients for a recipe.
    ///
    /// Switching to a different recipe clears the slots. Nothing is staged
    /// unless the recipe is craftable at least once from all containers.
    /// Candidates are taken round-robin across requirements, largest stacks
    /// first, so a tight slot budget still covers every requirement.
    pub fn auto_fill_ingredients<C: ItemContainer>(
        &mut self,
        recipe: &Recipe,
        containers: &[C],
    ) -> bool {
        if self.active_recipe != Some(recipe.id) {
            self.clear_ingredients();
            self.active_recipe = Some(recipe.id);
        }
        if matcher::amount_craftable(recipe, containers, None) == 0 {
            debug!("Auto-fill skipped: '{}' is not craftable", recipe.name);
            return false;
        }
        self.clear_ingredients();

        let limit = u32::try_from(self.usable).unwrap_or(u32::MAX);
        let candidates: Vec<Vec<Ingredient>> = recipe
            .requirements
            .iter()
            .map(|req| {
                let scan =
                    matcher::matching_ingredients(&req.requirement, containers, req.quantity, limit);
                let mut found: Vec<(u32, Ingredient)> = scan
                    .stacks
                    .into_iter()
                    .filter_map(|r| {
                        let (handle, stack) = containers.get(r.container)?.entry_at(r.position)?;
                        Some((stack.quantity, Ingredient::new(r.container, handle, stack.item)))
                    })
                    .collect();
                found.sort_by(|a, b| b.0.cmp(&a.0));
                found.into_iter().map(|(_, ingredient)| ingredient).collect()
            })
            .collect();

        let rounds = candidates.iter().map(Vec::len).max().unwrap_or(0);
        'rounds: for round in 0..rounds {
            for list in &candidates {
                let Some(ingredient) = list.get(round) else {
                    continue;
                };
                if self.slot_of(ingredient.container, ingredient.handle).is_some() {
                    continue;
                }
                let Some(slot) = self.first_empty_slot() else {
                    break 'rounds;
                };
                self.slots[slot] = Some(*ingredient);
            }
        }

        debug!(
            "Auto-filled {} of {} slots for '{}'",
            self.staged_count(),
            self.usable,
            recipe.name
        );
        true
    }

    /// Crafts up to `quantity` units from the staged slots.
    ///
    /// Each unit plans its consumption against current container state and
    /// commits only a fully satisfiable plan. Production stops early when no
    /// plan remains. After crafting, seasonings raise output quality one
    /// craft's worth at a time, then every produced unit rolls to burn.
    pub fn craft_item_and_consume_ingredients<C: ItemContainer>(
        &mut self,
        recipe: &Recipe,
        containers: &mut [C],
        quantity: u32,
        ctx: &mut CookingContext<'_>,
    ) -> CraftOutcome {
        let mut buckets = QualityStacks::new();
        let mut crafted = 0;

        while crafted < quantity {
            let staged = self.staged();
            let Some(plan) = matcher::choose_ingredients_for_crafting(recipe, &staged, containers)
            else {
                debug!(
                    "Ran out of ingredients for '{}' after {} of {}",
                    recipe.name, crafted, quantity
                );
                break;
            };
            if let Err(err) = consume(containers, &plan) {
                warn!("Aborting '{}' mid-craft: {}", recipe.name, err);
                self.prune(containers);
                break;
            }
            self.prune(containers);

            buckets.add(Quality::Normal, recipe.output_quantity);
            if ctx.extra_portion.roll(&mut *ctx.rng) {
                trace!("Extra portion for '{}'", recipe.name);
                buckets.add(Quality::Normal, recipe.output_quantity);
            }
            crafted += 1;
        }

        let seasonings_used = self.season(recipe, containers, ctx.seasoning, &mut buckets);
        let produced = buckets.total();
        let burnt = burn(recipe, ctx, &mut buckets);

        let output = buckets
            .iter()
            .map(|(quality, amount)| ctx.factory.create(recipe.output, amount, quality))
            .collect();

        debug!(
            "Crafted '{}' x{}: produced {}, burnt {}, seasoned {}",
            recipe.name, crafted, produced, burnt, seasonings_used
        );
        CraftOutcome {
            crafted,
            produced,
            burnt,
            seasonings_used,
            output,
        }
    }

    /// Cooks a recipe and hands out the results.
    ///
    /// Output and consolation items go into the player inventory; whatever
    /// does not fit is reported as dropped. The hook is told about every cook
    /// that consumed ingredients.
    pub fn cook_recipe<C: ItemContainer, H: CookingHook + ?Sized>(
        &mut self,
        recipe: &Recipe,
        containers: &mut [C],
        quantity: u32,
        ctx: &mut CookingContext<'_>,
        hook: &mut H,
    ) -> CookReport {
        let outcome = self.craft_item_and_consume_ingredients(recipe, containers, quantity, ctx);
        let cooked = outcome.net();

        let mut delivered = outcome.output;
        if let Some(item) = ctx.burnt_item.filter(|_| outcome.burnt > 0) {
            delivered.push(ctx.factory.create(item, outcome.burnt, Quality::Normal));
        }

        let mut dropped = Vec::new();
        for stack in &delivered {
            let leftover = match containers.get_mut(PLAYER_INVENTORY) {
                Some(inventory) => inventory.insert(stack.clone()),
                None => Some(stack.clone()),
            };
            if let Some(leftover) = leftover {
                debug!(
                    "Inventory full, dropping {} x{}",
                    leftover.item, leftover.quantity
                );
                dropped.push(leftover);
            }
        }

        if outcome.crafted > 0 {
            hook.on_cooked(recipe, cooked, outcome.burnt);
            info!(
                "Cooked {} x '{}' ({} burnt)",
                cooked, recipe.name, outcome.burnt
            );
        }

        CookReport {
            cooked,
            burnt: outcome.burnt,
            crafted: outcome.crafted,
            seasonings_used: outcome.seasonings_used,
            delivered,
            dropped,
        }
    }

    fn slot_of(&self, container: usize, handle: StackHandle) -> Option<usize> {
        self.slots.iter().position(|slot| {
            slot.is_some_and(|ingredient| {
                ingredient.container == container && ingredient.handle == handle
            })
        })
    }

    /// Moves craft-sized batches out of the normal tier using the best
    /// seasoning available each time.
    fn season<C: ItemContainer>(
        &mut self,
        recipe: &Recipe,
        containers: &mut [C],
        seasoning: &dyn SeasoningProvider,
        buckets: &mut QualityStacks,
    ) -> u32 {
        let mut used = 0;
        while buckets.get(Quality::Normal) > 0 {
            let found = seasoning
                .ranked()
                .iter()
                .filter(|s| s.quality > Quality::Normal)
                .find_map(|s| {
                    matcher::find_first_unit(&Requirement::Item(s.item), containers)
                        .map(|hit| (*s, hit))
                });
            let Some((chosen, hit)) = found else {
                break;
            };
            let Some(container) = containers.get_mut(hit.container) else {
                break;
            };
            if let Err(err) = container.take(hit.handle, 1) {
                warn!("Could not consume seasoning {}: {}", chosen.item, err);
                break;
            }
            let moved = buckets.transfer(Quality::Normal, chosen.quality, recipe.output_quantity);
            trace!(
                "Seasoned {} units of '{}' to {} with {}",
                moved,
                recipe.name,
                chosen.quality,
                chosen.item
            );
            used += 1;
        }
        if used > 0 {
            self.prune(containers);
        }
        used
    }
}

fn consume<C: ItemContainer>(
    containers: &mut [C],
    plan: &[Consumption],
) -> Result<(), ContainerError> {
    for step in plan {
        let container = containers
            .get_mut(step.container)
            .ok_or(ContainerError::StackNotFound(step.handle))?;
        container.take(step.handle, step.amount)?;
    }
    Ok(())
}

fn burn(recipe: &Recipe, ctx: &mut CookingContext<'_>, buckets: &mut QualityStacks) -> u32 {
    let chance = ctx
        .burn
        .burn_chance(recipe, ctx.skill_level, ctx.tool_level)
        .clamp(0.0, 1.0);
    if chance <= 0.0 {
        return 0;
    }

    let tiers: Vec<(Quality, u32)> = buckets.iter().collect();
    let mut burnt = 0;
    for (quality, amount) in tiers {
        for _ in 0..amount {
            if ctx.rng.chance(chance) {
                buckets.take(quality, 1);
                burnt += 1;
            }
        }
    }
    if burnt > 0 {
        debug!(
            "Burnt {} units of '{}' (chance {:.3})",
            burnt, recipe.name, chance
        );
    }
    burnt
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::container::Container;
    use crate::item::ItemCatalog;
    use crate::providers::{CookingTally, Seasoning, SeasoningTable};
    use crate::random::{seeded, ScriptedRolls};
    use crate::slots::SlotTable;
    use larder_common::CategoryId;
    use proptest::prelude::*;

    const EGG: ItemTypeId = ItemTypeId::new(176);
    const MILK: ItemTypeId = ItemTypeId::new(184);
    const OMELET: ItemTypeId = ItemTypeId::new(195);
    const SALT: ItemTypeId = ItemTypeId::new(917);
    const TRUFFLE_OIL: ItemTypeId = ItemTypeId::new(432);
    const BURNT: ItemTypeId = ItemTypeId::new(900);

    fn veg() -> CategoryId {
        CategoryId::new(-75).expect("negative code")
    }

    fn omelet(eggs: u32, milk: u32) -> Recipe {
        Recipe::builder(RecipeId::new(1), "Omelet")
            .item(EGG, eggs)
            .item(MILK, milk)
            .output(OMELET, 1)
            .build()
            .expect("output set")
    }

    fn egg_dish(eggs: u32) -> Recipe {
        Recipe::builder(RecipeId::new(2), "Fried Egg")
            .item(EGG, eggs)
            .output(OMELET, 1)
            .build()
            .expect("output set")
    }

    fn table(usable: usize) -> SlotTable {
        SlotTable::new(vec![usable], usable.max(6)).expect("valid table")
    }

    fn container(stacks: &[(ItemTypeId, u32)]) -> Container {
        let mut c = Container::compact("fridge", stacks.len() + 4);
        for &(item, quantity) in stacks {
            c.push(ItemStack::new(item, quantity)).expect("room");
        }
        c
    }

    fn stage_everything(manager: &mut CookingManager, containers: &[Container]) {
        for (index, c) in containers.iter().enumerate() {
            for position in 0..c.len() {
                manager.add_to_ingredients(containers, index, position);
            }
        }
    }

    #[test]
    fn test_add_fills_first_empty_usable_slot() {
        let containers = vec![container(&[(EGG, 1), (MILK, 1), (SALT, 1)])];
        let mut manager = CookingManager::new(&table(2), 0);
        assert_eq!(manager.max_slots(), 6);
        assert_eq!(manager.usable_slots(), 2);

        assert!(manager.add_to_ingredients(&containers, 0, 0));
        assert!(manager.add_to_ingredients(&containers, 0, 1));
        assert!(!manager.add_to_ingredients(&containers, 0, 2));
        assert_eq!(manager.first_empty_slot(), None);
        assert!(manager.slots()[2..].iter().all(Option::is_none));

        assert!(manager.remove_from_ingredients(0));
        assert_eq!(manager.first_empty_slot(), Some(0));
        assert!(manager.add_to_ingredients(&containers, 0, 2));
        assert_eq!(manager.slots()[0].map(|i| i.item), Some(SALT));
    }

    #[test]
    fn test_add_rejects_duplicates_and_missing_positions() {
        let containers = vec![container(&[(EGG, 1)])];
        let mut manager = CookingManager::new(&table(4), 0);
        assert!(manager.add_to_ingredients(&containers, 0, 0));
        assert!(!manager.add_to_ingredients(&containers, 0, 0));
        assert!(!manager.add_to_ingredients(&containers, 0, 9));
        assert!(!manager.add_to_ingredients(&containers, 3, 0));
        assert_eq!(manager.staged_count(), 1);
    }

    #[test]
    fn test_remove_by_stack_position() {
        let containers = vec![container(&[(EGG, 1), (MILK, 1)])];
        let mut manager = CookingManager::new(&table(4), 0);
        stage_everything(&mut manager, &containers);

        assert!(manager.is_inventory_item_in_current_ingredients(&containers, 0, 1));
        assert!(manager.remove_stack_from_ingredients(&containers, 0, 1));
        assert!(!manager.is_inventory_item_in_current_ingredients(&containers, 0, 1));
        assert!(!manager.remove_stack_from_ingredients(&containers, 0, 1));
        assert!(!manager.remove_from_ingredients(1));
        assert_eq!(manager.staged_count(), 1);
    }

    #[test]
    fn test_tool_downgrade_clears_locked_slots() {
        let levels = SlotTable::new(vec![2, 4], 4).expect("valid table");
        let containers = vec![container(&[(EGG, 1), (MILK, 1), (SALT, 1), (EGG, 2)])];
        let mut manager = CookingManager::new(&levels, 1);
        stage_everything(&mut manager, &containers);
        assert_eq!(manager.staged_count(), 4);

        manager.set_tool_level(&levels, 0);
        assert_eq!(manager.usable_slots(), 2);
        assert_eq!(manager.staged_count(), 2);
    }

    #[test]
    fn test_staged_craftable_then_exhausted() {
        // Slots: [egg x2, empty, empty]; recipe needs two eggs.
        let catalog = ItemCatalog::new();
        let mut rng = ScriptedRolls::constant(0.5);
        let mut ctx = CookingContext::new(&catalog, &mut rng);
        let recipe = egg_dish(2);

        let mut containers = vec![container(&[(EGG, 2), (MILK, 9)])];
        let mut manager = CookingManager::new(&table(3), 0);
        assert!(manager.add_to_ingredients(&containers, 0, 0));
        assert_eq!(manager.amount_craftable(&recipe, &containers, true), 1);

        let first = manager.craft_item_and_consume_ingredients(&recipe, &mut containers, 1, &mut ctx);
        assert_eq!(first.crafted, 1);
        assert_eq!(manager.staged_count(), 0);
        assert_eq!(containers[0].count(EGG), 0);
        assert_eq!(containers[0].len(), 1);

        assert_eq!(manager.amount_craftable(&recipe, &containers, true), 0);
        let second = manager.craft_item_and_consume_ingredients(&recipe, &mut containers, 1, &mut ctx);
        assert_eq!(second.crafted, 0);
        assert!(second.output.is_empty());
    }

    #[test]
    fn test_certain_burn_destroys_everything() {
        let catalog = ItemCatalog::new();
        let mut rng = seeded(7);
        let always = |_: &Recipe, _: u32, _: u32| 1.0;
        let mut ctx = CookingContext::new(&catalog, &mut rng).with_burn(&always);

        let recipe = egg_dish(1);
        let mut containers = vec![container(&[(EGG, 5)])];
        let mut manager = CookingManager::new(&table(3), 0);
        stage_everything(&mut manager, &containers);

        let outcome = manager.craft_item_and_consume_ingredients(&recipe, &mut containers, 3, &mut ctx);
        assert_eq!(outcome.burnt, 3);
        assert_eq!(outcome.net(), 0);
        assert!(outcome.output.is_empty());
    }

    #[test]
    fn test_partial_batch_stops_early() {
        let catalog = ItemCatalog::new();
        let mut rng = seeded(1);
        let mut ctx = CookingContext::new(&catalog, &mut rng);

        let recipe = omelet(2, 1);
        let mut containers = vec![container(&[(EGG, 5), (MILK, 4)])];
        let mut manager = CookingManager::new(&table(4), 0);
        stage_everything(&mut manager, &containers);

        let outcome = manager.craft_item_and_consume_ingredients(&recipe, &mut containers, 5, &mut ctx);
        assert_eq!(outcome.crafted, 2);
        assert_eq!(containers[0].count(EGG), 1);
        assert_eq!(containers[0].count(MILK), 2);
        assert_eq!(outcome.output, vec![ItemStack::new(OMELET, 2)]);
    }

    #[test]
    fn test_references_survive_compaction_between_units() {
        // Each unit exhausts the first stack; the compacting container shifts
        // the rest down, and staged handles still find them.
        let catalog = ItemCatalog::new();
        let mut rng = seeded(3);
        let mut ctx = CookingContext::new(&catalog, &mut rng);

        let recipe = egg_dish(1);
        let mut containers = vec![container(&[(EGG, 1), (MILK, 1), (EGG, 1), (EGG, 1)])];
        let mut manager = CookingManager::new(&table(4), 0);
        assert!(manager.add_to_ingredients(&containers, 0, 2));
        assert!(manager.add_to_ingredients(&containers, 0, 0));
        assert!(manager.add_to_ingredients(&containers, 0, 3));

        let outcome = manager.craft_item_and_consume_ingredients(&recipe, &mut containers, 3, &mut ctx);
        assert_eq!(outcome.crafted, 3);
        assert_eq!(containers[0].count(EGG), 0);
        assert_eq!(containers[0].count(MILK), 1);
        assert_eq!(manager.staged_count(), 0);
    }

    #[test]
    fn test_fixed_slot_containers_leave_gaps() {
        let catalog = ItemCatalog::new();
        let mut rng = seeded(3);
        let mut ctx = CookingContext::new(&catalog, &mut rng);

        let mut chest = Container::vacate("chest", 3);
        chest.push(ItemStack::new(EGG, 1)).expect("room");
        let milk = chest.push(ItemStack::new(MILK, 3)).expect("room");
        let mut containers = vec![chest];

        let recipe = omelet(1, 1);
        let mut manager = CookingManager::new(&table(4), 0);
        stage_everything(&mut manager, &containers);

        let outcome = manager.craft_item_and_consume_ingredients(&recipe, &mut containers, 2, &mut ctx);
        assert_eq!(outcome.crafted, 1);
        assert!(containers[0].entry_at(0).is_none());
        assert_eq!(containers[0].position_of(milk), Some(1));
        assert_eq!(manager.staged_count(), 1);
    }

    #[test]
    fn test_consumption_spans_containers() {
        let catalog = ItemCatalog::new();
        let mut rng = seeded(5);
        let mut ctx = CookingContext::new(&catalog, &mut rng);

        let recipe = omelet(3, 1);
        let mut containers = vec![
            container(&[(EGG, 2)]),
            container(&[(EGG, 2), (MILK, 2)]),
        ];
        let mut manager = CookingManager::new(&table(4), 0);
        stage_everything(&mut manager, &containers);

        let outcome = manager.craft_item_and_consume_ingredients(&recipe, &mut containers, 2, &mut ctx);
        assert_eq!(outcome.crafted, 1);
        assert_eq!(containers[0].count(EGG) + containers[1].count(EGG), 1);
        assert_eq!(containers[1].count(MILK), 1);
    }

    #[test]
    fn test_seasoning_raises_quality_best_first() {
        let catalog = ItemCatalog::new();
        let mut rng = seeded(9);
        let seasonings = SeasoningTable::new(vec![
            Seasoning::new(SALT, Quality::Silver),
            Seasoning::new(TRUFFLE_OIL, Quality::Gold),
        ]);
        let mut ctx = CookingContext::new(&catalog, &mut rng).with_seasoning(&seasonings);

        let recipe = egg_dish(1);
        let mut containers = vec![
            container(&[(EGG, 4)]),
            container(&[(SALT, 2), (TRUFFLE_OIL, 1)]),
        ];
        let mut manager = CookingManager::new(&table(4), 0);
        assert!(manager.add_to_ingredients(&containers, 0, 0));

        let outcome = manager.craft_item_and_consume_ingredients(&recipe, &mut containers, 4, &mut ctx);
        assert_eq!(outcome.crafted, 4);
        assert_eq!(outcome.seasonings_used, 3);
        assert_eq!(
            outcome.output,
            vec![
                ItemStack::new(OMELET, 1),
                ItemStack::new(OMELET, 2).with_quality(Quality::Silver),
                ItemStack::new(OMELET, 1).with_quality(Quality::Gold),
            ]
        );
        assert!(containers[1].is_empty());
    }

    #[test]
    fn test_extra_portion_and_burn_conserve_units() {
        let catalog = ItemCatalog::new();
        // The bonus is certain and draws nothing; burn rolls alternate.
        let mut rng = ScriptedRolls::new(vec![0.0, 0.9, 0.0, 0.9, 0.0, 0.9, 0.0, 0.9]);
        let half = |_: &Recipe, _: u32, _: u32| 0.5;
        let mut ctx = CookingContext::new(&catalog, &mut rng)
            .with_extra_portion(ExtraPortion::Always)
            .with_burn(&half);

        let recipe = Recipe::builder(RecipeId::new(3), "Cookies")
            .item(EGG, 1)
            .output(OMELET, 2)
            .build()
            .expect("output set");
        let mut containers = vec![container(&[(EGG, 2)])];
        let mut manager = CookingManager::new(&table(4), 0);
        stage_everything(&mut manager, &containers);

        let outcome = manager.craft_item_and_consume_ingredients(&recipe, &mut containers, 2, &mut ctx);
        assert_eq!(outcome.crafted, 2);
        assert_eq!(outcome.produced, 2 * 2 * 2);
        let remaining: u32 = outcome.output.iter().map(|s| s.quantity).sum();
        assert_eq!(outcome.burnt + remaining, outcome.produced);
        assert_eq!(outcome.burnt, 4);
    }

    #[test]
    fn test_auto_fill_interleaves_requirements() {
        let recipe = omelet(1, 1);
        let containers = vec![
            container(&[(EGG, 1), (EGG, 5), (EGG, 3)]),
            container(&[(MILK, 2)]),
        ];
        let mut manager = CookingManager::new(&table(2), 0);
        assert!(manager.auto_fill_ingredients(&recipe, &containers));

        let staged: Vec<_> = manager
            .staged()
            .iter()
            .filter_map(|i| i.resolve(&containers).map(|s| (s.item, s.quantity)))
            .collect();
        assert_eq!(staged, vec![(EGG, 5), (MILK, 2)]);
    }

    #[test]
    fn test_auto_fill_respects_capacity() {
        let recipe = omelet(1, 1);
        let containers = vec![container(&[
            (EGG, 1),
            (EGG, 2),
            (EGG, 3),
            (EGG, 4),
            (MILK, 1),
        ])];
        let mut manager = CookingManager::new(&table(3), 0);
        assert!(manager.auto_fill_ingredients(&recipe, &containers));
        assert_eq!(manager.staged_count(), 3);
        let milk_staged = manager.staged().iter().filter(|i| i.item == MILK).count();
        assert_eq!(milk_staged, 1);
    }

    #[test]
    fn test_auto_fill_skips_uncraftable_and_clears_on_recipe_change() {
        let containers = vec![container(&[(EGG, 3)])];
        let mut manager = CookingManager::new(&table(3), 0);
        assert!(manager.auto_fill_ingredients(&egg_dish(1), &containers));
        assert_eq!(manager.staged_count(), 1);

        assert!(!manager.auto_fill_ingredients(&omelet(1, 1), &containers));
        assert_eq!(manager.staged_count(), 0);
    }

    #[test]
    fn test_auto_fill_uses_category_matches() {
        let recipe = Recipe::builder(RecipeId::new(4), "Salad")
            .category(veg(), 2)
            .output(OMELET, 1)
            .build()
            .expect("output set");
        let mut fridge = Container::compact("fridge", 4);
        fridge
            .push(ItemStack::new(ItemTypeId::new(20), 1).with_category(veg()))
            .expect("room");
        fridge
            .push(ItemStack::new(ItemTypeId::new(24), 1).with_category(veg()))
            .expect("room");
        let containers = vec![fridge];

        let mut manager = CookingManager::new(&table(4), 0);
        assert!(manager.auto_fill_ingredients(&recipe, &containers));
        assert_eq!(manager.staged_count(), 2);
        assert_eq!(manager.amount_craftable(&recipe, &containers, true), 1);
    }

    #[test]
    fn test_cook_recipe_inserts_and_reports() {
        let catalog = ItemCatalog::new();
        let mut rng = ScriptedRolls::new(vec![0.0, 0.9]);
        let half = |_: &Recipe, _: u32, _: u32| 0.5;
        let mut ctx = CookingContext::new(&catalog, &mut rng)
            .with_burn(&half)
            .with_burnt_item(BURNT);
        let mut tally = CookingTally::new(2);

        let recipe = egg_dish(1);
        let mut containers = vec![container(&[(EGG, 2)])];
        let mut manager = CookingManager::new(&table(4), 0);
        stage_everything(&mut manager, &containers);

        let report = manager.cook_recipe(&recipe, &mut containers, 2, &mut ctx, &mut tally);
        assert_eq!(report.cooked, 1);
        assert_eq!(report.burnt, 1);
        assert!(report.dropped.is_empty());
        assert_eq!(containers[0].count(OMELET), 1);
        assert_eq!(containers[0].count(BURNT), 1);
        assert_eq!(tally.recipe(recipe.id).cooked, 1);
        assert_eq!(tally.experience(), 2);
    }

    #[test]
    fn test_cook_recipe_drops_what_does_not_fit() {
        let catalog = ItemCatalog::new();
        let mut rng = seeded(11);
        let mut ctx = CookingContext::new(&catalog, &mut rng);

        let mut backpack = Container::compact("backpack", 1);
        backpack.push(ItemStack::new(SALT, 1)).expect("room");
        let mut containers = vec![backpack, container(&[(EGG, 1)])];

        let recipe = egg_dish(1);
        let mut manager = CookingManager::new(&table(4), 0);
        stage_everything(&mut manager, &containers);

        let report = manager.cook_recipe(&recipe, &mut containers, 1, &mut ctx, &mut ());
        assert_eq!(report.cooked, 1);
        assert_eq!(report.dropped, vec![ItemStack::new(OMELET, 1)]);
        assert_eq!(containers[0].count(OMELET), 0);
    }

    #[test]
    fn test_cook_without_ingredients_skips_hook() {
        let catalog = ItemCatalog::new();
        let mut rng = seeded(2);
        let mut ctx = CookingContext::new(&catalog, &mut rng);
        let mut tally = CookingTally::new(1);
        let mut containers = vec![container(&[])];
        let mut manager = CookingManager::new(&table(2), 0);

        let report = manager.cook_recipe(&egg_dish(1), &mut containers, 3, &mut ctx, &mut tally);
        assert_eq!(report, CookReport::default());
        assert_eq!(tally.recipe(RecipeId::new(2)).cooked, 0);
    }

    #[test]
    fn test_recipe_without_ingredients_cooks_nothing() {
        let catalog = ItemCatalog::new();
        let mut rng = seeded(5);
        let mut ctx = CookingContext::new(&catalog, &mut rng);
        let mut tally = CookingTally::new(1);
        let air = Recipe::builder(RecipeId::new(3), "Air")
            .output(OMELET, 1)
            .build()
            .expect("output set");
        let mut containers = vec![container(&[])];
        let mut manager = CookingManager::new(&table(2), 0);

        assert_eq!(manager.amount_craftable(&air, &containers, false), 0);
        let report = manager.cook_recipe(&air, &mut containers, 5, &mut ctx, &mut tally);
        assert_eq!(report, CookReport::default());
        assert_eq!(containers[0].count(OMELET), 0);
        assert_eq!(tally.recipe(air.id).cooked, 0);
    }

    #[test]
    fn test_zero_quantity_recipe_stops_immediately() {
        let catalog = ItemCatalog::new();
        let mut rng = ScriptedRolls::constant(0.99);
        let mut ctx = CookingContext::new(&catalog, &mut rng);
        let recipe = omelet(0, 0);
        let mut containers = vec![container(&[(EGG, 3), (MILK, 3)])];
        let mut manager = CookingManager::new(&table(4), 0);
        stage_everything(&mut manager, &containers);

        let outcome =
            manager.craft_item_and_consume_ingredients(&recipe, &mut containers, u32::MAX, &mut ctx);
        assert_eq!(outcome.crafted, 0);
        assert_eq!(outcome.produced, 0);
        assert!(outcome.output.is_empty());
        assert_eq!(containers[0].count(EGG), 3);
        assert_eq!(containers[0].count(MILK), 3);
    }

    proptest! {
        #[test]
        fn prop_crafting_conserves_ingredients(
            eggs in proptest::collection::vec(1u32..8, 1..5),
            milk in proptest::collection::vec(1u32..8, 1..5),
            need_eggs in 1u32..4,
            need_milk in 1u32..4,
            requested in 0u32..12,
        ) {
            let catalog = ItemCatalog::new();
            let mut rng = ScriptedRolls::constant(0.99);
            let mut ctx = CookingContext::new(&catalog, &mut rng)
                .with_extra_portion(ExtraPortion::Never);

            let mut stacks: Vec<(ItemTypeId, u32)> = eggs.iter().map(|&q| (EGG, q)).collect();
            stacks.extend(milk.iter().map(|&q| (MILK, q)));
            let mut containers = vec![container(&stacks)];
            let recipe = omelet(need_eggs, need_milk);

            let mut manager = CookingManager::new(&table(12), 0);
            stage_everything(&mut manager, &containers);
            let craftable = manager.amount_craftable(&recipe, &containers, true);
            prop_assert_eq!(craftable, manager.amount_craftable(&recipe, &containers, false));

            let eggs_before = containers[0].count(EGG);
            let milk_before = containers[0].count(MILK);
            let outcome = manager.craft_item_and_consume_ingredients(&recipe, &mut containers, requested, &mut ctx);

            prop_assert_eq!(outcome.crafted, requested.min(craftable));
            prop_assert_eq!(eggs_before - containers[0].count(EGG), outcome.crafted * need_eggs);
            prop_assert_eq!(milk_before - containers[0].count(MILK), outcome.crafted * need_milk);
            prop_assert_eq!(outcome.produced, outcome.crafted);
        }
    }
}

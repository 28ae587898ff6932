//! Ingredient matching and craftability.
//!
//! Everything here is read-only over the containers. Containers are scanned
//! in the order given, and positions within a container in ascending order.

use larder_common::StackHandle;

use crate::container::ItemContainer;
use crate::item::ItemStack;
use crate::recipe::{Recipe, Requirement};
use crate::slots::Ingredient;

/// A matched stack found during a scan.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct StackRef {
    /// Index of the container in the scanned list
    pub container: usize,
    /// Position of the stack at scan time
    pub position: usize,
    /// Durable handle of the stack
    pub handle: StackHandle,
}

/// Result of [`matching_ingredients`].
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct MatchScan {
    /// Every matching stack visited, in scan order
    pub stacks: Vec<StackRef>,
    /// Fulfillment units counted
    pub fulfilled: u32,
}

/// One step of a consumption plan.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Consumption {
    /// Index of the container
    pub container: usize,
    /// Stack to take from
    pub handle: StackHandle,
    /// Items to take
    pub amount: u32,
}

/// A complete plan for consuming one craft's worth of ingredients.
pub type ConsumptionPlan = Vec<Consumption>;

/// Returns true if the stack satisfies the requirement.
#[must_use]
pub fn is_matching_ingredient(requirement: &Requirement, stack: &ItemStack) -> bool {
    match requirement {
        Requirement::Item(item) => stack.item == *item,
        Requirement::Category(category) => stack.category == Some(*category),
        Requirement::Custom(predicate) => predicate.matches(stack),
    }
}

/// Scans for stacks matching a requirement until `limit` fulfillments are found.
///
/// A running counter starts at `required` and each matching stack subtracts its
/// quantity. When the counter reaches zero or below, one fulfillment is counted
/// and the counter resets to `required`; any surplus from the stack that closed
/// the fulfillment is not carried into the next one.
pub fn matching_ingredients<C: ItemContainer>(
    requirement: &Requirement,
    containers: &[C],
    required: u32,
    limit: u32,
) -> MatchScan {
    let mut scan = MatchScan::default();
    if limit == 0 {
        return scan;
    }

    let mut counter = i64::from(required);
    for (container_index, container) in containers.iter().enumerate() {
        for position in 0..container.len() {
            let Some((handle, stack)) = container.entry_at(position) else {
                continue;
            };
            if stack.is_empty() || !is_matching_ingredient(requirement, stack) {
                continue;
            }
            scan.stacks.push(StackRef {
                container: container_index,
                position,
                handle,
            });
            counter -= i64::from(stack.quantity);
            if counter <= 0 {
                scan.fulfilled += 1;
                counter = i64::from(required);
                if scan.fulfilled >= limit {
                    return scan;
                }
            }
        }
    }
    scan
}

/// Total quantity of items matching a requirement across all containers.
pub fn count_matching<C: ItemContainer>(requirement: &Requirement, containers: &[C]) -> u64 {
    containers
        .iter()
        .flat_map(|container| (0..container.len()).filter_map(move |p| container.entry_at(p)))
        .filter(|(_, stack)| is_matching_ingredient(requirement, stack))
        .map(|(_, stack)| u64::from(stack.quantity))
        .sum()
}

/// Finds the first single unit matching a requirement.
pub fn find_first_unit<C: ItemContainer>(
    requirement: &Requirement,
    containers: &[C],
) -> Option<StackRef> {
    matching_ingredients(requirement, containers, 1, 1)
        .stacks
        .into_iter()
        .next()
}

/// How many times a recipe can be crafted.
///
/// With `staged` set, only the staged stacks count; otherwise every container
/// is scanned. The result is the minimum over requirements of
/// `floor(available / required)`, so one unmet requirement makes it 0.
/// A recipe that consumes nothing is never craftable.
pub fn amount_craftable<C: ItemContainer>(
    recipe: &Recipe,
    containers: &[C],
    staged: Option<&[Ingredient]>,
) -> u32 {
    if consumes_nothing(recipe) {
        return 0;
    }
    recipe
        .requirements
        .iter()
        .map(|req| {
            let available = match staged {
                Some(slots) => slots
                    .iter()
                    .filter_map(|slot| slot.resolve(containers))
                    .filter(|stack| is_matching_ingredient(&req.requirement, stack))
                    .map(|stack| u64::from(stack.quantity))
                    .sum::<u64>(),
                None => count_matching(&req.requirement, containers),
            };
            if req.quantity == 0 {
                return u32::MAX;
            }
            u32::try_from(available / u64::from(req.quantity)).unwrap_or(u32::MAX)
        })
        .min()
        .unwrap_or(0)
}

/// Plans one craft's worth of consumption from the staged slots.
///
/// Each requirement walks the slots in order and takes greedily until it is
/// satisfied. Quantities already promised to an earlier requirement are not
/// offered again. Returns `None` unless every requirement is fully covered,
/// and for a recipe whose plan would consume nothing.
pub fn choose_ingredients_for_crafting<C: ItemContainer>(
    recipe: &Recipe,
    staged: &[Ingredient],
    containers: &[C],
) -> Option<ConsumptionPlan> {
    let mut promised = vec![0u32; staged.len()];
    let mut plan = ConsumptionPlan::new();

    for req in &recipe.requirements {
        let mut needed = req.quantity;
        for (index, slot) in staged.iter().enumerate() {
            if needed == 0 {
                break;
            }
            let Some(stack) = slot.resolve(containers) else {
                continue;
            };
            if !is_matching_ingredient(&req.requirement, stack) {
                continue;
            }
            let take = stack.quantity.saturating_sub(promised[index]).min(needed);
            if take == 0 {
                continue;
            }
            promised[index] += take;
            needed -= take;
            plan.push(Consumption {
                container: slot.container,
                handle: slot.handle,
                amount: take,
            });
        }
        if needed > 0 {
            return None;
        }
    }
    if plan.is_empty() {
        return None;
    }
    Some(plan)
}

fn consumes_nothing(recipe: &Recipe) -> bool {
    recipe.requirements.iter().all(|req| req.quantity == 0)
}

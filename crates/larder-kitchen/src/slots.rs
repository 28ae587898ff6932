//! Ingredient slot references and slot capacity lookup.

use larder_common::{ItemTypeId, StackHandle};
use serde::{Deserialize, Serialize};

use crate::config::ConfigError;
use crate::container::ItemContainer;
use crate::item::ItemStack;

/// A staged reference to one stack in one container.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Ingredient {
    /// Index of the container in the caller's container list
    pub container: usize,
    /// Handle of the stack inside that container
    pub handle: StackHandle,
    /// Item the stack held when it was staged
    pub item: ItemTypeId,
}

impl Ingredient {
    /// Creates a new slot reference.
    #[must_use]
    pub const fn new(container: usize, handle: StackHandle, item: ItemTypeId) -> Self {
        Self {
            container,
            handle,
            item,
        }
    }

    /// Resolves the reference against current container state.
    ///
    /// Fails if the container is gone, the stack was removed, or the stack now
    /// holds a different item.
    pub fn resolve<'a, C: ItemContainer>(&self, containers: &'a [C]) -> Option<&'a ItemStack> {
        containers
            .get(self.container)?
            .get(self.handle)
            .filter(|stack| stack.item == self.item && !stack.is_empty())
    }
}

/// Maps a cooking tool upgrade level to the number of usable ingredient slots.
pub trait SlotCapacity {
    /// Usable slots at a level. Never decreases as the level rises.
    fn usable_slots(&self, level: u32) -> usize;

    /// Slots shown in the UI, including locked ones.
    fn max_slots(&self) -> usize;
}

/// Table-driven [`SlotCapacity`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SlotTable {
    usable_by_level: Vec<usize>,
    max: usize,
}

impl SlotTable {
    /// Creates a table, rejecting empty or decreasing level lists and entries
    /// above the displayed maximum.
    pub fn new(usable_by_level: Vec<usize>, max: usize) -> Result<Self, ConfigError> {
        if usable_by_level.is_empty() {
            return Err(ConfigError::Invalid("slot table has no levels".into()));
        }
        if usable_by_level.windows(2).any(|pair| pair[1] < pair[0]) {
            return Err(ConfigError::Invalid(format!(
                "slot table must not decrease: {usable_by_level:?}"
            )));
        }
        if usable_by_level.iter().any(|&slots| slots > max) {
            return Err(ConfigError::Invalid(format!(
                "slot table exceeds maximum of {max}: {usable_by_level:?}"
            )));
        }
        Ok(Self {
            usable_by_level,
            max,
        })
    }
}

impl Default for SlotTable {
    fn default() -> Self {
        Self {
            usable_by_level: vec![2, 3, 4, 5, 6],
            max: 6,
        }
    }
}

impl SlotCapacity for SlotTable {
    fn usable_slots(&self, level: u32) -> usize {
        let index = (level as usize).min(self.usable_by_level.len().saturating_sub(1));
        self.usable_by_level.get(index).copied().unwrap_or(0)
    }

    fn max_slots(&self) -> usize {
        self.max
    }
}

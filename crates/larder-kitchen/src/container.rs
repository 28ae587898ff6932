//! Item containers: backpacks, fridges, chests.
//!
//! A container is an ordered list of positions holding item stacks. Every
//! stack placed into a container is issued a [`StackHandle`] that stays valid
//! until the stack is removed, independent of where it sits. When a stack
//! runs out it is removed according to the container's [`RemovalPolicy`]:
//! compacting containers close the gap, fixed-slot containers leave an empty
//! slot behind.

use larder_common::{ItemTypeId, StackHandle};
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::trace;

use crate::item::ItemStack;

/// Container error types.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum ContainerError {
    /// No free position left
    #[error("Container full: capacity {capacity}")]
    Full {
        /// Container capacity
        capacity: usize,
    },
    /// Handle does not resolve to a stack
    #[error("Stack not found: {0:?}")]
    StackNotFound(StackHandle),
    /// Not enough items in the stack
    #[error("Not enough items: need {needed}, have {have}")]
    NotEnough {
        /// Amount needed
        needed: u32,
        /// Amount available
        have: u32,
    },
}

/// Result type for container operations.
pub type ContainerResult<T> = Result<T, ContainerError>;

/// What happens to a position when its stack is used up.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RemovalPolicy {
    /// Remove the entry; later stacks shift down one position.
    #[default]
    Compact,
    /// Leave an empty slot in place.
    Vacate,
}

/// Outcome of taking items from a stack.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Taken {
    /// Items left in the stack
    pub remaining: u32,
    /// Position the stack was removed from, if it ran out
    pub removed_at: Option<usize>,
}

/// An ordered collection of item stacks.
pub trait ItemContainer {
    /// Removal policy for exhausted stacks.
    fn policy(&self) -> RemovalPolicy;

    /// Number of positions (occupied or empty).
    fn len(&self) -> usize;

    /// Returns true if the container has no positions.
    fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Stack and its handle at a position.
    fn entry_at(&self, position: usize) -> Option<(StackHandle, &ItemStack)>;

    /// Current position of a handle.
    fn position_of(&self, handle: StackHandle) -> Option<usize>;

    /// Resolves a handle to its stack.
    fn get(&self, handle: StackHandle) -> Option<&ItemStack> {
        self.position_of(handle)
            .and_then(|position| self.entry_at(position))
            .map(|(_, stack)| stack)
    }

    /// Removes `amount` items from a stack, removing the stack when it empties.
    fn take(&mut self, handle: StackHandle, amount: u32) -> ContainerResult<Taken>;

    /// Inserts a stack, merging into compatible stacks first.
    ///
    /// Returns whatever did not fit.
    fn insert(&mut self, stack: ItemStack) -> Option<ItemStack>;

    /// Total quantity of an item across all stacks.
    fn count(&self, item: ItemTypeId) -> u32 {
        (0..self.len())
            .filter_map(|position| self.entry_at(position))
            .filter(|(_, stack)| stack.item == item)
            .map(|(_, stack)| stack.quantity)
            .sum()
    }
}

#[derive(Debug, Clone)]
struct Entry {
    handle: StackHandle,
    stack: ItemStack,
}

/// Default [`ItemContainer`] implementation.
#[derive(Debug, Clone)]
pub struct Container {
    name: String,
    policy: RemovalPolicy,
    capacity: usize,
    slots: Vec<Option<Entry>>,
    next_handle: StackHandle,
}

impl Container {
    /// Creates a container with the given removal policy and capacity.
    #[must_use]
    pub fn new(name: impl Into<String>, policy: RemovalPolicy, capacity: usize) -> Self {
        let slots = match policy {
            RemovalPolicy::Compact => Vec::with_capacity(capacity),
            RemovalPolicy::Vacate => vec![None; capacity],
        };
        Self {
            name: name.into(),
            policy,
            capacity,
            slots,
            next_handle: StackHandle::from_raw(1),
        }
    }

    /// Creates a compacting container (a list that closes gaps).
    #[must_use]
    pub fn compact(name: impl Into<String>, capacity: usize) -> Self {
        Self::new(name, RemovalPolicy::Compact, capacity)
    }

    /// Creates a fixed-slot container (a grid that leaves empty slots).
    #[must_use]
    pub fn vacate(name: impl Into<String>, capacity: usize) -> Self {
        Self::new(name, RemovalPolicy::Vacate, capacity)
    }

    /// Container name.
    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Maximum number of positions.
    #[must_use]
    pub const fn capacity(&self) -> usize {
        self.capacity
    }

    /// Number of occupied positions.
    #[must_use]
    pub fn occupied(&self) -> usize {
        self.slots.iter().filter(|slot| slot.is_some()).count()
    }

    /// Places a stack at the first free position without merging.
    pub fn push(&mut self, stack: ItemStack) -> ContainerResult<StackHandle> {
        let position = self
            .free_position()
            .ok_or(ContainerError::Full {
                capacity: self.capacity,
            })?;
        let handle = self.issue_handle();
        let entry = Some(Entry { handle, stack });
        if position == self.slots.len() {
            self.slots.push(entry);
        } else {
            self.slots[position] = entry;
        }
        Ok(handle)
    }

    /// Iterates occupied positions in order.
    pub fn iter(&self) -> impl Iterator<Item = (usize, StackHandle, &ItemStack)> + '_ {
        self.slots.iter().enumerate().filter_map(|(position, slot)| {
            slot.as_ref()
                .map(|entry| (position, entry.handle, &entry.stack))
        })
    }

    fn issue_handle(&mut self) -> StackHandle {
        let handle = self.next_handle;
        self.next_handle = handle.next();
        handle
    }

    fn free_position(&self) -> Option<usize> {
        match self.policy {
            RemovalPolicy::Compact => (self.slots.len() < self.capacity).then_some(self.slots.len()),
            RemovalPolicy::Vacate => self.slots.iter().position(Option::is_none),
        }
    }
}

impl ItemContainer for Container {
    fn policy(&self) -> RemovalPolicy {
        self.policy
    }

    fn len(&self) -> usize {
        self.slots.len()
    }

    fn entry_at(&self, position: usize) -> Option<(StackHandle, &ItemStack)> {
        self.slots
            .get(position)
            .and_then(Option::as_ref)
            .map(|entry| (entry.handle, &entry.stack))
    }

    fn position_of(&self, handle: StackHandle) -> Option<usize> {
        self.slots
            .iter()
            .position(|slot| slot.as_ref().is_some_and(|entry| entry.handle == handle))
    }

    fn take(&mut self, handle: StackHandle, amount: u32) -> ContainerResult<Taken> {
        let position = self
            .position_of(handle)
            .ok_or(ContainerError::StackNotFound(handle))?;
        let Some(entry) = self.slots[position].as_mut() else {
            return Err(ContainerError::StackNotFound(handle));
        };
        if entry.stack.quantity < amount {
            return Err(ContainerError::NotEnough {
                needed: amount,
                have: entry.stack.quantity,
            });
        }
        entry.stack.quantity -= amount;
        let remaining = entry.stack.quantity;
        if remaining > 0 {
            return Ok(Taken {
                remaining,
                removed_at: None,
            });
        }

        match self.policy {
            RemovalPolicy::Compact => {
                self.slots.remove(position);
            }
            RemovalPolicy::Vacate => self.slots[position] = None,
        }
        trace!(
            "Removed exhausted stack {:?} from '{}' at {}",
            handle,
            self.name,
            position
        );
        Ok(Taken {
            remaining: 0,
            removed_at: Some(position),
        })
    }

    fn insert(&mut self, mut stack: ItemStack) -> Option<ItemStack> {
        for entry in self.slots.iter_mut().flatten() {
            if stack.is_empty() {
                return None;
            }
            if entry.stack.can_merge(&stack) {
                let moved = entry.stack.room().min(stack.quantity);
                entry.stack.quantity += moved;
                stack.quantity -= moved;
            }
        }

        while !stack.is_empty() {
            if self.free_position().is_none() {
                return Some(stack);
            }
            let chunk = stack.split(stack.max_stack.max(1));
            // free_position was checked above
            if self.push(chunk).is_err() {
                return Some(stack);
            }
        }
        None
    }
}

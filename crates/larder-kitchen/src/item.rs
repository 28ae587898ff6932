//! Item stacks and the item catalog.

use ahash::AHashMap;
use larder_common::{CategoryId, ItemTypeId, Quality};
use serde::{Deserialize, Serialize};

/// Stack size used for items the catalog does not know.
pub const DEFAULT_MAX_STACK: u32 = 999;

/// A stack of identical items.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ItemStack {
    /// Item type
    pub item: ItemTypeId,
    /// Item category, if the item has one
    pub category: Option<CategoryId>,
    /// Number of items in the stack
    pub quantity: u32,
    /// Quality tier
    pub quality: Quality,
    /// Largest quantity a single stack may hold
    pub max_stack: u32,
}

impl ItemStack {
    /// Creates a normal-quality stack with no category.
    #[must_use]
    pub const fn new(item: ItemTypeId, quantity: u32) -> Self {
        Self {
            item,
            category: None,
            quantity,
            quality: Quality::Normal,
            max_stack: DEFAULT_MAX_STACK,
        }
    }

    /// Sets the category.
    #[must_use]
    pub const fn with_category(mut self, category: CategoryId) -> Self {
        self.category = Some(category);
        self
    }

    /// Sets the quality tier.
    #[must_use]
    pub const fn with_quality(mut self, quality: Quality) -> Self {
        self.quality = quality;
        self
    }

    /// Sets the maximum stack size.
    #[must_use]
    pub const fn with_max_stack(mut self, max_stack: u32) -> Self {
        self.max_stack = max_stack;
        self
    }

    /// Returns true if the stack holds nothing.
    #[must_use]
    pub const fn is_empty(&self) -> bool {
        self.quantity == 0
    }

    /// Returns true if `other` can be merged into this stack.
    #[must_use]
    pub fn can_merge(&self, other: &Self) -> bool {
        self.item == other.item && self.quality == other.quality && self.category == other.category
    }

    /// Room left before the stack is full.
    #[must_use]
    pub const fn room(&self) -> u32 {
        self.max_stack.saturating_sub(self.quantity)
    }

    /// Splits off up to `count` items into a new stack.
    #[must_use]
    pub fn split(&mut self, count: u32) -> Self {
        let taken = count.min(self.quantity);
        self.quantity -= taken;
        Self {
            quantity: taken,
            ..self.clone()
        }
    }
}

/// Creates new stacks of a given item.
pub trait ItemFactory {
    /// Creates a stack of `quantity` items at the given quality.
    fn create(&self, item: ItemTypeId, quantity: u32, quality: Quality) -> ItemStack;
}

/// Static definition of an item type.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ItemDef {
    /// Item type
    pub id: ItemTypeId,
    /// Display name
    pub name: String,
    /// Category code, if any
    #[serde(default)]
    pub category: Option<CategoryId>,
    /// Maximum stack size
    #[serde(default = "default_max_stack")]
    pub max_stack: u32,
}

fn default_max_stack() -> u32 {
    DEFAULT_MAX_STACK
}

impl ItemDef {
    /// Creates a definition with no category and the default stack size.
    #[must_use]
    pub fn new(id: ItemTypeId, name: impl Into<String>) -> Self {
        Self {
            id,
            name: name.into(),
            category: None,
            max_stack: DEFAULT_MAX_STACK,
        }
    }

    /// Sets the category.
    #[must_use]
    pub const fn with_category(mut self, category: CategoryId) -> Self {
        self.category = Some(category);
        self
    }
}

/// Registry of item definitions.
#[derive(Debug, Clone, Default)]
pub struct ItemCatalog {
    items: AHashMap<ItemTypeId, ItemDef>,
}

impl ItemCatalog {
    /// Creates an empty catalog.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers an item definition, replacing any previous one.
    pub fn register(&mut self, def: ItemDef) {
        self.items.insert(def.id, def);
    }

    /// Looks up an item definition.
    #[must_use]
    pub fn get(&self, id: ItemTypeId) -> Option<&ItemDef> {
        self.items.get(&id)
    }

    /// Returns true if the item is registered.
    #[must_use]
    pub fn contains(&self, id: ItemTypeId) -> bool {
        self.items.contains_key(&id)
    }

    /// Display name for an item, falling back to its id.
    #[must_use]
    pub fn name_of(&self, id: ItemTypeId) -> String {
        self.items
            .get(&id)
            .map_or_else(|| id.to_string(), |def| def.name.clone())
    }

    /// Number of registered items.
    #[must_use]
    pub fn len(&self) -> usize {
        self.items.len()
    }

    /// Returns true if nothing is registered.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }
}

impl ItemFactory for ItemCatalog {
    fn create(&self, item: ItemTypeId, quantity: u32, quality: Quality) -> ItemStack {
        let mut stack = ItemStack::new(item, quantity).with_quality(quality);
        if let Some(def) = self.items.get(&item) {
            stack.category = def.category;
            stack.max_stack = def.max_stack;
        }
        stack
    }
}

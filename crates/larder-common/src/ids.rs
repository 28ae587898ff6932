//! ID types for items, categories, recipes and stacks.

use serde::{Deserialize, Serialize};

/// Identifier for an item type. Concrete item identifiers are never negative.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct ItemTypeId(u32);

impl ItemTypeId {
    /// Creates an item type ID from a raw value.
    #[must_use]
    pub const fn new(id: u32) -> Self {
        Self(id)
    }

    /// Returns the raw ID value.
    #[must_use]
    pub const fn raw(self) -> u32 {
        self.0
    }
}

impl std::fmt::Display for ItemTypeId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "item#{}", self.0)
    }
}

/// Item category code. Category codes are always negative.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "i32", into = "i32")]
pub struct CategoryId(i32);

impl CategoryId {
    /// Creates a category ID, rejecting non-negative codes.
    #[must_use]
    pub const fn new(code: i32) -> Option<Self> {
        if code < 0 {
            Some(Self(code))
        } else {
            None
        }
    }

    /// Returns the raw (negative) category code.
    #[must_use]
    pub const fn raw(self) -> i32 {
        self.0
    }
}

impl TryFrom<i32> for CategoryId {
    type Error = String;

    fn try_from(code: i32) -> Result<Self, Self::Error> {
        Self::new(code).ok_or_else(|| format!("category code must be negative, got {code}"))
    }
}

impl From<CategoryId> for i32 {
    fn from(id: CategoryId) -> Self {
        id.0
    }
}

impl std::fmt::Display for CategoryId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "category{}", self.0)
    }
}

/// Unique identifier for a recipe.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct RecipeId(u32);

impl RecipeId {
    /// Creates a recipe ID from a raw value.
    #[must_use]
    pub const fn new(id: u32) -> Self {
        Self(id)
    }

    /// Returns the raw ID value.
    #[must_use]
    pub const fn raw(self) -> u32 {
        self.0
    }
}

/// Durable handle to a stack inside one container.
///
/// Handles are issued by the owning container and never reissued after the
/// stack is removed, so a stale handle fails to resolve instead of aliasing
/// whatever now sits at the old position.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct StackHandle(u64);

impl StackHandle {
    /// Creates a handle from a raw value.
    #[must_use]
    pub const fn from_raw(value: u64) -> Self {
        Self(value)
    }

    /// Returns the raw handle value.
    #[must_use]
    pub const fn raw(self) -> u64 {
        self.0
    }

    /// Returns the handle issued after this one.
    #[must_use]
    pub const fn next(self) -> Self {
        Self(self.0 + 1)
    }
}

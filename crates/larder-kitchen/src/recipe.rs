//! Recipe definitions and the recipe book.

use std::fmt;
use std::sync::Arc;

use ahash::AHashMap;
use larder_common::{CategoryId, ItemTypeId, RecipeId};

use crate::container::ItemContainer;
use crate::item::ItemStack;
use crate::matcher;

/// A named custom matching rule for ingredients.
#[derive(Clone)]
pub struct ItemPredicate {
    name: String,
    test: Arc<dyn Fn(&ItemStack) -> bool + Send + Sync>,
}

impl ItemPredicate {
    /// Creates a predicate.
    pub fn new(
        name: impl Into<String>,
        test: impl Fn(&ItemStack) -> bool + Send + Sync + 'static,
    ) -> Self {
        Self {
            name: name.into(),
            test: Arc::new(test),
        }
    }

    /// Predicate name.
    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Evaluates the predicate.
    #[must_use]
    pub fn matches(&self, stack: &ItemStack) -> bool {
        (self.test)(stack)
    }
}

impl fmt::Debug for ItemPredicate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_tuple("ItemPredicate").field(&self.name).finish()
    }
}

/// What a recipe asks for.
#[derive(Debug, Clone)]
pub enum Requirement {
    /// A specific item
    Item(ItemTypeId),
    /// Any item of a category
    Category(CategoryId),
    /// Any item accepted by a custom rule
    Custom(ItemPredicate),
}

impl Requirement {
    /// Decodes a host requirement code.
    ///
    /// Negative codes are categories, everything else is an item id. Returns
    /// `None` for codes outside either id range.
    #[must_use]
    pub fn from_code(code: i64) -> Option<Self> {
        if code < 0 {
            i32::try_from(code)
                .ok()
                .and_then(CategoryId::new)
                .map(Self::Category)
        } else {
            u32::try_from(code)
                .ok()
                .map(|id| Self::Item(ItemTypeId::new(id)))
        }
    }

    /// Short label for logs and UI.
    #[must_use]
    pub fn label(&self) -> String {
        match self {
            Self::Item(id) => id.to_string(),
            Self::Category(category) => category.to_string(),
            Self::Custom(predicate) => predicate.name().to_string(),
        }
    }
}

/// A requirement paired with the quantity needed per craft.
#[derive(Debug, Clone)]
pub struct RecipeRequirement {
    /// What is needed
    pub requirement: Requirement,
    /// How many per craft
    pub quantity: u32,
}

impl RecipeRequirement {
    /// Creates a new requirement.
    #[must_use]
    pub const fn new(requirement: Requirement, quantity: u32) -> Self {
        Self {
            requirement,
            quantity,
        }
    }
}

/// A cooking recipe.
#[derive(Debug, Clone)]
pub struct Recipe {
    /// Recipe identifier
    pub id: RecipeId,
    /// Recipe name
    pub name: String,
    /// Requirements, in recipe order
    pub requirements: Vec<RecipeRequirement>,
    /// Output item
    pub output: ItemTypeId,
    /// Items produced per craft
    pub output_quantity: u32,
}

impl Recipe {
    /// Creates a new recipe builder.
    #[must_use]
    pub fn builder(id: RecipeId, name: impl Into<String>) -> RecipeBuilder {
        RecipeBuilder::new(id, name)
    }

    /// Recipe complexity, used by burn chance curves.
    #[must_use]
    pub fn complexity(&self) -> usize {
        self.requirements.len()
    }
}

/// Builder for creating recipes.
#[derive(Debug)]
pub struct RecipeBuilder {
    id: RecipeId,
    name: String,
    requirements: Vec<RecipeRequirement>,
    output: Option<ItemTypeId>,
    output_quantity: u32,
}

impl RecipeBuilder {
    fn new(id: RecipeId, name: impl Into<String>) -> Self {
        Self {
            id,
            name: name.into(),
            requirements: Vec::new(),
            output: None,
            output_quantity: 1,
        }
    }

    /// Requires a specific item.
    #[must_use]
    pub fn item(self, item: ItemTypeId, quantity: u32) -> Self {
        self.requirement(Requirement::Item(item), quantity)
    }

    /// Requires any item of a category.
    #[must_use]
    pub fn category(self, category: CategoryId, quantity: u32) -> Self {
        self.requirement(Requirement::Category(category), quantity)
    }

    /// Requires any item accepted by a predicate.
    #[must_use]
    pub fn custom(self, predicate: ItemPredicate, quantity: u32) -> Self {
        self.requirement(Requirement::Custom(predicate), quantity)
    }

    /// Adds a requirement.
    #[must_use]
    pub fn requirement(mut self, requirement: Requirement, quantity: u32) -> Self {
        self.requirements
            .push(RecipeRequirement::new(requirement, quantity));
        self
    }

    /// Sets the output item and quantity per craft.
    #[must_use]
    pub fn output(mut self, item: ItemTypeId, quantity: u32) -> Self {
        self.output = Some(item);
        self.output_quantity = quantity;
        self
    }

    /// Builds the recipe. Returns `None` if no output was set.
    #[must_use]
    pub fn build(self) -> Option<Recipe> {
        Some(Recipe {
            id: self.id,
            name: self.name,
            requirements: self.requirements,
            output: self.output?,
            output_quantity: self.output_quantity,
        })
    }
}

/// All known recipes.
#[derive(Debug, Default)]
pub struct RecipeBook {
    recipes: AHashMap<RecipeId, Recipe>,
}

impl RecipeBook {
    /// Creates an empty recipe book.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers a recipe, returning the one it replaced.
    pub fn register(&mut self, recipe: Recipe) -> Option<Recipe> {
        self.recipes.insert(recipe.id, recipe)
    }

    /// Gets a recipe by ID.
    #[must_use]
    pub fn get(&self, id: RecipeId) -> Option<&Recipe> {
        self.recipes.get(&id)
    }

    /// Finds a recipe by name (case-insensitive) or numeric id.
    #[must_use]
    pub fn find(&self, key: &str) -> Option<&Recipe> {
        if let Ok(raw) = key.parse::<u32>() {
            if let Some(recipe) = self.get(RecipeId::new(raw)) {
                return Some(recipe);
            }
        }
        self.recipes
            .values()
            .find(|recipe| recipe.name.eq_ignore_ascii_case(key))
    }

    /// Number of registered recipes.
    #[must_use]
    pub fn len(&self) -> usize {
        self.recipes.len()
    }

    /// Returns true if no recipes are registered.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.recipes.is_empty()
    }

    /// Iterates all recipes in no particular order.
    pub fn iter(&self) -> impl Iterator<Item = &Recipe> {
        self.recipes.values()
    }

    /// Recipes craftable at least once from the containers, with their counts.
    pub fn available<'a, C: ItemContainer>(
        &'a self,
        containers: &'a [C],
    ) -> impl Iterator<Item = (&'a Recipe, u32)> + 'a {
        self.recipes.values().filter_map(move |recipe| {
            let amount = matcher::amount_craftable(recipe, containers, None);
            (amount > 0).then_some((recipe, amount))
        })
    }
}

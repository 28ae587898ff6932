//! Scenario data loading.
//!
//! A scenario file describes an item catalog, the recipes built from it, and
//! the containers the player can cook from:
//!
//! ```toml
//! [[items]]
//! id = 176
//! name = "Egg"
//!
//! [[recipes]]
//! id = 1
//! name = "Fried Egg"
//! output = 194
//! ingredients = [{ code = 176, quantity = 1 }]
//!
//! [[containers]]
//! name = "backpack"
//! policy = "compact"
//! capacity = 12
//! stacks = [{ item = 176, quantity = 3 }]
//! ```
//!
//! Ingredient codes follow the host convention: negative codes are item
//! categories, everything else is an item id.

use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use larder_common::{ItemTypeId, LarderError, LarderResult, Quality, RecipeId};
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::{debug, info, warn};

use crate::config::KitchenConfig;
use crate::container::{Container, ContainerError, RemovalPolicy};
use crate::item::{ItemCatalog, ItemDef, ItemFactory};
use crate::recipe::{Recipe, RecipeBook, Requirement};

/// Errors that can occur while loading a scenario.
#[derive(Debug, Error)]
pub enum DataLoadError {
    /// File not found.
    #[error("Scenario file not found: {0}")]
    NotFound(PathBuf),

    /// Failed to read file.
    #[error("Failed to read scenario file: {0}")]
    Read(#[from] std::io::Error),

    /// Failed to parse TOML.
    #[error("Failed to parse scenario TOML: {0}")]
    Parse(#[from] toml::de::Error),

    /// An item id is not in the catalog.
    #[error("{context} references unknown {item}")]
    UnknownItem {
        /// Where the reference appeared
        context: String,
        /// The missing item
        item: ItemTypeId,
    },

    /// A requirement code is outside both id ranges.
    #[error("Recipe {recipe} has invalid ingredient code {code}")]
    InvalidCode {
        /// Recipe id
        recipe: u32,
        /// Offending code
        code: i64,
    },

    /// Two entries share an id.
    #[error("Duplicate {kind} id: {id}")]
    DuplicateId {
        /// Entry kind
        kind: &'static str,
        /// Repeated id
        id: u32,
    },

    /// A container could not hold its declared stacks.
    #[error("Container '{name}': {source}")]
    Container {
        /// Container name
        name: String,
        /// Underlying container error
        source: ContainerError,
    },

    /// Any other validation failure.
    #[error("Scenario validation error: {0}")]
    Validation(String),
}

impl From<DataLoadError> for LarderError {
    fn from(err: DataLoadError) -> Self {
        match err {
            DataLoadError::Read(io) => Self::Io(io),
            err @ DataLoadError::NotFound(_) => {
                Self::Io(io::Error::new(io::ErrorKind::NotFound, err.to_string()))
            }
            err @ DataLoadError::Container { .. } => Self::Container(err.to_string()),
            other => Self::Parse(other.to_string()),
        }
    }
}

/// Result type for scenario loading.
pub type DataLoadResult<T> = Result<T, DataLoadError>;

/// One recipe ingredient as written in the file.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct IngredientEntry {
    /// Item id, or a negative category code
    pub code: i64,
    /// Quantity per craft
    pub quantity: u32,
}

/// A recipe as written in the file.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RecipeEntry {
    /// Recipe id
    pub id: u32,
    /// Display name
    pub name: String,
    /// Output item id
    pub output: u32,
    /// Units produced per craft
    #[serde(default = "default_output_quantity")]
    pub output_quantity: u32,
    /// Ingredients in requirement order
    #[serde(default)]
    pub ingredients: Vec<IngredientEntry>,
}

const fn default_output_quantity() -> u32 {
    1
}

/// A stack as written in the file.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StackEntry {
    /// Item id
    pub item: u32,
    /// Quantity
    pub quantity: u32,
    /// Quality tier ordinal
    #[serde(default)]
    pub quality: Quality,
}

/// A container as written in the file.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ContainerEntry {
    /// Display name
    pub name: String,
    /// What happens to a position when its stack runs out
    #[serde(default)]
    pub policy: RemovalPolicy,
    /// Number of stack positions
    #[serde(default = "default_capacity")]
    pub capacity: usize,
    /// Initial stacks
    #[serde(default)]
    pub stacks: Vec<StackEntry>,
}

const fn default_capacity() -> usize {
    36
}

/// Raw scenario file contents.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ScenarioFile {
    /// Item catalog
    #[serde(default)]
    pub items: Vec<ItemDef>,
    /// Recipes
    #[serde(default)]
    pub recipes: Vec<RecipeEntry>,
    /// Containers; the first is the player inventory
    #[serde(default)]
    pub containers: Vec<ContainerEntry>,
}

impl ScenarioFile {
    /// Parses a scenario without validating it.
    pub fn from_toml_str(content: &str) -> DataLoadResult<Self> {
        Ok(toml::from_str(content)?)
    }

    /// Validates references and builds the runtime scenario.
    pub fn build(self) -> DataLoadResult<Scenario> {
        let catalog = build_catalog(self.items)?;

        let mut recipes = RecipeBook::new();
        for entry in self.recipes {
            let id = entry.id;
            let recipe = build_recipe(entry, &catalog)?;
            if recipes.register(recipe).is_some() {
                return Err(DataLoadError::DuplicateId { kind: "recipe", id });
            }
        }

        let containers = self
            .containers
            .into_iter()
            .map(|entry| build_container(entry, &catalog))
            .collect::<DataLoadResult<Vec<_>>>()?;

        debug!(
            "Built scenario: {} items, {} recipes, {} containers",
            catalog.len(),
            recipes.len(),
            containers.len()
        );
        Ok(Scenario {
            catalog,
            recipes,
            containers,
        })
    }
}

/// A loaded, validated scenario.
#[derive(Debug)]
pub struct Scenario {
    /// Item catalog
    pub catalog: ItemCatalog,
    /// Recipe book
    pub recipes: RecipeBook,
    /// Containers; index 0 is the player inventory
    pub containers: Vec<Container>,
}

impl Scenario {
    /// Parses and validates a scenario from a TOML string.
    pub fn from_toml_str(content: &str) -> DataLoadResult<Self> {
        ScenarioFile::from_toml_str(content)?.build()
    }

    /// Loads and validates a scenario file.
    pub fn load(path: impl AsRef<Path>) -> DataLoadResult<Self> {
        let path = path.as_ref();
        if !path.exists() {
            return Err(DataLoadError::NotFound(path.to_path_buf()));
        }
        let content = fs::read_to_string(path)?;
        let scenario = Self::from_toml_str(&content)?;
        info!(
            "Loaded scenario {:?}: {} recipes across {} containers",
            path,
            scenario.recipes.len(),
            scenario.containers.len()
        );
        Ok(scenario)
    }
}

/// A loaded configuration together with the scenario it cooks against.
#[derive(Debug)]
pub struct Kitchen {
    /// Kitchen configuration
    pub config: KitchenConfig,
    /// Items, recipes and containers
    pub scenario: Scenario,
}

/// Loads the configuration and scenario a cooking session needs.
///
/// Without a config path the defaults apply. Both files are validated
/// before anything is returned.
pub fn load_kitchen(config: Option<&Path>, scenario: &Path) -> LarderResult<Kitchen> {
    let config = match config {
        Some(path) => KitchenConfig::load(path)?,
        None => KitchenConfig::default(),
    };
    let scenario = Scenario::load(scenario)?;
    Ok(Kitchen { config, scenario })
}

fn build_catalog(items: Vec<ItemDef>) -> DataLoadResult<ItemCatalog> {
    let mut catalog = ItemCatalog::new();
    for def in items {
        if def.max_stack == 0 {
            return Err(DataLoadError::Validation(format!(
                "item {} has zero max_stack",
                def.id
            )));
        }
        if catalog.contains(def.id) {
            return Err(DataLoadError::DuplicateId {
                kind: "item",
                id: def.id.raw(),
            });
        }
        catalog.register(def);
    }
    Ok(catalog)
}

fn known(
    catalog: &ItemCatalog,
    item: ItemTypeId,
    context: impl FnOnce() -> String,
) -> DataLoadResult<ItemTypeId> {
    if catalog.contains(item) {
        Ok(item)
    } else {
        Err(DataLoadError::UnknownItem {
            context: context(),
            item,
        })
    }
}

fn build_recipe(entry: RecipeEntry, catalog: &ItemCatalog) -> DataLoadResult<Recipe> {
    let output = known(catalog, ItemTypeId::new(entry.output), || {
        format!("Recipe {} output", entry.id)
    })?;
    if entry.ingredients.is_empty() {
        warn!("Recipe {} '{}' has no ingredients", entry.id, entry.name);
    }

    let mut builder = Recipe::builder(RecipeId::new(entry.id), entry.name);
    for ingredient in &entry.ingredients {
        let requirement =
            Requirement::from_code(ingredient.code).ok_or(DataLoadError::InvalidCode {
                recipe: entry.id,
                code: ingredient.code,
            })?;
        if let Requirement::Item(item) = requirement {
            known(catalog, item, || format!("Recipe {} ingredient", entry.id))?;
        }
        builder = builder.requirement(requirement, ingredient.quantity);
    }
    builder
        .output(output, entry.output_quantity)
        .build()
        .ok_or_else(|| DataLoadError::Validation(format!("Recipe {} has no output", entry.id)))
}

fn build_container(entry: ContainerEntry, catalog: &ItemCatalog) -> DataLoadResult<Container> {
    let mut container = Container::new(entry.name.clone(), entry.policy, entry.capacity);
    for stack in entry.stacks {
        let item = known(catalog, ItemTypeId::new(stack.item), || {
            format!("Container '{}'", entry.name)
        })?;
        if stack.quantity == 0 {
            warn!("Skipping empty {} stack in '{}'", item, entry.name);
            continue;
        }
        let created = catalog.create(item, stack.quantity, stack.quality);
        if created.quantity > created.max_stack {
            return Err(DataLoadError::Validation(format!(
                "Container '{}' holds {} x{} above its stack limit of {}",
                entry.name, item, created.quantity, created.max_stack
            )));
        }
        container
            .push(created)
            .map_err(|source| DataLoadError::Container {
                name: entry.name.clone(),
                source,
            })?;
    }
    Ok(container)
}

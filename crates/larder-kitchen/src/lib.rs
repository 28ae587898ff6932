//! # Larder Kitchen
//!
//! Recipe fulfillment and cooking resolution.
//!
//! This crate provides the cooking engine and the types it works on:
//! - Item stacks, catalogs and containers with stable stack handles
//! - Recipes with item, category and custom requirements
//! - Ingredient matching and craftability counting
//! - Ingredient slot staging and auto-fill
//! - Multi-unit crafting with quality tiers, seasoning and burn
//! - Host rule providers and injectable randomness
//! - TOML configuration and scenario loading

#![warn(missing_docs)]
#![warn(clippy::all)]
#![deny(clippy::unwrap_used)]

pub mod config;
pub mod container;
pub mod data;
pub mod item;
pub mod manager;
pub mod matcher;
pub mod providers;
pub mod quality_stacks;
pub mod random;
pub mod recipe;
pub mod slots;

/// Prelude for convenient imports
pub mod prelude {
    pub use crate::config::*;
    pub use crate::container::*;
    pub use crate::data::*;
    pub use crate::item::*;
    pub use crate::manager::*;
    pub use crate::matcher::{
        count_matching, find_first_unit, is_matching_ingredient, matching_ingredients,
        Consumption, ConsumptionPlan, MatchScan, StackRef,
    };
    pub use crate::providers::*;
    pub use crate::quality_stacks::*;
    pub use crate::random::*;
    pub use crate::recipe::*;
    pub use crate::slots::*;
}

pub use prelude::*;

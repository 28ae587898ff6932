//! # Larder Common
//!
//! Common types shared by the Larder cooking crates.
//!
//! This crate provides the foundational vocabulary of the kitchen:
//! - ID types (ItemTypeId, CategoryId, RecipeId, StackHandle)
//! - Quality tiers for produced food
//! - The top-level error type
//! - Prelude for convenient imports

#![warn(missing_docs)]
#![warn(clippy::all)]
#![deny(clippy::unwrap_used)]

pub mod error;
pub mod ids;
pub mod quality;

/// Prelude module for convenient imports
pub mod prelude {
    pub use crate::error::*;
    pub use crate::ids::*;
    pub use crate::quality::*;
}

pub use prelude::*;

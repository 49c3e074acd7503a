//! # whisk-core
//!
//! Core types, traits, and abstractions for Whisk.
//!
//! This crate provides the recipe and note models, the repository and
//! generation traits that other Whisk crates implement, and the validation
//! gate every recipe passes before it is stored.

pub mod error;
pub mod logging;
pub mod models;
pub mod traits;
pub mod validation;

// Re-export commonly used types at crate root
pub use error::{Error, Result};
pub use models::*;
pub use traits::*;
pub use validation::validate_recipe;

//! Core traits for Whisk abstractions.
//!
//! These traits define the interfaces that concrete implementations
//! must satisfy, enabling pluggable backends and testability.

use async_trait::async_trait;
use uuid::Uuid;

use crate::error::Result;
use crate::models::*;

// =============================================================================
// RECIPE REPOSITORY
// =============================================================================

/// Repository for owner-scoped recipe CRUD.
///
/// Every method takes the authenticated owner; a recipe owned by someone
/// else behaves exactly like a missing one.
#[async_trait]
pub trait RecipeRepository: Send + Sync {
    /// Persist a new recipe for `owner`.
    async fn insert(&self, owner: &str, recipe: NewRecipe) -> Result<Recipe>;

    /// Fetch one recipe.
    async fn fetch(&self, owner: &str, id: Uuid) -> Result<Option<Recipe>>;

    /// List recipes, newest first.
    async fn list(&self, owner: &str, filter: &RecipeFilter) -> Result<Vec<Recipe>>;

    /// Write the editable content and favorite flag of an existing recipe.
    ///
    /// Returns `None` if the recipe does not exist for `owner`.
    async fn update(&self, owner: &str, recipe: &Recipe) -> Result<Option<Recipe>>;

    /// Delete a recipe and its notes. Returns whether a row was removed.
    async fn delete(&self, owner: &str, id: Uuid) -> Result<bool>;

    /// Count recipes per category.
    async fn category_counts(&self, owner: &str) -> Result<Vec<CategoryCount>>;
}

// =============================================================================
// NOTE REPOSITORY
// =============================================================================

/// Repository for recipe notes and chat turns.
#[async_trait]
pub trait NoteRepository: Send + Sync {
    /// Persist a note.
    async fn insert(&self, note: NewNote) -> Result<Note>;

    /// List notes for a recipe, oldest first.
    async fn list_for_recipe(&self, owner: &str, recipe_id: Uuid) -> Result<Vec<Note>>;

    /// Delete one note. Returns whether a row was removed.
    async fn delete(&self, owner: &str, id: Uuid) -> Result<bool>;

    /// Delete a recipe's notes, optionally only those of one kind.
    /// Returns the number of deleted notes.
    async fn delete_for_recipe(
        &self,
        owner: &str,
        recipe_id: Uuid,
        kind: Option<NoteKind>,
    ) -> Result<u64>;
}

// =============================================================================
// GENERATION
// =============================================================================

/// Per-call generation settings.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct GenerationOptions {
    /// Sampling temperature; backend default when `None`.
    pub temperature: Option<f32>,
    /// Upper bound on generated tokens.
    pub max_tokens: Option<u32>,
    /// Ask the backend to constrain output to a JSON object.
    pub json: bool,
}

impl GenerationOptions {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn temperature(mut self, temperature: f32) -> Self {
        self.temperature = Some(temperature);
        self
    }

    pub fn max_tokens(mut self, max_tokens: u32) -> Self {
        self.max_tokens = Some(max_tokens);
        self
    }

    pub fn json(mut self) -> Self {
        self.json = true;
        self
    }
}

/// Backend for text generation (opaque text-completion service).
#[async_trait]
pub trait GenerationBackend: Send + Sync {
    /// Generate text given a prompt with backend defaults.
    async fn generate(&self, prompt: &str) -> Result<String> {
        self.generate_with_options(prompt, &GenerationOptions::default())
            .await
    }

    /// Generate text with explicit options.
    async fn generate_with_options(
        &self,
        prompt: &str,
        options: &GenerationOptions,
    ) -> Result<String>;

    /// Get the model name being used.
    fn model_name(&self) -> &str;
}

//! Core data models for Whisk.
//!
//! These types are shared across all Whisk crates and represent the
//! persisted entities (recipes and their notes) plus the drafts and
//! requests that flow into them.

use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::error::Error;

// =============================================================================
// RECIPE TYPES
// =============================================================================

/// How a recipe's content was obtained.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ParsingMethod {
    /// Mapped from an embedded schema.org Recipe record.
    #[serde(rename = "JSON-LD")]
    JsonLd,
    /// Normalized by the text-completion service from reduced page text.
    #[serde(rename = "AI")]
    Ai,
    /// Normalized by the text-completion service from user-supplied text.
    #[serde(rename = "Manual + AI")]
    ManualAi,
}

impl ParsingMethod {
    /// Wire and storage representation.
    pub fn as_str(&self) -> &'static str {
        match self {
            ParsingMethod::JsonLd => "JSON-LD",
            ParsingMethod::Ai => "AI",
            ParsingMethod::ManualAi => "Manual + AI",
        }
    }
}

impl fmt::Display for ParsingMethod {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ParsingMethod {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "JSON-LD" => Ok(ParsingMethod::JsonLd),
            "AI" => Ok(ParsingMethod::Ai),
            "Manual + AI" => Ok(ParsingMethod::ManualAi),
            other => Err(Error::InvalidInput(format!(
                "Unknown parsing method: {}",
                other
            ))),
        }
    }
}

/// Canonical recipe content, independent of ownership and storage.
///
/// Durations are free text ("1 hours and 30 minutes"), not machine-parsed.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct RecipeDraft {
    pub name: String,
    pub image: String,
    pub description: String,
    pub cook_time: String,
    pub prep_time: String,
    pub total_time: String,
    pub category: Vec<String>,
    pub cuisine: Vec<String>,
    pub ingredients: Vec<String>,
    pub instructions: Vec<String>,
    #[serde(rename = "yield")]
    pub recipe_yield: String,
    pub source_url: String,
}

/// A draft ready to be persisted for an owner.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewRecipe {
    pub content: RecipeDraft,
    pub parsing_method: ParsingMethod,
}

/// A persisted recipe.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Recipe {
    pub id: Uuid,
    pub user_id: String,
    #[serde(flatten)]
    pub content: RecipeDraft,
    pub parsing_method: ParsingMethod,
    pub is_favorite: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Partial update sent by the client.
///
/// Identity, ownership, parsing method and timestamps are not part of the
/// request; unknown fields (including `userId`) are ignored.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UpdateRecipeRequest {
    pub name: Option<String>,
    pub image: Option<String>,
    pub description: Option<String>,
    pub cook_time: Option<String>,
    pub prep_time: Option<String>,
    pub total_time: Option<String>,
    pub category: Option<Vec<String>>,
    pub cuisine: Option<Vec<String>>,
    pub ingredients: Option<Vec<String>>,
    pub instructions: Option<Vec<String>>,
    #[serde(rename = "yield")]
    pub recipe_yield: Option<String>,
    pub source_url: Option<String>,
    pub is_favorite: Option<bool>,
}

impl Recipe {
    /// Merge a partial update into this recipe.
    pub fn apply_update(&mut self, update: UpdateRecipeRequest) {
        let c = &mut self.content;
        if let Some(v) = update.name {
            c.name = v.trim().to_string();
        }
        if let Some(v) = update.image {
            c.image = v;
        }
        if let Some(v) = update.description {
            c.description = v.trim().to_string();
        }
        if let Some(v) = update.cook_time {
            c.cook_time = v;
        }
        if let Some(v) = update.prep_time {
            c.prep_time = v;
        }
        if let Some(v) = update.total_time {
            c.total_time = v;
        }
        if let Some(v) = update.category {
            c.category = v;
        }
        if let Some(v) = update.cuisine {
            c.cuisine = v;
        }
        if let Some(v) = update.ingredients {
            c.ingredients = v;
        }
        if let Some(v) = update.instructions {
            c.instructions = v;
        }
        if let Some(v) = update.recipe_yield {
            c.recipe_yield = v;
        }
        if let Some(v) = update.source_url {
            c.source_url = v;
        }
        if let Some(v) = update.is_favorite {
            self.is_favorite = v;
        }
    }
}

/// Filters for listing a user's recipes. All filters are optional and combine with AND.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
pub struct RecipeFilter {
    /// Case-insensitive category membership.
    pub category: Option<String>,
    /// Case-insensitive cuisine membership.
    pub cuisine: Option<String>,
    /// Case-insensitive substring over name, description and ingredients.
    #[serde(rename = "q")]
    pub search: Option<String>,
    pub favorite: Option<bool>,
}

impl RecipeFilter {
    /// Check a recipe against this filter.
    pub fn matches(&self, recipe: &Recipe) -> bool {
        let c = &recipe.content;
        if let Some(category) = non_blank(&self.category) {
            if !c.category.iter().any(|v| v.eq_ignore_ascii_case(category)) {
                return false;
            }
        }
        if let Some(cuisine) = non_blank(&self.cuisine) {
            if !c.cuisine.iter().any(|v| v.eq_ignore_ascii_case(cuisine)) {
                return false;
            }
        }
        if let Some(query) = non_blank(&self.search) {
            let query = query.to_lowercase();
            let hit = c.name.to_lowercase().contains(&query)
                || c.description.to_lowercase().contains(&query)
                || c
                    .ingredients
                    .iter()
                    .any(|i| i.to_lowercase().contains(&query));
            if !hit {
                return false;
            }
        }
        if let Some(favorite) = self.favorite {
            if recipe.is_favorite != favorite {
                return false;
            }
        }
        true
    }
}

fn non_blank(value: &Option<String>) -> Option<&str> {
    value.as_deref().map(str::trim).filter(|v| !v.is_empty())
}

/// Number of recipes carrying a category.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CategoryCount {
    pub category: String,
    pub count: i64,
}

// =============================================================================
// NOTE TYPES
// =============================================================================

/// Kind of a recipe note.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum NoteKind {
    /// A turn in the per-recipe conversation log.
    Chat,
    /// A free-standing annotation.
    Note,
}

impl NoteKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            NoteKind::Chat => "chat",
            NoteKind::Note => "note",
        }
    }
}

impl fmt::Display for NoteKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for NoteKind {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "chat" => Ok(NoteKind::Chat),
            "note" => Ok(NoteKind::Note),
            other => Err(Error::InvalidInput(format!("Unknown note type: {}", other))),
        }
    }
}

/// A persisted note attached to a recipe.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Note {
    pub id: Uuid,
    pub recipe_id: Uuid,
    pub user_id: String,
    pub content: String,
    #[serde(rename = "type")]
    pub kind: NoteKind,
    #[serde(rename = "isFromAI")]
    pub is_from_ai: bool,
    pub timestamp: DateTime<Utc>,
}

/// Request for creating a note.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewNote {
    pub recipe_id: Uuid,
    pub user_id: String,
    pub content: String,
    pub kind: NoteKind,
    pub is_from_ai: bool,
}

//! AI normalization of free text into a recipe draft.

use std::sync::Arc;

use serde_json::{Map, Value};
use tracing::{debug, instrument, warn};

use whisk_core::{GenerationBackend, GenerationOptions, RecipeDraft};
use whisk_inference::json::extract_json_object;

use crate::error::NormalizeError;
use crate::jsonld::{image_url, string_list};

/// Source marker used when text was typed in rather than fetched.
pub const MANUAL_INPUT_SOURCE: &str = "manual-input";

/// Minimum input length (characters) worth sending to the model.
pub const MIN_INPUT_CHARS: usize = 100;

/// Longest excerpt (characters) sent to the model.
pub const MAX_INPUT_CHARS: usize = 12_000;

const TRUNCATION_SUFFIX: &str = "...[content continues]";

pub const DEFAULT_DESCRIPTION: &str = "A delicious recipe";
pub const DEFAULT_CATEGORY: &str = "Main Course";
pub const DEFAULT_CUISINE: &str = "Indian";
pub const DEFAULT_YIELD: &str = "4 servings";
pub const INGREDIENTS_PLACEHOLDER: &str =
    "Ingredients not clearly specified - please check the original recipe";
pub const INSTRUCTIONS_PLACEHOLDER: &str =
    "Instructions not clearly specified - please check the original recipe";

const NORMALIZE_TEMPERATURE: f32 = 0.2;
const NORMALIZE_MAX_TOKENS: u32 = 2048;

/// Whether a draft's ingredients and instructions came from the source.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ContentQuality {
    /// Ingredients and instructions were extracted.
    Complete,
    /// At least one of them is a placeholder.
    Placeholder,
}

/// A draft together with its content-quality flag.
#[derive(Debug, Clone, PartialEq)]
pub struct NormalizedRecipe {
    pub draft: RecipeDraft,
    pub quality: ContentQuality,
}

/// Result of a normalization request.
#[derive(Debug, Clone, PartialEq)]
pub enum NormalizeOutcome {
    /// The model produced a usable recipe.
    Parsed(NormalizedRecipe),
    /// The attempt failed; `recipe` is a stub derived from the source alone.
    Degraded {
        recipe: NormalizedRecipe,
        reason: String,
    },
}

impl NormalizeOutcome {
    pub fn into_parts(self) -> (NormalizedRecipe, Option<String>) {
        match self {
            Self::Parsed(recipe) => (recipe, None),
            Self::Degraded { recipe, reason } => (recipe, Some(reason)),
        }
    }
}

/// Turns page or user text into a recipe draft with a generation backend.
#[derive(Clone)]
pub struct RecipeNormalizer {
    backend: Arc<dyn GenerationBackend>,
}

impl RecipeNormalizer {
    pub fn new(backend: Arc<dyn GenerationBackend>) -> Self {
        Self { backend }
    }

    /// Normalize `text` taken from `source` (a URL or [`MANUAL_INPUT_SOURCE`]).
    ///
    /// Only too-short input is an error. Generation and parse failures yield
    /// [`NormalizeOutcome::Degraded`]. `description_fallback` replaces a
    /// missing description.
    #[instrument(skip(self, text, description_fallback), fields(subsystem = "import", component = "normalizer", op = "normalize", content_len = text.len()))]
    pub async fn normalize(
        &self,
        text: &str,
        source: &str,
        description_fallback: &str,
    ) -> Result<NormalizeOutcome, NormalizeError> {
        if text.chars().count() < MIN_INPUT_CHARS {
            return Err(NormalizeError::InsufficientContent);
        }

        match self.attempt(text, source, description_fallback).await {
            Ok(recipe) => {
                debug!(
                    quality = ?recipe.quality,
                    ingredients = recipe.draft.ingredients.len(),
                    instructions = recipe.draft.instructions.len(),
                    "Normalized recipe"
                );
                Ok(NormalizeOutcome::Parsed(recipe))
            }
            Err(e) => {
                warn!(error = %e, degraded = true, "Normalization failed, using stub recipe");
                Ok(NormalizeOutcome::Degraded {
                    recipe: degraded_stub(source),
                    reason: e.to_string(),
                })
            }
        }
    }

    async fn attempt(
        &self,
        text: &str,
        source: &str,
        description_fallback: &str,
    ) -> Result<NormalizedRecipe, NormalizeError> {
        let prompt = build_prompt(&truncate_input(text), source);
        let options = GenerationOptions::new()
            .temperature(NORMALIZE_TEMPERATURE)
            .max_tokens(NORMALIZE_MAX_TOKENS);

        let raw = self
            .backend
            .generate_with_options(&prompt, &options)
            .await
            .map_err(|e| NormalizeError::Generation(e.to_string()))?;

        let object = extract_json_object(&raw).ok_or(NormalizeError::InvalidJson)?;
        Ok(coerce(&object, source, description_fallback))
    }
}

/// Cut `text` to the input budget, marking the cut.
pub fn truncate_input(text: &str) -> String {
    if text.chars().count() <= MAX_INPUT_CHARS {
        return text.to_string();
    }
    let mut cut: String = text.chars().take(MAX_INPUT_CHARS).collect();
    cut.push_str(TRUNCATION_SUFFIX);
    cut
}

fn build_prompt(content: &str, source: &str) -> String {
    format!(
        r#"Analyze this webpage content and extract recipe information. URL: {source}

Content:
{content}

Extract recipe details and return a JSON object with this structure:
{{
  "name": "Recipe Title",
  "description": "Brief description",
  "image": "image URL as string or empty string",
  "cookTime": "cooking time",
  "prepTime": "prep time",
  "totalTime": "total time",
  "category": ["category1", "category2"],
  "cuisine": ["cuisine1"],
  "ingredients": ["ingredient 1 with quantity", "ingredient 2"],
  "instructions": ["step 1", "step 2", "step 3"],
  "yield": "servings"
}}

IMPORTANT:
- For image field, return ONLY the URL string, not an object
- Extract the actual recipe name from the content
- Find ALL ingredients listed (even if formatting is unclear)
- Extract ALL cooking steps/instructions
- Return valid JSON only, no markdown formatting

JSON:"#
    )
}

/// Host label for defaults: the URL's host, or the source itself.
pub fn host_label(source: &str) -> String {
    url::Url::parse(source)
        .ok()
        .and_then(|u| u.host_str().map(str::to_string))
        .unwrap_or_else(|| source.to_string())
}

fn trimmed(map: &Map<String, Value>, key: &str) -> Option<String> {
    map.get(key)
        .and_then(Value::as_str)
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(str::to_string)
}

fn list_or(map: &Map<String, Value>, key: &str, default: &str) -> Vec<String> {
    let list = string_list(map.get(key));
    if list.is_empty() {
        vec![default.to_string()]
    } else {
        list
    }
}

/// Strings of an array value; anything that is not an array is empty.
fn array_strings(map: &Map<String, Value>, key: &str) -> Vec<String> {
    match map.get(key) {
        Some(value @ Value::Array(_)) => string_list(Some(value)),
        _ => Vec::new(),
    }
}

/// Coerce the model's JSON into the canonical draft shape.
fn coerce(map: &Map<String, Value>, source: &str, description_fallback: &str) -> NormalizedRecipe {
    let ingredients = array_strings(map, "ingredients");
    let instructions = array_strings(map, "instructions");
    let quality = if ingredients.is_empty() || instructions.is_empty() {
        ContentQuality::Placeholder
    } else {
        ContentQuality::Complete
    };

    let recipe_yield = match map.get("yield") {
        Some(Value::Number(n)) => n.to_string(),
        _ => trimmed(map, "yield").unwrap_or_else(|| DEFAULT_YIELD.to_string()),
    };

    let draft = RecipeDraft {
        name: trimmed(map, "name").unwrap_or_else(|| format!("Recipe from {}", host_label(source))),
        description: trimmed(map, "description")
            .unwrap_or_else(|| description_fallback.to_string()),
        image: map.get("image").map(image_url).unwrap_or_default(),
        cook_time: trimmed(map, "cookTime").unwrap_or_default(),
        prep_time: trimmed(map, "prepTime").unwrap_or_default(),
        total_time: trimmed(map, "totalTime").unwrap_or_default(),
        category: list_or(map, "category", DEFAULT_CATEGORY),
        cuisine: list_or(map, "cuisine", DEFAULT_CUISINE),
        ingredients: if ingredients.is_empty() {
            vec![INGREDIENTS_PLACEHOLDER.to_string()]
        } else {
            ingredients
        },
        instructions: if instructions.is_empty() {
            vec![INSTRUCTIONS_PLACEHOLDER.to_string()]
        } else {
            instructions
        },
        recipe_yield,
        source_url: String::new(),
    };

    NormalizedRecipe { draft, quality }
}

/// Deterministic stub built from the source alone.
pub fn degraded_stub(source: &str) -> NormalizedRecipe {
    let host = host_label(source);
    let cuisine = if host.contains("indian") {
        "Indian"
    } else {
        "Unknown"
    };

    NormalizedRecipe {
        draft: RecipeDraft {
            name: format!("Recipe from {}", host),
            description: format!("Recipe from {} - content could not be fully extracted", source),
            category: vec![DEFAULT_CATEGORY.to_string()],
            cuisine: vec![cuisine.to_string()],
            ingredients: vec![
                "Ingredients not available - please visit the original recipe".to_string(),
                format!("Original URL: {}", source),
            ],
            instructions: vec![
                "Instructions not available - please visit the original recipe".to_string(),
                format!("Please visit: {}", source),
            ],
            recipe_yield: DEFAULT_YIELD.to_string(),
            ..Default::default()
        },
        quality: ContentQuality::Placeholder,
    }
}

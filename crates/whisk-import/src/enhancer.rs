//! Second-pass AI call that refines category and cuisine tags.

use std::sync::Arc;

use serde_json::{Map, Value};
use tracing::{debug, instrument, warn};

use whisk_core::{GenerationBackend, GenerationOptions, RecipeDraft};
use whisk_inference::json::extract_json_object;

use crate::normalizer::ContentQuality;

const ENHANCE_TEMPERATURE: f32 = 0.1;

/// Refines `category` and `cuisine` of an already-normalized draft.
///
/// Failures are swallowed: the input draft is returned unchanged.
#[derive(Clone)]
pub struct RecipeEnhancer {
    backend: Arc<dyn GenerationBackend>,
}

impl RecipeEnhancer {
    pub fn new(backend: Arc<dyn GenerationBackend>) -> Self {
        Self { backend }
    }

    #[instrument(skip(self, draft), fields(subsystem = "import", component = "enhancer", op = "enhance", quality = ?quality))]
    pub async fn enhance(&self, draft: RecipeDraft, quality: ContentQuality) -> RecipeDraft {
        if draft.name.trim().is_empty() || quality == ContentQuality::Placeholder {
            debug!("Skipping enhancement, insufficient data");
            return draft;
        }

        let prompt = build_prompt(&draft);
        let options = GenerationOptions::new().temperature(ENHANCE_TEMPERATURE);

        let raw = match self.backend.generate_with_options(&prompt, &options).await {
            Ok(raw) => raw,
            Err(e) => {
                warn!(error = %e, "Enhancement failed, keeping original tags");
                return draft;
            }
        };

        let Some(reply) = extract_json_object(&raw) else {
            warn!(response_len = raw.len(), "Enhancement reply is not JSON, keeping original tags");
            return draft;
        };

        apply(draft, &reply)
    }
}

fn build_prompt(draft: &RecipeDraft) -> String {
    let first_ingredients: Vec<&str> = draft
        .ingredients
        .iter()
        .take(3)
        .map(String::as_str)
        .collect();

    format!(
        r#"Improve categorization for this recipe:

Name: {name}
Current categories: {categories}
Current cuisines: {cuisines}
First 3 ingredients: {ingredients}

Return only JSON:
{{
  "category": ["improved categories"],
  "cuisine": ["improved cuisines"]
}}

Categories: Appetizer, Main Course, Dessert, Breakfast, Snack, Side Dish, Soup, Salad
Cuisines: Indian, Italian, Mexican, Asian, American, Mediterranean, Chinese, etc."#,
        name = draft.name,
        categories = serde_json::to_string(&draft.category).unwrap_or_default(),
        cuisines = serde_json::to_string(&draft.cuisine).unwrap_or_default(),
        ingredients = first_ingredients.join(", "),
    )
}

/// Non-empty string array under `key`, if the reply has one.
fn replacement(reply: &Map<String, Value>, key: &str) -> Option<Vec<String>> {
    let items = reply.get(key)?.as_array()?;
    let values: Vec<String> = items
        .iter()
        .filter_map(Value::as_str)
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(str::to_string)
        .collect();
    (!values.is_empty()).then_some(values)
}

fn apply(mut draft: RecipeDraft, reply: &Map<String, Value>) -> RecipeDraft {
    if let Some(category) = replacement(reply, "category") {
        draft.category = category;
    }
    if let Some(cuisine) = replacement(reply, "cuisine") {
        draft.cuisine = cuisine;
    }
    debug!(category = ?draft.category, cuisine = ?draft.cuisine, "Enhanced tags");
    draft
}

#[cfg(test)]
mod tests {
    use super::*;
    use whisk_inference::mock::MockGenerationBackend;

    fn draft() -> RecipeDraft {
        RecipeDraft {
            name: "Tiramisu".to_string(),
            category: vec!["Main Course".to_string()],
            cuisine: vec!["Indian".to_string()],
            ingredients: vec![
                "mascarpone".to_string(),
                "espresso".to_string(),
                "ladyfingers".to_string(),
                "cocoa".to_string(),
            ],
            instructions: vec!["Layer".to_string()],
            ..Default::default()
        }
    }

    fn enhancer(backend: &MockGenerationBackend) -> RecipeEnhancer {
        RecipeEnhancer::new(Arc::new(backend.clone()))
    }

    #[test]
    fn test_prompt_lists_tags_and_first_three_ingredients() {
        let prompt = build_prompt(&draft());
        assert!(prompt.contains("Name: Tiramisu"));
        assert!(prompt.contains(r#"Current categories: ["Main Course"]"#));
        assert!(prompt.contains("First 3 ingredients: mascarpone, espresso, ladyfingers\n"));
        assert!(!prompt.contains("cocoa"));
    }

    #[tokio::test]
    async fn test_tags_replaced() {
        let backend = MockGenerationBackend::new()
            .with_fixed_response(r#"{"category": ["Dessert"], "cuisine": ["Italian"]}"#);
        let enhanced = enhancer(&backend).enhance(draft(), ContentQuality::Complete).await;
        assert_eq!(enhanced.category, vec!["Dessert"]);
        assert_eq!(enhanced.cuisine, vec!["Italian"]);
        assert_eq!(backend.get_calls()[0].options.temperature, Some(0.1));
    }

    #[tokio::test]
    async fn test_tags_read_from_chatty_reply() {
        let backend = MockGenerationBackend::new().with_fixed_response(
            "Better tags:\n```json\n{\"category\": [\"Dessert\"], \"cuisine\": [\"Italian\"]}\n```",
        );
        let enhanced = enhancer(&backend).enhance(draft(), ContentQuality::Complete).await;
        assert_eq!(enhanced.category, vec!["Dessert"]);
        assert_eq!(enhanced.cuisine, vec!["Italian"]);
    }

    #[tokio::test]
    async fn test_empty_or_non_string_arrays_ignored() {
        let backend = MockGenerationBackend::new()
            .with_fixed_response(r#"{"category": [], "cuisine": [1, 2]}"#);
        let enhanced = enhancer(&backend).enhance(draft(), ContentQuality::Complete).await;
        assert_eq!(enhanced, draft());
    }

    #[tokio::test]
    async fn test_placeholder_quality_skips_call() {
        let backend = MockGenerationBackend::new();
        let enhanced = enhancer(&backend).enhance(draft(), ContentQuality::Placeholder).await;
        assert_eq!(enhanced, draft());
        assert_eq!(backend.generate_call_count(), 0);
    }

    #[tokio::test]
    async fn test_blank_name_skips_call() {
        let backend = MockGenerationBackend::new();
        let mut unnamed = draft();
        unnamed.name = " ".to_string();
        enhancer(&backend).enhance(unnamed, ContentQuality::Complete).await;
        assert_eq!(backend.generate_call_count(), 0);
    }

    #[tokio::test]
    async fn test_failures_return_input_unchanged() {
        let failing = MockGenerationBackend::new().with_failure();
        assert_eq!(
            enhancer(&failing).enhance(draft(), ContentQuality::Complete).await,
            draft()
        );

        let garbage = MockGenerationBackend::new().with_fixed_response("Dessert, probably");
        assert_eq!(
            enhancer(&garbage).enhance(draft(), ContentQuality::Complete).await,
            draft()
        );
    }
}

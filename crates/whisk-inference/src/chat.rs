//! Conversational assistant answering questions about a single recipe.

use std::sync::Arc;

use serde::{Deserialize, Serialize};
use tracing::{debug, instrument, warn};

use whisk_core::{GenerationBackend, GenerationOptions, Recipe};

use crate::json::parse_json_object;

/// Reply text used when the model returns a blank reply or JSON without a
/// `response` field.
pub const MISSING_RESPONSE_FALLBACK: &str = "I couldn't generate a proper response.";

/// Reply text used when the backend call fails.
pub const UNAVAILABLE_FALLBACK: &str =
    "I'm sorry, I couldn't process your question right now. Please try again later.";

const CHAT_TEMPERATURE: f32 = 0.7;
const CHAT_MAX_TOKENS: u32 = 1024;

/// An ingredient substitution proposed by the assistant.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Suggestion {
    pub ingredient: String,
    pub substitutes: Vec<String>,
    pub notes: String,
}

/// Structured assistant reply.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct ChatReply {
    pub response: String,
    pub suggestions: Vec<Suggestion>,
    pub tips: Vec<String>,
}

impl ChatReply {
    fn text(response: impl Into<String>) -> Self {
        Self {
            response: response.into(),
            ..Default::default()
        }
    }
}

/// Recipe chat assistant backed by a generation backend.
#[derive(Clone)]
pub struct RecipeChatAssistant {
    backend: Arc<dyn GenerationBackend>,
}

impl RecipeChatAssistant {
    pub fn new(backend: Arc<dyn GenerationBackend>) -> Self {
        Self { backend }
    }

    /// Answer `message` in the context of `recipe`.
    ///
    /// Never fails: backend errors and malformed output become fallback replies.
    #[instrument(skip(self, recipe, message), fields(subsystem = "inference", component = "chat", op = "reply", recipe_id = %recipe.id, prompt_len))]
    pub async fn reply(&self, recipe: &Recipe, message: &str) -> ChatReply {
        let prompt = build_prompt(recipe, message);
        tracing::Span::current().record("prompt_len", prompt.len());

        let options = GenerationOptions::new()
            .temperature(CHAT_TEMPERATURE)
            .max_tokens(CHAT_MAX_TOKENS)
            .json();

        match self.backend.generate_with_options(&prompt, &options).await {
            Ok(raw) => {
                debug!(response_len = raw.len(), "Chat reply received");
                interpret_reply(&raw)
            }
            Err(e) => {
                warn!(error = %e, "Chat generation failed, using fallback reply");
                ChatReply::text(UNAVAILABLE_FALLBACK)
            }
        }
    }
}

/// Render the recipe as the context block the assistant sees.
pub fn build_context(recipe: &Recipe) -> String {
    let content = &recipe.content;
    let numbered = |items: &[String]| {
        items
            .iter()
            .enumerate()
            .map(|(i, item)| format!("{}. {}", i + 1, item))
            .collect::<Vec<_>>()
            .join("\n")
    };

    format!(
        "Recipe: {}\nDescription: {}\nPrep Time: {}\nCook Time: {}\nTotal Time: {}\nServes: {}\nCategory: {}\nCuisine: {}\n\nIngredients:\n{}\n\nInstructions:\n{}\n",
        content.name,
        content.description,
        content.prep_time,
        content.cook_time,
        content.total_time,
        content.recipe_yield,
        content.category.join(", "),
        content.cuisine.join(", "),
        numbered(&content.ingredients),
        numbered(&content.instructions),
    )
}

fn build_prompt(recipe: &Recipe, message: &str) -> String {
    format!(
        r#"You are a helpful cooking assistant. A user is asking about this specific recipe:

{context}
User question: {message}

Please provide a structured response with:
1. A main response answering their question
2. If they're asking about substitutions, an array of ingredient substitution suggestions
3. Any relevant cooking tips

Respond with a single JSON object of this shape:
{{"response": "string", "suggestions": [{{"ingredient": "string", "substitutes": ["string"], "notes": "string"}}], "tips": ["string"]}}

Be helpful, friendly, and concise."#,
        context = build_context(recipe),
        message = message,
    )
}

/// Turn raw model output into a reply.
fn interpret_reply(raw: &str) -> ChatReply {
    let Some(map) = parse_json_object(raw) else {
        let text = raw.trim();
        if text.is_empty() {
            warn!("Chat reply is empty");
            return ChatReply::text(MISSING_RESPONSE_FALLBACK);
        }
        debug!("Chat reply is not JSON, using raw text");
        return ChatReply::text(text);
    };

    let response = map
        .get("response")
        .and_then(|v| v.as_str())
        .filter(|s| !s.trim().is_empty())
        .unwrap_or(MISSING_RESPONSE_FALLBACK)
        .to_string();

    let suggestions = map
        .get("suggestions")
        .and_then(|v| v.as_array())
        .map(|items| {
            items
                .iter()
                .filter_map(|item| serde_json::from_value::<Suggestion>(item.clone()).ok())
                .filter(|s| !s.ingredient.is_empty())
                .collect()
        })
        .unwrap_or_default();

    let tips = map
        .get("tips")
        .and_then(|v| v.as_array())
        .map(|items| {
            items
                .iter()
                .filter_map(|t| t.as_str())
                .map(str::to_string)
                .collect()
        })
        .unwrap_or_default();

    ChatReply {
        response,
        suggestions,
        tips,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::mock::MockGenerationBackend;
    use chrono::Utc;
    use uuid::Uuid;
    use whisk_core::{ParsingMethod, RecipeDraft};

    fn recipe() -> Recipe {
        let now = Utc::now();
        Recipe {
            id: Uuid::now_v7(),
            user_id: "user-1".to_string(),
            content: RecipeDraft {
                name: "Palak Paneer".to_string(),
                description: "Spinach and cheese curry".to_string(),
                prep_time: "15 minutes".to_string(),
                cook_time: "30 minutes".to_string(),
                recipe_yield: "4 servings".to_string(),
                category: vec!["Main Course".to_string()],
                cuisine: vec!["Indian".to_string(), "Punjabi".to_string()],
                ingredients: vec!["500g spinach".to_string(), "200g paneer".to_string()],
                instructions: vec!["Blanch spinach".to_string(), "Add paneer".to_string()],
                ..Default::default()
            },
            parsing_method: ParsingMethod::JsonLd,
            is_favorite: false,
            created_at: now,
            updated_at: now,
        }
    }

    #[test]
    fn test_context_numbers_lists_and_joins_tags() {
        let context = build_context(&recipe());
        assert!(context.contains("Recipe: Palak Paneer"));
        assert!(context.contains("Serves: 4 servings"));
        assert!(context.contains("Cuisine: Indian, Punjabi"));
        assert!(context.contains("1. 500g spinach\n2. 200g paneer"));
        assert!(context.contains("Instructions:\n1. Blanch spinach"));
    }

    #[test]
    fn test_interpret_structured_reply() {
        let reply = interpret_reply(
            r#"{"response":"Use tofu.","suggestions":[{"ingredient":"paneer","substitutes":["tofu"],"notes":"firm"}],"tips":["Press the tofu"]}"#,
        );
        assert_eq!(reply.response, "Use tofu.");
        assert_eq!(reply.suggestions[0].substitutes, vec!["tofu"]);
        assert_eq!(reply.tips, vec!["Press the tofu"]);
    }

    #[test]
    fn test_interpret_json_without_response() {
        let reply = interpret_reply(r#"{"tips":[]}"#);
        assert_eq!(reply.response, MISSING_RESPONSE_FALLBACK);
    }

    #[test]
    fn test_interpret_plain_text_is_trimmed() {
        let reply = interpret_reply("  Just add more salt.  \n");
        assert_eq!(reply.response, "Just add more salt.");
        assert!(reply.suggestions.is_empty());
    }

    #[test]
    fn test_interpret_blank_reply_uses_fallback() {
        assert_eq!(interpret_reply("").response, MISSING_RESPONSE_FALLBACK);
        assert_eq!(interpret_reply("  \n\t ").response, MISSING_RESPONSE_FALLBACK);
    }

    #[tokio::test]
    async fn test_reply_uses_chat_options_and_question() {
        let backend = MockGenerationBackend::new().with_fixed_response(r#"{"response":"Yes"}"#);
        let assistant = RecipeChatAssistant::new(Arc::new(backend.clone()));

        let reply = assistant.reply(&recipe(), "Can I freeze it?").await;
        assert_eq!(reply.response, "Yes");

        let calls = backend.get_calls();
        assert_eq!(calls.len(), 1);
        assert!(calls[0].prompt.contains("User question: Can I freeze it?"));
        assert!(calls[0].options.json);
        assert_eq!(calls[0].options.max_tokens, Some(1024));
    }

    #[tokio::test]
    async fn test_backend_failure_yields_apology() {
        let assistant = RecipeChatAssistant::new(Arc::new(MockGenerationBackend::new().with_failure()));
        let reply = assistant.reply(&recipe(), "Hello?").await;
        assert_eq!(reply.response, UNAVAILABLE_FALLBACK);
    }
}

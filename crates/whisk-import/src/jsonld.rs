//! Structured-data (JSON-LD `Recipe`) extraction.

use once_cell::sync::Lazy;
use scraper::{Html, Selector};
use serde_json::Value;
use tracing::debug;

use whisk_core::RecipeDraft;

use crate::duration::humanize;

static LD_JSON_SCRIPT: Lazy<Selector> = Lazy::new(|| {
    Selector::parse(r#"script[type="application/ld+json"]"#).expect("Invalid selector")
});

/// Extract a recipe from a page's first JSON-LD block.
///
/// Returns `None` when there is no JSON-LD, it does not describe a recipe,
/// or the recipe has no name.
pub fn extract_from_html(html: &str) -> Option<RecipeDraft> {
    let document = Html::parse_document(html);
    let candidate = find_candidate(&document)?;
    extract_recipe(&candidate)
}

/// Locate the recipe candidate in the first `application/ld+json` script.
pub fn find_candidate(document: &Html) -> Option<Value> {
    let script = document.select(&LD_JSON_SCRIPT).next()?;
    let raw: String = script.text().collect();

    let parsed: Value = match serde_json::from_str(raw.trim()) {
        Ok(value) => value,
        Err(e) => {
            debug!(error = %e, "JSON-LD block is not valid JSON");
            return None;
        }
    };

    if let Value::Array(items) = parsed {
        return items.into_iter().next();
    }
    if let Some(graph) = parsed.get("@graph").and_then(Value::as_array) {
        return graph.iter().find(|entry| is_recipe_type(entry)).cloned();
    }
    parsed.is_object().then_some(parsed)
}

/// Whether `@type` names a recipe: a string containing `Recipe`, or an
/// array containing `"Recipe"`.
pub fn is_recipe_type(value: &Value) -> bool {
    match value.get("@type") {
        Some(Value::String(t)) => t.contains("Recipe"),
        Some(Value::Array(types)) => types.iter().any(|t| t.as_str() == Some("Recipe")),
        _ => false,
    }
}

/// Map a JSON-LD recipe object onto a draft.
pub fn extract_recipe(value: &Value) -> Option<RecipeDraft> {
    if !is_recipe_type(value) {
        debug!("JSON-LD candidate is not a Recipe");
        return None;
    }

    let name = text_field(value, "name").trim().to_string();
    if name.is_empty() {
        debug!("JSON-LD recipe has no name");
        return None;
    }

    let description = text_field(value, "description").trim().to_string();
    let description = if description.is_empty() {
        format!("A recipe for {}", name)
    } else {
        description
    };

    Some(RecipeDraft {
        image: value.get("image").map(image_url).unwrap_or_default(),
        cook_time: humanize(&text_field(value, "cookTime")),
        prep_time: humanize(&text_field(value, "prepTime")),
        total_time: humanize(&text_field(value, "totalTime")),
        category: string_list(value.get("recipeCategory")),
        cuisine: string_list(value.get("recipeCuisine")),
        ingredients: string_list(value.get("recipeIngredient")),
        instructions: instructions(value.get("recipeInstructions")),
        recipe_yield: recipe_yield(value.get("recipeYield")),
        name,
        description,
        source_url: String::new(),
    })
}

/// Collapse the shapes `image` takes in the wild into one URL.
///
/// Accepts a string, an `{url}` object, or an array whose first element is
/// either. Anything else yields an empty string.
pub fn image_url(value: &Value) -> String {
    match value {
        Value::String(url) => url.clone(),
        Value::Array(items) => match items.first() {
            Some(Value::String(url)) => url.clone(),
            Some(first) => url_of(first),
            None => String::new(),
        },
        other => url_of(other),
    }
}

fn url_of(value: &Value) -> String {
    value
        .get("url")
        .and_then(Value::as_str)
        .unwrap_or_default()
        .to_string()
}

fn text_field(value: &Value, key: &str) -> String {
    value
        .get(key)
        .and_then(Value::as_str)
        .unwrap_or_default()
        .to_string()
}

/// A string or array of strings as a list; blanks dropped.
pub(crate) fn string_list(value: Option<&Value>) -> Vec<String> {
    match value {
        Some(Value::String(s)) if !s.trim().is_empty() => vec![s.trim().to_string()],
        Some(Value::Array(items)) => items
            .iter()
            .filter_map(Value::as_str)
            .map(str::trim)
            .filter(|s| !s.is_empty())
            .map(str::to_string)
            .collect(),
        _ => Vec::new(),
    }
}

/// Plain strings and `HowToStep` texts, in order; other shapes dropped.
fn instructions(value: Option<&Value>) -> Vec<String> {
    let steps = match value {
        Some(Value::Array(steps)) => steps.as_slice(),
        Some(Value::String(s)) if !s.trim().is_empty() => return vec![s.trim().to_string()],
        _ => return Vec::new(),
    };

    steps
        .iter()
        .filter_map(|step| match step {
            Value::String(text) => Some(text.trim().to_string()),
            Value::Object(_) if step.get("@type").and_then(Value::as_str) == Some("HowToStep") => {
                step.get("text").and_then(Value::as_str).map(|t| t.trim().to_string())
            }
            _ => None,
        })
        .filter(|text| !text.is_empty())
        .collect()
}

fn recipe_yield(value: Option<&Value>) -> String {
    let value = match value {
        Some(Value::Array(items)) => items.first(),
        other => other,
    };
    match value {
        Some(Value::String(s)) => s.trim().to_string(),
        Some(Value::Number(n)) => n.to_string(),
        _ => String::new(),
    }
}

//! End-to-end pipeline tests with a stub fetcher and the mock generation backend.

use std::sync::Arc;

use async_trait::async_trait;
use whisk_core::ParsingMethod;
use whisk_import::normalizer::MANUAL_INPUT_SOURCE;
use whisk_import::pipeline::{INSUFFICIENT_PAGE_CONTENT, MANUAL_DESCRIPTION};
use whisk_import::{FetchOutcome, ImportError, ImportPipeline, PageFetcher};
use whisk_inference::mock::MockGenerationBackend;

const URL: &str = "https://www.example.com/recipes/rajma";
const NORMALIZE_PROMPT: &str = "Analyze this webpage content";
const ENHANCE_PROMPT: &str = "Improve categorization";

struct StubFetcher(FetchOutcome);

#[async_trait]
impl PageFetcher for StubFetcher {
    async fn fetch(&self, _url: &str) -> FetchOutcome {
        self.0.clone()
    }
}

fn page(html: impl Into<String>) -> Arc<StubFetcher> {
    Arc::new(StubFetcher(FetchOutcome::Page {
        html: html.into(),
        status: 200,
    }))
}

fn pipeline(fetcher: Arc<StubFetcher>, backend: &MockGenerationBackend) -> ImportPipeline {
    ImportPipeline::new(fetcher, Arc::new(backend.clone()))
}

fn json_ld_page(ld: &str) -> String {
    format!(
        r#"<html><head><script type="application/ld+json">{}</script></head><body><p>Rajma</p></body></html>"#,
        ld
    )
}

fn article_page() -> String {
    format!(
        "<html><body><nav>Home | About</nav><article><h1>Rajma Chawal</h1><p>{}</p></article></body></html>",
        "Soak kidney beans overnight, then simmer with onion, tomato and spices. ".repeat(5)
    )
}

const NORMALIZED: &str = r#"```json
{
  "name": "Rajma Chawal",
  "description": "Kidney bean curry with rice",
  "image": {"url": "https://img.example.com/rajma.jpg"},
  "cookTime": "45 minutes",
  "category": ["Main Course"],
  "cuisine": "Indian",
  "ingredients": ["1 cup kidney beans", "1 onion"],
  "instructions": ["Soak beans", "Simmer with spices"],
  "yield": 4
}
```"#;

#[tokio::test]
async fn test_blocked_fetch_skips_ai() {
    let backend = MockGenerationBackend::new();
    let fetcher = Arc::new(StubFetcher(FetchOutcome::blocked("Failed to fetch: HTTP 403")));

    let result = pipeline(fetcher, &backend).import_from_url(URL).await;

    assert_eq!(
        result,
        Err(ImportError::Blocked {
            reason: "Failed to fetch: HTTP 403".to_string()
        })
    );
    assert_eq!(backend.generate_call_count(), 0);
}

#[tokio::test]
async fn test_json_ld_import_is_enhanced() {
    let backend = MockGenerationBackend::new().with_response_when(
        ENHANCE_PROMPT,
        r#"{"category": ["Main Course", "Dinner"], "cuisine": ["Punjabi"]}"#,
    );
    let html = json_ld_page(
        r#"{"@type":"Recipe","name":"  Rajma  ","prepTime":"PT8H","recipeIngredient":["beans"],"recipeInstructions":[{"@type":"HowToStep","text":"Cook"}]}"#,
    );

    let imported = pipeline(page(html), &backend)
        .import_from_url(URL)
        .await
        .unwrap();

    assert_eq!(imported.method, ParsingMethod::JsonLd);
    assert!(!imported.is_degraded());
    assert_eq!(imported.draft.name, "Rajma");
    assert_eq!(imported.draft.description, "A recipe for Rajma");
    assert_eq!(imported.draft.prep_time, "8 hours");
    assert_eq!(imported.draft.source_url, URL);
    assert_eq!(imported.draft.cuisine, vec!["Punjabi"]);

    let calls = backend.get_calls();
    assert_eq!(calls.len(), 1);
    assert!(calls[0].prompt.contains(ENHANCE_PROMPT));
}

#[tokio::test]
async fn test_json_ld_without_instructions_fails_validation() {
    let backend = MockGenerationBackend::new();
    let html = json_ld_page(r#"{"@type":"Recipe","name":"Rajma","recipeIngredient":["beans"]}"#);

    let result = pipeline(page(html), &backend).import_from_url(URL).await;

    assert_eq!(
        result,
        Err(ImportError::Validation(vec![
            "Recipe must have instructions information".to_string()
        ]))
    );
    assert_eq!(backend.generate_call_count(), 0);
}

#[tokio::test]
async fn test_ai_fallback_without_json_ld() {
    let backend = MockGenerationBackend::new()
        .with_response_when(NORMALIZE_PROMPT, NORMALIZED)
        .with_response_when(ENHANCE_PROMPT, r#"{"category": ["Main Course"], "cuisine": ["North Indian"]}"#);

    let imported = pipeline(page(article_page()), &backend)
        .import_from_url(URL)
        .await
        .unwrap();

    assert_eq!(imported.method, ParsingMethod::Ai);
    assert_eq!(imported.draft.name, "Rajma Chawal");
    assert_eq!(imported.draft.image, "https://img.example.com/rajma.jpg");
    assert_eq!(imported.draft.recipe_yield, "4");
    assert_eq!(imported.draft.cuisine, vec!["North Indian"]);
    assert_eq!(imported.draft.source_url, URL);

    let calls = backend.get_calls();
    assert_eq!(calls.len(), 2);
    assert!(calls[0].prompt.contains("Rajma Chawal"));
    assert!(!calls[0].prompt.contains("Home | About"));
}

#[tokio::test]
async fn test_failed_normalization_degrades_without_enhancement() {
    let backend = MockGenerationBackend::new().with_failure_when(NORMALIZE_PROMPT);

    let imported = pipeline(page(article_page()), &backend)
        .import_from_url(URL)
        .await
        .unwrap();

    assert!(imported.is_degraded());
    assert_eq!(imported.method, ParsingMethod::Ai);
    assert_eq!(imported.draft.name, "Recipe from www.example.com");
    assert_eq!(imported.draft.cuisine, vec!["Unknown"]);
    assert!(imported
        .draft
        .ingredients
        .contains(&format!("Original URL: {}", URL)));
    assert_eq!(backend.generate_call_count(), 1);
}

#[tokio::test]
async fn test_thin_page_fails_extraction() {
    let backend = MockGenerationBackend::new();
    let html = "<html><body><article><p>Coming soon</p></article></body></html>";

    let result = pipeline(page(html), &backend).import_from_url(URL).await;

    assert_eq!(
        result,
        Err(ImportError::extraction_failed(INSUFFICIENT_PAGE_CONTENT))
    );
    assert_eq!(backend.generate_call_count(), 0);
}

#[tokio::test]
async fn test_manual_import_uses_manual_defaults() {
    let backend = MockGenerationBackend::new()
        .with_response_when(
            NORMALIZE_PROMPT,
            r#"{"name": "Lemon Rice", "ingredients": ["rice", "lemon"], "instructions": ["Mix"]}"#,
        )
        .with_failure_when(ENHANCE_PROMPT);
    let text = "Lemon rice: cook rice, temper mustard seeds and curry leaves, squeeze lemon. ".repeat(2);

    let imported = pipeline(page(""), &backend)
        .import_from_text(&text, None)
        .await
        .unwrap();

    assert_eq!(imported.method, ParsingMethod::ManualAi);
    assert_eq!(imported.draft.description, MANUAL_DESCRIPTION);
    assert_eq!(imported.draft.source_url, MANUAL_INPUT_SOURCE);
    assert_eq!(imported.draft.category, vec!["Main Course"]);
    assert!(calls_contain(&backend, "URL: manual-input"));
}

#[tokio::test]
async fn test_manual_import_keeps_supplied_url() {
    let backend = MockGenerationBackend::new().with_response_when(
        NORMALIZE_PROMPT,
        r#"{"name": "Lemon Rice", "ingredients": ["rice"], "instructions": ["Mix"]}"#,
    );
    let text = "x".repeat(150);

    let imported = pipeline(page(""), &backend)
        .import_from_text(&text, Some(URL))
        .await
        .unwrap();

    assert_eq!(imported.draft.source_url, URL);
}

#[tokio::test]
async fn test_manual_import_rejects_short_text() {
    let backend = MockGenerationBackend::new();

    let result = pipeline(page(""), &backend)
        .import_from_text("rice and lemon", None)
        .await;

    assert_eq!(
        result,
        Err(ImportError::extraction_failed(
            "Insufficient content to parse recipe"
        ))
    );
    assert_eq!(backend.generate_call_count(), 0);
}

fn calls_contain(backend: &MockGenerationBackend, fragment: &str) -> bool {
    backend.get_calls().iter().any(|c| c.prompt.contains(fragment))
}

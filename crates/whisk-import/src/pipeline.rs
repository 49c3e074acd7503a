//! Import entry points wiring fetch, extraction, normalization and enhancement.

use std::sync::Arc;
use std::time::Instant;

use tracing::{debug, info, instrument, warn};

use whisk_core::{validate_recipe, GenerationBackend, ParsingMethod, RecipeDraft};

use crate::enhancer::RecipeEnhancer;
use crate::error::{ImportError, NormalizeError};
use crate::fetcher::{FetchOutcome, PageFetcher};
use crate::jsonld;
use crate::normalizer::{
    ContentQuality, NormalizeOutcome, RecipeNormalizer, DEFAULT_DESCRIPTION, MANUAL_INPUT_SOURCE,
};
use crate::reducer;

/// Reduced page text shorter than this is not worth normalizing.
pub const MIN_REDUCED_CHARS: usize = 200;

pub const INSUFFICIENT_PAGE_CONTENT: &str = "Insufficient content extracted from webpage";

/// Description used for typed-in recipes that lack one.
pub const MANUAL_DESCRIPTION: &str = "Manually added recipe";

/// A recipe ready to persist.
#[derive(Debug, Clone, PartialEq)]
pub struct ImportedRecipe {
    pub draft: RecipeDraft,
    pub method: ParsingMethod,
    /// Why normalization fell back to a stub, when it did.
    pub degraded: Option<String>,
}

impl ImportedRecipe {
    pub fn is_degraded(&self) -> bool {
        self.degraded.is_some()
    }
}

/// The import pipeline. Holds its collaborators; performs no persistence.
#[derive(Clone)]
pub struct ImportPipeline {
    fetcher: Arc<dyn PageFetcher>,
    normalizer: RecipeNormalizer,
    enhancer: RecipeEnhancer,
}

impl ImportPipeline {
    pub fn new(fetcher: Arc<dyn PageFetcher>, backend: Arc<dyn GenerationBackend>) -> Self {
        Self {
            fetcher,
            normalizer: RecipeNormalizer::new(backend.clone()),
            enhancer: RecipeEnhancer::new(backend),
        }
    }

    /// Import a recipe from a web page.
    ///
    /// JSON-LD is preferred; otherwise the page is reduced to text and
    /// normalized by the model.
    #[instrument(skip(self), fields(subsystem = "import", component = "pipeline", op = "import_url"))]
    pub async fn import_from_url(&self, url: &str) -> Result<ImportedRecipe, ImportError> {
        let start = Instant::now();

        let html = match self.fetcher.fetch(url).await {
            FetchOutcome::Page { html, .. } => html,
            FetchOutcome::Blocked { reason } => {
                warn!(reason = %reason, "Import blocked at fetch");
                return Err(ImportError::Blocked { reason });
            }
        };

        let (draft, quality, method, degraded) = match jsonld::extract_from_html(&html) {
            Some(draft) => {
                debug!(name = %draft.name, "Parsed recipe from JSON-LD");
                let quality = quality_of(&draft);
                (draft, quality, ParsingMethod::JsonLd, None)
            }
            None => {
                debug!("No usable JSON-LD, falling back to AI parsing");
                let text = reducer::reduce(Some(&html));
                if text.chars().count() < MIN_REDUCED_CHARS {
                    return Err(ImportError::extraction_failed(INSUFFICIENT_PAGE_CONTENT));
                }
                let outcome = self.normalize(&text, url, DEFAULT_DESCRIPTION).await?;
                let (recipe, degraded) = outcome.into_parts();
                (recipe.draft, recipe.quality, ParsingMethod::Ai, degraded)
            }
        };

        let imported = self.finish(draft, quality, url, method, degraded).await?;

        info!(
            parsing_method = %imported.method,
            degraded = imported.is_degraded(),
            duration_ms = start.elapsed().as_millis() as u64,
            "Imported recipe from URL"
        );
        Ok(imported)
    }

    /// Import a recipe from user-supplied text, optionally tied to a URL.
    #[instrument(skip(self, text), fields(subsystem = "import", component = "pipeline", op = "import_text", content_len = text.len()))]
    pub async fn import_from_text(
        &self,
        text: &str,
        url: Option<&str>,
    ) -> Result<ImportedRecipe, ImportError> {
        let source = url
            .map(str::trim)
            .filter(|u| !u.is_empty())
            .unwrap_or(MANUAL_INPUT_SOURCE);

        let (recipe, degraded) = self
            .normalize(text, source, MANUAL_DESCRIPTION)
            .await?
            .into_parts();

        let imported = self
            .finish(
                recipe.draft,
                recipe.quality,
                source,
                ParsingMethod::ManualAi,
                degraded,
            )
            .await?;

        info!(
            parsing_method = %imported.method,
            degraded = imported.is_degraded(),
            "Imported recipe from text"
        );
        Ok(imported)
    }

    async fn normalize(
        &self,
        text: &str,
        source: &str,
        description_fallback: &str,
    ) -> Result<NormalizeOutcome, ImportError> {
        self.normalizer
            .normalize(text, source, description_fallback)
            .await
            .map_err(|e: NormalizeError| ImportError::extraction_failed(e.to_string()))
    }

    /// Validate, sanitize and enhance a draft.
    async fn finish(
        &self,
        mut draft: RecipeDraft,
        quality: ContentQuality,
        source: &str,
        method: ParsingMethod,
        degraded: Option<String>,
    ) -> Result<ImportedRecipe, ImportError> {
        let errors = validate_recipe(&draft);
        if !errors.is_empty() {
            warn!(errors = %errors.join(", "), "Imported recipe failed validation");
            return Err(ImportError::Validation(errors));
        }

        draft.name = draft.name.trim().to_string();
        draft.description = draft.description.trim().to_string();
        if draft.description.is_empty() {
            draft.description = format!("A recipe for {}", draft.name);
        }
        draft.source_url = source.to_string();

        let draft = self.enhancer.enhance(draft, quality).await;
        Ok(ImportedRecipe {
            draft,
            method,
            degraded,
        })
    }
}

/// JSON-LD drafts are complete unless a required list is missing.
fn quality_of(draft: &RecipeDraft) -> ContentQuality {
    if draft.ingredients.is_empty() || draft.instructions.is_empty() {
        ContentQuality::Placeholder
    } else {
        ContentQuality::Complete
    }
}

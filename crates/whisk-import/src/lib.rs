//! # whisk-import
//!
//! Recipe import pipeline for Whisk.
//!
//! A URL import fetches the page, prefers embedded JSON-LD, and otherwise
//! reduces the page to text and asks a generation backend to normalize it.
//! Every result passes the validation gate before an optional second AI
//! pass refines its category and cuisine tags.
//!
//! ```no_run
//! use std::sync::Arc;
//! use whisk_import::{HttpFetcher, ImportPipeline};
//! use whisk_inference::{backend_from_env, InferenceProvider};
//!
//! # async fn run() -> Result<(), Box<dyn std::error::Error>> {
//! let fetcher = Arc::new(HttpFetcher::from_env()?);
//! let backend = backend_from_env(InferenceProvider::from_env()?)?;
//! let pipeline = ImportPipeline::new(fetcher, backend);
//!
//! let imported = pipeline
//!     .import_from_url("https://example.com/recipes/dal")
//!     .await?;
//! println!("{} via {}", imported.draft.name, imported.method);
//! # Ok(())
//! # }
//! ```

pub mod duration;
pub mod enhancer;
pub mod error;
pub mod fetcher;
pub mod jsonld;
pub mod normalizer;
pub mod pipeline;
pub mod reducer;

pub use enhancer::RecipeEnhancer;
pub use error::{FetchError, ImportError, NormalizeError};
pub use fetcher::{detect_block, FetchOutcome, HttpFetcher, PageFetcher};
pub use normalizer::{ContentQuality, NormalizeOutcome, NormalizedRecipe, RecipeNormalizer};
pub use pipeline::{ImportPipeline, ImportedRecipe};

//! # whisk-api
//!
//! HTTP API for Whisk: recipe import and CRUD, per-recipe notes, and the
//! recipe chat assistant. The binary in `main.rs` wires configuration,
//! storage and backends into [`build_router`].

pub mod auth;
pub mod config;
pub mod error;
pub mod handlers;
pub mod middleware;

use std::sync::Arc;
use std::time::Duration;

use axum::{
    http::{header, Method},
    routing::{delete, get, post},
    Router,
};
use tower_http::{
    catch_panic::CatchPanicLayer,
    cors::{AllowOrigin, CorsLayer},
    limit::RequestBodyLimitLayer,
    request_id::{MakeRequestId, PropagateRequestIdLayer, RequestId, SetRequestIdLayer},
    trace::TraceLayer,
};
use uuid::Uuid;

use whisk_core::{GenerationBackend, NoteRepository, RecipeRepository};
use whisk_import::{ImportPipeline, PageFetcher};
use whisk_inference::RecipeChatAssistant;

pub use auth::{RequireAuth, TokenVerifier};
pub use config::ApiConfig;
pub use error::ApiError;
use handlers::{chat, recipes, system};
use middleware::{rate_limit_middleware, GlobalRateLimiter};

/// Generates time-ordered UUIDv7 request correlation IDs.
#[derive(Clone, Default)]
pub struct MakeRequestUuidV7;

impl MakeRequestId for MakeRequestUuidV7 {
    fn make_request_id<B>(&mut self, _request: &axum::http::Request<B>) -> Option<RequestId> {
        let id = Uuid::now_v7().to_string().parse().ok()?;
        Some(RequestId::new(id))
    }
}

/// Application state shared across handlers.
#[derive(Clone)]
pub struct AppState {
    pub recipes: Arc<dyn RecipeRepository>,
    pub notes: Arc<dyn NoteRepository>,
    pub pipeline: ImportPipeline,
    pub assistant: RecipeChatAssistant,
    pub verifier: Arc<dyn TokenVerifier>,
    /// Global rate limiter (None if rate limiting is disabled).
    pub rate_limiter: Option<Arc<GlobalRateLimiter>>,
}

impl AppState {
    /// Assemble state; the import pipeline and the chat assistant share `backend`.
    pub fn new(
        recipes: Arc<dyn RecipeRepository>,
        notes: Arc<dyn NoteRepository>,
        fetcher: Arc<dyn PageFetcher>,
        backend: Arc<dyn GenerationBackend>,
        verifier: Arc<dyn TokenVerifier>,
    ) -> Self {
        Self {
            recipes,
            notes,
            pipeline: ImportPipeline::new(fetcher, backend.clone()),
            assistant: RecipeChatAssistant::new(backend),
            verifier,
            rate_limiter: None,
        }
    }

    pub fn with_rate_limiter(mut self, limiter: Option<Arc<GlobalRateLimiter>>) -> Self {
        self.rate_limiter = limiter;
        self
    }
}

fn api_routes() -> Router<AppState> {
    Router::new()
        .route("/recipes", get(recipes::list_recipes))
        .route("/recipes/categories", get(recipes::list_categories))
        .route("/recipes/parse", post(recipes::parse_recipe))
        .route("/recipes/manual", post(recipes::manual_recipe))
        .route(
            "/recipes/:id",
            get(recipes::get_recipe)
                .put(recipes::update_recipe)
                .delete(recipes::delete_recipe),
        )
        .route(
            "/chat/recipes/:recipe_id/notes",
            get(chat::list_notes)
                .post(chat::create_note)
                .delete(chat::clear_notes),
        )
        .route(
            "/chat/recipes/:recipe_id/chat",
            post(chat::chat).delete(chat::clear_chat),
        )
        .route("/chat/notes/:note_id", delete(chat::delete_note))
}

/// Build the full application router with its middleware stack.
pub fn build_router(state: AppState, config: &ApiConfig) -> Router {
    let cors = CorsLayer::new()
        .allow_methods([
            Method::GET,
            Method::POST,
            Method::PUT,
            Method::DELETE,
            Method::OPTIONS,
        ])
        .allow_headers([header::AUTHORIZATION, header::CONTENT_TYPE, header::ACCEPT])
        .max_age(Duration::from_secs(3600));
    // Credentials cannot be combined with a wildcard origin.
    let cors = if config.allows_any_origin() {
        cors.allow_origin(AllowOrigin::any())
    } else {
        cors.allow_origin(AllowOrigin::list(config.cors_origins()))
            .allow_credentials(true)
    };

    Router::new()
        .route("/health", get(system::health_check))
        .nest("/api", api_routes())
        .layer(axum::middleware::from_fn_with_state(
            state.clone(),
            rate_limit_middleware,
        ))
        .layer(TraceLayer::new_for_http())
        .layer(PropagateRequestIdLayer::x_request_id())
        .layer(SetRequestIdLayer::x_request_id(MakeRequestUuidV7))
        .layer(cors)
        .layer(CatchPanicLayer::new())
        .layer(RequestBodyLimitLayer::new(config.max_body_bytes))
        .with_state(state)
}

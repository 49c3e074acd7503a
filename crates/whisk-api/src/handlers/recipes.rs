//! Recipe HTTP handlers.
//!
//! Every handler is scoped to the authenticated user; another user's recipe
//! is indistinguishable from a missing one.

use axum::{
    extract::{Path, Query, State},
    http::{HeaderName, HeaderValue, StatusCode},
    response::{IntoResponse, Response},
    Json,
};
use serde::Deserialize;
use tracing::info;
use uuid::Uuid;

use whisk_core::{
    validate_recipe, CategoryCount, NewRecipe, Recipe, RecipeFilter, UpdateRecipeRequest,
};
use whisk_import::ImportedRecipe;

use crate::auth::RequireAuth;
use crate::error::ApiError;
use crate::AppState;

/// Set on import responses whose recipe is a degraded stub.
pub static DEGRADED_HEADER: HeaderName = HeaderName::from_static("x-whisk-degraded");

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub struct ParseRecipeBody {
    pub url: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct ManualRecipeBody {
    pub recipe_text: Option<String>,
    pub url: Option<String>,
}

/// Parse a path identifier, rejecting malformed ones with 400.
pub(crate) fn parse_id(raw: &str, what: &str) -> Result<Uuid, ApiError> {
    Uuid::parse_str(raw).map_err(|_| ApiError::BadRequest(format!("Invalid {} id", what)))
}

fn required(value: Option<String>, message: &str) -> Result<String, ApiError> {
    value
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
        .ok_or_else(|| ApiError::BadRequest(message.to_string()))
}

/// GET /api/recipes
pub async fn list_recipes(
    State(state): State<AppState>,
    auth: RequireAuth,
    Query(filter): Query<RecipeFilter>,
) -> Result<Json<Vec<Recipe>>, ApiError> {
    let recipes = state.recipes.list(&auth.user_id, &filter).await?;
    Ok(Json(recipes))
}

/// GET /api/recipes/categories
pub async fn list_categories(
    State(state): State<AppState>,
    auth: RequireAuth,
) -> Result<Json<Vec<CategoryCount>>, ApiError> {
    Ok(Json(state.recipes.category_counts(&auth.user_id).await?))
}

/// GET /api/recipes/:id
pub async fn get_recipe(
    State(state): State<AppState>,
    auth: RequireAuth,
    Path(id): Path<String>,
) -> Result<Json<Recipe>, ApiError> {
    let id = parse_id(&id, "recipe")?;
    state
        .recipes
        .fetch(&auth.user_id, id)
        .await?
        .map(Json)
        .ok_or_else(ApiError::recipe_not_found)
}

/// POST /api/recipes/parse
pub async fn parse_recipe(
    State(state): State<AppState>,
    auth: RequireAuth,
    Json(body): Json<ParseRecipeBody>,
) -> Result<Response, ApiError> {
    let url = required(body.url, "URL is required")?;
    info!(user_id = %auth.user_id, url = %url, "Importing recipe from URL");

    let imported = state
        .pipeline
        .import_from_url(&url)
        .await
        .map_err(|e| ApiError::from_import(e, &url))?;

    save_imported(&state, &auth, imported).await
}

/// POST /api/recipes/manual
pub async fn manual_recipe(
    State(state): State<AppState>,
    auth: RequireAuth,
    Json(body): Json<ManualRecipeBody>,
) -> Result<Response, ApiError> {
    let text = required(body.recipe_text, "Recipe text is required")?;
    let url = body.url.filter(|u| !u.trim().is_empty());
    info!(user_id = %auth.user_id, content_len = text.len(), "Importing recipe from text");

    let imported = state
        .pipeline
        .import_from_text(&text, url.as_deref())
        .await
        .map_err(|e| ApiError::from_import(e, url.as_deref().unwrap_or_default()))?;

    save_imported(&state, &auth, imported).await
}

async fn save_imported(
    state: &AppState,
    auth: &RequireAuth,
    imported: ImportedRecipe,
) -> Result<Response, ApiError> {
    let degraded = imported.is_degraded();
    let recipe = state
        .recipes
        .insert(
            &auth.user_id,
            NewRecipe {
                content: imported.draft,
                parsing_method: imported.method,
            },
        )
        .await?;

    info!(
        recipe_id = %recipe.id,
        parsing_method = %recipe.parsing_method,
        degraded,
        "Recipe saved"
    );

    let mut response = (StatusCode::CREATED, Json(recipe)).into_response();
    if degraded {
        response
            .headers_mut()
            .insert(DEGRADED_HEADER.clone(), HeaderValue::from_static("true"));
    }
    Ok(response)
}

/// PUT /api/recipes/:id
pub async fn update_recipe(
    State(state): State<AppState>,
    auth: RequireAuth,
    Path(id): Path<String>,
    Json(update): Json<UpdateRecipeRequest>,
) -> Result<Json<Recipe>, ApiError> {
    let id = parse_id(&id, "recipe")?;
    let mut recipe = state
        .recipes
        .fetch(&auth.user_id, id)
        .await?
        .ok_or_else(ApiError::recipe_not_found)?;

    recipe.apply_update(update);
    let errors = validate_recipe(&recipe.content);
    if !errors.is_empty() {
        return Err(ApiError::Validation(errors));
    }

    state
        .recipes
        .update(&auth.user_id, &recipe)
        .await?
        .map(Json)
        .ok_or_else(ApiError::recipe_not_found)
}

/// DELETE /api/recipes/:id
pub async fn delete_recipe(
    State(state): State<AppState>,
    auth: RequireAuth,
    Path(id): Path<String>,
) -> Result<StatusCode, ApiError> {
    let id = parse_id(&id, "recipe")?;
    if state.recipes.delete(&auth.user_id, id).await? {
        info!(recipe_id = %id, "Recipe deleted");
        Ok(StatusCode::NO_CONTENT)
    } else {
        Err(ApiError::recipe_not_found())
    }
}

//! Recipe notes and AI chat handlers.

use std::str::FromStr;

use axum::{
    extract::{Path, State},
    http::StatusCode,
    Json,
};
use serde::{Deserialize, Serialize};
use serde_json::json;
use tracing::info;
use uuid::Uuid;

use whisk_core::{NewNote, Note, NoteKind, Recipe};
use whisk_inference::Suggestion;

use crate::auth::RequireAuth;
use crate::error::ApiError;
use crate::handlers::recipes::parse_id;
use crate::AppState;

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub struct CreateNoteBody {
    pub content: Option<String>,
    #[serde(rename = "type")]
    pub kind: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub struct ChatBody {
    pub message: Option<String>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ChatResponse {
    pub user_message: Note,
    pub ai_response: Note,
    pub suggestions: Vec<Suggestion>,
    pub tips: Vec<String>,
}

/// The caller's recipe, or 404.
async fn owned_recipe(state: &AppState, owner: &str, raw_id: &str) -> Result<Recipe, ApiError> {
    let id = parse_id(raw_id, "recipe")?;
    state
        .recipes
        .fetch(owner, id)
        .await?
        .ok_or_else(ApiError::recipe_not_found)
}

fn non_blank(value: Option<String>) -> Option<String> {
    value.filter(|v| !v.trim().is_empty())
}

/// GET /api/chat/recipes/:recipeId/notes
pub async fn list_notes(
    State(state): State<AppState>,
    auth: RequireAuth,
    Path(recipe_id): Path<String>,
) -> Result<Json<Vec<Note>>, ApiError> {
    let recipe = owned_recipe(&state, &auth.user_id, &recipe_id).await?;
    Ok(Json(
        state
            .notes
            .list_for_recipe(&auth.user_id, recipe.id)
            .await?,
    ))
}

/// POST /api/chat/recipes/:recipeId/notes
pub async fn create_note(
    State(state): State<AppState>,
    auth: RequireAuth,
    Path(recipe_id): Path<String>,
    Json(body): Json<CreateNoteBody>,
) -> Result<(StatusCode, Json<Note>), ApiError> {
    let (Some(content), Some(kind)) = (non_blank(body.content), non_blank(body.kind)) else {
        return Err(ApiError::BadRequest(
            "Content and type are required".to_string(),
        ));
    };
    let kind = NoteKind::from_str(kind.trim())?;
    let recipe = owned_recipe(&state, &auth.user_id, &recipe_id).await?;

    let note = state
        .notes
        .insert(NewNote {
            recipe_id: recipe.id,
            user_id: auth.user_id.clone(),
            content,
            kind,
            is_from_ai: false,
        })
        .await?;
    info!(recipe_id = %recipe.id, kind = %kind, "Note saved");
    Ok((StatusCode::CREATED, Json(note)))
}

/// DELETE /api/chat/recipes/:recipeId/chat
pub async fn clear_chat(
    State(state): State<AppState>,
    auth: RequireAuth,
    Path(recipe_id): Path<String>,
) -> Result<Json<serde_json::Value>, ApiError> {
    let recipe = owned_recipe(&state, &auth.user_id, &recipe_id).await?;
    let deleted = state
        .notes
        .delete_for_recipe(&auth.user_id, recipe.id, Some(NoteKind::Chat))
        .await?;
    info!(recipe_id = %recipe.id, deleted, "Chat history cleared");
    Ok(Json(json!({
        "message": format!("Cleared {} chat messages", deleted),
        "deletedCount": deleted,
    })))
}

/// DELETE /api/chat/recipes/:recipeId/notes
pub async fn clear_notes(
    State(state): State<AppState>,
    auth: RequireAuth,
    Path(recipe_id): Path<String>,
) -> Result<Json<serde_json::Value>, ApiError> {
    let recipe = owned_recipe(&state, &auth.user_id, &recipe_id).await?;
    let deleted = state
        .notes
        .delete_for_recipe(&auth.user_id, recipe.id, None)
        .await?;
    info!(recipe_id = %recipe.id, deleted, "Notes cleared");
    Ok(Json(json!({
        "message": format!("Cleared {} notes", deleted),
        "deletedCount": deleted,
    })))
}

/// POST /api/chat/recipes/:recipeId/chat
///
/// Persists the user turn, asks the assistant and persists its answer.
pub async fn chat(
    State(state): State<AppState>,
    auth: RequireAuth,
    Path(recipe_id): Path<String>,
    Json(body): Json<ChatBody>,
) -> Result<Json<ChatResponse>, ApiError> {
    let message =
        non_blank(body.message).ok_or_else(|| ApiError::BadRequest("Message is required".to_string()))?;
    let recipe = owned_recipe(&state, &auth.user_id, &recipe_id).await?;

    let user_message = state
        .notes
        .insert(chat_turn(&recipe, &auth, message.clone(), false))
        .await?;

    let reply = state.assistant.reply(&recipe, &message).await;

    let ai_response = state
        .notes
        .insert(chat_turn(&recipe, &auth, reply.response, true))
        .await?;

    info!(
        recipe_id = %recipe.id,
        suggestions = reply.suggestions.len(),
        tips = reply.tips.len(),
        "Chat turn saved"
    );

    Ok(Json(ChatResponse {
        user_message,
        ai_response,
        suggestions: reply.suggestions,
        tips: reply.tips,
    }))
}

fn chat_turn(recipe: &Recipe, auth: &RequireAuth, content: String, is_from_ai: bool) -> NewNote {
    NewNote {
        recipe_id: recipe.id,
        user_id: auth.user_id.clone(),
        content,
        kind: NoteKind::Chat,
        is_from_ai,
    }
}

/// DELETE /api/chat/notes/:noteId
pub async fn delete_note(
    State(state): State<AppState>,
    auth: RequireAuth,
    Path(note_id): Path<String>,
) -> Result<StatusCode, ApiError> {
    let id: Uuid = parse_id(&note_id, "note")?;
    if state.notes.delete(&auth.user_id, id).await? {
        Ok(StatusCode::NO_CONTENT)
    } else {
        Err(ApiError::NotFound("Note not found".to_string()))
    }
}

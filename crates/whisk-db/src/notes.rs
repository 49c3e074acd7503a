//! Note repository implementation.

use async_trait::async_trait;
use chrono::Utc;
use sqlx::postgres::PgRow;
use sqlx::{Pool, Postgres, Row};
use uuid::Uuid;

use whisk_core::{Error, NewNote, Note, NoteKind, NoteRepository, Result};

/// PostgreSQL implementation of NoteRepository.
#[derive(Clone)]
pub struct PgNoteRepository {
    pool: Pool<Postgres>,
}

impl PgNoteRepository {
    /// Create a new PgNoteRepository with the given connection pool.
    pub fn new(pool: Pool<Postgres>) -> Self {
        Self { pool }
    }
}

fn note_from_row(row: &PgRow) -> Result<Note> {
    let kind: String = row.get("kind");
    Ok(Note {
        id: row.get("id"),
        recipe_id: row.get("recipe_id"),
        user_id: row.get("user_id"),
        content: row.get("content"),
        kind: kind.parse::<NoteKind>()?,
        is_from_ai: row.get("is_from_ai"),
        timestamp: row.get("created_at_utc"),
    })
}

#[async_trait]
impl NoteRepository for PgNoteRepository {
    async fn insert(&self, note: NewNote) -> Result<Note> {
        let row = sqlx::query(
            "INSERT INTO recipe_note (id, recipe_id, user_id, content, kind, is_from_ai, created_at_utc) \
             VALUES ($1, $2, $3, $4, $5, $6, $7) \
             RETURNING id, recipe_id, user_id, content, kind, is_from_ai, created_at_utc",
        )
        .bind(Uuid::now_v7())
        .bind(note.recipe_id)
        .bind(&note.user_id)
        .bind(&note.content)
        .bind(note.kind.as_str())
        .bind(note.is_from_ai)
        .bind(Utc::now())
        .fetch_one(&self.pool)
        .await
        .map_err(Error::Database)?;
        note_from_row(&row)
    }

    async fn list_for_recipe(&self, owner: &str, recipe_id: Uuid) -> Result<Vec<Note>> {
        let rows = sqlx::query(
            "SELECT id, recipe_id, user_id, content, kind, is_from_ai, created_at_utc \
             FROM recipe_note WHERE recipe_id = $1 AND user_id = $2 \
             ORDER BY created_at_utc ASC, id ASC",
        )
        .bind(recipe_id)
        .bind(owner)
        .fetch_all(&self.pool)
        .await
        .map_err(Error::Database)?;
        rows.iter().map(note_from_row).collect()
    }

    async fn delete(&self, owner: &str, id: Uuid) -> Result<bool> {
        let result = sqlx::query("DELETE FROM recipe_note WHERE id = $1 AND user_id = $2")
            .bind(id)
            .bind(owner)
            .execute(&self.pool)
            .await
            .map_err(Error::Database)?;
        Ok(result.rows_affected() > 0)
    }

    async fn delete_for_recipe(
        &self,
        owner: &str,
        recipe_id: Uuid,
        kind: Option<NoteKind>,
    ) -> Result<u64> {
        let result = match kind {
            Some(kind) => {
                sqlx::query(
                    "DELETE FROM recipe_note WHERE recipe_id = $1 AND user_id = $2 AND kind = $3",
                )
                .bind(recipe_id)
                .bind(owner)
                .bind(kind.as_str())
                .execute(&self.pool)
                .await
            }
            None => {
                sqlx::query("DELETE FROM recipe_note WHERE recipe_id = $1 AND user_id = $2")
                    .bind(recipe_id)
                    .bind(owner)
                    .execute(&self.pool)
                    .await
            }
        }
        .map_err(Error::Database)?;
        Ok(result.rows_affected())
    }
}

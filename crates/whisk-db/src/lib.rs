//! # whisk-db
//!
//! PostgreSQL database layer for Whisk.
//!
//! This crate provides:
//! - Connection pool management
//! - Owner-scoped recipe and note repositories
//! - Schema migrations (feature `migrations`)
//! - In-memory repositories implementing the same traits
//!
//! ## Example
//!
//! ```rust,ignore
//! use whisk_db::Database;
//! use whisk_core::{RecipeFilter, RecipeRepository};
//!
//! let db = Database::connect("postgres://localhost/whisk").await?;
//! let recipes = db.recipes.list("user_123", &RecipeFilter::default()).await?;
//! ```

pub mod memory;
pub mod notes;
pub mod pool;
pub mod recipes;

// Always compiled so integration tests (in tests/) can use the fixtures.
pub mod test_fixtures;

pub use memory::{MemoryNoteRepository, MemoryRecipeRepository, MemoryStore};
pub use notes::PgNoteRepository;
pub use pool::{create_pool, PoolConfig};
pub use recipes::PgRecipeRepository;

// Re-export core types
pub use whisk_core::{Error, NoteRepository, RecipeRepository, Result};

/// Escape LIKE/ILIKE wildcard characters (`%`, `_`, `\`) in user input.
pub fn escape_like(input: &str) -> String {
    input
        .replace('\\', "\\\\")
        .replace('%', "\\%")
        .replace('_', "\\_")
}

/// Combined database context with all repositories.
#[derive(Clone)]
pub struct Database {
    /// The underlying connection pool.
    pub pool: sqlx::Pool<sqlx::Postgres>,
    /// Recipe repository.
    pub recipes: PgRecipeRepository,
    /// Note and chat repository.
    pub notes: PgNoteRepository,
}

impl Database {
    /// Create a new Database instance from a connection pool.
    pub fn new(pool: sqlx::Pool<sqlx::Postgres>) -> Self {
        Self {
            recipes: PgRecipeRepository::new(pool.clone()),
            notes: PgNoteRepository::new(pool.clone()),
            pool,
        }
    }

    /// Connect with pool settings read from the environment.
    pub async fn connect(url: &str) -> Result<Self> {
        Self::connect_with_config(url, PoolConfig::from_env()).await
    }

    /// Connect with custom pool settings.
    pub async fn connect_with_config(url: &str, config: PoolConfig) -> Result<Self> {
        let pool = create_pool(url, config).await?;
        Ok(Self::new(pool))
    }

    /// Run pending migrations.
    #[cfg(feature = "migrations")]
    pub async fn migrate(&self) -> Result<()> {
        sqlx::migrate!("../../migrations")
            .run(&self.pool)
            .await
            .map_err(|e| Error::Database(sqlx::Error::Migrate(Box::new(e))))?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_escape_like_wildcards() {
        assert_eq!(escape_like("50%"), "50\\%");
        assert_eq!(escape_like("a_b"), "a\\_b");
        assert_eq!(escape_like("c:\\"), "c:\\\\");
        assert_eq!(escape_like("plain"), "plain");
    }
}

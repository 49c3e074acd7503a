//! Recipe repository implementation.

use async_trait::async_trait;
use chrono::Utc;
use sqlx::postgres::PgRow;
use sqlx::{Pool, Postgres, Row};
use tracing::debug;
use uuid::Uuid;

use whisk_core::{
    CategoryCount, Error, NewRecipe, ParsingMethod, Recipe, RecipeDraft, RecipeFilter,
    RecipeRepository, Result,
};

use crate::escape_like;

const RECIPE_COLUMNS: &str = "id, user_id, name, image, description, cook_time, prep_time, \
     total_time, category, cuisine, ingredients, instructions, yield_text, source_url, \
     parsing_method, is_favorite, created_at_utc, updated_at_utc";

/// PostgreSQL implementation of RecipeRepository.
#[derive(Clone)]
pub struct PgRecipeRepository {
    pool: Pool<Postgres>,
}

impl PgRecipeRepository {
    /// Create a new PgRecipeRepository with the given connection pool.
    pub fn new(pool: Pool<Postgres>) -> Self {
        Self { pool }
    }
}

fn recipe_from_row(row: &PgRow) -> Result<Recipe> {
    let method: String = row.get("parsing_method");
    Ok(Recipe {
        id: row.get("id"),
        user_id: row.get("user_id"),
        content: RecipeDraft {
            name: row.get("name"),
            image: row.get("image"),
            description: row.get("description"),
            cook_time: row.get("cook_time"),
            prep_time: row.get("prep_time"),
            total_time: row.get("total_time"),
            category: row.get("category"),
            cuisine: row.get("cuisine"),
            ingredients: row.get("ingredients"),
            instructions: row.get("instructions"),
            recipe_yield: row.get("yield_text"),
            source_url: row.get("source_url"),
        },
        parsing_method: method.parse::<ParsingMethod>()?,
        is_favorite: row.get("is_favorite"),
        created_at: row.get("created_at_utc"),
        updated_at: row.get("updated_at_utc"),
    })
}

/// Build the WHERE clause for a list query. `$1` is always the owner.
///
/// Returns the clause and the bind values in parameter order.
fn build_list_query(filter: &RecipeFilter) -> (String, Vec<String>, Option<bool>) {
    let mut sql = format!("SELECT {} FROM recipe WHERE user_id = $1 ", RECIPE_COLUMNS);
    let mut binds = Vec::new();
    let mut idx = 2;

    if let Some(category) = trimmed(&filter.category) {
        sql.push_str(&format!(
            "AND EXISTS (SELECT 1 FROM unnest(category) c WHERE lower(c) = lower(${})) ",
            idx
        ));
        binds.push(category.to_string());
        idx += 1;
    }
    if let Some(cuisine) = trimmed(&filter.cuisine) {
        sql.push_str(&format!(
            "AND EXISTS (SELECT 1 FROM unnest(cuisine) c WHERE lower(c) = lower(${})) ",
            idx
        ));
        binds.push(cuisine.to_string());
        idx += 1;
    }
    if let Some(search) = trimmed(&filter.search) {
        sql.push_str(&format!(
            "AND (name ILIKE ${0} ESCAPE '\\' OR description ILIKE ${0} ESCAPE '\\' \
             OR EXISTS (SELECT 1 FROM unnest(ingredients) i WHERE i ILIKE ${0} ESCAPE '\\')) ",
            idx
        ));
        binds.push(format!("%{}%", escape_like(search)));
        idx += 1;
    }
    if filter.favorite.is_some() {
        sql.push_str(&format!("AND is_favorite = ${} ", idx));
    }

    sql.push_str("ORDER BY created_at_utc DESC, id DESC");
    (sql, binds, filter.favorite)
}

fn trimmed(value: &Option<String>) -> Option<&str> {
    value.as_deref().map(str::trim).filter(|v| !v.is_empty())
}

#[async_trait]
impl RecipeRepository for PgRecipeRepository {
    async fn insert(&self, owner: &str, recipe: NewRecipe) -> Result<Recipe> {
        let id = Uuid::now_v7();
        let now = Utc::now();
        let c = recipe.content;

        let sql = format!(
            "INSERT INTO recipe ({}) VALUES \
             ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12, $13, $14, $15, false, $16, $16) \
             RETURNING {}",
            RECIPE_COLUMNS, RECIPE_COLUMNS
        );
        let row = sqlx::query(&sql)
            .bind(id)
            .bind(owner)
            .bind(&c.name)
            .bind(&c.image)
            .bind(&c.description)
            .bind(&c.cook_time)
            .bind(&c.prep_time)
            .bind(&c.total_time)
            .bind(&c.category)
            .bind(&c.cuisine)
            .bind(&c.ingredients)
            .bind(&c.instructions)
            .bind(&c.recipe_yield)
            .bind(&c.source_url)
            .bind(recipe.parsing_method.as_str())
            .bind(now)
            .fetch_one(&self.pool)
            .await
            .map_err(Error::Database)?;

        debug!(subsystem = "db", component = "recipes", op = "insert", recipe_id = %id, "Recipe inserted");
        recipe_from_row(&row)
    }

    async fn fetch(&self, owner: &str, id: Uuid) -> Result<Option<Recipe>> {
        let sql = format!(
            "SELECT {} FROM recipe WHERE id = $1 AND user_id = $2",
            RECIPE_COLUMNS
        );
        let row = sqlx::query(&sql)
            .bind(id)
            .bind(owner)
            .fetch_optional(&self.pool)
            .await
            .map_err(Error::Database)?;
        row.as_ref().map(recipe_from_row).transpose()
    }

    async fn list(&self, owner: &str, filter: &RecipeFilter) -> Result<Vec<Recipe>> {
        let (sql, binds, favorite) = build_list_query(filter);
        let mut query = sqlx::query(&sql).bind(owner);
        for value in &binds {
            query = query.bind(value);
        }
        if let Some(favorite) = favorite {
            query = query.bind(favorite);
        }

        let rows = query.fetch_all(&self.pool).await.map_err(Error::Database)?;
        rows.iter().map(recipe_from_row).collect()
    }

    async fn update(&self, owner: &str, recipe: &Recipe) -> Result<Option<Recipe>> {
        let c = &recipe.content;
        let sql = format!(
            "UPDATE recipe SET name = $3, image = $4, description = $5, cook_time = $6, \
             prep_time = $7, total_time = $8, category = $9, cuisine = $10, ingredients = $11, \
             instructions = $12, yield_text = $13, source_url = $14, is_favorite = $15, \
             updated_at_utc = $16 \
             WHERE id = $1 AND user_id = $2 RETURNING {}",
            RECIPE_COLUMNS
        );
        let row = sqlx::query(&sql)
            .bind(recipe.id)
            .bind(owner)
            .bind(&c.name)
            .bind(&c.image)
            .bind(&c.description)
            .bind(&c.cook_time)
            .bind(&c.prep_time)
            .bind(&c.total_time)
            .bind(&c.category)
            .bind(&c.cuisine)
            .bind(&c.ingredients)
            .bind(&c.instructions)
            .bind(&c.recipe_yield)
            .bind(&c.source_url)
            .bind(recipe.is_favorite)
            .bind(Utc::now())
            .fetch_optional(&self.pool)
            .await
            .map_err(Error::Database)?;
        row.as_ref().map(recipe_from_row).transpose()
    }

    async fn delete(&self, owner: &str, id: Uuid) -> Result<bool> {
        let result = sqlx::query("DELETE FROM recipe WHERE id = $1 AND user_id = $2")
            .bind(id)
            .bind(owner)
            .execute(&self.pool)
            .await
            .map_err(Error::Database)?;
        Ok(result.rows_affected() > 0)
    }

    async fn category_counts(&self, owner: &str) -> Result<Vec<CategoryCount>> {
        let rows = sqlx::query(
            "SELECT cat AS category, COUNT(*)::BIGINT AS count \
             FROM recipe CROSS JOIN LATERAL unnest(recipe.category) AS cat \
             WHERE recipe.user_id = $1 \
             GROUP BY cat ORDER BY count DESC, cat ASC",
        )
        .bind(owner)
        .fetch_all(&self.pool)
        .await
        .map_err(Error::Database)?;

        Ok(rows
            .into_iter()
            .map(|r| CategoryCount {
                category: r.get("category"),
                count: r.get("count"),
            })
            .collect())
    }
}

//! In-memory repositories.
//!
//! Implements the same owner-scoped contracts as the PostgreSQL
//! repositories, backed by a shared `RwLock`. Used by API tests and for
//! running the server without a database (`DATABASE_URL=memory`).

use std::collections::HashMap;
use std::sync::Arc;

use async_trait::async_trait;
use chrono::Utc;
use tokio::sync::RwLock;
use uuid::Uuid;

use whisk_core::{
    CategoryCount, NewNote, NewRecipe, Note, NoteKind, NoteRepository, Recipe, RecipeFilter,
    RecipeRepository, Result,
};

/// Records are kept in insertion order so listings are stable.
#[derive(Default)]
struct MemoryState {
    recipes: Vec<Recipe>,
    notes: Vec<Note>,
}

/// Shared in-memory store handing out repositories over the same data.
#[derive(Clone, Default)]
pub struct MemoryStore {
    state: Arc<RwLock<MemoryState>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn recipes(&self) -> MemoryRecipeRepository {
        MemoryRecipeRepository {
            state: self.state.clone(),
        }
    }

    pub fn notes(&self) -> MemoryNoteRepository {
        MemoryNoteRepository {
            state: self.state.clone(),
        }
    }
}

/// In-memory implementation of RecipeRepository.
#[derive(Clone)]
pub struct MemoryRecipeRepository {
    state: Arc<RwLock<MemoryState>>,
}

#[async_trait]
impl RecipeRepository for MemoryRecipeRepository {
    async fn insert(&self, owner: &str, recipe: NewRecipe) -> Result<Recipe> {
        let now = Utc::now();
        let stored = Recipe {
            id: Uuid::now_v7(),
            user_id: owner.to_string(),
            content: recipe.content,
            parsing_method: recipe.parsing_method,
            is_favorite: false,
            created_at: now,
            updated_at: now,
        };
        self.state.write().await.recipes.push(stored.clone());
        Ok(stored)
    }

    async fn fetch(&self, owner: &str, id: Uuid) -> Result<Option<Recipe>> {
        let state = self.state.read().await;
        Ok(state
            .recipes
            .iter()
            .find(|r| r.id == id && r.user_id == owner)
            .cloned())
    }

    async fn list(&self, owner: &str, filter: &RecipeFilter) -> Result<Vec<Recipe>> {
        let state = self.state.read().await;
        Ok(state
            .recipes
            .iter()
            .rev()
            .filter(|r| r.user_id == owner && filter.matches(r))
            .cloned()
            .collect())
    }

    async fn update(&self, owner: &str, recipe: &Recipe) -> Result<Option<Recipe>> {
        let mut state = self.state.write().await;
        let Some(existing) = state
            .recipes
            .iter_mut()
            .find(|r| r.id == recipe.id && r.user_id == owner)
        else {
            return Ok(None);
        };
        existing.content = recipe.content.clone();
        existing.is_favorite = recipe.is_favorite;
        existing.updated_at = Utc::now();
        Ok(Some(existing.clone()))
    }

    async fn delete(&self, owner: &str, id: Uuid) -> Result<bool> {
        let mut state = self.state.write().await;
        let before = state.recipes.len();
        state.recipes.retain(|r| !(r.id == id && r.user_id == owner));
        let removed = state.recipes.len() < before;
        if removed {
            state.notes.retain(|n| n.recipe_id != id);
        }
        Ok(removed)
    }

    async fn category_counts(&self, owner: &str) -> Result<Vec<CategoryCount>> {
        let state = self.state.read().await;
        let mut counts: HashMap<&str, i64> = HashMap::new();
        for recipe in state.recipes.iter().filter(|r| r.user_id == owner) {
            for category in &recipe.content.category {
                *counts.entry(category.as_str()).or_default() += 1;
            }
        }

        let mut result: Vec<CategoryCount> = counts
            .into_iter()
            .map(|(category, count)| CategoryCount {
                category: category.to_string(),
                count,
            })
            .collect();
        result.sort_by(|a, b| b.count.cmp(&a.count).then(a.category.cmp(&b.category)));
        Ok(result)
    }
}

/// In-memory implementation of NoteRepository.
#[derive(Clone)]
pub struct MemoryNoteRepository {
    state: Arc<RwLock<MemoryState>>,
}

#[async_trait]
impl NoteRepository for MemoryNoteRepository {
    async fn insert(&self, note: NewNote) -> Result<Note> {
        let stored = Note {
            id: Uuid::now_v7(),
            recipe_id: note.recipe_id,
            user_id: note.user_id,
            content: note.content,
            kind: note.kind,
            is_from_ai: note.is_from_ai,
            timestamp: Utc::now(),
        };
        self.state.write().await.notes.push(stored.clone());
        Ok(stored)
    }

    async fn list_for_recipe(&self, owner: &str, recipe_id: Uuid) -> Result<Vec<Note>> {
        let state = self.state.read().await;
        Ok(state
            .notes
            .iter()
            .filter(|n| n.recipe_id == recipe_id && n.user_id == owner)
            .cloned()
            .collect())
    }

    async fn delete(&self, owner: &str, id: Uuid) -> Result<bool> {
        let mut state = self.state.write().await;
        let before = state.notes.len();
        state.notes.retain(|n| !(n.id == id && n.user_id == owner));
        Ok(state.notes.len() < before)
    }

    async fn delete_for_recipe(
        &self,
        owner: &str,
        recipe_id: Uuid,
        kind: Option<NoteKind>,
    ) -> Result<u64> {
        let mut state = self.state.write().await;
        let before = state.notes.len();
        state.notes.retain(|n| {
            let targeted = n.recipe_id == recipe_id
                && n.user_id == owner
                && kind.map_or(true, |k| n.kind == k);
            !targeted
        });
        Ok((before - state.notes.len()) as u64)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use whisk_core::{ParsingMethod, RecipeDraft};

    fn new_recipe(name: &str, category: &[&str]) -> NewRecipe {
        NewRecipe {
            content: RecipeDraft {
                name: name.to_string(),
                category: category.iter().map(|c| c.to_string()).collect(),
                ingredients: vec!["salt".to_string()],
                instructions: vec!["stir".to_string()],
                ..Default::default()
            },
            parsing_method: ParsingMethod::Ai,
        }
    }

    fn chat(recipe_id: Uuid, owner: &str, content: &str) -> NewNote {
        NewNote {
            recipe_id,
            user_id: owner.to_string(),
            content: content.to_string(),
            kind: NoteKind::Chat,
            is_from_ai: false,
        }
    }

    #[tokio::test]
    async fn test_fetch_is_owner_scoped() {
        let store = MemoryStore::new();
        let recipes = store.recipes();
        let saved = recipes.insert("alice", new_recipe("Soup", &[])).await.unwrap();

        assert!(recipes.fetch("alice", saved.id).await.unwrap().is_some());
        assert!(recipes.fetch("bob", saved.id).await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_list_newest_first() {
        let store = MemoryStore::new();
        let recipes = store.recipes();
        recipes.insert("alice", new_recipe("First", &[])).await.unwrap();
        recipes.insert("alice", new_recipe("Second", &[])).await.unwrap();
        recipes.insert("bob", new_recipe("Other", &[])).await.unwrap();

        let listed = recipes.list("alice", &RecipeFilter::default()).await.unwrap();
        let names: Vec<_> = listed.iter().map(|r| r.content.name.as_str()).collect();
        assert_eq!(names, vec!["Second", "First"]);
    }

    #[tokio::test]
    async fn test_delete_other_owner_keeps_recipe() {
        let store = MemoryStore::new();
        let recipes = store.recipes();
        let saved = recipes.insert("alice", new_recipe("Soup", &[])).await.unwrap();

        assert!(!recipes.delete("bob", saved.id).await.unwrap());
        assert!(recipes.fetch("alice", saved.id).await.unwrap().is_some());
    }

    #[tokio::test]
    async fn test_delete_recipe_removes_notes() {
        let store = MemoryStore::new();
        let recipes = store.recipes();
        let notes = store.notes();
        let saved = recipes.insert("alice", new_recipe("Soup", &[])).await.unwrap();
        notes.insert(chat(saved.id, "alice", "hi")).await.unwrap();

        assert!(recipes.delete("alice", saved.id).await.unwrap());
        assert!(notes
            .list_for_recipe("alice", saved.id)
            .await
            .unwrap()
            .is_empty());
    }

    #[tokio::test]
    async fn test_update_requires_owner() {
        let store = MemoryStore::new();
        let recipes = store.recipes();
        let mut saved = recipes.insert("alice", new_recipe("Soup", &[])).await.unwrap();
        saved.is_favorite = true;

        assert!(recipes.update("bob", &saved).await.unwrap().is_none());
        let updated = recipes.update("alice", &saved).await.unwrap().unwrap();
        assert!(updated.is_favorite);
    }

    #[tokio::test]
    async fn test_category_counts_sorted() {
        let store = MemoryStore::new();
        let recipes = store.recipes();
        recipes
            .insert("alice", new_recipe("A", &["Soup", "Main Course"]))
            .await
            .unwrap();
        recipes.insert("alice", new_recipe("B", &["Soup"])).await.unwrap();
        recipes.insert("bob", new_recipe("C", &["Dessert"])).await.unwrap();

        let counts = recipes.category_counts("alice").await.unwrap();
        assert_eq!(
            counts,
            vec![
                CategoryCount {
                    category: "Soup".to_string(),
                    count: 2
                },
                CategoryCount {
                    category: "Main Course".to_string(),
                    count: 1
                },
            ]
        );
    }

    #[tokio::test]
    async fn test_delete_for_recipe_by_kind() {
        let store = MemoryStore::new();
        let notes = store.notes();
        let recipe_id = Uuid::now_v7();
        notes.insert(chat(recipe_id, "alice", "q")).await.unwrap();
        notes
            .insert(NewNote {
                kind: NoteKind::Note,
                ..chat(recipe_id, "alice", "remember the saffron")
            })
            .await
            .unwrap();
        notes.insert(chat(recipe_id, "bob", "not mine")).await.unwrap();

        let removed = notes
            .delete_for_recipe("alice", recipe_id, Some(NoteKind::Chat))
            .await
            .unwrap();
        assert_eq!(removed, 1);

        let remaining = notes.list_for_recipe("alice", recipe_id).await.unwrap();
        assert_eq!(remaining.len(), 1);
        assert_eq!(remaining[0].kind, NoteKind::Note);
        assert_eq!(notes.list_for_recipe("bob", recipe_id).await.unwrap().len(), 1);
    }
}

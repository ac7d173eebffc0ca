// ============================
// crates/backend-lib/src/storage.rs
// ============================
//! Storage abstraction with a flat-file implementation.
//!
//! Mutations take the write lock for their whole duration, so the uniqueness
//! check, the in-memory insert, and the file write happen atomically with
//! respect to every other operation. If the file write fails, the in-memory
//! change is rolled back and no row survives.
use std::{
    collections::HashMap,
    path::{Path, PathBuf},
};

use async_trait::async_trait;
use tokio::{fs as tokio_fs, sync::RwLock};

use crate::error::AppError;
use crate::models::{NewRecipe, NewUser, Recipe, User};

const USERS_FILE: &str = "users.json";
const RECIPES_FILE: &str = "recipes.json";

/// Trait for storage backends
#[async_trait]
pub trait Storage: Send + Sync {
    /// Persist a new user. Fails with [`AppError::Conflict`] when the
    /// username is taken; nothing is written in that case.
    async fn insert_user(&self, new_user: NewUser) -> Result<User, AppError>;

    /// Look up a user by id
    async fn find_user_by_id(&self, id: i64) -> Result<Option<User>, AppError>;

    /// Look up a user by username
    async fn find_user_by_username(&self, username: &str) -> Result<Option<User>, AppError>;

    /// Persist a new recipe for its owner
    async fn insert_recipe(&self, new_recipe: NewRecipe) -> Result<Recipe, AppError>;

    /// All recipes owned by `owner_id`
    async fn recipes_by_owner(&self, owner_id: i64) -> Result<Vec<Recipe>, AppError>;
}

#[derive(Default)]
struct Tables {
    users: HashMap<i64, User>,
    recipes: HashMap<i64, Recipe>,
    next_user_id: i64,
    next_recipe_id: i64,
}

/// Flat-file implementation of the [`Storage`] trait. Tables live in memory
/// and are mirrored to JSON files under the data directory on every write.
#[derive(Clone)]
pub struct FlatFileStore {
    dir: PathBuf,
    tables: std::sync::Arc<RwLock<Tables>>,
}

impl FlatFileStore {
    /// Open (or create) a store rooted at `dir`, loading any existing rows
    pub fn new(dir: impl AsRef<Path>) -> Result<Self, AppError> {
        let dir = dir.as_ref().to_path_buf();
        std::fs::create_dir_all(&dir)?;

        let users: Vec<User> = load_table(&dir.join(USERS_FILE))?;
        let recipes: Vec<Recipe> = load_table(&dir.join(RECIPES_FILE))?;

        let next_user_id = users.iter().map(|u| u.id).max().unwrap_or(0) + 1;
        let next_recipe_id = recipes.iter().map(|r| r.id).max().unwrap_or(0) + 1;

        let tables = Tables {
            users: users.into_iter().map(|u| (u.id, u)).collect(),
            recipes: recipes.into_iter().map(|r| (r.id, r)).collect(),
            next_user_id,
            next_recipe_id,
        };

        Ok(Self {
            dir,
            tables: std::sync::Arc::new(RwLock::new(tables)),
        })
    }

    /// Rewrite a table file atomically (write to a temp file, then rename)
    async fn persist<T: serde::Serialize>(
        &self,
        file: &str,
        rows: Vec<&T>,
    ) -> Result<(), AppError> {
        let json = serde_json::to_vec_pretty(&rows)?;
        let tmp = self.dir.join(format!("{file}.tmp"));
        tokio_fs::write(&tmp, &json).await?;
        tokio_fs::rename(&tmp, self.dir.join(file)).await?;
        Ok(())
    }

    async fn persist_users(&self, tables: &Tables) -> Result<(), AppError> {
        let mut rows: Vec<&User> = tables.users.values().collect();
        rows.sort_by_key(|u| u.id);
        self.persist(USERS_FILE, rows).await
    }

    async fn persist_recipes(&self, tables: &Tables) -> Result<(), AppError> {
        let mut rows: Vec<&Recipe> = tables.recipes.values().collect();
        rows.sort_by_key(|r| r.id);
        self.persist(RECIPES_FILE, rows).await
    }
}

fn load_table<T: serde::de::DeserializeOwned>(path: &Path) -> Result<Vec<T>, AppError> {
    if !path.exists() {
        return Ok(Vec::new());
    }
    let bytes = std::fs::read(path)?;
    Ok(serde_json::from_slice(&bytes)?)
}

#[async_trait]
impl Storage for FlatFileStore {
    async fn insert_user(&self, new_user: NewUser) -> Result<User, AppError> {
        let mut tables = self.tables.write().await;

        if tables
            .users
            .values()
            .any(|u| u.username == new_user.username)
        {
            return Err(AppError::Conflict("Username already exists".to_string()));
        }

        let id = tables.next_user_id;
        tables.next_user_id += 1;
        let user = new_user.into_user(id);
        tables.users.insert(id, user.clone());

        if let Err(e) = self.persist_users(&tables).await {
            // roll back so no partial row survives the failed write
            tables.users.remove(&id);
            tables.next_user_id = id;
            return Err(e);
        }

        Ok(user)
    }

    async fn find_user_by_id(&self, id: i64) -> Result<Option<User>, AppError> {
        let tables = self.tables.read().await;
        Ok(tables.users.get(&id).cloned())
    }

    async fn find_user_by_username(&self, username: &str) -> Result<Option<User>, AppError> {
        let tables = self.tables.read().await;
        Ok(tables.users.values().find(|u| u.username == username).cloned())
    }

    async fn insert_recipe(&self, new_recipe: NewRecipe) -> Result<Recipe, AppError> {
        let mut tables = self.tables.write().await;

        let id = tables.next_recipe_id;
        tables.next_recipe_id += 1;
        let recipe = new_recipe.into_recipe(id);
        tables.recipes.insert(id, recipe.clone());

        if let Err(e) = self.persist_recipes(&tables).await {
            tables.recipes.remove(&id);
            tables.next_recipe_id = id;
            return Err(e);
        }

        Ok(recipe)
    }

    async fn recipes_by_owner(&self, owner_id: i64) -> Result<Vec<Recipe>, AppError> {
        let tables = self.tables.read().await;
        let mut recipes: Vec<Recipe> = tables
            .recipes
            .values()
            .filter(|r| r.owner_id == owner_id)
            .cloned()
            .collect();
        recipes.sort_by_key(|r| r.id);
        Ok(recipes)
    }
}

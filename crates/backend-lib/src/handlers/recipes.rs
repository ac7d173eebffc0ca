// ============================
// crates/backend-lib/src/handlers/recipes.rs
// ============================
//! Recipe listing and creation. Both require an authenticated session and
//! only ever touch the current user's own recipes.
use std::sync::Arc;

use axum::{
    extract::State,
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use metrics::counter;
use recipeshare_common::RecipeBody;
use serde_json::Value;
use tracing::{debug, warn};

use super::{current_user, required_str, SessionToken, MISSING_FIELDS};
use crate::error::AppError;
use crate::metrics as keys;
use crate::models::NewRecipe;
use crate::storage::Storage;
use crate::validation::{self, ValidationError};
use crate::AppState;

/// `GET /recipes` — all recipes owned by the current user
pub async fn index<S: Storage + 'static>(
    State(state): State<Arc<AppState<S>>>,
    token: SessionToken,
) -> Result<Response, AppError> {
    let user = current_user(&state, &token).await?;

    let recipes = state.storage.recipes_by_owner(user.id).await?;
    let bodies: Vec<RecipeBody> = recipes.iter().map(|r| r.to_body(&user)).collect();

    counter!(keys::RECIPE_LISTED).increment(1);

    Ok((StatusCode::OK, Json(bodies)).into_response())
}

/// `POST /recipes` — create a recipe owned by the current user
pub async fn create<S: Storage + 'static>(
    State(state): State<Arc<AppState<S>>>,
    token: SessionToken,
    Json(data): Json<Value>,
) -> Result<Response, AppError> {
    let user = current_user(&state, &token).await?;

    let title = required_str(&data, "title", MISSING_FIELDS)?;
    let instructions = required_str(&data, "instructions", MISSING_FIELDS)?;
    let minutes_to_complete = match data.get("minutes_to_complete") {
        None | Some(Value::Null) => {
            return Err(AppError::BadRequest(MISSING_FIELDS.to_string()));
        },
        // present but fractional or out of range is a semantic violation,
        // not a missing field
        Some(value) => value
            .as_i64()
            .ok_or(ValidationError::MinutesNotPositive)?,
    };

    // boundary check; NewRecipe::new enforces the same invariant again
    validation::validate_instructions(instructions).map_err(|e| {
        warn!(field = e.field(), "recipe rejected");
        e
    })?;

    let new_recipe = NewRecipe::new(title, instructions, minutes_to_complete, user.id)?;
    let recipe = state.storage.insert_recipe(new_recipe).await?;

    counter!(keys::RECIPE_CREATED).increment(1);
    debug!(recipe_id = recipe.id, user_id = user.id, "recipe created");

    Ok((StatusCode::CREATED, Json(recipe.to_body(&user))).into_response())
}

// ================
// common/src/lib.rs
// ================
//! Wire types shared between the `RecipeShare` server and its clients.
//! These are the request payloads and the public (serialized) views of the
//! stored entities. Nothing in here ever carries password material.

use serde::{Deserialize, Serialize};

/// Payload for `POST /signup`
/// # Fields
/// * `username` - Desired username (min 3 chars)
/// * `password` - Plaintext password, hashed server-side
/// * `image_url` - Optional avatar URL
/// * `bio` - Optional profile blurb
#[derive(Serialize, Deserialize, Debug, Clone)]
pub struct SignupRequest {
    pub username: String,
    pub password: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub image_url: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub bio: Option<String>,
}

/// Payload for `POST /login`
#[derive(Serialize, Deserialize, Debug, Clone)]
pub struct LoginRequest {
    pub username: String,
    pub password: String,
}

/// Payload for `POST /recipes`
/// # Fields
/// * `title` - Recipe title (non-empty)
/// * `instructions` - Free text, min 50 chars
/// * `minutes_to_complete` - Positive number of minutes
#[derive(Serialize, Deserialize, Debug, Clone)]
pub struct RecipeCreateRequest {
    pub title: String,
    pub instructions: String,
    pub minutes_to_complete: i64,
}

/// Public view of a user. There is deliberately no password field here:
/// the credential never crosses the wire in either direction after signup.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq)]
pub struct UserBody {
    pub id: i64,
    pub username: String,
    pub image_url: Option<String>,
    pub bio: Option<String>,
}

/// Public view of a recipe. The embedded owner is a [`UserBody`], which
/// carries no recipe list of its own, so serialization cannot recurse.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq)]
pub struct RecipeBody {
    pub id: i64,
    pub title: String,
    pub instructions: String,
    pub minutes_to_complete: i64,
    pub user: UserBody,
}

/// Error envelope returned on every failure path.
#[derive(Serialize, Deserialize, Debug, Clone)]
pub struct ErrorBody {
    pub error: String,
}

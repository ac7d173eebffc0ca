// ============================
// crates/backend-lib/src/models.rs
// ============================
//! Domain entities.
//!
//! Constructors validate, so the documented invariants (username length,
//! instructions length, positive minutes) hold wherever a value of these
//! types exists, independent of the checks at the HTTP boundary.

use recipeshare_common::{RecipeBody, UserBody};
use serde::{Deserialize, Serialize};

use crate::auth::{CorruptCredential, Credential};
use crate::error::AppError;
use crate::validation::{self, ValidationResult};

/// A registered user. The credential field is private: nothing outside the
/// storage round-trip can read the hash, and the public view ([`UserBody`])
/// never contains it.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct User {
    pub id: i64,
    pub username: String,
    credential: Credential,
    pub image_url: Option<String>,
    pub bio: Option<String>,
}

impl User {
    /// Check a login attempt against the stored credential. A corrupt hash
    /// is surfaced as an error, never as a plain mismatch.
    pub fn authenticate(&self, password: &str) -> Result<bool, CorruptCredential> {
        self.credential.verify(password)
    }

    /// Public view, without the credential
    pub fn to_body(&self) -> UserBody {
        UserBody {
            id: self.id,
            username: self.username.clone(),
            image_url: self.image_url.clone(),
            bio: self.bio.clone(),
        }
    }
}

/// A user pending insertion; storage assigns the id
#[derive(Clone, Debug)]
pub struct NewUser {
    pub username: String,
    credential: Credential,
    pub image_url: Option<String>,
    pub bio: Option<String>,
}

impl NewUser {
    /// Validate the username, hash the password, and wipe the plaintext.
    pub fn new(
        username: &str,
        password: &mut String,
        image_url: Option<String>,
        bio: Option<String>,
    ) -> Result<Self, AppError> {
        validation::validate_username(username)?;
        let credential = Credential::from_plaintext_secure(password)
            .map_err(|e| AppError::Internal(e.to_string()))?;
        Ok(Self {
            username: username.to_string(),
            credential,
            image_url,
            bio,
        })
    }

    pub(crate) fn into_user(self, id: i64) -> User {
        User {
            id,
            username: self.username,
            credential: self.credential,
            image_url: self.image_url,
            bio: self.bio,
        }
    }
}

/// A recipe owned by exactly one user
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct Recipe {
    pub id: i64,
    pub title: String,
    pub instructions: String,
    pub minutes_to_complete: i64,
    pub owner_id: i64,
}

impl Recipe {
    /// Public view with the owner embedded. The owner body carries no recipe
    /// list, so serialization cannot recurse.
    pub fn to_body(&self, owner: &User) -> RecipeBody {
        RecipeBody {
            id: self.id,
            title: self.title.clone(),
            instructions: self.instructions.clone(),
            minutes_to_complete: self.minutes_to_complete,
            user: owner.to_body(),
        }
    }
}

/// A recipe pending insertion; storage assigns the id
#[derive(Clone, Debug)]
pub struct NewRecipe {
    pub title: String,
    pub instructions: String,
    pub minutes_to_complete: i64,
    pub owner_id: i64,
}

impl NewRecipe {
    pub fn new(
        title: &str,
        instructions: &str,
        minutes_to_complete: i64,
        owner_id: i64,
    ) -> ValidationResult<Self> {
        validation::validate_title(title)?;
        validation::validate_instructions(instructions)?;
        validation::validate_minutes(minutes_to_complete)?;
        Ok(Self {
            title: title.to_string(),
            instructions: instructions.to_string(),
            minutes_to_complete,
            owner_id,
        })
    }

    pub(crate) fn into_recipe(self, id: i64) -> Recipe {
        Recipe {
            id,
            title: self.title,
            instructions: self.instructions,
            minutes_to_complete: self.minutes_to_complete,
            owner_id: self.owner_id,
        }
    }
}

// ============================
// crates/backend-lib/src/auth/password.rs
// ============================
//! Write-only password credentials.
//!
//! A [`Credential`] is set from plaintext and checked with [`Credential::verify`];
//! there is no accessor that returns the hash, and `Debug` redacts it. The
//! serde impl is `transparent` so the storage layer can round-trip the hash,
//! which is the only place it ever leaves this type.
use scrypt::{
    password_hash::{rand_core::OsRng, PasswordHash, PasswordHasher, PasswordVerifier, SaltString},
    Scrypt,
};
use serde::{Deserialize, Serialize};
use thiserror::Error;
use zeroize::Zeroize;

/// The stored hash does not parse as a PHC string. This is data corruption,
/// not a failed login, and callers must not map it to a 401.
#[derive(Error, Debug)]
#[error("stored password hash is not a valid PHC string")]
pub struct CorruptCredential;

/// Salted scrypt hash of a user's password
#[derive(Clone, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Credential {
    hash: String,
}

impl Credential {
    /// Hash a plaintext password with a fresh random salt
    pub fn from_plaintext(plain: &str) -> anyhow::Result<Self> {
        let salt = SaltString::generate(&mut OsRng);
        let hash = Scrypt.hash_password(plain.as_bytes(), &salt)?.to_string();
        Ok(Self { hash })
    }

    /// Hash a password and wipe the plaintext buffer afterwards
    pub fn from_plaintext_secure(plain: &mut String) -> anyhow::Result<Self> {
        let credential = Self::from_plaintext(plain)?;
        plain.zeroize();
        Ok(credential)
    }

    /// Check a plaintext password against the stored hash. The PHC verifier
    /// compares in constant time.
    pub fn verify(&self, plain: &str) -> Result<bool, CorruptCredential> {
        let parsed = PasswordHash::new(&self.hash).map_err(|_| CorruptCredential)?;
        Ok(Scrypt.verify_password(plain.as_bytes(), &parsed).is_ok())
    }
}

impl std::fmt::Debug for Credential {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str("Credential(<redacted>)")
    }
}

// ============================
// crates/backend-lib/src/auth/token_generator.rs
// ============================
//! Secure token generation for session identifiers.
//!
//! Tokens are drawn from OS entropy and encoded base64 URL-safe without
//! padding, so they are safe to carry in a cookie value.
use base64::{engine::general_purpose::URL_SAFE_NO_PAD, Engine as _};
use rand::{rngs::OsRng, RngCore};

/// Default token size in bytes (32 bytes = 256 bits of entropy)
const DEFAULT_TOKEN_BYTES: usize = 32;

/// Generate a cryptographically secure random token
pub fn generate_secure_token() -> String {
    generate_secure_token_with_size(DEFAULT_TOKEN_BYTES)
}

/// Generate a cryptographically secure random token of `bytes` bytes
pub fn generate_secure_token_with_size(bytes: usize) -> String {
    let mut buffer = vec![0u8; bytes];
    OsRng.fill_bytes(&mut buffer);
    URL_SAFE_NO_PAD.encode(buffer)
}

// ============================
// crates/backend-lib/src/auth/mod.rs
// ============================
//! Authentication module.

pub mod password;
pub mod session;
pub mod token_generator;
mod service;
mod service_impl;

pub use password::{CorruptCredential, Credential};
pub use service::AuthService;
pub use service_impl::DefaultAuth;
pub use session::{Session, SessionManager, DEFAULT_SESSION_TTL};

// ==============
// crates/backend-lib/src/metrics.rs

//! Central place for Prometheus metric keys
pub const USER_SIGNUP: &str = "user.signup";
pub const USER_LOGIN: &str = "user.login";
pub const USER_LOGOUT: &str = "user.logout";
pub const SESSION_CREATED: &str = "session.created";
pub const SESSION_DESTROYED: &str = "session.destroyed";
pub const SESSION_EXPIRED: &str = "session.expired";
pub const SESSION_ACTIVE: &str = "session.active";
pub const RECIPE_CREATED: &str = "recipe.created";
pub const RECIPE_LISTED: &str = "recipe.listed";

// handlers/protected/mod.rs - Session-gated handlers
//
// Every handler here runs after middleware::auth::session_gate and reads the
// caller from `Extension<AuthUser>`. Owner and customer columns are always the
// gate-resolved username, never a value from the request body.

pub mod auth;         // logout, me, group management
pub mod catalog;      // products, categories, size types
pub mod groceries;    // operational hours, a grocery's own products
pub mod transactions; // carts, checkouts, orders

use serde::Serialize;

/// Body returned by every delete endpoint
#[derive(Debug, Serialize)]
pub struct Deleted {
    pub deleted: i64,
}

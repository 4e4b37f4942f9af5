// handlers/public/mod.rs - Public handlers (no session required)
//
// Token acquisition, account flows and health. Every input is untrusted, so
// bodies are validated before any identity provider call.

pub mod auth;
pub mod health;

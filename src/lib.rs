pub mod cache;
pub mod config;
pub mod database;
pub mod error;
pub mod extract;
pub mod handlers;
pub mod identity;
pub mod middleware;
pub mod routes;
pub mod services;
pub mod state;

pub use routes::router;
pub use state::{AppState, Settings};

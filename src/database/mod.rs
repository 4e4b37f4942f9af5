pub mod catalog;
pub mod groceries;
pub mod manager;
pub mod models;
pub mod transactions;

pub use manager::{expect_affected, DatabaseError, Store};

pub mod auth;
pub mod policy;
pub mod response;

pub use auth::{authorize, session_gate, AuthUser, Gate};
pub use policy::{AccessPolicy, PolicyTable, RoutePolicy};
pub use response::{ApiResponse, ApiResult};

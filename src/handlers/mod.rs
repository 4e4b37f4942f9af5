// handlers/mod.rs - Two-tier handler layout
//
// Public (no session) → Protected (session gate + route policy)
//
pub mod public;    // /v1/health, /v1/auth/{login,register,confirm,resend,forgot,reset,google,callback}
pub mod protected; // everything else under /v1, behind the session gate
pub mod validate;  // shared request-body checks

/*
ROUTING NOTES:

Handlers never look at the Authorization header themselves. The gate in
middleware::auth resolves the caller and inserts `AuthUser` into the request
extensions, so a protected handler only needs `Extension<AuthUser>`:

    pub async fn list(State(state): State<AppState>, Extension(user): Extension<AuthUser>) -> ...

Which group a route needs is decided in routes::policy_table(), not here.
*/

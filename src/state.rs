use std::sync::Arc;

use crate::cache::SessionCache;
use crate::config::AppConfig;
use crate::database::Store;
use crate::identity::IdentityGateway;

/// Request-independent settings the handlers read
#[derive(Debug, Clone)]
pub struct Settings {
    pub version: String,
    pub cookie_secure: bool,
    pub post_login_redirect: String,
    pub self_service_groups: Vec<String>,
    pub cors_origins: Vec<String>,
}

impl Settings {
    pub fn from_config(config: &AppConfig) -> Self {
        Self {
            version: config.server.version.clone(),
            cookie_secure: config.security.cookie_secure,
            post_login_redirect: config.identity.post_login_redirect.clone(),
            self_service_groups: config.identity.self_service_groups.clone(),
            cors_origins: config.security.cors_origins.clone(),
        }
    }
}

/// Long-lived clients, built once in `main` and cloned into every handler
#[derive(Clone)]
pub struct AppState {
    pub store: Store,
    pub sessions: Arc<dyn SessionCache>,
    pub identity: Arc<dyn IdentityGateway>,
    pub settings: Arc<Settings>,
}

impl AppState {
    pub fn new(
        store: Store,
        sessions: Arc<dyn SessionCache>,
        identity: Arc<dyn IdentityGateway>,
        settings: Settings,
    ) -> Self {
        Self {
            store,
            sessions,
            identity,
            settings: Arc::new(settings),
        }
    }
}

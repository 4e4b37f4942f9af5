use once_cell::sync::Lazy;
use std::env;
use std::str::FromStr;
use std::time::Duration;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Missing configuration: {0}")]
    Missing(&'static str),

    #[error("Invalid value for {var}: {reason}")]
    Invalid { var: &'static str, reason: String },
}

#[derive(Debug, Clone)]
pub struct AppConfig {
    pub environment: Environment,
    pub server: ServerConfig,
    pub database: DatabaseConfig,
    pub cache: CacheConfig,
    pub identity: IdentityConfig,
    pub security: SecurityConfig,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Environment {
    Development,
    Staging,
    Production,
}

#[derive(Debug, Clone)]
pub struct ServerConfig {
    pub port: u16,
    pub version: String,
}

#[derive(Debug, Clone)]
pub struct DatabaseConfig {
    /// Full connection string; when unset it is assembled from the parts below
    pub url: Option<String>,
    pub endpoint: String,
    pub name: String,
    pub user: String,
    pub password: String,
    pub max_connections: u32,
    pub idle_timeout_secs: u64,
    pub connection_timeout: u64,
    pub query_timeout_secs: u64,
    pub migrate: bool,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CacheBackend {
    Redis,
    Memory,
}

#[derive(Debug, Clone)]
pub struct CacheConfig {
    pub backend: CacheBackend,
    pub endpoint: String,
    pub port: u16,
    pub password: Option<String>,
    pub timeout_secs: u64,
}

#[derive(Debug, Clone)]
pub struct IdentityConfig {
    pub region: String,
    pub client_id: String,
    pub client_secret: String,
    pub user_pool_id: String,
    pub access_key_id: Option<String>,
    pub secret_access_key: Option<String>,
    pub session_token: Option<String>,
    /// Hosted UI base, e.g. https://auth.example.com
    pub domain: String,
    pub redirect_uri: String,
    pub post_login_redirect: String,
    pub timeout_secs: u64,
    /// Groups a signed-in user may join without admin rights
    pub self_service_groups: Vec<String>,
}

#[derive(Debug, Clone)]
pub struct SecurityConfig {
    pub cors_origins: Vec<String>,
    pub cookie_secure: bool,
}

impl AppConfig {
    pub fn from_env() -> Self {
        let environment = match env::var("APP_ENV").as_deref() {
            Ok("production") | Ok("prod") => Environment::Production,
            Ok("staging") | Ok("stage") => Environment::Staging,
            _ => Environment::Development,
        };

        match environment {
            Environment::Production => Self::production(),
            Environment::Staging => Self::staging(),
            Environment::Development => Self::development(),
        }
        .with_env_overrides()
    }

    fn with_env_overrides(mut self) -> Self {
        // Server
        parse_var("PORT", &mut self.server.port);
        string_var("VERSION", &mut self.server.version);

        // Database
        if let Ok(v) = env::var("DATABASE_URL") {
            self.database.url = Some(v);
        }
        string_var("DB_ENDPOINT", &mut self.database.endpoint);
        string_var("DB_NAME", &mut self.database.name);
        string_var("DB_USER", &mut self.database.user);
        string_var("DB_PASSWORD", &mut self.database.password);
        parse_var("DB_MAX_CONNECTIONS", &mut self.database.max_connections);
        parse_var("DB_IDLE_TIMEOUT_SECS", &mut self.database.idle_timeout_secs);
        parse_var("DB_CONNECT_TIMEOUT_SECS", &mut self.database.connection_timeout);
        parse_var("DB_QUERY_TIMEOUT_SECS", &mut self.database.query_timeout_secs);
        parse_var("DB_MIGRATE", &mut self.database.migrate);

        // Cache
        if let Ok(v) = env::var("CACHE_BACKEND") {
            match v.to_ascii_lowercase().as_str() {
                "memory" => self.cache.backend = CacheBackend::Memory,
                "redis" => self.cache.backend = CacheBackend::Redis,
                other => tracing::warn!("Ignoring unknown CACHE_BACKEND '{}'", other),
            }
        }
        string_var("CACHE_ENDPOINT", &mut self.cache.endpoint);
        parse_var("CACHE_PORT", &mut self.cache.port);
        if let Ok(v) = env::var("CACHE_PASS") {
            self.cache.password = Some(v).filter(|p| !p.is_empty());
        }
        parse_var("CACHE_TIMEOUT_SECS", &mut self.cache.timeout_secs);

        // Identity provider
        string_var("AWS_REGION", &mut self.identity.region);
        string_var("CLIENT_ID", &mut self.identity.client_id);
        string_var("CLIENT_SECRET", &mut self.identity.client_secret);
        string_var("USER_POOL_ID", &mut self.identity.user_pool_id);
        optional_var("AWS_ACCESS_KEY_ID", &mut self.identity.access_key_id);
        optional_var("AWS_SECRET_ACCESS_KEY", &mut self.identity.secret_access_key);
        optional_var("AWS_SESSION_TOKEN", &mut self.identity.session_token);
        string_var("COGNITO_DOMAIN", &mut self.identity.domain);
        string_var("REDIRECT_URL_GOOGLE", &mut self.identity.redirect_uri);
        string_var("POST_LOGIN_REDIRECT", &mut self.identity.post_login_redirect);
        parse_var("IDENTITY_TIMEOUT_SECS", &mut self.identity.timeout_secs);
        if let Ok(v) = env::var("SELF_SERVICE_GROUPS") {
            self.identity.self_service_groups = split_list(&v);
        }

        // Security
        if let Ok(v) = env::var("CORS_ORIGINS") {
            self.security.cors_origins = split_list(&v);
        }
        parse_var("COOKIE_SECURE", &mut self.security.cookie_secure);

        self
    }

    pub fn development() -> Self {
        Self {
            environment: Environment::Development,
            server: ServerConfig {
                port: 8080,
                version: env!("CARGO_PKG_VERSION").to_string(),
            },
            database: DatabaseConfig {
                url: None,
                endpoint: "localhost:5432".to_string(),
                name: "grosir".to_string(),
                user: "postgres".to_string(),
                password: String::new(),
                max_connections: 10,
                idle_timeout_secs: 15 * 60,
                connection_timeout: 30,
                query_timeout_secs: 5,
                migrate: true,
            },
            cache: CacheConfig {
                backend: CacheBackend::Redis,
                endpoint: "localhost".to_string(),
                port: 6379,
                password: None,
                timeout_secs: 5,
            },
            identity: IdentityConfig::unconfigured(),
            security: SecurityConfig {
                cors_origins: default_cors_origins(),
                cookie_secure: false,
            },
        }
    }

    pub fn staging() -> Self {
        let mut config = Self::development();
        config.environment = Environment::Staging;
        config.database.max_connections = 30;
        config.database.connection_timeout = 10;
        config.security.cookie_secure = true;
        config
    }

    pub fn production() -> Self {
        let mut config = Self::development();
        config.environment = Environment::Production;
        config.database.max_connections = 70;
        config.database.connection_timeout = 5;
        config.security.cookie_secure = true;
        config
    }
}

impl DatabaseConfig {
    pub fn query_timeout(&self) -> Duration {
        Duration::from_secs(self.query_timeout_secs)
    }

    /// Connection string, preferring DATABASE_URL over the split variables
    pub fn connection_url(&self) -> Result<String, ConfigError> {
        if let Some(url) = &self.url {
            return Ok(url.clone());
        }
        if self.endpoint.is_empty() {
            return Err(ConfigError::Missing("DB_ENDPOINT"));
        }
        if self.name.is_empty() {
            return Err(ConfigError::Missing("DB_NAME"));
        }

        let mut url = url::Url::parse(&format!("postgres://{}/{}", self.endpoint, self.name))
            .map_err(|e| ConfigError::Invalid { var: "DB_ENDPOINT", reason: e.to_string() })?;
        url.set_username(&self.user)
            .map_err(|_| ConfigError::Invalid { var: "DB_USER", reason: "cannot be set".into() })?;
        if !self.password.is_empty() {
            url.set_password(Some(&self.password))
                .map_err(|_| ConfigError::Invalid { var: "DB_PASSWORD", reason: "cannot be set".into() })?;
        }
        Ok(url.into())
    }
}

impl CacheConfig {
    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }

    pub fn redis_url(&self) -> Result<String, ConfigError> {
        let mut url = url::Url::parse(&format!("redis://{}:{}/0", self.endpoint, self.port))
            .map_err(|e| ConfigError::Invalid { var: "CACHE_ENDPOINT", reason: e.to_string() })?;
        if let Some(password) = &self.password {
            url.set_password(Some(password))
                .map_err(|_| ConfigError::Invalid { var: "CACHE_PASS", reason: "cannot be set".into() })?;
        }
        Ok(url.into())
    }
}

impl IdentityConfig {
    fn unconfigured() -> Self {
        Self {
            region: "ap-southeast-1".to_string(),
            client_id: String::new(),
            client_secret: String::new(),
            user_pool_id: String::new(),
            access_key_id: None,
            secret_access_key: None,
            session_token: None,
            domain: String::new(),
            redirect_uri: String::new(),
            post_login_redirect: "/".to_string(),
            timeout_secs: 5,
            self_service_groups: vec!["retail".to_string(), "grosir".to_string()],
        }
    }

    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }

    /// Checks the settings every provider call depends on
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.client_id.is_empty() {
            return Err(ConfigError::Missing("CLIENT_ID"));
        }
        if self.client_secret.is_empty() {
            return Err(ConfigError::Missing("CLIENT_SECRET"));
        }
        if self.user_pool_id.is_empty() {
            return Err(ConfigError::Missing("USER_POOL_ID"));
        }
        Ok(())
    }
}

fn default_cors_origins() -> Vec<String> {
    vec![
        "http://localhost:3000".to_string(),
        "https://play.google.com".to_string(),
    ]
}

fn split_list(raw: &str) -> Vec<String> {
    raw.split(',')
        .map(|s| s.trim())
        .filter(|s| !s.is_empty())
        .map(String::from)
        .collect()
}

fn parse_var<T: FromStr>(var: &str, target: &mut T) {
    if let Ok(v) = env::var(var) {
        match v.parse() {
            Ok(parsed) => *target = parsed,
            Err(_) => tracing::warn!("Ignoring unparseable {}='{}'", var, v),
        }
    }
}

fn string_var(var: &str, target: &mut String) {
    if let Ok(v) = env::var(var) {
        *target = v;
    }
}

fn optional_var(var: &str, target: &mut Option<String>) {
    if let Ok(v) = env::var(var) {
        *target = Some(v).filter(|s| !s.is_empty());
    }
}

// Global singleton config - initialized once at startup
pub static CONFIG: Lazy<AppConfig> = Lazy::new(AppConfig::from_env);

pub fn config() -> &'static AppConfig {
    &CONFIG
}

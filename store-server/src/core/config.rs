use crate::auth::JwtConfig;

type BoxError = Box<dyn std::error::Error + Send + Sync>;

/// Server configuration
///
/// # Environment
///
/// | Variable | Default | Notes |
/// |----------|---------|-------|
/// | HTTP_PORT | 3000 | HTTP API port |
/// | DATABASE_PATH | ./data/store.db | SQLite file |
/// | ENVIRONMENT | development | development / staging / production |
/// | JWT_SECRET | dev fallback | required outside development |
/// | JWT_EXPIRATION_MINUTES | 1440 | token lifetime |
/// | LOG_LEVEL | info | overridden by RUST_LOG |
/// | LOG_DIR | unset | enables daily rolling file output |
/// | LOG_JSON | false | JSON log lines |
/// | BOOTSTRAP_ADMIN_USERNAME / _PASSWORD / _EMAIL | unset | first superuser |
/// | REQUEST_TIMEOUT_MS | 30000 | per-request timeout |
///
/// # Example
///
/// ```ignore
/// DATABASE_PATH=/srv/store.db HTTP_PORT=8080 cargo run
/// ```
#[derive(Debug, Clone)]
pub struct Config {
    pub http_port: u16,
    pub database_path: String,
    /// development | staging | production
    pub environment: String,
    pub jwt: JwtConfig,
    pub log_level: String,
    pub log_dir: Option<String>,
    pub log_json: bool,
    pub bootstrap_admin_username: Option<String>,
    pub bootstrap_admin_password: Option<String>,
    pub bootstrap_admin_email: Option<String>,
    /// Request timeout (millis)
    pub request_timeout_ms: u64,
}

impl Config {
    /// Require a secret env var: must be set and non-empty in non-development environments.
    fn require_secret(name: &str, environment: &str) -> Result<String, BoxError> {
        let val = match std::env::var(name) {
            Ok(v) => v,
            Err(_) => {
                if environment != "development" {
                    return Err(format!("{name} must be set in {environment} environment").into());
                }
                tracing::warn!("{name} not set, using a temporary development secret");
                crate::auth::jwt::generate_printable_secret()
            }
        };
        if val.is_empty() && environment != "development" {
            return Err(format!("{name} must not be empty in {environment} environment").into());
        }
        Ok(val)
    }

    /// Load configuration from environment variables
    pub fn from_env() -> Result<Self, BoxError> {
        let environment = std::env::var("ENVIRONMENT").unwrap_or_else(|_| "development".into());

        let jwt = JwtConfig {
            secret: Self::require_secret("JWT_SECRET", &environment)?,
            expiration_minutes: std::env::var("JWT_EXPIRATION_MINUTES")
                .ok()
                .and_then(|s| s.parse().ok())
                .unwrap_or(1440),
            ..JwtConfig::default()
        };

        Ok(Self {
            http_port: std::env::var("HTTP_PORT")
                .ok()
                .and_then(|p| p.parse().ok())
                .unwrap_or(3000),
            database_path: std::env::var("DATABASE_PATH")
                .unwrap_or_else(|_| "./data/store.db".into()),
            environment,
            jwt,
            log_level: std::env::var("LOG_LEVEL").unwrap_or_else(|_| "info".into()),
            log_dir: std::env::var("LOG_DIR").ok().filter(|s| !s.is_empty()),
            log_json: std::env::var("LOG_JSON")
                .ok()
                .and_then(|v| v.parse().ok())
                .unwrap_or(false),
            bootstrap_admin_username: std::env::var("BOOTSTRAP_ADMIN_USERNAME")
                .ok()
                .filter(|s| !s.is_empty()),
            bootstrap_admin_password: std::env::var("BOOTSTRAP_ADMIN_PASSWORD")
                .ok()
                .filter(|s| !s.is_empty()),
            bootstrap_admin_email: std::env::var("BOOTSTRAP_ADMIN_EMAIL")
                .ok()
                .filter(|s| !s.is_empty()),
            request_timeout_ms: std::env::var("REQUEST_TIMEOUT_MS")
                .ok()
                .and_then(|p| p.parse().ok())
                .unwrap_or(30000),
        })
    }

    /// Configuration for tests: in-process values, nothing read from the environment
    pub fn for_tests() -> Self {
        Self {
            http_port: 0,
            database_path: ":memory:".into(),
            environment: "test".into(),
            jwt: JwtConfig {
                secret: "test-secret-with-at-least-thirty-two-chars".into(),
                ..JwtConfig::default()
            },
            log_level: "warn".into(),
            log_dir: None,
            log_json: false,
            bootstrap_admin_username: None,
            bootstrap_admin_password: None,
            bootstrap_admin_email: None,
            request_timeout_ms: 30000,
        }
    }
}

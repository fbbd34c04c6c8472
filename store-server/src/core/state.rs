use std::sync::Arc;

use shared::models::AccountCreate;
use sqlx::SqlitePool;

use crate::auth::{JwtService, hash_password};
use crate::balance::BalanceService;
use crate::core::{Config, Result, ServerError};
use crate::db::DbService;
use crate::db::repository::account;

/// Shared server state
///
/// Cloned into every handler; all fields are cheap handles.
///
/// | Field | Type | Notes |
/// |-------|------|-------|
/// | config | Config | immutable |
/// | pool | SqlitePool | connection pool |
/// | jwt_service | Arc<JwtService> | token issue / validation |
/// | balances | BalanceService | balance engine over the pool |
#[derive(Clone)]
pub struct ServerState {
    pub config: Config,
    pub pool: SqlitePool,
    pub jwt_service: Arc<JwtService>,
    pub balances: BalanceService,
}

impl ServerState {
    pub fn new(config: Config, pool: SqlitePool, jwt_service: Arc<JwtService>) -> Self {
        let balances = BalanceService::new(pool.clone());
        Self {
            config,
            pool,
            jwt_service,
            balances,
        }
    }

    /// Open the database, apply migrations and seed the first superuser.
    ///
    /// `DATABASE_PATH=:memory:` gives a private in-memory database.
    pub async fn initialize(config: &Config) -> Result<Self> {
        let db = if config.database_path == ":memory:" {
            DbService::in_memory().await?
        } else {
            DbService::new(&config.database_path).await?
        };
        let jwt_service = Arc::new(JwtService::with_config(config.jwt.clone()));
        let state = Self::new(config.clone(), db.pool, jwt_service);
        state.bootstrap_superuser().await?;
        Ok(state)
    }

    /// Create the configured superuser when no account exists yet
    async fn bootstrap_superuser(&self) -> Result<()> {
        let (Some(username), Some(password)) = (
            self.config.bootstrap_admin_username.as_deref(),
            self.config.bootstrap_admin_password.as_deref(),
        ) else {
            return Ok(());
        };
        if account::count(&self.pool).await? > 0 {
            return Ok(());
        }

        let hash = hash_password(password)
            .map_err(|e| ServerError::Config(format!("Failed to hash bootstrap password: {e}")))?;
        let email = self
            .config
            .bootstrap_admin_email
            .clone()
            .unwrap_or_else(|| format!("{username}@localhost"));
        let admin = account::create(
            &self.pool,
            AccountCreate {
                username: username.to_string(),
                email,
                full_name: None,
                password: String::new(),
                is_superuser: Some(true),
            },
            &hash,
        )
        .await?;
        tracing::info!(account_id = admin.id, username = %admin.username, "Bootstrap superuser created");
        Ok(())
    }

    /// JWT service handle
    pub fn get_jwt_service(&self) -> Arc<JwtService> {
        self.jwt_service.clone()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn bootstrap_runs_once() {
        let mut config = Config::for_tests();
        config.bootstrap_admin_username = Some("admin".into());
        config.bootstrap_admin_password = Some("admin-password".into());

        let state = ServerState::initialize(&config).await.unwrap();
        assert_eq!(account::count(&state.pool).await.unwrap(), 1);
        let (admin, hash) = account::find_with_hash(&state.pool, "admin")
            .await
            .unwrap()
            .unwrap();
        assert!(admin.is_superuser);
        assert_eq!(admin.email, "admin@localhost");
        assert!(crate::auth::verify_password("admin-password", &hash).unwrap());

        state.bootstrap_superuser().await.unwrap();
        assert_eq!(account::count(&state.pool).await.unwrap(), 1);
    }
}

//! 服务装配

use std::sync::Arc;
use std::time::Duration;

use gatherup_adapter_postgres::{PostgresConfig, TransactionManager, check_connection, create_pool};
use gatherup_auth_core::TokenIssuer;
use gatherup_common::{RetryConfig, connect_with_retry};
use gatherup_config::{AuthConfig, CleanupConfig, DatabaseConfig};
use gatherup_errors::{AuthError, AuthResult};
use secrecy::ExposeSecret;
use sqlx::PgPool;
use tracing::info;

use crate::application::{AuthCoordinator, SessionSettings};
use crate::domain::repositories::{IdentityStore, RefreshTokenStore};
use crate::domain::services::CredentialService;
use crate::infrastructure::cleanup::CleanupTask;
use crate::infrastructure::persistence::{
    InMemoryIdentityStore, InMemoryRefreshTokenStore, PostgresIdentityStore,
    PostgresRefreshTokenStore,
};

/// 已装配的会话服务
pub struct SessionService {
    pub coordinator: Arc<AuthCoordinator>,
    pub refresh_tokens: Arc<dyn RefreshTokenStore>,
}

impl SessionService {
    /// 用给定存储装配协调器
    pub fn assemble(
        config: &AuthConfig,
        identities: Arc<dyn IdentityStore>,
        refresh_tokens: Arc<dyn RefreshTokenStore>,
    ) -> AuthResult<Self> {
        let tokens = TokenIssuer::new(config.jwt_secret.expose_secret().as_bytes())?;
        let credentials = CredentialService::new(config.work_factor())?;

        let coordinator = AuthCoordinator::new(
            identities,
            refresh_tokens.clone(),
            Arc::new(credentials),
            Arc::new(tokens),
            SessionSettings::from(config),
        );

        Ok(Self {
            coordinator: Arc::new(coordinator),
            refresh_tokens,
        })
    }

    /// PostgreSQL 存储
    pub fn postgres(config: &AuthConfig, pool: PgPool) -> AuthResult<Self> {
        let tx = TransactionManager::new(pool);
        Self::assemble(
            config,
            Arc::new(PostgresIdentityStore::new(tx.clone())),
            Arc::new(PostgresRefreshTokenStore::new(tx)),
        )
    }

    /// 内存存储，用于本地调试与测试
    pub fn in_memory(config: &AuthConfig) -> AuthResult<Self> {
        Self::assemble(
            config,
            Arc::new(InMemoryIdentityStore::new()),
            Arc::new(InMemoryRefreshTokenStore::new()),
        )
    }

    pub fn cleanup_task(&self, config: &CleanupConfig) -> Arc<CleanupTask> {
        Arc::new(CleanupTask::new(
            self.refresh_tokens.clone(),
            Duration::from_secs(config.interval_secs.max(1)),
            Duration::from_secs(config.retention_secs),
        ))
    }
}

/// 连接数据库（启动期带重试）
pub async fn connect_database(config: &DatabaseConfig) -> AuthResult<PgPool> {
    let pg_config = PostgresConfig::new(config.url.expose_secret().clone())
        .with_max_connections(config.max_connections)
        .with_connect_timeout(Duration::from_secs(config.connect_timeout_secs));

    let pool = connect_with_retry(&RetryConfig::default(), "postgres", || async {
        let pool = create_pool(&pg_config).await?;
        check_connection(&pool).await?;
        Ok::<_, AuthError>(pool)
    })
    .await?;

    info!(max_connections = config.max_connections, "Database pool ready");
    Ok(pool)
}

/// 执行数据库迁移
pub async fn run_migrations(pool: &PgPool) -> AuthResult<()> {
    sqlx::migrate!("./migrations")
        .run(pool)
        .await
        .map_err(|e| AuthError::persistence(format!("Failed to run migrations: {}", e)))?;
    info!("Database migrations applied");
    Ok(())
}

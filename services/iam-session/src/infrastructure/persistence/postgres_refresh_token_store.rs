//! PostgreSQL 刷新令牌存储

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use gatherup_adapter_postgres::{TransactionManager, persistence_error};
use gatherup_common::{AccountId, RefreshTokenId};
use gatherup_errors::{AuthError, AuthResult};
use sqlx::FromRow;
use tracing::debug;
use uuid::Uuid;

use crate::domain::entities::RefreshTokenRecord;
use crate::domain::repositories::RefreshTokenStore;
use crate::domain::value_objects::RefreshSecretHash;

pub struct PostgresRefreshTokenStore {
    tx: TransactionManager,
}

impl PostgresRefreshTokenStore {
    pub fn new(tx: TransactionManager) -> Self {
        Self { tx }
    }
}

#[async_trait]
impl RefreshTokenStore for PostgresRefreshTokenStore {
    async fn save(&self, record: &RefreshTokenRecord) -> AuthResult<()> {
        debug!(record_id = %record.id, "Saving refresh token");

        sqlx::query(
            r#"
            INSERT INTO refresh_tokens (id, account_id, secret_hash, device, created_at,
                                        expires_at, revoked, replaced_by)
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8)
            "#,
        )
        .bind(record.id.0)
        .bind(record.account_id.0)
        .bind(record.secret_hash.as_str())
        .bind(record.device.as_deref())
        .bind(record.created_at)
        .bind(record.expires_at)
        .bind(record.revoked)
        .bind(record.replaced_by.map(|id| id.0))
        .execute(self.tx.pool())
        .await
        .map_err(|e| persistence_error("Failed to save refresh token", e))?;

        Ok(())
    }

    async fn find_by_hash(
        &self,
        hash: &RefreshSecretHash,
    ) -> AuthResult<Option<RefreshTokenRecord>> {
        let row = sqlx::query_as::<_, RefreshTokenRow>(
            r#"
            SELECT id, account_id, secret_hash, device, created_at, expires_at, revoked, replaced_by
            FROM refresh_tokens
            WHERE secret_hash = $1
            "#,
        )
        .bind(hash.as_str())
        .fetch_optional(self.tx.pool())
        .await
        .map_err(|e| persistence_error("Failed to find refresh token", e))?;

        Ok(row.map(Into::into))
    }

    async fn rotate(
        &self,
        old_id: &RefreshTokenId,
        new_hash: &RefreshSecretHash,
        new_expires_at: DateTime<Utc>,
    ) -> AuthResult<RefreshTokenId> {
        let new_id = RefreshTokenId::new();
        let mut tx = self.tx.begin().await?;

        // 条件更新：并发轮换时只有一个事务能匹配到 revoked = FALSE 的行
        let revoked: Option<(Uuid, Option<String>)> = sqlx::query_as(
            r#"
            UPDATE refresh_tokens
            SET revoked = TRUE, replaced_by = $2
            WHERE id = $1 AND revoked = FALSE
            RETURNING account_id, device
            "#,
        )
        .bind(old_id.0)
        .bind(new_id.0)
        .fetch_optional(&mut *tx)
        .await
        .map_err(|e| persistence_error("Failed to revoke refresh token", e))?;

        let Some((account_id, device)) = revoked else {
            return Err(AuthError::TokenNotFoundOrRevoked);
        };

        sqlx::query(
            r#"
            INSERT INTO refresh_tokens (id, account_id, secret_hash, device, created_at,
                                        expires_at, revoked)
            VALUES ($1, $2, $3, $4, NOW(), $5, FALSE)
            "#,
        )
        .bind(new_id.0)
        .bind(account_id)
        .bind(new_hash.as_str())
        .bind(device)
        .bind(new_expires_at)
        .execute(&mut *tx)
        .await
        .map_err(|e| persistence_error("Failed to insert rotated refresh token", e))?;

        TransactionManager::commit(tx).await?;
        debug!(previous = %old_id, next = %new_id, "Refresh token rotated");
        Ok(new_id)
    }

    async fn revoke(&self, id: &RefreshTokenId) -> AuthResult<()> {
        let result = sqlx::query("UPDATE refresh_tokens SET revoked = TRUE WHERE id = $1")
            .bind(id.0)
            .execute(self.tx.pool())
            .await
            .map_err(|e| persistence_error("Failed to revoke refresh token", e))?;

        if result.rows_affected() == 0 {
            return Err(AuthError::not_found("refresh token"));
        }
        Ok(())
    }

    async fn revoke_all_for_account(&self, account_id: &AccountId) -> AuthResult<u64> {
        let result = sqlx::query(
            "UPDATE refresh_tokens SET revoked = TRUE WHERE account_id = $1 AND revoked = FALSE",
        )
        .bind(account_id.0)
        .execute(self.tx.pool())
        .await
        .map_err(|e| persistence_error("Failed to revoke refresh tokens", e))?;

        Ok(result.rows_affected())
    }

    async fn delete_expired(&self, before: DateTime<Utc>) -> AuthResult<u64> {
        let result = sqlx::query("DELETE FROM refresh_tokens WHERE expires_at < $1")
            .bind(before)
            .execute(self.tx.pool())
            .await
            .map_err(|e| persistence_error("Failed to delete expired refresh tokens", e))?;

        Ok(result.rows_affected())
    }
}

#[derive(FromRow)]
struct RefreshTokenRow {
    id: Uuid,
    account_id: Uuid,
    secret_hash: String,
    device: Option<String>,
    created_at: DateTime<Utc>,
    expires_at: DateTime<Utc>,
    revoked: bool,
    replaced_by: Option<Uuid>,
}

impl From<RefreshTokenRow> for RefreshTokenRecord {
    fn from(row: RefreshTokenRow) -> Self {
        Self {
            id: RefreshTokenId::from_uuid(row.id),
            account_id: AccountId::from_uuid(row.account_id),
            secret_hash: RefreshSecretHash::from_stored(row.secret_hash),
            device: row.device,
            created_at: row.created_at,
            expires_at: row.expires_at,
            revoked: row.revoked,
            replaced_by: row.replaced_by.map(RefreshTokenId::from_uuid),
        }
    }
}

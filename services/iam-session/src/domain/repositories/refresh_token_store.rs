//! 刷新令牌存储

use std::time::Duration;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use gatherup_common::{AccountId, RefreshTokenId};
use gatherup_errors::{AuthError, AuthResult};

use crate::domain::entities::{IssuedRefreshToken, RefreshTokenRecord};
use crate::domain::value_objects::{RefreshSecret, RefreshSecretHash};

/// 刷新令牌存储
///
/// 实现只保存密钥摘要。`rotate` 必须是原子的：并发轮换同一条记录时至多一个成功。
#[async_trait]
pub trait RefreshTokenStore: Send + Sync {
    /// 保存新记录，摘要冲突时返回 `PersistenceFailure`
    async fn save(&self, record: &RefreshTokenRecord) -> AuthResult<()>;

    async fn find_by_hash(&self, hash: &RefreshSecretHash)
    -> AuthResult<Option<RefreshTokenRecord>>;

    /// 撤销旧记录并插入后继记录（继承账户与设备）
    ///
    /// 旧记录不存在或已撤销时返回 `TokenNotFoundOrRevoked`，且不做任何修改。
    async fn rotate(
        &self,
        old_id: &RefreshTokenId,
        new_hash: &RefreshSecretHash,
        new_expires_at: DateTime<Utc>,
    ) -> AuthResult<RefreshTokenId>;

    /// 撤销（幂等），记录不存在时返回 `NotFound`
    async fn revoke(&self, id: &RefreshTokenId) -> AuthResult<()>;

    /// 撤销账户下所有未撤销的记录，返回撤销数量
    async fn revoke_all_for_account(&self, account_id: &AccountId) -> AuthResult<u64>;

    /// 删除 `expires_at < before` 的记录，返回删除数量
    async fn delete_expired(&self, before: DateTime<Utc>) -> AuthResult<u64>;

    /// 生成密钥并保存摘要，原始密钥只在返回值中出现
    async fn issue(
        &self,
        account_id: &AccountId,
        secret_len: usize,
        ttl: Duration,
        device: Option<&str>,
    ) -> AuthResult<IssuedRefreshToken> {
        let ttl = chrono::Duration::from_std(ttl)
            .map_err(|_| AuthError::crypto("refresh token ttl out of range"))?;
        let secret = RefreshSecret::generate(secret_len)?;
        let now = Utc::now();
        let expires_at = now
            .checked_add_signed(ttl)
            .ok_or_else(|| AuthError::crypto("refresh token expiry out of range"))?;
        let record = RefreshTokenRecord::new(
            *account_id,
            RefreshSecretHash::of(&secret),
            device.map(str::to_string),
            now,
            expires_at,
        );

        self.save(&record).await?;

        Ok(IssuedRefreshToken {
            id: record.id,
            secret,
            expires_at: record.expires_at,
        })
    }

    /// 按原始密钥查找：先哈希再查
    async fn lookup_by_raw_secret(
        &self,
        secret: &RefreshSecret,
    ) -> AuthResult<Option<RefreshTokenRecord>> {
        self.find_by_hash(&RefreshSecretHash::of(secret)).await
    }
}

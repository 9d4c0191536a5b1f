//! 内存存储
//!
//! 与 PostgreSQL 实现语义一致：每个存储一把互斥锁，多行修改在同一临界区内完成，
//! 因此同样满足原子创建与原子轮换。

use std::collections::HashMap;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use gatherup_common::{AccountId, RefreshTokenId};
use gatherup_errors::{AuthError, AuthResult};
use tokio::sync::Mutex;

use crate::domain::entities::{Account, Credential, CredentialKind, RefreshTokenRecord};
use crate::domain::repositories::{IdentityStore, RefreshTokenStore};
use crate::domain::value_objects::{HashedPassword, MobileNumber, RefreshSecretHash};

#[derive(Default)]
struct IdentityState {
    accounts: HashMap<AccountId, Account>,
    credentials: Vec<Credential>,
}

/// 内存身份存储
#[derive(Default)]
pub struct InMemoryIdentityStore {
    state: Mutex<IdentityState>,
}

impl InMemoryIdentityStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// 未删除账户数
    pub async fn active_accounts(&self) -> usize {
        let state = self.state.lock().await;
        state.accounts.values().filter(|a| a.is_active()).count()
    }

    /// 未删除凭证数
    pub async fn active_credentials(&self) -> usize {
        let state = self.state.lock().await;
        state.credentials.iter().filter(|c| !c.deleted).count()
    }
}

#[async_trait]
impl IdentityStore for InMemoryIdentityStore {
    async fn create_account_with_credential(
        &self,
        mobile: &MobileNumber,
        password_hash: &HashedPassword,
    ) -> AuthResult<AccountId> {
        let mut state = self.state.lock().await;

        let taken = state
            .accounts
            .values()
            .any(|a| a.is_active() && a.mobile_normalized == mobile.normalized())
            || state.credentials.iter().any(|c| {
                !c.deleted && c.kind == CredentialKind::Password && c.identifier == mobile.normalized()
            });
        if taken {
            return Err(AuthError::DuplicateIdentity);
        }

        let now = Utc::now();
        let account = Account::register(mobile, now);
        let account_id = account.id;
        state.credentials.push(Credential::password(
            account_id,
            mobile.normalized(),
            password_hash.clone(),
            now,
        ));
        state.accounts.insert(account_id, account);

        Ok(account_id)
    }

    async fn find_credential_by_identifier(
        &self,
        identifier: &str,
    ) -> AuthResult<Option<Credential>> {
        let state = self.state.lock().await;
        Ok(state
            .credentials
            .iter()
            .find(|c| {
                !c.deleted
                    && c.kind == CredentialKind::Password
                    && c.identifier == identifier
                    && state
                        .accounts
                        .get(&c.account_id)
                        .is_some_and(Account::is_active)
            })
            .cloned())
    }

    async fn get_account_by_id(&self, account_id: &str) -> AuthResult<Option<Account>> {
        let account_id = AccountId::parse(account_id)
            .ok_or_else(|| AuthError::invalid_input("malformed account id"))?;
        let state = self.state.lock().await;
        Ok(state
            .accounts
            .get(&account_id)
            .filter(|a| a.is_active())
            .cloned())
    }

    async fn deactivate_account(&self, account_id: &AccountId) -> AuthResult<()> {
        let mut state = self.state.lock().await;
        let now = Utc::now();

        match state.accounts.get_mut(account_id) {
            Some(account) if account.is_active() => account.deactivate(now),
            _ => return Err(AuthError::not_found("account")),
        }
        for credential in state
            .credentials
            .iter_mut()
            .filter(|c| c.account_id == *account_id)
        {
            credential.deleted = true;
        }
        Ok(())
    }
}

/// 内存刷新令牌存储
#[derive(Default)]
pub struct InMemoryRefreshTokenStore {
    records: Mutex<HashMap<RefreshTokenId, RefreshTokenRecord>>,
}

impl InMemoryRefreshTokenStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// 记录总数（含已撤销）
    pub async fn len(&self) -> usize {
        self.records.lock().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.records.lock().await.is_empty()
    }

    /// 账户下未撤销的记录
    pub async fn active_for_account(&self, account_id: &AccountId) -> Vec<RefreshTokenRecord> {
        self.records
            .lock()
            .await
            .values()
            .filter(|r| r.account_id == *account_id && !r.revoked)
            .cloned()
            .collect()
    }
}

fn hash_taken(records: &HashMap<RefreshTokenId, RefreshTokenRecord>, hash: &RefreshSecretHash) -> bool {
    records.values().any(|r| r.secret_hash == *hash)
}

#[async_trait]
impl RefreshTokenStore for InMemoryRefreshTokenStore {
    async fn save(&self, record: &RefreshTokenRecord) -> AuthResult<()> {
        let mut records = self.records.lock().await;
        if records.contains_key(&record.id) || hash_taken(&records, &record.secret_hash) {
            return Err(AuthError::persistence("refresh token already exists"));
        }
        records.insert(record.id, record.clone());
        Ok(())
    }

    async fn find_by_hash(
        &self,
        hash: &RefreshSecretHash,
    ) -> AuthResult<Option<RefreshTokenRecord>> {
        let records = self.records.lock().await;
        Ok(records.values().find(|r| r.secret_hash == *hash).cloned())
    }

    async fn rotate(
        &self,
        old_id: &RefreshTokenId,
        new_hash: &RefreshSecretHash,
        new_expires_at: DateTime<Utc>,
    ) -> AuthResult<RefreshTokenId> {
        let mut records = self.records.lock().await;

        let (account_id, device) = match records.get(old_id) {
            Some(old) if !old.revoked => (old.account_id, old.device.clone()),
            _ => return Err(AuthError::TokenNotFoundOrRevoked),
        };
        if hash_taken(&records, new_hash) {
            return Err(AuthError::persistence("refresh token already exists"));
        }

        let successor = RefreshTokenRecord::new(
            account_id,
            new_hash.clone(),
            device,
            Utc::now(),
            new_expires_at,
        );
        let new_id = successor.id;

        if let Some(old) = records.get_mut(old_id) {
            old.revoked = true;
            old.replaced_by = Some(new_id);
        }
        records.insert(new_id, successor);

        Ok(new_id)
    }

    async fn revoke(&self, id: &RefreshTokenId) -> AuthResult<()> {
        let mut records = self.records.lock().await;
        let record = records
            .get_mut(id)
            .ok_or_else(|| AuthError::not_found("refresh token"))?;
        record.revoked = true;
        Ok(())
    }

    async fn revoke_all_for_account(&self, account_id: &AccountId) -> AuthResult<u64> {
        let mut records = self.records.lock().await;
        let mut revoked = 0;
        for record in records
            .values_mut()
            .filter(|r| r.account_id == *account_id && !r.revoked)
        {
            record.revoked = true;
            revoked += 1;
        }
        Ok(revoked)
    }

    async fn delete_expired(&self, before: DateTime<Utc>) -> AuthResult<u64> {
        let mut records = self.records.lock().await;
        let before_len = records.len();
        records.retain(|_, r| r.expires_at >= before);
        Ok((before_len - records.len()) as u64)
    }
}

//! 账户与凭证存储

use async_trait::async_trait;
use gatherup_common::AccountId;
use gatherup_errors::AuthResult;

use crate::domain::entities::{Account, Credential};
use crate::domain::value_objects::{HashedPassword, MobileNumber};

/// 账户与凭证存储
#[async_trait]
pub trait IdentityStore: Send + Sync {
    /// 原子地创建账户及其密码凭证
    ///
    /// 规范化手机号已被未删除的账户或凭证占用时返回 `DuplicateIdentity`，
    /// 失败时不留下任何记录。
    async fn create_account_with_credential(
        &self,
        mobile: &MobileNumber,
        password_hash: &HashedPassword,
    ) -> AuthResult<AccountId>;

    /// 按规范化手机号查找未删除的密码凭证
    async fn find_credential_by_identifier(&self, identifier: &str)
    -> AuthResult<Option<Credential>>;

    /// 按 ID 查找未删除账户，ID 不是合法 UUID 时返回 `InvalidInput`
    async fn get_account_by_id(&self, account_id: &str) -> AuthResult<Option<Account>>;

    /// 软删除账户及其凭证，账户不存在时返回 `NotFound`
    async fn deactivate_account(&self, account_id: &AccountId) -> AuthResult<()>;
}

//! 刷新令牌记录

use chrono::{DateTime, Utc};
use gatherup_common::{AccountId, RefreshTokenId};

use crate::domain::value_objects::{RefreshSecret, RefreshSecretHash};

/// 记录在某一时刻所处的状态
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RefreshTokenState {
    Active,
    /// 已被轮换，指向后继记录
    Rotated,
    Revoked,
    Expired,
}

/// 持久化的刷新令牌记录，只保存密钥摘要
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RefreshTokenRecord {
    pub id: RefreshTokenId,
    pub account_id: AccountId,
    pub secret_hash: RefreshSecretHash,
    /// 设备信息
    pub device: Option<String>,
    pub created_at: DateTime<Utc>,
    pub expires_at: DateTime<Utc>,
    /// 只会从 false 变为 true
    pub revoked: bool,
    /// 轮换产生的后继记录
    pub replaced_by: Option<RefreshTokenId>,
}

impl RefreshTokenRecord {
    pub fn new(
        account_id: AccountId,
        secret_hash: RefreshSecretHash,
        device: Option<String>,
        created_at: DateTime<Utc>,
        expires_at: DateTime<Utc>,
    ) -> Self {
        Self {
            id: RefreshTokenId::new(),
            account_id,
            secret_hash,
            device,
            created_at,
            expires_at,
            revoked: false,
            replaced_by: None,
        }
    }

    /// `now >= expires_at` 即视为过期
    pub fn is_expired_at(&self, now: DateTime<Utc>) -> bool {
        now >= self.expires_at
    }

    /// 未撤销且未过期
    pub fn is_usable_at(&self, now: DateTime<Utc>) -> bool {
        !self.revoked && !self.is_expired_at(now)
    }

    pub fn state_at(&self, now: DateTime<Utc>) -> RefreshTokenState {
        match (self.revoked, self.replaced_by) {
            (true, Some(_)) => RefreshTokenState::Rotated,
            (true, None) => RefreshTokenState::Revoked,
            (false, _) if self.is_expired_at(now) => RefreshTokenState::Expired,
            (false, _) => RefreshTokenState::Active,
        }
    }
}

/// 新签发的刷新令牌：原始密钥只在这里出现一次
#[derive(Debug)]
pub struct IssuedRefreshToken {
    pub id: RefreshTokenId,
    pub secret: RefreshSecret,
    pub expires_at: DateTime<Utc>,
}

//! Credential 实体

use std::fmt;

use chrono::{DateTime, Utc};
use gatherup_common::AccountId;

use crate::domain::value_objects::HashedPassword;

/// 凭证类型，目前只有密码
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum CredentialKind {
    Password,
}

impl CredentialKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Password => "password",
        }
    }

    pub fn parse(value: &str) -> Option<Self> {
        match value {
            "password" => Some(Self::Password),
            _ => None,
        }
    }
}

impl fmt::Display for CredentialKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// 账户凭证
///
/// `(kind, identifier)` 在未删除凭证中唯一，`identifier` 为规范化手机号。
#[derive(Debug, Clone)]
pub struct Credential {
    pub account_id: AccountId,
    pub kind: CredentialKind,
    pub identifier: String,
    pub password_hash: HashedPassword,
    pub created_at: DateTime<Utc>,
    pub deleted: bool,
}

impl Credential {
    pub fn password(
        account_id: AccountId,
        identifier: impl Into<String>,
        password_hash: HashedPassword,
        now: DateTime<Utc>,
    ) -> Self {
        Self {
            account_id,
            kind: CredentialKind::Password,
            identifier: identifier.into(),
            password_hash,
            created_at: now,
            deleted: false,
        }
    }
}

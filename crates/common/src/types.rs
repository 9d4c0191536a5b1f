//! 通用类型定义

use derive_more::{Display, From};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::utils::{new_id, parse_canonical_id};

/// 账户 ID
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Display, From)]
#[display("{_0}")]
pub struct AccountId(pub Uuid);

impl AccountId {
    pub fn new() -> Self {
        Self(new_id())
    }

    pub fn from_uuid(uuid: Uuid) -> Self {
        Self(uuid)
    }

    /// 仅接受规范的 36 字符连字符形式
    pub fn parse(s: &str) -> Option<Self> {
        parse_canonical_id(s).map(Self)
    }
}

impl Default for AccountId {
    fn default() -> Self {
        Self::new()
    }
}

/// 刷新令牌记录 ID
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Display, From)]
#[display("{_0}")]
pub struct RefreshTokenId(pub Uuid);

impl RefreshTokenId {
    pub fn new() -> Self {
        Self(new_id())
    }

    pub fn from_uuid(uuid: Uuid) -> Self {
        Self(uuid)
    }

    pub fn parse(s: &str) -> Option<Self> {
        parse_canonical_id(s).map(Self)
    }
}

impl Default for RefreshTokenId {
    fn default() -> Self {
        Self::new()
    }
}

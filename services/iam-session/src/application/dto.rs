//! 数据传输对象

use std::fmt;

use chrono::{DateTime, Utc};
use gatherup_common::AccountId;

use crate::domain::value_objects::RefreshSecret;

/// 登录或刷新成功后返回给客户端的令牌对
pub struct SessionTokens {
    pub account_id: AccountId,
    pub access_token: String,
    pub access_expires_at: DateTime<Utc>,
    /// 原始刷新密钥，只返回这一次
    pub refresh_token: RefreshSecret,
    pub refresh_expires_at: DateTime<Utc>,
}

impl fmt::Debug for SessionTokens {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SessionTokens")
            .field("account_id", &self.account_id)
            .field("access_token", &"[REDACTED]")
            .field("access_expires_at", &self.access_expires_at)
            .field("refresh_token", &self.refresh_token)
            .field("refresh_expires_at", &self.refresh_expires_at)
            .finish()
    }
}

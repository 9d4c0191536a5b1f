//! Account 实体

use chrono::{DateTime, Utc};
use gatherup_common::AccountId;
use serde::Serialize;

use crate::domain::value_objects::MobileNumber;

/// 账户
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Account {
    pub id: AccountId,
    /// 注册时提交的原始手机号
    pub mobile_number: String,
    /// 规范化手机号（未删除账户中唯一）
    pub mobile_normalized: String,
    pub email: Option<String>,
    pub username: Option<String>,
    pub display_name: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: Option<DateTime<Utc>>,
    /// 软删除标记
    #[serde(skip)]
    pub deleted: bool,
}

impl Account {
    /// 以手机号注册新账户
    pub fn register(mobile: &MobileNumber, now: DateTime<Utc>) -> Self {
        Self {
            id: AccountId::new(),
            mobile_number: mobile.raw().to_string(),
            mobile_normalized: mobile.normalized().to_string(),
            email: None,
            username: None,
            display_name: None,
            created_at: now,
            updated_at: None,
            deleted: false,
        }
    }

    pub fn is_active(&self) -> bool {
        !self.deleted
    }

    /// 软删除
    pub fn deactivate(&mut self, now: DateTime<Utc>) {
        self.deleted = true;
        self.updated_at = Some(now);
    }
}

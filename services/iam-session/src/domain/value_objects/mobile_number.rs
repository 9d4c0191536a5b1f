//! MobileNumber 值对象

use gatherup_errors::{AuthError, AuthResult};

/// 规范化后允许的最少数字位数
pub const MIN_MOBILE_DIGITS: usize = 7;
/// 规范化后允许的最多数字位数（E.164 上限）
pub const MAX_MOBILE_DIGITS: usize = 15;

/// 规范化手机号：去掉首尾空白，只保留数字；`+` 仅在它是第一个字符时保留
///
/// 纯函数且幂等，`normalize_mobile(normalize_mobile(x)) == normalize_mobile(x)`。
pub fn normalize_mobile(raw: &str) -> String {
    let trimmed = raw.trim();
    let mut normalized = String::with_capacity(trimmed.len());
    for (i, c) in trimmed.char_indices() {
        if c.is_ascii_digit() || (c == '+' && i == 0) {
            normalized.push(c);
        }
    }
    normalized
}

/// 已校验的手机号，同时保存原始输入与规范形式
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MobileNumber {
    raw: String,
    normalized: String,
}

impl MobileNumber {
    /// 校验格式：只允许数字、前导 `+` 和常见分隔符（空格 `-` `(` `)` `.`），
    /// 规范化后为 7–15 位数字
    pub fn parse(raw: &str) -> AuthResult<Self> {
        let trimmed = raw.trim();
        if trimmed.is_empty() {
            return Err(AuthError::invalid_input("mobile number is required"));
        }

        let allowed = trimmed.char_indices().all(|(i, c)| {
            c.is_ascii_digit() || matches!(c, ' ' | '-' | '(' | ')' | '.') || (c == '+' && i == 0)
        });
        if !allowed {
            return Err(AuthError::invalid_input("mobile number has invalid characters"));
        }

        let normalized = normalize_mobile(trimmed);
        let digits = normalized.trim_start_matches('+').len();
        if !(MIN_MOBILE_DIGITS..=MAX_MOBILE_DIGITS).contains(&digits) {
            return Err(AuthError::invalid_input(format!(
                "mobile number must have {} to {} digits",
                MIN_MOBILE_DIGITS, MAX_MOBILE_DIGITS
            )));
        }

        Ok(Self {
            raw: trimmed.to_string(),
            normalized,
        })
    }

    pub fn raw(&self) -> &str {
        &self.raw
    }

    /// 凭证标识（登录查找键）
    pub fn normalized(&self) -> &str {
        &self.normalized
    }
}

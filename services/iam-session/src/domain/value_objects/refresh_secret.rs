//! 刷新令牌密钥
//!
//! 原始密钥只在生成和唯一一次返回给调用方时存在；持久化与日志只使用它的
//! SHA-256 摘要。两者是不同类型，摘要只能通过哈希函数得到。

use std::fmt;

use base64::{Engine as _, engine::general_purpose::URL_SAFE_NO_PAD};
use gatherup_errors::{AuthError, AuthResult};
use rand::RngCore;
use rand::rngs::OsRng;
use sha2::{Digest, Sha256};

/// 原始刷新令牌密钥（base64url，无填充）
pub struct RefreshSecret(String);

impl RefreshSecret {
    /// 生成 `byte_len` 字节的随机密钥
    pub fn generate(byte_len: usize) -> AuthResult<Self> {
        if byte_len == 0 {
            return Err(AuthError::crypto("refresh secret length must be positive"));
        }
        let mut bytes = vec![0u8; byte_len];
        OsRng
            .try_fill_bytes(&mut bytes)
            .map_err(|e| AuthError::crypto(format!("Failed to generate refresh secret: {}", e)))?;
        Ok(Self(URL_SAFE_NO_PAD.encode(&bytes)))
    }

    /// 包装调用方提交的密钥
    pub fn from_presented(raw: impl Into<String>) -> Self {
        Self(raw.into())
    }

    pub fn expose(&self) -> &str {
        &self.0
    }

    pub fn into_inner(self) -> String {
        self.0
    }
}

impl fmt::Debug for RefreshSecret {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("RefreshSecret([REDACTED])")
    }
}

/// 刷新令牌密钥的单向摘要（SHA-256，base64url）
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct RefreshSecretHash(String);

impl RefreshSecretHash {
    pub fn of(secret: &RefreshSecret) -> Self {
        let digest = Sha256::digest(secret.expose().as_bytes());
        Self(URL_SAFE_NO_PAD.encode(digest))
    }

    pub(crate) fn from_stored(hash: String) -> Self {
        Self(hash)
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

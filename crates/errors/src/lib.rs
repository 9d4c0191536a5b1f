//! gatherup-errors - 统一错误处理
//!
//! 会话子系统的封闭错误分类。核心只返回类型化的错误，
//! 由边界层（传输层）决定映射到何种协议状态码。

use thiserror::Error;

/// 认证/会话错误类型
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum AuthError {
    #[error("Invalid input: {0}")]
    InvalidInput(String),

    #[error("Identity already exists")]
    DuplicateIdentity,

    /// 未知标识与密码错误共用同一个值，调用方无法区分
    #[error("Invalid credentials")]
    InvalidCredentials,

    #[error("Refresh token not found or revoked")]
    TokenNotFoundOrRevoked,

    #[error("Token expired")]
    TokenExpired,

    #[error("Invalid token: {0}")]
    InvalidToken(String),

    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Persistence failure: {0}")]
    PersistenceFailure(String),

    #[error("Internal crypto failure: {0}")]
    InternalCryptoFailure(String),

    #[error("Deadline exceeded: {0}")]
    DeadlineExceeded(String),
}

impl AuthError {
    pub fn invalid_input(msg: impl Into<String>) -> Self {
        Self::InvalidInput(msg.into())
    }

    pub fn invalid_token(msg: impl Into<String>) -> Self {
        Self::InvalidToken(msg.into())
    }

    pub fn not_found(msg: impl Into<String>) -> Self {
        Self::NotFound(msg.into())
    }

    pub fn persistence(msg: impl Into<String>) -> Self {
        Self::PersistenceFailure(msg.into())
    }

    pub fn crypto(msg: impl Into<String>) -> Self {
        Self::InternalCryptoFailure(msg.into())
    }

    pub fn deadline_exceeded(msg: impl Into<String>) -> Self {
        Self::DeadlineExceeded(msg.into())
    }

    /// 稳定的错误代码，供边界层映射和日志字段使用
    pub fn kind(&self) -> &'static str {
        match self {
            Self::InvalidInput(_) => "invalid_input",
            Self::DuplicateIdentity => "duplicate_identity",
            Self::InvalidCredentials => "invalid_credentials",
            Self::TokenNotFoundOrRevoked => "token_not_found_or_revoked",
            Self::TokenExpired => "token_expired",
            Self::InvalidToken(_) => "invalid_token",
            Self::NotFound(_) => "not_found",
            Self::PersistenceFailure(_) => "persistence_failure",
            Self::InternalCryptoFailure(_) => "internal_crypto_failure",
            Self::DeadlineExceeded(_) => "deadline_exceeded",
        }
    }

    /// 是否为调用方造成的错误（4xx 语义）
    pub fn is_client_error(&self) -> bool {
        match self {
            Self::InvalidInput(_)
            | Self::DuplicateIdentity
            | Self::InvalidCredentials
            | Self::TokenNotFoundOrRevoked
            | Self::TokenExpired
            | Self::InvalidToken(_)
            | Self::NotFound(_) => true,
            Self::PersistenceFailure(_)
            | Self::InternalCryptoFailure(_)
            | Self::DeadlineExceeded(_) => false,
        }
    }
}

/// Result 类型别名
pub type AuthResult<T> = Result<T, AuthError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_invalid_credentials_is_a_single_value() {
        assert_eq!(AuthError::InvalidCredentials, AuthError::InvalidCredentials);
        assert_eq!(AuthError::InvalidCredentials.to_string(), "Invalid credentials");
    }

    #[test]
    fn test_client_error_classification() {
        assert!(AuthError::invalid_input("mobile").is_client_error());
        assert!(AuthError::TokenExpired.is_client_error());
        assert!(!AuthError::persistence("connection reset").is_client_error());
        assert!(!AuthError::crypto("rng").is_client_error());
        assert!(!AuthError::deadline_exceeded("login").is_client_error());
    }

    #[test]
    fn test_kind_codes() {
        assert_eq!(AuthError::DuplicateIdentity.kind(), "duplicate_identity");
        assert_eq!(
            AuthError::TokenNotFoundOrRevoked.kind(),
            "token_not_found_or_revoked"
        );
        assert_eq!(AuthError::not_found("account").kind(), "not_found");
    }
}

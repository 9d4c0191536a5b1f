//! gatherup-auth-core - 访问令牌签发与校验
//!
//! HS256 JWT。签名算法固定，校验端拒绝任何其他算法（包括其他 HMAC 变体）。

use std::collections::BTreeSet;
use std::time::Duration;

use chrono::{DateTime, Utc};
use gatherup_common::AccountId;
use gatherup_errors::{AuthError, AuthResult};
use jsonwebtoken::{
    Algorithm, DecodingKey, EncodingKey, Header, Validation, decode, encode, errors::ErrorKind,
};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// 固定的签名算法
pub const SIGNING_ALGORITHM: Algorithm = Algorithm::HS256;

/// JWT Claims
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Claims {
    /// Subject (account ID)
    pub sub: String,
    /// Roles（有序集合，为空时不序列化）
    #[serde(default, skip_serializing_if = "BTreeSet::is_empty")]
    pub roles: BTreeSet<String>,
    /// Issued at
    pub iat: i64,
    /// Expiration time
    pub exp: i64,
    /// JWT ID
    #[serde(default)]
    pub jti: String,
}

impl Claims {
    pub fn account_id(&self) -> AuthResult<AccountId> {
        AccountId::parse(&self.sub)
            .ok_or_else(|| AuthError::invalid_token("subject is not an account id"))
    }

    pub fn has_role(&self, role: &str) -> bool {
        self.roles.contains(role)
    }
}

/// 签发结果
#[derive(Debug, Clone)]
pub struct IssuedAccessToken {
    pub token: String,
    pub expires_at: DateTime<Utc>,
}

/// 访问令牌签发器
///
/// 密钥在构造时注入，进程内不轮换。
#[derive(Clone)]
pub struct TokenIssuer {
    encoding_key: EncodingKey,
    decoding_key: DecodingKey,
}

impl TokenIssuer {
    pub fn new(secret: &[u8]) -> AuthResult<Self> {
        if secret.is_empty() {
            return Err(AuthError::crypto("signing secret must not be empty"));
        }
        Ok(Self {
            encoding_key: EncodingKey::from_secret(secret),
            decoding_key: DecodingKey::from_secret(secret),
        })
    }

    /// 签发访问令牌，`exp = iat + ttl`
    pub fn issue<I>(&self, account_id: &AccountId, roles: I, ttl: Duration) -> AuthResult<IssuedAccessToken>
    where
        I: IntoIterator<Item = String>,
    {
        let ttl_secs = i64::try_from(ttl.as_secs())
            .map_err(|_| AuthError::crypto("access token ttl out of range"))?;
        let iat = Utc::now().timestamp();
        let exp = iat
            .checked_add(ttl_secs)
            .ok_or_else(|| AuthError::crypto("access token expiry overflow"))?;
        let expires_at = DateTime::from_timestamp(exp, 0)
            .ok_or_else(|| AuthError::crypto("access token expiry out of range"))?;

        let claims = Claims {
            sub: account_id.to_string(),
            roles: roles.into_iter().collect(),
            iat,
            exp,
            jti: Uuid::now_v7().to_string(),
        };

        let token = encode(&Header::new(SIGNING_ALGORITHM), &claims, &self.encoding_key)
            .map_err(|e| AuthError::crypto(format!("Failed to sign access token: {}", e)))?;

        Ok(IssuedAccessToken { token, expires_at })
    }

    /// 校验签名与过期时间，无时间偏差容忍
    pub fn verify(&self, token: &str) -> AuthResult<Claims> {
        let mut validation = Validation::new(SIGNING_ALGORITHM);
        validation.algorithms = vec![SIGNING_ALGORITHM];
        validation.leeway = 0;
        validation.validate_exp = true;
        validation.validate_nbf = false;
        validation.set_required_spec_claims(&["exp", "sub"]);

        decode::<Claims>(token, &self.decoding_key, &validation)
            .map(|data| data.claims)
            .map_err(|e| match e.kind() {
                ErrorKind::ExpiredSignature => AuthError::TokenExpired,
                _ => AuthError::invalid_token(e.to_string()),
            })
    }
}

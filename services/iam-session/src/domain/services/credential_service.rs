//! 凭证服务：密码哈希与校验
//!
//! Argon2id。工作因子对应 Argon2 的迭代次数（t_cost），内存与并行度取库默认值。
//! 哈希是 CPU 密集操作，异步接口统一放到阻塞线程池执行。

use argon2::{
    Algorithm, Argon2, Params, Version,
    password_hash::{PasswordHash, PasswordHasher, PasswordVerifier, SaltString, rand_core::OsRng},
};
use gatherup_config::clamp_work_factor;
use gatherup_errors::{AuthError, AuthResult};
use tracing::debug;

use crate::domain::value_objects::HashedPassword;

/// 接受的最长密码（字节）
pub const MAX_PASSWORD_BYTES: usize = 1024;

const DUMMY_PASSWORD: &str = "gatherup-dummy-password";

fn hasher(work_factor: u32) -> AuthResult<Argon2<'static>> {
    let params = Params::new(
        Params::DEFAULT_M_COST,
        clamp_work_factor(work_factor),
        Params::DEFAULT_P_COST,
        None,
    )
    .map_err(|e| AuthError::crypto(format!("Invalid password hash parameters: {}", e)))?;
    Ok(Argon2::new(Algorithm::Argon2id, Version::V0x13, params))
}

/// 哈希密码，每次使用新的随机盐
pub fn hash_password(password: &str, work_factor: u32) -> AuthResult<HashedPassword> {
    let salt = SaltString::generate(&mut OsRng);
    let phc = hasher(work_factor)?
        .hash_password(password.as_bytes(), &salt)
        .map_err(|e| AuthError::crypto(format!("Failed to hash password: {}", e)))?
        .to_string();
    Ok(HashedPassword::from_phc(phc))
}

/// 校验密码，参数取自哈希串本身
///
/// 不匹配返回 `Ok(false)`；哈希串无法解析属于内部错误。
pub fn verify_password(hash: &HashedPassword, password: &str) -> AuthResult<bool> {
    let parsed = PasswordHash::new(hash.as_str())
        .map_err(|e| AuthError::crypto(format!("Malformed stored password hash: {}", e)))?;
    match Argon2::default().verify_password(password.as_bytes(), &parsed) {
        Ok(()) => Ok(true),
        Err(argon2::password_hash::Error::Password) => Ok(false),
        Err(e) => Err(AuthError::crypto(format!("Failed to verify password: {}", e))),
    }
}

/// 凭证服务
pub struct CredentialService {
    work_factor: u32,
    dummy_hash: HashedPassword,
}

impl CredentialService {
    /// 工作因子低于下限时按默认值处理
    pub fn new(work_factor: u32) -> AuthResult<Self> {
        let work_factor = clamp_work_factor(work_factor);
        let dummy_hash = hash_password(DUMMY_PASSWORD, work_factor)?;
        debug!(work_factor, "Credential service ready");
        Ok(Self {
            work_factor,
            dummy_hash,
        })
    }

    pub fn work_factor(&self) -> u32 {
        self.work_factor
    }

    pub async fn hash(&self, password: &str) -> AuthResult<HashedPassword> {
        let password = password.to_owned();
        let work_factor = self.work_factor;
        tokio::task::spawn_blocking(move || hash_password(&password, work_factor))
            .await
            .map_err(|e| AuthError::crypto(format!("Password hashing task failed: {}", e)))?
    }

    pub async fn verify(&self, hash: &HashedPassword, password: &str) -> AuthResult<bool> {
        let hash = hash.clone();
        let password = password.to_owned();
        tokio::task::spawn_blocking(move || verify_password(&hash, &password))
            .await
            .map_err(|e| AuthError::crypto(format!("Password verification task failed: {}", e)))?
    }

    /// 对未知账户做一次等价的校验，使响应耗时与已知账户一致
    pub async fn verify_dummy(&self, password: &str) {
        if let Err(e) = self.verify(&self.dummy_hash, password).await {
            debug!(error = %e, "Dummy password verification failed");
        }
    }
}

//! 认证协调器
//!
//! 串联身份存储、凭证服务、访问令牌签发与刷新令牌存储，完成注册、登录、刷新、
//! 登出与停用。每个操作都受请求超时约束；超时丢弃未完成的 future，存储层的事务
//! 随之回滚。

use std::future::Future;
use std::sync::Arc;
use std::time::{Duration, Instant};

use chrono::Utc;
use gatherup_auth_core::{Claims, TokenIssuer};
use gatherup_common::AccountId;
use gatherup_config::AuthConfig;
use gatherup_errors::{AuthError, AuthResult};
use tracing::{info, instrument, warn};

use crate::application::dto::SessionTokens;
use crate::domain::entities::Account;
use crate::domain::repositories::{IdentityStore, RefreshTokenStore};
use crate::domain::services::{CredentialService, MAX_PASSWORD_BYTES};
use crate::domain::value_objects::{MobileNumber, RefreshSecret, RefreshSecretHash};
use crate::infrastructure::metrics;

/// 设备信息最大长度（字符）
const MAX_DEVICE_CHARS: usize = 255;

/// 会话参数
#[derive(Debug, Clone)]
pub struct SessionSettings {
    pub access_token_ttl: Duration,
    pub refresh_token_ttl: Duration,
    pub refresh_token_bytes: usize,
    pub request_timeout: Duration,
}

impl From<&AuthConfig> for SessionSettings {
    fn from(config: &AuthConfig) -> Self {
        Self {
            access_token_ttl: config.access_token_ttl(),
            refresh_token_ttl: config.refresh_token_ttl(),
            refresh_token_bytes: config.refresh_token_bytes,
            request_timeout: config.request_timeout(),
        }
    }
}

/// 认证协调器
pub struct AuthCoordinator {
    identities: Arc<dyn IdentityStore>,
    refresh_tokens: Arc<dyn RefreshTokenStore>,
    credentials: Arc<CredentialService>,
    tokens: Arc<TokenIssuer>,
    settings: SessionSettings,
}

impl AuthCoordinator {
    pub fn new(
        identities: Arc<dyn IdentityStore>,
        refresh_tokens: Arc<dyn RefreshTokenStore>,
        credentials: Arc<CredentialService>,
        tokens: Arc<TokenIssuer>,
        settings: SessionSettings,
    ) -> Self {
        Self {
            identities,
            refresh_tokens,
            credentials,
            tokens,
            settings,
        }
    }

    pub fn settings(&self) -> &SessionSettings {
        &self.settings
    }

    /// 注册账户，返回新账户 ID
    #[instrument(skip_all)]
    pub async fn register(&self, mobile_number: &str, password: &str) -> AuthResult<AccountId> {
        let started = Instant::now();
        let result = self
            .bounded("register", self.register_inner(mobile_number, password))
            .await;
        metrics::record_operation("register", &result, started);
        result
    }

    /// 手机号密码登录，签发访问令牌与刷新令牌
    ///
    /// 账户不存在与密码错误返回同一个 `InvalidCredentials`。
    #[instrument(skip_all)]
    pub async fn login(
        &self,
        mobile_number: &str,
        password: &str,
        device: Option<&str>,
    ) -> AuthResult<SessionTokens> {
        let started = Instant::now();
        let result = self
            .bounded("login", self.login_inner(mobile_number, password, device))
            .await;
        metrics::record_operation("login", &result, started);
        result
    }

    /// 用刷新令牌换取新的令牌对，旧刷新令牌随即失效
    #[instrument(skip_all)]
    pub async fn refresh(&self, refresh_token: &str) -> AuthResult<SessionTokens> {
        let started = Instant::now();
        let result = self
            .bounded("refresh", self.refresh_inner(refresh_token))
            .await;
        metrics::record_operation("refresh", &result, started);
        result
    }

    /// 撤销刷新令牌，重复登出同一令牌也返回成功
    #[instrument(skip_all)]
    pub async fn logout(&self, refresh_token: &str) -> AuthResult<()> {
        let started = Instant::now();
        let result = self.bounded("logout", self.logout_inner(refresh_token)).await;
        metrics::record_operation("logout", &result, started);
        result
    }

    /// 校验访问令牌
    pub fn authenticate(&self, access_token: &str) -> AuthResult<Claims> {
        if access_token.trim().is_empty() {
            return Err(AuthError::invalid_token("missing access token"));
        }
        self.tokens.verify(access_token)
    }

    /// 访问令牌对应的当前账户
    #[instrument(skip_all)]
    pub async fn current_account(&self, access_token: &str) -> AuthResult<Account> {
        let claims = self.authenticate(access_token)?;
        self.bounded("current_account", async {
            self.identities
                .get_account_by_id(&claims.sub)
                .await?
                .ok_or_else(|| AuthError::not_found("account"))
        })
        .await
    }

    /// 停用账户：软删除账户与凭证，并撤销其全部刷新令牌
    #[instrument(skip_all, fields(account_id = %account_id))]
    pub async fn deactivate(&self, account_id: &str) -> AuthResult<()> {
        let started = Instant::now();
        let result = self
            .bounded("deactivate", self.deactivate_inner(account_id))
            .await;
        metrics::record_operation("deactivate", &result, started);
        result
    }

    async fn bounded<T, F>(&self, operation: &'static str, future: F) -> AuthResult<T>
    where
        F: Future<Output = AuthResult<T>>,
    {
        match tokio::time::timeout(self.settings.request_timeout, future).await {
            Ok(result) => result,
            Err(_) => {
                warn!(operation, "Operation exceeded request timeout");
                Err(AuthError::deadline_exceeded(operation))
            }
        }
    }

    async fn register_inner(&self, mobile_number: &str, password: &str) -> AuthResult<AccountId> {
        let mobile = MobileNumber::parse(mobile_number)?;
        check_password(password)?;

        if self
            .identities
            .find_credential_by_identifier(mobile.normalized())
            .await?
            .is_some()
        {
            return Err(AuthError::DuplicateIdentity);
        }

        let password_hash = self.credentials.hash(password).await?;
        let account_id = self
            .identities
            .create_account_with_credential(&mobile, &password_hash)
            .await?;

        info!(account_id = %account_id, "Account registered");
        Ok(account_id)
    }

    async fn login_inner(
        &self,
        mobile_number: &str,
        password: &str,
        device: Option<&str>,
    ) -> AuthResult<SessionTokens> {
        let mobile = MobileNumber::parse(mobile_number)?;
        check_password(password)?;
        let device = normalize_device(device)?;

        let credential = match self
            .identities
            .find_credential_by_identifier(mobile.normalized())
            .await?
        {
            Some(credential) => credential,
            None => {
                self.credentials.verify_dummy(password).await;
                return Err(AuthError::InvalidCredentials);
            }
        };

        if !self
            .credentials
            .verify(&credential.password_hash, password)
            .await?
        {
            return Err(AuthError::InvalidCredentials);
        }

        let access =
            self.tokens
                .issue(&credential.account_id, Vec::new(), self.settings.access_token_ttl)?;
        let refresh = self
            .refresh_tokens
            .issue(
                &credential.account_id,
                self.settings.refresh_token_bytes,
                self.settings.refresh_token_ttl,
                device.as_deref(),
            )
            .await?;

        info!(
            account_id = %credential.account_id,
            device_present = device.is_some(),
            "Login succeeded"
        );

        Ok(SessionTokens {
            account_id: credential.account_id,
            access_token: access.token,
            access_expires_at: access.expires_at,
            refresh_token: refresh.secret,
            refresh_expires_at: refresh.expires_at,
        })
    }

    async fn refresh_inner(&self, refresh_token: &str) -> AuthResult<SessionTokens> {
        if refresh_token.is_empty() {
            return Err(AuthError::invalid_input("refresh token is required"));
        }
        let presented = RefreshSecret::from_presented(refresh_token);

        let record = self
            .refresh_tokens
            .lookup_by_raw_secret(&presented)
            .await?
            .ok_or(AuthError::TokenNotFoundOrRevoked)?;

        let now = Utc::now();
        if record.revoked {
            warn!(
                record_id = %record.id,
                account_id = %record.account_id,
                "Revoked refresh token presented"
            );
            metrics::record_refresh_replay();
            return Err(AuthError::TokenNotFoundOrRevoked);
        }
        if record.is_expired_at(now) {
            return Err(AuthError::TokenExpired);
        }

        // 停用账户的令牌不再可用
        if self
            .identities
            .get_account_by_id(&record.account_id.to_string())
            .await?
            .is_none()
        {
            return Err(AuthError::TokenNotFoundOrRevoked);
        }

        let access =
            self.tokens
                .issue(&record.account_id, Vec::new(), self.settings.access_token_ttl)?;

        let next_secret = RefreshSecret::generate(self.settings.refresh_token_bytes)?;
        let refresh_ttl = chrono::Duration::from_std(self.settings.refresh_token_ttl)
            .map_err(|_| AuthError::crypto("refresh token ttl out of range"))?;
        let next_expires_at = now
            .checked_add_signed(refresh_ttl)
            .ok_or_else(|| AuthError::crypto("refresh token expiry out of range"))?;

        let next_id = self
            .refresh_tokens
            .rotate(&record.id, &RefreshSecretHash::of(&next_secret), next_expires_at)
            .await?;

        info!(
            account_id = %record.account_id,
            previous = %record.id,
            next = %next_id,
            "Refresh token rotated"
        );

        Ok(SessionTokens {
            account_id: record.account_id,
            access_token: access.token,
            access_expires_at: access.expires_at,
            refresh_token: next_secret,
            refresh_expires_at: next_expires_at,
        })
    }

    async fn logout_inner(&self, refresh_token: &str) -> AuthResult<()> {
        if refresh_token.is_empty() {
            return Err(AuthError::invalid_input("refresh token is required"));
        }
        let presented = RefreshSecret::from_presented(refresh_token);

        let record = self
            .refresh_tokens
            .lookup_by_raw_secret(&presented)
            .await?
            .ok_or(AuthError::TokenNotFoundOrRevoked)?;

        self.refresh_tokens.revoke(&record.id).await?;
        info!(account_id = %record.account_id, record_id = %record.id, "Refresh token revoked");
        Ok(())
    }

    async fn deactivate_inner(&self, account_id: &str) -> AuthResult<()> {
        let account_id = AccountId::parse(account_id)
            .ok_or_else(|| AuthError::invalid_input("malformed account id"))?;

        self.identities.deactivate_account(&account_id).await?;
        let revoked = self
            .refresh_tokens
            .revoke_all_for_account(&account_id)
            .await?;

        info!(revoked, "Account deactivated");
        Ok(())
    }
}

fn check_password(password: &str) -> AuthResult<()> {
    if password.is_empty() {
        return Err(AuthError::invalid_input("password is required"));
    }
    if password.len() > MAX_PASSWORD_BYTES {
        return Err(AuthError::invalid_input("password is too long"));
    }
    Ok(())
}

/// 去掉首尾空白，空串视为未提供
fn normalize_device(device: Option<&str>) -> AuthResult<Option<String>> {
    match device.map(str::trim) {
        None | Some("") => Ok(None),
        Some(device) if device.chars().count() > MAX_DEVICE_CHARS => {
            Err(AuthError::invalid_input("device description is too long"))
        }
        Some(device) => Ok(Some(device.to_string())),
    }
}

#[cfg(test)]
mod tests {
    use async_trait::async_trait;
    use chrono::{DateTime, Utc};
    use gatherup_common::RefreshTokenId;
    use mockall::mock;
    use mockall::predicate::*;

    use super::*;
    use crate::domain::entities::{Credential, RefreshTokenRecord};
    use crate::domain::services::hash_password;
    use crate::domain::value_objects::HashedPassword;

    mock! {
        pub Identities {}

        #[async_trait]
        impl IdentityStore for Identities {
            async fn create_account_with_credential(
                &self,
                mobile: &MobileNumber,
                password_hash: &HashedPassword,
            ) -> AuthResult<AccountId>;
            async fn find_credential_by_identifier(&self, identifier: &str) -> AuthResult<Option<Credential>>;
            async fn get_account_by_id(&self, account_id: &str) -> AuthResult<Option<Account>>;
            async fn deactivate_account(&self, account_id: &AccountId) -> AuthResult<()>;
        }
    }

    mock! {
        pub RefreshTokens {}

        #[async_trait]
        impl RefreshTokenStore for RefreshTokens {
            async fn save(&self, record: &RefreshTokenRecord) -> AuthResult<()>;
            async fn find_by_hash(&self, hash: &RefreshSecretHash) -> AuthResult<Option<RefreshTokenRecord>>;
            async fn rotate(
                &self,
                old_id: &RefreshTokenId,
                new_hash: &RefreshSecretHash,
                new_expires_at: DateTime<Utc>,
            ) -> AuthResult<RefreshTokenId>;
            async fn revoke(&self, id: &RefreshTokenId) -> AuthResult<()>;
            async fn revoke_all_for_account(&self, account_id: &AccountId) -> AuthResult<u64>;
            async fn delete_expired(&self, before: DateTime<Utc>) -> AuthResult<u64>;
        }
    }

    const SECRET: &[u8] = b"coordinator-test-signing-secret";

    fn settings() -> SessionSettings {
        SessionSettings {
            access_token_ttl: Duration::from_secs(900),
            refresh_token_ttl: Duration::from_secs(3600),
            refresh_token_bytes: 32,
            request_timeout: Duration::from_secs(5),
        }
    }

    fn coordinator(identities: MockIdentities, refresh_tokens: MockRefreshTokens) -> AuthCoordinator {
        AuthCoordinator::new(
            Arc::new(identities),
            Arc::new(refresh_tokens),
            Arc::new(CredentialService::new(4).unwrap()),
            Arc::new(TokenIssuer::new(SECRET).unwrap()),
            settings(),
        )
    }

    fn credential(account_id: AccountId, password: &str) -> Credential {
        Credential::password(
            account_id,
            "+15551234567",
            hash_password(password, 4).unwrap(),
            Utc::now(),
        )
    }

    fn account(account_id: AccountId) -> Account {
        let mut account = Account::register(&MobileNumber::parse("+15551234567").unwrap(), Utc::now());
        account.id = account_id;
        account
    }

    #[tokio::test]
    async fn test_register_rejects_existing_identifier_before_hashing() {
        let mut identities = MockIdentities::new();
        identities
            .expect_find_credential_by_identifier()
            .with(eq("+15551234567"))
            .times(1)
            .returning(|_| Ok(Some(credential(AccountId::new(), "pw"))));
        identities.expect_create_account_with_credential().never();

        let result = coordinator(identities, MockRefreshTokens::new())
            .register("+1 (555) 123-4567", "another-password")
            .await;

        assert_eq!(result, Err(AuthError::DuplicateIdentity));
    }

    #[tokio::test]
    async fn test_register_validates_before_touching_store() {
        let mut identities = MockIdentities::new();
        identities.expect_find_credential_by_identifier().never();
        let coordinator = coordinator(identities, MockRefreshTokens::new());

        assert!(matches!(
            coordinator.register("", "pw").await,
            Err(AuthError::InvalidInput(_))
        ));
        assert!(matches!(
            coordinator.register("12345", "pw").await,
            Err(AuthError::InvalidInput(_))
        ));
        assert!(matches!(
            coordinator.register("+15551234567", "").await,
            Err(AuthError::InvalidInput(_))
        ));
    }

    #[tokio::test]
    async fn test_register_propagates_persistence_failure() {
        let mut identities = MockIdentities::new();
        identities
            .expect_find_credential_by_identifier()
            .returning(|_| Ok(None));
        identities
            .expect_create_account_with_credential()
            .times(1)
            .returning(|_, _| Err(AuthError::persistence("connection reset")));

        let result = coordinator(identities, MockRefreshTokens::new())
            .register("+15551234567", "pw")
            .await;

        assert!(matches!(result, Err(AuthError::PersistenceFailure(_))));
    }

    #[tokio::test]
    async fn test_login_unknown_and_wrong_password_are_indistinguishable() {
        let known = AccountId::new();
        let mut identities = MockIdentities::new();
        identities
            .expect_find_credential_by_identifier()
            .returning(move |identifier| {
                if identifier == "+15551234567" {
                    Ok(Some(credential(known, "right-password")))
                } else {
                    Ok(None)
                }
            });
        let mut refresh_tokens = MockRefreshTokens::new();
        refresh_tokens.expect_save().never();
        let coordinator = coordinator(identities, refresh_tokens);

        let unknown = coordinator
            .login("+15550000000", "right-password", None)
            .await
            .unwrap_err();
        let wrong = coordinator
            .login("+15551234567", "wrong-password", None)
            .await
            .unwrap_err();

        assert_eq!(unknown, AuthError::InvalidCredentials);
        assert_eq!(wrong, AuthError::InvalidCredentials);
        assert_eq!(unknown.to_string(), wrong.to_string());
    }

    #[tokio::test]
    async fn test_login_fails_when_refresh_token_cannot_be_saved() {
        let account_id = AccountId::new();
        let mut identities = MockIdentities::new();
        identities
            .expect_find_credential_by_identifier()
            .returning(move |_| Ok(Some(credential(account_id, "pw"))));
        let mut refresh_tokens = MockRefreshTokens::new();
        refresh_tokens
            .expect_save()
            .times(1)
            .returning(|_| Err(AuthError::persistence("disk full")));

        let result = coordinator(identities, refresh_tokens)
            .login("+15551234567", "pw", Some("pixel-8"))
            .await;

        assert!(matches!(result, Err(AuthError::PersistenceFailure(_))));
    }

    #[tokio::test]
    async fn test_login_stores_only_hash_and_trimmed_device() {
        let account_id = AccountId::new();
        let mut identities = MockIdentities::new();
        identities
            .expect_find_credential_by_identifier()
            .returning(move |_| Ok(Some(credential(account_id, "pw"))));
        let mut refresh_tokens = MockRefreshTokens::new();
        refresh_tokens
            .expect_save()
            .withf(move |record| {
                record.account_id == account_id
                    && record.device.as_deref() == Some("pixel-8")
                    && !record.revoked
            })
            .times(1)
            .returning(|_| Ok(()));

        let tokens = coordinator(identities, refresh_tokens)
            .login("+15551234567", "pw", Some("  pixel-8 "))
            .await
            .unwrap();

        assert_eq!(tokens.account_id, account_id);
        assert!(!tokens.refresh_token.expose().is_empty());
        assert!(tokens.refresh_expires_at > tokens.access_expires_at);
    }

    #[tokio::test]
    async fn test_refresh_revoked_token_is_not_rotated() {
        let secret = RefreshSecret::generate(32).unwrap();
        let now = Utc::now();
        let mut record = RefreshTokenRecord::new(
            AccountId::new(),
            RefreshSecretHash::of(&secret),
            None,
            now,
            now + chrono::Duration::hours(1),
        );
        record.revoked = true;

        let mut refresh_tokens = MockRefreshTokens::new();
        refresh_tokens
            .expect_find_by_hash()
            .returning(move |_| Ok(Some(record.clone())));
        refresh_tokens.expect_rotate().never();

        let result = coordinator(MockIdentities::new(), refresh_tokens)
            .refresh(secret.expose())
            .await;

        assert!(matches!(result, Err(AuthError::TokenNotFoundOrRevoked)));
    }

    #[tokio::test]
    async fn test_refresh_expired_token_is_not_rotated() {
        let secret = RefreshSecret::generate(32).unwrap();
        let now = Utc::now();
        let record = RefreshTokenRecord::new(
            AccountId::new(),
            RefreshSecretHash::of(&secret),
            None,
            now - chrono::Duration::hours(2),
            now - chrono::Duration::hours(1),
        );

        let mut refresh_tokens = MockRefreshTokens::new();
        refresh_tokens
            .expect_find_by_hash()
            .returning(move |_| Ok(Some(record.clone())));
        refresh_tokens.expect_rotate().never();

        let result = coordinator(MockIdentities::new(), refresh_tokens)
            .refresh(secret.expose())
            .await;

        assert!(matches!(result, Err(AuthError::TokenExpired)));
    }

    #[tokio::test]
    async fn test_refresh_lost_rotation_race_returns_revoked() {
        let account_id = AccountId::new();
        let secret = RefreshSecret::generate(32).unwrap();
        let now = Utc::now();
        let record = RefreshTokenRecord::new(
            account_id,
            RefreshSecretHash::of(&secret),
            None,
            now,
            now + chrono::Duration::hours(1),
        );

        let mut identities = MockIdentities::new();
        identities
            .expect_get_account_by_id()
            .returning(move |_| Ok(Some(account(account_id))));
        let mut refresh_tokens = MockRefreshTokens::new();
        refresh_tokens
            .expect_find_by_hash()
            .returning(move |_| Ok(Some(record.clone())));
        refresh_tokens
            .expect_rotate()
            .times(1)
            .returning(|_, _, _| Err(AuthError::TokenNotFoundOrRevoked));

        let result = coordinator(identities, refresh_tokens)
            .refresh(secret.expose())
            .await;

        assert!(matches!(result, Err(AuthError::TokenNotFoundOrRevoked)));
    }

    #[tokio::test]
    async fn test_refresh_for_deactivated_account_rejected() {
        let secret = RefreshSecret::generate(32).unwrap();
        let now = Utc::now();
        let record = RefreshTokenRecord::new(
            AccountId::new(),
            RefreshSecretHash::of(&secret),
            None,
            now,
            now + chrono::Duration::hours(1),
        );

        let mut identities = MockIdentities::new();
        identities.expect_get_account_by_id().returning(|_| Ok(None));
        let mut refresh_tokens = MockRefreshTokens::new();
        refresh_tokens
            .expect_find_by_hash()
            .returning(move |_| Ok(Some(record.clone())));
        refresh_tokens.expect_rotate().never();

        let result = coordinator(identities, refresh_tokens)
            .refresh(secret.expose())
            .await;

        assert!(matches!(result, Err(AuthError::TokenNotFoundOrRevoked)));
    }

    #[tokio::test]
    async fn test_empty_refresh_token_is_invalid_input() {
        let coordinator = coordinator(MockIdentities::new(), MockRefreshTokens::new());
        assert!(matches!(
            coordinator.refresh("").await,
            Err(AuthError::InvalidInput(_))
        ));
        assert!(matches!(
            coordinator.logout("").await,
            Err(AuthError::InvalidInput(_))
        ));
    }

    #[tokio::test]
    async fn test_deactivate_rejects_malformed_id() {
        let mut identities = MockIdentities::new();
        identities.expect_deactivate_account().never();

        let result = coordinator(identities, MockRefreshTokens::new())
            .deactivate("not-a-uuid")
            .await;

        assert!(matches!(result, Err(AuthError::InvalidInput(_))));
    }

    #[tokio::test]
    async fn test_deactivate_revokes_all_tokens() {
        let account_id = AccountId::new();
        let mut identities = MockIdentities::new();
        identities
            .expect_deactivate_account()
            .with(eq(account_id))
            .times(1)
            .returning(|_| Ok(()));
        let mut refresh_tokens = MockRefreshTokens::new();
        refresh_tokens
            .expect_revoke_all_for_account()
            .with(eq(account_id))
            .times(1)
            .returning(|_| Ok(3));

        coordinator(identities, refresh_tokens)
            .deactivate(&account_id.to_string())
            .await
            .unwrap();
    }

    /// 永不返回的身份存储
    struct StalledIdentities;

    #[async_trait]
    impl IdentityStore for StalledIdentities {
        async fn create_account_with_credential(
            &self,
            _mobile: &MobileNumber,
            _password_hash: &HashedPassword,
        ) -> AuthResult<AccountId> {
            std::future::pending().await
        }

        async fn find_credential_by_identifier(
            &self,
            _identifier: &str,
        ) -> AuthResult<Option<Credential>> {
            tokio::time::sleep(Duration::from_secs(60)).await;
            Ok(None)
        }

        async fn get_account_by_id(&self, _account_id: &str) -> AuthResult<Option<Account>> {
            std::future::pending().await
        }

        async fn deactivate_account(&self, _account_id: &AccountId) -> AuthResult<()> {
            std::future::pending().await
        }
    }

    #[tokio::test(start_paused = true)]
    async fn test_slow_store_hits_deadline() {
        let issuer = TokenIssuer::new(SECRET).unwrap();
        let token = issuer
            .issue(&AccountId::new(), Vec::new(), Duration::from_secs(600))
            .unwrap()
            .token;
        let coordinator = AuthCoordinator::new(
            Arc::new(StalledIdentities),
            Arc::new(MockRefreshTokens::new()),
            Arc::new(CredentialService::new(4).unwrap()),
            Arc::new(issuer),
            SessionSettings {
                request_timeout: Duration::from_millis(50),
                ..settings()
            },
        );

        assert!(matches!(
            coordinator.register("+15551234567", "pw").await,
            Err(AuthError::DeadlineExceeded(_))
        ));
        assert!(matches!(
            coordinator.current_account(&token).await,
            Err(AuthError::DeadlineExceeded(_))
        ));
    }

    #[test]
    fn test_normalize_device() {
        assert_eq!(normalize_device(None).unwrap(), None);
        assert_eq!(normalize_device(Some("   ")).unwrap(), None);
        assert_eq!(
            normalize_device(Some(" iPhone 15 ")).unwrap().as_deref(),
            Some("iPhone 15")
        );
        assert!(normalize_device(Some(&"x".repeat(256))).is_err());
    }
}

//! PostgreSQL 存储测试
//!
//! 需要 DATABASE_URL 指向可创建测试库的实例：
//! `cargo test -p iam-session --test postgres_store_test -- --ignored`

use std::sync::Arc;
use std::time::Duration;

use chrono::Utc;
use gatherup_adapter_postgres::TransactionManager;
use gatherup_errors::AuthError;
use iam_session::domain::repositories::{IdentityStore, RefreshTokenStore};
use iam_session::domain::services::hash_password;
use iam_session::domain::value_objects::{MobileNumber, RefreshSecret, RefreshSecretHash};
use iam_session::infrastructure::persistence::{PostgresIdentityStore, PostgresRefreshTokenStore};
use sqlx::PgPool;

fn stores(pool: PgPool) -> (PostgresIdentityStore, PostgresRefreshTokenStore) {
    let tx = TransactionManager::new(pool);
    (
        PostgresIdentityStore::new(tx.clone()),
        PostgresRefreshTokenStore::new(tx),
    )
}

#[sqlx::test(migrations = "./migrations")]
#[ignore = "requires DATABASE_URL"]
async fn test_create_and_find_credential(pool: PgPool) {
    let (identities, _) = stores(pool);
    let mobile = MobileNumber::parse("+1 (555) 123-4567").unwrap();
    let hash = hash_password("pw", 4).unwrap();

    let account_id = identities
        .create_account_with_credential(&mobile, &hash)
        .await
        .unwrap();

    let credential = identities
        .find_credential_by_identifier("+15551234567")
        .await
        .unwrap()
        .unwrap();
    assert_eq!(credential.account_id, account_id);
    assert_eq!(credential.password_hash, hash);

    let account = identities
        .get_account_by_id(&account_id.to_string())
        .await
        .unwrap()
        .unwrap();
    assert_eq!(account.mobile_number, "+1 (555) 123-4567");
    assert!(account.is_active());
}

#[sqlx::test(migrations = "./migrations")]
#[ignore = "requires DATABASE_URL"]
async fn test_duplicate_mobile_leaves_no_partial_rows(pool: PgPool) {
    let (identities, _) = stores(pool.clone());
    let hash = hash_password("pw", 4).unwrap();

    identities
        .create_account_with_credential(&MobileNumber::parse("5551234567").unwrap(), &hash)
        .await
        .unwrap();
    let result = identities
        .create_account_with_credential(&MobileNumber::parse("555 123 4567").unwrap(), &hash)
        .await;
    assert_eq!(result, Err(AuthError::DuplicateIdentity));

    let (accounts,): (i64,) = sqlx::query_as("SELECT COUNT(*) FROM accounts")
        .fetch_one(&pool)
        .await
        .unwrap();
    let (credentials,): (i64,) = sqlx::query_as("SELECT COUNT(*) FROM credentials")
        .fetch_one(&pool)
        .await
        .unwrap();
    assert_eq!((accounts, credentials), (1, 1));
}

#[sqlx::test(migrations = "./migrations")]
#[ignore = "requires DATABASE_URL"]
async fn test_deactivate_releases_mobile(pool: PgPool) {
    let (identities, _) = stores(pool);
    let mobile = MobileNumber::parse("+447946095800").unwrap();
    let hash = hash_password("pw", 4).unwrap();

    let first = identities
        .create_account_with_credential(&mobile, &hash)
        .await
        .unwrap();
    identities.deactivate_account(&first).await.unwrap();

    assert!(
        identities
            .find_credential_by_identifier(mobile.normalized())
            .await
            .unwrap()
            .is_none()
    );
    assert!(matches!(
        identities.deactivate_account(&first).await,
        Err(AuthError::NotFound(_))
    ));

    let second = identities
        .create_account_with_credential(&mobile, &hash)
        .await
        .unwrap();
    assert_ne!(first, second);
}

#[sqlx::test(migrations = "./migrations")]
#[ignore = "requires DATABASE_URL"]
async fn test_rotation_is_single_use(pool: PgPool) {
    let (identities, refresh_tokens) = stores(pool);
    let account_id = identities
        .create_account_with_credential(
            &MobileNumber::parse("5551234567").unwrap(),
            &hash_password("pw", 4).unwrap(),
        )
        .await
        .unwrap();

    let issued = refresh_tokens
        .issue(&account_id, 32, Duration::from_secs(3600), Some("pixel-8"))
        .await
        .unwrap();

    let refresh_tokens = Arc::new(refresh_tokens);
    let expires_at = Utc::now() + chrono::Duration::hours(1);
    let attempts: Vec<_> = (0..4)
        .map(|_| {
            let store = refresh_tokens.clone();
            let old_id = issued.id;
            tokio::spawn(async move {
                let next = RefreshSecret::generate(32).unwrap();
                store
                    .rotate(&old_id, &RefreshSecretHash::of(&next), expires_at)
                    .await
            })
        })
        .collect();

    let mut winners = Vec::new();
    for attempt in attempts {
        match attempt.await.unwrap() {
            Ok(id) => winners.push(id),
            Err(e) => assert_eq!(e, AuthError::TokenNotFoundOrRevoked),
        }
    }
    assert_eq!(winners.len(), 1);

    let old = refresh_tokens
        .lookup_by_raw_secret(&issued.secret)
        .await
        .unwrap()
        .unwrap();
    assert!(old.revoked);
    assert_eq!(old.replaced_by, Some(winners[0]));
}

#[sqlx::test(migrations = "./migrations")]
#[ignore = "requires DATABASE_URL"]
async fn test_revoke_all_and_delete_expired(pool: PgPool) {
    let (identities, refresh_tokens) = stores(pool);
    let account_id = identities
        .create_account_with_credential(
            &MobileNumber::parse("5551234567").unwrap(),
            &hash_password("pw", 4).unwrap(),
        )
        .await
        .unwrap();

    for _ in 0..2 {
        refresh_tokens
            .issue(&account_id, 16, Duration::from_secs(3600), None)
            .await
            .unwrap();
    }
    refresh_tokens
        .issue(&account_id, 16, Duration::ZERO, None)
        .await
        .unwrap();

    assert_eq!(refresh_tokens.revoke_all_for_account(&account_id).await.unwrap(), 3);
    assert_eq!(refresh_tokens.revoke_all_for_account(&account_id).await.unwrap(), 0);
    assert_eq!(
        refresh_tokens
            .delete_expired(Utc::now() + chrono::Duration::seconds(1))
            .await
            .unwrap(),
        1
    );
}

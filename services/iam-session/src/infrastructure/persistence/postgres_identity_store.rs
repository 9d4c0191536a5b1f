//! PostgreSQL 身份存储

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use gatherup_adapter_postgres::{TransactionManager, map_db_error, persistence_error};
use gatherup_common::AccountId;
use gatherup_common::utils::new_id;
use gatherup_errors::{AuthError, AuthResult};
use sqlx::FromRow;
use tracing::debug;
use uuid::Uuid;

use crate::domain::entities::{Account, Credential, CredentialKind};
use crate::domain::repositories::IdentityStore;
use crate::domain::value_objects::{HashedPassword, MobileNumber};

pub struct PostgresIdentityStore {
    tx: TransactionManager,
}

impl PostgresIdentityStore {
    pub fn new(tx: TransactionManager) -> Self {
        Self { tx }
    }
}

#[async_trait]
impl IdentityStore for PostgresIdentityStore {
    async fn create_account_with_credential(
        &self,
        mobile: &MobileNumber,
        password_hash: &HashedPassword,
    ) -> AuthResult<AccountId> {
        let account = Account::register(mobile, Utc::now());
        debug!(account_id = %account.id, "Creating account with password credential");

        let mut tx = self.tx.begin().await?;

        sqlx::query(
            r#"
            INSERT INTO accounts (id, mobile_number, mobile_normalized, created_at, deleted)
            VALUES ($1, $2, $3, $4, FALSE)
            "#,
        )
        .bind(account.id.0)
        .bind(&account.mobile_number)
        .bind(&account.mobile_normalized)
        .bind(account.created_at)
        .execute(&mut *tx)
        .await
        .map_err(|e| map_db_error("Failed to insert account", e))?;

        sqlx::query(
            r#"
            INSERT INTO credentials (id, account_id, kind, identifier, password_hash, created_at, deleted)
            VALUES ($1, $2, $3, $4, $5, $6, FALSE)
            "#,
        )
        .bind(new_id())
        .bind(account.id.0)
        .bind(CredentialKind::Password.as_str())
        .bind(mobile.normalized())
        .bind(password_hash.as_str())
        .bind(account.created_at)
        .execute(&mut *tx)
        .await
        .map_err(|e| map_db_error("Failed to insert credential", e))?;

        TransactionManager::commit(tx).await?;
        Ok(account.id)
    }

    async fn find_credential_by_identifier(
        &self,
        identifier: &str,
    ) -> AuthResult<Option<Credential>> {
        let row = sqlx::query_as::<_, CredentialRow>(
            r#"
            SELECT c.account_id, c.kind, c.identifier, c.password_hash, c.created_at, c.deleted
            FROM credentials c
            JOIN accounts a ON a.id = c.account_id AND NOT a.deleted
            WHERE c.kind = $1 AND c.identifier = $2 AND NOT c.deleted
            "#,
        )
        .bind(CredentialKind::Password.as_str())
        .bind(identifier)
        .fetch_optional(self.tx.pool())
        .await
        .map_err(|e| persistence_error("Failed to find credential", e))?;

        row.map(CredentialRow::into_credential).transpose()
    }

    async fn get_account_by_id(&self, account_id: &str) -> AuthResult<Option<Account>> {
        let account_id = AccountId::parse(account_id)
            .ok_or_else(|| AuthError::invalid_input("malformed account id"))?;

        let row = sqlx::query_as::<_, AccountRow>(
            r#"
            SELECT id, mobile_number, mobile_normalized, email, username, display_name,
                   created_at, updated_at, deleted
            FROM accounts
            WHERE id = $1 AND NOT deleted
            "#,
        )
        .bind(account_id.0)
        .fetch_optional(self.tx.pool())
        .await
        .map_err(|e| persistence_error("Failed to find account", e))?;

        Ok(row.map(Into::into))
    }

    async fn deactivate_account(&self, account_id: &AccountId) -> AuthResult<()> {
        let mut tx = self.tx.begin().await?;

        let result = sqlx::query(
            "UPDATE accounts SET deleted = TRUE, updated_at = NOW() WHERE id = $1 AND NOT deleted",
        )
        .bind(account_id.0)
        .execute(&mut *tx)
        .await
        .map_err(|e| persistence_error("Failed to deactivate account", e))?;

        if result.rows_affected() == 0 {
            return Err(AuthError::not_found("account"));
        }

        sqlx::query("UPDATE credentials SET deleted = TRUE WHERE account_id = $1 AND NOT deleted")
            .bind(account_id.0)
            .execute(&mut *tx)
            .await
            .map_err(|e| persistence_error("Failed to delete credentials", e))?;

        TransactionManager::commit(tx).await?;
        debug!(account_id = %account_id, "Account deactivated");
        Ok(())
    }
}

#[derive(FromRow)]
struct AccountRow {
    id: Uuid,
    mobile_number: String,
    mobile_normalized: String,
    email: Option<String>,
    username: Option<String>,
    display_name: Option<String>,
    created_at: DateTime<Utc>,
    updated_at: Option<DateTime<Utc>>,
    deleted: bool,
}

impl From<AccountRow> for Account {
    fn from(row: AccountRow) -> Self {
        Self {
            id: AccountId::from_uuid(row.id),
            mobile_number: row.mobile_number,
            mobile_normalized: row.mobile_normalized,
            email: row.email,
            username: row.username,
            display_name: row.display_name,
            created_at: row.created_at,
            updated_at: row.updated_at,
            deleted: row.deleted,
        }
    }
}

#[derive(FromRow)]
struct CredentialRow {
    account_id: Uuid,
    kind: String,
    identifier: String,
    password_hash: String,
    created_at: DateTime<Utc>,
    deleted: bool,
}

impl CredentialRow {
    fn into_credential(self) -> AuthResult<Credential> {
        let kind = CredentialKind::parse(&self.kind).ok_or_else(|| {
            AuthError::persistence(format!("Unknown credential kind: {}", self.kind))
        })?;
        Ok(Credential {
            account_id: AccountId::from_uuid(self.account_id),
            kind,
            identifier: self.identifier,
            password_hash: HashedPassword::from_stored(self.password_hash),
            created_at: self.created_at,
            deleted: self.deleted,
        })
    }
}

//! sqlx 错误映射

use gatherup_errors::AuthError;

/// 身份写入路径：唯一约束冲突映射为 `DuplicateIdentity`，其余均为 `PersistenceFailure`
pub fn map_db_error(context: &str, err: sqlx::Error) -> AuthError {
    if is_unique_violation(&err) {
        return AuthError::DuplicateIdentity;
    }
    persistence_error(context, err)
}

pub fn persistence_error(context: &str, err: sqlx::Error) -> AuthError {
    AuthError::persistence(format!("{}: {}", context, err))
}

pub fn is_unique_violation(err: &sqlx::Error) -> bool {
    matches!(err, sqlx::Error::Database(db) if db.is_unique_violation())
}

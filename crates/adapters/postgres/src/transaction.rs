//! PostgreSQL 事务管理
//!
//! 多行写入（账户+凭证、撤销+插入）都在单个事务内完成。事务对象在未提交时被丢弃
//! （包括调用方超时取消 future）会自动回滚，因此不会留下部分写入。

use gatherup_errors::AuthResult;
use sqlx::{PgPool, Postgres, Transaction};

use crate::persistence_error;

/// 事务管理器
#[derive(Clone)]
pub struct TransactionManager {
    pool: PgPool,
}

impl TransactionManager {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    pub fn pool(&self) -> &PgPool {
        &self.pool
    }

    /// 开始事务（读已提交）
    pub async fn begin(&self) -> AuthResult<Transaction<'static, Postgres>> {
        self.pool
            .begin()
            .await
            .map_err(|e| persistence_error("Failed to begin transaction", e))
    }

    /// 提交事务
    pub async fn commit(tx: Transaction<'static, Postgres>) -> AuthResult<()> {
        tx.commit()
            .await
            .map_err(|e| persistence_error("Failed to commit transaction", e))
    }
}

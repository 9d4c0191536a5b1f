//! 会话指标

use std::time::Instant;

use gatherup_errors::AuthResult;
use metrics::{counter, histogram};

/// 记录一次协调器操作的结果与耗时
///
/// `outcome` 为 `success` 或错误种类（见 `AuthError::kind`）。
pub fn record_operation<T>(operation: &'static str, result: &AuthResult<T>, started: Instant) {
    let outcome = match result {
        Ok(_) => "success",
        Err(e) => e.kind(),
    };
    let labels = [("operation", operation), ("outcome", outcome)];

    counter!("session_operations_total", &labels).increment(1);
    histogram!("session_operation_duration_seconds", &labels[..1])
        .record(started.elapsed().as_secs_f64());
}

/// 已撤销的刷新令牌被再次提交
pub fn record_refresh_replay() {
    counter!("session_refresh_replay_total").increment(1);
}

/// 清理任务删除的过期记录数
pub fn record_cleanup(deleted: u64) {
    counter!("session_refresh_tokens_purged_total").increment(deleted);
}

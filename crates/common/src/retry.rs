//! 启动期重试
//!
//! 只用于进程启动时连接外部依赖（数据库）。会话核心组件本身从不内部重试，
//! 瞬时错误直接向上返回，由调用方决定重试策略。

use std::future::Future;
use std::time::Duration;

use serde::{Deserialize, Serialize};
use tracing::{info, warn};

/// 指数退避配置
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RetryConfig {
    pub max_attempts: u32,
    pub initial_delay: Duration,
    pub max_delay: Duration,
}

impl Default for RetryConfig {
    fn default() -> Self {
        Self {
            max_attempts: 5,
            initial_delay: Duration::from_millis(200),
            max_delay: Duration::from_secs(5),
        }
    }
}

impl RetryConfig {
    pub fn new(max_attempts: u32, initial_delay: Duration, max_delay: Duration) -> Self {
        Self {
            max_attempts: max_attempts.max(1),
            initial_delay,
            max_delay,
        }
    }

    /// 第 n 次失败后的等待时间（翻倍，封顶 max_delay）
    pub fn delay_for_attempt(&self, attempt: u32) -> Duration {
        let factor = 1u32.checked_shl(attempt).unwrap_or(u32::MAX);
        self.initial_delay
            .checked_mul(factor)
            .map_or(self.max_delay, |d| d.min(self.max_delay))
    }
}

/// 连接启动依赖，失败时按退避重试，全部失败返回最后一次错误
pub async fn connect_with_retry<F, Fut, T, E>(
    config: &RetryConfig,
    dependency: &str,
    mut connect: F,
) -> Result<T, E>
where
    F: FnMut() -> Fut,
    Fut: Future<Output = Result<T, E>>,
    E: std::fmt::Display,
{
    let max_attempts = config.max_attempts.max(1);
    let mut attempt = 0;

    loop {
        match connect().await {
            Ok(value) => {
                if attempt > 0 {
                    info!(dependency, attempt = attempt + 1, "Connected after retry");
                }
                return Ok(value);
            }
            Err(e) if attempt + 1 >= max_attempts => {
                warn!(dependency, attempts = max_attempts, error = %e, "Giving up connecting");
                return Err(e);
            }
            Err(e) => {
                let delay = config.delay_for_attempt(attempt);
                warn!(
                    dependency,
                    attempt = attempt + 1,
                    max_attempts,
                    error = %e,
                    delay_ms = delay.as_millis() as u64,
                    "Connection failed, retrying"
                );
                tokio::time::sleep(delay).await;
                attempt += 1;
            }
        }
    }
}

//! 定期清理过期的刷新令牌记录

use std::sync::Arc;
use std::time::Duration;

use chrono::Utc;
use gatherup_errors::{AuthError, AuthResult};
use tokio::time::{MissedTickBehavior, interval};
use tokio_util::sync::CancellationToken;
use tracing::{error, info};

use crate::domain::repositories::RefreshTokenStore;
use crate::infrastructure::metrics;

pub struct CleanupTask {
    refresh_tokens: Arc<dyn RefreshTokenStore>,
    interval: Duration,
    /// 过期后仍保留的时长，便于排查重放
    retention: Duration,
}

impl CleanupTask {
    pub fn new(
        refresh_tokens: Arc<dyn RefreshTokenStore>,
        interval: Duration,
        retention: Duration,
    ) -> Self {
        Self {
            refresh_tokens,
            interval,
            retention,
        }
    }

    pub fn start(self: Arc<Self>, shutdown: CancellationToken) -> tokio::task::JoinHandle<()> {
        tokio::spawn(async move {
            info!(interval_secs = self.interval.as_secs(), "Cleanup task started");
            let mut ticker = interval(self.interval);
            ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);

            loop {
                tokio::select! {
                    _ = ticker.tick() => {
                        if let Err(e) = self.run_once().await {
                            error!(error = %e, "Failed to purge expired refresh tokens");
                        }
                    }
                    _ = shutdown.cancelled() => {
                        info!("Cleanup task received shutdown signal");
                        break;
                    }
                }
            }
            info!("Cleanup task stopped");
        })
    }

    /// 删除 `expires_at < now - retention` 的记录
    pub async fn run_once(&self) -> AuthResult<u64> {
        let retention = chrono::Duration::from_std(self.retention)
            .map_err(|_| AuthError::persistence("cleanup retention out of range"))?;
        let cutoff = Utc::now() - retention;

        let deleted = self.refresh_tokens.delete_expired(cutoff).await?;
        if deleted > 0 {
            info!(deleted, "Purged expired refresh tokens");
        }
        metrics::record_cleanup(deleted);
        Ok(deleted)
    }
}

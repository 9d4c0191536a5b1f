//! gatherup-config - 配置加载库
//!
//! 加载顺序：`{dir}/default.toml` → `{dir}/{APP_ENV}.toml` → `GATHERUP_` 前缀环境变量
//! （嵌套字段用 `__` 分隔，例如 `GATHERUP_AUTH__JWT_SECRET`）。

use std::time::Duration;

use figment::{
    Figment,
    providers::{Env, Format, Toml},
};
use secrecy::{ExposeSecret, Secret};
use serde::Deserialize;
use thiserror::Error;

/// 低于该值的工作因子视为不安全
pub const MIN_PASSWORD_WORK_FACTOR: u32 = 4;
/// 工作因子的默认值，也是低于下限时的替换值
pub const DEFAULT_PASSWORD_WORK_FACTOR: u32 = 12;
/// 刷新令牌随机字节的最小长度
pub const MIN_REFRESH_TOKEN_BYTES: usize = 16;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Failed to load config: {0}")]
    Load(#[from] Box<figment::Error>),

    #[error("Invalid config: {0}")]
    Invalid(String),
}

/// 数据库配置
#[derive(Debug, Clone, Deserialize)]
pub struct DatabaseConfig {
    pub url: Secret<String>,
    #[serde(default = "default_max_connections")]
    pub max_connections: u32,
    #[serde(default = "default_connect_timeout_secs")]
    pub connect_timeout_secs: u64,
}

fn default_max_connections() -> u32 {
    // 开发环境: 10, 生产环境: 50
    match std::env::var("APP_ENV").as_deref() {
        Ok("production") => 50,
        _ => 10,
    }
}

fn default_connect_timeout_secs() -> u64 {
    30
}

/// 认证/会话配置
///
/// 进程启动后只读，不支持运行期修改。
#[derive(Debug, Clone, Deserialize)]
pub struct AuthConfig {
    /// 访问令牌的 HMAC 签名密钥
    pub jwt_secret: Secret<String>,
    #[serde(default = "default_access_token_ttl_secs")]
    pub access_token_ttl_secs: u64,
    #[serde(default = "default_refresh_token_ttl_secs")]
    pub refresh_token_ttl_secs: u64,
    /// 刷新令牌原始密钥的随机字节数
    #[serde(default = "default_refresh_token_bytes")]
    pub refresh_token_bytes: usize,
    #[serde(default = "default_password_work_factor")]
    pub password_work_factor: u32,
    #[serde(default = "default_request_timeout_secs")]
    pub request_timeout_secs: u64,
}

fn default_access_token_ttl_secs() -> u64 {
    30 * 24 * 3600
}

fn default_refresh_token_ttl_secs() -> u64 {
    30 * 24 * 3600
}

fn default_refresh_token_bytes() -> usize {
    32
}

fn default_password_work_factor() -> u32 {
    DEFAULT_PASSWORD_WORK_FACTOR
}

fn default_request_timeout_secs() -> u64 {
    5
}

impl AuthConfig {
    /// 下限钳制后的工作因子
    pub fn work_factor(&self) -> u32 {
        clamp_work_factor(self.password_work_factor)
    }

    pub fn access_token_ttl(&self) -> Duration {
        Duration::from_secs(self.access_token_ttl_secs)
    }

    pub fn refresh_token_ttl(&self) -> Duration {
        Duration::from_secs(self.refresh_token_ttl_secs)
    }

    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.request_timeout_secs)
    }
}

/// 低于 [`MIN_PASSWORD_WORK_FACTOR`] 时替换为默认值
pub fn clamp_work_factor(work_factor: u32) -> u32 {
    if work_factor < MIN_PASSWORD_WORK_FACTOR {
        DEFAULT_PASSWORD_WORK_FACTOR
    } else {
        work_factor
    }
}

/// 遥测配置
#[derive(Debug, Clone, Deserialize)]
pub struct TelemetryConfig {
    #[serde(default = "default_log_level")]
    pub log_level: String,
    /// Prometheus 抓取端口，未配置时不安装导出器
    pub metrics_port: Option<u16>,
}

impl Default for TelemetryConfig {
    fn default() -> Self {
        Self {
            log_level: default_log_level(),
            metrics_port: None,
        }
    }
}

fn default_log_level() -> String {
    "info".to_string()
}

/// 过期刷新令牌清理任务配置
#[derive(Debug, Clone, Deserialize)]
pub struct CleanupConfig {
    #[serde(default = "default_cleanup_interval_secs")]
    pub interval_secs: u64,
    /// 过期超过该时长的记录才会被删除
    #[serde(default = "default_cleanup_retention_secs")]
    pub retention_secs: u64,
}

impl Default for CleanupConfig {
    fn default() -> Self {
        Self {
            interval_secs: default_cleanup_interval_secs(),
            retention_secs: default_cleanup_retention_secs(),
        }
    }
}

fn default_cleanup_interval_secs() -> u64 {
    3600
}

fn default_cleanup_retention_secs() -> u64 {
    7 * 24 * 3600
}

/// 应用配置
#[derive(Debug, Clone, Deserialize)]
pub struct AppConfig {
    pub app_name: String,
    #[serde(default = "default_app_env")]
    pub app_env: String,
    pub database: DatabaseConfig,
    pub auth: AuthConfig,
    #[serde(default)]
    pub telemetry: TelemetryConfig,
    #[serde(default)]
    pub cleanup: CleanupConfig,
}

fn default_app_env() -> String {
    "development".to_string()
}

impl AppConfig {
    /// 从配置文件和环境变量加载配置
    pub fn load(config_dir: &str) -> Result<Self, ConfigError> {
        let env = std::env::var("APP_ENV").unwrap_or_else(|_| "development".to_string());
        Self::from_figment(
            Figment::new()
                .merge(Toml::file(format!("{}/default.toml", config_dir)))
                .merge(Toml::file(format!("{}/{}.toml", config_dir, env)))
                .merge(Env::prefixed("GATHERUP_").split("__")),
        )
    }

    /// 从已组装的 Figment 提取并校验
    pub fn from_figment(figment: Figment) -> Result<Self, ConfigError> {
        let config: Self = figment.extract().map_err(Box::new)?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.auth.jwt_secret.expose_secret().is_empty() {
            return Err(ConfigError::Invalid("auth.jwt_secret must not be empty".into()));
        }
        if self.auth.refresh_token_bytes < MIN_REFRESH_TOKEN_BYTES {
            return Err(ConfigError::Invalid(format!(
                "auth.refresh_token_bytes must be at least {}",
                MIN_REFRESH_TOKEN_BYTES
            )));
        }
        if self.auth.access_token_ttl_secs == 0 || self.auth.refresh_token_ttl_secs == 0 {
            return Err(ConfigError::Invalid("token TTLs must be positive".into()));
        }
        Ok(())
    }

    /// 是否为生产环境
    pub fn is_production(&self) -> bool {
        self.app_env == "production"
    }
}

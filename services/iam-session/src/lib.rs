//! iam-session - 手机号账户认证与会话生命周期
//!
//! 注册、登录、访问令牌签发与校验、刷新令牌轮换、登出与账户停用。

pub mod application;
pub mod bootstrap;
pub mod domain;
pub mod infrastructure;

pub use application::{AuthCoordinator, SessionSettings, SessionTokens};

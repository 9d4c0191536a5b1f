//! 存储接口

mod identity_store;
mod refresh_token_store;

pub use identity_store::IdentityStore;
pub use refresh_token_store::RefreshTokenStore;

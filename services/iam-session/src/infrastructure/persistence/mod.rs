//! 存储实现

mod memory;
mod postgres_identity_store;
mod postgres_refresh_token_store;

pub use memory::{InMemoryIdentityStore, InMemoryRefreshTokenStore};
pub use postgres_identity_store::PostgresIdentityStore;
pub use postgres_refresh_token_store::PostgresRefreshTokenStore;

//! 实体

mod account;
mod credential;
mod refresh_token;

pub use account::Account;
pub use credential::{Credential, CredentialKind};
pub use refresh_token::{IssuedRefreshToken, RefreshTokenRecord, RefreshTokenState};

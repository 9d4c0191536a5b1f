//! 领域服务

mod credential_service;

pub use credential_service::{CredentialService, MAX_PASSWORD_BYTES, hash_password, verify_password};

//! 值对象

mod hashed_password;
mod mobile_number;
mod refresh_secret;

pub use hashed_password::HashedPassword;
pub use mobile_number::{MAX_MOBILE_DIGITS, MIN_MOBILE_DIGITS, MobileNumber, normalize_mobile};
pub use refresh_secret::{RefreshSecret, RefreshSecretHash};

//! 应用层

mod coordinator;
mod dto;

pub use coordinator::{AuthCoordinator, SessionSettings};
pub use dto::SessionTokens;

//! gatherup-adapter-postgres - PostgreSQL 适配器

mod connection;
mod error;
mod transaction;

pub use connection::*;
pub use error::*;
pub use transaction::*;

//! 基础设施层

pub mod cleanup;
pub mod metrics;
pub mod persistence;

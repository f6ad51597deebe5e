//! Shared data model for the moderation dashboard: wire types, derived
//! metrics, configuration and platform directories.

pub mod config;
pub mod metrics;
pub mod platform;
pub mod protocol;

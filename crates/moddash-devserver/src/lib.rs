//! Stand-in moderation backend: the five JSON endpoints the dashboard
//! polls, over an in-memory store with a simulated worker pool.

pub mod http;
pub mod store;
pub mod workers;

pub use http::{router, start_server, ApiError};
pub use store::{SharedStore, Store};
pub use workers::spawn_workers;

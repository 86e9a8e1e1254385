//! Client for the managed backend: REST data operations, serverless function
//! invocation, and the realtime change feed.
//!
//! The backend itself (token issuance, push delivery, the realtime transport)
//! is an external collaborator; everything here is a thin call/response
//! surface over it.

mod cached;
mod changes;
mod client;
mod types;

pub use cached::CachedBackend;
pub use changes::ChangeFeed;
pub use client::BackendClient;
pub use types::{ChangeEvent, LeaveRecord};

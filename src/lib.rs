//! Notification and cache core for the Selah worship-ministry client.
//!
//! The hard parts of the product (token issuance, push delivery, AI
//! inference) live in managed services; this crate is the client-side layer
//! that has actual state and timing in it: a TTL roster cache, an
//! online/offline monitor, a live unread counter, a minute-aligned dispatch
//! scheduler, and the notification worker pipeline.

pub mod app;
pub mod backend;
pub mod cache;
pub mod config;
pub mod connectivity;
pub mod db;
pub mod event;
pub mod scheduler;
pub mod seasonal;
pub mod ui;
pub mod unread;
pub mod worker;

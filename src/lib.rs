//! Single-page status dashboard for Redis instances.
//!
//! Connects to every configured server, reads `INFO`, counts keys in each
//! populated database and renders an HTML page with a metrics table and a pie
//! chart per server.

pub mod collector;
pub mod config;
pub mod connection;
pub mod error;
pub mod info;
pub mod registry;
pub mod render;

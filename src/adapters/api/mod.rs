//! Poll API adapters. Implement the outbound ports.
//!
//! HTTP client for the real server and an offline stand-in for demos.

pub mod http_client;
pub mod offline;
pub mod wire;

pub use http_client::HttpPollApi;
pub use offline::OfflinePollApi;

//! Infrastructure adapters. Implement outbound ports.
//!
//! Poll API (HTTP or offline) and the terminal UI. Map errors to DomainError.

pub mod api;
pub mod ui;

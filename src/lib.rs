//! election-poll: terminal client for the Election Poll API with Hexagonal Architecture.
//!
//! The ballot session state machine lives in `domain`; `usecases` drive it through
//! the outbound ports; `adapters` provide the HTTP/offline API and the terminal UI.

pub mod adapters;
pub mod domain;
pub mod ports;
pub mod shared;
pub mod usecases;

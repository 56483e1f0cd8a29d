//! Application use cases. Orchestrate domain logic via ports.

pub mod ballot_service;
pub mod results_service;

pub use ballot_service::{BallotPorts, BallotService};
pub use results_service::{RefreshState, ResultsFeed, ResultsService};

//! Inbound port. UI (adapter) calls into the application.

use crate::domain::DomainError;

/// Input port: UI/CLI invokes application use cases.
#[async_trait::async_trait]
pub trait InputPort: Send + Sync {
    /// Main menu loop. Returns when the user exits.
    async fn run(&self) -> Result<(), DomainError>;

    /// Run one ballot session, from identification to the final receipt.
    async fn run_ballot(&self) -> Result<(), DomainError>;

    /// Show the live results dashboard until the user leaves it.
    async fn run_results(&self) -> Result<(), DomainError>;
}

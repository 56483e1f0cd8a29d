//! Outbound ports. Application calls into the poll API.
//!
//! Implemented by adapters.

use crate::domain::{
    CandidateDirectory, ContactCheckError, DomainError, HourlyCount, ResultsSnapshot,
    SubmissionError, SubmittedBallot, VoteReceipt,
};

/// Read-only candidate directory. Fetched once per ballot session.
#[async_trait::async_trait]
pub trait CandidateDirectoryPort: Send + Sync {
    async fn fetch_directory(&self) -> Result<CandidateDirectory, DomainError>;
}

/// Duplicate-contact lookup, consulted before the voter may start voting.
#[async_trait::async_trait]
pub trait ContactCheckPort: Send + Sync {
    /// `Ok(())` when the number has not voted yet.
    async fn check_contact(&self, contact_number: &str) -> Result<(), ContactCheckError>;
}

/// Write-once vote submission.
#[async_trait::async_trait]
pub trait VoteSubmissionPort: Send + Sync {
    /// Submit a finished ballot.
    ///
    /// # Errors
    /// [`SubmissionError::DuplicateContact`] when the contact number was claimed
    /// since it was checked; other rejections and transport failures otherwise.
    async fn submit_vote(&self, ballot: &SubmittedBallot) -> Result<VoteReceipt, SubmissionError>;
}

/// Server-computed results, consumed by the dashboard.
#[async_trait::async_trait]
pub trait ResultsPort: Send + Sync {
    async fn live_results(&self) -> Result<ResultsSnapshot, DomainError>;

    async fn barangay_results(&self, barangay: &str) -> Result<ResultsSnapshot, DomainError>;

    async fn hourly_stats(&self) -> Result<Vec<HourlyCount>, DomainError>;
}

//! Core domain layer. No external I/O dependencies.
//!
//! Entities, identity rules and the ballot session state machine live here.

pub mod entities;
pub mod errors;
pub mod session;
pub mod validation;

pub use entities::{
    BARANGAYS, BallotSelection, CandidateDirectory, CandidateResult, HourlyCount,
    MULTI_SEAT_LIMIT, MULTI_SEAT_POSITION, PositionResults, PositionSummary, ResultsScope,
    ResultsSnapshot, SubmittedBallot, VoteReceipt, VoterIdentity, selection_limit,
};
pub use errors::{ContactCheckError, DomainError, SubmissionError, ValidationError};
pub use session::{BallotSession, SessionPhase, ToggleOutcome};
pub use validation::validate_identity;

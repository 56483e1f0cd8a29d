//! Domain errors. Used by ports, the session and use cases.
//!
//! Adapters map infrastructure errors into these.

use crate::domain::session::SessionPhase;
use thiserror::Error;

/// Local identity-form rule failures. Never leave the client.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ValidationError {
    #[error("Please enter a valid name (minimum 2 characters)")]
    NameTooShort,

    #[error("Please enter a valid contact number (11 digits)")]
    InvalidContactNumber,

    #[error("Please select your barangay")]
    MissingBarangay,

    #[error("Unknown barangay: {0}")]
    UnknownBarangay(String),

    #[error("Please agree to the privacy policy to continue")]
    PrivacyTermsNotAccepted,
}

/// Failure reported by the duplicate-contact lookup.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ContactCheckError {
    /// Business rejection; the reason is shown verbatim.
    #[error("{0}")]
    Unavailable(String),

    /// Detail is for logs only.
    #[error("Unable to verify contact number, please try again")]
    Transport(String),
}

/// Failure reported by the vote submission collaborator.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum SubmissionError {
    /// Contact number was claimed between the check and the submit.
    #[error("{0}")]
    DuplicateContact(String),

    #[error("{0}")]
    Rejected(String),

    /// Detail is for logs only.
    #[error("Failed to submit vote, please try again")]
    Transport(String),
}

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum DomainError {
    #[error(transparent)]
    Validation(#[from] ValidationError),

    #[error(transparent)]
    ContactCheck(#[from] ContactCheckError),

    #[error(transparent)]
    Submission(#[from] SubmissionError),

    #[error("Failed to load candidates")]
    Directory(String),

    #[error("Candidates have not been loaded yet")]
    DirectoryUnavailable,

    #[error("Failed to load results")]
    Results(String),

    #[error("Unknown position: {0}")]
    UnknownPosition(String),

    #[error("{candidate} is not a candidate for {position}")]
    UnknownCandidate { position: String, candidate: String },

    #[error("Cannot {action} while {phase}")]
    InvalidPhase {
        phase: SessionPhase,
        action: &'static str,
    },

    #[error("A request is already in progress")]
    RequestInFlight,

    #[error("Your vote has already been recorded")]
    SessionClosed,

    #[error("Invalid configuration: {0}")]
    Config(String),

    #[error("Terminal UI error: {0}")]
    Ui(String),
}

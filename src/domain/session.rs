//! Ballot session state machine. No I/O.
//!
//! The controller feeds it user actions and collaborator responses; each method
//! moves the session to its next state and tells the caller what (if anything)
//! to send out next.

use crate::domain::entities::{
    BallotSelection, CandidateDirectory, SubmittedBallot, VoteReceipt, VoterIdentity,
    selection_limit,
};
use crate::domain::errors::{ContactCheckError, DomainError, SubmissionError};
use crate::domain::validation::validate_identity;
use std::fmt;
use std::time::{Duration, Instant};
use tracing::debug;

/// How long a selection-limit notice stays visible.
pub const DEFAULT_NOTICE_TTL: Duration = Duration::from_secs(3);

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionPhase {
    Identifying,
    Voting,
    Reviewing,
    Submitted,
    Failed,
}

impl fmt::Display for SessionPhase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            SessionPhase::Identifying => "identifying",
            SessionPhase::Voting => "voting",
            SessionPhase::Reviewing => "reviewing",
            SessionPhase::Submitted => "submitted",
            SessionPhase::Failed => "failed",
        };
        f.write_str(s)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum InFlight {
    ContactCheck,
    Submission,
}

/// Message shown to the voter. Transient notices carry an expiry.
#[derive(Debug, Clone, PartialEq, Eq)]
struct Notice {
    message: String,
    expires_at: Option<Instant>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ToggleOutcome {
    Added,
    Removed,
    LimitReached { limit: usize },
}

/// One voter's in-progress ballot.
#[derive(Debug, Clone)]
pub struct BallotSession {
    phase: SessionPhase,
    /// Phase to return to when a failure is dismissed.
    resume_phase: SessionPhase,
    identity: VoterIdentity,
    directory: Option<CandidateDirectory>,
    selection: BallotSelection,
    notice: Option<Notice>,
    failure: Option<String>,
    in_flight: Option<InFlight>,
    receipt: Option<VoteReceipt>,
    notice_ttl: Duration,
}

impl Default for BallotSession {
    fn default() -> Self {
        Self::new(DEFAULT_NOTICE_TTL)
    }
}

impl BallotSession {
    pub fn new(notice_ttl: Duration) -> Self {
        Self {
            phase: SessionPhase::Identifying,
            resume_phase: SessionPhase::Identifying,
            identity: VoterIdentity::default(),
            directory: None,
            selection: BallotSelection::default(),
            notice: None,
            failure: None,
            in_flight: None,
            receipt: None,
            notice_ttl,
        }
    }

    pub fn phase(&self) -> SessionPhase {
        self.phase
    }

    pub fn identity(&self) -> &VoterIdentity {
        &self.identity
    }

    pub fn directory(&self) -> Option<&CandidateDirectory> {
        self.directory.as_ref()
    }

    pub fn selection(&self) -> &BallotSelection {
        &self.selection
    }

    pub fn receipt(&self) -> Option<&VoteReceipt> {
        self.receipt.as_ref()
    }

    /// Failure overlay text while in [`SessionPhase::Failed`].
    pub fn failure(&self) -> Option<&str> {
        self.failure.as_deref()
    }

    /// True while a contact check or a submission awaits its response.
    pub fn is_busy(&self) -> bool {
        self.in_flight.is_some()
    }

    /// Current notice, if any. Transient notices disappear once `now` passes their expiry.
    pub fn notice(&self, now: Instant) -> Option<&str> {
        self.notice
            .as_ref()
            .filter(|n| n.expires_at.is_none_or(|at| now < at))
            .map(|n| n.message.as_str())
    }

    pub fn directory_loaded(&mut self, directory: CandidateDirectory) -> Result<(), DomainError> {
        self.ensure_open()?;
        self.directory = Some(directory);
        Ok(())
    }

    pub fn directory_failed(&mut self, reason: &str) -> Result<(), DomainError> {
        self.ensure_open()?;
        debug!(reason, "directory fetch failed");
        self.fail(DomainError::Directory(reason.to_string()).to_string());
        Ok(())
    }

    /// Validate `identity` locally. On success the contact check is in flight and
    /// the contact number to look up is returned.
    pub fn submit_identity(&mut self, identity: VoterIdentity) -> Result<String, DomainError> {
        self.ensure_open()?;
        self.expect_phase(SessionPhase::Identifying, "submit details")?;
        if self.in_flight.is_some() {
            return Err(DomainError::RequestInFlight);
        }
        self.identity = identity;
        if let Err(e) = validate_identity(&self.identity) {
            self.set_notice(e.to_string(), None);
            return Err(e.into());
        }
        if self.directory.is_none() {
            let e = DomainError::DirectoryUnavailable;
            self.set_notice(e.to_string(), None);
            return Err(e);
        }
        self.notice = None;
        self.in_flight = Some(InFlight::ContactCheck);
        Ok(self.identity.contact_number.clone())
    }

    pub fn resolve_contact_check(
        &mut self,
        result: Result<(), ContactCheckError>,
    ) -> Result<(), DomainError> {
        if self.in_flight != Some(InFlight::ContactCheck) || self.phase != SessionPhase::Identifying
        {
            debug!(phase = %self.phase, "ignoring stale contact check response");
            return Ok(());
        }
        self.in_flight = None;
        match result {
            Ok(()) => {
                self.phase = SessionPhase::Voting;
                self.notice = None;
                Ok(())
            }
            Err(e) => {
                self.set_notice(e.to_string(), None);
                Err(e.into())
            }
        }
    }

    /// Add or remove `candidate` for `position`. Removal is always allowed;
    /// adding past the position's limit leaves the selection unchanged.
    pub fn toggle_selection(
        &mut self,
        position: &str,
        candidate: &str,
        now: Instant,
    ) -> Result<ToggleOutcome, DomainError> {
        self.ensure_open()?;
        self.expect_phase(SessionPhase::Voting, "change votes")?;
        let directory = self
            .directory
            .as_ref()
            .ok_or(DomainError::DirectoryUnavailable)?;
        let candidates = directory
            .candidates(position)
            .ok_or_else(|| DomainError::UnknownPosition(position.to_string()))?;
        if !candidates.iter().any(|c| c == candidate) {
            return Err(DomainError::UnknownCandidate {
                position: position.to_string(),
                candidate: candidate.to_string(),
            });
        }

        if self.selection.is_selected(position, candidate) {
            self.selection.remove(position, candidate);
            return Ok(ToggleOutcome::Removed);
        }
        let limit = selection_limit(position);
        if self.selection.count(position) < limit {
            self.selection.push(position, candidate);
            Ok(ToggleOutcome::Added)
        } else {
            self.set_notice(
                format!(
                    "You can only select {} candidate(s) for {}",
                    limit, position
                ),
                Some(now + self.notice_ttl),
            );
            Ok(ToggleOutcome::LimitReached { limit })
        }
    }

    pub fn review(&mut self) -> Result<(), DomainError> {
        self.ensure_open()?;
        self.expect_phase(SessionPhase::Voting, "review")?;
        self.phase = SessionPhase::Reviewing;
        Ok(())
    }

    pub fn edit_votes(&mut self) -> Result<(), DomainError> {
        self.ensure_open()?;
        self.expect_phase(SessionPhase::Reviewing, "edit votes")?;
        if self.in_flight.is_some() {
            return Err(DomainError::RequestInFlight);
        }
        self.phase = SessionPhase::Voting;
        Ok(())
    }

    /// Freeze the ballot for submission. Further attempts are refused until
    /// [`Self::resolve_submission`] is called.
    pub fn begin_submission(&mut self) -> Result<SubmittedBallot, DomainError> {
        self.ensure_open()?;
        if self.in_flight == Some(InFlight::Submission) {
            return Err(DomainError::RequestInFlight);
        }
        self.expect_phase(SessionPhase::Reviewing, "submit")?;
        let directory = self
            .directory
            .as_ref()
            .ok_or(DomainError::DirectoryUnavailable)?;
        let votes = directory
            .positions()
            .map(|(position, _)| (position.to_string(), self.selection.get(position).to_vec()))
            .collect();
        self.in_flight = Some(InFlight::Submission);
        Ok(SubmittedBallot {
            voter_name: self.identity.name.trim().to_string(),
            contact_number: self.identity.contact_number.clone(),
            barangay: self.identity.barangay.trim().to_string(),
            votes,
        })
    }

    pub fn resolve_submission(
        &mut self,
        result: Result<VoteReceipt, SubmissionError>,
    ) -> Result<(), DomainError> {
        if self.in_flight != Some(InFlight::Submission) || self.phase != SessionPhase::Reviewing {
            debug!(phase = %self.phase, "ignoring stale submission response");
            return Ok(());
        }
        self.in_flight = None;
        match result {
            Ok(receipt) => {
                self.phase = SessionPhase::Submitted;
                self.receipt = Some(receipt);
                self.notice = None;
                Ok(())
            }
            Err(SubmissionError::DuplicateContact(reason)) => {
                self.phase = SessionPhase::Identifying;
                self.set_notice(reason.clone(), None);
                Err(SubmissionError::DuplicateContact(reason).into())
            }
            Err(e) => {
                self.fail(e.to_string());
                Err(e.into())
            }
        }
    }

    pub fn dismiss_failure(&mut self) -> Result<(), DomainError> {
        self.expect_phase(SessionPhase::Failed, "dismiss")?;
        self.phase = self.resume_phase;
        self.failure = None;
        Ok(())
    }

    fn fail(&mut self, message: String) {
        if self.phase != SessionPhase::Failed {
            self.resume_phase = self.phase;
        }
        self.phase = SessionPhase::Failed;
        self.failure = Some(message);
    }

    fn set_notice(&mut self, message: String, expires_at: Option<Instant>) {
        self.notice = Some(Notice {
            message,
            expires_at,
        });
    }

    fn ensure_open(&self) -> Result<(), DomainError> {
        if self.phase == SessionPhase::Submitted {
            Err(DomainError::SessionClosed)
        } else {
            Ok(())
        }
    }

    fn expect_phase(&self, phase: SessionPhase, action: &'static str) -> Result<(), DomainError> {
        if self.phase == phase {
            Ok(())
        } else {
            Err(DomainError::InvalidPhase {
                phase: self.phase,
                action,
            })
        }
    }
}

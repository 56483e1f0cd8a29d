//! Ballot session controller: load directory -> identify -> vote -> review -> submit.
//!
//! - Owns one `BallotSession` and drives it with the voter's actions
//! - Calls the contact check only after the local identity rules pass
//! - Holds at most one request of each kind in flight; never retries on its own

use crate::domain::validation::mask_contact;
use crate::domain::{
    BallotSession, DomainError, SessionPhase, SubmissionError, ToggleOutcome, VoterIdentity,
};
use crate::ports::{CandidateDirectoryPort, ContactCheckPort, VoteSubmissionPort};
use std::sync::Arc;
use std::time::{Duration, Instant};
use tracing::{debug, info, warn};

/// Collaborators a ballot session talks to. Cheap to clone.
#[derive(Clone)]
pub struct BallotPorts {
    pub directory: Arc<dyn CandidateDirectoryPort>,
    pub contacts: Arc<dyn ContactCheckPort>,
    pub submissions: Arc<dyn VoteSubmissionPort>,
}

/// Ballot service. One instance per voter session.
pub struct BallotService {
    ports: BallotPorts,
    session: BallotSession,
}

impl BallotService {
    pub fn new(ports: BallotPorts, notice_ttl: Duration) -> Self {
        Self {
            ports,
            session: BallotSession::new(notice_ttl),
        }
    }

    pub fn session(&self) -> &BallotSession {
        &self.session
    }

    pub fn phase(&self) -> SessionPhase {
        self.session.phase()
    }

    /// Fetch the candidate directory. On failure the session shows the failure overlay.
    pub async fn load_directory(&mut self) -> Result<(), DomainError> {
        match self.ports.directory.fetch_directory().await {
            Ok(directory) => {
                info!(positions = directory.len(), "candidate directory loaded");
                self.session.directory_loaded(directory)
            }
            Err(e) => {
                warn!(error = ?e, "candidate directory fetch failed");
                self.session.directory_failed(&format!("{:?}", e))?;
                Err(e)
            }
        }
    }

    /// Validate the identity form and, if it passes, check the contact number remotely.
    pub async fn submit_identity(&mut self, identity: VoterIdentity) -> Result<(), DomainError> {
        let contact = self.session.submit_identity(identity)?;
        debug!(contact = %mask_contact(&contact), "checking contact number");
        let result = self.ports.contacts.check_contact(&contact).await;
        if let Err(ref e) = result {
            info!(contact = %mask_contact(&contact), error = ?e, "contact number rejected");
        }
        self.session.resolve_contact_check(result)?;
        info!(contact = %mask_contact(&contact), "voter identified");
        Ok(())
    }

    pub fn toggle_selection(
        &mut self,
        position: &str,
        candidate: &str,
    ) -> Result<ToggleOutcome, DomainError> {
        let outcome = self
            .session
            .toggle_selection(position, candidate, Instant::now())?;
        debug!(position, candidate, ?outcome, "selection toggled");
        Ok(outcome)
    }

    pub fn review(&mut self) -> Result<(), DomainError> {
        self.session.review()
    }

    pub fn edit_votes(&mut self) -> Result<(), DomainError> {
        self.session.edit_votes()
    }

    pub fn dismiss_failure(&mut self) -> Result<(), DomainError> {
        self.session.dismiss_failure()
    }

    /// Submit the reviewed ballot. A duplicate contact rewinds to identification;
    /// other failures leave the session in the failure overlay with all data kept.
    pub async fn submit_ballot(&mut self) -> Result<(), DomainError> {
        let ballot = self.session.begin_submission()?;
        let contact = mask_contact(&ballot.contact_number);
        let picks = self.session.selection().total();
        info!(contact = %contact, picks, "submitting ballot");

        let result = self.ports.submissions.submit_vote(&ballot).await;
        match &result {
            Ok(receipt) => info!(contact = %contact, message = %receipt.message, "ballot accepted"),
            Err(SubmissionError::DuplicateContact(reason)) => {
                warn!(contact = %contact, reason = %reason, "contact number claimed before submit")
            }
            Err(e) => warn!(contact = %contact, error = ?e, "ballot submission failed"),
        }
        self.session.resolve_submission(result)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::{
        BallotSelection, CandidateDirectory, ContactCheckError, MULTI_SEAT_POSITION,
        SubmittedBallot, ValidationError, VoteReceipt,
    };
    use std::sync::Mutex;
    use std::sync::atomic::{AtomicUsize, Ordering};

    /// Scripted poll API: every port answers from a canned result and counts calls.
    struct FakeApi {
        directory: Result<CandidateDirectory, DomainError>,
        check: Result<(), ContactCheckError>,
        submit: Mutex<Vec<Result<VoteReceipt, SubmissionError>>>,
        check_calls: AtomicUsize,
        submitted: Mutex<Vec<SubmittedBallot>>,
    }

    impl FakeApi {
        fn new() -> Self {
            Self {
                directory: Ok(CandidateDirectory::new(vec![
                    ("MAYOR".into(), vec!["1. Alice".into(), "2. Bob".into()]),
                    (
                        MULTI_SEAT_POSITION.into(),
                        (1..=9).map(|i| format!("{i}. Councilor {i}")).collect(),
                    ),
                ])),
                check: Ok(()),
                submit: Mutex::new(Vec::new()),
                check_calls: AtomicUsize::new(0),
                submitted: Mutex::new(Vec::new()),
            }
        }

        fn with_submit(self, results: Vec<Result<VoteReceipt, SubmissionError>>) -> Self {
            *self.submit.lock().unwrap() = results.into_iter().rev().collect();
            self
        }

        fn ports(self: &Arc<Self>) -> BallotPorts {
            BallotPorts {
                directory: self.clone(),
                contacts: self.clone(),
                submissions: self.clone(),
            }
        }
    }

    #[async_trait::async_trait]
    impl CandidateDirectoryPort for FakeApi {
        async fn fetch_directory(&self) -> Result<CandidateDirectory, DomainError> {
            self.directory.clone()
        }
    }

    #[async_trait::async_trait]
    impl ContactCheckPort for FakeApi {
        async fn check_contact(&self, _contact_number: &str) -> Result<(), ContactCheckError> {
            self.check_calls.fetch_add(1, Ordering::SeqCst);
            self.check.clone()
        }
    }

    #[async_trait::async_trait]
    impl VoteSubmissionPort for FakeApi {
        async fn submit_vote(
            &self,
            ballot: &SubmittedBallot,
        ) -> Result<VoteReceipt, SubmissionError> {
            self.submitted.lock().unwrap().push(ballot.clone());
            self.submit
                .lock()
                .unwrap()
                .pop()
                .unwrap_or_else(|| Ok(VoteReceipt::default()))
        }
    }

    fn identity() -> VoterIdentity {
        VoterIdentity {
            name: "Pedro Penduko".into(),
            contact_number: "09998887777".into(),
            barangay: "Tubod".into(),
            has_agreed_to_privacy_terms: true,
        }
    }

    async fn identified(api: &Arc<FakeApi>) -> BallotService {
        let mut svc = BallotService::new(api.ports(), Duration::from_secs(3));
        svc.load_directory().await.unwrap();
        svc.submit_identity(identity()).await.unwrap();
        svc
    }

    #[tokio::test]
    async fn test_happy_path_single_mayor_vote() {
        let api = Arc::new(FakeApi::new());
        let mut svc = identified(&api).await;
        assert_eq!(svc.phase(), SessionPhase::Voting);

        svc.toggle_selection("MAYOR", "1. Alice").unwrap();
        svc.review().unwrap();
        svc.submit_ballot().await.unwrap();

        assert_eq!(svc.phase(), SessionPhase::Submitted);
        let expected: BallotSelection = [("MAYOR", vec!["1. Alice"])].into_iter().collect();
        assert_eq!(svc.session().selection(), &expected);

        let sent = api.submitted.lock().unwrap();
        assert_eq!(sent.len(), 1);
        assert_eq!(sent[0].voter_name, "Pedro Penduko");
        assert_eq!(sent[0].votes[0], ("MAYOR".into(), vec!["1. Alice".into()]));
    }

    #[tokio::test]
    async fn test_short_contact_makes_no_network_call() {
        let api = Arc::new(FakeApi::new());
        let mut svc = BallotService::new(api.ports(), Duration::from_secs(3));
        svc.load_directory().await.unwrap();

        let err = svc
            .submit_identity(VoterIdentity {
                contact_number: "0999888777".into(),
                ..identity()
            })
            .await
            .unwrap_err();

        assert_eq!(
            err,
            DomainError::Validation(ValidationError::InvalidContactNumber)
        );
        assert_eq!(svc.phase(), SessionPhase::Identifying);
        assert_eq!(api.check_calls.load(Ordering::SeqCst), 0);
        assert_eq!(
            svc.session().notice(Instant::now()),
            Some("Please enter a valid contact number (11 digits)")
        );
    }

    #[tokio::test]
    async fn test_privacy_terms_block_regardless_of_other_fields() {
        let api = Arc::new(FakeApi::new());
        let mut svc = BallotService::new(api.ports(), Duration::from_secs(3));
        svc.load_directory().await.unwrap();

        let err = svc
            .submit_identity(VoterIdentity {
                has_agreed_to_privacy_terms: false,
                ..identity()
            })
            .await
            .unwrap_err();
        assert_eq!(
            err,
            DomainError::Validation(ValidationError::PrivacyTermsNotAccepted)
        );
        assert_eq!(svc.phase(), SessionPhase::Identifying);
        assert_eq!(api.check_calls.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn test_contact_check_rejection_surfaces_reason() {
        let reason = "This contact number has already been used to vote";
        let api = Arc::new(FakeApi {
            check: Err(ContactCheckError::Unavailable(reason.into())),
            ..FakeApi::new()
        });
        let mut svc = BallotService::new(api.ports(), Duration::from_secs(3));
        svc.load_directory().await.unwrap();

        let err = svc.submit_identity(identity()).await.unwrap_err();
        assert_eq!(err.to_string(), reason);
        assert_eq!(svc.phase(), SessionPhase::Identifying);
        assert_eq!(svc.session().notice(Instant::now()), Some(reason));
        assert_eq!(api.check_calls.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn test_ninth_councilor_is_refused() {
        let api = Arc::new(FakeApi::new());
        let mut svc = identified(&api).await;
        for i in 1..=8 {
            svc.toggle_selection(MULTI_SEAT_POSITION, &format!("{i}. Councilor {i}"))
                .unwrap();
        }
        let before = svc.session().selection().clone();
        let outcome = svc
            .toggle_selection(MULTI_SEAT_POSITION, "9. Councilor 9")
            .unwrap();
        assert_eq!(outcome, ToggleOutcome::LimitReached { limit: 8 });
        assert_eq!(svc.session().selection(), &before);
        assert!(svc.session().notice(Instant::now()).is_some());
    }

    #[tokio::test]
    async fn test_submit_time_duplicate_rewinds() {
        let api = Arc::new(FakeApi::new().with_submit(vec![Err(
            SubmissionError::DuplicateContact(
                "This contact number has already been used to vote".into(),
            ),
        )]));
        let mut svc = identified(&api).await;
        svc.toggle_selection("MAYOR", "2. Bob").unwrap();
        svc.review().unwrap();

        let err = svc.submit_ballot().await.unwrap_err();
        assert!(matches!(
            err,
            DomainError::Submission(SubmissionError::DuplicateContact(_))
        ));
        assert_eq!(svc.phase(), SessionPhase::Identifying);
        assert_eq!(svc.session().identity(), &identity());

        // fix the number and go again
        svc.submit_identity(VoterIdentity {
            contact_number: "09990001111".into(),
            ..identity()
        })
        .await
        .unwrap();
        assert_eq!(svc.phase(), SessionPhase::Voting);
        assert_eq!(svc.session().selection().get("MAYOR"), ["2. Bob".to_string()]);
    }

    #[tokio::test]
    async fn test_generic_failure_then_retry() {
        let api = Arc::new(FakeApi::new().with_submit(vec![
            Err(SubmissionError::Rejected("Too many votes for MAYOR".into())),
            Ok(VoteReceipt {
                message: "Vote submitted successfully".into(),
                summary: vec![],
            }),
        ]));
        let mut svc = identified(&api).await;
        svc.review().unwrap();

        assert!(svc.submit_ballot().await.is_err());
        assert_eq!(svc.phase(), SessionPhase::Failed);
        assert_eq!(svc.session().failure(), Some("Too many votes for MAYOR"));

        svc.dismiss_failure().unwrap();
        assert_eq!(svc.phase(), SessionPhase::Reviewing);
        svc.submit_ballot().await.unwrap();
        assert_eq!(svc.phase(), SessionPhase::Submitted);
        assert_eq!(
            svc.session().receipt().map(|r| r.message.as_str()),
            Some("Vote submitted successfully")
        );
        assert_eq!(api.submitted.lock().unwrap().len(), 2);
    }

    #[tokio::test]
    async fn test_directory_failure_shows_overlay() {
        let api = Arc::new(FakeApi {
            directory: Err(DomainError::Directory("connection refused".into())),
            ..FakeApi::new()
        });
        let mut svc = BallotService::new(api.ports(), Duration::from_secs(3));
        assert!(svc.load_directory().await.is_err());
        assert_eq!(svc.phase(), SessionPhase::Failed);
        assert_eq!(svc.session().failure(), Some("Failed to load candidates"));
        svc.dismiss_failure().unwrap();
        assert_eq!(svc.phase(), SessionPhase::Identifying);
    }
}

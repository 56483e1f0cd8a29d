//! Offline poll API for demos and development without a server.
//!
//! Serves a built-in sample ballot, remembers which contact numbers have voted
//! and reports counts from the ballots it received. Nothing is persisted.

use crate::domain::{
    BARANGAYS, CandidateDirectory, CandidateResult, ContactCheckError, DomainError, HourlyCount,
    MULTI_SEAT_POSITION, PositionResults, PositionSummary, ResultsScope, ResultsSnapshot,
    SubmissionError, SubmittedBallot, VoteReceipt, selection_limit,
};
use crate::ports::{CandidateDirectoryPort, ContactCheckPort, ResultsPort, VoteSubmissionPort};
use chrono::{NaiveDateTime, Utc};
use std::collections::HashMap;
use std::time::Duration;
use tokio::sync::RwLock;
use tracing::info;

const DUPLICATE_REASON: &str = "This contact number has already been used to vote";

struct StoredBallot {
    ballot: SubmittedBallot,
    cast_at: NaiveDateTime,
}

/// In-memory stand-in for the poll API.
pub struct OfflinePollApi {
    directory: CandidateDirectory,
    ballots: RwLock<Vec<StoredBallot>>,
    /// Simulated network delay in milliseconds.
    delay_ms: u64,
}

impl OfflinePollApi {
    /// Sample ballot with the default delay (150ms).
    pub fn new() -> Self {
        Self::with_directory(sample_directory(), 150)
    }

    pub fn with_directory(directory: CandidateDirectory, delay_ms: u64) -> Self {
        Self {
            directory,
            ballots: RwLock::new(Vec::new()),
            delay_ms,
        }
    }

    async fn simulate_latency(&self) {
        if self.delay_ms > 0 {
            tokio::time::sleep(Duration::from_millis(self.delay_ms)).await;
        }
    }

    async fn has_voted(&self, contact_number: &str) -> bool {
        self.ballots
            .read()
            .await
            .iter()
            .any(|b| b.ballot.contact_number == contact_number)
    }

    /// Counts for every directory position over the ballots accepted by `keep`.
    async fn snapshot(
        &self,
        scope: ResultsScope,
        keep: impl Fn(&SubmittedBallot) -> bool,
    ) -> ResultsSnapshot {
        let ballots = self.ballots.read().await;
        let counted: Vec<&SubmittedBallot> =
            ballots.iter().map(|b| &b.ballot).filter(|b| keep(*b)).collect();

        let positions = self
            .directory
            .positions()
            .map(|(position, candidates)| {
                let votes: Vec<u64> = candidates
                    .iter()
                    .map(|c| {
                        counted
                            .iter()
                            .filter(|b| {
                                b.votes
                                    .iter()
                                    .any(|(p, picks)| p == position && picks.contains(c))
                            })
                            .count() as u64
                    })
                    .collect();
                let cast: u64 = votes.iter().sum();
                PositionResults {
                    position: position.to_string(),
                    total_votes: counted.len() as u64,
                    candidates: candidates
                        .iter()
                        .zip(votes)
                        .map(|(name, n)| CandidateResult {
                            name: name.clone(),
                            votes: n,
                            percentage: percentage(n, cast),
                        })
                        .collect(),
                }
            })
            .collect();

        let turnout_by_barangay = if scope == ResultsScope::All {
            let mut counts: HashMap<&str, u64> = HashMap::new();
            for b in &counted {
                *counts.entry(b.barangay.as_str()).or_default() += 1;
            }
            let mut turnout: Vec<(String, u64)> = counts
                .into_iter()
                .map(|(name, n)| (name.to_string(), n))
                .collect();
            turnout.sort_by(|a, b| b.1.cmp(&a.1).then_with(|| a.0.cmp(&b.0)));
            turnout
        } else {
            Vec::new()
        };

        ResultsSnapshot {
            scope,
            total_votes: counted.len() as u64,
            last_updated: Utc::now().naive_utc(),
            positions,
            turnout_by_barangay,
        }
    }
}

impl Default for OfflinePollApi {
    fn default() -> Self {
        Self::new()
    }
}

/// Share of `cast`, rounded to two decimals.
fn percentage(votes: u64, cast: u64) -> f64 {
    if cast == 0 {
        0.0
    } else {
        (votes as f64 / cast as f64 * 10_000.0).round() / 100.0
    }
}

fn sample_directory() -> CandidateDirectory {
    let numbered = |names: &[&str]| -> Vec<String> {
        names
            .iter()
            .enumerate()
            .map(|(i, n)| format!("{}. {}", i + 1, n))
            .collect()
    };
    CandidateDirectory::new(vec![
        (
            "MAYOR".to_string(),
            numbered(&["ALONTO, AMIN", "BAUTISTA, ROSA", "CRUZ, DANIEL"]),
        ),
        (
            "VICE MAYOR".to_string(),
            numbered(&["DIMAPORO, LINA", "ESPINOSA, MARCO"]),
        ),
        (
            MULTI_SEAT_POSITION.to_string(),
            numbered(&[
                "ABAD, NOEL",
                "BELMONTE, GRACE",
                "CASTRO, IVAN",
                "DELA PENA, JOY",
                "ENRIQUEZ, PAOLO",
                "FLORES, MAE",
                "GARCIA, RENE",
                "HERRERA, SOL",
                "IBANEZ, TONI",
                "JIMENEZ, UMA",
            ]),
        ),
    ])
}

#[async_trait::async_trait]
impl CandidateDirectoryPort for OfflinePollApi {
    async fn fetch_directory(&self) -> Result<CandidateDirectory, DomainError> {
        self.simulate_latency().await;
        info!(positions = self.directory.len(), "[OFFLINE] serving sample directory");
        Ok(self.directory.clone())
    }
}

#[async_trait::async_trait]
impl ContactCheckPort for OfflinePollApi {
    async fn check_contact(&self, contact_number: &str) -> Result<(), ContactCheckError> {
        self.simulate_latency().await;
        if self.has_voted(contact_number).await {
            return Err(ContactCheckError::Unavailable(DUPLICATE_REASON.to_string()));
        }
        Ok(())
    }
}

#[async_trait::async_trait]
impl VoteSubmissionPort for OfflinePollApi {
    async fn submit_vote(&self, ballot: &SubmittedBallot) -> Result<VoteReceipt, SubmissionError> {
        self.simulate_latency().await;
        if !BARANGAYS.contains(&ballot.barangay.as_str()) {
            return Err(SubmissionError::Rejected(format!(
                "Unknown barangay: {}",
                ballot.barangay
            )));
        }
        for (position, picks) in &ballot.votes {
            let max = selection_limit(position);
            if picks.len() > max {
                return Err(SubmissionError::Rejected(format!(
                    "Too many votes for {}. Maximum is {}",
                    position, max
                )));
            }
        }

        let mut ballots = self.ballots.write().await;
        if ballots
            .iter()
            .any(|b| b.ballot.contact_number == ballot.contact_number)
        {
            return Err(SubmissionError::DuplicateContact(DUPLICATE_REASON.to_string()));
        }
        ballots.push(StoredBallot {
            ballot: ballot.clone(),
            cast_at: Utc::now().naive_utc(),
        });
        info!(ballots = ballots.len(), "[OFFLINE] ballot stored");

        Ok(VoteReceipt {
            message: "Vote submitted successfully".to_string(),
            summary: ballot
                .votes
                .iter()
                .map(|(position, picks)| PositionSummary {
                    position: position.clone(),
                    selected: picks.len(),
                    maximum: selection_limit(position),
                    votes: picks.clone(),
                })
                .collect(),
        })
    }
}

#[async_trait::async_trait]
impl ResultsPort for OfflinePollApi {
    async fn live_results(&self) -> Result<ResultsSnapshot, DomainError> {
        self.simulate_latency().await;
        Ok(self.snapshot(ResultsScope::All, |_| true).await)
    }

    async fn barangay_results(&self, barangay: &str) -> Result<ResultsSnapshot, DomainError> {
        self.simulate_latency().await;
        let scope = ResultsScope::Barangay(barangay.to_string());
        Ok(self.snapshot(scope, |b| b.barangay == barangay).await)
    }

    async fn hourly_stats(&self) -> Result<Vec<HourlyCount>, DomainError> {
        self.simulate_latency().await;
        let ballots = self.ballots.read().await;
        let mut per_hour: Vec<HourlyCount> = Vec::new();
        for stored in ballots.iter() {
            let hour = stored.cast_at.format("%Y-%m-%d %H:00:00").to_string();
            match per_hour.iter_mut().find(|h| h.hour == hour) {
                Some(h) => h.vote_count += 1,
                None => per_hour.push(HourlyCount {
                    hour,
                    vote_count: 1,
                }),
            }
        }
        per_hour.sort_by(|a, b| a.hour.cmp(&b.hour));
        Ok(per_hour)
    }
}

//! HTTP adapter for the Election Poll API. Implements all outbound ports.
//!
//! JSON over HTTP via reqwest; base URL and timeout come from configuration.

use super::wire::{
    BarangayResultsBody, HourlyBody, LiveResultsBody, SubmitVoteRequest, SubmitVoteResponse,
    contact_error, directory_from_json, submission_error,
};
use crate::domain::validation::mask_contact;
use crate::domain::{
    CandidateDirectory, ContactCheckError, DomainError, HourlyCount, ResultsSnapshot,
    SubmissionError, SubmittedBallot, VoteReceipt,
};
use crate::ports::{CandidateDirectoryPort, ContactCheckPort, ResultsPort, VoteSubmissionPort};
use reqwest::{Client, Url};
use serde::de::DeserializeOwned;
use serde_json::{Map, Value};
use std::time::Duration;
use tracing::{debug, info, warn};

/// Poll API client.
pub struct HttpPollApi {
    client: Client,
    base_url: Url,
}

impl HttpPollApi {
    /// Create a client for the API rooted at `base_url` (e.g. "http://127.0.0.1:8080").
    pub fn new(base_url: &str, timeout: Duration) -> Result<Self, DomainError> {
        let base_url = Url::parse(base_url)
            .map_err(|e| DomainError::Config(format!("api_base_url {:?}: {}", base_url, e)))?;
        if base_url.cannot_be_a_base() {
            return Err(DomainError::Config(format!(
                "api_base_url {:?} cannot hold a path",
                base_url.as_str()
            )));
        }
        let client = Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| DomainError::Config(format!("HTTP client: {}", e)))?;
        info!(base_url = %base_url, timeout_secs = timeout.as_secs(), "poll API client ready");
        Ok(Self { client, base_url })
    }

    /// Base URL joined with percent-encoded path `segments`.
    fn endpoint(&self, segments: &[&str]) -> Url {
        let mut url = self.base_url.clone();
        if let Ok(mut path) = url.path_segments_mut() {
            path.pop_if_empty().extend(segments);
        }
        url
    }

    /// GET `url` and decode a JSON body. Errors are log-friendly strings.
    async fn get_json<T: DeserializeOwned>(&self, url: Url) -> Result<T, String> {
        debug!(url = %url, "GET");
        let response = self
            .client
            .get(url.clone())
            .send()
            .await
            .map_err(|e| format!("GET {} failed: {}", url, e))?;
        let status = response.status();
        if !status.is_success() {
            let text = response.text().await.unwrap_or_default();
            return Err(format!(
                "GET {} returned {}: {}",
                url,
                status,
                text.chars().take(200).collect::<String>()
            ));
        }
        response
            .json::<T>()
            .await
            .map_err(|e| format!("GET {} returned a malformed body: {}", url, e))
    }
}

#[async_trait::async_trait]
impl CandidateDirectoryPort for HttpPollApi {
    async fn fetch_directory(&self) -> Result<CandidateDirectory, DomainError> {
        let url = self.endpoint(&["api", "candidates"]);
        let body: Map<String, Value> = self.get_json(url).await.map_err(|e| {
            warn!(error = %e, "candidate directory request failed");
            DomainError::Directory(e)
        })?;
        directory_from_json(body).map_err(|e| DomainError::Directory(e.to_string()))
    }
}

#[async_trait::async_trait]
impl ContactCheckPort for HttpPollApi {
    async fn check_contact(&self, contact_number: &str) -> Result<(), ContactCheckError> {
        let url = self.endpoint(&["api", "check-contact", contact_number]);
        let response = self
            .client
            .get(url)
            .send()
            .await
            .map_err(|e| ContactCheckError::Transport(e.to_string()))?;
        let status = response.status();
        if status.is_success() {
            return Ok(());
        }
        let text = response.text().await.unwrap_or_default();
        let err = contact_error(status, &text);
        if let ContactCheckError::Transport(ref detail) = err {
            warn!(
                contact = %mask_contact(contact_number),
                detail = %detail,
                "contact check failed"
            );
        }
        Err(err)
    }
}

#[async_trait::async_trait]
impl VoteSubmissionPort for HttpPollApi {
    async fn submit_vote(&self, ballot: &SubmittedBallot) -> Result<VoteReceipt, SubmissionError> {
        let url = self.endpoint(&["api", "submit-vote"]);
        let request = SubmitVoteRequest::from(ballot);
        let response = self
            .client
            .post(url)
            .json(&request)
            .send()
            .await
            .map_err(|e| SubmissionError::Transport(e.to_string()))?;

        let status = response.status();
        if !status.is_success() {
            let text = response.text().await.unwrap_or_default();
            warn!(status = %status, body = %text.chars().take(200).collect::<String>(), "submit-vote returned error");
            return Err(submission_error(status, &text));
        }

        let body: SubmitVoteResponse = response
            .json()
            .await
            .map_err(|e| SubmissionError::Transport(format!("malformed response: {}", e)))?;
        VoteReceipt::try_from(body)
            .map_err(|e| SubmissionError::Transport(format!("malformed summary: {}", e)))
    }
}

#[async_trait::async_trait]
impl ResultsPort for HttpPollApi {
    async fn live_results(&self) -> Result<ResultsSnapshot, DomainError> {
        let url = self.endpoint(&["api", "results", "live"]);
        let body: LiveResultsBody = self.get_json(url).await.map_err(DomainError::Results)?;
        ResultsSnapshot::try_from(body).map_err(|e| DomainError::Results(e.to_string()))
    }

    async fn barangay_results(&self, barangay: &str) -> Result<ResultsSnapshot, DomainError> {
        let url = self.endpoint(&["api", "results", "barangay", barangay]);
        let body: BarangayResultsBody = self.get_json(url).await.map_err(DomainError::Results)?;
        ResultsSnapshot::try_from(body).map_err(|e| DomainError::Results(e.to_string()))
    }

    async fn hourly_stats(&self) -> Result<Vec<HourlyCount>, DomainError> {
        let url = self.endpoint(&["api", "stats", "hourly"]);
        let body: HourlyBody = self.get_json(url).await.map_err(DomainError::Results)?;
        Ok(body.into())
    }
}

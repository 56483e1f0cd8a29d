//! Poll API wire format. JSON bodies <-> domain entities.
//!
//! Position and candidate maps keep the server's key order (serde_json `preserve_order`).

use crate::domain::{
    CandidateDirectory, CandidateResult, ContactCheckError, HourlyCount, PositionResults,
    PositionSummary, ResultsScope, ResultsSnapshot, SubmissionError, SubmittedBallot,
    VoteReceipt,
};
use chrono::{DateTime, NaiveDateTime};
use reqwest::StatusCode;
use serde::{Deserialize, Deserializer, Serialize};
use serde_json::{Map, Value};
use std::collections::HashMap;

/// Substring the server puts in a duplicate-contact `detail`.
const DUPLICATE_CONTACT_MARKER: &str = "already been used";
/// Machine-readable code for the same condition, when the server sends one.
const DUPLICATE_CONTACT_CODE: &str = "duplicate_contact";

#[derive(Deserialize)]
struct PositionEntry {
    candidates: Vec<String>,
}

/// `GET /api/candidates` body: `{position: {"candidates": [...]}}`.
pub fn directory_from_json(body: Map<String, Value>) -> Result<CandidateDirectory, serde_json::Error> {
    let mut positions = Vec::with_capacity(body.len());
    for (position, entry) in body {
        let entry: PositionEntry = serde_json::from_value(entry)?;
        positions.push((position, entry.candidates));
    }
    Ok(CandidateDirectory::new(positions))
}

/// `POST /api/submit-vote` body.
#[derive(Debug, Serialize)]
pub struct SubmitVoteRequest<'a> {
    pub voter_name: &'a str,
    pub contact_number: &'a str,
    pub barangay: &'a str,
    pub votes: Map<String, Value>,
}

impl<'a> From<&'a SubmittedBallot> for SubmitVoteRequest<'a> {
    fn from(ballot: &'a SubmittedBallot) -> Self {
        let votes = ballot
            .votes
            .iter()
            .map(|(position, picks)| (position.clone(), Value::from(picks.clone())))
            .collect();
        Self {
            voter_name: &ballot.voter_name,
            contact_number: &ballot.contact_number,
            barangay: &ballot.barangay,
            votes,
        }
    }
}

#[derive(Deserialize)]
struct SummaryEntry {
    selected: usize,
    maximum: usize,
    votes: Vec<String>,
}

#[derive(Deserialize)]
pub struct SubmitVoteResponse {
    #[serde(default)]
    message: String,
    #[serde(default)]
    summary: Map<String, Value>,
}

impl TryFrom<SubmitVoteResponse> for VoteReceipt {
    type Error = serde_json::Error;

    fn try_from(body: SubmitVoteResponse) -> Result<Self, Self::Error> {
        let mut summary = Vec::with_capacity(body.summary.len());
        for (position, entry) in body.summary {
            let entry: SummaryEntry = serde_json::from_value(entry)?;
            summary.push(PositionSummary {
                position,
                selected: entry.selected,
                maximum: entry.maximum,
                votes: entry.votes,
            });
        }
        Ok(VoteReceipt {
            message: body.message,
            summary,
        })
    }
}

/// Error body: `{"detail": "..."}` (or a validation list), optionally with a `code`.
#[derive(Deserialize, Default)]
struct ErrorBody {
    #[serde(default)]
    detail: Value,
    #[serde(default)]
    code: Option<String>,
}

impl ErrorBody {
    fn parse(text: &str) -> Self {
        serde_json::from_str(text).unwrap_or_default()
    }

    /// Human-readable reason. Validation lists yield their first `msg`.
    fn reason(&self) -> Option<String> {
        match &self.detail {
            Value::String(s) if !s.trim().is_empty() => Some(s.clone()),
            Value::Array(items) => items
                .iter()
                .find_map(|i| i.get("msg").and_then(Value::as_str))
                .map(String::from),
            _ => None,
        }
    }
}

/// Map a non-success `check-contact` response.
pub fn contact_error(status: StatusCode, text: &str) -> ContactCheckError {
    let body = ErrorBody::parse(text);
    match body.reason() {
        Some(reason) if status.is_client_error() => ContactCheckError::Unavailable(reason),
        _ => ContactCheckError::Transport(format!("{}: {}", status, snippet(text))),
    }
}

/// Map a non-success `submit-vote` response to a typed error.
///
/// A `duplicate_contact` code wins; without one the `detail` text is inspected.
pub fn submission_error(status: StatusCode, text: &str) -> SubmissionError {
    let body = ErrorBody::parse(text);
    let reason = body.reason();
    let duplicate = body.code.as_deref() == Some(DUPLICATE_CONTACT_CODE)
        || reason
            .as_deref()
            .is_some_and(|r| r.contains(DUPLICATE_CONTACT_MARKER));
    if duplicate {
        return SubmissionError::DuplicateContact(reason.unwrap_or_else(|| {
            "This contact number has already been used to vote".to_string()
        }));
    }
    match reason {
        Some(reason) if status.is_client_error() => SubmissionError::Rejected(reason),
        _ => SubmissionError::Transport(format!("{}: {}", status, snippet(text))),
    }
}

fn snippet(text: &str) -> String {
    text.chars().take(200).collect()
}

/// Accepts naive ISO timestamps (server sends UTC without offset) and RFC 3339.
fn de_timestamp<'de, D>(deserializer: D) -> Result<NaiveDateTime, D::Error>
where
    D: Deserializer<'de>,
{
    let raw = String::deserialize(deserializer)?;
    raw.parse::<NaiveDateTime>()
        .or_else(|_| DateTime::parse_from_rfc3339(&raw).map(|dt| dt.naive_utc()))
        .map_err(serde::de::Error::custom)
}

#[derive(Deserialize)]
struct CandidateEntry {
    votes: u64,
    #[serde(default)]
    percentage: f64,
}

#[derive(Deserialize)]
struct PositionBody {
    #[serde(default)]
    total_votes: u64,
    #[serde(default)]
    candidates: Map<String, Value>,
}

#[derive(Deserialize)]
struct BallotBarangay {
    #[serde(default)]
    barangay: Option<String>,
}

/// `GET /api/results/live` body.
#[derive(Deserialize)]
pub struct LiveResultsBody {
    total_votes: u64,
    #[serde(deserialize_with = "de_timestamp")]
    last_updated: NaiveDateTime,
    results: Map<String, Value>,
    #[serde(default)]
    votes: Vec<BallotBarangay>,
}

/// `GET /api/results/barangay/{barangay}` body.
#[derive(Deserialize)]
pub struct BarangayResultsBody {
    barangay: String,
    total_votes: u64,
    #[serde(deserialize_with = "de_timestamp")]
    last_updated: NaiveDateTime,
    results: Map<String, Value>,
}

fn positions_from(results: Map<String, Value>) -> Result<Vec<PositionResults>, serde_json::Error> {
    let mut positions = Vec::with_capacity(results.len());
    for (position, body) in results {
        let body: PositionBody = serde_json::from_value(body)?;
        let mut candidates = Vec::with_capacity(body.candidates.len());
        for (name, entry) in body.candidates {
            let entry: CandidateEntry = serde_json::from_value(entry)?;
            candidates.push(CandidateResult {
                name,
                votes: entry.votes,
                percentage: entry.percentage,
            });
        }
        positions.push(PositionResults {
            position,
            total_votes: body.total_votes,
            candidates,
        });
    }
    Ok(positions)
}

/// Ballots per barangay, most first; ties by name.
fn turnout(votes: &[BallotBarangay]) -> Vec<(String, u64)> {
    let mut counts: HashMap<&str, u64> = HashMap::new();
    for name in votes.iter().filter_map(|v| v.barangay.as_deref()) {
        *counts.entry(name).or_default() += 1;
    }
    let mut out: Vec<(String, u64)> = counts
        .into_iter()
        .map(|(name, n)| (name.to_string(), n))
        .collect();
    out.sort_by(|a, b| b.1.cmp(&a.1).then_with(|| a.0.cmp(&b.0)));
    out
}

impl TryFrom<LiveResultsBody> for ResultsSnapshot {
    type Error = serde_json::Error;

    fn try_from(body: LiveResultsBody) -> Result<Self, Self::Error> {
        Ok(ResultsSnapshot {
            scope: ResultsScope::All,
            total_votes: body.total_votes,
            last_updated: body.last_updated,
            turnout_by_barangay: turnout(&body.votes),
            positions: positions_from(body.results)?,
        })
    }
}

impl TryFrom<BarangayResultsBody> for ResultsSnapshot {
    type Error = serde_json::Error;

    fn try_from(body: BarangayResultsBody) -> Result<Self, Self::Error> {
        Ok(ResultsSnapshot {
            scope: ResultsScope::Barangay(body.barangay),
            total_votes: body.total_votes,
            last_updated: body.last_updated,
            turnout_by_barangay: Vec::new(),
            positions: positions_from(body.results)?,
        })
    }
}

#[derive(Deserialize)]
struct HourlyEntry {
    hour: String,
    vote_count: u64,
}

/// `GET /api/stats/hourly` body.
#[derive(Deserialize)]
pub struct HourlyBody {
    hourly_stats: Vec<HourlyEntry>,
}

impl From<HourlyBody> for Vec<HourlyCount> {
    fn from(body: HourlyBody) -> Self {
        body.hourly_stats
            .into_iter()
            .map(|h| HourlyCount {
                hour: h.hour,
                vote_count: h.vote_count,
            })
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn as_map(v: Value) -> Map<String, Value> {
        match v {
            Value::Object(m) => m,
            other => panic!("expected object, got {other}"),
        }
    }

    #[test]
    fn test_directory_keeps_server_order() {
        let body = as_map(json!({
            "MAYOR": {"candidates": ["2. Zed", "1. Alice"]},
            "VICE MAYOR": {"candidates": ["1. Carla"]},
            "MEMBER, SANGGUNIANG PANLUNGSOD": {"candidates": []}
        }));
        let dir = directory_from_json(body).unwrap();
        let order: Vec<&str> = dir.positions().map(|(p, _)| p).collect();
        assert_eq!(
            order,
            vec!["MAYOR", "VICE MAYOR", "MEMBER, SANGGUNIANG PANLUNGSOD"]
        );
        assert_eq!(
            dir.candidates("MAYOR").unwrap(),
            ["2. Zed".to_string(), "1. Alice".to_string()]
        );
    }

    #[test]
    fn test_directory_rejects_malformed_entry() {
        let body = as_map(json!({"MAYOR": ["1. Alice"]}));
        assert!(directory_from_json(body).is_err());
    }

    #[test]
    fn test_submit_request_shape() {
        let ballot = SubmittedBallot {
            voter_name: "Ana".into(),
            contact_number: "09171234567".into(),
            barangay: "Acmac".into(),
            votes: vec![
                ("MAYOR".into(), vec!["1. Alice".into()]),
                ("VICE MAYOR".into(), vec![]),
            ],
        };
        let body = serde_json::to_value(SubmitVoteRequest::from(&ballot)).unwrap();
        assert_eq!(
            body,
            json!({
                "voter_name": "Ana",
                "contact_number": "09171234567",
                "barangay": "Acmac",
                "votes": {"MAYOR": ["1. Alice"], "VICE MAYOR": []}
            })
        );
    }

    #[test]
    fn test_receipt_from_response() {
        let body: SubmitVoteResponse = serde_json::from_value(json!({
            "message": "Vote submitted successfully",
            "summary": {"MAYOR": {"selected": 1, "maximum": 1, "votes": ["1. Alice"]}}
        }))
        .unwrap();
        let receipt = VoteReceipt::try_from(body).unwrap();
        assert_eq!(receipt.message, "Vote submitted successfully");
        assert_eq!(receipt.summary[0].position, "MAYOR");
        assert_eq!(receipt.summary[0].votes, vec!["1. Alice".to_string()]);
    }

    #[test]
    fn test_duplicate_detail_is_typed() {
        let err = submission_error(
            StatusCode::BAD_REQUEST,
            r#"{"detail": "This contact number has already been used to vote"}"#,
        );
        assert_eq!(
            err,
            SubmissionError::DuplicateContact(
                "This contact number has already been used to vote".into()
            )
        );
    }

    #[test]
    fn test_duplicate_code_wins_over_wording() {
        let err = submission_error(
            StatusCode::CONFLICT,
            r#"{"detail": "Number taken", "code": "duplicate_contact"}"#,
        );
        assert_eq!(err, SubmissionError::DuplicateContact("Number taken".into()));
    }

    #[test]
    fn test_other_submission_errors() {
        let err = submission_error(
            StatusCode::UNPROCESSABLE_ENTITY,
            r#"{"detail": [{"loc": ["body", "contact_number"], "msg": "Contact number must be 11 digits"}]}"#,
        );
        assert_eq!(
            err,
            SubmissionError::Rejected("Contact number must be 11 digits".into())
        );

        let err = submission_error(
            StatusCode::INTERNAL_SERVER_ERROR,
            r#"{"detail": "An error occurred while submitting the vote"}"#,
        );
        assert!(matches!(err, SubmissionError::Transport(_)));

        let err = submission_error(StatusCode::BAD_GATEWAY, "<html>bad gateway</html>");
        assert_eq!(err.to_string(), "Failed to submit vote, please try again");
    }

    #[test]
    fn test_contact_error_mapping() {
        let err = contact_error(
            StatusCode::BAD_REQUEST,
            r#"{"detail": "This contact number has already been used to vote"}"#,
        );
        assert_eq!(
            err,
            ContactCheckError::Unavailable(
                "This contact number has already been used to vote".into()
            )
        );
        assert!(matches!(
            contact_error(StatusCode::SERVICE_UNAVAILABLE, ""),
            ContactCheckError::Transport(_)
        ));
    }

    #[test]
    fn test_live_results_body() {
        let body: LiveResultsBody = serde_json::from_value(json!({
            "total_votes": 3,
            "last_updated": "2025-05-12T08:30:15.123456",
            "results": {
                "MAYOR": {
                    "total_votes": 3,
                    "candidates": {
                        "1. Alice": {"votes": 2, "percentage": 66.67, "votes_by_barangay": {"Tubod": 2}},
                        "2. Bob": {"votes": 1, "percentage": 33.33}
                    }
                },
                "VICE MAYOR": {"total_votes": 3, "candidates": {}}
            },
            "votes": [{"barangay": "Tubod"}, {"barangay": "Acmac"}, {"barangay": "Tubod"}, {"barangay": null}]
        }))
        .unwrap();
        let snap = ResultsSnapshot::try_from(body).unwrap();
        assert_eq!(snap.scope, ResultsScope::All);
        assert_eq!(snap.total_votes, 3);
        assert_eq!(snap.last_updated.to_string(), "2025-05-12 08:30:15.123456");
        assert_eq!(snap.positions.len(), 2);
        let mayor = snap.position("MAYOR").unwrap();
        assert_eq!(mayor.candidates[0].name, "1. Alice");
        assert_eq!(mayor.candidates[0].votes, 2);
        assert_eq!(
            snap.turnout_by_barangay,
            vec![("Tubod".to_string(), 2), ("Acmac".to_string(), 1)]
        );
    }

    #[test]
    fn test_barangay_results_body_with_rfc3339_and_integer_percentage() {
        let body: BarangayResultsBody = serde_json::from_value(json!({
            "barangay": "Bagong Silang",
            "total_votes": 0,
            "last_updated": "2025-05-12T08:30:15Z",
            "results": {"MAYOR": {"total_votes": 0, "candidates": {"1. Alice": {"votes": 0, "percentage": 0}}}}
        }))
        .unwrap();
        let snap = ResultsSnapshot::try_from(body).unwrap();
        assert_eq!(snap.scope, ResultsScope::Barangay("Bagong Silang".into()));
        assert!(snap.turnout_by_barangay.is_empty());
        assert_eq!(snap.positions[0].candidates[0].percentage, 0.0);
    }

    #[test]
    fn test_hourly_body() {
        let body: HourlyBody = serde_json::from_value(json!({
            "hourly_stats": [{"hour": "2025-05-12 08:00:00", "vote_count": 4}]
        }))
        .unwrap();
        let hours: Vec<HourlyCount> = body.into();
        assert_eq!(hours[0].vote_count, 4);
    }
}

//! Domain entities. Pure data structures for the ballot and the results.
//!
//! No HTTP/UI types here; adapters map into these.

use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// The only multi-seat position on the ballot.
pub const MULTI_SEAT_POSITION: &str = "MEMBER, SANGGUNIANG PANLUNGSOD";

/// Maximum picks for [`MULTI_SEAT_POSITION`].
pub const MULTI_SEAT_LIMIT: usize = 8;

/// Fixed set of barangays a voter may belong to (and results may be filtered by).
pub const BARANGAYS: &[&str] = &[
    "Abuno",
    "Acmac",
    "Bagong Silang",
    "Bonbonon",
    "Bunawan",
    "Buru-un",
    "Dalipuga",
    "Del Carmen",
    "Digkilaan",
    "Ditucalan",
    "Dulag",
    "Hinaplanon",
    "Hindang",
    "Kabacsanan",
    "Kalilangan",
    "Kiwalan",
    "Lanipao",
    "Luinab",
    "Mahayhay",
    "Mainit",
    "Mandulog",
    "Maria Cristina",
    "Palao",
    "Panoroganan",
    "Poblacion",
    "Puga-an",
    "Rogongon",
    "San Miguel",
    "San Roque",
    "Santa Elena",
    "Santa Filomena",
    "Santiago",
    "Santo Rosario",
    "Saray-Tibanga",
    "Suarez",
    "Tambacan",
    "Tibanga",
    "Tipanoy",
    "Tominobo Proper",
    "Tominobo Upper",
    "Tubod",
    "Ubaldo Laya",
    "Upper Hinaplanon",
    "Villa Verde",
];

/// Maximum number of candidates a voter may pick for `position`.
pub fn selection_limit(position: &str) -> usize {
    if position == MULTI_SEAT_POSITION {
        MULTI_SEAT_LIMIT
    } else {
        1
    }
}

pub fn is_known_barangay(name: &str) -> bool {
    BARANGAYS.contains(&name)
}

/// Voter details as typed into the identification form.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct VoterIdentity {
    pub name: String,
    pub contact_number: String,
    pub barangay: String,
    pub has_agreed_to_privacy_terms: bool,
}

/// Candidates per position, in the order the directory served them.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CandidateDirectory {
    positions: Vec<(String, Vec<String>)>,
}

impl CandidateDirectory {
    pub fn new(positions: Vec<(String, Vec<String>)>) -> Self {
        Self { positions }
    }

    /// Iterate `(position, candidates)` in directory order.
    pub fn positions(&self) -> impl Iterator<Item = (&str, &[String])> {
        self.positions
            .iter()
            .map(|(p, c)| (p.as_str(), c.as_slice()))
    }

    pub fn candidates(&self, position: &str) -> Option<&[String]> {
        self.positions
            .iter()
            .find(|(p, _)| p == position)
            .map(|(_, c)| c.as_slice())
    }

    pub fn len(&self) -> usize {
        self.positions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.positions.is_empty()
    }
}

/// Voter's picks: position -> chosen names in selection order.
///
/// Positions with no picks are absent, so two selections compare equal
/// whenever their non-empty picks match.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct BallotSelection {
    picks: HashMap<String, Vec<String>>,
}

impl BallotSelection {
    pub fn get(&self, position: &str) -> &[String] {
        self.picks.get(position).map(Vec::as_slice).unwrap_or(&[])
    }

    pub fn is_selected(&self, position: &str, candidate: &str) -> bool {
        self.get(position).iter().any(|c| c == candidate)
    }

    pub fn count(&self, position: &str) -> usize {
        self.get(position).len()
    }

    pub fn total(&self) -> usize {
        self.picks.values().map(Vec::len).sum()
    }

    pub(crate) fn push(&mut self, position: &str, candidate: &str) {
        self.picks
            .entry(position.to_string())
            .or_default()
            .push(candidate.to_string());
    }

    pub(crate) fn remove(&mut self, position: &str, candidate: &str) {
        if let Some(list) = self.picks.get_mut(position) {
            list.retain(|c| c != candidate);
            if list.is_empty() {
                self.picks.remove(position);
            }
        }
    }
}

impl<P, C> FromIterator<(P, Vec<C>)> for BallotSelection
where
    P: Into<String>,
    C: Into<String>,
{
    fn from_iter<I: IntoIterator<Item = (P, Vec<C>)>>(iter: I) -> Self {
        let picks: HashMap<String, Vec<String>> = iter
            .into_iter()
            .map(|(p, c)| (p.into(), c.into_iter().map(Into::into).collect::<Vec<String>>()))
            .filter(|(_, c)| !c.is_empty())
            .collect();
        Self { picks }
    }
}

/// Request shape handed to the vote submission collaborator.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SubmittedBallot {
    pub voter_name: String,
    pub contact_number: String,
    pub barangay: String,
    /// One entry per directory position, in directory order; empty when nothing was picked.
    pub votes: Vec<(String, Vec<String>)>,
}

/// Per-position echo returned by a successful submission.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PositionSummary {
    pub position: String,
    pub selected: usize,
    pub maximum: usize,
    pub votes: Vec<String>,
}

/// Successful submission acknowledgement.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct VoteReceipt {
    pub message: String,
    pub summary: Vec<PositionSummary>,
}

/// Which slice of the electorate a results snapshot covers.
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash)]
pub enum ResultsScope {
    #[default]
    All,
    Barangay(String),
}

impl std::fmt::Display for ResultsScope {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ResultsScope::All => write!(f, "All barangays"),
            ResultsScope::Barangay(name) => write!(f, "{}", name),
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct CandidateResult {
    pub name: String,
    pub votes: u64,
    pub percentage: f64,
}

#[derive(Debug, Clone, PartialEq)]
pub struct PositionResults {
    pub position: String,
    pub total_votes: u64,
    pub candidates: Vec<CandidateResult>,
}

impl PositionResults {
    /// Candidates sorted by votes, highest first. Ties keep server order.
    pub fn ranked(&self) -> Vec<&CandidateResult> {
        let mut out: Vec<&CandidateResult> = self.candidates.iter().collect();
        out.sort_by(|a, b| b.votes.cmp(&a.votes));
        out
    }
}

/// One read of the results endpoint, already computed server-side.
#[derive(Debug, Clone, PartialEq)]
pub struct ResultsSnapshot {
    pub scope: ResultsScope,
    pub total_votes: u64,
    /// Server clock, UTC.
    pub last_updated: NaiveDateTime,
    pub positions: Vec<PositionResults>,
    /// Ballots per barangay, most first. Only populated for [`ResultsScope::All`].
    pub turnout_by_barangay: Vec<(String, u64)>,
}

impl ResultsSnapshot {
    pub fn position(&self, position: &str) -> Option<&PositionResults> {
        self.positions.iter().find(|p| p.position == position)
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HourlyCount {
    pub hour: String,
    pub vote_count: u64,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_selection_limit() {
        assert_eq!(selection_limit(MULTI_SEAT_POSITION), 8);
        assert_eq!(selection_limit("MAYOR"), 1);
        assert_eq!(selection_limit("member, sangguniang panlungsod"), 1);
    }

    #[test]
    fn test_barangay_set() {
        assert_eq!(BARANGAYS.len(), 44);
        assert!(is_known_barangay("Tibanga"));
        assert!(!is_known_barangay("tibanga"));
    }

    #[test]
    fn test_selection_drops_empty_positions() {
        let mut sel = BallotSelection::default();
        sel.push("MAYOR", "1. Alice");
        sel.remove("MAYOR", "1. Alice");
        assert_eq!(sel, BallotSelection::default());
        assert_eq!(sel.total(), 0);
    }

    #[test]
    fn test_ranked_is_stable_on_ties() {
        let pos = PositionResults {
            position: "MAYOR".into(),
            total_votes: 5,
            candidates: vec![
                CandidateResult { name: "1. A".into(), votes: 1, percentage: 20.0 },
                CandidateResult { name: "2. B".into(), votes: 2, percentage: 40.0 },
                CandidateResult { name: "3. C".into(), votes: 2, percentage: 40.0 },
            ],
        };
        let names: Vec<&str> = pos.ranked().iter().map(|c| c.name.as_str()).collect();
        assert_eq!(names, vec!["2. B", "3. C", "1. A"]);
    }
}

//! Implements InputPort. Inquire-based interactive prompts.
//!
//! Every screen is drawn from the ballot session's state; the loop in
//! `run_ballot` only reads the phase and forwards the voter's choice.

use super::privacy::PRIVACY_POLICY;
use super::progress::with_spinner;
use super::results_view::{display_name, header, hourly_table, position_table, turnout_table};
use super::style::{Palette, clear_screen, println_colored};
use crate::domain::{
    BARANGAYS, DomainError, ResultsScope, ResultsSnapshot, SessionPhase, ToggleOutcome,
    VoterIdentity, selection_limit,
};
use crate::ports::InputPort;
use crate::shared::config::Theme;
use crate::usecases::{BallotPorts, BallotService, RefreshState, ResultsService};
use async_trait::async_trait;
use inquire::{InquireError, Select, Text};
use std::fmt;
use std::sync::Arc;
use std::time::{Duration, Instant};
use tracing::{debug, warn};

/// How many barangays the overall dashboard lists under turnout.
const TURNOUT_ROWS: usize = 10;

/// Display and timing settings for the terminal adapter.
#[derive(Debug, Clone, Copy)]
pub struct TuiSettings {
    pub theme: Theme,
    pub notice_ttl: Duration,
    pub refresh_interval: Duration,
}

/// TUI adapter. Inquire prompts.
pub struct TuiInputPort {
    ballot_ports: BallotPorts,
    results: Arc<ResultsService>,
    settings: TuiSettings,
    palette: Palette,
}

impl TuiInputPort {
    pub fn new(
        ballot_ports: BallotPorts,
        results: Arc<ResultsService>,
        settings: TuiSettings,
    ) -> Self {
        Self {
            ballot_ports,
            results,
            palette: Palette::for_theme(settings.theme),
            settings,
        }
    }
}

/// Esc becomes `None` (go back); Ctrl-C and terminal failures are errors.
fn answered<T>(result: Result<T, InquireError>) -> Result<Option<T>, DomainError> {
    match result {
        Ok(v) => Ok(Some(v)),
        Err(InquireError::OperationCanceled) => Ok(None),
        Err(InquireError::OperationInterrupted) => Err(DomainError::Ui("interrupted".into())),
        Err(e) => Err(DomainError::Ui(e.to_string())),
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum MainMenu {
    Vote,
    LiveResults,
    Privacy,
    Exit,
}

impl fmt::Display for MainMenu {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            MainMenu::Vote => "Vote",
            MainMenu::LiveResults => "Live results",
            MainMenu::Privacy => "Privacy policy",
            MainMenu::Exit => "Exit",
        })
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum PrivacyChoice {
    Agree,
    Read,
    Decline,
}

impl fmt::Display for PrivacyChoice {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            PrivacyChoice::Agree => "I agree to the privacy policy",
            PrivacyChoice::Read => "Read the privacy policy",
            PrivacyChoice::Decline => "I do not agree",
        })
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
enum VotingMenu {
    Position {
        name: String,
        picked: usize,
        limit: usize,
    },
    Review,
}

impl fmt::Display for VotingMenu {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            VotingMenu::Position {
                name,
                picked,
                limit,
            } => write!(f, "{} ({}/{})", name, picked, limit),
            VotingMenu::Review => f.write_str("Review ballot"),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
enum CandidateOption {
    Candidate { name: String, selected: bool },
    Done,
}

impl fmt::Display for CandidateOption {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CandidateOption::Candidate { name, selected } => {
                let mark = if *selected { "[x]" } else { "[ ]" };
                write!(f, "{} {}", mark, display_name(name))
            }
            CandidateOption::Done => f.write_str("Done"),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum ReviewChoice {
    Submit,
    Edit,
}

impl fmt::Display for ReviewChoice {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            ReviewChoice::Submit => "Submit ballot",
            ReviewChoice::Edit => "Edit votes",
        })
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum FailureChoice {
    Dismiss,
    Leave,
}

impl fmt::Display for FailureChoice {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            FailureChoice::Dismiss => "Dismiss",
            FailureChoice::Leave => "Back to main menu",
        })
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
enum ResultsMenu {
    Position(String),
    Filter,
    Hourly,
    Refresh,
    Back,
}

impl fmt::Display for ResultsMenu {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ResultsMenu::Position(p) => write!(f, "Show {}", p),
            ResultsMenu::Filter => f.write_str("Filter by barangay"),
            ResultsMenu::Hourly => f.write_str("Votes per hour"),
            ResultsMenu::Refresh => f.write_str("Refresh now"),
            ResultsMenu::Back => f.write_str("Back"),
        }
    }
}

/// Toggle list for `position`, marking the voter's current picks, then "Done".
fn candidate_options(
    service: &BallotService,
    position: &str,
    candidates: &[String],
) -> Vec<CandidateOption> {
    let selection = service.session().selection();
    let mut options: Vec<CandidateOption> = candidates
        .iter()
        .map(|c| CandidateOption::Candidate {
            name: c.clone(),
            selected: selection.is_selected(position, c),
        })
        .collect();
    options.push(CandidateOption::Done);
    options
}

/// Apply a pick from the toggle list to the session.
fn pick_candidate(
    service: &mut BallotService,
    position: &str,
    candidate: &str,
) -> Result<ToggleOutcome, DomainError> {
    let outcome = service.toggle_selection(position, candidate)?;
    if let ToggleOutcome::LimitReached { limit } = outcome {
        debug!(position, limit, "selection limit reached");
    }
    Ok(outcome)
}

/// The dashboard redraws after each action, not while a prompt is open.
fn refresh_help(interval: Duration) -> String {
    format!(
        "Data refreshes every {}s; the view updates after your next choice",
        interval.as_secs()
    )
}

/// Mayor first when present, otherwise the first position listed.
fn default_position(snapshot: &ResultsSnapshot) -> Option<String> {
    snapshot
        .position("MAYOR")
        .or_else(|| snapshot.positions.first())
        .map(|p| p.position.clone())
}

impl TuiInputPort {
    fn print_notice(&self, service: &BallotService) {
        if let Some(notice) = service.session().notice(Instant::now()) {
            println_colored(self.palette.error, &format!("! {}", notice));
        }
    }

    /// Identity form prefilled from `previous`. `None` when the voter backs out.
    fn identity_form(&self, previous: &VoterIdentity) -> Result<Option<VoterIdentity>, DomainError> {
        let Some(name) = answered(
            Text::new("Full name:")
                .with_initial_value(&previous.name)
                .prompt(),
        )?
        else {
            return Ok(None);
        };
        let Some(contact_number) = answered(
            Text::new("Contact number:")
                .with_initial_value(&previous.contact_number)
                .with_help_message("11 digits, used only to prevent duplicate votes")
                .prompt(),
        )?
        else {
            return Ok(None);
        };
        let start = BARANGAYS
            .iter()
            .position(|b| *b == previous.barangay)
            .unwrap_or(0);
        let Some(barangay) = answered(
            Select::new("Barangay:", BARANGAYS.to_vec())
                .with_starting_cursor(start)
                .with_page_size(10)
                .prompt(),
        )?
        else {
            return Ok(None);
        };

        let agreed = loop {
            let choice = answered(
                Select::new(
                    "Privacy policy:",
                    vec![
                        PrivacyChoice::Agree,
                        PrivacyChoice::Read,
                        PrivacyChoice::Decline,
                    ],
                )
                .prompt(),
            )?;
            match choice {
                None => return Ok(None),
                Some(PrivacyChoice::Read) => println!("\n{}\n", PRIVACY_POLICY),
                Some(PrivacyChoice::Agree) => break true,
                Some(PrivacyChoice::Decline) => break false,
            }
        };

        Ok(Some(VoterIdentity {
            name,
            contact_number: contact_number.trim().to_string(),
            barangay: barangay.to_string(),
            has_agreed_to_privacy_terms: agreed,
        }))
    }

    /// Position picker. Returns false when the voter leaves the ballot.
    fn voting_step(&self, service: &mut BallotService) -> Result<bool, DomainError> {
        let Some(directory) = service.session().directory().cloned() else {
            return Err(DomainError::DirectoryUnavailable);
        };
        let selection = service.session().selection();
        let mut options: Vec<VotingMenu> = directory
            .positions()
            .map(|(name, _)| VotingMenu::Position {
                name: name.to_string(),
                picked: selection.count(name),
                limit: selection_limit(name),
            })
            .collect();
        options.push(VotingMenu::Review);

        println_colored(
            self.palette.muted,
            &format!("{} candidate(s) selected", selection.total()),
        );
        match answered(
            Select::new("Choose a position:", options)
                .with_page_size(12)
                .with_help_message("Esc to leave without voting")
                .prompt(),
        )? {
            Some(VotingMenu::Position { name, .. }) => {
                let candidates = directory.candidates(&name).unwrap_or_default().to_vec();
                self.candidate_picker(service, &name, &candidates)?;
                Ok(true)
            }
            Some(VotingMenu::Review) => {
                service.review()?;
                Ok(true)
            }
            None => Ok(false),
        }
    }

    fn candidate_picker(
        &self,
        service: &mut BallotService,
        position: &str,
        candidates: &[String],
    ) -> Result<(), DomainError> {
        let limit = selection_limit(position);
        let mut cursor = 0;
        loop {
            self.print_notice(service);
            let options = candidate_options(service, position, candidates);
            let prompt = format!(
                "{} ({}/{} selected):",
                position,
                service.session().selection().count(position),
                limit
            );
            let help = format!("Select up to {}. Enter to toggle, Esc when done", limit);
            let choice = answered(
                Select::new(&prompt, options)
                    .with_starting_cursor(cursor)
                    .with_page_size(12)
                    .with_help_message(&help)
                    .prompt(),
            )?;
            let Some(CandidateOption::Candidate { name, .. }) = choice else {
                return Ok(());
            };
            cursor = candidates.iter().position(|c| *c == name).unwrap_or(0);
            pick_candidate(service, position, &name)?;
        }
    }

    fn print_review(&self, service: &BallotService) {
        let session = service.session();
        println_colored(self.palette.accent, "\nReview your ballot");
        let identity = session.identity();
        println!("  {} | {}", identity.name.trim(), identity.barangay);
        if let Some(directory) = session.directory() {
            for (position, _) in directory.positions() {
                let picks = session.selection().get(position);
                println_colored(
                    self.palette.accent_alt,
                    &format!(
                        "  {} ({}/{})",
                        position,
                        picks.len(),
                        selection_limit(position)
                    ),
                );
                if picks.is_empty() {
                    println_colored(self.palette.muted, "    (no selection)");
                }
                for pick in picks {
                    println!("    - {}", display_name(pick));
                }
            }
        }
    }

    fn print_receipt(&self, service: &BallotService) {
        println_colored(self.palette.success, "\nThank You for Voting!");
        println!("Your vote has been successfully recorded.");
        if let Some(receipt) = service.session().receipt() {
            for summary in &receipt.summary {
                let names: Vec<&str> = summary.votes.iter().map(|v| display_name(v)).collect();
                println!(
                    "  {} ({}/{}): {}",
                    summary.position,
                    summary.selected,
                    summary.maximum,
                    if names.is_empty() {
                        "-".to_string()
                    } else {
                        names.join("; ")
                    }
                );
            }
        }
        println!();
    }

    fn print_dashboard(&self, state: &RefreshState, position: Option<&str>) {
        clear_screen();
        match state {
            RefreshState::Loading => println_colored(self.palette.muted, "Loading results..."),
            RefreshState::Failed(message) => println_colored(self.palette.error, message),
            RefreshState::Ready(snapshot) => {
                println_colored(self.palette.accent, &header(snapshot));
                println!();
                if let Some(results) = position.and_then(|p| snapshot.position(p)) {
                    for (i, line) in position_table(results).iter().enumerate() {
                        if i == 0 {
                            println_colored(self.palette.accent_alt, line);
                        } else {
                            println!("{}", line);
                        }
                    }
                }
                if snapshot.scope == ResultsScope::All {
                    println!();
                    println_colored(self.palette.accent_alt, "Turnout by barangay");
                    for line in turnout_table(&snapshot.turnout_by_barangay, TURNOUT_ROWS) {
                        println!("{}", line);
                    }
                }
            }
        }
        println!();
    }

    async fn show_hourly(&self) -> Result<(), DomainError> {
        match with_spinner("Loading hourly counts...", self.results.hourly()).await {
            Ok(hours) => {
                println_colored(self.palette.accent_alt, "Votes per hour");
                for line in hourly_table(&hours) {
                    println!("{}", line);
                }
            }
            Err(e) => {
                warn!(error = ?e, "hourly stats failed");
                println_colored(self.palette.error, &e.to_string());
            }
        }
        answered(Text::new("Press Enter to continue").prompt())?;
        Ok(())
    }

    fn pick_scope(&self, current: &ResultsScope) -> Result<Option<ResultsScope>, DomainError> {
        let mut options = vec![ResultsScope::All.to_string()];
        options.extend(BARANGAYS.iter().map(|b| b.to_string()));
        let start = match current {
            ResultsScope::All => 0,
            ResultsScope::Barangay(name) => options.iter().position(|o| o == name).unwrap_or(0),
        };
        let choice = answered(
            Select::new("Show results for:", options)
                .with_starting_cursor(start)
                .with_page_size(12)
                .prompt(),
        )?;
        Ok(choice.map(|c| {
            if c == ResultsScope::All.to_string() {
                ResultsScope::All
            } else {
                ResultsScope::Barangay(c)
            }
        }))
    }
}

#[async_trait]
impl InputPort for TuiInputPort {
    async fn run(&self) -> Result<(), DomainError> {
        loop {
            let choice = answered(
                Select::new(
                    "What would you like to do?",
                    vec![
                        MainMenu::Vote,
                        MainMenu::LiveResults,
                        MainMenu::Privacy,
                        MainMenu::Exit,
                    ],
                )
                .prompt(),
            )?;
            let outcome = match choice {
                Some(MainMenu::Vote) => self.run_ballot().await,
                Some(MainMenu::LiveResults) => self.run_results().await,
                Some(MainMenu::Privacy) => {
                    println!("\n{}\n", PRIVACY_POLICY);
                    Ok(())
                }
                Some(MainMenu::Exit) | None => return Ok(()),
            };
            match outcome {
                Err(e @ DomainError::Ui(_)) => return Err(e),
                Err(e) => println_colored(self.palette.error, &e.to_string()),
                Ok(()) => {}
            }
        }
    }

    async fn run_ballot(&self) -> Result<(), DomainError> {
        let mut service = BallotService::new(self.ballot_ports.clone(), self.settings.notice_ttl);
        let _ = with_spinner("Loading candidates...", service.load_directory()).await;

        loop {
            match service.phase() {
                SessionPhase::Identifying => {
                    if service.session().directory().is_none() {
                        let _ = with_spinner("Loading candidates...", service.load_directory()).await;
                        continue;
                    }
                    self.print_notice(&service);
                    let previous = service.session().identity().clone();
                    let Some(identity) = self.identity_form(&previous)? else {
                        return Ok(());
                    };
                    // Rejections are already recorded as the session notice.
                    let _ = with_spinner(
                        "Checking contact number...",
                        service.submit_identity(identity),
                    )
                    .await;
                }
                SessionPhase::Voting => {
                    if !self.voting_step(&mut service)? {
                        return Ok(());
                    }
                }
                SessionPhase::Reviewing => {
                    self.print_review(&service);
                    let choice = answered(
                        Select::new(
                            "Ready to submit?",
                            vec![ReviewChoice::Submit, ReviewChoice::Edit],
                        )
                        .prompt(),
                    )?;
                    match choice {
                        Some(ReviewChoice::Submit) => {
                            let _ =
                                with_spinner("Submitting ballot...", service.submit_ballot()).await;
                        }
                        Some(ReviewChoice::Edit) | None => service.edit_votes()?,
                    }
                }
                SessionPhase::Failed => {
                    let message = service.session().failure().unwrap_or("Something went wrong");
                    println_colored(self.palette.error, &format!("\n  {}\n", message));
                    let choice = answered(
                        Select::new(
                            "Error",
                            vec![FailureChoice::Dismiss, FailureChoice::Leave],
                        )
                        .prompt(),
                    )?;
                    match choice {
                        Some(FailureChoice::Dismiss) => service.dismiss_failure()?,
                        Some(FailureChoice::Leave) | None => return Ok(()),
                    }
                }
                SessionPhase::Submitted => {
                    self.print_receipt(&service);
                    return Ok(());
                }
            }
        }
    }

    async fn run_results(&self) -> Result<(), DomainError> {
        let mut scope = ResultsScope::All;
        let mut position: Option<String> = None;

        loop {
            let mut feed = self
                .results
                .watch(scope.clone(), self.settings.refresh_interval);
            with_spinner("Loading results...", feed.changed()).await;

            // Redraw after every action; the feed keeps refreshing in the background.
            loop {
                let state = feed.current();
                if let RefreshState::Ready(snapshot) = &state {
                    let known = position.as_deref().is_some_and(|p| snapshot.position(p).is_some());
                    if !known {
                        position = default_position(snapshot);
                    }
                }
                self.print_dashboard(&state, position.as_deref());

                let mut options: Vec<ResultsMenu> = match &state {
                    RefreshState::Ready(snapshot) => snapshot
                        .positions
                        .iter()
                        .filter(|p| Some(p.position.as_str()) != position.as_deref())
                        .map(|p| ResultsMenu::Position(p.position.clone()))
                        .collect(),
                    _ => Vec::new(),
                };
                options.extend([
                    ResultsMenu::Filter,
                    ResultsMenu::Hourly,
                    ResultsMenu::Refresh,
                    ResultsMenu::Back,
                ]);

                let choice = answered(
                    Select::new("Results:", options)
                        .with_page_size(12)
                        .with_help_message(&refresh_help(self.settings.refresh_interval))
                        .prompt(),
                )?;
                match choice {
                    Some(ResultsMenu::Position(p)) => position = Some(p),
                    Some(ResultsMenu::Filter) => {
                        if let Some(next) = self.pick_scope(&scope)? {
                            if next != scope {
                                scope = next;
                                break;
                            }
                        }
                    }
                    Some(ResultsMenu::Hourly) => self.show_hourly().await?,
                    Some(ResultsMenu::Refresh) => {
                        feed.refresh_now();
                        with_spinner("Refreshing...", feed.changed()).await;
                    }
                    Some(ResultsMenu::Back) | None => return Ok(()),
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::adapters::api::OfflinePollApi;
    use crate::domain::{CandidateDirectory, CandidateResult, PositionResults};
    use chrono::NaiveDate;

    async fn voting_service() -> BallotService {
        let api = Arc::new(OfflinePollApi::with_directory(
            CandidateDirectory::new(vec![(
                "MAYOR".to_string(),
                vec!["1. ALONTO, AMIN".to_string(), "2. BAUTISTA, ROSA".to_string()],
            )]),
            0,
        ));
        let ports = BallotPorts {
            directory: api.clone(),
            contacts: api.clone(),
            submissions: api,
        };
        let mut service = BallotService::new(ports, Duration::from_secs(3));
        service.load_directory().await.unwrap();
        service
            .submit_identity(VoterIdentity {
                name: "Juan Dela Cruz".into(),
                contact_number: "09171234567".into(),
                barangay: BARANGAYS[0].to_string(),
                has_agreed_to_privacy_terms: true,
            })
            .await
            .unwrap();
        service
    }

    #[tokio::test]
    async fn test_toggle_list_drives_selection() {
        let mut service = voting_service().await;
        assert_eq!(service.phase(), SessionPhase::Voting);
        let candidates = service
            .session()
            .directory()
            .and_then(|d| d.candidates("MAYOR"))
            .unwrap()
            .to_vec();

        assert_eq!(
            pick_candidate(&mut service, "MAYOR", "1. ALONTO, AMIN").unwrap(),
            ToggleOutcome::Added
        );
        assert_eq!(
            pick_candidate(&mut service, "MAYOR", "2. BAUTISTA, ROSA").unwrap(),
            ToggleOutcome::LimitReached { limit: 1 }
        );
        assert!(service.session().notice(Instant::now()).is_some());

        let labels: Vec<String> = candidate_options(&service, "MAYOR", &candidates)
            .iter()
            .map(|o| o.to_string())
            .collect();
        assert_eq!(labels, vec!["[x] ALONTO, AMIN", "[ ] BAUTISTA, ROSA", "Done"]);

        assert_eq!(
            pick_candidate(&mut service, "MAYOR", "1. ALONTO, AMIN").unwrap(),
            ToggleOutcome::Removed
        );
        assert_eq!(service.session().selection().count("MAYOR"), 0);
    }

    #[test]
    fn test_refresh_help_says_when_view_updates() {
        let help = refresh_help(Duration::from_secs(30));
        assert!(help.contains("30s"));
        assert!(help.contains("next choice"));
    }

    fn snapshot(positions: &[&str]) -> ResultsSnapshot {
        ResultsSnapshot {
            scope: ResultsScope::All,
            total_votes: 0,
            last_updated: NaiveDate::from_ymd_opt(2025, 5, 12)
                .and_then(|d| d.and_hms_opt(8, 0, 0))
                .unwrap(),
            positions: positions
                .iter()
                .map(|p| PositionResults {
                    position: p.to_string(),
                    total_votes: 0,
                    candidates: vec![CandidateResult {
                        name: "1. A".into(),
                        votes: 0,
                        percentage: 0.0,
                    }],
                })
                .collect(),
            turnout_by_barangay: vec![],
        }
    }

    #[test]
    fn test_default_position_prefers_mayor() {
        assert_eq!(
            default_position(&snapshot(&["VICE MAYOR", "MAYOR"])),
            Some("MAYOR".into())
        );
        assert_eq!(
            default_position(&snapshot(&["VICE MAYOR"])),
            Some("VICE MAYOR".into())
        );
        assert_eq!(default_position(&snapshot(&[])), None);
    }

    #[test]
    fn test_menu_labels() {
        let option = CandidateOption::Candidate {
            name: "2. BAUTISTA, ROSA".into(),
            selected: true,
        };
        assert_eq!(option.to_string(), "[x] BAUTISTA, ROSA");
        let position = VotingMenu::Position {
            name: "MEMBER, SANGGUNIANG PANLUNGSOD".into(),
            picked: 3,
            limit: 8,
        };
        assert_eq!(position.to_string(), "MEMBER, SANGGUNIANG PANLUNGSOD (3/8)");
    }

    #[test]
    fn test_cancel_means_back() {
        assert_eq!(
            answered::<()>(Err(InquireError::OperationCanceled)),
            Ok(None)
        );
        assert!(matches!(
            answered::<()>(Err(InquireError::OperationInterrupted)),
            Err(DomainError::Ui(_))
        ));
    }
}

//! Text rendering for the live results dashboard. Pure functions; the TUI prints them.

use crate::domain::{HourlyCount, PositionResults, ResultsSnapshot};

const BAR_WIDTH: usize = 24;
const NAME_WIDTH: usize = 28;

/// Candidate name without its ballot number: "3. CRUZ, DANIEL" -> "CRUZ, DANIEL".
pub fn display_name(candidate: &str) -> &str {
    match candidate.split_once(". ") {
        Some((number, rest)) if !number.is_empty() && number.chars().all(|c| c.is_ascii_digit()) => {
            rest.trim()
        }
        _ => candidate.trim(),
    }
}

/// Proportional bar of at most `width` cells. Any non-zero value gets one cell.
pub fn bar(value: u64, max: u64, width: usize) -> String {
    if max == 0 || value == 0 {
        return String::new();
    }
    let cells = ((value as f64 / max as f64) * width as f64).round() as usize;
    "█".repeat(cells.clamp(1, width))
}

fn pad(text: &str, width: usize) -> String {
    let mut out: String = text.chars().take(width).collect();
    let len = out.chars().count();
    out.extend(std::iter::repeat_n(' ', width - len));
    out
}

pub fn header(snapshot: &ResultsSnapshot) -> String {
    format!(
        "{} | Total votes cast: {} | Last updated: {}",
        snapshot.scope,
        snapshot.total_votes,
        snapshot.last_updated.format("%Y-%m-%d %H:%M:%S")
    )
}

/// Ranked table for one position, most votes first.
pub fn position_table(results: &PositionResults) -> Vec<String> {
    let ranked = results.ranked();
    let max = ranked.first().map(|c| c.votes).unwrap_or(0);
    let mut lines = vec![format!(
        "{} ({} ballots)",
        results.position, results.total_votes
    )];
    if ranked.is_empty() {
        lines.push("  No candidates".to_string());
        return lines;
    }
    for (rank, c) in ranked.iter().enumerate() {
        lines.push(format!(
            "{:>3}. {} {:>6} {:>6.2}%  {}",
            rank + 1,
            pad(display_name(&c.name), NAME_WIDTH),
            c.votes,
            c.percentage,
            bar(c.votes, max, BAR_WIDTH)
        ));
    }
    lines
}

/// Turnout per barangay, highest first, limited to `limit` rows.
pub fn turnout_table(turnout: &[(String, u64)], limit: usize) -> Vec<String> {
    if turnout.is_empty() {
        return vec!["  No ballots yet".to_string()];
    }
    let max = turnout.iter().map(|(_, n)| *n).max().unwrap_or(0);
    let mut lines: Vec<String> = turnout
        .iter()
        .take(limit)
        .map(|(name, n)| {
            format!(
                "  {} {:>6}  {}",
                pad(name, NAME_WIDTH),
                n,
                bar(*n, max, BAR_WIDTH)
            )
        })
        .collect();
    if turnout.len() > limit {
        lines.push(format!("  ... and {} more", turnout.len() - limit));
    }
    lines
}

pub fn hourly_table(hours: &[HourlyCount]) -> Vec<String> {
    if hours.is_empty() {
        return vec!["  No ballots yet".to_string()];
    }
    let max = hours.iter().map(|h| h.vote_count).max().unwrap_or(0);
    hours
        .iter()
        .map(|h| {
            format!(
                "  {} {:>6}  {}",
                pad(&h.hour, 20),
                h.vote_count,
                bar(h.vote_count, max, BAR_WIDTH)
            )
        })
        .collect()
}

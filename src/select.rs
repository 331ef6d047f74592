use crossterm::style::{Color, Stylize};
use tracing::warn;

use crate::console::Operator;
use crate::domain::{CacheRecord, CandidateMatch, Category};

pub const MAX_SELECTION_ATTEMPTS: usize = 5;
pub const NO_DESCRIPTION: &str = "No description available.";

const PALETTE: [Color; 6] = [
    Color::Red,
    Color::Green,
    Color::Yellow,
    Color::Blue,
    Color::Magenta,
    Color::Cyan,
];

/// Outcome of parsing one answer to the selection prompt.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Choice {
    Index(usize),
    Invalid,
}

/// Interpret an answer against `count` candidates; empty selects the first.
pub fn parse_choice(input: &str, count: usize) -> Choice {
    let trimmed = input.trim();
    if trimmed.is_empty() {
        return Choice::Index(0);
    }
    match trimmed.parse::<usize>() {
        Ok(number) if (1..=count).contains(&number) => Choice::Index(number - 1),
        _ => Choice::Invalid,
    }
}

/// Let the operator pick one candidate and turn it into a cache record.
///
/// `candidates` must not be empty. The record's origin name is always
/// `requested_name`, whatever title the provider returned.
pub fn resolve(
    candidates: &[CandidateMatch],
    requested_name: &str,
    category: Category,
    operator: &mut dyn Operator,
) -> CacheRecord {
    let index = choose(candidates, requested_name, category, operator);
    normalize(&candidates[index], requested_name)
}

fn choose(
    candidates: &[CandidateMatch],
    requested_name: &str,
    category: Category,
    operator: &mut dyn Operator,
) -> usize {
    if !operator.is_interactive() {
        return 0;
    }

    operator.say(&format!("Results found for {requested_name}:"));
    for (idx, candidate) in candidates.iter().enumerate() {
        let number = idx + 1;
        let color = PALETTE[number % PALETTE.len()];
        let year = candidate
            .year
            .as_deref()
            .map(|year| format!(" ({year})"))
            .unwrap_or_default();
        operator.say(&format!(
            "{number}. {}{year}",
            candidate.title.as_str().with(color)
        ));
    }

    let prompt = format!(
        "Enter the number of the correct match for {requested_name} or hit Enter for default (1): "
    );
    for _ in 0..MAX_SELECTION_ATTEMPTS {
        let Some(answer) = operator.ask(&prompt) else {
            return 0;
        };
        match parse_choice(&answer, candidates.len()) {
            Choice::Index(index) => return index,
            Choice::Invalid => operator.say(&format!(
                "Invalid input. Enter a number between 1 and {}.",
                candidates.len()
            )),
        }
    }

    warn!(
        name = requested_name,
        category = %category,
        "no valid selection after {MAX_SELECTION_ATTEMPTS} attempts, using first match"
    );
    0
}

/// Shape a chosen candidate into the record stored in the cache.
pub fn normalize(candidate: &CandidateMatch, requested_name: &str) -> CacheRecord {
    let title = if candidate.title.trim().is_empty() {
        "Unknown".to_string()
    } else {
        candidate.title.clone()
    };
    CacheRecord {
        title,
        description: candidate
            .description
            .clone()
            .unwrap_or_else(|| NO_DESCRIPTION.to_string()),
        artwork: candidate
            .artwork
            .clone()
            .filter(|value| !value.trim().is_empty()),
        origin_name: requested_name.to_string(),
        updated_at: chrono::Utc::now(),
    }
}

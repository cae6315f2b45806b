//! Per-stage validation and extraction of patient details.
//!
//! Each extractor takes the whitespace-normalized utterance (original case)
//! and either captures a value for the record or names the re-ask to send.

use std::sync::LazyLock;

use regex::Regex;

use super::normalize::{capitalize_first, title_case_name};
use super::prompts;
use super::state::Stage;

/// A single name token: Latin letters, Devanagari block, apostrophe, period, hyphen.
static NAME_TOKEN: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^[a-zA-Z\x{0900}-\x{097F}'.-]+$").expect("valid name token regex"));

/// First run of one to three ASCII digits anywhere in the utterance.
static AGE_DIGITS: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"[0-9]{1,3}").expect("valid age regex"));

pub const MIN_NAME_TOKENS: usize = 2;
pub const MIN_AGE: u32 = 1;
pub const MAX_AGE: u32 = 120;
pub const MIN_ISSUE_CHARS: usize = 4;
pub const MIN_SLOT_CHARS: usize = 3;

/// A value captured for the patient record.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Captured {
    Name(String),
    Age(u32),
    Issue(String),
    Slot(String),
}

/// Why the current stage has to ask again.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Reask {
    Name,
    AgeMissing,
    AgeOutOfRange,
    Issue,
    Slot,
}

impl Reask {
    pub fn prompt(&self) -> &'static str {
        match self {
            Self::Name => prompts::REASK_NAME,
            Self::AgeMissing => prompts::REASK_AGE_MISSING,
            Self::AgeOutOfRange => prompts::REASK_AGE_RANGE,
            Self::Issue => prompts::REASK_ISSUE,
            Self::Slot => prompts::REASK_SLOT,
        }
    }
}

/// Result of running the current stage's extractor on one utterance.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Extraction {
    /// Stage satisfied; move to the next one, recording the value if any.
    Advance(Option<Captured>),
    /// Validation missed; hold the stage and re-ask.
    Reask(Reask),
    /// Terminal stage; nothing to collect.
    Closed,
}

/// Run the extractor for `stage` over a whitespace-normalized utterance.
pub fn extract(stage: Stage, text: &str) -> Extraction {
    match stage {
        Stage::GreetingResponse => Extraction::Advance(None),
        Stage::AskName => capture(extract_name(text), Captured::Name),
        Stage::AskAge => capture(extract_age(text), Captured::Age),
        Stage::AskIssue => capture(extract_issue(text), Captured::Issue),
        Stage::AskSlot => capture(extract_slot(text), Captured::Slot),
        Stage::Done => Extraction::Closed,
    }
}

fn capture<T>(result: Result<T, Reask>, wrap: impl FnOnce(T) -> Captured) -> Extraction {
    match result {
        Ok(value) => Extraction::Advance(Some(wrap(value))),
        Err(reask) => Extraction::Reask(reask),
    }
}

/// Keep the tokens that look like name parts; at least two are required.
///
/// Tokens with digits or other symbols are dropped, not fatal, so
/// "mera naam Rita Verma hai" yields all four words.
pub fn extract_name(text: &str) -> Result<String, Reask> {
    let words: Vec<&str> = text
        .split(' ')
        .filter(|word| NAME_TOKEN.is_match(word))
        .collect();
    if words.len() < MIN_NAME_TOKENS {
        return Err(Reask::Name);
    }
    Ok(title_case_name(&words.join(" ")))
}

/// First 1-3 digit run, accepted when it falls in `MIN_AGE..=MAX_AGE`.
pub fn extract_age(text: &str) -> Result<u32, Reask> {
    let digits = AGE_DIGITS.find(text).ok_or(Reask::AgeMissing)?;
    let age: u32 = digits
        .as_str()
        .parse()
        .map_err(|_| Reask::AgeOutOfRange)?;
    if !(MIN_AGE..=MAX_AGE).contains(&age) {
        return Err(Reask::AgeOutOfRange);
    }
    Ok(age)
}

pub fn extract_issue(text: &str) -> Result<String, Reask> {
    if text.chars().count() < MIN_ISSUE_CHARS {
        return Err(Reask::Issue);
    }
    Ok(capitalize_first(text))
}

pub fn extract_slot(text: &str) -> Result<String, Reask> {
    if text.chars().count() < MIN_SLOT_CHARS {
        return Err(Reask::Slot);
    }
    Ok(text.to_string())
}

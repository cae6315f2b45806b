//! Out-of-flow question matcher.
//!
//! Runs before the stage extractor on every user turn. If an utterance hits
//! one of the fixed topics (services, hours, doctor, fees, location, parking)
//! the canned answer is returned and the intake stage is left alone.
//!
//! Topics are scanned in declaration order and the first hit wins; several
//! topics in one utterance never combine.

use regex::Regex;
use serde::{Deserialize, Serialize};
use tracing::debug;

/// How keywords are compared against the utterance.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MatchMode {
    /// Plain substring search. Short keywords over-match ("dr" inside
    /// "address", "time" inside "sometimes").
    #[default]
    Substring,
    /// Keyword must start and end on a word boundary.
    Token,
}

impl std::str::FromStr for MatchMode {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "substring" => Ok(Self::Substring),
            "token" => Ok(Self::Token),
            other => Err(format!("expected 'substring' or 'token', got '{other}'")),
        }
    }
}

/// Topic of a canned answer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Topic {
    Services,
    Hours,
    Doctor,
    Fees,
    Location,
    Parking,
}

impl std::fmt::Display for Topic {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let s = match self {
            Self::Services => "services",
            Self::Hours => "hours",
            Self::Doctor => "doctor",
            Self::Fees => "fees",
            Self::Location => "location",
            Self::Parking => "parking",
        };
        write!(f, "{s}")
    }
}

/// One row of the static topic table.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct InterruptEntry {
    pub topic: Topic,
    pub keywords: &'static [&'static str],
    pub response: &'static str,
}

/// The clinic's FAQ table, in match priority order.
pub const INTERRUPT_TABLE: &[InterruptEntry] = &[
    InterruptEntry {
        topic: Topic::Services,
        keywords: &["service", "treatment", "kya milta", "kis kis"],
        response: "Humare clinic me skin, hair care, pain management aur wellness consultations milte hain ji.",
    },
    InterruptEntry {
        topic: Topic::Hours,
        keywords: &["timing", "time", "kab", "open", "opening", "band"],
        response: "Clinic daily subah 9 baje se shaam 7 baje tak khula rehta hai ji.",
    },
    InterruptEntry {
        topic: Topic::Doctor,
        keywords: &["doctor", "dr", "specialist"],
        response: "Humare senior consultant Dr. Meera Sharma ji personally appointments handle karti hain ji.",
    },
    InterruptEntry {
        topic: Topic::Fees,
        keywords: &["fee", "fees", "cost", "paisa", "charges", "price"],
        response: "Consultation ki fee 600 rupaye hai ji, jo visit ke samay clinic par submit hoti hai ji.",
    },
    InterruptEntry {
        topic: Topic::Location,
        keywords: &["address", "location", "kahan", "map"],
        response: "Clinic ka address WhatsApp/SMS dwara turant bhej diya jayega ji. Landmark: Central Metro ke paas, Sector 12 ji.",
    },
    InterruptEntry {
        topic: Topic::Parking,
        keywords: &["parking"],
        response: "Clinic ke paas hi visitors ke liye parking facility available hai ji.",
    },
];

/// Keyword matcher over [`INTERRUPT_TABLE`].
#[derive(Debug, Clone)]
pub struct InterruptMatcher {
    mode: MatchMode,
    /// One compiled pattern per table row; only populated in token mode.
    token_patterns: Vec<Regex>,
}

impl InterruptMatcher {
    pub fn new(mode: MatchMode) -> Self {
        let token_patterns = match mode {
            MatchMode::Substring => Vec::new(),
            MatchMode::Token => INTERRUPT_TABLE.iter().map(token_pattern).collect(),
        };
        Self {
            mode,
            token_patterns,
        }
    }

    pub fn mode(&self) -> MatchMode {
        self.mode
    }

    /// Find the first table entry hit by a lower-cased utterance.
    pub fn find(&self, lower_input: &str) -> Option<&'static InterruptEntry> {
        let hit = match self.mode {
            MatchMode::Substring => INTERRUPT_TABLE.iter().find(|entry| {
                entry
                    .keywords
                    .iter()
                    .any(|keyword| lower_input.contains(keyword))
            }),
            MatchMode::Token => INTERRUPT_TABLE
                .iter()
                .zip(&self.token_patterns)
                .find(|(_, pattern)| pattern.is_match(lower_input))
                .map(|(entry, _)| entry),
        };

        if let Some(entry) = hit {
            debug!(topic = %entry.topic, mode = ?self.mode, "Interrupt keyword matched");
        }
        hit
    }
}

impl Default for InterruptMatcher {
    fn default() -> Self {
        Self::new(MatchMode::default())
    }
}

/// `\b(?:kw1|kw2|...)\b` over the escaped keywords of one row.
fn token_pattern(entry: &InterruptEntry) -> Regex {
    let alternatives = entry
        .keywords
        .iter()
        .map(|keyword| regex::escape(keyword))
        .collect::<Vec<_>>()
        .join("|");
    // Escaped literals joined by `|` always compile.
    Regex::new(&format!(r"\b(?:{alternatives})\b")).expect("escaped keyword pattern")
}

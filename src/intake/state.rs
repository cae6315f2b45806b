//! Intake stage machine: tracks which piece of information is pending.

use serde::{Deserialize, Serialize};

use crate::error::TransitionError;

/// The stages of the intake conversation.
///
/// Progresses linearly: GreetingResponse → AskName → AskAge → AskIssue →
/// AskSlot → Done. A failed validation keeps the current stage; `Done` only
/// ever transitions to itself.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "kebab-case")]
pub enum Stage {
    /// Waiting for the reply to the opening "aap kaise hain" greeting.
    #[default]
    GreetingResponse,
    AskName,
    AskAge,
    AskIssue,
    AskSlot,
    Done,
}

impl Stage {
    /// Check if a forward transition from `self` to `target` is valid.
    pub fn can_transition_to(&self, target: Stage) -> bool {
        use Stage::*;
        matches!(
            (self, target),
            (GreetingResponse, AskName)
                | (AskName, AskAge)
                | (AskAge, AskIssue)
                | (AskIssue, AskSlot)
                | (AskSlot, Done)
        )
    }

    /// Whether the intake is finished.
    pub fn is_terminal(&self) -> bool {
        matches!(self, Self::Done)
    }

    /// Get the next stage in the linear progression, if any.
    pub fn next(&self) -> Option<Stage> {
        use Stage::*;
        match self {
            GreetingResponse => Some(AskName),
            AskName => Some(AskAge),
            AskAge => Some(AskIssue),
            AskIssue => Some(AskSlot),
            AskSlot => Some(Done),
            Done => None,
        }
    }

    /// Advance `self` one step. Errors at the terminal stage.
    pub fn advance(&mut self) -> Result<Stage, TransitionError> {
        let next = self
            .next()
            .ok_or(TransitionError::Terminal { stage: *self })?;
        if !self.can_transition_to(next) {
            return Err(TransitionError::Invalid {
                from: *self,
                to: next,
            });
        }
        *self = next;
        Ok(next)
    }
}

impl std::fmt::Display for Stage {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let s = match self {
            Self::GreetingResponse => "greeting-response",
            Self::AskName => "ask-name",
            Self::AskAge => "ask-age",
            Self::AskIssue => "ask-issue",
            Self::AskSlot => "ask-slot",
            Self::Done => "done",
        };
        write!(f, "{s}")
    }
}

//! Dialogue controller: drives one intake conversation.
//!
//! The controller owns the stage, the patient record, the transcript, and a
//! queue of agent replies that have been decided but not yet shown. It never
//! sleeps: each queued reply carries the delay to wait before releasing it,
//! and whoever drives the conversation (see [`crate::session`]) does the
//! waiting. State changes happen at submit time, so the stage and record are
//! always current even while replies are still queued.

use std::collections::VecDeque;
use std::time::Duration;

use serde::Serialize;
use tracing::{debug, info, warn};
use uuid::Uuid;

use crate::config::{IntakeConfig, PacingConfig};
use crate::transcript::{TranscriptLog, Turn};

use super::extract::{self, Captured, Extraction};
use super::interrupts::{InterruptEntry, InterruptMatcher, Topic};
use super::model::PatientRecord;
use super::normalize::{normalize_whitespace, to_match_key};
use super::prompts;
use super::state::Stage;

/// An agent utterance waiting to be appended to the transcript.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PendingReply {
    /// Wait before release, counted from the previous release (or from the
    /// user turn for the first reply of a turn).
    pub delay: Duration,
    pub text: String,
}

impl PendingReply {
    pub fn new(delay: Duration, text: impl Into<String>) -> Self {
        Self {
            delay,
            text: text.into(),
        }
    }
}

/// What happened to a submitted line.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Submission {
    /// Blank after normalization. No turn was created and nothing changed.
    Ignored,
    Accepted(TurnReport),
}

impl Submission {
    pub fn report(&self) -> Option<&TurnReport> {
        match self {
            Self::Accepted(report) => Some(report),
            Self::Ignored => None,
        }
    }
}

/// Summary of one accepted user turn.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TurnReport {
    /// Id of the user turn appended to the transcript.
    pub turn_id: Uuid,
    /// Replies from an earlier turn released before this one was appended.
    pub flushed: usize,
    /// FAQ topic answered instead of running the stage extractor.
    pub interrupt: Option<Topic>,
    /// Whether the stage's validation missed and a re-ask was queued.
    pub reasked: bool,
    /// Stage after the turn was processed.
    pub stage: Stage,
    /// Number of replies queued by this turn.
    pub scheduled: usize,
}

/// A single patient intake conversation.
#[derive(Debug, Clone)]
pub struct Conversation {
    stage: Stage,
    record: PatientRecord,
    log: TranscriptLog,
    pending: VecDeque<PendingReply>,
    matcher: InterruptMatcher,
    pacing: PacingConfig,
}

impl Conversation {
    /// Start a conversation. The transcript opens with the clinic greeting.
    pub fn new(config: &IntakeConfig) -> Self {
        let mut log = TranscriptLog::new();
        log.append(Turn::agent(prompts::opening_greeting(&config.clinic_name)));

        Self {
            stage: Stage::default(),
            record: PatientRecord::default(),
            log,
            pending: VecDeque::new(),
            matcher: InterruptMatcher::new(config.match_mode),
            pacing: config.pacing,
        }
    }

    pub fn stage(&self) -> Stage {
        self.stage
    }

    pub fn record(&self) -> &PatientRecord {
        &self.record
    }

    pub fn log(&self) -> &TranscriptLog {
        &self.log
    }

    pub fn summary(&self) -> Option<String> {
        self.record.summary()
    }

    pub fn is_complete(&self) -> bool {
        self.stage.is_terminal()
    }

    pub fn pending(&self) -> impl Iterator<Item = &PendingReply> {
        self.pending.iter()
    }

    pub fn has_pending(&self) -> bool {
        !self.pending.is_empty()
    }

    /// Process one line typed by the patient.
    ///
    /// 1. Blank input is dropped.
    /// 2. Replies still queued from the previous turn are released first, so
    ///    they always precede the new user turn in the transcript.
    /// 3. The user turn is appended.
    /// 4. An FAQ hit is answered (plus a reminder of the pending question) and
    ///    the stage is left untouched.
    /// 5. Otherwise the stage extractor runs and replies are queued.
    pub fn submit(&mut self, raw: &str) -> Submission {
        let text = normalize_whitespace(raw);
        if text.is_empty() {
            debug!("Ignoring blank submission");
            return Submission::Ignored;
        }

        let flushed = self.flush_pending();
        if flushed > 0 {
            debug!(flushed, "Released stale replies before new input");
        }

        let turn_id = self.log.append(Turn::user(text.as_str())).id;

        let lower = to_match_key(&text);
        if let Some(entry) = self.matcher.find(&lower) {
            let replies = self.interrupt_replies(entry);
            let scheduled = self.schedule(replies);
            info!(topic = %entry.topic, stage = %self.stage, "Answered out-of-flow question");
            return Submission::Accepted(TurnReport {
                turn_id,
                flushed,
                interrupt: Some(entry.topic),
                reasked: false,
                stage: self.stage,
                scheduled,
            });
        }

        let (replies, reasked) = self.run_stage(&text);
        let scheduled = self.schedule(replies);

        Submission::Accepted(TurnReport {
            turn_id,
            flushed,
            interrupt: None,
            reasked,
            stage: self.stage,
            scheduled,
        })
    }

    /// Delay before the next queued reply is due.
    pub fn next_delay(&self) -> Option<Duration> {
        self.pending.front().map(|reply| reply.delay)
    }

    /// Append the next queued reply to the transcript.
    pub fn release_next(&mut self) -> Option<&Turn> {
        let reply = self.pending.pop_front()?;
        Some(self.log.append(Turn::agent(reply.text)))
    }

    /// Release every queued reply in order. Returns how many were released.
    pub fn flush_pending(&mut self) -> usize {
        let mut released = 0;
        while self.release_next().is_some() {
            released += 1;
        }
        released
    }

    fn interrupt_replies(&self, entry: &InterruptEntry) -> Vec<PendingReply> {
        let mut replies = vec![PendingReply::new(self.pacing.response_delay, entry.response)];

        if self.stage.is_terminal() {
            replies.push(PendingReply::new(Duration::ZERO, prompts::DONE_INTERRUPT_FILLER));
        } else if let Some(reminder) = prompts::stage_reminder(self.stage, &self.record) {
            replies.push(PendingReply::new(self.pacing.reminder_delay, reminder));
        }

        replies
    }

    /// Run the current stage's extractor. Returns the replies and whether the
    /// stage re-asked.
    fn run_stage(&mut self, text: &str) -> (Vec<PendingReply>, bool) {
        let first = self.pacing.response_delay;

        match extract::extract(self.stage, text) {
            Extraction::Reask(reask) => {
                debug!(stage = %self.stage, reask = ?reask, "Validation missed, asking again");
                (vec![PendingReply::new(first, reask.prompt())], true)
            }
            Extraction::Closed => (vec![PendingReply::new(first, prompts::DONE_ACK)], false),
            Extraction::Advance(captured) => {
                if let Some(value) = captured {
                    self.record_value(value);
                }

                let from = self.stage;
                if let Err(e) = self.stage.advance() {
                    warn!("Failed to advance intake stage: {}", e);
                    return (Vec::new(), false);
                }
                info!(from = %from, to = %self.stage, "Intake stage advanced");

                (self.advance_replies(), false)
            }
        }
    }

    fn record_value(&mut self, value: Captured) {
        match value {
            Captured::Name(name) => self.record.name = name,
            Captured::Age(age) => self.record.age = age.to_string(),
            Captured::Issue(issue) => self.record.issue = issue,
            Captured::Slot(slot) => self.record.slot = slot,
        }
    }

    /// Replies for arriving at the current stage.
    fn advance_replies(&self) -> Vec<PendingReply> {
        let first = self.pacing.response_delay;
        let stagger = self.pacing.stagger_delay;

        match self.stage {
            Stage::AskName => vec![PendingReply::new(first, prompts::ASK_NAME)],
            Stage::AskAge => vec![PendingReply::new(first, prompts::ask_age(&self.record.name))],
            Stage::AskIssue => vec![PendingReply::new(first, prompts::ASK_ISSUE)],
            Stage::AskSlot => vec![PendingReply::new(first, prompts::ASK_SLOT)],
            Stage::Done => vec![
                PendingReply::new(first, prompts::booking_ack(&self.record.slot)),
                PendingReply::new(stagger, prompts::BOOKING_CONFIRMED),
                PendingReply::new(stagger, prompts::BOOKING_CLOSING),
            ],
            // Nothing advances into the initial stage.
            Stage::GreetingResponse => Vec::new(),
        }
    }

    fn schedule(&mut self, replies: Vec<PendingReply>) -> usize {
        let count = replies.len();
        self.pending.extend(replies);
        count
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::intake::MatchMode;
    use crate::transcript::Sender;

    fn conversation() -> Conversation {
        Conversation::new(&IntakeConfig::default().with_pacing(PacingConfig::immediate()))
    }

    /// Submit a line, release its replies, return the agent texts it produced.
    fn say(conv: &mut Conversation, input: &str) -> Vec<String> {
        let before = conv.log().len();
        conv.submit(input);
        conv.flush_pending();
        conv.log()
            .since(before)
            .iter()
            .filter(|t| t.sender == Sender::Agent)
            .map(|t| t.text.clone())
            .collect()
    }

    /// Drive a fresh conversation to `stage` with valid answers.
    fn at_stage(stage: Stage) -> Conversation {
        let mut conv = conversation();
        let answers = ["theek hoon", "Rita Verma", "28", "baal girna", "somwaar subah 10 baje"];
        for answer in answers {
            if conv.stage() == stage {
                break;
            }
            say(&mut conv, answer);
        }
        assert_eq!(conv.stage(), stage);
        conv
    }

    #[test]
    fn starts_with_greeting() {
        let conv = conversation();
        assert_eq!(conv.stage(), Stage::GreetingResponse);
        assert_eq!(conv.log().len(), 1);
        let first = &conv.log().turns()[0];
        assert_eq!(first.sender, Sender::Agent);
        assert!(first.text.starts_with("Namaste ji!"));
        assert!(conv.summary().is_none());
    }

    #[test]
    fn blank_input_is_ignored() {
        let mut conv = conversation();
        assert_eq!(conv.submit("   \t  "), Submission::Ignored);
        assert_eq!(conv.log().len(), 1);
        assert_eq!(conv.stage(), Stage::GreetingResponse);
        assert!(!conv.has_pending());
    }

    #[test]
    fn user_turn_is_normalized() {
        let mut conv = conversation();
        conv.submit("  theek   hoon ");
        assert_eq!(conv.log().turns()[1].text, "theek hoon");
        assert_eq!(conv.log().turns()[1].sender, Sender::User);
    }

    #[test]
    fn happy_path_fills_record() {
        let mut conv = conversation();

        say(&mut conv, "theek hoon");
        assert_eq!(conv.stage(), Stage::AskName);

        let replies = say(&mut conv, "Rita Verma");
        assert_eq!(conv.stage(), Stage::AskAge);
        assert_eq!(conv.record().name, "Rita Verma");
        assert_eq!(replies, vec![prompts::ask_age("Rita Verma")]);

        say(&mut conv, "28");
        assert_eq!(conv.stage(), Stage::AskIssue);
        assert_eq!(conv.record().age, "28");

        say(&mut conv, "baal girna");
        assert_eq!(conv.stage(), Stage::AskSlot);
        assert_eq!(conv.record().issue, "Baal girna");

        let replies = say(&mut conv, "somwaar subah 10 baje");
        assert_eq!(conv.stage(), Stage::Done);
        assert!(conv.is_complete());
        assert_eq!(conv.record().slot, "somwaar subah 10 baje");
        assert_eq!(
            replies,
            vec![
                prompts::booking_ack("somwaar subah 10 baje"),
                prompts::BOOKING_CONFIRMED.to_string(),
                prompts::BOOKING_CLOSING.to_string(),
            ]
        );
        assert!(conv.record().is_complete());
    }

    #[test]
    fn booking_replies_are_staggered() {
        let mut conv = Conversation::new(&IntakeConfig::default());
        for answer in ["theek hoon", "Rita Verma", "28", "baal girna"] {
            conv.submit(answer);
        }
        conv.submit("kal shaam 5 baje");
        // Earlier replies were flushed by each new submit; three remain.
        let delays: Vec<Duration> = conv.pending().map(|r| r.delay).collect();
        assert_eq!(
            delays,
            vec![
                Duration::from_millis(220),
                Duration::from_millis(400),
                Duration::from_millis(400),
            ]
        );
    }

    #[test]
    fn validation_miss_holds_stage_and_record() {
        let cases = [
            (Stage::AskName, "amit"),
            (Stage::AskAge, "main bahut bada hoon"),
            (Stage::AskAge, "150"),
            (Stage::AskIssue, "bal"),
            (Stage::AskSlot, "ha"),
        ];
        for (stage, input) in cases {
            let mut conv = at_stage(stage);
            let record = conv.record().clone();
            let submission = conv.submit(input);
            assert!(submission.report().unwrap().reasked, "{stage}: {input}");
            assert_eq!(submission.report().unwrap().scheduled, 1);
            conv.flush_pending();

            assert_eq!(conv.stage(), stage, "{input} should not advance");
            assert_eq!(conv.record(), &record, "{input} should not touch the record");
            let agent_turns_after_user = conv
                .log()
                .iter()
                .rev()
                .take_while(|t| t.sender == Sender::Agent)
                .count();
            assert_eq!(agent_turns_after_user, 1, "{stage}: exactly one re-prompt");
        }
    }

    #[test]
    fn age_reask_messages_differ_by_cause() {
        let mut conv = at_stage(Stage::AskAge);
        assert_eq!(say(&mut conv, "pata nahi"), vec![prompts::REASK_AGE_MISSING]);
        assert_eq!(say(&mut conv, "150"), vec![prompts::REASK_AGE_RANGE]);
        assert_eq!(say(&mut conv, "main 32 saal ka hoon"), vec![prompts::ASK_ISSUE]);
        assert_eq!(conv.record().age, "32");
    }

    #[test]
    fn interrupt_then_resume_in_ask_age() {
        let mut conv = at_stage(Stage::AskAge);
        let record = conv.record().clone();

        let submission = conv.submit("fees kitni hai?");
        assert_eq!(submission.report().unwrap().interrupt, Some(Topic::Fees));
        conv.flush_pending();
        let replies: Vec<&str> = conv.log().since(conv.log().len() - 2).iter().map(|t| t.text.as_str()).collect();

        assert!(replies[0].starts_with("Consultation ki fee 600 rupaye"));
        assert_eq!(replies[1], "Rita Verma ji, aapki umar kya hai ji?");
        assert_eq!(conv.stage(), Stage::AskAge);
        assert_eq!(conv.record(), &record);

        say(&mut conv, "28");
        assert_eq!(conv.stage(), Stage::AskIssue);
    }

    #[test]
    fn interrupt_never_advances_any_stage() {
        let stages = [
            Stage::GreetingResponse,
            Stage::AskName,
            Stage::AskAge,
            Stage::AskIssue,
            Stage::AskSlot,
            Stage::Done,
        ];
        for stage in stages {
            let mut conv = at_stage(stage);
            let record = conv.record().clone();
            let replies = say(&mut conv, "parking hai kya");
            assert!(replies[0].contains("parking facility"), "{stage}");
            assert_eq!(conv.stage(), stage);
            assert_eq!(conv.record(), &record);
        }
    }

    #[test]
    fn interrupt_in_greeting_stage_has_no_reminder() {
        let mut conv = conversation();
        let replies = say(&mut conv, "clinic kab khulta hai");
        assert_eq!(replies.len(), 1);
        assert!(replies[0].contains("9 baje"));
    }

    #[test]
    fn interrupt_when_done_uses_filler() {
        let mut conv = at_stage(Stage::Done);
        let submission = conv.submit("address bhejo");
        assert_eq!(conv.next_delay(), Some(Duration::ZERO));
        assert!(submission.report().unwrap().interrupt.is_some());
        conv.flush_pending();
        assert_eq!(conv.log().last().unwrap().text, prompts::DONE_INTERRUPT_FILLER);
    }

    #[test]
    fn done_is_idempotent() {
        let mut conv = at_stage(Stage::Done);
        for input in ["shukriya", "theek hai", "ok bye"] {
            assert_eq!(say(&mut conv, input), vec![prompts::DONE_ACK]);
            assert_eq!(conv.stage(), Stage::Done);
        }
    }

    #[test]
    fn stale_replies_are_released_before_new_input() {
        let mut conv = at_stage(Stage::AskSlot);
        conv.submit("somwaar subah 10 baje");
        assert_eq!(conv.pending().count(), 3);

        // Patient types again before the confirmation went out.
        conv.release_next();
        let report = conv.submit("shukriya").report().cloned().unwrap();
        assert_eq!(report.flushed, 2);

        let tail: Vec<(Sender, &str)> = conv
            .log()
            .since(conv.log().len() - 3)
            .iter()
            .map(|t| (t.sender, t.text.as_str()))
            .collect();
        assert_eq!(
            tail,
            vec![
                (Sender::Agent, prompts::BOOKING_CONFIRMED),
                (Sender::Agent, prompts::BOOKING_CLOSING),
                (Sender::User, "shukriya"),
            ]
        );
        assert_eq!(conv.pending().count(), 1);
    }

    #[test]
    fn log_is_append_only() {
        let mut conv = conversation();
        let mut snapshot: Vec<Turn> = conv.log().turns().to_vec();
        let inputs = [
            "theek hoon", "timing?", "amit", "Amit Kumar", "", "fee", "999", "40", "x",
            "sar dard", "ha", "budhvaar 4 baje", "thanks", "parking",
        ];
        for input in inputs {
            conv.submit(input);
            if input.len() % 2 == 0 {
                conv.release_next();
            }
            let turns = conv.log().turns();
            assert!(turns.len() >= snapshot.len());
            assert_eq!(&turns[..snapshot.len()], snapshot.as_slice());
            snapshot = turns.to_vec();
        }
        conv.flush_pending();
        assert_eq!(conv.stage(), Stage::Done);
    }

    #[test]
    fn token_mode_routes_address_to_location() {
        let config = IntakeConfig::default()
            .with_pacing(PacingConfig::immediate())
            .with_match_mode(MatchMode::Token);
        let mut conv = Conversation::new(&config);
        let report = conv.submit("address kya hai").report().cloned().unwrap();
        assert_eq!(report.interrupt, Some(Topic::Location));
    }
}

//! Intake session: runs one conversation against a live input stream.
//!
//! The session waits out each queued reply's delay with a tokio timer and
//! publishes every transcript turn (and summary change) on a broadcast
//! channel for renderers. Input that arrives while a reply is still waiting
//! is handed to the controller immediately; the controller releases the
//! stale replies ahead of the new user turn, so the transcript order never
//! depends on timer races.

use std::sync::Arc;

use futures::StreamExt;
use serde::{Deserialize, Serialize};
use tokio::sync::broadcast;
use tokio::time::Instant;
use tracing::{debug, info, warn};

use crate::channels::{Channel, IncomingMessage, MessageStream};
use crate::config::IntakeConfig;
use crate::intake::{Conversation, PatientRecord, Stage, Submission};
use crate::transcript::Turn;

/// Default broadcast channel capacity.
const DEFAULT_BROADCAST_CAPACITY: usize = 256;

/// Lines that end the session instead of reaching the receptionist.
const QUIT_COMMANDS: &[&str] = &["/quit", "/exit"];

/// Events published to renderers.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum SessionEvent {
    /// A turn was appended to the transcript.
    Turn { turn: Turn },
    /// The appointment notes changed.
    Summary { summary: String },
}

/// Point-in-time view of a session.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SessionSnapshot {
    pub stage: Stage,
    pub record: PatientRecord,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub summary: Option<String>,
    pub turns: Vec<Turn>,
}

/// Drives a [`Conversation`] from an input stream in real time.
pub struct IntakeSession {
    conversation: Conversation,
    tx: broadcast::Sender<SessionEvent>,
    /// Number of transcript turns already published.
    published: usize,
    last_summary: Option<String>,
    /// When the head of the reply queue is due.
    due: Option<Instant>,
}

impl IntakeSession {
    pub fn new(config: &IntakeConfig) -> Self {
        let (tx, _rx) = broadcast::channel(DEFAULT_BROADCAST_CAPACITY);
        Self {
            conversation: Conversation::new(config),
            tx,
            published: 0,
            last_summary: None,
            due: None,
        }
    }

    /// Subscribe to transcript events. Subscribe before [`run`](Self::run)
    /// to receive the opening greeting.
    pub fn subscribe(&self) -> broadcast::Receiver<SessionEvent> {
        self.tx.subscribe()
    }

    pub fn conversation(&self) -> &Conversation {
        &self.conversation
    }

    pub fn snapshot(&self) -> SessionSnapshot {
        SessionSnapshot {
            stage: self.conversation.stage(),
            record: self.conversation.record().clone(),
            summary: self.conversation.summary(),
            turns: self.conversation.log().turns().to_vec(),
        }
    }

    /// Run until the input ends, a quit command arrives or Ctrl+C is
    /// pressed. Replies still queued at that point are released before the
    /// snapshot is taken.
    pub async fn run(&mut self, input: MessageStream) -> SessionSnapshot {
        self.run_until(input, async {
            if let Err(e) = tokio::signal::ctrl_c().await {
                warn!("Failed to listen for Ctrl+C: {}", e);
                std::future::pending::<()>().await;
            }
        })
        .await
    }

    /// Like [`run`](Self::run), but stops when `shutdown` completes instead
    /// of on Ctrl+C.
    pub async fn run_until<F>(&mut self, mut input: MessageStream, shutdown: F) -> SessionSnapshot
    where
        F: Future<Output = ()>,
    {
        tokio::pin!(shutdown);
        self.publish();
        let mut input_open = true;

        info!(stage = %self.conversation.stage(), "Intake session started");

        loop {
            if !input_open && !self.conversation.has_pending() {
                break;
            }

            let due = self.due;
            tokio::select! {
                biased;
                _ = &mut shutdown => {
                    info!("Shutdown requested, finishing session...");
                    break;
                }
                msg = input.next(), if input_open => {
                    match msg {
                        Some(msg) if is_quit_command(&msg.content) => {
                            info!("Quit command received, finishing session...");
                            input_open = false;
                        }
                        Some(msg) => self.handle_message(&msg),
                        None => {
                            debug!("Input stream ended");
                            input_open = false;
                        }
                    }
                }
                _ = wait_until(due) => {
                    self.conversation.release_next();
                    self.reset_due();
                    self.publish();
                }
            }
        }

        let flushed = self.conversation.flush_pending();
        if flushed > 0 {
            debug!(flushed, "Released queued replies at shutdown");
        }
        self.due = None;
        self.publish();

        let snapshot = self.snapshot();
        info!(
            stage = %snapshot.stage,
            turns = snapshot.turns.len(),
            complete = self.conversation.is_complete(),
            "Intake session finished"
        );
        snapshot
    }

    fn handle_message(&mut self, msg: &IncomingMessage) {
        match self.conversation.submit(&msg.content) {
            Submission::Ignored => {}
            Submission::Accepted(report) => {
                debug!(
                    message_id = %msg.id,
                    channel = %msg.channel,
                    user_id = %msg.user_id,
                    stage = %report.stage,
                    interrupt = ?report.interrupt,
                    scheduled = report.scheduled,
                    "User turn processed"
                );
                self.reset_due();
                self.publish();
            }
        }
    }

    /// Re-arm the timer for the current head of the reply queue.
    fn reset_due(&mut self) {
        self.due = self
            .conversation
            .next_delay()
            .map(|delay| Instant::now() + delay);
    }

    /// Broadcast turns appended since the last call, then the summary if it
    /// changed. No receivers is fine.
    fn publish(&mut self) {
        for turn in self.conversation.log().since(self.published) {
            let _ = self.tx.send(SessionEvent::Turn { turn: turn.clone() });
        }
        self.published = self.conversation.log().len();

        let summary = self.conversation.summary();
        if summary != self.last_summary {
            if let Some(ref summary) = summary {
                let _ = self.tx.send(SessionEvent::Summary {
                    summary: summary.clone(),
                });
            }
            self.last_summary = summary;
        }
    }
}

fn is_quit_command(content: &str) -> bool {
    let trimmed = content.trim();
    QUIT_COMMANDS.iter().any(|cmd| trimmed.eq_ignore_ascii_case(cmd))
}

async fn wait_until(due: Option<Instant>) {
    match due {
        Some(at) => tokio::time::sleep_until(at).await,
        None => std::future::pending().await,
    }
}

/// Forward session events to a channel until the session is dropped.
pub fn spawn_renderer(
    channel: Arc<dyn Channel>,
    mut rx: broadcast::Receiver<SessionEvent>,
) -> tokio::task::JoinHandle<()> {
    tokio::spawn(async move {
        loop {
            match rx.recv().await {
                Ok(SessionEvent::Turn { turn }) => {
                    if let Err(e) = channel.render(&turn).await {
                        warn!(channel = channel.name(), "Failed to render turn: {}", e);
                    }
                }
                Ok(SessionEvent::Summary { summary }) => {
                    if let Err(e) = channel.show_summary(&summary).await {
                        warn!(channel = channel.name(), "Failed to show summary: {}", e);
                    }
                }
                Err(broadcast::error::RecvError::Lagged(n)) => {
                    warn!(missed = n, "Renderer lagged behind session");
                }
                Err(broadcast::error::RecvError::Closed) => {
                    debug!("Session closed, renderer stopping");
                    break;
                }
            }
        }
    })
}

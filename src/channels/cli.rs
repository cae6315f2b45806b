//! CLI channel: stdin/stdout chat with the receptionist.

use std::io::BufRead;

use async_trait::async_trait;
use futures::stream;
use tokio::io::AsyncWriteExt;
use tokio::sync::mpsc;

use crate::channels::{Channel, IncomingMessage, MessageStream};
use crate::error::ChannelError;
use crate::transcript::{Sender, Turn};

/// Reads patient lines from stdin, prints agent turns to stdout.
///
/// User turns are not echoed; the terminal already shows what was typed.
pub struct CliChannel;

impl CliChannel {
    pub fn new() -> Self {
        Self
    }
}

impl Default for CliChannel {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl Channel for CliChannel {
    fn name(&self) -> &str {
        "cli"
    }

    async fn start(&self) -> Result<MessageStream, ChannelError> {
        let (tx, rx) = mpsc::unbounded_channel();

        // Plain OS thread: a read still pending at exit must not hold the
        // tokio runtime open.
        std::thread::Builder::new()
            .name("cli-stdin".to_string())
            .spawn(move || read_lines(std::io::stdin().lock(), &tx))?;

        let stream = stream::unfold(rx, |mut rx| async move {
            rx.recv().await.map(|msg| (msg, rx))
        });

        Ok(Box::pin(stream))
    }

    async fn render(&self, turn: &Turn) -> Result<(), ChannelError> {
        if turn.sender == Sender::User {
            return Ok(());
        }
        let mut stdout = tokio::io::stdout();
        stdout
            .write_all(format!("\nReceptionist: {}\n", turn.text).as_bytes())
            .await?;
        stdout.flush().await?;
        eprint!("> ");
        Ok(())
    }

    async fn show_summary(&self, summary: &str) -> Result<(), ChannelError> {
        eprintln!("\n📋 Appointment Notes: {}", summary);
        eprint!("> ");
        Ok(())
    }
}

/// Forward each line of `reader` as a message until EOF, a read error, or
/// the receiving side going away.
fn read_lines<R: BufRead>(reader: R, tx: &mpsc::UnboundedSender<IncomingMessage>) {
    for line in reader.lines() {
        match line {
            Ok(line) => {
                // Blank lines still go through; the controller drops them.
                let msg = IncomingMessage::new("cli", "local-patient", &line);
                if tx.send(msg).is_err() {
                    break;
                }
            }
            Err(e) => {
                tracing::error!("Error reading stdin: {}", e);
                break;
            }
        }
    }
    tracing::debug!("Stdin reader finished");
}

use std::sync::Arc;

use clinic_intake::channels::{Channel, CliChannel};
use clinic_intake::config::IntakeConfig;
use clinic_intake::error::Result;
use clinic_intake::session::{self, IntakeSession};

#[tokio::main]
async fn main() -> Result<()> {
    // Logs go to stderr; stdout carries the conversation.
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();

    let config = IntakeConfig::from_env()?;

    eprintln!("🏥 Clinic Intake v{}", env!("CARGO_PKG_VERSION"));
    eprintln!("   Clinic: {}", config.clinic_name);
    eprintln!("   Keyword match: {:?}", config.match_mode);
    eprintln!(
        "   Pacing: {}ms / {}ms / {}ms",
        config.pacing.response_delay.as_millis(),
        config.pacing.reminder_delay.as_millis(),
        config.pacing.stagger_delay.as_millis(),
    );
    eprintln!("   Type a message and press Enter. /quit to exit.\n");

    let channel: Arc<dyn Channel> = Arc::new(CliChannel::new());
    let input = channel.start().await?;

    let mut session = IntakeSession::new(&config);
    let renderer = session::spawn_renderer(Arc::clone(&channel), session.subscribe());

    // Ctrl+C is handled inside the session so queued replies still go out.
    let snapshot = session.run(input).await;

    // Dropping the session closes the broadcast channel and stops the renderer.
    drop(session);
    if let Err(e) = renderer.await {
        tracing::warn!("Renderer task failed: {}", e);
    }
    channel.shutdown().await?;

    match serde_json::to_string(&snapshot) {
        Ok(json) => tracing::debug!(snapshot = %json, "Final session snapshot"),
        Err(e) => tracing::warn!("Failed to serialize session snapshot: {}", e),
    }
    match snapshot.summary {
        Some(summary) => eprintln!("\nFinal notes ({}): {}", snapshot.stage, summary),
        None => eprintln!("\nNo details recorded."),
    }

    Ok(())
}

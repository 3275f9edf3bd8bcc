//! Adaptive poll scheduling
//!
//! Each connection runs exactly one instance of [`run`] as its session
//! task. The task is the session's only owner, so command handling and
//! poll cycles never interleave mid-diff: they alternate at await points.
//!
//! State machine: Idle (no token yet) -> Polling (self-rescheduling at the
//! session's current interval) -> Stopped (command channel closed). The
//! poll deadline survives interleaved commands; only a completed cycle
//! reschedules it.

use std::time::Duration;

use tokio::sync::mpsc;
use tokio::time::{sleep_until, Instant};

use super::messages::ClientMessage;
use super::session::Session;

/// Drive a session until its connection closes
pub async fn run(mut session: Session, mut commands: mpsc::UnboundedReceiver<ClientMessage>) {
    // Idle: only command handling until the session is initiated
    while !session.is_polling() {
        match commands.recv().await {
            Some(command) => session.handle_command(command).await,
            None => {
                tracing::debug!(session_id = %session.id(), "Connection closed before initiation");
                return;
            }
        }
    }

    // The first fetch runs immediately after initiation
    let mut next_poll = Instant::now();

    loop {
        tokio::select! {
            command = commands.recv() => match command {
                Some(command) => session.handle_command(command).await,
                None => break,
            },
            _ = sleep_until(next_poll) => {
                session.poll_cycle().await;
                next_poll = Instant::now() + Duration::from_millis(session.poll_interval_ms());
            }
        }
    }

    tracing::debug!(session_id = %session.id(), "Session task stopped");
}

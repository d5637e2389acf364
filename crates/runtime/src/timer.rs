//! Turn watchdog.
//!
//! Arms a deadline at every TURN_BEGAN and force-ends the turn when it
//! expires, so one absent player cannot stall a session. The deadline is
//! disarmed while no turn is in progress and when the game ends.

use std::time::Duration;

use tokio::sync::broadcast::error::RecvError;
use tokio::task::JoinHandle;
use tokio::time::{sleep_until, Instant};
use tracing::info;

use tabula_core::EngineEvent;

use crate::events::Topic;
use crate::RuntimeHandle;

pub struct TurnTimer {
    task: JoinHandle<()>,
}

impl TurnTimer {
    /// Spawns the watchdog against a running session.
    pub fn spawn(handle: RuntimeHandle, timeout: Duration) -> Self {
        let mut turns = handle.subscribe(Topic::Turn);
        let task = tokio::spawn(async move {
            let mut deadline: Option<Instant> = None;
            loop {
                tokio::select! {
                    event = turns.recv() => match event {
                        Ok(EngineEvent::TurnBegan { .. }) => {
                            deadline = Some(Instant::now() + timeout);
                        }
                        Ok(EngineEvent::TurnEnded { .. }) => {
                            deadline = None;
                        }
                        Ok(EngineEvent::GameEnded { .. }) => break,
                        Ok(_) => {}
                        Err(RecvError::Lagged(_)) => continue,
                        Err(RecvError::Closed) => break,
                    },
                    _ = sleep_until(deadline.unwrap_or_else(Instant::now)), if deadline.is_some() => {
                        info!("turn deadline expired; forcing end of turn");
                        deadline = None;
                        if handle.force_end_turn().await.is_err() {
                            break;
                        }
                    }
                }
            }
        });
        Self { task }
    }

    pub fn stop(&self) {
        self.task.abort();
    }
}

impl Drop for TurnTimer {
    fn drop(&mut self) {
        self.task.abort();
    }
}

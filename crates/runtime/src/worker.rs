//! Simulation worker that owns the authoritative [`GameEngine`].
//!
//! Receives commands from [`crate::RuntimeHandle`], applies them to the
//! engine, and publishes every notification the engine produced to the
//! event bus. The engine itself is synchronous; this task is the only
//! place it is ever touched.

use tokio::sync::{mpsc, oneshot};
use tracing::debug;

use tabula_core::{
    EngineError, GameEngine, GameState, Pending, PlayerId, RequestToken, SpaceId, VictoryResult,
};

/// Commands the worker accepts.
pub enum Command {
    AddPlayer {
        peer_id: String,
        nickname: String,
        reply: oneshot::Sender<Result<PlayerId, EngineError>>,
    },
    RemovePlayer {
        player: PlayerId,
        reply: oneshot::Sender<Result<(), EngineError>>,
    },
    StartGame {
        reply: oneshot::Sender<Result<(), EngineError>>,
    },
    SubmitRoll {
        token: RequestToken,
        value: u32,
        reply: oneshot::Sender<bool>,
    },
    ChooseDestination {
        token: RequestToken,
        target: SpaceId,
        reply: oneshot::Sender<bool>,
    },
    DismissPrompt {
        token: RequestToken,
        player: PlayerId,
        reply: oneshot::Sender<bool>,
    },
    ForceEndTurn {
        reply: oneshot::Sender<()>,
    },
    QueryState {
        reply: oneshot::Sender<GameState>,
    },
    QueryPending {
        reply: oneshot::Sender<Option<Pending>>,
    },
    QueryResult {
        reply: oneshot::Sender<Option<VictoryResult>>,
    },
}

/// Background task that processes session commands.
pub struct SimulationWorker {
    engine: GameEngine,
    command_rx: mpsc::Receiver<Command>,
    event_bus: crate::EventBus,
}

impl SimulationWorker {
    pub fn new(
        engine: GameEngine,
        command_rx: mpsc::Receiver<Command>,
        event_bus: crate::EventBus,
    ) -> Self {
        Self {
            engine,
            command_rx,
            event_bus,
        }
    }

    /// Main worker loop. Exits when every handle is dropped.
    pub async fn run(mut self) {
        while let Some(cmd) = self.command_rx.recv().await {
            self.handle_command(cmd);
            self.publish_pending_events();
        }
        debug!("all runtime handles dropped; simulation worker exiting");
    }

    fn handle_command(&mut self, cmd: Command) {
        match cmd {
            Command::AddPlayer {
                peer_id,
                nickname,
                reply,
            } => {
                let result = self.engine.add_player(peer_id, &nickname);
                let _ = reply.send(result);
            }
            Command::RemovePlayer { player, reply } => {
                let _ = reply.send(self.engine.remove_player(player));
            }
            Command::StartGame { reply } => {
                let _ = reply.send(self.engine.start_game());
            }
            Command::SubmitRoll {
                token,
                value,
                reply,
            } => {
                let _ = reply.send(self.engine.submit_roll(token, value));
            }
            Command::ChooseDestination {
                token,
                target,
                reply,
            } => {
                let _ = reply.send(self.engine.choose_destination(token, target));
            }
            Command::DismissPrompt {
                token,
                player,
                reply,
            } => {
                let _ = reply.send(self.engine.dismiss_prompt(token, player));
            }
            Command::ForceEndTurn { reply } => {
                self.engine.force_end_turn();
                let _ = reply.send(());
            }
            Command::QueryState { reply } => {
                let _ = reply.send(self.engine.state().clone());
            }
            Command::QueryPending { reply } => {
                let _ = reply.send(self.engine.pending().cloned());
            }
            Command::QueryResult { reply } => {
                let _ = reply.send(self.engine.result().cloned());
            }
        }
    }

    fn publish_pending_events(&mut self) {
        for event in self.engine.drain_events() {
            self.event_bus.publish(event);
        }
    }
}

//! Client-facing handle to a running session.

use tokio::sync::{broadcast, mpsc, oneshot};

use tabula_core::{EngineEvent, GameState, Pending, PlayerId, RequestToken, SpaceId, VictoryResult};

use crate::error::{Result, RuntimeError};
use crate::events::{EventBus, Topic};
use crate::worker::Command;

/// Cloneable facade over the simulation worker.
#[derive(Clone)]
pub struct RuntimeHandle {
    command_tx: mpsc::Sender<Command>,
    event_bus: EventBus,
}

impl RuntimeHandle {
    pub(crate) fn new(command_tx: mpsc::Sender<Command>, event_bus: EventBus) -> Self {
        Self {
            command_tx,
            event_bus,
        }
    }

    async fn request<T>(
        &self,
        make: impl FnOnce(oneshot::Sender<T>) -> Command,
    ) -> Result<T> {
        let (reply_tx, reply_rx) = oneshot::channel();
        self.command_tx
            .send(make(reply_tx))
            .await
            .map_err(|_| RuntimeError::WorkerGone)?;
        reply_rx.await.map_err(|_| RuntimeError::WorkerGone)
    }

    pub async fn add_player(&self, peer_id: &str, nickname: &str) -> Result<PlayerId> {
        let peer_id = peer_id.to_owned();
        let nickname = nickname.to_owned();
        self.request(|reply| Command::AddPlayer {
            peer_id,
            nickname,
            reply,
        })
        .await?
        .map_err(RuntimeError::Engine)
    }

    pub async fn remove_player(&self, player: PlayerId) -> Result<()> {
        self.request(|reply| Command::RemovePlayer { player, reply })
            .await?
            .map_err(RuntimeError::Engine)
    }

    pub async fn start_game(&self) -> Result<()> {
        self.request(|reply| Command::StartGame { reply })
            .await?
            .map_err(RuntimeError::Engine)
    }

    /// Returns whether the roll was accepted (stale tokens are not).
    pub async fn submit_roll(&self, token: RequestToken, value: u32) -> Result<bool> {
        self.request(|reply| Command::SubmitRoll {
            token,
            value,
            reply,
        })
        .await
    }

    pub async fn choose_destination(&self, token: RequestToken, target: SpaceId) -> Result<bool> {
        self.request(|reply| Command::ChooseDestination {
            token,
            target,
            reply,
        })
        .await
    }

    pub async fn dismiss_prompt(&self, token: RequestToken, player: PlayerId) -> Result<bool> {
        self.request(|reply| Command::DismissPrompt {
            token,
            player,
            reply,
        })
        .await
    }

    pub async fn force_end_turn(&self) -> Result<()> {
        self.request(|reply| Command::ForceEndTurn { reply }).await
    }

    /// Snapshot of the authoritative state.
    pub async fn state(&self) -> Result<GameState> {
        self.request(|reply| Command::QueryState { reply }).await
    }

    pub async fn pending(&self) -> Result<Option<Pending>> {
        self.request(|reply| Command::QueryPending { reply }).await
    }

    pub async fn result(&self) -> Result<Option<VictoryResult>> {
        self.request(|reply| Command::QueryResult { reply }).await
    }

    /// Subscribes to one topic of engine notifications.
    pub fn subscribe(&self, topic: Topic) -> broadcast::Receiver<EngineEvent> {
        self.event_bus.subscribe(topic)
    }
}

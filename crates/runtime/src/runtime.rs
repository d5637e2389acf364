//! High-level session orchestrator.
//!
//! The runtime owns the simulation worker, wires up the command channel
//! and event bus, and exposes a builder-based API. `play` drives a
//! session to completion by answering every parked request through the
//! configured providers; interactive frontends skip `play` and feed the
//! handle directly.

use std::sync::Arc;
use std::time::Duration;

use tokio::sync::{broadcast, mpsc};
use tokio::task::JoinHandle;
use tokio::time;
use tracing::debug;

use tabula_core::{
    BehaviorRegistry, Board, EngineConfig, EngineEvent, GameEngine, MovementPolicy, VictoryResult,
};

use crate::error::{Result, RuntimeError};
use crate::events::{EventBus, Topic};
use crate::providers::{AutoRoll, ChoiceProvider, FirstChoice, PromptProvider, RollProvider, Silent};
use crate::worker::SimulationWorker;
use crate::RuntimeHandle;

/// Runtime configuration shared across the orchestrator and worker.
#[derive(Debug, Clone)]
pub struct RuntimeConfig {
    pub engine_config: EngineConfig,
    pub event_buffer_size: usize,
    pub command_buffer_size: usize,
}

impl Default for RuntimeConfig {
    fn default() -> Self {
        Self {
            engine_config: EngineConfig::default(),
            event_buffer_size: 128,
            command_buffer_size: 32,
        }
    }
}

/// One running session. [`RuntimeHandle`] is the cloneable facade for
/// clients; the runtime itself owns the worker task and the providers.
pub struct Runtime {
    handle: RuntimeHandle,
    worker: JoinHandle<()>,
    roll_provider: Option<Arc<dyn RollProvider>>,
    choice_provider: Option<Arc<dyn ChoiceProvider>>,
    prompt_provider: Option<Arc<dyn PromptProvider>>,
}

impl Runtime {
    pub fn builder() -> RuntimeBuilder {
        RuntimeBuilder::new()
    }

    pub fn handle(&self) -> RuntimeHandle {
        self.handle.clone()
    }

    pub fn subscribe(&self, topic: Topic) -> broadcast::Receiver<EngineEvent> {
        self.handle.subscribe(topic)
    }

    /// Starts the game and answers parked requests through the providers
    /// until it ends. Returns the victory result.
    pub async fn play(&self) -> Result<Option<VictoryResult>> {
        let roll = self
            .roll_provider
            .as_ref()
            .ok_or(RuntimeError::ProviderNotSet("roll"))?;
        let choice = self
            .choice_provider
            .as_ref()
            .ok_or(RuntimeError::ProviderNotSet("choice"))?;
        let prompt = self
            .prompt_provider
            .as_ref()
            .ok_or(RuntimeError::ProviderNotSet("prompt"))?;

        // Subscribe before starting so the first request is not missed.
        let mut requests = self.handle.subscribe(Topic::Request);
        let mut turns = self.handle.subscribe(Topic::Turn);
        self.handle.start_game().await?;

        loop {
            tokio::select! {
                event = requests.recv() => match event {
                    Ok(EngineEvent::RollRequested { token, player, min, max }) => {
                        let value = roll.roll(player, min, max).await;
                        self.handle.submit_roll(token, value).await?;
                    }
                    Ok(EngineEvent::ChoiceRequested { token, player, options }) => {
                        let target = choice.choose(player, &options).await;
                        self.handle.choose_destination(token, target).await?;
                    }
                    Ok(EngineEvent::PromptIssued { token, message, all_players, timeout_ms }) => {
                        let state = self.handle.state().await?;
                        let targets: Vec<_> = if all_players {
                            state.standing_players().map(|p| p.id).collect()
                        } else {
                            vec![state.turn.current_player]
                        };
                        for player in targets {
                            // A prompt dismisses on acknowledgement or when its
                            // deadline lapses, whichever comes first.
                            let ack = prompt.acknowledge(player, &message);
                            match timeout_ms {
                                Some(ms) => {
                                    let deadline = Duration::from_millis(ms);
                                    if time::timeout(deadline, ack).await.is_err() {
                                        debug!(%player, "prompt timed out; auto-dismissing");
                                    }
                                }
                                None => ack.await,
                            }
                            self.handle.dismiss_prompt(token, player).await?;
                        }
                    }
                    Ok(_) => {}
                    Err(broadcast::error::RecvError::Lagged(_)) => continue,
                    Err(broadcast::error::RecvError::Closed) => break,
                },
                event = turns.recv() => match event {
                    Ok(EngineEvent::GameEnded { result }) => return Ok(Some(result)),
                    Ok(_) => {}
                    Err(broadcast::error::RecvError::Lagged(_)) => continue,
                    Err(broadcast::error::RecvError::Closed) => break,
                },
            }
        }
        self.handle.result().await
    }

    /// Stops the worker. Outstanding handles error with `WorkerGone`.
    pub fn shutdown(&self) {
        self.worker.abort();
    }
}

pub struct RuntimeBuilder {
    board: Option<Board>,
    config: RuntimeConfig,
    seed: u64,
    registry: Option<BehaviorRegistry>,
    policy: Option<Box<dyn MovementPolicy>>,
    roll_provider: Option<Arc<dyn RollProvider>>,
    choice_provider: Option<Arc<dyn ChoiceProvider>>,
    prompt_provider: Option<Arc<dyn PromptProvider>>,
}

impl RuntimeBuilder {
    pub fn new() -> Self {
        Self {
            board: None,
            config: RuntimeConfig::default(),
            seed: 0,
            registry: None,
            policy: None,
            roll_provider: None,
            choice_provider: None,
            prompt_provider: None,
        }
    }

    pub fn board(mut self, board: Board) -> Self {
        self.board = Some(board);
        self
    }

    pub fn config(mut self, config: RuntimeConfig) -> Self {
        self.config = config;
        self
    }

    pub fn seed(mut self, seed: u64) -> Self {
        self.seed = seed;
        self
    }

    pub fn registry(mut self, registry: BehaviorRegistry) -> Self {
        self.registry = Some(registry);
        self
    }

    pub fn policy(mut self, policy: Box<dyn MovementPolicy>) -> Self {
        self.policy = Some(policy);
        self
    }

    pub fn roll_provider(mut self, provider: Arc<dyn RollProvider>) -> Self {
        self.roll_provider = Some(provider);
        self
    }

    pub fn choice_provider(mut self, provider: Arc<dyn ChoiceProvider>) -> Self {
        self.choice_provider = Some(provider);
        self
    }

    pub fn prompt_provider(mut self, provider: Arc<dyn PromptProvider>) -> Self {
        self.prompt_provider = Some(provider);
        self
    }

    /// Installs the headless provider set (random rolls, first choice,
    /// silent prompt acknowledgement).
    pub fn headless(self) -> Self {
        self.roll_provider(Arc::new(AutoRoll))
            .choice_provider(Arc::new(FirstChoice))
            .prompt_provider(Arc::new(Silent))
    }

    /// Spawns the simulation worker and returns the runtime.
    pub fn spawn(self) -> Result<Runtime> {
        let board = self.board.ok_or(RuntimeError::BuilderIncomplete("board"))?;

        let mut engine = GameEngine::new(board, self.config.engine_config.clone(), self.seed);
        if let Some(registry) = self.registry {
            engine = engine.with_registry(registry);
        }
        if let Some(policy) = self.policy {
            engine = engine.with_policy(policy);
        }

        let event_bus = EventBus::with_capacity(self.config.event_buffer_size);
        let (command_tx, command_rx) = mpsc::channel(self.config.command_buffer_size);
        let worker = SimulationWorker::new(engine, command_rx, event_bus.clone());
        let worker = tokio::spawn(worker.run());

        Ok(Runtime {
            handle: RuntimeHandle::new(command_tx, event_bus),
            worker,
            roll_provider: self.roll_provider,
            choice_provider: self.choice_provider,
            prompt_provider: self.prompt_provider,
        })
    }
}

impl Default for RuntimeBuilder {
    fn default() -> Self {
        Self::new()
    }
}

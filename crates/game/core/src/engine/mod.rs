//! The turn engine.
//!
//! All mutation flows through a directive queue: phase handlers push
//! directives, `pump` drains them until the queue empties, the game ends,
//! or a handler suspends on runtime input. Suspension is cooperative: the
//! engine parks a [`Pending`] request carrying a monotonic token, and the
//! matching `submit_*`/`choose_*`/`dismiss_*` call resumes the loop.
//! Resumption with a stale token is ignored.

mod handlers;

use std::collections::VecDeque;

use tracing::{info, warn};

use crate::board::Board;
use crate::config::EngineConfig;
use crate::env::BehaviorRegistry;
use crate::event::EventRef;
use crate::movement::{DiceRoll, MovementPolicy};
use crate::notify::EngineEvent;
use crate::phase::{GamePhase, PhaseMachine, TurnPhase};
use crate::rules::{PlayerCountValidity, VictoryResult};
use crate::state::{GameState, Player, PlayerId, PlayerState, RequestToken, SpaceId, TurnState};

#[derive(Clone, Debug, thiserror::Error, PartialEq, Eq)]
pub enum EngineError {
    #[error("operation requires the lobby, game phase is {0}")]
    NotInLobby(GamePhase),
    #[error("game is not running, phase is {0}")]
    NotRunning(GamePhase),
    #[error("player {0} is not seated")]
    UnknownPlayer(PlayerId),
    #[error("player count rejected: {0}")]
    PlayerCount(String),
}

impl crate::error::GameError for EngineError {
    fn severity(&self) -> crate::error::ErrorSeverity {
        crate::error::ErrorSeverity::Validation
    }
}

/// What the engine is waiting on.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum PendingKind {
    Roll {
        player: PlayerId,
        min: u32,
        max: u32,
    },
    Choice {
        player: PlayerId,
        options: Vec<SpaceId>,
    },
    Prompt {
        all_players: bool,
        acks: Vec<PlayerId>,
    },
}

/// A parked request for runtime input.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Pending {
    pub token: RequestToken,
    pub kind: PendingKind,
}

/// Work item on the engine's internal queue.
#[derive(Clone, Debug, PartialEq, Eq)]
enum Directive {
    Enter(TurnPhase),
    StepMove,
}

pub struct GameEngine {
    state: GameState,
    board: Board,
    registry: BehaviorRegistry,
    config: EngineConfig,
    policy: Box<dyn MovementPolicy>,
    phases: PhaseMachine<GameEngine>,
    queue: VecDeque<Directive>,
    outbox: Vec<EngineEvent>,
    pending: Option<Pending>,
    /// Event whose action is suspended on the pending prompt.
    in_flight: Option<EventRef>,
    next_token: u64,
    next_player_id: u32,
    result: Option<VictoryResult>,
}

impl GameEngine {
    pub fn new(board: Board, config: EngineConfig, seed: u64) -> Self {
        let mut phases = PhaseMachine::new();
        phases.register_turn_handler(TurnPhase::BeginTurn, Self::on_begin_turn);
        phases.register_turn_handler(TurnPhase::WaitingForMove, Self::on_waiting_for_move);
        phases.register_turn_handler(TurnPhase::ProcessingEvents, Self::on_processing_events);
        phases.register_turn_handler(TurnPhase::EndTurn, Self::on_end_turn);

        Self {
            state: GameState::new(seed),
            board,
            registry: BehaviorRegistry::new(),
            config,
            policy: Box::new(DiceRoll),
            phases,
            queue: VecDeque::new(),
            outbox: Vec::new(),
            pending: None,
            in_flight: None,
            next_token: 0,
            next_player_id: 0,
            result: None,
        }
    }

    pub fn with_registry(mut self, registry: BehaviorRegistry) -> Self {
        self.registry = registry;
        self
    }

    pub fn with_policy(mut self, policy: Box<dyn MovementPolicy>) -> Self {
        self.policy = policy;
        self
    }

    pub fn state(&self) -> &GameState {
        &self.state
    }

    pub fn board(&self) -> &Board {
        &self.board
    }

    pub fn registry(&self) -> &BehaviorRegistry {
        &self.registry
    }

    pub fn pending(&self) -> Option<&Pending> {
        self.pending.as_ref()
    }

    pub fn result(&self) -> Option<&VictoryResult> {
        self.result.as_ref()
    }

    /// Notifications accumulated since the last drain.
    pub fn drain_events(&mut self) -> Vec<EngineEvent> {
        std::mem::take(&mut self.outbox)
    }

    /// Seats a new player. Lobby only.
    pub fn add_player(
        &mut self,
        peer_id: impl Into<String>,
        nickname: &str,
    ) -> Result<PlayerId, EngineError> {
        if self.state.phase.game != GamePhase::Lobby {
            return Err(EngineError::NotInLobby(self.state.phase.game));
        }
        let seated = self.state.players.len() as u32;
        if let Some(max) = self.board.rules().max_players {
            if seated >= max {
                return Err(EngineError::PlayerCount(format!(
                    "table is full ({max} seats)"
                )));
            }
        }
        let id = PlayerId(self.next_player_id);
        self.next_player_id += 1;
        self.state
            .add_player(Player::new(id, peer_id, nickname))
            .map_err(EngineError::UnknownPlayer)?;
        Ok(id)
    }

    /// Unseats a player. In the lobby the seat disappears; mid-game the
    /// player is eliminated so turn order stays meaningful.
    pub fn remove_player(&mut self, id: PlayerId) -> Result<(), EngineError> {
        match self.state.phase.game {
            GamePhase::Lobby => {
                self.state
                    .remove_player(id)
                    .ok_or(EngineError::UnknownPlayer(id))?;
                Ok(())
            }
            _ => {
                let player = self
                    .state
                    .player_mut(id)
                    .ok_or(EngineError::UnknownPlayer(id))?;
                let _ = player.set_state(PlayerState::Eliminated, &[]);
                self.outbox.push(EngineEvent::PlayerStateChanged {
                    player: id,
                    state: PlayerState::Eliminated,
                });
                if self.state.turn.current_player == id {
                    self.force_end_turn();
                }
                Ok(())
            }
        }
    }

    /// Leaves the lobby: validates the table, assigns starting spaces, and
    /// runs the first turn up to its first suspension point.
    pub fn start_game(&mut self) -> Result<(), EngineError> {
        if self.state.phase.game != GamePhase::Lobby {
            return Err(EngineError::NotInLobby(self.state.phase.game));
        }
        let total = self.state.players.len();
        match self.board.rules().validate_player_count(total as u32) {
            PlayerCountValidity::Invalid(reason) => {
                return Err(EngineError::PlayerCount(reason));
            }
            PlayerCountValidity::Warning(reason) => {
                warn!(reason, "starting outside the recommended player count");
            }
            PlayerCountValidity::Valid => {}
        }

        for index in 0..total {
            let space = self.board.rules().starting_space_for(
                index,
                total,
                &self.board,
                &mut self.state.session_rng,
            );
            let player = &mut self.state.players[index];
            player.current_space = space;
            let _ = player.set_state(PlayerState::Playing, &[]);
        }

        let first = self.state.players[0].id;
        self.state.turn = TurnState::new(first);
        self.state.phase.game = GamePhase::InGame;
        info!(seed = self.state.seed, players = total, "game started");
        self.outbox.push(EngineEvent::GameStarted {
            seed: self.state.seed,
        });
        self.queue.push_back(Directive::Enter(TurnPhase::BeginTurn));
        self.pump();
        Ok(())
    }

    pub fn pause(&mut self) -> Result<(), EngineError> {
        if self.state.phase.game != GamePhase::InGame {
            return Err(EngineError::NotRunning(self.state.phase.game));
        }
        self.state.phase.game = GamePhase::Paused;
        Ok(())
    }

    pub fn resume(&mut self) -> Result<(), EngineError> {
        if self.state.phase.game != GamePhase::Paused {
            return Err(EngineError::NotRunning(self.state.phase.game));
        }
        self.state.phase.game = GamePhase::InGame;
        self.pump();
        Ok(())
    }

    /// Resumes a parked roll request. Out-of-range values clamp to the
    /// requested bounds; a stale token is ignored.
    pub fn submit_roll(&mut self, token: RequestToken, value: u32) -> bool {
        let (min, max) = match &self.pending {
            Some(Pending {
                token: t,
                kind: PendingKind::Roll { min, max, .. },
            }) if *t == token => (*min, *max),
            _ => {
                warn!(%token, "roll for a request that is not pending; ignored");
                return false;
            }
        };
        let clamped = value.clamp(min, max);
        if clamped != value {
            warn!(value, min, max, "roll out of range; clamped");
        }
        self.pending = None;
        self.apply_roll(clamped);
        self.pump();
        true
    }

    /// Resumes a parked destination choice. A target outside the offered
    /// options leaves the request pending.
    pub fn choose_destination(&mut self, token: RequestToken, target: SpaceId) -> bool {
        let valid = match &self.pending {
            Some(Pending {
                token: t,
                kind: PendingKind::Choice { options, .. },
            }) if *t == token => options.contains(&target),
            _ => {
                warn!(%token, "choice for a request that is not pending; ignored");
                return false;
            }
        };
        if !valid {
            warn!(%target, "chosen destination is not among the offered options");
            return false;
        }
        self.pending = None;
        self.do_move(target);
        self.pump();
        true
    }

    /// Acknowledges a parked prompt. Broadcast prompts complete once every
    /// standing player has acknowledged; single-player prompts complete on
    /// the acting player's acknowledgement.
    pub fn dismiss_prompt(&mut self, token: RequestToken, player: PlayerId) -> bool {
        let standing: Vec<PlayerId> = self.state.standing_players().map(|p| p.id).collect();
        let current = self.state.turn.current_player;
        let done = match &mut self.pending {
            Some(Pending {
                token: t,
                kind: PendingKind::Prompt { all_players, acks },
            }) if *t == token => {
                if *all_players {
                    if !acks.contains(&player) {
                        acks.push(player);
                    }
                    standing.iter().all(|id| acks.contains(id))
                } else {
                    if player != current {
                        warn!(%player, "prompt dismissal from a non-acting player; ignored");
                        return false;
                    }
                    true
                }
            }
            _ => {
                warn!(%token, "dismissal for a request that is not pending; ignored");
                return false;
            }
        };
        if done {
            self.pending = None;
            self.finish_in_flight(false);
            self.pump();
        }
        true
    }

    /// Abandons whatever the turn is waiting on and jumps to END_TURN. An
    /// in-flight event action is completed as skipped, never left armed.
    pub fn force_end_turn(&mut self) {
        if !matches!(
            self.state.phase.game,
            GamePhase::InGame | GamePhase::Paused
        ) {
            return;
        }
        self.pending = None;
        self.finish_in_flight(true);
        self.queue.clear();
        self.queue.push_back(Directive::Enter(TurnPhase::EndTurn));
        self.pump();
    }

    /// Resumes a pump that ran out of directive budget.
    pub fn tick(&mut self) {
        self.pump();
    }

    pub fn is_idle(&self) -> bool {
        self.queue.is_empty() || self.pending.is_some()
    }

    fn issue_token(&mut self) -> RequestToken {
        self.next_token += 1;
        RequestToken(self.next_token)
    }

    /// Drains the directive queue. Stops when the queue empties, a request
    /// parks, the game leaves the running phase, or the per-pump budget is
    /// exhausted (`tick` resumes a deferred queue).
    fn pump(&mut self) {
        let mut budget = self.config.max_directives_per_pump;
        while self.pending.is_none() && self.state.phase.game == GamePhase::InGame {
            let Some(directive) = self.queue.pop_front() else {
                break;
            };
            if budget == 0 {
                warn!("directive budget exhausted; deferring remaining work");
                self.queue.push_front(directive);
                break;
            }
            budget -= 1;
            match directive {
                Directive::Enter(phase) => {
                    self.state.phase.turn = phase;
                    if !self.state.phase.turn_handlers_enabled() {
                        continue;
                    }
                    for handler in self.phases.turn_handlers_for(phase) {
                        handler(self);
                        if self.pending.is_some()
                            || self.state.phase.game != GamePhase::InGame
                        {
                            break;
                        }
                    }
                }
                Directive::StepMove => self.step_move(),
            }
        }
    }
}

impl std::fmt::Debug for GameEngine {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("GameEngine")
            .field("phase", &self.state.phase)
            .field("turn", &self.state.turn.turn_number)
            .field("pending", &self.pending)
            .field("queue_depth", &self.queue.len())
            .finish()
    }
}

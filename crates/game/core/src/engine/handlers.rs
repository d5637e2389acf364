//! Phase handlers and movement steps for [`GameEngine`].

use tracing::{debug, info};

use crate::action::{ActionContext, ActionProgress};
use crate::board::Connection;
use crate::effect::EffectScheduler;
use crate::event::EventPipeline;
use crate::movement::RollSource;
use crate::notify::EngineEvent;
use crate::phase::{GamePhase, TurnPhase};
use crate::rules::VictoryCondition;
use crate::state::{Player, PlayerState, SpaceId};
use crate::trigger::TriggerContext;

use super::{Directive, GameEngine, Pending, PendingKind};

impl GameEngine {
    pub(super) fn on_begin_turn(&mut self) {
        self.state.turn.begin_turn();
        EventPipeline::rearm_all(&mut self.board);

        let player_id = self.state.turn.current_player;
        if let Some(player) = self.state.current_player_mut() {
            player.turns_taken += 1;
        }
        self.outbox.push(EngineEvent::TurnBegan {
            turn_number: self.state.turn.turn_number,
            player: player_id,
        });
        debug!(player = %player_id, turn = self.state.turn.turn_number, "turn began");

        let outcome =
            EffectScheduler::run_pass(&mut self.state, TurnPhase::BeginTurn, &self.registry);
        if outcome.skip_turn {
            self.outbox.push(EngineEvent::TurnSkipped { player: player_id });
            self.queue.push_back(Directive::Enter(TurnPhase::EndTurn));
        } else {
            self.queue
                .push_back(Directive::Enter(TurnPhase::WaitingForMove));
        }
    }

    pub(super) fn on_waiting_for_move(&mut self) {
        let rule = self.board.rules().movement.clone();
        let player_id = self.state.turn.current_player;
        let Some(player) = self.state.current_player_mut() else {
            return;
        };
        match self.policy.propose(player, &rule) {
            RollSource::AwaitInput { min, max } => {
                let token = self.issue_token();
                self.pending = Some(Pending {
                    token,
                    kind: PendingKind::Roll {
                        player: player_id,
                        min,
                        max,
                    },
                });
                self.outbox.push(EngineEvent::RollRequested {
                    token,
                    player: player_id,
                    min,
                    max,
                });
            }
            RollSource::Automatic(value) => self.apply_roll(value),
        }
    }

    /// Turns a raw roll into the move budget, applying roll-modifier
    /// effects (floored at zero).
    pub(super) fn apply_roll(&mut self, raw: u32) {
        let player_id = self.state.turn.current_player;
        let modifier = self
            .state
            .current_player()
            .map(EffectScheduler::roll_modifier)
            .unwrap_or(0);
        let modified = (i64::from(raw) + i64::from(modifier)).max(0) as u32;
        self.state.turn.remaining_moves = modified;
        self.outbox.push(EngineEvent::RollResolved {
            player: player_id,
            raw,
            modified,
        });
        self.queue.push_back(Directive::StepMove);
    }

    /// One single-space movement step. Zero open connections end the turn
    /// early; exactly one moves automatically; several park a choice.
    pub(super) fn step_move(&mut self) {
        if self.state.turn.remaining_moves == 0 {
            self.queue.push_back(Directive::Enter(TurnPhase::EndTurn));
            return;
        }
        let Some(player) = self.state.current_player() else {
            self.queue.push_back(Directive::Enter(TurnPhase::EndTurn));
            return;
        };
        let player_id = player.id;
        let Some(space) = self.board.space(player.current_space) else {
            self.queue.push_back(Directive::Enter(TurnPhase::EndTurn));
            return;
        };
        let options: Vec<SpaceId> = space
            .connections
            .iter()
            .filter(|c| self.connection_open(c, player))
            .map(|c| c.target)
            .collect();

        match options.len() {
            0 => {
                debug!(space = %space.id, "dead end; ending turn early");
                self.state.turn.remaining_moves = 0;
                self.queue.push_back(Directive::Enter(TurnPhase::EndTurn));
            }
            1 => self.do_move(options[0]),
            _ => {
                self.state.phase.turn = TurnPhase::PlayerChoosingDestination;
                let token = self.issue_token();
                self.pending = Some(Pending {
                    token,
                    kind: PendingKind::Choice {
                        player: player_id,
                        options: options.clone(),
                    },
                });
                self.outbox.push(EngineEvent::ChoiceRequested {
                    token,
                    player: player_id,
                    options,
                });
            }
        }
    }

    fn connection_open(&self, connection: &Connection, player: &Player) -> bool {
        let Some(condition) = &connection.condition else {
            return true;
        };
        let Some(space) = self.board.space(connection.target) else {
            return false;
        };
        condition.eval_bool(&TriggerContext {
            state: &self.state,
            space,
            player,
            registry: &self.registry,
        })
    }

    /// Spends one move: records history, flips departure tracking, and
    /// queues the event sweep for the spaces involved.
    pub(super) fn do_move(&mut self, target: SpaceId) {
        let turn_number = self.state.turn.turn_number;
        let player_id = self.state.turn.current_player;
        let Some(player) = self.state.current_player_mut() else {
            return;
        };
        let from = player.current_space;
        player.current_space = target;
        player.history.record(target, turn_number);
        self.state.turn.last_departed = Some(from);
        self.state.turn.moves_this_turn += 1;
        self.state.turn.remaining_moves = self.state.turn.remaining_moves.saturating_sub(1);
        self.outbox.push(EngineEvent::PlayerMoved {
            player: player_id,
            from,
            to: target,
        });
        self.queue
            .push_back(Directive::Enter(TurnPhase::ProcessingEvents));
    }

    /// Sweeps triggers and drains pending events one at a time, re-entering
    /// itself until the move's events settle, then resumes movement.
    pub(super) fn on_processing_events(&mut self) {
        EventPipeline::run_trigger_checks(&mut self.board, &self.state, &self.registry);

        let Some(event_ref) = EventPipeline::next_pending(&self.board, &self.state) else {
            if self.try_finish_game(false) {
                return;
            }
            self.queue.push_back(Directive::StepMove);
            return;
        };

        let Some(space) = self.board.space_mut(event_ref.space) else {
            return;
        };
        let event = &mut space.events[event_ref.index];
        if !event.begin_processing() {
            return;
        }
        let action = event.action.clone();
        let tag = action.type_tag().to_owned();
        self.outbox.push(EngineEvent::ActionStarting {
            space: event_ref.space,
            action: tag.clone(),
        });

        let progress = {
            let mut ctx = ActionContext {
                state: &mut self.state,
                board: &self.board,
                registry: &self.registry,
                config: &self.config,
                notifications: &mut self.outbox,
            };
            action.execute(&mut ctx)
        };

        match progress {
            ActionProgress::Completed => {
                if let Some(space) = self.board.space_mut(event_ref.space) {
                    space.events[event_ref.index].complete();
                }
                self.outbox.push(EngineEvent::ActionCompleted {
                    space: event_ref.space,
                    action: tag,
                    skipped: false,
                });
                self.queue
                    .push_back(Directive::Enter(TurnPhase::ProcessingEvents));
            }
            ActionProgress::AwaitPrompt(request) => {
                self.in_flight = Some(event_ref);
                let token = self.issue_token();
                self.pending = Some(Pending {
                    token,
                    kind: PendingKind::Prompt {
                        all_players: request.all_players,
                        acks: Vec::new(),
                    },
                });
                self.outbox.push(EngineEvent::PromptIssued {
                    token,
                    message: request.message,
                    all_players: request.all_players,
                    timeout_ms: request.timeout_ms,
                });
            }
        }
    }

    /// Completes the event parked behind a prompt and resumes the drain.
    pub(super) fn finish_in_flight(&mut self, skipped: bool) {
        let Some(event_ref) = self.in_flight.take() else {
            return;
        };
        if let Some(space) = self.board.space_mut(event_ref.space) {
            if let Some(event) = space.events.get_mut(event_ref.index) {
                event.complete();
                self.outbox.push(EngineEvent::ActionCompleted {
                    space: event_ref.space,
                    action: event.action.type_tag().to_owned(),
                    skipped,
                });
            }
        }
        self.queue
            .push_back(Directive::Enter(TurnPhase::ProcessingEvents));
    }

    pub(super) fn on_end_turn(&mut self) {
        let outcome =
            EffectScheduler::run_pass(&mut self.state, TurnPhase::EndTurn, &self.registry);
        let _ = outcome; // repeat request lands on turn state
        if self.try_finish_game(true) {
            return;
        }

        let player_id = self.state.turn.current_player;
        let repeated = self.state.turn.repeat_requested;
        self.outbox.push(EngineEvent::TurnEnded {
            turn_number: self.state.turn.turn_number,
            player: player_id,
            repeated,
        });
        if !repeated {
            self.state.turn.current_player = self.state.next_player_after(player_id);
        }
        self.queue.push_back(Directive::Enter(TurnPhase::BeginTurn));
    }

    /// Evaluates victory and, on a hit, transitions to GAME_ENDED. The
    /// turn-limit condition only counts at END_TURN so the limit turn
    /// still plays out in full.
    pub(super) fn try_finish_game(&mut self, include_turn_limit: bool) -> bool {
        let rules = self.board.rules();
        let result = if include_turn_limit {
            rules.check_victory(&self.state, &self.board)
        } else {
            rules
                .victory
                .iter()
                .filter(|c| !matches!(c, VictoryCondition::TurnLimit { .. }))
                .find_map(|c| c.check(&self.state, &self.board))
        };
        let Some(result) = result else {
            return false;
        };

        info!(winner = %result.winner, "game ended");
        if let Some(winner) = self.state.player_mut(result.winner) {
            let _ = winner.set_state(PlayerState::Won, &[]);
        }
        self.state.phase.game = GamePhase::GameEnded;
        self.queue.clear();
        self.pending = None;
        self.in_flight = None;
        self.outbox.push(EngineEvent::GameEnded {
            result: result.clone(),
        });
        self.result = Some(result);
        true
    }
}

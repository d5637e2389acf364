//! Trigger-check sweep and pending-event selection.
//!
//! After each single-space move the engine sweeps the relevant spaces (the
//! one just departed and the one just entered), evaluates armed triggers,
//! and then drains pending events one at a time in priority order. Events
//! on the departed space win ties so OnExit consequences land before
//! OnEnter ones.

use tracing::trace;

use crate::board::Board;
use crate::env::BehaviorRegistry;
use crate::state::{GameState, SpaceId};
use crate::trigger::TriggerContext;

use super::EventState;

/// Stable address of an event on the board.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct EventRef {
    pub space: SpaceId,
    pub index: usize,
}

#[derive(Debug, Default)]
pub struct EventPipeline;

impl EventPipeline {
    /// Spaces whose events are in play for the current move, departed
    /// space first.
    fn candidate_spaces(state: &GameState) -> Vec<SpaceId> {
        let mut out = Vec::with_capacity(2);
        if let Some(departed) = state.turn.last_departed {
            out.push(departed);
        }
        if let Some(player) = state.current_player() {
            if !out.contains(&player.current_space) {
                out.push(player.current_space);
            }
        }
        out
    }

    /// Evaluates every armed trigger on the candidate spaces and latches
    /// the ones that fire. Returns how many events became pending.
    pub fn run_trigger_checks(
        board: &mut Board,
        state: &GameState,
        registry: &BehaviorRegistry,
    ) -> usize {
        let Some(player) = state.current_player() else {
            return 0;
        };

        // Evaluate against shared borrows first, then latch the verdicts.
        let mut fired: Vec<EventRef> = Vec::new();
        for space_id in Self::candidate_spaces(state) {
            let Some(space) = board.space(space_id) else {
                continue;
            };
            let ctx = TriggerContext {
                state,
                space,
                player,
                registry,
            };
            for (index, event) in space.events.iter().enumerate() {
                if event.state == EventState::Ready && event.trigger.is_triggered(&ctx) {
                    trace!(space = %space_id, index, "trigger fired");
                    fired.push(EventRef {
                        space: space_id,
                        index,
                    });
                }
            }
        }

        let count = fired.len();
        for event_ref in fired {
            if let Some(space) = board.space_mut(event_ref.space) {
                space.events[event_ref.index].state = EventState::Triggered;
            }
        }
        count
    }

    /// Highest-priority pending event, or `None` when the queue is drained.
    ///
    /// Ties break by candidate-space order (departed before entered), then
    /// by declaration order within a space.
    pub fn next_pending(board: &Board, state: &GameState) -> Option<EventRef> {
        let mut best: Option<(super::EventPriority, EventRef)> = None;
        for space_id in Self::candidate_spaces(state) {
            let Some(space) = board.space(space_id) else {
                continue;
            };
            for (index, event) in space.events.iter().enumerate() {
                if !event.is_pending() {
                    continue;
                }
                let candidate = (
                    event.priority,
                    EventRef {
                        space: space_id,
                        index,
                    },
                );
                match best {
                    Some((priority, _)) if priority >= candidate.0 => {}
                    _ => best = Some(candidate),
                }
            }
        }
        best.map(|(_, event_ref)| event_ref)
    }

    /// Re-arms every spent event on the board. Run at the start of each
    /// turn so each player gets a fresh set of triggers.
    pub fn rearm_all(board: &mut Board) {
        for space in board.spaces_mut() {
            for event in &mut space.events {
                event.rearm();
            }
        }
    }
}

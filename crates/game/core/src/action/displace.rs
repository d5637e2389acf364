//! Displacement: out-of-budget movement driven by actions.
//!
//! Negative steps walk back through the player's movement history; the
//! walked-over records are flagged so a later backtrack does not revisit
//! them. Positive steps extend the current move budget instead of moving
//! the player directly, so the extra distance still routes through the
//! normal per-step movement (including destination choices).

use tracing::debug;

use crate::notify::EngineEvent;
use crate::state::PlayerId;

use super::ActionContext;

/// Moves `player_id` by `steps` outside the normal roll. A backtrack that
/// asks for more steps than history holds is a no-op.
pub fn displace(ctx: &mut ActionContext<'_>, player_id: PlayerId, steps: i32) {
    if steps == 0 {
        return;
    }

    if steps > 0 {
        // Extra distance is granted as budget, not as a teleport; it only
        // applies to whoever is currently moving.
        if ctx.state.turn.current_player != player_id {
            debug!(player = %player_id, steps, "forward displacement outside own turn; ignored");
            return;
        }
        ctx.state.turn.remaining_moves += steps as u32;
        debug!(player = %player_id, steps, "move budget extended by displacement");
        return;
    }

    let Some(player) = ctx.state.player_mut(player_id) else {
        debug!(player = %player_id, "displace target not seated");
        return;
    };
    let from = player.current_space;

    let back = steps.unsigned_abs() as usize;
    let to = match player.history.backtrack(back) {
        Some(target) => {
            player.current_space = target;
            target
        }
        None => {
            debug!(player = %player_id, steps, "backtrack exceeds history; ignored");
            return;
        }
    };

    ctx.notifications.push(EngineEvent::PlayerDisplaced {
        player: player_id,
        from,
        to,
        steps,
    });
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::board::{Board, BoardMeta, Space, SpaceKind};
    use crate::config::EngineConfig;
    use crate::env::BehaviorRegistry;
    use crate::rules::GameRules;
    use crate::state::{GameState, Player, SpaceId};

    fn line_board() -> Board {
        // 0 -> 1 -> 2 -> 3 -> 4, with a branch at 3.
        Board::new(
            BoardMeta::default(),
            GameRules::default(),
            vec![
                Space::new(SpaceId(0), "s0", SpaceKind::Start).with_connection(SpaceId(1)),
                Space::new(SpaceId(1), "s1", SpaceKind::Normal).with_connection(SpaceId(2)),
                Space::new(SpaceId(2), "s2", SpaceKind::Normal).with_connection(SpaceId(3)),
                Space::new(SpaceId(3), "s3", SpaceKind::Normal)
                    .with_connection(SpaceId(4))
                    .with_connection(SpaceId(0)),
                Space::new(SpaceId(4), "s4", SpaceKind::Finish),
            ],
        )
        .unwrap()
    }

    fn walked_state() -> GameState {
        let mut state = GameState::new(1);
        let mut player = Player::new(PlayerId(0), "peer", "a");
        for sid in 1..=3u32 {
            player.history.record(SpaceId(sid), 1);
        }
        player.current_space = SpaceId(3);
        state.add_player(player).unwrap();
        state.turn.current_player = PlayerId(0);
        state.turn.turn_number = 1;
        state
    }

    fn run(state: &mut GameState, steps: i32) -> Vec<EngineEvent> {
        let board = line_board();
        let registry = BehaviorRegistry::new();
        let config = EngineConfig::default();
        let mut notifications = Vec::new();
        let mut ctx = ActionContext {
            state,
            board: &board,
            registry: &registry,
            config: &config,
            notifications: &mut notifications,
        };
        displace(&mut ctx, PlayerId(0), steps);
        notifications
    }

    #[test]
    fn backtrack_moves_to_history_target() {
        let mut state = walked_state();
        let events = run(&mut state, -2);
        assert_eq!(state.player(PlayerId(0)).unwrap().current_space, SpaceId(1));
        assert_eq!(
            events,
            vec![EngineEvent::PlayerDisplaced {
                player: PlayerId(0),
                from: SpaceId(3),
                to: SpaceId(1),
                steps: -2,
            }]
        );
    }

    #[test]
    fn oversized_backtrack_is_a_noop() {
        let mut state = walked_state();
        let events = run(&mut state, -5);
        assert_eq!(state.player(PlayerId(0)).unwrap().current_space, SpaceId(3));
        assert!(events.is_empty());
    }

    #[test]
    fn forward_displacement_extends_the_move_budget() {
        let mut state = walked_state();
        state.turn.remaining_moves = 1;
        run(&mut state, 3);
        assert_eq!(state.turn.remaining_moves, 4);
        // Position is untouched; the extra steps route through movement.
        assert_eq!(state.player(PlayerId(0)).unwrap().current_space, SpaceId(3));
    }

    #[test]
    fn forward_displacement_only_applies_to_the_acting_player() {
        let mut state = walked_state();
        state.turn.current_player = PlayerId(7);
        state.turn.remaining_moves = 2;
        let events = run(&mut state, 3);
        assert_eq!(state.turn.remaining_moves, 2);
        assert!(events.is_empty());
    }
}

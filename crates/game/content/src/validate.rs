//! Advisory authoring-time validation.
//!
//! These checks flag boards that will load and run but probably do not do
//! what the author intended. The engine never depends on them: a board
//! that fails every advisory check still plays.

use tabula_core::{Board, StartMode, Validation};

/// Sweeps a board's rules and events for authoring mistakes.
pub fn validate_board(board: &Board) -> Validation {
    let mut findings = Validation::ok();
    let rules = board.rules();

    if rules.min_players == 0 {
        findings.push("rules allow zero players");
    }
    if let Some(max) = rules.max_players {
        if max < rules.min_players {
            findings.push(format!(
                "max_players {max} is below min_players {}",
                rules.min_players
            ));
        }
    }
    if rules.movement.roll_min > rules.movement.roll_max {
        findings.push(format!(
            "roll range [{}, {}] is inverted",
            rules.movement.roll_min, rules.movement.roll_max
        ));
    }
    if rules.starting.mode == StartMode::Custom && rules.starting.space_ids.is_empty() {
        findings.push("custom start mode without candidate spaces");
    }
    for id in &rules.starting.space_ids {
        if board.space(*id).is_none() {
            findings.push(format!("starting space {id} is not on the board"));
        }
    }
    if board.start_spaces().next().is_none() && rules.starting.space_ids.is_empty() {
        findings.push("no start-typed space; players will start on the first space");
    }

    for space in board.spaces() {
        for (index, event) in space.events.iter().enumerate() {
            let mut local = event.trigger.validate();
            local.merge(event.action.validate(board));
            for error in local.errors {
                findings.push(format!("space {} event {index}: {error}", space.id));
            }
        }
    }
    findings
}

/// Checks the board's required plugins against the set of loaded plugin
/// names.
pub fn validate_plugins(board: &Board, loaded: &[String]) -> Validation {
    let mut findings = Validation::ok();
    for required in &board.meta().required_plugins {
        if !loaded.contains(required) {
            findings.push(format!("required plugin '{required}' is not loaded"));
        }
    }
    for required in &board.rules().required_plugins {
        if !loaded.contains(required) {
            findings.push(format!("required plugin '{required}' is not loaded"));
        }
    }
    findings
}

#[cfg(test)]
mod tests {
    use super::*;
    use tabula_core::{Action, BoardMeta, GameEvent, GameRules, Space, SpaceId, SpaceKind, Trigger};

    fn board_with(rules: GameRules, spaces: Vec<Space>) -> Board {
        Board::new(BoardMeta::default(), rules, spaces).unwrap()
    }

    #[test]
    fn clean_board_has_no_findings() {
        let board = board_with(
            GameRules::default(),
            vec![
                Space::new(SpaceId(0), "start", SpaceKind::Start).with_connection(SpaceId(1)),
                Space::new(SpaceId(1), "end", SpaceKind::Finish),
            ],
        );
        assert!(validate_board(&board).is_valid());
    }

    #[test]
    fn flags_event_and_rule_problems() {
        let rules = GameRules {
            min_players: 0,
            ..GameRules::default()
        };
        let board = board_with(
            rules,
            vec![Space::new(SpaceId(0), "s", SpaceKind::Start).with_event(GameEvent::new(
                Trigger::OnLand,
                Action::DisplacePlayer { steps: 0 },
            ))],
        );
        let findings = validate_board(&board);
        assert_eq!(findings.errors.len(), 2);
        assert!(findings.errors.iter().any(|e| e.contains("zero players")));
        assert!(findings.errors.iter().any(|e| e.contains("event 0")));
    }

    #[test]
    fn missing_required_plugin_is_flagged() {
        let mut meta = BoardMeta::default();
        meta.required_plugins.push("teleporters".into());
        let board = Board::new(
            meta,
            GameRules::default(),
            vec![Space::new(SpaceId(0), "s", SpaceKind::Start)],
        )
        .unwrap();

        let findings = validate_plugins(&board, &[]);
        assert!(!findings.is_valid());
        let findings = validate_plugins(&board, &["teleporters".to_owned()]);
        assert!(findings.is_valid());
    }
}

//! Board definition loader.
//!
//! Boards are authored as JSON. Deserialization itself enforces the hard
//! structural invariants (unique space ids, no dangling connections);
//! everything advisory happens in [`crate::validate`] so a merely
//! questionable board still loads.

use std::path::Path;

use tracing::warn;

use tabula_core::Board;

use crate::loaders::{read_file, LoadError, LoadResult};
use crate::validate::validate_board;

/// Loader for board definitions from JSON files.
pub struct BoardLoader;

impl BoardLoader {
    /// Loads a board, logging advisory findings without failing on them.
    pub fn load(path: &Path) -> LoadResult<Board> {
        let content = read_file(path)?;
        let board: Board =
            serde_json::from_str(&content).map_err(|source| LoadError::BoardFormat {
                path: path.to_owned(),
                source,
            })?;

        let findings = validate_board(&board);
        if !findings.is_valid() {
            for finding in &findings.errors {
                warn!(board = %path.display(), finding, "board validation finding");
            }
        }
        Ok(board)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tabula_core::{SpaceId, SpaceKind};

    fn write_board(json: &str) -> tempfile::NamedTempFile {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        file.write_all(json.as_bytes()).unwrap();
        file
    }

    #[test]
    fn loads_a_minimal_board() {
        let file = write_board(
            r#"{
                "meta": {"name": "demo"},
                "spaces": [
                    {"id": 0, "name": "start", "type": "START",
                     "connections": [{"target": 1}]},
                    {"id": 1, "name": "end", "type": "FINISH"}
                ]
            }"#,
        );
        let board = BoardLoader::load(file.path()).unwrap();
        assert_eq!(board.meta().name, "demo");
        assert_eq!(board.spaces().len(), 2);
        assert_eq!(board.space(SpaceId(0)).unwrap().kind, SpaceKind::Start);
    }

    #[test]
    fn dangling_connection_fails_to_load() {
        let file = write_board(
            r#"{
                "spaces": [
                    {"id": 0, "name": "s", "type": "START",
                     "connections": [{"target": 99}]}
                ]
            }"#,
        );
        let err = BoardLoader::load(file.path()).unwrap_err();
        assert!(matches!(err, LoadError::BoardFormat { .. }));
    }

    #[test]
    fn events_round_trip_through_the_wire_shape() {
        let file = write_board(
            r#"{
                "spaces": [
                    {"id": 0, "name": "s", "type": "START",
                     "events": [
                        {"trigger": {"type": "ON_LAND"},
                         "action": {"type": "DISPLACE_PLAYER", "payload": {"steps": -2}},
                         "priority": "HIGH"}
                     ]}
                ]
            }"#,
        );
        let board = BoardLoader::load(file.path()).unwrap();
        let space = board.space(SpaceId(0)).unwrap();
        assert_eq!(space.events.len(), 1);
        assert_eq!(
            space.events[0].priority,
            tabula_core::EventPriority::High
        );
    }
}

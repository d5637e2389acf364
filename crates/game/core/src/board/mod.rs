//! Board: an arena of spaces plus the rules object and authoring metadata.

mod space;

pub use space::{Connection, DrawHint, Space, SpaceKind, VisualDetails};

use std::collections::HashMap;

use serde::{Deserialize, Serialize};

use crate::rules::GameRules;
use crate::state::SpaceId;

#[derive(Clone, Debug, thiserror::Error, PartialEq, Eq)]
pub enum BoardError {
    #[error("board has no spaces")]
    Empty,
    #[error("duplicate space id {0}")]
    DuplicateSpaceId(SpaceId),
    #[error("connection from {from} targets unknown space {to}")]
    DanglingConnection { from: SpaceId, to: SpaceId },
}

impl crate::error::GameError for BoardError {
    fn severity(&self) -> crate::error::ErrorSeverity {
        crate::error::ErrorSeverity::Fatal
    }
}

/// Authoring metadata for a board.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct BoardMeta {
    pub name: String,
    pub author: String,
    pub version: String,
    pub tags: Vec<String>,
    pub required_plugins: Vec<String>,
}

/// The space graph, indexed by id.
///
/// Construction is two-pass: every space is placed in the arena first, then
/// edges are checked by id lookup, so forward/back/self references need no
/// special ordering.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "BoardData", into = "BoardData")]
pub struct Board {
    meta: BoardMeta,
    rules: GameRules,
    spaces: Vec<Space>,
    index: HashMap<SpaceId, usize>,
}

/// Serialized form: the index is rebuilt (and edges re-validated) on load.
#[derive(Serialize, Deserialize)]
struct BoardData {
    #[serde(default)]
    meta: BoardMeta,
    #[serde(default)]
    rules: GameRules,
    spaces: Vec<Space>,
}

impl Board {
    pub fn new(meta: BoardMeta, rules: GameRules, spaces: Vec<Space>) -> Result<Self, BoardError> {
        if spaces.is_empty() {
            return Err(BoardError::Empty);
        }
        let mut index = HashMap::with_capacity(spaces.len());
        for (i, space) in spaces.iter().enumerate() {
            if index.insert(space.id, i).is_some() {
                return Err(BoardError::DuplicateSpaceId(space.id));
            }
        }
        // Second pass: every edge target must exist in the arena.
        for space in &spaces {
            for connection in &space.connections {
                if !index.contains_key(&connection.target) {
                    return Err(BoardError::DanglingConnection {
                        from: space.id,
                        to: connection.target,
                    });
                }
            }
        }
        Ok(Self {
            meta,
            rules,
            spaces,
            index,
        })
    }

    pub fn meta(&self) -> &BoardMeta {
        &self.meta
    }

    pub fn rules(&self) -> &GameRules {
        &self.rules
    }

    pub fn space(&self, id: SpaceId) -> Option<&Space> {
        self.index.get(&id).map(|&i| &self.spaces[i])
    }

    pub fn space_mut(&mut self, id: SpaceId) -> Option<&mut Space> {
        let i = *self.index.get(&id)?;
        Some(&mut self.spaces[i])
    }

    /// First space in declaration order (final starting-position fallback).
    pub fn first_space(&self) -> &Space {
        &self.spaces[0]
    }

    pub fn spaces(&self) -> &[Space] {
        &self.spaces
    }

    pub fn spaces_mut(&mut self) -> &mut [Space] {
        &mut self.spaces
    }

    /// Spaces usable as starting positions, in declaration order.
    pub fn start_spaces(&self) -> impl Iterator<Item = &Space> {
        self.spaces.iter().filter(|s| s.kind.is_start())
    }
}

impl TryFrom<BoardData> for Board {
    type Error = BoardError;

    fn try_from(data: BoardData) -> Result<Self, Self::Error> {
        Self::new(data.meta, data.rules, data.spaces)
    }
}

impl From<Board> for BoardData {
    fn from(board: Board) -> Self {
        Self {
            meta: board.meta,
            rules: board.rules,
            spaces: board.spaces,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn space(id: u32) -> Space {
        Space::new(SpaceId(id), format!("s{id}"), SpaceKind::Normal)
    }

    #[test]
    fn duplicate_ids_are_rejected() {
        let err = Board::new(
            BoardMeta::default(),
            GameRules::default(),
            vec![space(1), space(1)],
        );
        assert_eq!(err.unwrap_err(), BoardError::DuplicateSpaceId(SpaceId(1)));
    }

    #[test]
    fn dangling_connection_is_rejected() {
        let err = Board::new(
            BoardMeta::default(),
            GameRules::default(),
            vec![space(1).with_connection(SpaceId(9))],
        );
        assert_eq!(
            err.unwrap_err(),
            BoardError::DanglingConnection {
                from: SpaceId(1),
                to: SpaceId(9)
            }
        );
    }

    #[test]
    fn cyclic_and_self_references_load() {
        let board = Board::new(
            BoardMeta::default(),
            GameRules::default(),
            vec![
                space(1).with_connection(SpaceId(2)),
                space(2).with_connection(SpaceId(1)).with_connection(SpaceId(2)),
            ],
        )
        .unwrap();
        assert_eq!(board.space(SpaceId(2)).unwrap().connections.len(), 2);
    }
}

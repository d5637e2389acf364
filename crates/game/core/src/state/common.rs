use std::fmt;

use serde::{Deserialize, Serialize};

/// Unique identifier for a player within one game session.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct PlayerId(pub u32);

impl fmt::Display for PlayerId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "P{}", self.0)
    }
}

/// Unique identifier for a space on a board.
///
/// Ids are assigned by the board author and must be unique within a board;
/// [`crate::board::Board`] enforces this at construction.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct SpaceId(pub u32);

impl fmt::Display for SpaceId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "S{}", self.0)
    }
}

/// Identifier for an individual token in multi-piece game variants.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct PieceId(pub u32);

/// Monotonically increasing token attached to every suspension request.
///
/// A completion (roll value, chosen destination, prompt dismissal) must carry
/// the token of the request it answers. Completions tagged with a superseded
/// token are silently dropped, so a stale callback can never resolve a newer
/// prompt.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct RequestToken(pub u64);

impl fmt::Display for RequestToken {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "req#{}", self.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn ids_round_trip_as_plain_numbers() {
        let id: SpaceId = serde_json::from_str("10").unwrap();
        assert_eq!(id, SpaceId(10));
        assert_eq!(serde_json::to_string(&PlayerId(3)).unwrap(), "3");
    }

    #[test]
    fn token_ordering_reflects_recency() {
        assert!(RequestToken(2) > RequestToken(1));
    }
}

//! Append-only movement log with backtracking flags.
//!
//! Entries are never deleted. Negative displacement flags entries
//! `backtracked` instead of removing them: forward-looking algorithms use the
//! flattened view, while the raw log stays intact for audit and replay.

use serde::{Deserialize, Serialize};

use super::SpaceId;

/// One recorded move.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct MoveRecord {
    pub space: SpaceId,
    pub turn_number: u32,
    #[serde(default)]
    pub backtracked: bool,
}

/// Ordered sequence of a player's past positions.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct MovementHistory {
    entries: Vec<MoveRecord>,
}

impl MovementHistory {
    pub fn new() -> Self {
        Self::default()
    }

    /// Appends a move record.
    pub fn record(&mut self, space: SpaceId, turn_number: u32) {
        self.entries.push(MoveRecord {
            space,
            turn_number,
            backtracked: false,
        });
    }

    /// The raw log, including backtracked entries.
    pub fn entries(&self) -> &[MoveRecord] {
        &self.entries
    }

    /// View skipping backtracked entries.
    pub fn flattened(&self) -> impl Iterator<Item = &MoveRecord> {
        self.entries.iter().filter(|r| !r.backtracked)
    }

    pub fn flattened_len(&self) -> usize {
        self.flattened().count()
    }

    /// Walks `steps` entries backward through the flattened view.
    ///
    /// With `n` unbacktracked entries the target sits at flattened index
    /// `n - steps - 1`; every flattened entry past it is flagged backtracked.
    /// Returns the target space, or `None` when the history is too short
    /// (`steps >= n`), in which case nothing is modified.
    pub fn backtrack(&mut self, steps: usize) -> Option<SpaceId> {
        let flat: Vec<usize> = self
            .entries
            .iter()
            .enumerate()
            .filter(|(_, r)| !r.backtracked)
            .map(|(i, _)| i)
            .collect();
        let n = flat.len();
        if steps >= n {
            return None;
        }
        let target = n - steps - 1;
        for &raw in &flat[target + 1..] {
            self.entries[raw].backtracked = true;
        }
        Some(self.entries[flat[target]].space)
    }

    /// Most recent unbacktracked entry.
    pub fn last(&self) -> Option<&MoveRecord> {
        self.entries.iter().rev().find(|r| !r.backtracked)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn history(spaces: &[u32]) -> MovementHistory {
        let mut h = MovementHistory::new();
        for (turn, &s) in spaces.iter().enumerate() {
            h.record(SpaceId(s), turn as u32 + 1);
        }
        h
    }

    #[test]
    fn backtrack_two_from_five_lands_on_index_two() {
        let mut h = history(&[10, 11, 12, 13, 14]);
        let target = h.backtrack(2);
        assert_eq!(target, Some(SpaceId(12)));
        let flags: Vec<bool> = h.entries().iter().map(|r| r.backtracked).collect();
        assert_eq!(flags, vec![false, false, false, true, true]);
    }

    #[test]
    fn backtrack_past_start_is_a_no_op() {
        let mut h = history(&[10, 11, 12]);
        assert_eq!(h.backtrack(5), None);
        assert_eq!(h.backtrack(3), None);
        assert!(h.entries().iter().all(|r| !r.backtracked));
    }

    #[test]
    fn flattened_view_skips_backtracked_entries() {
        let mut h = history(&[10, 11, 12, 13, 14]);
        h.backtrack(2);
        let flat: Vec<u32> = h.flattened().map(|r| r.space.0).collect();
        assert_eq!(flat, vec![10, 11, 12]);
        // The raw log keeps all five entries for audit.
        assert_eq!(h.len(), 5);
    }

    #[test]
    fn second_backtrack_ignores_already_backtracked_entries() {
        let mut h = history(&[10, 11, 12, 13, 14]);
        h.backtrack(2);
        // Flattened is now [10, 11, 12]; one more step back lands on 11.
        assert_eq!(h.backtrack(1), Some(SpaceId(11)));
        let flat: Vec<u32> = h.flattened().map(|r| r.space.0).collect();
        assert_eq!(flat, vec![10, 11]);
    }
}

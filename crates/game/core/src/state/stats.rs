//! Named stat records attached to a player.

use serde::{Deserialize, Serialize};

/// Value carried by a stat record.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum StatValue {
    Int(i64),
    Float(f64),
    Text(String),
}

impl StatValue {
    /// Numeric view of the value; text stats have none.
    pub fn as_int(&self) -> Option<i64> {
        match self {
            Self::Int(v) => Some(*v),
            Self::Float(v) => Some(*v as i64),
            Self::Text(_) => None,
        }
    }
}

/// A single named stat. `id` is the stable key, `name` the display label.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct StatRecord {
    pub id: String,
    pub name: String,
    pub value: StatValue,
}

impl StatRecord {
    pub fn int(id: impl Into<String>, name: impl Into<String>, value: i64) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            value: StatValue::Int(value),
        }
    }
}

#[derive(Clone, Debug, thiserror::Error, PartialEq, Eq)]
pub enum StatsError {
    #[error("duplicate stat id '{0}'")]
    DuplicateId(String),
}

/// Ordered stat collection, unique by id.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Stats {
    records: Vec<StatRecord>,
}

impl Stats {
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds a record, rejecting duplicate ids.
    pub fn insert(&mut self, record: StatRecord) -> Result<(), StatsError> {
        if self.records.iter().any(|r| r.id == record.id) {
            return Err(StatsError::DuplicateId(record.id));
        }
        self.records.push(record);
        Ok(())
    }

    pub fn get(&self, id: &str) -> Option<&StatRecord> {
        self.records.iter().find(|r| r.id == id)
    }

    pub fn get_mut(&mut self, id: &str) -> Option<&mut StatRecord> {
        self.records.iter_mut().find(|r| r.id == id)
    }

    /// Numeric value of a stat, if present and numeric.
    pub fn int(&self, id: &str) -> Option<i64> {
        self.get(id).and_then(|r| r.value.as_int())
    }

    /// Sets an integer stat, creating the record if missing.
    pub fn set_int(&mut self, id: &str, value: i64) {
        match self.get_mut(id) {
            Some(record) => record.value = StatValue::Int(value),
            None => self.records.push(StatRecord::int(id, id, value)),
        }
    }

    /// Adds `delta` to an integer stat, creating it at `delta` if missing.
    pub fn adjust_int(&mut self, id: &str, delta: i64) {
        let current = self.int(id).unwrap_or(0);
        self.set_int(id, current + delta);
    }

    pub fn iter(&self) -> impl Iterator<Item = &StatRecord> {
        self.records.iter()
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }
}

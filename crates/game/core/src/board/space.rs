use serde::{Deserialize, Serialize};

use crate::event::GameEvent;
use crate::state::SpaceId;
use crate::trigger::CodeExpr;

/// Category of a space. Starting-position resolution treats `Start` spaces
/// (and custom kinds whose tag mentions "start") as candidates.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum SpaceKind {
    Normal,
    Start,
    Finish,
    Custom(String),
}

impl SpaceKind {
    pub fn as_str(&self) -> &str {
        match self {
            Self::Normal => "NORMAL",
            Self::Start => "START",
            Self::Finish => "FINISH",
            Self::Custom(tag) => tag,
        }
    }

    pub fn is_start(&self) -> bool {
        match self {
            Self::Start => true,
            Self::Custom(tag) => tag.to_ascii_lowercase().contains("start"),
            _ => false,
        }
    }
}

impl From<String> for SpaceKind {
    fn from(value: String) -> Self {
        match value.as_str() {
            "NORMAL" => Self::Normal,
            "START" => Self::Start,
            "FINISH" => Self::Finish,
            _ => Self::Custom(value),
        }
    }
}

impl From<SpaceKind> for String {
    fn from(kind: SpaceKind) -> Self {
        kind.as_str().to_owned()
    }
}

/// Rendering geometry carried through for the UI; the core never reads it.
#[derive(Clone, Copy, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct VisualDetails {
    pub x: f32,
    pub y: f32,
    pub width: f32,
    pub height: f32,
}

/// Rendering hints for a connection edge; opaque to the core.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct DrawHint {
    pub label: Option<String>,
    pub color: Option<String>,
}

/// Directed edge to another space.
///
/// Targets are ids, not references: the board graph may contain forward,
/// backward, and self references, so edges are validated against the arena
/// in a second pass after every space exists.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Connection {
    pub target: SpaceId,
    /// Optional gate: a move along this edge is only legal while the
    /// condition evaluates true for the moving player.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub condition: Option<CodeExpr>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub draw: Option<DrawHint>,
}

impl Connection {
    pub fn to(target: SpaceId) -> Self {
        Self {
            target,
            condition: None,
            draw: None,
        }
    }
}

/// One space on the board graph.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Space {
    pub id: SpaceId,
    pub name: String,
    #[serde(default = "default_kind", rename = "type")]
    pub kind: SpaceKind,
    #[serde(default)]
    pub visual: VisualDetails,
    #[serde(default)]
    pub connections: Vec<Connection>,
    /// Events declared on this space, in declaration (tie-break) order.
    #[serde(default)]
    pub events: Vec<GameEvent>,
}

fn default_kind() -> SpaceKind {
    SpaceKind::Normal
}

impl Space {
    pub fn new(id: SpaceId, name: impl Into<String>, kind: SpaceKind) -> Self {
        Self {
            id,
            name: name.into(),
            kind,
            visual: VisualDetails::default(),
            connections: Vec::new(),
            events: Vec::new(),
        }
    }

    pub fn with_connection(mut self, target: SpaceId) -> Self {
        self.connections.push(Connection::to(target));
        self
    }

    pub fn with_event(mut self, event: GameEvent) -> Self {
        self.events.push(event);
        self
    }
}

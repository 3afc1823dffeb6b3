use serde::{Deserialize, Serialize};

use super::dom::DomNode;
use super::feed::{FeedItemId, TimerHandle};

/// One viewport-intersection observation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct IntersectionEntry {
    /// Identifier of the observed element; `None` when the element has none.
    #[serde(default)]
    pub item_id: Option<String>,
    /// Visible fraction of the element, 0.0 to 1.0.
    pub ratio: f64,
}

impl IntersectionEntry {
    pub fn entered(id: &str) -> Self {
        Self {
            item_id: Some(id.to_string()),
            ratio: 1.0,
        }
    }

    pub fn left(id: &str) -> Self {
        Self {
            item_id: Some(id.to_string()),
            ratio: 0.0,
        }
    }
}

/// Events delivered by the host, handled strictly in arrival order.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "event", rename_all = "snake_case")]
pub enum FeedEvent {
    /// The document as it stood when the host attached.
    DocumentSnapshot { roots: Vec<DomNode> },
    /// A mutation batch inserted these subtrees.
    NodesInserted { nodes: Vec<DomNode> },
    /// A mutation batch removed these subtrees.
    NodesRemoved { nodes: Vec<DomNode> },
    /// One viewport-observer callback, entries in delivery order.
    Intersection { entries: Vec<IntersectionEntry> },
    /// A timer scheduled through the host has fired.
    TimerFired { handle: TimerHandle },
    /// The user clicked the toggle affordance.
    ToggleRequested,
}

/// Presentation commands the engine issues to the host.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "command", rename_all = "snake_case")]
pub enum HostCommand {
    Observe { id: FeedItemId },
    Unobserve { id: FeedItemId },
    Hide { id: FeedItemId, class: String },
    Show { id: FeedItemId, class: String },
    ScheduleTimer { handle: TimerHandle, delay_ms: u64 },
    CancelTimer { handle: TimerHandle },
    InsertToggle { anchor: String, affordance_id: String, enabled: bool },
    RenderToggle { enabled: bool },
}

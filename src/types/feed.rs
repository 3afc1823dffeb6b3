use std::fmt;

use serde::{Deserialize, Serialize};

/// Opaque identifier of a feed item, read from the host document.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct FeedItemId(String);

impl FeedItemId {
    /// Wraps a raw identifier. Empty identifiers count as absent.
    pub fn new(raw: impl Into<String>) -> Option<Self> {
        let raw = raw.into();
        if raw.is_empty() {
            None
        } else {
            Some(Self(raw))
        }
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for FeedItemId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for FeedItemId {
    fn from(raw: &str) -> Self {
        Self(raw.to_string())
    }
}

/// Handle of a timer scheduled through the host.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct TimerHandle(pub u64);

/// What a scheduled timer is for.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum TimerKind {
    /// Dwell confirmation for one item.
    Dwell { item_id: FeedItemId },
    /// The settle-delayed first sweep of the whole document.
    InitialSweep,
    /// One of the fixed-schedule attempts to insert the toggle affordance.
    AffordanceRetry { attempt: usize },
}

/// Read classification of a tracked item.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ItemState {
    #[default]
    Unseen,
    /// Visible, dwell timer running.
    PendingConfirmation { timer: TimerHandle },
    /// Dwell completed; hiding waits for the item to leave the viewport.
    ConfirmedRead,
    /// Recorded as read and carrying the hidden-state marker.
    Hidden,
}

/// Arena record for one item currently attached to the document.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct TrackedItem {
    pub state: ItemState,
    /// Result of the latest intersection entry for this item.
    pub in_viewport: bool,
}

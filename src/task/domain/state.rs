//! Task lifecycle states and the transition table.

use super::ParseTaskStateError;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Task lifecycle state.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TaskState {
    /// Captured without any decisions; the initial state.
    Inbox,
    /// Reviewed and categorized.
    Triaged,
    /// Currently being worked on.
    Active,
    /// Waiting on something external.
    Blocked,
    /// Completed.
    Done,
    /// Kept for history only. Terminal.
    Archived,
}

impl TaskState {
    /// Every state, in lifecycle order.
    pub const ALL: [Self; 6] = [
        Self::Inbox,
        Self::Triaged,
        Self::Active,
        Self::Blocked,
        Self::Done,
        Self::Archived,
    ];

    /// Returns the canonical storage representation.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Inbox => "inbox",
            Self::Triaged => "triaged",
            Self::Active => "active",
            Self::Blocked => "blocked",
            Self::Done => "done",
            Self::Archived => "archived",
        }
    }

    /// Returns `true` when the edge `self -> target` is in the transition
    /// table.
    ///
    /// Self-transitions are never valid.
    #[must_use]
    pub const fn can_transition_to(self, target: Self) -> bool {
        matches!(
            (self, target),
            (Self::Inbox, Self::Triaged | Self::Active | Self::Archived)
                | (Self::Triaged, Self::Active | Self::Blocked | Self::Archived)
                | (Self::Active, Self::Blocked | Self::Done | Self::Archived)
                | (Self::Blocked, Self::Active | Self::Archived)
                | (Self::Done, Self::Archived)
        )
    }

    /// Returns `true` when no outgoing transitions exist.
    #[must_use]
    pub const fn is_terminal(self) -> bool {
        matches!(self, Self::Archived)
    }
}

impl TryFrom<&str> for TaskState {
    type Error = ParseTaskStateError;

    fn try_from(value: &str) -> Result<Self, Self::Error> {
        let normalized = value.trim().to_ascii_lowercase();
        match normalized.as_str() {
            "inbox" => Ok(Self::Inbox),
            "triaged" => Ok(Self::Triaged),
            "active" => Ok(Self::Active),
            "blocked" => Ok(Self::Blocked),
            "done" => Ok(Self::Done),
            "archived" => Ok(Self::Archived),
            _ => Err(ParseTaskStateError(value.to_owned())),
        }
    }
}

impl fmt::Display for TaskState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

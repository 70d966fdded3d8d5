//! Grouping lifecycle.
//!
//! The state of a grouping is never stored. It is derived from the current
//! time, the grouping's dates, and two relational facts: whether groups were
//! formed and whether registrations still exist.
//!
//! ```text
//!  NEW ──begin──▶ AVAILABLE ──final──▶ FINAL ──start──▶ GROUPED ──fasten──▶ FASTENED ──close──▶ CLOSED
//!                                        ▲                 │
//!                                        └──remove groups──┘
//! ```

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::models::Grouping;

/// Derived state of a grouping.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum GroupingState {
    /// Grouping cannot be resolved.
    Unknown,
    /// Freshly created, only maintenance operations allowed.
    New,
    /// Participants can register.
    Available,
    /// Registration is over, groups can be formed.
    Final,
    /// Groups were formed, nothing is fixed yet.
    Grouped,
    /// Formed groups cannot be changed any more.
    Fastened,
    /// Only visible to the host; can be deleted.
    Closed,
}

/// Operations gated by the grouping state.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Operation {
    /// A participant registers or updates a registration.
    Register,
    /// Host edits grouping metadata.
    Update,
    /// Run the policy and store the groups.
    Start,
    /// Discard formed groups.
    RemoveGroups,
    /// Lock formed groups by clearing all registrations.
    Fasten,
    /// Delete the grouping.
    Delete,
    /// Host removes participants.
    DeleteRegistrations,
    /// Share the registration link.
    ShowLink,
}

impl GroupingState {
    /// Whether `operation` is permitted in this state.
    pub fn permits(self, operation: Operation) -> bool {
        use GroupingState::*;
        match operation {
            Operation::Register => self == Available,
            Operation::Update => matches!(self, New | Available | Final),
            Operation::Start => self == Final,
            Operation::RemoveGroups | Operation::Fasten => self == Grouped,
            Operation::Delete => matches!(self, New | Closed),
            Operation::DeleteRegistrations => matches!(self, Available | Final | Grouped),
            Operation::ShowLink => matches!(self, New | Available),
        }
    }

    /// Whether groups exist in this state.
    pub fn has_groups(self) -> bool {
        matches!(
            self,
            GroupingState::Grouped | GroupingState::Fastened | GroupingState::Closed
        )
    }
}

/// Relational facts needed beyond the grouping's dates.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct GroupingFacts {
    /// Groups were formed and stored.
    pub has_groups: bool,
    /// Number of registrations still stored.
    pub registration_count: usize,
}

/// Derives the state of `grouping` at `now`.
///
/// `None` (grouping not found) yields [`GroupingState::Unknown`].
pub fn grouping_state(
    grouping: Option<&Grouping>,
    facts: GroupingFacts,
    now: DateTime<Utc>,
) -> GroupingState {
    let Some(grouping) = grouping else {
        return GroupingState::Unknown;
    };
    match grouping.date_state(now) {
        state @ (GroupingState::New | GroupingState::Available) => state,
        _ if !facts.has_groups => GroupingState::Final,
        _ if facts.registration_count > 0 => GroupingState::Grouped,
        GroupingState::Closed => GroupingState::Closed,
        _ => GroupingState::Fastened,
    }
}

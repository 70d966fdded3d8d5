//! Grouping model.
//!
//! A grouping is one group-formation exercise: a schedule (begin, final,
//! optional close date), a policy code, and the sizing parameters used when
//! groups are formed.
//!
//! # Lifecycle
//!
//! Dates alone yield only a partial state ([`Grouping::date_state`]). The
//! full state needs registration and group facts; see
//! [`crate::lifecycle::grouping_state`].

use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use thiserror::Error;
use uuid::Uuid;

use super::UserKey;
use crate::lifecycle::GroupingState;

/// Key to identify a grouping.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct GroupingKey(pub Uuid);

impl GroupingKey {
    /// Creates a fresh random key.
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }
}

impl Default for GroupingKey {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for GroupingKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.0.fmt(f)
    }
}

/// Reasons a model fails its consistency check.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ValidationError {
    /// User ident is empty.
    #[error("user ident is empty")]
    EmptyIdent,
    /// Grouping code is empty.
    #[error("grouping code is empty")]
    EmptyCode,
    /// Grouping name is empty.
    #[error("grouping name is empty")]
    EmptyName,
    /// Policy code is empty.
    #[error("grouping policy is empty")]
    EmptyPolicy,
    /// `begin_date >= final_date`.
    #[error("begin date {begin} not before final date {final_date}")]
    BeginNotBeforeFinal {
        /// Begin date.
        begin: DateTime<Utc>,
        /// Final date.
        final_date: DateTime<Utc>,
    },
    /// `final_date >= close_date`.
    #[error("final date {final_date} not before close date {close}")]
    FinalNotBeforeClose {
        /// Final date.
        final_date: DateTime<Utc>,
        /// Close date.
        close: DateTime<Utc>,
    },
    /// `max_group_size < 1`.
    #[error("maximum group size < 1")]
    MaxGroupSize,
}

/// A group-formation exercise.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Grouping {
    /// Unique grouping key.
    pub key: GroupingKey,
    /// Short, human-typable access code.
    pub code: String,
    /// Display name.
    pub name: String,
    /// User who created and manages the grouping.
    pub host_key: UserKey,
    /// Registration opens.
    pub begin_date: DateTime<Utc>,
    /// Registration closes; groups may be formed afterwards.
    pub final_date: DateTime<Utc>,
    /// Grouping becomes closed (host-only) after this date.
    pub close_date: Option<DateTime<Utc>>,
    /// Policy code, see [`crate::policies::get_policy`].
    pub policy: String,
    /// Upper bound of members per group (>= 1).
    pub max_group_size: usize,
    /// Capacity held back when sizing groups.
    pub member_reserve: usize,
    /// Free text.
    pub note: String,
}

impl Grouping {
    /// Creates a grouping with a fresh key, random policy, and a
    /// one-week registration window starting at `begin_date`.
    pub fn new(name: impl Into<String>, host_key: UserKey, begin_date: DateTime<Utc>) -> Self {
        Self {
            key: GroupingKey::new(),
            code: String::new(),
            name: name.into(),
            host_key,
            begin_date,
            final_date: begin_date + Duration::days(7),
            close_date: None,
            policy: "RD".into(),
            max_group_size: 7,
            member_reserve: 0,
            note: String::new(),
        }
    }

    /// Sets the short code.
    pub fn with_code(mut self, code: impl Into<String>) -> Self {
        self.code = code.into();
        self
    }

    /// Sets the final date.
    pub fn with_final_date(mut self, final_date: DateTime<Utc>) -> Self {
        self.final_date = final_date;
        self
    }

    /// Sets the close date.
    pub fn with_close_date(mut self, close_date: Option<DateTime<Utc>>) -> Self {
        self.close_date = close_date;
        self
    }

    /// Sets the policy code.
    pub fn with_policy(mut self, policy: impl Into<String>) -> Self {
        self.policy = policy.into();
        self
    }

    /// Sets maximum group size and member reserve.
    pub fn with_sizes(mut self, max_group_size: usize, member_reserve: usize) -> Self {
        self.max_group_size = max_group_size;
        self.member_reserve = member_reserve;
        self
    }

    /// Sets the note.
    pub fn with_note(mut self, note: impl Into<String>) -> Self {
        self.note = note.into();
        self
    }

    /// Checks the model for consistency.
    pub fn validate(&self) -> Result<(), ValidationError> {
        if self.code.is_empty() {
            return Err(ValidationError::EmptyCode);
        }
        if self.name.is_empty() {
            return Err(ValidationError::EmptyName);
        }
        if self.begin_date >= self.final_date {
            return Err(ValidationError::BeginNotBeforeFinal {
                begin: self.begin_date,
                final_date: self.final_date,
            });
        }
        if let Some(close) = self.close_date {
            if self.final_date >= close {
                return Err(ValidationError::FinalNotBeforeClose {
                    final_date: self.final_date,
                    close,
                });
            }
        }
        if self.policy.is_empty() {
            return Err(ValidationError::EmptyPolicy);
        }
        if self.max_group_size < 1 {
            return Err(ValidationError::MaxGroupSize);
        }
        Ok(())
    }

    /// State derived from dates only.
    ///
    /// Returns `New`, `Available`, `Final` or `Closed`. `Final` and `Closed`
    /// need refinement by registration and group facts.
    pub fn date_state(&self, now: DateTime<Utc>) -> GroupingState {
        if now < self.begin_date {
            return GroupingState::New;
        }
        if now < self.final_date {
            return GroupingState::Available;
        }
        match self.close_date {
            Some(close) if now >= close => GroupingState::Closed,
            _ => GroupingState::Final,
        }
    }

    /// Whether participants may register at `now`.
    pub fn can_register(&self, now: DateTime<Utc>) -> bool {
        self.date_state(now) == GroupingState::Available
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample(now: DateTime<Utc>) -> Grouping {
        Grouping::new("Study groups", UserKey::new(), now - Duration::days(1))
            .with_code("ABC123")
            .with_final_date(now + Duration::days(1))
    }

    #[test]
    fn test_validate_ok() {
        assert!(sample(Utc::now()).validate().is_ok());
    }

    #[test]
    fn test_validate_errors() {
        let now = Utc::now();
        assert_eq!(
            sample(now).with_code("").validate(),
            Err(ValidationError::EmptyCode)
        );
        let mut g = sample(now);
        g.name.clear();
        assert_eq!(g.validate(), Err(ValidationError::EmptyName));
        assert_eq!(
            sample(now).with_policy("").validate(),
            Err(ValidationError::EmptyPolicy)
        );
        assert_eq!(
            sample(now).with_sizes(0, 0).validate(),
            Err(ValidationError::MaxGroupSize)
        );

        let g = sample(now).with_final_date(now - Duration::days(2));
        assert!(matches!(
            g.validate(),
            Err(ValidationError::BeginNotBeforeFinal { .. })
        ));
        let g = sample(now).with_close_date(Some(now));
        assert!(matches!(
            g.validate(),
            Err(ValidationError::FinalNotBeforeClose { .. })
        ));
    }

    #[test]
    fn test_date_state() {
        let now = Utc::now();
        let g = sample(now);
        assert_eq!(g.date_state(now - Duration::days(2)), GroupingState::New);
        assert_eq!(g.date_state(now), GroupingState::Available);
        assert!(g.can_register(now));
        assert_eq!(g.date_state(now + Duration::days(2)), GroupingState::Final);
        assert!(!g.can_register(now + Duration::days(2)));

        let g = g.with_close_date(Some(now + Duration::days(3)));
        assert_eq!(g.date_state(now + Duration::days(2)), GroupingState::Final);
        assert_eq!(g.date_state(now + Duration::days(3)), GroupingState::Closed);
    }
}

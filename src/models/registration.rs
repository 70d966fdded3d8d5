//! Registration model.
//!
//! A registration is a participant's opt-in to a grouping, carrying the
//! preference payload the grouping's policy consumes.

use serde::{Deserialize, Serialize};

use super::{GroupingKey, User, UserKey, UserPreferences};

/// A participant's registration for a grouping.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Registration {
    /// Grouping registered for.
    pub grouping_key: GroupingKey,
    /// Registered participant.
    pub user_key: UserKey,
    /// Policy-specific preferences.
    pub preferences: UserPreferences,
}

impl Registration {
    /// Creates a registration without preferences.
    pub fn new(grouping_key: GroupingKey, user_key: UserKey) -> Self {
        Self {
            grouping_key,
            user_key,
            preferences: UserPreferences::Empty,
        }
    }

    /// Sets the preferences.
    pub fn with_preferences(mut self, preferences: UserPreferences) -> Self {
        self.preferences = preferences;
        self
    }
}

/// Registered user together with its preferences, as handed to policies.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UserRegistration {
    /// The registered user.
    pub user: User,
    /// The user's preferences.
    pub preferences: UserPreferences,
}

//! Grouping domain models.
//!
//! Provides the data types shared by the partitioner, the policies and the
//! lifecycle: participants, groupings, registrations, preference payloads
//! and formed groups.
//!
//! # Domain Mappings
//!
//! | u-grouping | Classroom | Workshop | Sports league |
//! |------------|-----------|----------|---------------|
//! | Grouping | Project assignment | Breakout session | Season draft |
//! | User | Student | Attendee | Player |
//! | Group | Project team | Table | Team |

mod grouping;
mod preferences;
mod registration;
mod user;

pub use grouping::{Grouping, GroupingKey, ValidationError};
pub use preferences::{
    PreferredPreferences, QuestionnairePreferences, UserPreferences, AGREE, DISAGREE,
    QUESTIONNAIRE_ANSWER_COUNT, STRONGLY_AGREE, STRONGLY_DISAGREE,
};
pub use registration::{Registration, UserRegistration};
pub use user::{User, UserKey};

use std::collections::{BTreeMap, BTreeSet};

/// A formed group: unordered, unique member keys.
pub type Group = BTreeSet<UserKey>;

/// Result of group formation: disjoint groups in policy order.
pub type Groups = Vec<Group>;

/// Input of a policy: every registered user with its preferences.
///
/// Ordered, so that seeded policy runs are reproducible.
pub type PolicyData = BTreeMap<User, UserPreferences>;

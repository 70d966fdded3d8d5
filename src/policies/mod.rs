//! Group formation policies and their registry.
//!
//! A policy maps every registered participant (with preferences) to groups.
//! Policies are addressed by a short code stored with the grouping:
//!
//! | code | name | payload |
//! |------|------|---------|
//! | `RD` | Random | none |
//! | `ID` | Identity | none |
//! | `P1` | Single Preference | preferred peers |
//! | `P2` | Double Preference | preferred peers |
//! | `P3` | Triple Preference | preferred peers |
//! | `SB` | Simple Belbin | questionnaire answers |
//!
//! Unknown codes fall back to [`Policy::Identity`].
//!
//! # Usage
//!
//! ```
//! use rand::rngs::SmallRng;
//! use rand::SeedableRng;
//! use u_grouping::models::{PolicyData, User, UserPreferences};
//! use u_grouping::policies::{get_policy, Policy};
//!
//! let data: PolicyData = (0..5)
//!     .map(|i| (User::new(format!("user-{i}")), UserPreferences::Empty))
//!     .collect();
//! let policy = get_policy("XX");
//! assert_eq!(policy, Policy::Identity);
//!
//! let mut rng = SmallRng::seed_from_u64(42);
//! let groups = policy.form_groups(&data, 3, 0, &mut rng).unwrap();
//! assert_eq!(groups.iter().map(|g| g.len()).collect::<Vec<_>>(), vec![3, 2]);
//! ```

mod preferred;
mod questionnaire;
mod simple;

pub use preferred::{preferred_policy, PreferredRating};
pub use questionnaire::{questionnaire_policy, Answers, QuestionnaireRating};
pub use simple::{identity_policy, random_policy};

use rand::Rng;
use tracing::debug;

use crate::error::Result;
use crate::ga::StopConfig;
use crate::models::{Groups, PolicyData};

/// A group formation policy.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Policy {
    /// Random assignment.
    Random,
    /// Assignment by ident order.
    Identity,
    /// Genetic search keeping up to `n` preferred peers together.
    Preferred(usize),
    /// Genetic search covering questionnaire roles.
    Questionnaire,
}

/// Registered policies: code, display name, policy.
pub const POLICIES: [(&str, &str, Policy); 6] = [
    ("RD", "Random", Policy::Random),
    ("ID", "Identity", Policy::Identity),
    ("P1", "Single Preference", Policy::Preferred(1)),
    ("P2", "Double Preference", Policy::Preferred(2)),
    ("P3", "Triple Preference", Policy::Preferred(3)),
    ("SB", "Simple Belbin", Policy::Questionnaire),
];

/// Returns the policy registered for `code`, or [`Policy::Identity`].
pub fn get_policy(code: &str) -> Policy {
    match POLICIES.iter().find(|(c, _, _)| *c == code) {
        Some(&(_, _, policy)) => policy,
        None => {
            debug!(code, "unknown policy code, using identity policy");
            Policy::Identity
        }
    }
}

/// `(code, name)` of every registered policy, in registry order.
pub fn policy_names() -> Vec<(&'static str, &'static str)> {
    POLICIES.iter().map(|&(code, name, _)| (code, name)).collect()
}

/// Display name of `code`, empty if unknown.
pub fn policy_name(code: &str) -> &'static str {
    POLICIES
        .iter()
        .find(|(c, _, _)| *c == code)
        .map_or("", |&(_, name, _)| name)
}

impl Policy {
    /// Registry code, if this policy is registered.
    pub fn code(&self) -> Option<&'static str> {
        POLICIES
            .iter()
            .find(|(_, _, p)| p == self)
            .map(|&(code, _, _)| code)
    }

    /// Forms groups with the default [`StopConfig`].
    pub fn form_groups<R: Rng>(
        &self,
        data: &PolicyData,
        max_group_size: usize,
        member_reserve: usize,
        rng: &mut R,
    ) -> Result<Groups> {
        self.form_groups_with(data, max_group_size, member_reserve, StopConfig::default(), rng)
    }

    /// Forms groups; `stop` bounds the genetic policies.
    pub fn form_groups_with<R: Rng>(
        &self,
        data: &PolicyData,
        max_group_size: usize,
        member_reserve: usize,
        stop: StopConfig,
        rng: &mut R,
    ) -> Result<Groups> {
        match *self {
            Self::Random => random_policy(data, max_group_size, member_reserve, rng),
            Self::Identity => identity_policy(data, max_group_size, member_reserve),
            Self::Preferred(max_preferred) => {
                preferred_policy(max_preferred, data, max_group_size, member_reserve, stop, rng)
            }
            Self::Questionnaire => {
                questionnaire_policy(data, max_group_size, member_reserve, stop, rng)
            }
        }
    }
}

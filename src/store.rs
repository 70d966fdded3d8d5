//! Persistence interface consumed by the grouping operations.
//!
//! Storage backends implement [`Store`] so the core does not depend on any
//! database engine. Filtering and ordering of bulk listings are the
//! backend's concern.

use thiserror::Error;

use crate::models::{Grouping, GroupingKey, Groups, Registration, UserKey, UserRegistration};

/// Uniform error type for all storage backends.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum StoreError {
    /// The referenced entity does not exist.
    #[error("not found")]
    NotFound,
    /// A unique field already holds this value, e.g. `"Grouping.code"`.
    #[error("duplicate key: {0}")]
    DuplicateKey(String),
    /// Failure inside the storage engine.
    #[error("backend error: {0}")]
    Backend(String),
}

/// Unique field name reported for colliding grouping codes.
pub const GROUPING_CODE_FIELD: &str = "Grouping.code";

/// The storage operations grouping management depends on.
pub trait Store {
    // ───────────────────────────────────── Groupings ──────────────────────────────────────

    /// Add or update a grouping. Fails with
    /// `DuplicateKey(GROUPING_CODE_FIELD)` if another grouping has the code.
    fn set_grouping(&mut self, grouping: Grouping) -> Result<Grouping, StoreError>;

    /// Get grouping by key.
    fn get_grouping(&self, grouping_key: &GroupingKey) -> Result<Option<Grouping>, StoreError>;

    /// Get grouping by short code.
    fn get_grouping_by_code(&self, code: &str) -> Result<Option<Grouping>, StoreError>;

    /// Delete a grouping with its registrations and groups.
    fn delete_grouping(&mut self, grouping_key: &GroupingKey) -> Result<(), StoreError>;

    // ───────────────────────────────────── Registrations ──────────────────────────────────

    /// Add or update a registration.
    fn set_registration(&mut self, registration: Registration) -> Result<Registration, StoreError>;

    /// Delete one registration.
    fn delete_registration(
        &mut self,
        grouping_key: &GroupingKey,
        user_key: &UserKey,
    ) -> Result<(), StoreError>;

    /// Delete all registrations of a grouping; returns how many were deleted.
    fn delete_registrations(&mut self, grouping_key: &GroupingKey) -> Result<usize, StoreError>;

    /// Number of registrations of a grouping.
    fn count_registrations_by_grouping(&self, grouping_key: &GroupingKey)
        -> Result<usize, StoreError>;

    /// Registered users of a grouping together with their preferences.
    fn list_user_registrations_by_grouping(
        &self,
        grouping_key: &GroupingKey,
    ) -> Result<Vec<UserRegistration>, StoreError>;

    // ───────────────────────────────────── Groups ─────────────────────────────────────────

    /// Set or replace the groups formed for a grouping (empty removes them).
    fn set_groups(&mut self, grouping_key: &GroupingKey, groups: Groups) -> Result<(), StoreError>;

    /// Groups formed for a grouping (empty if none).
    fn get_groups(&self, grouping_key: &GroupingKey) -> Result<Groups, StoreError>;
}

//! Crate-wide error type.
//!
//! Partitioning, codec, storage and lifecycle failures all surface as
//! [`Error`]. Degenerate genetic operations (crossover on identical parents,
//! unknown policy codes) are not errors; they fall back silently.

use thiserror::Error;

use crate::lifecycle::{GroupingState, Operation};
use crate::models::{GroupingKey, ValidationError};
use crate::store::StoreError;

/// Result alias used throughout the crate.
pub type Result<T> = std::result::Result<T, Error>;

/// Errors raised by group formation and grouping management.
#[derive(Debug, Error)]
pub enum Error {
    /// Maximum group size is zero while there is something to distribute.
    #[error("max_group_size must be positive (participants: {participants}, reserve: {reserve})")]
    ZeroGroupSize {
        /// Number of participants requested.
        participants: usize,
        /// Member reserve requested.
        reserve: usize,
    },

    /// Participants plus reserve exceed the addressable count.
    #[error("too many participants ({participants}) plus reserve ({reserve})")]
    SizeOverflow {
        /// Number of participants requested.
        participants: usize,
        /// Member reserve requested.
        reserve: usize,
    },

    /// A model failed its consistency check.
    #[error(transparent)]
    Validation(#[from] ValidationError),

    /// No collision-free short code was found.
    #[error("no unique grouping code after {attempts} attempts")]
    CodeOverflow {
        /// Number of codes tried.
        attempts: usize,
    },

    /// The operation is not allowed in the grouping's current state.
    #[error("operation {operation:?} not permitted in state {state:?}")]
    NotPermitted {
        /// Requested operation.
        operation: Operation,
        /// Derived state at the time of the request.
        state: GroupingState,
    },

    /// Grouping key does not resolve to a stored grouping.
    #[error("unknown grouping: {0}")]
    UnknownGrouping(GroupingKey),

    /// No grouping is stored under the short code.
    #[error("unknown grouping code: {0:?}")]
    UnknownCode(String),

    /// Group formation requested without any registration.
    #[error("no registrations for grouping {0}")]
    NoRegistrations(GroupingKey),

    /// The host of a grouping cannot register for it.
    #[error("host cannot register for own grouping {0}")]
    HostRegistration(GroupingKey),

    /// Close date can only be set after the final date.
    #[error("grouping {0} cannot be closed before its final date")]
    CloseBeforeFinal(GroupingKey),

    /// Stored preference code is not known.
    #[error("unknown preference code: {0:?}")]
    UnknownPreferenceCode(String),

    /// Preference payload could not be (de)serialized.
    #[error("preference payload: {0}")]
    Payload(#[from] serde_json::Error),

    /// Persistence collaborator failed.
    #[error(transparent)]
    Store(#[from] StoreError),
}

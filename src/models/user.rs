//! Participant model.
//!
//! Users are identified by an opaque [`UserKey`]; the `ident` is the
//! human-facing name other participants type when stating preferences.

use serde::{Deserialize, Serialize};
use std::fmt;
use uuid::Uuid;

use super::ValidationError;

/// Key to identify a user.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct UserKey(pub Uuid);

impl UserKey {
    /// Creates a fresh random key.
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }
}

impl Default for UserKey {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for UserKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.0.fmt(f)
    }
}

/// A participant (or host) of groupings.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct User {
    /// Unique user key.
    pub key: UserKey,
    /// Identifying name, unique among users.
    pub ident: String,
}

impl User {
    /// Creates a user with a fresh key.
    pub fn new(ident: impl Into<String>) -> Self {
        Self::with_key(UserKey::new(), ident)
    }

    /// Creates a user with a given key.
    pub fn with_key(key: UserKey, ident: impl Into<String>) -> Self {
        Self {
            key,
            ident: ident.into(),
        }
    }

    /// Checks the model for consistency.
    pub fn validate(&self) -> Result<(), ValidationError> {
        if self.ident.is_empty() {
            return Err(ValidationError::EmptyIdent);
        }
        Ok(())
    }
}

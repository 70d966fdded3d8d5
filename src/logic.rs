//! Supporting business logic: short codes and group normalization.
//!
//! # Short codes
//!
//! A grouping is reachable by a six character code over a 32 symbol
//! alphabet without `I`, `L`, `O`, `U`. The code is derived from a SHA-256
//! hash of the grouping's name, dates and policy; on collision, random bytes
//! are mixed in until a free code is found or the attempt budget is spent.

use rand::Rng;
use sha2::{Digest, Sha256};
use std::collections::HashSet;
use tracing::warn;

use crate::error::{Error, Result};
use crate::models::{Group, Grouping, Groups, UserKey};
use crate::store::{Store, StoreError, GROUPING_CODE_FIELD};

/// Code alphabet (Crockford base 32 without check symbols).
pub const CODE_ALPHABET: &[u8; 32] = b"0123456789ABCDEFGHJKMNPQRSTVWXYZ";

/// Length of a grouping code.
pub const CODE_LENGTH: usize = 6;

/// Maximum number of codes tried before giving up.
pub const MAX_CODE_ATTEMPTS: usize = 10;

fn code_hasher(grouping: &Grouping) -> Sha256 {
    let mut sha = Sha256::new();
    sha.update(grouping.name.as_bytes());
    sha.update(grouping.begin_date.date_naive().to_string().as_bytes());
    sha.update(grouping.final_date.date_naive().to_string().as_bytes());
    sha.update(grouping.policy.as_bytes());
    sha
}

fn encode_digest(sha: Sha256) -> String {
    let digest = sha.finalize();
    let mut tail = [0u8; 8];
    tail.copy_from_slice(&digest[digest.len() - 8..]);
    let mut value = u64::from_be_bytes(tail);
    let base = CODE_ALPHABET.len() as u64;
    let mut code = String::with_capacity(CODE_LENGTH);
    for _ in 0..CODE_LENGTH {
        code.push(char::from(CODE_ALPHABET[(value % base) as usize]));
        value /= base;
    }
    code
}

/// Deterministic short code of a grouping.
pub fn make_code(grouping: &Grouping) -> String {
    encode_digest(code_hasher(grouping))
}

/// Short code of a grouping mixed with random bytes.
pub fn make_unique_code<R: Rng>(grouping: &Grouping, rng: &mut R) -> String {
    let mut sha = code_hasher(grouping);
    sha.update(rng.random::<[u8; 8]>());
    encode_digest(sha)
}

/// Normalizes user input of a code: trims, uppercases, and maps the
/// look-alikes `I`, `L` to `1`, `O` to `0`, `U` to `V`.
pub fn normalize_code(input: &str) -> String {
    input
        .trim()
        .chars()
        .map(|c| match c.to_ascii_uppercase() {
            'I' | 'L' => '1',
            'O' => '0',
            'U' => 'V',
            other => other,
        })
        .collect()
}

/// Stores `grouping` under a fresh, collision-free code.
///
/// The deterministic code is tried first, then random variants. Only code
/// collisions are retried; other storage errors propagate.
///
/// # Errors
/// [`Error::CodeOverflow`] after [`MAX_CODE_ATTEMPTS`] collisions.
pub fn assign_new_code<S: Store, R: Rng>(
    store: &mut S,
    grouping: Grouping,
    rng: &mut R,
) -> Result<Grouping> {
    for attempt in 0..MAX_CODE_ATTEMPTS {
        let code = if attempt == 0 {
            make_code(&grouping)
        } else {
            make_unique_code(&grouping, rng)
        };
        let candidate = Grouping {
            code,
            ..grouping.clone()
        };
        match store.set_grouping(candidate) {
            Ok(stored) => return Ok(stored),
            Err(StoreError::DuplicateKey(field)) if field == GROUPING_CODE_FIELD => {
                warn!(attempt, grouping = %grouping.key, "grouping code collision");
            }
            Err(err) => return Err(err.into()),
        }
    }
    Err(Error::CodeOverflow {
        attempts: MAX_CODE_ATTEMPTS,
    })
}

/// Number of members in all groups.
pub fn len_groups(groups: &Groups) -> usize {
    groups.iter().map(|group| group.len()).sum()
}

/// Removes `user_keys` from `groups`; groups that become empty are dropped.
///
/// Each key is removed from the first group containing it only.
pub fn remove_from_groups(groups: &Groups, user_keys: &HashSet<UserKey>) -> Groups {
    let mut remaining = user_keys.clone();
    let mut result = Groups::with_capacity(groups.len());
    for group in groups {
        let both: Vec<UserKey> = group.iter().filter(|m| remaining.contains(m)).copied().collect();
        if both.is_empty() {
            result.push(group.clone());
            continue;
        }
        let reduced: Group = group.iter().filter(|m| !both.contains(m)).copied().collect();
        if !reduced.is_empty() {
            result.push(reduced);
        }
        for key in &both {
            remaining.remove(key);
        }
    }
    result
}

/// Normalizes groups: members sorted, groups sorted lexicographically.
pub fn sort_groups(groups: Groups) -> Groups {
    let mut groups = groups;
    groups.sort();
    groups
}

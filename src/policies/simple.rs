//! Deterministic and random policies.
//!
//! Both order the users first (by ident descending, or shuffled) and then
//! cut groups from the end of the list, so the first group holds the last
//! users of the ordering.

use rand::seq::SliceRandom;
use rand::Rng;

use crate::error::Result;
use crate::models::{Groups, PolicyData, User};
use crate::sizes::group_sizes;

/// Cuts `users` into groups, taking each group from the end of the list.
fn build_groups(mut users: Vec<&User>, max_group_size: usize, member_reserve: usize) -> Result<Groups> {
    let sizes = group_sizes(users.len(), max_group_size, member_reserve)?;
    let mut groups = Groups::with_capacity(sizes.len());
    for size in sizes {
        let split = users.len().saturating_sub(size);
        groups.push(users.drain(split..).map(|user| user.key).collect());
    }
    Ok(groups)
}

/// Groups users by ident: the lowest idents form the first group.
pub fn identity_policy(
    data: &PolicyData,
    max_group_size: usize,
    member_reserve: usize,
) -> Result<Groups> {
    let mut users: Vec<&User> = data.keys().collect();
    users.sort_by(|a, b| b.ident.cmp(&a.ident));
    build_groups(users, max_group_size, member_reserve)
}

/// Groups users randomly.
pub fn random_policy<R: Rng>(
    data: &PolicyData,
    max_group_size: usize,
    member_reserve: usize,
    rng: &mut R,
) -> Result<Groups> {
    let mut users: Vec<&User> = data.keys().collect();
    users.shuffle(rng);
    build_groups(users, max_group_size, member_reserve)
}

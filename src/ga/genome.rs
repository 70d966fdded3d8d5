//! Group-partition genome with crossover and mutation.
//!
//! # Encoding
//!
//! A genome is an ordered list of member lists, one per target group.
//! Reading all groups in order gives a permutation of the participants;
//! the group boundaries are fixed by the size vector and never change
//! during the search.
//!
//! # Operators
//!
//! - **Crossover**: global order recombination. A prefix of parent 1 (in
//!   genome order) is kept, the rest is filled from parent 2 in its order,
//!   and the result is re-sliced with parent 1's group sizes.
//! - **Mutation**: swaps one member between two distinct groups.
//!
//! Both operators preserve per-group cardinality and the member set.

use rand::Rng;
use std::collections::HashSet;

use crate::models::{Group, Groups, UserKey};

/// Candidate partition used during the genetic search.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Genome {
    groups: Vec<Vec<UserKey>>,
}

impl Genome {
    /// Builds a genome by slicing `users` consecutively into `sizes`.
    ///
    /// If `users` runs short, the remaining groups are truncated or empty.
    pub fn build(users: &[UserKey], sizes: &[usize]) -> Self {
        let mut groups = Vec::with_capacity(sizes.len());
        let mut pos = 0;
        for &size in sizes {
            let start = pos.min(users.len());
            let end = (pos + size).min(users.len());
            groups.push(users[start..end].to_vec());
            pos += size;
        }
        Self { groups }
    }

    /// Member lists in group order.
    pub fn groups(&self) -> &[Vec<UserKey>] {
        &self.groups
    }

    /// Number of groups.
    pub fn group_count(&self) -> usize {
        self.groups.len()
    }

    /// Total number of members.
    pub fn member_count(&self) -> usize {
        self.groups.iter().map(Vec::len).sum()
    }

    /// Per-group member counts.
    pub fn sizes(&self) -> Vec<usize> {
        self.groups.iter().map(Vec::len).collect()
    }

    /// All members in genome order.
    pub fn members(&self) -> impl Iterator<Item = &UserKey> + Clone + '_ {
        self.groups.iter().flatten()
    }

    /// The first `count` members in genome order.
    pub fn iter_count(&self, count: usize) -> impl Iterator<Item = &UserKey> + Clone + '_ {
        self.members().take(count)
    }

    /// Members in genome order, skipping those in `exclude`.
    pub fn iter_excluding<'a>(
        &'a self,
        exclude: &'a HashSet<UserKey>,
    ) -> impl Iterator<Item = &'a UserKey> + Clone + 'a {
        self.members().filter(move |member| !exclude.contains(member))
    }

    /// Converts into immutable groups.
    pub fn into_groups(self) -> Groups {
        self.groups
            .into_iter()
            .map(|group| group.into_iter().collect::<Group>())
            .collect()
    }
}

// ======================== Operators ========================

/// Combines two genomes into a child with `genome_1`'s group sizes.
///
/// Returns `None` when no combination is possible: identical parents,
/// fewer than two groups, or fewer than two members.
pub fn crossover<R: Rng>(
    genome_1: &Genome,
    genome_2: &Genome,
    user_count: usize,
    rng: &mut R,
) -> Option<Genome> {
    if genome_1 == genome_2 || genome_1.group_count() < 2 || user_count < 2 {
        return None;
    }
    let split = rng.random_range(1..user_count);
    let mut users: Vec<UserKey> = genome_1.iter_count(split).copied().collect();
    let prefix: HashSet<UserKey> = users.iter().copied().collect();
    users.extend(genome_2.iter_excluding(&prefix).copied());
    Some(Genome::build(&users, &genome_1.sizes()))
}

/// Returns a copy of `genome` with one member swapped between two groups.
///
/// Genomes with fewer than two groups, or where a drawn group is empty,
/// are returned unchanged.
pub fn mutate<R: Rng>(genome: &Genome, rng: &mut R) -> Genome {
    let group_count = genome.group_count();
    if group_count < 2 {
        return genome.clone();
    }
    let group_1 = rng.random_range(0..group_count);
    let mut group_2 = rng.random_range(0..group_count);
    if group_1 == group_2 {
        group_2 = (group_1 + 1) % group_count;
    }

    let len_1 = genome.groups[group_1].len();
    let len_2 = genome.groups[group_2].len();
    if len_1 == 0 || len_2 == 0 {
        return genome.clone();
    }
    let pos_1 = rng.random_range(0..len_1);
    let pos_2 = rng.random_range(0..len_2);

    let mut mutated = genome.clone();
    let user_1 = mutated.groups[group_1][pos_1];
    mutated.groups[group_1][pos_1] = mutated.groups[group_2][pos_2];
    mutated.groups[group_2][pos_2] = user_1;
    mutated
}

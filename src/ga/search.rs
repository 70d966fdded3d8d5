//! Genetic search main loop.
//!
//! # Algorithm
//!
//! 1. Strip trailing zero-size groups; with fewer than two non-empty
//!    groups the answer is trivial and no search runs.
//! 2. `population = min(100, groups * users * 2)` random genomes.
//! 3. Every round: add rated crossover children (`users` attempts), add
//!    rated mutations (`users + population` draws), cull back to the
//!    population size, re-sort.
//! 4. Stop when the [`StopStrategy`] says so; return the best genome,
//!    padded with empty groups to the requested group count.

use rand::Rng;
use tracing::debug;

use super::population::{rate_all, Population};
use super::stop::{Clock, StopStrategy};
use super::{RatingFunction, MAX_POPULATION_SIZE};
use crate::models::{Group, Groups, UserKey};

/// Searches the partition of `users` into `sizes` with the lowest rating.
///
/// The result has exactly `sizes.len()` groups (at least one if `users`
/// is not empty).
///
/// # Example
/// ```
/// use rand::rngs::SmallRng;
/// use rand::SeedableRng;
/// use u_grouping::ga::{search, Genome, StopConfig, StopStrategy};
/// use u_grouping::models::UserKey;
///
/// let users: Vec<UserKey> = (0..9).map(|_| UserKey::new()).collect();
/// let mut stop = StopStrategy::new(StopConfig::default().with_max_rounds(1));
/// let mut rng = SmallRng::seed_from_u64(42);
/// let groups = search(&users, &[5, 4], &|_: &Genome| 0.0, &mut stop, &mut rng);
/// assert_eq!(groups.len(), 2);
/// assert_eq!(groups[0].len(), 5);
/// ```
pub fn search<F, C, R>(
    users: &[UserKey],
    sizes: &[usize],
    rating: &F,
    stop: &mut StopStrategy<C>,
    rng: &mut R,
) -> Groups
where
    F: RatingFunction,
    C: Clock,
    R: Rng,
{
    let num_groups = sizes.len();
    let filled = sizes.iter().rposition(|&size| size > 0).map_or(0, |pos| pos + 1);
    let sizes = &sizes[..filled];
    if sizes.len() < 2 {
        return trivial_groups(users, num_groups);
    }

    let user_count = users.len();
    let population_size = MAX_POPULATION_SIZE.min(sizes.len() * user_count * 2);
    let mut population = Population::initial(population_size, users, sizes, rating, rng);

    let num_crossover = user_count;
    let num_mutation = user_count + population_size;

    stop.start();
    while stop.should_continue(population.best_rating()) {
        let children = population.crossover(num_crossover, user_count, rng);
        population.extend(rate_all(rating, children));

        let (mutated, parent_ratings): (Vec<_>, Vec<_>) =
            population.mutate(num_mutation, rng).into_iter().unzip();
        let rated = rate_all(rating, mutated);
        let improved = rated
            .iter()
            .zip(&parent_ratings)
            .filter(|(child, parent)| child.rating < **parent)
            .count();
        population.extend(rated);

        population.reduce(population_size, rng);
        population.settle();
        debug!(
            round = stop.rounds(),
            best = population.best_rating(),
            improved,
            "genetic search round"
        );
    }

    debug!(
        rounds = stop.rounds(),
        best = population.best_rating(),
        users = user_count,
        groups = num_groups,
        "genetic search finished"
    );
    best_groups(&population, users, num_groups)
}

fn pad(mut groups: Groups, num_groups: usize) -> Groups {
    if groups.len() < num_groups {
        groups.resize_with(num_groups, Group::new);
    }
    groups
}

/// All users in one group, padded with empty groups.
fn trivial_groups(users: &[UserKey], num_groups: usize) -> Groups {
    if users.is_empty() && num_groups == 0 {
        return Groups::new();
    }
    pad(vec![users.iter().copied().collect()], num_groups)
}

fn best_groups(population: &Population, users: &[UserKey], num_groups: usize) -> Groups {
    match population.best() {
        Some(best) => pad(best.genome.clone().into_groups(), num_groups),
        None => trivial_groups(users, num_groups),
    }
}

//! Rated genomes and population management.
//!
//! The population is a vector kept sorted by rating after every
//! reduction, so the best genome is always at the front.
//!
//! Reduction is a randomized pairwise tournament: two distinct random
//! members are compared and the worse one is removed, until the target
//! size is reached. It is not a strict top-k cut; a good genome can be
//! lost to a better one while a worse genome survives elsewhere.

use rand::seq::{IndexedRandom, SliceRandom};
use rand::Rng;
use std::cmp::Ordering;

use super::genome::{crossover, mutate, Genome};
use super::{Rating, RatingFunction};
use crate::models::UserKey;

#[cfg(feature = "parallel")]
use rayon::prelude::*;

/// A genome together with its rating (lower is better).
#[derive(Debug, Clone, PartialEq)]
pub struct RatedGenome {
    /// Rating of `genome`.
    pub rating: Rating,
    /// The rated genome.
    pub genome: Genome,
}

impl RatedGenome {
    fn cmp_rating(&self, other: &Self) -> Ordering {
        self.rating.total_cmp(&other.rating)
    }
}

/// Rates a batch of genomes, keeping input order.
pub fn rate_all<F: RatingFunction>(rating: &F, genomes: Vec<Genome>) -> Vec<RatedGenome> {
    #[cfg(feature = "parallel")]
    let iter = genomes.into_par_iter();
    #[cfg(not(feature = "parallel"))]
    let iter = genomes.into_iter();

    iter.map(|genome| RatedGenome {
        rating: rating.rate(&genome),
        genome,
    })
    .collect()
}

/// Collection of rated genomes, best first after [`Population::settle`].
#[derive(Debug, Clone, Default)]
pub struct Population {
    members: Vec<RatedGenome>,
}

impl Population {
    /// Builds `size` random genomes by shuffling `users` and slicing with
    /// `sizes`, rates them, and orders them best first.
    pub fn initial<F: RatingFunction, R: Rng>(
        size: usize,
        users: &[UserKey],
        sizes: &[usize],
        rating: &F,
        rng: &mut R,
    ) -> Self {
        let mut user_list = users.to_vec();
        let genomes = (0..size)
            .map(|_| {
                user_list.shuffle(rng);
                Genome::build(&user_list, sizes)
            })
            .collect();
        let mut population = Self {
            members: rate_all(rating, genomes),
        };
        population.settle();
        population
    }

    /// Number of genomes.
    pub fn len(&self) -> usize {
        self.members.len()
    }

    /// Whether the population is empty.
    pub fn is_empty(&self) -> bool {
        self.members.is_empty()
    }

    /// Rated genomes in current order.
    pub fn members(&self) -> &[RatedGenome] {
        &self.members
    }

    /// Best genome. Only meaningful after [`Population::settle`].
    pub fn best(&self) -> Option<&RatedGenome> {
        self.members.first()
    }

    /// Rating of the best genome, `+inf` if empty.
    pub fn best_rating(&self) -> Rating {
        self.best().map_or(Rating::INFINITY, |rated| rated.rating)
    }

    /// Adds rated genomes (order is restored by the next settle).
    pub fn extend(&mut self, rated: impl IntoIterator<Item = RatedGenome>) {
        self.members.extend(rated);
    }

    /// Sorts best first.
    pub fn settle(&mut self) {
        self.members.sort_by(RatedGenome::cmp_rating);
    }

    /// Mutates `count` randomly drawn genomes (with replacement).
    ///
    /// Returns each mutated genome with its parent's rating; the caller
    /// rates the children.
    pub fn mutate<R: Rng>(&self, count: usize, rng: &mut R) -> Vec<(Genome, Rating)> {
        let mut mutated = Vec::with_capacity(count);
        for _ in 0..count {
            let Some(parent) = self.members.choose(rng) else {
                break;
            };
            mutated.push((mutate(&parent.genome, rng), parent.rating));
        }
        mutated
    }

    /// Attempts `count` crossovers, each between two distinct random
    /// genomes. Only successful children are returned.
    pub fn crossover<R: Rng>(&self, count: usize, user_count: usize, rng: &mut R) -> Vec<Genome> {
        if self.members.len() < 2 {
            return Vec::new();
        }
        let mut children = Vec::new();
        for _ in 0..count {
            let parents = rand::seq::index::sample(rng, self.members.len(), 2);
            let genome_1 = &self.members[parents.index(0)].genome;
            let genome_2 = &self.members[parents.index(1)].genome;
            if let Some(child) = crossover(genome_1, genome_2, user_count, rng) {
                children.push(child);
            }
        }
        children
    }

    /// Shrinks to `target` genomes by randomized pairwise elimination of
    /// the worse genome.
    pub fn reduce<R: Rng>(&mut self, target: usize, rng: &mut R) {
        while self.members.len() > target.max(1) {
            let len = self.members.len();
            let pos_1 = rng.random_range(0..len);
            let pos_2 = rng.random_range(0..len);
            if pos_1 == pos_2 {
                continue;
            }
            let worse = if self.members[pos_1].rating < self.members[pos_2].rating {
                pos_2
            } else {
                pos_1
            };
            self.members.swap_remove(worse);
        }
        if target == 0 {
            self.members.clear();
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::rngs::SmallRng;
    use rand::SeedableRng;
    use uuid::Uuid;

    fn userkeys(count: usize) -> Vec<UserKey> {
        (0..count)
            .map(|i| UserKey(Uuid::from_u128(256 + i as u128)))
            .collect()
    }

    /// Counts members sitting in a group other than their natural slot.
    fn misplaced(genome: &Genome) -> Rating {
        let mut rating = 0.0;
        let mut max_id = 256;
        for group in genome.groups() {
            max_id += group.len() as u128;
            rating += group.iter().filter(|m| m.0.as_u128() >= max_id).count() as Rating;
        }
        rating
    }

    #[test]
    fn test_initial_population_sorted() {
        let mut rng = SmallRng::seed_from_u64(42);
        let users = userkeys(12);
        let population = Population::initial(30, &users, &[4, 4, 4], &misplaced, &mut rng);
        assert_eq!(population.len(), 30);
        assert!(population
            .members()
            .windows(2)
            .all(|w| w[0].rating <= w[1].rating));
        for rated in population.members() {
            assert_eq!(rated.genome.sizes(), vec![4, 4, 4]);
            assert_eq!(rated.rating, misplaced(&rated.genome));
        }
    }

    #[test]
    fn test_mutate_population() {
        let mut rng = SmallRng::seed_from_u64(42);
        let users = userkeys(9);
        let population = Population::initial(10, &users, &[5, 4], &misplaced, &mut rng);
        let mutated = population.mutate(25, &mut rng);
        assert_eq!(mutated.len(), 25);
        for (genome, parent_rating) in &mutated {
            assert_eq!(genome.sizes(), vec![5, 4]);
            assert!(population
                .members()
                .iter()
                .any(|rated| rated.rating == *parent_rating));
        }
        assert!(Population::default().mutate(5, &mut rng).is_empty());
    }

    #[test]
    fn test_crossover_population() {
        let mut rng = SmallRng::seed_from_u64(42);
        let users = userkeys(9);
        let population = Population::initial(10, &users, &[5, 4], &misplaced, &mut rng);
        let children = population.crossover(20, users.len(), &mut rng);
        assert!(children.len() <= 20);
        assert!(!children.is_empty());
        for child in &children {
            assert_eq!(child.sizes(), vec![5, 4]);
        }
    }

    #[test]
    fn test_reduce_population() {
        let mut rng = SmallRng::seed_from_u64(42);
        let users = userkeys(10);
        let mut population = Population::initial(50, &users, &[5, 5], &misplaced, &mut rng);
        let worst = population.members().last().map(|r| r.rating).unwrap();
        let best = population.best_rating();

        population.reduce(10, &mut rng);
        population.settle();
        assert_eq!(population.len(), 10);
        assert!(population.best_rating() >= best);
        assert!(population.best_rating() <= worst);

        population.reduce(0, &mut rng);
        assert!(population.is_empty());
        assert_eq!(population.best_rating(), Rating::INFINITY);
    }

    #[test]
    fn test_rate_all_keeps_order() {
        let users = userkeys(6);
        let genomes = vec![
            Genome::build(&users, &[3, 3]),
            Genome::build(&users.iter().rev().copied().collect::<Vec<_>>(), &[3, 3]),
        ];
        let rated = rate_all(&misplaced, genomes.clone());
        assert_eq!(rated[0].genome, genomes[0]);
        assert_eq!(rated[0].rating, 0.0);
        assert_eq!(rated[1].genome, genomes[1]);
        assert_eq!(rated[1].rating, 3.0);
    }
}

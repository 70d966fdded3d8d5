//! GA-based group formation.
//!
//! Minimizes a caller-supplied rating over all partitions of the
//! participants into groups of fixed sizes.
//!
//! # Encoding
//!
//! A [`Genome`] is an ordered list of member lists. Flattened, it is a
//! permutation of the participants; the size vector cuts it into groups.
//! Crossover and mutation preserve every group's cardinality.
//!
//! # Submodules
//!
//! - `genome`: encoding, crossover, mutation
//! - `population`: rated genomes, population steps, randomized culling
//! - `stop`: termination control with an injectable clock
//! - `search`: the main loop
//!
//! # Reference
//! - Falkenauer (1998), "Genetic Algorithms and Grouping Problems"
//! - Davis (1985), "Applying Adaptive Algorithms to Epistatic Domains" (order crossover)

mod genome;
mod population;
mod search;
mod stop;

pub use genome::{crossover, mutate, Genome};
pub use population::{rate_all, Population, RatedGenome};
pub use search::search;
pub use stop::{Clock, ManualClock, MonotonicClock, StopConfig, StopStrategy};

/// Rating of a genome. Lower = better (minimization convention).
pub type Rating = f64;

/// Upper bound of the population size.
pub const MAX_POPULATION_SIZE: usize = 100;

/// Rates a genome; lower is better.
///
/// Implemented by the policy rating data types and by any
/// `Fn(&Genome) -> Rating` closure.
pub trait RatingFunction: Sync {
    /// Returns the rating of `genome`.
    fn rate(&self, genome: &Genome) -> Rating;
}

impl<F> RatingFunction for F
where
    F: Fn(&Genome) -> Rating + Sync,
{
    fn rate(&self, genome: &Genome) -> Rating {
        self(genome)
    }
}

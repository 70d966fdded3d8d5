//! Termination control for the genetic search.
//!
//! [`StopStrategy`] combines three conditions, checked every round in this
//! order; the first to trigger ends the search:
//!
//! 1. round budget (`max_rounds`)
//! 2. plateau: no improvement for more than `max_best_rounds` rounds
//! 3. time budget (`max_seconds`, read from a monotonic [`Clock`])

use serde::{Deserialize, Serialize};
use std::cell::Cell;
use std::time::{Duration, Instant};

use super::Rating;

/// Thresholds of a [`StopStrategy`].
///
/// # Defaults
///
/// ```
/// use u_grouping::ga::StopConfig;
///
/// let config = StopConfig::default();
/// assert_eq!(config.max_rounds, 500);
/// assert_eq!(config.max_best_rounds, 50);
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct StopConfig {
    /// Rating a search has to beat to count as improvement.
    pub initial_rating: Rating,
    /// Maximum number of rounds.
    pub max_rounds: usize,
    /// Maximum number of consecutive rounds without improvement.
    pub max_best_rounds: usize,
    /// Wall-clock budget in seconds.
    pub max_seconds: f64,
}

impl Default for StopConfig {
    fn default() -> Self {
        Self {
            initial_rating: 1_000_000.0,
            max_rounds: 500,
            max_best_rounds: 50,
            max_seconds: 0.5,
        }
    }
}

impl StopConfig {
    /// Sets the initial rating.
    pub fn with_initial_rating(mut self, rating: Rating) -> Self {
        self.initial_rating = rating;
        self
    }

    /// Sets the round budget.
    pub fn with_max_rounds(mut self, n: usize) -> Self {
        self.max_rounds = n;
        self
    }

    /// Sets the plateau limit.
    pub fn with_max_best_rounds(mut self, n: usize) -> Self {
        self.max_best_rounds = n;
        self
    }

    /// Sets the time budget in seconds.
    pub fn with_max_seconds(mut self, seconds: f64) -> Self {
        self.max_seconds = seconds.max(0.0);
        self
    }
}

/// Monotonic time source.
pub trait Clock {
    /// Time elapsed since an arbitrary fixed origin.
    fn now(&self) -> Duration;
}

/// [`Clock`] backed by [`Instant`].
#[derive(Debug, Clone, Copy)]
pub struct MonotonicClock {
    origin: Instant,
}

impl Default for MonotonicClock {
    fn default() -> Self {
        Self {
            origin: Instant::now(),
        }
    }
}

impl Clock for MonotonicClock {
    fn now(&self) -> Duration {
        self.origin.elapsed()
    }
}

/// [`Clock`] advanced by hand, for tests and simulations.
#[derive(Debug, Default)]
pub struct ManualClock {
    now: Cell<Duration>,
}

impl ManualClock {
    /// Creates a clock at zero.
    pub fn new() -> Self {
        Self::default()
    }

    /// Moves the clock forward.
    pub fn advance(&self, by: Duration) {
        self.now.set(self.now.get() + by);
    }
}

impl Clock for ManualClock {
    fn now(&self) -> Duration {
        self.now.get()
    }
}

impl<C: Clock + ?Sized> Clock for &C {
    fn now(&self) -> Duration {
        (**self).now()
    }
}

/// Decides when the genetic search stops.
///
/// Must be [`start`](StopStrategy::start)ed before each independent run;
/// a reused strategy otherwise carries its counters over.
///
/// # Example
///
/// ```
/// use u_grouping::ga::{StopConfig, StopStrategy};
///
/// let mut stop = StopStrategy::new(StopConfig::default().with_max_rounds(3));
/// stop.start();
/// assert!(stop.should_continue(10.0));
/// assert!(stop.should_continue(9.0));
/// assert!(!stop.should_continue(8.0));
/// ```
#[derive(Debug)]
pub struct StopStrategy<C: Clock = MonotonicClock> {
    config: StopConfig,
    clock: C,
    best_rating: Rating,
    best_rounds: usize,
    rounds: usize,
    started: Duration,
}

impl StopStrategy<MonotonicClock> {
    /// Creates a strategy reading the system's monotonic clock.
    pub fn new(config: StopConfig) -> Self {
        Self::with_clock(config, MonotonicClock::default())
    }
}

impl Default for StopStrategy<MonotonicClock> {
    fn default() -> Self {
        Self::new(StopConfig::default())
    }
}

impl<C: Clock> StopStrategy<C> {
    /// Creates a strategy reading `clock`.
    pub fn with_clock(config: StopConfig, clock: C) -> Self {
        let started = clock.now();
        Self {
            config,
            clock,
            best_rating: config.initial_rating,
            best_rounds: 0,
            rounds: 0,
            started,
        }
    }

    /// Resets counters and the start time; thresholds stay.
    pub fn start(&mut self) {
        self.best_rating = self.config.initial_rating;
        self.best_rounds = 0;
        self.rounds = 0;
        self.started = self.clock.now();
    }

    /// Records one round with the current best `rating` and tells whether
    /// the search should go on.
    pub fn should_continue(&mut self, rating: Rating) -> bool {
        self.rounds += 1;
        if self.rounds >= self.config.max_rounds {
            return false;
        }
        if rating < self.best_rating {
            self.best_rating = rating;
            self.best_rounds = 0;
        } else {
            self.best_rounds += 1;
            if self.best_rounds > self.config.max_best_rounds {
                return false;
            }
        }
        let elapsed = self.clock.now().saturating_sub(self.started);
        elapsed.as_secs_f64() < self.config.max_seconds
    }

    /// Configured thresholds.
    pub fn config(&self) -> &StopConfig {
        &self.config
    }

    /// Rounds since the last start.
    pub fn rounds(&self) -> usize {
        self.rounds
    }

    /// Rounds since the last improvement.
    pub fn best_rounds(&self) -> usize {
        self.best_rounds
    }

    /// Best rating seen since the last start.
    pub fn best_rating(&self) -> Rating {
        self.best_rating
    }
}

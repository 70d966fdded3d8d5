//! Group formation for the U-Engine ecosystem.
//!
//! Partitions the registered participants of a grouping into groups of
//! bounded size, either directly (random or identity order) or by a genetic
//! search driven by participant preferences.
//!
//! # Modules
//!
//! - **`sizes`**: Group size partitioner (`group_sizes`)
//! - **`ga`**: Genetic search: `Genome`, `Population`, `StopStrategy`, `search`
//! - **`policies`**: Policy registry: Random, Identity, Preference, Simple Belbin
//! - **`models`**: Domain types: `User`, `Grouping`, `Registration`, `UserPreferences`
//! - **`lifecycle`**: Derived grouping states and operation gating
//! - **`logic`**: Short codes and group normalization
//! - **`store`**: Persistence interface
//! - **`service`**: State-gated grouping operations
//!
//! # Architecture
//!
//! Core algorithms (`sizes`, `ga`, `policies`) are pure and take an explicit
//! random source. Grouping management (`lifecycle`, `service`) depends only
//! on the [`store::Store`] trait and an explicit current time.
//!
//! # References
//!
//! - Holland (1975), "Adaptation in Natural and Artificial Systems"
//! - Belbin (1981), "Management Teams: Why They Succeed or Fail"

pub mod error;
pub mod ga;
pub mod lifecycle;
pub mod logic;
pub mod models;
pub mod policies;
pub mod service;
pub mod sizes;
pub mod store;

pub use error::{Error, Result};

//! Policy that groups participants with the peers they prefer.
//!
//! Each participant names up to `max_preferred` peers by ident. A genome is
//! rated by summing, for every member, the squared number of preferred peers
//! that ended up in another group.

use rand::Rng;
use std::collections::{HashMap, HashSet};

use crate::error::Result;
use crate::ga::{search, Genome, Rating, RatingFunction, StopConfig, StopStrategy};
use crate::models::{Groups, PolicyData, UserKey, UserPreferences};
use crate::sizes::group_sizes;

/// Resolved preferred peers of every participant.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PreferredRating {
    peers: HashMap<UserKey, HashSet<UserKey>>,
}

impl PreferredRating {
    /// Resolves the preferred idents of every participant.
    ///
    /// Only the first `max_preferred` idents count; idents without a
    /// registered user are dropped. Participants without a preferred
    /// payload get an empty set.
    pub fn new(data: &PolicyData, max_preferred: usize) -> Self {
        let by_ident: HashMap<&str, UserKey> =
            data.keys().map(|user| (user.ident.as_str(), user.key)).collect();
        let peers = data
            .iter()
            .map(|(user, preferences)| {
                let wanted = match preferences {
                    UserPreferences::Preferred(p) => p
                        .preferred
                        .iter()
                        .take(max_preferred)
                        .filter_map(|ident| by_ident.get(ident.as_str()).copied())
                        .collect(),
                    _ => HashSet::new(),
                };
                (user.key, wanted)
            })
            .collect();
        Self { peers }
    }

    /// Preferred peers of `user`.
    pub fn peers(&self, user: &UserKey) -> Option<&HashSet<UserKey>> {
        self.peers.get(user)
    }
}

impl RatingFunction for PreferredRating {
    fn rate(&self, genome: &Genome) -> Rating {
        let mut rating = 0.0;
        for group in genome.groups() {
            let group_set: HashSet<&UserKey> = group.iter().collect();
            for member in group {
                let missing = self
                    .peers
                    .get(member)
                    .map_or(0, |peers| peers.iter().filter(|p| !group_set.contains(p)).count());
                rating += (missing as Rating).powi(2);
            }
        }
        rating
    }
}

/// Forms groups that keep preferred peers together.
pub fn preferred_policy<R: Rng>(
    max_preferred: usize,
    data: &PolicyData,
    max_group_size: usize,
    member_reserve: usize,
    stop: StopConfig,
    rng: &mut R,
) -> Result<Groups> {
    let users: Vec<UserKey> = data.keys().map(|user| user.key).collect();
    let sizes = group_sizes(users.len(), max_group_size, member_reserve)?;
    let rating = PreferredRating::new(data, max_preferred);
    let mut stop = StopStrategy::new(stop);
    Ok(search(&users, &sizes, &rating, &mut stop, rng))
}

//! State-gated grouping operations over a [`Store`].
//!
//! Every operation derives the current [`GroupingState`] first and refuses
//! with [`Error::NotPermitted`] when the state does not allow it. Time is
//! passed in explicitly, randomness too.
//!
//! # Example
//!
//! A grouping moves from registration to fastened groups:
//!
//! ```text
//! create_grouping ─▶ register ... ─▶ start_grouping ─▶ fasten_groups ─▶ close_grouping
//! ```

use chrono::{DateTime, Utc};
use rand::Rng;
use std::collections::HashSet;
use tracing::info;

use crate::error::{Error, Result};
use crate::lifecycle::{self, GroupingFacts, GroupingState, Operation};
use crate::logic::{assign_new_code, make_code, normalize_code, remove_from_groups, sort_groups};
use crate::models::{
    Grouping, GroupingKey, Groups, PolicyData, Registration, UserKey, UserPreferences,
};
use crate::policies::get_policy;
use crate::store::Store;

// ================================ State ================================

/// Derives the state of the grouping stored under `grouping_key`.
///
/// Unknown keys yield [`GroupingState::Unknown`].
pub fn grouping_state<S: Store>(
    store: &S,
    grouping_key: &GroupingKey,
    now: DateTime<Utc>,
) -> Result<GroupingState> {
    let grouping = store.get_grouping(grouping_key)?;
    state_of(store, grouping.as_ref(), now)
}

fn state_of<S: Store>(
    store: &S,
    grouping: Option<&Grouping>,
    now: DateTime<Utc>,
) -> Result<GroupingState> {
    let Some(grouping) = grouping else {
        return Ok(GroupingState::Unknown);
    };
    let facts = GroupingFacts {
        has_groups: !store.get_groups(&grouping.key)?.is_empty(),
        registration_count: store.count_registrations_by_grouping(&grouping.key)?,
    };
    Ok(lifecycle::grouping_state(Some(grouping), facts, now))
}

/// Loads the grouping and checks that `operation` is permitted.
fn permitted<S: Store>(
    store: &S,
    grouping_key: &GroupingKey,
    operation: Operation,
    now: DateTime<Utc>,
) -> Result<Grouping> {
    let grouping = store
        .get_grouping(grouping_key)?
        .ok_or(Error::UnknownGrouping(*grouping_key))?;
    let state = state_of(store, Some(&grouping), now)?;
    if !state.permits(operation) {
        return Err(Error::NotPermitted { operation, state });
    }
    Ok(grouping)
}

/// Resolves a short code typed by a participant.
///
/// The code is normalized first, so case and look-alike characters do not
/// matter. Only groupings still open for registration (`New`, `Available`)
/// are handed out.
pub fn grouping_by_code<S: Store>(store: &S, code: &str, now: DateTime<Utc>) -> Result<Grouping> {
    let code = normalize_code(code);
    let grouping = store
        .get_grouping_by_code(&code)?
        .ok_or(Error::UnknownCode(code))?;
    permitted(store, &grouping.key, Operation::ShowLink, now)
}

// ================================ Groupings ================================

/// Validates and stores a new grouping under a fresh short code.
pub fn create_grouping<S: Store, R: Rng>(
    store: &mut S,
    grouping: Grouping,
    rng: &mut R,
) -> Result<Grouping> {
    let grouping = Grouping {
        code: make_code(&grouping),
        ..grouping
    };
    grouping.validate()?;
    let grouping = assign_new_code(store, grouping, rng)?;
    info!(grouping = %grouping.key, code = %grouping.code, "grouping created");
    Ok(grouping)
}

/// Replaces the metadata of a stored grouping.
///
/// Key, code and host are kept from the stored grouping.
pub fn update_grouping<S: Store>(
    store: &mut S,
    grouping: Grouping,
    now: DateTime<Utc>,
) -> Result<Grouping> {
    let stored = permitted(store, &grouping.key, Operation::Update, now)?;
    let grouping = Grouping {
        code: stored.code,
        host_key: stored.host_key,
        ..grouping
    };
    grouping.validate()?;
    let grouping = store.set_grouping(grouping)?;
    info!(grouping = %grouping.key, "grouping updated");
    Ok(grouping)
}

/// Opens or reopens a grouping for good.
///
/// Clears an existing close date; otherwise sets it to `now`, which must lie
/// after the final date.
pub fn close_grouping<S: Store>(
    store: &mut S,
    grouping_key: &GroupingKey,
    now: DateTime<Utc>,
) -> Result<Grouping> {
    let mut grouping = store
        .get_grouping(grouping_key)?
        .ok_or(Error::UnknownGrouping(*grouping_key))?;
    grouping.close_date = match grouping.close_date {
        Some(_) => None,
        None if now > grouping.final_date => Some(now),
        None => return Err(Error::CloseBeforeFinal(*grouping_key)),
    };
    let grouping = store.set_grouping(grouping)?;
    info!(grouping = %grouping.key, closed = grouping.close_date.is_some(), "grouping close toggled");
    Ok(grouping)
}

/// Deletes a grouping with its registrations and groups.
pub fn delete_grouping<S: Store>(
    store: &mut S,
    grouping_key: &GroupingKey,
    now: DateTime<Utc>,
) -> Result<()> {
    permitted(store, grouping_key, Operation::Delete, now)?;
    store.delete_grouping(grouping_key)?;
    info!(grouping = %grouping_key, "grouping deleted");
    Ok(())
}

// ================================ Registrations ================================

/// Registers `user_key` (or updates its preferences).
pub fn register<S: Store>(
    store: &mut S,
    grouping_key: &GroupingKey,
    user_key: &UserKey,
    preferences: UserPreferences,
    now: DateTime<Utc>,
) -> Result<Registration> {
    let grouping = permitted(store, grouping_key, Operation::Register, now)?;
    if grouping.host_key == *user_key {
        return Err(Error::HostRegistration(*grouping_key));
    }
    let registration = Registration::new(*grouping_key, *user_key).with_preferences(preferences);
    let registration = store.set_registration(registration)?;
    info!(grouping = %grouping_key, user = %user_key, "user registered");
    Ok(registration)
}

/// Removes participants; they are also dropped from already formed groups.
pub fn delete_registrations<S: Store>(
    store: &mut S,
    grouping_key: &GroupingKey,
    user_keys: &HashSet<UserKey>,
    now: DateTime<Utc>,
) -> Result<()> {
    permitted(store, grouping_key, Operation::DeleteRegistrations, now)?;
    for user_key in user_keys {
        store.delete_registration(grouping_key, user_key)?;
    }
    let groups = store.get_groups(grouping_key)?;
    if !groups.is_empty() {
        store.set_groups(grouping_key, remove_from_groups(&groups, user_keys))?;
    }
    info!(grouping = %grouping_key, count = user_keys.len(), "registrations deleted");
    Ok(())
}

// ================================ Groups ================================

/// Runs the grouping's policy over all registrations and stores the
/// normalized groups.
pub fn start_grouping<S: Store, R: Rng>(
    store: &mut S,
    grouping_key: &GroupingKey,
    now: DateTime<Utc>,
    rng: &mut R,
) -> Result<Groups> {
    let grouping = permitted(store, grouping_key, Operation::Start, now)?;
    let data: PolicyData = store
        .list_user_registrations_by_grouping(grouping_key)?
        .into_iter()
        .map(|registration| (registration.user, registration.preferences))
        .collect();
    if data.is_empty() {
        return Err(Error::NoRegistrations(*grouping_key));
    }
    let groups = get_policy(&grouping.policy).form_groups(
        &data,
        grouping.max_group_size,
        grouping.member_reserve,
        rng,
    )?;
    let groups = sort_groups(groups);
    store.set_groups(grouping_key, groups.clone())?;
    info!(
        grouping = %grouping_key,
        policy = %grouping.policy,
        participants = data.len(),
        groups = groups.len(),
        "groups formed"
    );
    Ok(groups)
}

/// Discards formed groups; the grouping returns to `Final`.
pub fn remove_groups<S: Store>(
    store: &mut S,
    grouping_key: &GroupingKey,
    now: DateTime<Utc>,
) -> Result<()> {
    permitted(store, grouping_key, Operation::RemoveGroups, now)?;
    store.set_groups(grouping_key, Groups::new())?;
    info!(grouping = %grouping_key, "groups removed");
    Ok(())
}

/// Fixes formed groups by deleting all registrations.
///
/// Returns the number of deleted registrations.
pub fn fasten_groups<S: Store>(
    store: &mut S,
    grouping_key: &GroupingKey,
    now: DateTime<Utc>,
) -> Result<usize> {
    permitted(store, grouping_key, Operation::Fasten, now)?;
    let count = store.delete_registrations(grouping_key)?;
    info!(grouping = %grouping_key, registrations = count, "groups fastened");
    Ok(count)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::User;
    use crate::store::memory::MemoryStore;
    use chrono::{Duration, TimeZone};
    use rand::rngs::SmallRng;
    use rand::SeedableRng;

    struct Fixture {
        store: MemoryStore,
        host: User,
        users: Vec<User>,
        t0: DateTime<Utc>,
    }

    fn fixture(count: usize) -> Fixture {
        let mut store = MemoryStore::default();
        let host = store.add_user(User::new("host"));
        let users = (0..count)
            .map(|i| store.add_user(User::new(format!("user-{i}"))))
            .collect();
        let t0 = Utc.with_ymd_and_hms(2019, 3, 1, 12, 0, 0).unwrap();
        Fixture {
            store,
            host,
            users,
            t0,
        }
    }

    fn create(f: &mut Fixture, rng: &mut SmallRng) -> Grouping {
        let grouping = Grouping::new("Seminar", f.host.key, f.t0 + Duration::days(1))
            .with_final_date(f.t0 + Duration::days(3))
            .with_sizes(3, 0);
        create_grouping(&mut f.store, grouping, rng).unwrap()
    }

    fn register_all(f: &mut Fixture, key: &GroupingKey, now: DateTime<Utc>) {
        let users: Vec<UserKey> = f.users.iter().map(|u| u.key).collect();
        for user in users {
            register(&mut f.store, key, &user, UserPreferences::Empty, now).unwrap();
        }
    }

    fn state(f: &Fixture, key: &GroupingKey, now: DateTime<Utc>) -> GroupingState {
        grouping_state(&f.store, key, now).unwrap()
    }

    #[test]
    fn test_full_lifecycle() {
        let mut f = fixture(6);
        let mut rng = SmallRng::seed_from_u64(42);
        let g = create(&mut f, &mut rng);
        assert_eq!(g.code.len(), 6);
        assert_eq!(state(&f, &g.key, f.t0), GroupingState::New);

        let open = f.t0 + Duration::days(2);
        assert_eq!(state(&f, &g.key, open), GroupingState::Available);
        register_all(&mut f, &g.key, open);
        assert_eq!(f.store.count_registrations_by_grouping(&g.key).unwrap(), 6);

        let done = f.t0 + Duration::days(4);
        assert_eq!(state(&f, &g.key, done), GroupingState::Final);
        let groups = start_grouping(&mut f.store, &g.key, done, &mut rng).unwrap();
        assert_eq!(groups.iter().map(|g| g.len()).sum::<usize>(), 6);
        assert_eq!(groups, sort_groups(groups.clone()));
        assert_eq!(state(&f, &g.key, done), GroupingState::Grouped);

        remove_groups(&mut f.store, &g.key, done).unwrap();
        assert_eq!(state(&f, &g.key, done), GroupingState::Final);
        start_grouping(&mut f.store, &g.key, done, &mut rng).unwrap();

        assert_eq!(fasten_groups(&mut f.store, &g.key, done).unwrap(), 6);
        assert_eq!(state(&f, &g.key, done), GroupingState::Fastened);
        assert_eq!(f.store.get_groups(&g.key).unwrap().len(), 2);

        let closed = close_grouping(&mut f.store, &g.key, done).unwrap();
        assert_eq!(closed.close_date, Some(done));
        assert_eq!(state(&f, &g.key, done), GroupingState::Closed);

        delete_grouping(&mut f.store, &g.key, done).unwrap();
        assert_eq!(state(&f, &g.key, done), GroupingState::Unknown);
        assert!(f.store.get_groups(&g.key).unwrap().is_empty());
    }

    #[test]
    fn test_operations_gated_by_state() {
        let mut f = fixture(2);
        let mut rng = SmallRng::seed_from_u64(1);
        let g = create(&mut f, &mut rng);
        let user = f.users[0].key;

        let err = register(&mut f.store, &g.key, &user, UserPreferences::Empty, f.t0).unwrap_err();
        assert!(matches!(
            err,
            Error::NotPermitted {
                operation: Operation::Register,
                state: GroupingState::New
            }
        ));

        let open = f.t0 + Duration::days(2);
        let err = start_grouping(&mut f.store, &g.key, open, &mut rng).unwrap_err();
        assert!(matches!(
            err,
            Error::NotPermitted {
                operation: Operation::Start,
                state: GroupingState::Available
            }
        ));
        assert!(matches!(
            delete_grouping(&mut f.store, &g.key, open),
            Err(Error::NotPermitted { .. })
        ));
        assert!(matches!(
            fasten_groups(&mut f.store, &g.key, open),
            Err(Error::NotPermitted { .. })
        ));
    }

    #[test]
    fn test_host_cannot_register() {
        let mut f = fixture(1);
        let mut rng = SmallRng::seed_from_u64(2);
        let g = create(&mut f, &mut rng);
        let host = f.host.key;
        let err = register(
            &mut f.store,
            &g.key,
            &host,
            UserPreferences::Empty,
            f.t0 + Duration::days(2),
        )
        .unwrap_err();
        assert!(matches!(err, Error::HostRegistration(k) if k == g.key));
    }

    #[test]
    fn test_start_without_registrations() {
        let mut f = fixture(0);
        let mut rng = SmallRng::seed_from_u64(3);
        let g = create(&mut f, &mut rng);
        let err = start_grouping(&mut f.store, &g.key, f.t0 + Duration::days(4), &mut rng)
            .unwrap_err();
        assert!(matches!(err, Error::NoRegistrations(k) if k == g.key));
    }

    #[test]
    fn test_unknown_grouping() {
        let mut f = fixture(0);
        let key = GroupingKey::new();
        assert_eq!(state(&f, &key, f.t0), GroupingState::Unknown);
        assert!(matches!(
            remove_groups(&mut f.store, &key, f.t0),
            Err(Error::UnknownGrouping(k)) if k == key
        ));
    }

    #[test]
    fn test_delete_registrations_updates_groups() {
        let mut f = fixture(6);
        let mut rng = SmallRng::seed_from_u64(4);
        let g = create(&mut f, &mut rng);
        let open = f.t0 + Duration::days(2);
        register_all(&mut f, &g.key, open);
        let done = f.t0 + Duration::days(4);
        start_grouping(&mut f.store, &g.key, done, &mut rng).unwrap();

        let removed: HashSet<UserKey> = [f.users[0].key, f.users[1].key].into_iter().collect();
        delete_registrations(&mut f.store, &g.key, &removed, done).unwrap();
        assert_eq!(f.store.count_registrations_by_grouping(&g.key).unwrap(), 4);
        let groups = f.store.get_groups(&g.key).unwrap();
        let members: HashSet<UserKey> = groups.iter().flatten().copied().collect();
        assert_eq!(members.len(), 4);
        assert!(members.is_disjoint(&removed));
    }

    #[test]
    fn test_update_keeps_code_and_host() {
        let mut f = fixture(0);
        let mut rng = SmallRng::seed_from_u64(5);
        let g = create(&mut f, &mut rng);
        let changed = Grouping {
            code: "XXXXXX".into(),
            host_key: UserKey::new(),
            ..g.clone().with_note("bring laptops").with_policy("P2")
        };
        let updated = update_grouping(&mut f.store, changed, f.t0).unwrap();
        assert_eq!(updated.code, g.code);
        assert_eq!(updated.host_key, g.host_key);
        assert_eq!(updated.policy, "P2");
        assert_eq!(updated.note, "bring laptops");

        let invalid = g.clone().with_final_date(g.begin_date);
        assert!(matches!(
            update_grouping(&mut f.store, invalid, f.t0),
            Err(Error::Validation(_))
        ));
    }

    #[test]
    fn test_close_toggle() {
        let mut f = fixture(0);
        let mut rng = SmallRng::seed_from_u64(6);
        let g = create(&mut f, &mut rng);
        assert!(matches!(
            close_grouping(&mut f.store, &g.key, f.t0 + Duration::days(2)),
            Err(Error::CloseBeforeFinal(_))
        ));
        let done = f.t0 + Duration::days(4);
        assert!(close_grouping(&mut f.store, &g.key, done).unwrap().close_date.is_some());
        assert!(close_grouping(&mut f.store, &g.key, done).unwrap().close_date.is_none());
    }

    #[test]
    fn test_grouping_by_code() {
        let mut f = fixture(0);
        let mut rng = SmallRng::seed_from_u64(8);
        let g = create(&mut f, &mut rng);

        let typed = format!(" {} ", g.code.to_lowercase());
        assert_eq!(grouping_by_code(&f.store, &typed, f.t0).unwrap().key, g.key);
        let open = f.t0 + Duration::days(2);
        assert_eq!(grouping_by_code(&f.store, &g.code, open).unwrap().key, g.key);

        let err = grouping_by_code(&f.store, &g.code, f.t0 + Duration::days(4)).unwrap_err();
        assert!(matches!(
            err,
            Error::NotPermitted {
                operation: Operation::ShowLink,
                state: GroupingState::Final
            }
        ));
    }

    #[test]
    fn test_grouping_by_code_look_alikes() {
        let mut f = fixture(0);
        let mut rng = SmallRng::seed_from_u64(9);
        let g = create(&mut f, &mut rng);
        let g = Grouping {
            code: "1V0ABC".into(),
            ..g
        };
        f.store.set_grouping(g.clone()).unwrap();

        for typed in ["iu0abc", "LVOABC", "1v0abc"] {
            assert_eq!(grouping_by_code(&f.store, typed, f.t0).unwrap().key, g.key);
        }
        assert!(matches!(
            grouping_by_code(&f.store, "zzzzzz", f.t0),
            Err(Error::UnknownCode(code)) if code == "ZZZZZZ"
        ));
    }

    #[test]
    fn test_create_validates() {
        let mut f = fixture(0);
        let mut rng = SmallRng::seed_from_u64(7);
        let grouping = Grouping::new("", f.host.key, f.t0);
        assert!(matches!(
            create_grouping(&mut f.store, grouping, &mut rng),
            Err(Error::Validation(_))
        ));
        assert!(f.store.groupings.is_empty());
    }
}

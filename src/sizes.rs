//! Group-size partitioning.
//!
//! Converts a participant count, a maximum group size and a member reserve
//! into the target size of every group.
//!
//! # Algorithm
//!
//! 1. While the reserve exceeds `max_group_size + 1`, hold back one wholly
//!    empty group and reduce reserve and pool by `max_group_size`.
//! 2. `num_groups = ceil((participants + reserve) / max_group_size)`.
//! 3. Spread participants evenly: the first `participants % num_groups`
//!    groups get one extra member.
//! 4. Append the held-back empty groups.
//!
//! Sizes are descending, except for the trailing zero groups.

use crate::error::{Error, Result};

/// Returns the target size of every group.
///
/// # Errors
/// [`Error::ZeroGroupSize`] if `max_group_size` is zero and there is
/// anything to distribute, [`Error::SizeOverflow`] if participants plus
/// reserve do not fit in `usize`.
///
/// # Example
/// ```
/// use u_grouping::sizes::group_sizes;
///
/// assert_eq!(group_sizes(5, 5, 1).unwrap(), vec![3, 2]);
/// assert_eq!(group_sizes(5, 5, 10).unwrap(), vec![3, 2, 0]);
/// assert!(group_sizes(0, 5, 0).unwrap().is_empty());
/// ```
pub fn group_sizes(
    num_participants: usize,
    max_group_size: usize,
    member_reserve: usize,
) -> Result<Vec<usize>> {
    let mut potential = num_participants
        .checked_add(member_reserve)
        .ok_or(Error::SizeOverflow {
            participants: num_participants,
            reserve: member_reserve,
        })?;
    if potential == 0 {
        return Ok(Vec::new());
    }
    if max_group_size == 0 {
        return Err(Error::ZeroGroupSize {
            participants: num_participants,
            reserve: member_reserve,
        });
    }

    let mut reserve = member_reserve;
    let mut empty_groups = 0;
    while reserve > max_group_size.saturating_add(1) {
        empty_groups += 1;
        reserve -= max_group_size;
        potential -= max_group_size;
    }

    let num_groups = potential.div_ceil(max_group_size);
    let base = num_participants / num_groups;
    let remainder = num_participants % num_groups;

    let mut sizes = Vec::with_capacity(num_groups + empty_groups);
    sizes.extend(std::iter::repeat_n(base + 1, remainder));
    sizes.extend(std::iter::repeat_n(base, num_groups - remainder));
    sizes.extend(std::iter::repeat_n(0, empty_groups));
    Ok(sizes)
}

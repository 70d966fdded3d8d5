//! Policy driven by a short role questionnaire ("simple Belbin").
//!
//! Every participant answers [`QUESTIONNAIRE_ANSWER_COUNT`] statements on a
//! four-step scale. A group is good when, for every statement, at least one
//! member strongly agrees: the group's answer vector is the element-wise
//! maximum of its members' answers, and each element's distance to
//! [`STRONGLY_AGREE`] is squared and summed.
//!
//! # Reference
//! Belbin (1981), "Management Teams: Why They Succeed or Fail"

use rand::Rng;
use std::collections::HashMap;

use crate::error::Result;
use crate::ga::{search, Genome, Rating, RatingFunction, StopConfig, StopStrategy};
use crate::models::{
    Groups, PolicyData, UserKey, UserPreferences, QUESTIONNAIRE_ANSWER_COUNT, STRONGLY_AGREE,
    STRONGLY_DISAGREE,
};
use crate::sizes::group_sizes;

/// A well-formed answer vector.
pub type Answers = [u8; QUESTIONNAIRE_ANSWER_COUNT];

const DEFAULT_ANSWERS: Answers = [STRONGLY_DISAGREE; QUESTIONNAIRE_ANSWER_COUNT];

/// Answers of every participant with a well-formed questionnaire.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct QuestionnaireRating {
    answers: HashMap<UserKey, Answers>,
}

impl QuestionnaireRating {
    /// Collects well-formed answers; other participants are left out and
    /// contribute nothing to their group.
    pub fn new(data: &PolicyData) -> Self {
        let answers = data
            .iter()
            .filter_map(|(user, preferences)| match preferences {
                UserPreferences::Questionnaire(q) => q.well_formed().map(|a| (user.key, a)),
                _ => None,
            })
            .collect();
        Self { answers }
    }

    /// Answers of `user`, if well formed.
    pub fn answers(&self, user: &UserKey) -> Option<&Answers> {
        self.answers.get(user)
    }

    fn rate_group(&self, group: &[UserKey]) -> Rating {
        let mut combined = DEFAULT_ANSWERS;
        for answers in group.iter().filter_map(|member| self.answers.get(member)) {
            for (best, &answer) in combined.iter_mut().zip(answers) {
                *best = (*best).max(answer);
            }
        }
        combined
            .iter()
            .map(|&answer| Rating::from(STRONGLY_AGREE - answer).powi(2))
            .sum()
    }
}

impl RatingFunction for QuestionnaireRating {
    fn rate(&self, genome: &Genome) -> Rating {
        genome.groups().iter().map(|group| self.rate_group(group)).sum()
    }
}

/// Forms groups whose members jointly cover all questionnaire roles.
pub fn questionnaire_policy<R: Rng>(
    data: &PolicyData,
    max_group_size: usize,
    member_reserve: usize,
    stop: StopConfig,
    rng: &mut R,
) -> Result<Groups> {
    let users: Vec<UserKey> = data.keys().map(|user| user.key).collect();
    let sizes = group_sizes(users.len(), max_group_size, member_reserve)?;
    let rating = QuestionnaireRating::new(data);
    let mut stop = StopStrategy::new(stop);
    Ok(search(&users, &sizes, &rating, &mut stop, rng))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{User, AGREE, DISAGREE};
    use rand::rngs::SmallRng;
    use rand::SeedableRng;
    use uuid::Uuid;

    fn user(i: usize) -> User {
        User::with_key(UserKey(Uuid::from_u128(i as u128)), format!("user-{i:02}"))
    }

    /// User i strongly agrees to statement i % 8 only.
    fn specialist_data(count: usize) -> PolicyData {
        (0..count)
            .map(|i| {
                let mut answers = vec![DISAGREE; QUESTIONNAIRE_ANSWER_COUNT];
                answers[i % QUESTIONNAIRE_ANSWER_COUNT] = STRONGLY_AGREE;
                (user(i), UserPreferences::questionnaire(answers))
            })
            .collect()
    }

    #[test]
    fn test_build_rating_data() {
        let mut data = specialist_data(4);
        data.insert(user(10), UserPreferences::questionnaire(vec![AGREE; 3]));
        data.insert(user(11), UserPreferences::Empty);
        data.insert(user(12), UserPreferences::questionnaire(vec![9; 8]));

        let rating = QuestionnaireRating::new(&data);
        for i in 0..4 {
            assert!(rating.answers(&user(i).key).is_some());
        }
        for i in 10..13 {
            assert!(rating.answers(&user(i).key).is_none());
        }
    }

    #[test]
    fn test_rating() {
        let data = specialist_data(8);
        let rating = QuestionnaireRating::new(&data);
        let keys: Vec<UserKey> = (0..8).map(|i| user(i).key).collect();

        // all specialists together: every statement covered
        assert_eq!(rating.rate(&Genome::build(&keys, &[8])), 0.0);

        // split in halves: each half misses four statements (3 - 1)^2
        assert_eq!(rating.rate(&Genome::build(&keys, &[4, 4])), 32.0);

        // unknown members score as strongly disagree everywhere
        let strangers = vec![UserKey::new(), UserKey::new()];
        assert_eq!(rating.rate(&Genome::build(&strangers, &[2])), 72.0);
    }

    #[test]
    fn test_questionnaire_policy() {
        let data = specialist_data(16);
        let mut rng = SmallRng::seed_from_u64(42);
        let groups =
            questionnaire_policy(&data, 8, 0, StopConfig::default().with_max_rounds(50), &mut rng)
                .unwrap();
        assert_eq!(groups.len(), 2);
        assert_eq!(groups[0].len() + groups[1].len(), 16);
        assert!(groups.iter().all(|g| g.len() == 8));
    }
}

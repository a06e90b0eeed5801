//! Per-user economy entity ("monster"): crystals, coins, level, and the
//! social counters mutated by the check-in verifier's success branch.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use crate::domain::traits::TraitVector;
use crate::domain::user::UserId;

/// Level derivation shared by every reward path.
pub fn level_for(crystals: i64) -> u32 {
    u32::try_from(crystals / 100 + 1).unwrap_or(u32::MAX)
}

/// Reward credited to one participant by a completion event.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Reward {
    pub crystals: i64,
    pub coins: i64,
}

impl Reward {
    /// Group completion payout for a party of `participants` members.
    pub fn for_group(participants: usize) -> Self {
        let n = i64::try_from(participants).unwrap_or(0);
        Self {
            crystals: 10 * n,
            coins: 100 * n,
        }
    }

    /// Flat payout for the single-user confirm path.
    pub fn flat_confirmation() -> Self {
        Self {
            crystals: 200,
            coins: 0,
        }
    }
}

/// Coins deducted from the creator when instance creation is gated.
pub const CREATION_COIN_COST: i64 = 100;
/// Minimum level required to create instances when creation is gated.
pub const CREATION_MIN_LEVEL: u32 = 4;

/// Per-user companion and economy state.
///
/// ## Invariants
/// - `level == floor(crystals / 100) + 1`, recomputed on every crystal
///   mutation rather than stored independently.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct Monster {
    #[schema(value_type = String)]
    pub user_id: UserId,
    pub name: String,
    pub level: u32,
    pub crystals: i64,
    pub coins: i64,
    /// Visual variant, 1-9, chosen at creation.
    pub monster_type: u8,
    pub quests_completed: u32,
    pub social_score: u32,
    /// Tally of completed quests per type tag.
    pub preferred_quest_types: BTreeMap<String, u32>,
    pub trait_scores: Option<TraitVector>,
}

impl Monster {
    /// Fresh starter state for a new user.
    pub fn starter(user_id: UserId, monster_type: u8) -> Self {
        Self {
            user_id,
            name: "Buddy".to_owned(),
            level: 1,
            crystals: 0,
            coins: 1000,
            monster_type,
            quests_completed: 0,
            social_score: 0,
            preferred_quest_types: BTreeMap::new(),
            trait_scores: None,
        }
    }

    /// Apply a completion event: credit the reward, recompute the level, and
    /// bump the social counters and per-type tally.
    pub fn apply_completion(&mut self, quest_kind: &str, reward: Reward, social_delta: u32) {
        self.crystals += reward.crystals;
        self.coins += reward.coins;
        self.level = level_for(self.crystals);
        self.quests_completed += 1;
        self.social_score += social_delta;
        *self
            .preferred_quest_types
            .entry(quest_kind.to_owned())
            .or_insert(0) += 1;
    }

    /// Deduct the instance creation fee. The caller checks affordability.
    pub fn pay_creation_fee(&mut self) {
        self.coins -= CREATION_COIN_COST;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[rstest]
    #[case(0, 1)]
    #[case(99, 1)]
    #[case(100, 2)]
    #[case(250, 3)]
    #[case(1000, 11)]
    fn level_is_derived_from_crystals(#[case] crystals: i64, #[case] expected: u32) {
        assert_eq!(level_for(crystals), expected);
    }

    #[test]
    fn group_reward_scales_with_party_size() {
        let reward = Reward::for_group(3);
        assert_eq!(reward.coins, 300);
        assert_eq!(reward.crystals, 30);
    }

    #[test]
    fn completion_updates_economy_and_tallies() {
        let mut monster = Monster::starter(UserId::random(), 4);
        monster.crystals = 95;
        monster.level = level_for(monster.crystals);

        monster.apply_completion("coffee_chat", Reward::for_group(2), 10);

        assert_eq!(monster.crystals, 115);
        assert_eq!(monster.coins, 1200);
        assert_eq!(monster.level, 2);
        assert_eq!(monster.quests_completed, 1);
        assert_eq!(monster.social_score, 10);
        assert_eq!(monster.preferred_quest_types.get("coffee_chat"), Some(&1));

        monster.apply_completion("coffee_chat", Reward::flat_confirmation(), 3);
        assert_eq!(monster.preferred_quest_types.get("coffee_chat"), Some(&2));
        assert_eq!(monster.level, level_for(monster.crystals));
    }
}

//! Trait matcher: ranks open quests by how closely their type profile fits
//! the user's personality vector.

use std::sync::Arc;

use async_trait::async_trait;
use mockable::Clock;
use serde::Serialize;
use utoipa::ToSchema;

use crate::domain::error::Error;
use crate::domain::ports::{MonsterRepository, QuestStore, TemplateRepository, UserDirectory};
use crate::domain::quest::InstanceSnapshot;
use crate::domain::registry_service::{
    assemble_snapshot, map_monster_error, map_store_error, map_template_error,
};
use crate::domain::traits::TraitProfiles;
use crate::domain::user::UserId;

/// Quests returned per list in the recommendation response.
const RECOMMENDATION_LIMIT: usize = 3;

/// One scored quest in a recommendation list.
#[derive(Debug, Clone, PartialEq, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct ScoredQuest {
    #[serde(flatten)]
    pub quest: InstanceSnapshot,
    /// Euclidean distance between the user's vector and the type profile.
    pub distance: f64,
}

/// Matcher output: the closest fits and, when enough quests are scored, the
/// farthest ones as comfort-zone stretches.
#[derive(Debug, Clone, PartialEq, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct Recommendations {
    pub recommended: Vec<ScoredQuest>,
    /// Farthest-first. Empty unless enough scored quests exist that the two
    /// lists cannot overlap.
    pub comfort_zone: Vec<ScoredQuest>,
}

/// Driving port for quest recommendations.
#[async_trait]
pub trait TraitMatcher: Send + Sync {
    /// Rank open quests for `user`. Users without stored trait scores get an
    /// empty response; quest types without a profile are excluded from both
    /// lists.
    async fn recommendations(&self, user: &UserId) -> Result<Recommendations, Error>;
}

/// Matcher over the quest store and the static profile table.
#[derive(Clone)]
pub struct MatchService<S, T, M, U> {
    quests: Arc<S>,
    templates: Arc<T>,
    monsters: Arc<M>,
    users: Arc<U>,
    profiles: Arc<TraitProfiles>,
    clock: Arc<dyn Clock>,
}

impl<S, T, M, U> MatchService<S, T, M, U> {
    pub fn new(
        quests: Arc<S>,
        templates: Arc<T>,
        monsters: Arc<M>,
        users: Arc<U>,
        profiles: Arc<TraitProfiles>,
        clock: Arc<dyn Clock>,
    ) -> Self {
        Self {
            quests,
            templates,
            monsters,
            users,
            profiles,
            clock,
        }
    }
}

#[async_trait]
impl<S, T, M, U> TraitMatcher for MatchService<S, T, M, U>
where
    S: QuestStore,
    T: TemplateRepository,
    M: MonsterRepository,
    U: UserDirectory,
{
    async fn recommendations(&self, user: &UserId) -> Result<Recommendations, Error> {
        let monster = self
            .monsters
            .find(user)
            .await
            .map_err(map_monster_error)?;
        let Some(vector) = monster.and_then(|monster| monster.trait_scores) else {
            return Ok(Recommendations {
                recommended: Vec::new(),
                comfort_zone: Vec::new(),
            });
        };

        let now = self.clock.utc();
        let instances = self
            .quests
            .list_active(None)
            .await
            .map_err(map_store_error)?;
        let mut scored = Vec::new();
        for instance in instances {
            if instance.is_expired(now) {
                continue;
            }
            let template = self
                .templates
                .find(&instance.template_id)
                .await
                .map_err(map_template_error)?;
            let Some(template) = template else {
                continue;
            };
            let Some(distance) = self.profiles.distance_to(&template.kind, &vector) else {
                continue;
            };
            let quest = assemble_snapshot(
                self.quests.as_ref(),
                self.templates.as_ref(),
                self.users.as_ref(),
                instance,
            )
            .await?;
            scored.push(ScoredQuest { quest, distance });
        }
        scored.sort_by(|a, b| {
            a.distance
                .partial_cmp(&b.distance)
                .unwrap_or(std::cmp::Ordering::Equal)
        });

        let recommended: Vec<ScoredQuest> =
            scored.iter().take(RECOMMENDATION_LIMIT).cloned().collect();
        // Only surface a comfort zone when the two lists cannot overlap.
        let comfort_zone = if scored.len() >= 2 * RECOMMENDATION_LIMIT {
            scored
                .iter()
                .rev()
                .take(RECOMMENDATION_LIMIT)
                .cloned()
                .collect()
        } else {
            Vec::new()
        };
        Ok(Recommendations {
            recommended,
            comfort_zone,
        })
    }
}

#[cfg(test)]
#[path = "match_service_tests.rs"]
mod tests;

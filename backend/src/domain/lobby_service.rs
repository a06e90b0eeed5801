//! Lobby coordination: readiness toggles, the all-ready countdown, and emote
//! broadcasts inside a quest lobby.

use std::sync::Arc;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use mockable::Clock;
use serde::Serialize;
use utoipa::ToSchema;

use crate::domain::error::Error;
use crate::domain::monster::Monster;
use crate::domain::ports::{MonsterRepository, QuestStore, TemplateRepository, UserDirectory};
use crate::domain::quest::{InstanceId, LobbyMember, QuestInstance};
use crate::domain::registry_service::{
    map_directory_error, map_monster_error, map_store_error, map_template_error,
};
use crate::domain::user::UserId;

/// Seconds of countdown started on the client once every member is ready.
pub const READY_COUNTDOWN_SECS: u32 = 5;

/// When a lobby counts as all-ready.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ReadyPolicy {
    /// Any non-empty lobby where every member is ready.
    #[default]
    AnyMember,
    /// Additionally requires the template's minimum participant count.
    RequireMinimum,
}

/// Companion summary shown next to each lobby member.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct MonsterBadge {
    pub level: u32,
    pub monster_type: u8,
}

impl From<&Monster> for MonsterBadge {
    fn from(monster: &Monster) -> Self {
        Self {
            level: monster.level,
            monster_type: monster.monster_type,
        }
    }
}

/// One row of the lobby read model.
#[derive(Debug, Clone, PartialEq, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct LobbyEntry {
    #[schema(value_type = String)]
    pub user_id: UserId,
    pub name: Option<String>,
    pub is_ready: bool,
    pub is_host: bool,
    /// Absent when the member has not created a monster yet.
    pub monster: Option<MonsterBadge>,
}

/// Lobby read model returned by every lobby operation.
#[derive(Debug, Clone, PartialEq, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct LobbyView {
    pub members: Vec<LobbyEntry>,
    pub all_ready: bool,
    /// Present only when all-ready; seconds until the check-in phase starts.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub countdown: Option<u32>,
}

/// An emote echoed back to the lobby.
#[derive(Debug, Clone, PartialEq, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct EmoteEvent {
    #[schema(value_type = String)]
    pub user_id: UserId,
    pub emote: String,
    #[schema(value_type = String, format = "date-time")]
    pub at: DateTime<Utc>,
}

/// Driving port for lobby coordination.
#[async_trait]
pub trait LobbyCoordinator: Send + Sync {
    async fn get_lobby(&self, id: &InstanceId) -> Result<LobbyView, Error>;

    /// Flip the caller's readiness and return the updated lobby.
    async fn toggle_ready(&self, id: &InstanceId, user: &UserId) -> Result<LobbyView, Error>;

    /// Broadcast an emote. The caller must hold a lobby row.
    async fn send_emote(
        &self,
        id: &InstanceId,
        user: &UserId,
        emote: String,
    ) -> Result<EmoteEvent, Error>;
}

/// Lobby service over the quest store.
#[derive(Clone)]
pub struct LobbyService<S, T, M, U> {
    quests: Arc<S>,
    templates: Arc<T>,
    monsters: Arc<M>,
    users: Arc<U>,
    clock: Arc<dyn Clock>,
    policy: ReadyPolicy,
}

impl<S, T, M, U> LobbyService<S, T, M, U> {
    pub fn new(
        quests: Arc<S>,
        templates: Arc<T>,
        monsters: Arc<M>,
        users: Arc<U>,
        clock: Arc<dyn Clock>,
        policy: ReadyPolicy,
    ) -> Self {
        Self {
            quests,
            templates,
            monsters,
            users,
            clock,
            policy,
        }
    }
}

impl<S, T, M, U> LobbyService<S, T, M, U>
where
    S: QuestStore,
    T: TemplateRepository,
    M: MonsterRepository,
    U: UserDirectory,
{
    async fn active_instance(&self, id: &InstanceId) -> Result<QuestInstance, Error> {
        let instance = self
            .quests
            .find(id)
            .await
            .map_err(map_store_error)?
            .ok_or_else(|| Error::not_found(format!("quest {id} not found")))?;
        if !instance.is_active {
            return Err(Error::expired(format!("quest {id} is no longer active")));
        }
        Ok(instance)
    }

    async fn minimum_for(&self, instance: &QuestInstance) -> Result<usize, Error> {
        match self.policy {
            ReadyPolicy::AnyMember => Ok(1),
            ReadyPolicy::RequireMinimum => {
                let template = self
                    .templates
                    .find(&instance.template_id)
                    .await
                    .map_err(map_template_error)?
                    .ok_or_else(|| {
                        Error::internal(format!(
                            "instance {} references unknown template {}",
                            instance.id, instance.template_id
                        ))
                    })?;
                Ok(template.min_participants as usize)
            }
        }
    }

    async fn view(&self, instance: &QuestInstance) -> Result<LobbyView, Error> {
        let members = self
            .quests
            .lobby(&instance.id)
            .await
            .map_err(map_store_error)?;
        let ids: Vec<UserId> = members.iter().map(|member| member.user_id.clone()).collect();
        let names = self
            .users
            .names(&ids)
            .await
            .map_err(map_directory_error)?;
        let minimum = self.minimum_for(instance).await?;
        let all_ready =
            members.len() >= minimum && members.iter().all(|member: &LobbyMember| member.is_ready);
        let mut entries = Vec::with_capacity(members.len());
        for member in members {
            let monster = self
                .monsters
                .find(&member.user_id)
                .await
                .map_err(map_monster_error)?;
            entries.push(LobbyEntry {
                name: names.get(&member.user_id).cloned(),
                monster: monster.as_ref().map(MonsterBadge::from),
                user_id: member.user_id,
                is_ready: member.is_ready,
                is_host: member.is_host,
            });
        }
        Ok(LobbyView {
            members: entries,
            all_ready,
            countdown: all_ready.then_some(READY_COUNTDOWN_SECS),
        })
    }
}

#[async_trait]
impl<S, T, M, U> LobbyCoordinator for LobbyService<S, T, M, U>
where
    S: QuestStore,
    T: TemplateRepository,
    M: MonsterRepository,
    U: UserDirectory,
{
    async fn get_lobby(&self, id: &InstanceId) -> Result<LobbyView, Error> {
        let instance = self.active_instance(id).await?;
        self.view(&instance).await
    }

    async fn toggle_ready(&self, id: &InstanceId, user: &UserId) -> Result<LobbyView, Error> {
        let instance = self.active_instance(id).await?;
        let ready = self
            .quests
            .toggle_ready(id, user)
            .await
            .map_err(map_store_error)?
            .ok_or_else(|| Error::not_found(format!("user is not in the lobby of quest {id}")))?;
        tracing::debug!(instance = %id, user = %user, ready, "lobby readiness toggled");
        self.view(&instance).await
    }

    async fn send_emote(
        &self,
        id: &InstanceId,
        user: &UserId,
        emote: String,
    ) -> Result<EmoteEvent, Error> {
        if emote.trim().is_empty() {
            return Err(Error::invalid_request("emote must not be empty"));
        }
        let instance = self.active_instance(id).await?;
        let members = self
            .quests
            .lobby(&instance.id)
            .await
            .map_err(map_store_error)?;
        if !members.iter().any(|member| &member.user_id == user) {
            return Err(Error::forbidden(format!(
                "user is not in the lobby of quest {id}"
            )));
        }
        Ok(EmoteEvent {
            user_id: user.clone(),
            emote,
            at: self.clock.utc(),
        })
    }
}

#[cfg(test)]
#[path = "lobby_service_tests.rs"]
mod tests;

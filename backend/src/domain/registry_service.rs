//! Instance registry service: opening, listing, joining, and leaving live
//! quest instances.

use std::sync::Arc;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use mockable::Clock;
use serde_json::json;

use crate::domain::catalog::{QuestTemplate, TemplateId};
use crate::domain::error::Error;
use crate::domain::hub::HubId;
use crate::domain::monster::{CREATION_COIN_COST, CREATION_MIN_LEVEL};
use crate::domain::ports::{
    HubRepository, HubRepositoryError, JoinOutcome, MonsterRepository, MonsterRepositoryError,
    QuestStore, QuestStoreError, TemplateRepository, TemplateRepositoryError, UserDirectory,
    UserDirectoryError,
};
use crate::domain::quest::{InstanceId, InstanceSnapshot, QuestInstance};
use crate::domain::user::UserId;

pub(crate) fn map_store_error(error: QuestStoreError) -> Error {
    Error::internal(error.to_string())
}

pub(crate) fn map_template_error(error: TemplateRepositoryError) -> Error {
    Error::internal(error.to_string())
}

pub(crate) fn map_hub_error(error: HubRepositoryError) -> Error {
    Error::internal(error.to_string())
}

pub(crate) fn map_monster_error(error: MonsterRepositoryError) -> Error {
    Error::internal(error.to_string())
}

pub(crate) fn map_directory_error(error: UserDirectoryError) -> Error {
    Error::internal(error.to_string())
}

/// Whether opening an instance is gated on the creator's economy state.
///
/// Gated creation requires the minimum level and charges the coin fee; open
/// creation lets anyone open instances for free.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum CreationPolicy {
    #[default]
    Gated,
    Open,
}

/// Command to open a new instance of a template at a hub.
#[derive(Debug, Clone, PartialEq)]
pub struct OpenInstance {
    pub template_id: TemplateId,
    pub hub_id: HubId,
    /// Free-form meeting point; defaults to the hub's location.
    pub location: Option<String>,
    pub start_time: Option<DateTime<Utc>>,
}

/// Driving port for the instance registry.
#[async_trait]
pub trait InstanceRegistry: Send + Sync {
    /// Open a new instance. Under [`CreationPolicy::Gated`] the creator must
    /// hold the minimum level and pays the coin fee.
    async fn open_instance(
        &self,
        creator: &UserId,
        command: OpenInstance,
    ) -> Result<InstanceSnapshot, Error>;

    /// List joinable instances, optionally scoped to a hub. Instances past
    /// their deadline, and scheduled instances nobody joined, are deactivated
    /// on the way out.
    async fn list_instances(&self, hub: Option<&HubId>) -> Result<Vec<InstanceSnapshot>, Error>;

    async fn get_instance(&self, id: &InstanceId) -> Result<InstanceSnapshot, Error>;

    /// Join an instance. Idempotent for existing members.
    async fn join_instance(&self, id: &InstanceId, user: &UserId)
        -> Result<InstanceSnapshot, Error>;

    async fn leave_instance(&self, id: &InstanceId, user: &UserId) -> Result<(), Error>;

    /// Tear an instance down entirely. Only the creator may do this.
    async fn delete_instance(&self, id: &InstanceId, user: &UserId) -> Result<(), Error>;
}

/// Registry service coordinating the quest store with the catalog, hub
/// directory, and creator economy.
#[derive(Clone)]
pub struct RegistryService<S, T, H, M, U> {
    quests: Arc<S>,
    templates: Arc<T>,
    hubs: Arc<H>,
    monsters: Arc<M>,
    users: Arc<U>,
    clock: Arc<dyn Clock>,
    policy: CreationPolicy,
}

impl<S, T, H, M, U> RegistryService<S, T, H, M, U> {
    pub fn new(
        quests: Arc<S>,
        templates: Arc<T>,
        hubs: Arc<H>,
        monsters: Arc<M>,
        users: Arc<U>,
        clock: Arc<dyn Clock>,
        policy: CreationPolicy,
    ) -> Self {
        Self {
            quests,
            templates,
            hubs,
            monsters,
            users,
            clock,
            policy,
        }
    }
}

/// Build the read model for an instance: template, membership, and the
/// creator's display name.
pub(crate) async fn assemble_snapshot<S, T, U>(
    quests: &S,
    templates: &T,
    users: &U,
    instance: QuestInstance,
) -> Result<InstanceSnapshot, Error>
where
    S: QuestStore + ?Sized,
    T: TemplateRepository + ?Sized,
    U: UserDirectory + ?Sized,
{
    let template = templates
        .find(&instance.template_id)
        .await
        .map_err(map_template_error)?
        .ok_or_else(|| {
            Error::internal(format!(
                "instance {} references unknown template {}",
                instance.id, instance.template_id
            ))
        })?;
    let participants = quests
        .participants(&instance.id)
        .await
        .map_err(map_store_error)?;
    let creator_name = match &instance.creator {
        Some(creator) => {
            let names = users
                .names(std::slice::from_ref(creator))
                .await
                .map_err(map_directory_error)?;
            names.get(creator).cloned()
        }
        None => None,
    };
    Ok(InstanceSnapshot {
        instance,
        template,
        participants,
        creator_name,
    })
}

impl<S, T, H, M, U> RegistryService<S, T, H, M, U>
where
    S: QuestStore,
    T: TemplateRepository,
    H: HubRepository,
    M: MonsterRepository,
    U: UserDirectory,
{
    async fn template_for(&self, id: &TemplateId) -> Result<QuestTemplate, Error> {
        self.templates
            .find(id)
            .await
            .map_err(map_template_error)?
            .ok_or_else(|| Error::not_found(format!("template {id} not found")))
    }

    /// Check the gate and charge the fee when creation is gated.
    async fn charge_creation_fee(&self, creator: &UserId) -> Result<(), Error> {
        if self.policy == CreationPolicy::Open {
            return Ok(());
        }
        let mut monster = self
            .monsters
            .ensure(creator)
            .await
            .map_err(map_monster_error)?;
        if monster.level < CREATION_MIN_LEVEL {
            return Err(Error::forbidden(format!(
                "level {CREATION_MIN_LEVEL} required to create quests"
            ))
            .with_details(json!({ "requiredLevel": CREATION_MIN_LEVEL, "level": monster.level })));
        }
        if monster.coins < CREATION_COIN_COST {
            return Err(Error::forbidden(format!(
                "{CREATION_COIN_COST} coins required to create quests"
            ))
            .with_details(json!({ "requiredCoins": CREATION_COIN_COST, "coins": monster.coins })));
        }
        monster.pay_creation_fee();
        self.monsters
            .save(&monster)
            .await
            .map_err(map_monster_error)?;
        Ok(())
    }

    /// Deactivate instances whose deadline has passed and scheduled instances
    /// nobody joined. Returns the survivors.
    async fn sweep_expired(
        &self,
        instances: Vec<QuestInstance>,
    ) -> Result<Vec<QuestInstance>, Error> {
        let now = self.clock.utc();
        let mut live = Vec::with_capacity(instances.len());
        for instance in instances {
            if instance.is_expired(now) || instance.is_no_show(now) {
                tracing::debug!(instance = %instance.id, "deactivating lapsed instance");
                self.quests
                    .deactivate(&instance.id)
                    .await
                    .map_err(map_store_error)?;
            } else {
                live.push(instance);
            }
        }
        Ok(live)
    }

    async fn snapshot(&self, instance: QuestInstance) -> Result<InstanceSnapshot, Error> {
        assemble_snapshot(
            self.quests.as_ref(),
            self.templates.as_ref(),
            self.users.as_ref(),
            instance,
        )
        .await
    }
}

#[async_trait]
impl<S, T, H, M, U> InstanceRegistry for RegistryService<S, T, H, M, U>
where
    S: QuestStore,
    T: TemplateRepository,
    H: HubRepository,
    M: MonsterRepository,
    U: UserDirectory,
{
    async fn open_instance(
        &self,
        creator: &UserId,
        command: OpenInstance,
    ) -> Result<InstanceSnapshot, Error> {
        let template = self.template_for(&command.template_id).await?;
        let hub = self
            .hubs
            .find(&command.hub_id)
            .await
            .map_err(map_hub_error)?
            .ok_or_else(|| Error::not_found(format!("hub {} not found", command.hub_id)))?;

        self.charge_creation_fee(creator).await?;

        let location = command.location.unwrap_or_else(|| hub.location.clone());
        let instance = QuestInstance::open(
            &template,
            hub.id,
            creator.clone(),
            location,
            command.start_time,
            self.clock.utc(),
        );
        self.quests
            .create(&instance)
            .await
            .map_err(map_store_error)?;
        tracing::info!(
            instance = %instance.id,
            template = %instance.template_id,
            hub = %instance.hub_id,
            "quest instance opened"
        );
        self.snapshot(instance).await
    }

    async fn list_instances(&self, hub: Option<&HubId>) -> Result<Vec<InstanceSnapshot>, Error> {
        let instances = self
            .quests
            .list_active(hub)
            .await
            .map_err(map_store_error)?;
        let live = self.sweep_expired(instances).await?;
        let mut snapshots = Vec::with_capacity(live.len());
        for instance in live {
            snapshots.push(self.snapshot(instance).await?);
        }
        Ok(snapshots)
    }

    async fn get_instance(&self, id: &InstanceId) -> Result<InstanceSnapshot, Error> {
        let mut instance = self
            .quests
            .find(id)
            .await
            .map_err(map_store_error)?
            .ok_or_else(|| Error::not_found(format!("quest {id} not found")))?;
        if instance.is_active && instance.is_expired(self.clock.utc()) {
            self.quests.deactivate(id).await.map_err(map_store_error)?;
            instance.is_active = false;
        }
        self.snapshot(instance).await
    }

    async fn join_instance(
        &self,
        id: &InstanceId,
        user: &UserId,
    ) -> Result<InstanceSnapshot, Error> {
        let instance = self
            .quests
            .find(id)
            .await
            .map_err(map_store_error)?
            .ok_or_else(|| Error::not_found(format!("quest {id} not found")))?;
        if instance.is_expired(self.clock.utc()) {
            self.quests.deactivate(id).await.map_err(map_store_error)?;
            return Err(Error::expired(format!("quest {id} has ended")));
        }
        if !instance.is_active {
            return Err(Error::expired(format!("quest {id} is no longer active")));
        }
        let template = self.template_for(&instance.template_id).await?;

        let outcome = self
            .quests
            .join(id, user, template.max_participants)
            .await
            .map_err(map_store_error)?
            .ok_or_else(|| Error::not_found(format!("quest {id} not found")))?;
        match outcome {
            JoinOutcome::Joined { count } => {
                tracing::info!(instance = %id, user = %user, count, "user joined quest");
            }
            JoinOutcome::AlreadyMember { .. } => {}
            JoinOutcome::Full { count } => {
                return Err(Error::capacity(format!("quest {id} is full")).with_details(
                    json!({ "max": template.max_participants, "current": count }),
                ));
            }
        }
        let instance = self
            .quests
            .find(id)
            .await
            .map_err(map_store_error)?
            .ok_or_else(|| Error::not_found(format!("quest {id} not found")))?;
        self.snapshot(instance).await
    }

    async fn leave_instance(&self, id: &InstanceId, user: &UserId) -> Result<(), Error> {
        self.quests
            .find(id)
            .await
            .map_err(map_store_error)?
            .ok_or_else(|| Error::not_found(format!("quest {id} not found")))?;
        self.quests
            .remove_member(id, user)
            .await
            .map_err(map_store_error)?;
        tracing::info!(instance = %id, user = %user, "user left quest");
        Ok(())
    }

    async fn delete_instance(&self, id: &InstanceId, user: &UserId) -> Result<(), Error> {
        let instance = self
            .quests
            .find(id)
            .await
            .map_err(map_store_error)?
            .ok_or_else(|| Error::not_found(format!("quest {id} not found")))?;
        if instance.creator.as_ref() != Some(user) {
            return Err(Error::forbidden("only the creator may delete a quest"));
        }
        self.quests.delete(id).await.map_err(map_store_error)?;
        tracing::info!(instance = %id, "quest instance deleted by creator");
        Ok(())
    }
}

#[cfg(test)]
#[path = "registry_service_tests.rs"]
mod tests;

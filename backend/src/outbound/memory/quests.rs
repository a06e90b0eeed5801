//! In-memory quest store.
//!
//! All instance state sits behind one mutex, which is what makes `join` and
//! `resolve_round` atomic: the whole decision happens under the lock.

use std::collections::HashMap;
use std::sync::{Mutex, MutexGuard, PoisonError};

use async_trait::async_trait;

use crate::domain::hub::HubId;
use crate::domain::ports::{JoinOutcome, QuestStore, QuestStoreError, RoundResolution};
use crate::domain::quest::{
    CheckinCode, InstanceId, LobbyMember, QuestInstance, QuestPhoto, ReactionChoice, RoundStatus,
    WordChoice,
};
use crate::domain::user::UserId;

#[derive(Debug, Default)]
struct QuestState {
    instances: HashMap<InstanceId, QuestInstance>,
    members: HashMap<InstanceId, Vec<UserId>>,
    lobbies: HashMap<InstanceId, Vec<LobbyMember>>,
    words: HashMap<InstanceId, Vec<WordChoice>>,
    reactions: HashMap<InstanceId, Vec<ReactionChoice>>,
    codes: HashMap<String, CheckinCode>,
    photos: HashMap<InstanceId, Vec<QuestPhoto>>,
}

impl QuestState {
    /// Keep the stored counter equal to the membership row count.
    fn sync_counter(&mut self, id: &InstanceId) {
        let count = self.members.get(id).map_or(0, Vec::len);
        if let Some(instance) = self.instances.get_mut(id) {
            instance.current_participants = u32::try_from(count).unwrap_or(u32::MAX);
        }
    }

    fn purge(&mut self, id: &InstanceId) {
        self.instances.remove(id);
        self.members.remove(id);
        self.lobbies.remove(id);
        self.words.remove(id);
        self.reactions.remove(id);
        self.photos.remove(id);
        self.codes.retain(|_, code| &code.quest_id != id);
    }
}

#[derive(Debug, Default)]
pub struct MemoryQuests {
    inner: Mutex<QuestState>,
}

impl MemoryQuests {
    pub fn new() -> Self {
        Self::default()
    }

    /// Store preloaded with starter instances: no owner, empty lobby, the
    /// first join seats the first guest.
    pub fn seeded(instances: Vec<QuestInstance>) -> Self {
        let store = Self::new();
        {
            let mut guard = store.lock();
            for instance in instances {
                let id = instance.id.clone();
                guard.instances.insert(id.clone(), instance);
                guard.members.insert(id.clone(), Vec::new());
                guard.lobbies.insert(id, Vec::new());
            }
        }
        store
    }

    fn lock(&self) -> MutexGuard<'_, QuestState> {
        self.inner.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

#[async_trait]
impl QuestStore for MemoryQuests {
    async fn create(&self, instance: &QuestInstance) -> Result<(), QuestStoreError> {
        let mut guard = self.lock();
        let id = instance.id.clone();
        guard.instances.insert(id.clone(), instance.clone());
        if let Some(creator) = &instance.creator {
            guard.members.insert(id.clone(), vec![creator.clone()]);
            guard
                .lobbies
                .insert(id.clone(), vec![LobbyMember::host(creator.clone())]);
        } else {
            guard.members.insert(id.clone(), Vec::new());
            guard.lobbies.insert(id.clone(), Vec::new());
        }
        guard.sync_counter(&id);
        Ok(())
    }

    async fn find(&self, id: &InstanceId) -> Result<Option<QuestInstance>, QuestStoreError> {
        Ok(self.lock().instances.get(id).cloned())
    }

    async fn list_active<'a>(
        &self,
        hub: Option<&'a HubId>,
    ) -> Result<Vec<QuestInstance>, QuestStoreError> {
        let guard = self.lock();
        let mut instances: Vec<QuestInstance> = guard
            .instances
            .values()
            .filter(|instance| instance.is_active)
            .filter(|instance| hub.map_or(true, |hub| &instance.hub_id == hub))
            .cloned()
            .collect();
        instances.sort_by(|a, b| a.deadline.cmp(&b.deadline).then_with(|| a.id.cmp(&b.id)));
        Ok(instances)
    }

    async fn deactivate(&self, id: &InstanceId) -> Result<(), QuestStoreError> {
        if let Some(instance) = self.lock().instances.get_mut(id) {
            instance.is_active = false;
        }
        Ok(())
    }

    async fn join(
        &self,
        id: &InstanceId,
        user: &UserId,
        max_participants: u32,
    ) -> Result<Option<JoinOutcome>, QuestStoreError> {
        let mut guard = self.lock();
        if !guard.instances.contains_key(id) {
            return Ok(None);
        }
        let members = guard.members.entry(id.clone()).or_default();
        let count = u32::try_from(members.len()).unwrap_or(u32::MAX);
        if members.contains(user) {
            return Ok(Some(JoinOutcome::AlreadyMember { count }));
        }
        if count >= max_participants {
            return Ok(Some(JoinOutcome::Full { count }));
        }
        members.push(user.clone());
        guard
            .lobbies
            .entry(id.clone())
            .or_default()
            .push(LobbyMember::guest(user.clone()));
        guard.sync_counter(id);
        let count = guard.members.get(id).map_or(0, Vec::len);
        Ok(Some(JoinOutcome::Joined {
            count: u32::try_from(count).unwrap_or(u32::MAX),
        }))
    }

    async fn remove_member(&self, id: &InstanceId, user: &UserId) -> Result<(), QuestStoreError> {
        let mut guard = self.lock();
        if let Some(members) = guard.members.get_mut(id) {
            members.retain(|member| member != user);
        }
        if let Some(lobby) = guard.lobbies.get_mut(id) {
            lobby.retain(|member| &member.user_id != user);
        }
        // Withdraw pending selections so round recounts track the shrunken
        // lobby; a word round has no later attempt to recover through.
        if let Some(words) = guard.words.get_mut(id) {
            words.retain(|choice| &choice.user_id != user);
        }
        if let Some(reactions) = guard.reactions.get_mut(id) {
            reactions.retain(|choice| &choice.user_id != user);
        }
        guard.sync_counter(id);
        Ok(())
    }

    async fn participants(&self, id: &InstanceId) -> Result<Vec<UserId>, QuestStoreError> {
        Ok(self.lock().members.get(id).cloned().unwrap_or_default())
    }

    async fn lobby(&self, id: &InstanceId) -> Result<Vec<LobbyMember>, QuestStoreError> {
        Ok(self.lock().lobbies.get(id).cloned().unwrap_or_default())
    }

    async fn toggle_ready(
        &self,
        id: &InstanceId,
        user: &UserId,
    ) -> Result<Option<bool>, QuestStoreError> {
        let mut guard = self.lock();
        let Some(lobby) = guard.lobbies.get_mut(id) else {
            return Ok(None);
        };
        let Some(member) = lobby.iter_mut().find(|member| &member.user_id == user) else {
            return Ok(None);
        };
        member.is_ready = !member.is_ready;
        Ok(Some(member.is_ready))
    }

    async fn delete(&self, id: &InstanceId) -> Result<bool, QuestStoreError> {
        let mut guard = self.lock();
        let existed = guard.instances.contains_key(id);
        guard.purge(id);
        Ok(existed)
    }

    async fn put_word(&self, id: &InstanceId, choice: &WordChoice) -> Result<(), QuestStoreError> {
        let mut guard = self.lock();
        let words = guard.words.entry(id.clone()).or_default();
        words.retain(|existing| existing.user_id != choice.user_id);
        words.push(choice.clone());
        Ok(())
    }

    async fn words(&self, id: &InstanceId) -> Result<Vec<WordChoice>, QuestStoreError> {
        Ok(self.lock().words.get(id).cloned().unwrap_or_default())
    }

    async fn put_reaction(
        &self,
        id: &InstanceId,
        choice: &ReactionChoice,
    ) -> Result<(), QuestStoreError> {
        let mut guard = self.lock();
        let reactions = guard.reactions.entry(id.clone()).or_default();
        reactions.retain(|existing| {
            !(existing.user_id == choice.user_id && existing.attempt == choice.attempt)
        });
        reactions.push(choice.clone());
        Ok(())
    }

    async fn reactions(
        &self,
        id: &InstanceId,
        attempt: u32,
    ) -> Result<Vec<ReactionChoice>, QuestStoreError> {
        Ok(self
            .lock()
            .reactions
            .get(id)
            .map(|reactions| {
                reactions
                    .iter()
                    .filter(|reaction| reaction.attempt == attempt)
                    .cloned()
                    .collect()
            })
            .unwrap_or_default())
    }

    async fn resolve_round(
        &self,
        id: &InstanceId,
        attempt: u32,
    ) -> Result<Option<RoundResolution>, QuestStoreError> {
        let mut guard = self.lock();
        let Some(instance) = guard.instances.get(id) else {
            return Ok(None);
        };
        if !instance.is_active {
            return Ok(Some(RoundResolution::AlreadyResolved));
        }
        let tokens: Vec<String> = guard
            .reactions
            .get(id)
            .map(|reactions| {
                reactions
                    .iter()
                    .filter(|reaction| reaction.attempt == attempt)
                    .map(|reaction| reaction.reaction.clone())
                    .collect()
            })
            .unwrap_or_default();
        let lobby_size = guard.lobbies.get(id).map_or(0, Vec::len);
        let status = RoundStatus::evaluate(&tokens, lobby_size);

        if !status.all_selected {
            return Ok(Some(RoundResolution::Incomplete { status }));
        }
        if status.matched {
            let members: Vec<UserId> = guard
                .lobbies
                .get(id)
                .map(|lobby| lobby.iter().map(|member| member.user_id.clone()).collect())
                .unwrap_or_default();
            let instance = {
                let stored = guard
                    .instances
                    .get_mut(id)
                    .ok_or_else(|| QuestStoreError::storage("instance vanished under lock"))?;
                stored.is_active = false;
                stored.clone()
            };
            return Ok(Some(RoundResolution::Matched {
                instance,
                members,
                status,
            }));
        }
        guard.purge(id);
        Ok(Some(RoundResolution::Mismatch { status }))
    }

    async fn add_code(&self, code: &CheckinCode) -> Result<(), QuestStoreError> {
        self.lock().codes.insert(code.code.clone(), code.clone());
        Ok(())
    }

    async fn find_code(&self, code: &str) -> Result<Option<CheckinCode>, QuestStoreError> {
        Ok(self.lock().codes.get(code).cloned())
    }

    async fn add_photo(&self, photo: &QuestPhoto) -> Result<(), QuestStoreError> {
        self.lock()
            .photos
            .entry(photo.quest_id.clone())
            .or_default()
            .push(photo.clone());
        Ok(())
    }

    async fn photos(&self, id: &InstanceId) -> Result<Vec<QuestPhoto>, QuestStoreError> {
        Ok(self.lock().photos.get(id).cloned().unwrap_or_default())
    }
}

#[cfg(test)]
#[path = "quests_tests.rs"]
mod tests;

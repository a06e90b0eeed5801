//! Check-in verification: the consensus rounds that gate group completion,
//! the code-based confirm fallback, and quest photo references.
//!
//! Completion pays out exactly once. The quest store's `resolve_round` is the
//! single atomic decision point; this service only orchestrates the payout
//! and ledger writes around whichever branch the store committed.

use std::sync::Arc;

use async_trait::async_trait;
use mockable::Clock;
use serde::Serialize;
use serde_json::json;
use utoipa::ToSchema;
use uuid::Uuid;

use crate::domain::catalog::QuestTemplate;
use crate::domain::error::Error;
use crate::domain::ledger::{CompletionStatus, QuestHistoryEntry};
use crate::domain::monster::Reward;
use crate::domain::ports::{
    LedgerRepository, LedgerRepositoryError, MonsterRepository, QuestStore, RoundResolution,
    TemplateRepository, UserDirectory,
};
use crate::domain::quest::{
    CheckinCode, InstanceId, QuestInstance, QuestPhoto, ReactionChoice, RoundStatus, WordChoice,
};
use crate::domain::registry_service::{
    map_directory_error, map_monster_error, map_store_error, map_template_error,
};
use crate::domain::user::UserId;

/// Social score credited to each member of a group completion.
const GROUP_SOCIAL_DELTA: u32 = 10;
/// Social score credited for a solo completion.
const SOLO_SOCIAL_DELTA: u32 = 3;

fn map_ledger_error(error: LedgerRepositoryError) -> Error {
    Error::internal(error.to_string())
}

/// Result of a completion attempt via the reaction round.
#[derive(Debug, Clone, PartialEq, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct CompletionOutcome {
    pub matched: bool,
    pub status: RoundStatus,
    /// Present only on the matched branch.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub reward: Option<RewardSummary>,
}

/// Result of a successful code verification.
#[derive(Debug, Clone, PartialEq, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct VerifiedCode {
    #[schema(value_type = String)]
    pub quest_id: InstanceId,
    pub valid: bool,
}

/// Payout summary attached to a successful completion.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct RewardSummary {
    pub crystals: i64,
    pub coins: i64,
    pub group_size: u32,
    pub connections_created: u32,
}

/// Driving port for the check-in protocol.
#[async_trait]
pub trait CheckinVerifier: Send + Sync {
    /// Record the caller's word for the word round, replacing any earlier
    /// submission, and return the round state.
    async fn submit_word(
        &self,
        id: &InstanceId,
        user: &UserId,
        word: String,
    ) -> Result<RoundStatus, Error>;

    async fn word_status(&self, id: &InstanceId) -> Result<RoundStatus, Error>;

    /// Record the caller's reaction for `attempt`, replacing any earlier
    /// submission on the same attempt.
    async fn submit_reaction(
        &self,
        id: &InstanceId,
        user: &UserId,
        reaction: String,
        attempt: u32,
    ) -> Result<RoundStatus, Error>;

    async fn reaction_status(&self, id: &InstanceId, attempt: u32)
        -> Result<RoundStatus, Error>;

    /// Resolve the reaction round for `attempt`. A unanimous round pays out
    /// and deactivates the instance; a failed round tears the instance down.
    async fn complete_with_reaction(
        &self,
        id: &InstanceId,
        user: &UserId,
        attempt: u32,
    ) -> Result<CompletionOutcome, Error>;

    /// Issue a short-lived presence code for the confirm fallback.
    async fn issue_code(&self, id: &InstanceId, user: &UserId) -> Result<CheckinCode, Error>;

    /// Check a presence code: the code must exist and be within its TTL, and
    /// the caller must be a participant of the quest it belongs to.
    async fn verify_code(&self, user: &UserId, code: &str) -> Result<VerifiedCode, Error>;

    /// Low-friction completion: flat payout to the caller, history append,
    /// pairwise connections for the whole party, and a soft deactivate.
    async fn confirm(&self, id: &InstanceId, user: &UserId) -> Result<RewardSummary, Error>;

    async fn add_photo(
        &self,
        id: &InstanceId,
        user: &UserId,
        url: String,
    ) -> Result<QuestPhoto, Error>;

    async fn photos(&self, id: &InstanceId) -> Result<Vec<QuestPhoto>, Error>;
}

/// Check-in service coordinating the quest store with the economy and ledger.
#[derive(Clone)]
pub struct CheckinService<S, T, M, L, U> {
    quests: Arc<S>,
    templates: Arc<T>,
    monsters: Arc<M>,
    ledger: Arc<L>,
    users: Arc<U>,
    clock: Arc<dyn Clock>,
}

impl<S, T, M, L, U> CheckinService<S, T, M, L, U> {
    pub fn new(
        quests: Arc<S>,
        templates: Arc<T>,
        monsters: Arc<M>,
        ledger: Arc<L>,
        users: Arc<U>,
        clock: Arc<dyn Clock>,
    ) -> Self {
        Self {
            quests,
            templates,
            monsters,
            ledger,
            users,
            clock,
        }
    }
}

impl<S, T, M, L, U> CheckinService<S, T, M, L, U>
where
    S: QuestStore,
    T: TemplateRepository,
    M: MonsterRepository,
    L: LedgerRepository,
    U: UserDirectory,
{
    async fn instance(&self, id: &InstanceId) -> Result<QuestInstance, Error> {
        self.quests
            .find(id)
            .await
            .map_err(map_store_error)?
            .ok_or_else(|| Error::not_found(format!("quest {id} not found")))
    }

    async fn active_member_instance(
        &self,
        id: &InstanceId,
        user: &UserId,
    ) -> Result<QuestInstance, Error> {
        let instance = self.instance(id).await?;
        if !instance.is_active {
            return Err(Error::expired(format!("quest {id} is no longer active")));
        }
        let participants = self
            .quests
            .participants(id)
            .await
            .map_err(map_store_error)?;
        if !participants.contains(user) {
            return Err(Error::forbidden(format!(
                "user is not a participant of quest {id}"
            )));
        }
        Ok(instance)
    }

    async fn template_for(&self, instance: &QuestInstance) -> Result<QuestTemplate, Error> {
        self.templates
            .find(&instance.template_id)
            .await
            .map_err(map_template_error)?
            .ok_or_else(|| {
                Error::internal(format!(
                    "instance {} references unknown template {}",
                    instance.id, instance.template_id
                ))
            })
    }

    async fn lobby_size(&self, id: &InstanceId) -> Result<usize, Error> {
        Ok(self.quests.lobby(id).await.map_err(map_store_error)?.len())
    }

    async fn word_round(&self, id: &InstanceId) -> Result<RoundStatus, Error> {
        let words = self.quests.words(id).await.map_err(map_store_error)?;
        let tokens: Vec<String> = words.into_iter().map(|choice| choice.word).collect();
        Ok(RoundStatus::evaluate(&tokens, self.lobby_size(id).await?))
    }

    async fn reaction_round(&self, id: &InstanceId, attempt: u32) -> Result<RoundStatus, Error> {
        let reactions = self
            .quests
            .reactions(id, attempt)
            .await
            .map_err(map_store_error)?;
        let tokens: Vec<String> = reactions
            .into_iter()
            .map(|choice| choice.reaction)
            .collect();
        Ok(RoundStatus::evaluate(&tokens, self.lobby_size(id).await?))
    }

    /// Credit the group payout, append history, and wire the connection
    /// graph for a matched round.
    async fn pay_out_group(
        &self,
        instance: &QuestInstance,
        members: &[UserId],
    ) -> Result<RewardSummary, Error> {
        let template = self.template_for(instance).await?;
        let now = self.clock.utc();
        let reward = Reward::for_group(members.len());
        let social_delta = if members.len() > 1 {
            GROUP_SOCIAL_DELTA
        } else {
            SOLO_SOCIAL_DELTA
        };

        let mut updated = Vec::with_capacity(members.len());
        for member in members {
            let mut monster = self
                .monsters
                .ensure(member)
                .await
                .map_err(map_monster_error)?;
            monster.apply_completion(&template.kind, reward, social_delta);
            updated.push(monster);
        }
        self.monsters
            .save_all(&updated)
            .await
            .map_err(map_monster_error)?;

        let entries: Vec<QuestHistoryEntry> = members
            .iter()
            .map(|member| QuestHistoryEntry {
                user_id: member.clone(),
                quest_id: instance.id.clone(),
                quest_kind: template.kind.clone(),
                status: CompletionStatus::Completed,
                group_size: u32::try_from(members.len()).unwrap_or(u32::MAX),
                duration_minutes: template.duration,
                completed_at: now,
            })
            .collect();
        self.ledger
            .append_history(&entries)
            .await
            .map_err(map_ledger_error)?;

        let connections_created = if members.len() >= 2 {
            let names = self
                .users
                .names(members)
                .await
                .map_err(map_directory_error)?;
            let party: Vec<(UserId, String)> = members
                .iter()
                .map(|member| {
                    let name = names
                        .get(member)
                        .cloned()
                        .unwrap_or_else(|| member.to_string());
                    (member.clone(), name)
                })
                .collect();
            self.ledger
                .connect_party(&party, now)
                .await
                .map_err(map_ledger_error)?
        } else {
            0
        };

        tracing::info!(
            instance = %instance.id,
            group_size = members.len(),
            connections_created,
            "quest completed with unanimous reaction"
        );
        Ok(RewardSummary {
            crystals: reward.crystals,
            coins: reward.coins,
            group_size: u32::try_from(members.len()).unwrap_or(u32::MAX),
            connections_created,
        })
    }
}

#[async_trait]
impl<S, T, M, L, U> CheckinVerifier for CheckinService<S, T, M, L, U>
where
    S: QuestStore,
    T: TemplateRepository,
    M: MonsterRepository,
    L: LedgerRepository,
    U: UserDirectory,
{
    async fn submit_word(
        &self,
        id: &InstanceId,
        user: &UserId,
        word: String,
    ) -> Result<RoundStatus, Error> {
        let word = word.trim().to_owned();
        if word.is_empty() {
            return Err(Error::invalid_request("word must not be empty"));
        }
        self.active_member_instance(id, user).await?;
        let choice = WordChoice {
            user_id: user.clone(),
            word,
            at: self.clock.utc(),
        };
        self.quests
            .put_word(id, &choice)
            .await
            .map_err(map_store_error)?;
        self.word_round(id).await
    }

    async fn word_status(&self, id: &InstanceId) -> Result<RoundStatus, Error> {
        self.instance(id).await?;
        self.word_round(id).await
    }

    async fn submit_reaction(
        &self,
        id: &InstanceId,
        user: &UserId,
        reaction: String,
        attempt: u32,
    ) -> Result<RoundStatus, Error> {
        let reaction = reaction.trim().to_owned();
        if reaction.is_empty() {
            return Err(Error::invalid_request("reaction must not be empty"));
        }
        self.active_member_instance(id, user).await?;
        let choice = ReactionChoice {
            user_id: user.clone(),
            reaction,
            attempt,
            at: self.clock.utc(),
        };
        self.quests
            .put_reaction(id, &choice)
            .await
            .map_err(map_store_error)?;
        self.reaction_round(id, attempt).await
    }

    async fn reaction_status(
        &self,
        id: &InstanceId,
        attempt: u32,
    ) -> Result<RoundStatus, Error> {
        self.instance(id).await?;
        self.reaction_round(id, attempt).await
    }

    async fn complete_with_reaction(
        &self,
        id: &InstanceId,
        user: &UserId,
        attempt: u32,
    ) -> Result<CompletionOutcome, Error> {
        self.active_member_instance(id, user).await?;
        let resolution = self
            .quests
            .resolve_round(id, attempt)
            .await
            .map_err(map_store_error)?
            .ok_or_else(|| Error::not_found(format!("quest {id} not found")))?;
        match resolution {
            RoundResolution::Matched {
                instance,
                members,
                status,
            } => {
                let reward = self.pay_out_group(&instance, &members).await?;
                Ok(CompletionOutcome {
                    matched: true,
                    status,
                    reward: Some(reward),
                })
            }
            RoundResolution::Mismatch { status } => {
                tracing::info!(instance = %id, attempt, "reaction round failed, quest torn down");
                Ok(CompletionOutcome {
                    matched: false,
                    status,
                    reward: None,
                })
            }
            RoundResolution::Incomplete { status } => Err(Error::conflict(format!(
                "quest {id} is still waiting for reactions"
            ))
            .with_details(json!({
                "submissions": status.submissions,
                "lobbySize": status.lobby_size,
            }))),
            RoundResolution::AlreadyResolved => Err(Error::conflict(format!(
                "quest {id} has already been completed"
            ))),
        }
    }

    async fn issue_code(&self, id: &InstanceId, user: &UserId) -> Result<CheckinCode, Error> {
        self.active_member_instance(id, user).await?;
        let code = CheckinCode::issue(id.clone(), user.clone(), self.clock.utc());
        self.quests
            .add_code(&code)
            .await
            .map_err(map_store_error)?;
        Ok(code)
    }

    async fn verify_code(&self, user: &UserId, code: &str) -> Result<VerifiedCode, Error> {
        let now = self.clock.utc();
        let code = self
            .quests
            .find_code(code)
            .await
            .map_err(map_store_error)?
            .ok_or_else(|| Error::not_found("check-in code not found"))?;
        if !code.is_valid(now) {
            return Err(Error::expired("check-in code has expired")
                .with_details(json!({ "issuedAt": code.issued_at })));
        }
        self.active_member_instance(&code.quest_id, user).await?;
        Ok(VerifiedCode {
            quest_id: code.quest_id,
            valid: true,
        })
    }

    async fn confirm(&self, id: &InstanceId, user: &UserId) -> Result<RewardSummary, Error> {
        let now = self.clock.utc();
        let instance = self.active_member_instance(id, user).await?;
        let template = self.template_for(&instance).await?;
        let participants = self
            .quests
            .participants(&instance.id)
            .await
            .map_err(map_store_error)?;
        let group_size = u32::try_from(participants.len()).unwrap_or(u32::MAX);

        let reward = Reward::flat_confirmation();
        let social_delta = if participants.len() > 1 {
            GROUP_SOCIAL_DELTA
        } else {
            SOLO_SOCIAL_DELTA
        };
        let mut monster = self
            .monsters
            .ensure(user)
            .await
            .map_err(map_monster_error)?;
        monster.apply_completion(&template.kind, reward, social_delta);
        self.monsters
            .save(&monster)
            .await
            .map_err(map_monster_error)?;

        self.ledger
            .append_history(&[QuestHistoryEntry {
                user_id: user.clone(),
                quest_id: instance.id.clone(),
                quest_kind: template.kind.clone(),
                status: CompletionStatus::Completed,
                group_size,
                duration_minutes: template.duration,
                completed_at: now,
            }])
            .await
            .map_err(map_ledger_error)?;

        let connections_created = if participants.len() >= 2 {
            let names = self
                .users
                .names(&participants)
                .await
                .map_err(map_directory_error)?;
            let party: Vec<(UserId, String)> = participants
                .iter()
                .map(|member| {
                    let name = names
                        .get(member)
                        .cloned()
                        .unwrap_or_else(|| member.to_string());
                    (member.clone(), name)
                })
                .collect();
            self.ledger
                .connect_party(&party, now)
                .await
                .map_err(map_ledger_error)?
        } else {
            0
        };

        self.quests
            .deactivate(&instance.id)
            .await
            .map_err(map_store_error)?;

        tracing::info!(instance = %instance.id, user = %user, "check-in confirmed");
        Ok(RewardSummary {
            crystals: reward.crystals,
            coins: reward.coins,
            group_size,
            connections_created,
        })
    }

    async fn add_photo(
        &self,
        id: &InstanceId,
        user: &UserId,
        url: String,
    ) -> Result<QuestPhoto, Error> {
        if url.trim().is_empty() {
            return Err(Error::invalid_request("photo url must not be empty"));
        }
        self.active_member_instance(id, user).await?;
        let raw = Uuid::new_v4().simple().to_string();
        let photo = QuestPhoto {
            id: format!("photo_{}", &raw[..8]),
            quest_id: id.clone(),
            user_id: user.clone(),
            url,
            at: self.clock.utc(),
        };
        self.quests
            .add_photo(&photo)
            .await
            .map_err(map_store_error)?;
        Ok(photo)
    }

    async fn photos(&self, id: &InstanceId) -> Result<Vec<QuestPhoto>, Error> {
        self.instance(id).await?;
        self.quests.photos(id).await.map_err(map_store_error)
    }
}

#[cfg(test)]
#[path = "checkin_service_tests.rs"]
mod tests;

//! Port for the quest instance aggregate.
//!
//! The instance's membership, lobby, selection, code, and photo rows are the
//! only cross-request shared mutable state in this subsystem, so they live
//! behind one port whose mutating methods are atomic commits: `join` is a
//! serialized check-and-increment and `resolve_round` is a single decision
//! that either deactivates (match) or cascade-deletes (mismatch). At most one
//! caller can ever observe [`RoundResolution::Matched`] for an instance.

use async_trait::async_trait;

use crate::domain::hub::HubId;
use crate::domain::quest::{
    CheckinCode, InstanceId, LobbyMember, QuestInstance, QuestPhoto, ReactionChoice, RoundStatus,
    WordChoice,
};
use crate::domain::user::UserId;

use super::define_port_error;

define_port_error! {
    /// Errors raised by quest store adapters.
    pub enum QuestStoreError {
        Storage { message: String } =>
            "quest store failed: {message}",
    }
}

/// Result of an atomic join commit.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum JoinOutcome {
    /// The membership row was committed; `count` is the new participant count.
    Joined { count: u32 },
    /// The user already held a membership row; nothing changed.
    AlreadyMember { count: u32 },
    /// The instance was at capacity; nothing changed.
    Full { count: u32 },
}

/// Result of an atomic consensus round resolution.
#[derive(Debug, Clone, PartialEq)]
pub enum RoundResolution {
    /// Unanimous round: the instance has been deactivated (soft, preserved
    /// for audit) and the lobby snapshot is returned for payout.
    Matched {
        instance: QuestInstance,
        members: Vec<UserId>,
        status: RoundStatus,
    },
    /// Failed round: the instance and every dependent row have been deleted.
    Mismatch { status: RoundStatus },
    /// Not every lobby member has submitted for this attempt; nothing changed.
    Incomplete { status: RoundStatus },
    /// The instance was already inactive; a completion event has happened.
    AlreadyResolved,
}

/// Port over instances, memberships, lobby rows, selections, check-in codes,
/// and photo references.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait QuestStore: Send + Sync {
    /// Insert an instance together with its creator's instance membership and
    /// host lobby row, in one commit. Seeded instances without a creator get
    /// no membership rows.
    async fn create(&self, instance: &QuestInstance) -> Result<(), QuestStoreError>;

    async fn find(&self, id: &InstanceId) -> Result<Option<QuestInstance>, QuestStoreError>;

    /// List active instances, optionally scoped to a hub. Expiry is applied
    /// lazily by the caller, not here.
    async fn list_active<'a>(
        &self,
        hub: Option<&'a HubId>,
    ) -> Result<Vec<QuestInstance>, QuestStoreError>;

    /// Soft-deactivate an instance, preserving its rows for audit.
    async fn deactivate(&self, id: &InstanceId) -> Result<(), QuestStoreError>;

    /// Atomic check-and-increment join. Returns `None` when the instance does
    /// not exist. Never commits more than `max_participants` membership rows.
    async fn join(
        &self,
        id: &InstanceId,
        user: &UserId,
        max_participants: u32,
    ) -> Result<Option<JoinOutcome>, QuestStoreError>;

    /// Remove both memberships for `user` and recompute the participant
    /// counter from the authoritative row count.
    async fn remove_member(&self, id: &InstanceId, user: &UserId) -> Result<(), QuestStoreError>;

    async fn participants(&self, id: &InstanceId) -> Result<Vec<UserId>, QuestStoreError>;

    async fn lobby(&self, id: &InstanceId) -> Result<Vec<LobbyMember>, QuestStoreError>;

    /// Flip the member's readiness. Returns the new state, or `None` when the
    /// user holds no lobby row.
    async fn toggle_ready(
        &self,
        id: &InstanceId,
        user: &UserId,
    ) -> Result<Option<bool>, QuestStoreError>;

    /// Cascade-delete the instance and every dependent row in one commit.
    /// Returns whether the instance existed.
    async fn delete(&self, id: &InstanceId) -> Result<bool, QuestStoreError>;

    /// Record a word choice, replacing any prior word by the same user.
    async fn put_word(&self, id: &InstanceId, choice: &WordChoice) -> Result<(), QuestStoreError>;

    async fn words(&self, id: &InstanceId) -> Result<Vec<WordChoice>, QuestStoreError>;

    /// Record a reaction choice, replacing any prior reaction by the same
    /// user for the same attempt.
    async fn put_reaction(
        &self,
        id: &InstanceId,
        choice: &ReactionChoice,
    ) -> Result<(), QuestStoreError>;

    async fn reactions(
        &self,
        id: &InstanceId,
        attempt: u32,
    ) -> Result<Vec<ReactionChoice>, QuestStoreError>;

    /// Atomically evaluate and resolve the reaction round for `attempt`.
    /// Returns `None` when the instance does not exist.
    async fn resolve_round(
        &self,
        id: &InstanceId,
        attempt: u32,
    ) -> Result<Option<RoundResolution>, QuestStoreError>;

    async fn add_code(&self, code: &CheckinCode) -> Result<(), QuestStoreError>;

    async fn find_code(&self, code: &str) -> Result<Option<CheckinCode>, QuestStoreError>;

    async fn add_photo(&self, photo: &QuestPhoto) -> Result<(), QuestStoreError>;

    async fn photos(&self, id: &InstanceId) -> Result<Vec<QuestPhoto>, QuestStoreError>;
}

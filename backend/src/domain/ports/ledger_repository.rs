//! Port for the social ledger: quest history, connections, and friends.

use async_trait::async_trait;
use chrono::{DateTime, Utc};

use crate::domain::ledger::{Connection, Friend, QuestHistoryEntry};
use crate::domain::user::UserId;

use super::define_port_error;

define_port_error! {
    /// Errors raised by ledger adapters.
    pub enum LedgerRepositoryError {
        Storage { message: String } =>
            "ledger repository failed: {message}",
    }
}

/// Port for appending history rows and maintaining the connection graph.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait LedgerRepository: Send + Sync {
    async fn append_history(
        &self,
        entries: &[QuestHistoryEntry],
    ) -> Result<(), LedgerRepositoryError>;

    async fn history_for(
        &self,
        user: &UserId,
    ) -> Result<Vec<QuestHistoryEntry>, LedgerRepositoryError>;

    /// Materialize the pairwise connection graph and friends lists for a
    /// completed party. Idempotent: ordered pairs that already have an edge
    /// are skipped. Returns the number of new edges.
    async fn connect_party(
        &self,
        party: &[(UserId, String)],
        at: DateTime<Utc>,
    ) -> Result<u32, LedgerRepositoryError>;

    async fn connections_for(
        &self,
        user: &UserId,
    ) -> Result<Vec<Connection>, LedgerRepositoryError>;

    async fn friends_of(&self, user: &UserId) -> Result<Vec<Friend>, LedgerRepositoryError>;
}

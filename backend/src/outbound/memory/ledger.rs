//! In-memory social ledger.

use std::collections::{HashMap, HashSet};
use std::sync::{Mutex, MutexGuard, PoisonError};

use async_trait::async_trait;
use chrono::{DateTime, Utc};

use crate::domain::ledger::{Connection, Friend, QuestHistoryEntry};
use crate::domain::ports::{LedgerRepository, LedgerRepositoryError};
use crate::domain::user::UserId;

#[derive(Debug, Default)]
struct LedgerState {
    history: Vec<QuestHistoryEntry>,
    connections: Vec<Connection>,
    /// Ordered pairs that already hold an edge; the dedup index.
    edges: HashSet<(UserId, UserId)>,
    friends: HashMap<UserId, Vec<Friend>>,
}

#[derive(Debug, Default)]
pub struct MemoryLedger {
    inner: Mutex<LedgerState>,
}

impl MemoryLedger {
    pub fn new() -> Self {
        Self::default()
    }

    fn lock(&self) -> MutexGuard<'_, LedgerState> {
        self.inner.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

#[async_trait]
impl LedgerRepository for MemoryLedger {
    async fn append_history(
        &self,
        entries: &[QuestHistoryEntry],
    ) -> Result<(), LedgerRepositoryError> {
        self.lock().history.extend_from_slice(entries);
        Ok(())
    }

    async fn history_for(
        &self,
        user: &UserId,
    ) -> Result<Vec<QuestHistoryEntry>, LedgerRepositoryError> {
        Ok(self
            .lock()
            .history
            .iter()
            .filter(|entry| &entry.user_id == user)
            .cloned()
            .collect())
    }

    async fn connect_party(
        &self,
        party: &[(UserId, String)],
        at: DateTime<Utc>,
    ) -> Result<u32, LedgerRepositoryError> {
        let mut guard = self.lock();
        let mut created = 0u32;
        for (user, _) in party {
            for (other, other_name) in party {
                if user == other {
                    continue;
                }
                if !guard.edges.insert((user.clone(), other.clone())) {
                    continue;
                }
                guard.connections.push(Connection::new(
                    user.clone(),
                    other.clone(),
                    other_name.clone(),
                    at,
                ));
                let friends = guard.friends.entry(user.clone()).or_default();
                if !friends.iter().any(|friend| &friend.id == other) {
                    friends.push(Friend {
                        id: other.clone(),
                        name: other_name.clone(),
                    });
                }
                created += 1;
            }
        }
        Ok(created)
    }

    async fn connections_for(
        &self,
        user: &UserId,
    ) -> Result<Vec<Connection>, LedgerRepositoryError> {
        Ok(self
            .lock()
            .connections
            .iter()
            .filter(|connection| &connection.user_id == user)
            .cloned()
            .collect())
    }

    async fn friends_of(&self, user: &UserId) -> Result<Vec<Friend>, LedgerRepositoryError> {
        Ok(self.lock().friends.get(user).cloned().unwrap_or_default())
    }
}

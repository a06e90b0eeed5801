//! Profile gateway: login, monster state, trait scores, and the social
//! ledger views.

use std::sync::Arc;

use async_trait::async_trait;

use crate::domain::error::Error;
use crate::domain::ledger::{Connection, Friend, QuestHistoryEntry};
use crate::domain::monster::Monster;
use crate::domain::ports::{LedgerRepository, LedgerRepositoryError, MonsterRepository, UserDirectory};
use crate::domain::registry_service::{map_directory_error, map_monster_error};
use crate::domain::traits::TraitVector;
use crate::domain::user::{User, UserId};

fn map_ledger_error(error: LedgerRepositoryError) -> Error {
    Error::internal(error.to_string())
}

/// Driving port for profile and ledger reads.
#[async_trait]
pub trait ProfileGateway: Send + Sync {
    /// Upsert the user and make sure their monster exists. A missing id means
    /// a first visit and mints a fresh identity.
    async fn login(&self, id: Option<UserId>, name: String) -> Result<(User, Monster), Error>;

    async fn monster(&self, user: &UserId) -> Result<Monster, Error>;

    /// Store the user's trait quiz result.
    async fn save_trait_scores(
        &self,
        user: &UserId,
        scores: TraitVector,
    ) -> Result<Monster, Error>;

    async fn connections(&self, user: &UserId) -> Result<Vec<Connection>, Error>;

    async fn friends(&self, user: &UserId) -> Result<Vec<Friend>, Error>;

    async fn history(&self, user: &UserId) -> Result<Vec<QuestHistoryEntry>, Error>;
}

/// Profile service over the directory, economy store, and ledger.
#[derive(Clone)]
pub struct ProfileService<M, L, U> {
    monsters: Arc<M>,
    ledger: Arc<L>,
    users: Arc<U>,
}

impl<M, L, U> ProfileService<M, L, U> {
    pub fn new(monsters: Arc<M>, ledger: Arc<L>, users: Arc<U>) -> Self {
        Self {
            monsters,
            ledger,
            users,
        }
    }
}

#[async_trait]
impl<M, L, U> ProfileGateway for ProfileService<M, L, U>
where
    M: MonsterRepository,
    L: LedgerRepository,
    U: UserDirectory,
{
    async fn login(&self, id: Option<UserId>, name: String) -> Result<(User, Monster), Error> {
        let id = id.unwrap_or_else(UserId::random);
        let user = User::new(id, name).map_err(|err| Error::invalid_request(err.to_string()))?;
        self.users
            .upsert(&user)
            .await
            .map_err(map_directory_error)?;
        let monster = self
            .monsters
            .ensure(user.id())
            .await
            .map_err(map_monster_error)?;
        tracing::info!(user = %user.id(), "user logged in");
        Ok((user, monster))
    }

    async fn monster(&self, user: &UserId) -> Result<Monster, Error> {
        self.monsters.ensure(user).await.map_err(map_monster_error)
    }

    async fn save_trait_scores(
        &self,
        user: &UserId,
        scores: TraitVector,
    ) -> Result<Monster, Error> {
        let mut monster = self
            .monsters
            .ensure(user)
            .await
            .map_err(map_monster_error)?;
        monster.trait_scores = Some(scores);
        self.monsters
            .save(&monster)
            .await
            .map_err(map_monster_error)?;
        Ok(monster)
    }

    async fn connections(&self, user: &UserId) -> Result<Vec<Connection>, Error> {
        self.ledger
            .connections_for(user)
            .await
            .map_err(map_ledger_error)
    }

    async fn friends(&self, user: &UserId) -> Result<Vec<Friend>, Error> {
        self.ledger.friends_of(user).await.map_err(map_ledger_error)
    }

    async fn history(&self, user: &UserId) -> Result<Vec<QuestHistoryEntry>, Error> {
        self.ledger
            .history_for(user)
            .await
            .map_err(map_ledger_error)
    }
}

#[cfg(test)]
#[path = "profile_service_tests.rs"]
mod tests;

//! Port for the per-user economy entity store.

use async_trait::async_trait;

use crate::domain::monster::Monster;
use crate::domain::user::UserId;

use super::define_port_error;

define_port_error! {
    /// Errors raised by economy store adapters.
    pub enum MonsterRepositoryError {
        Storage { message: String } =>
            "monster repository failed: {message}",
    }
}

/// Port for reading and mutating economy state.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait MonsterRepository: Send + Sync {
    /// Fetch the user's monster, creating starter state when missing.
    async fn ensure(&self, user: &UserId) -> Result<Monster, MonsterRepositoryError>;

    async fn find(&self, user: &UserId) -> Result<Option<Monster>, MonsterRepositoryError>;

    async fn save(&self, monster: &Monster) -> Result<(), MonsterRepositoryError>;

    /// Persist a batch of monsters in one commit. A payout across the party
    /// either lands for everyone or for no one.
    async fn save_all(&self, monsters: &[Monster]) -> Result<(), MonsterRepositoryError>;
}

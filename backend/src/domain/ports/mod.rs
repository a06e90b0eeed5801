//! Driven ports: traits the domain services depend on, implemented by
//! outbound adapters.

mod macros;

pub mod hub_repository;
pub mod ledger_repository;
pub mod monster_repository;
pub mod quest_store;
pub mod template_repository;
pub mod user_directory;

pub(crate) use macros::define_port_error;

pub use hub_repository::{HubRepository, HubRepositoryError};
pub use ledger_repository::{LedgerRepository, LedgerRepositoryError};
pub use monster_repository::{MonsterRepository, MonsterRepositoryError};
pub use quest_store::{JoinOutcome, QuestStore, QuestStoreError, RoundResolution};
pub use template_repository::{TemplateRepository, TemplateRepositoryError};
pub use user_directory::{UserDirectory, UserDirectoryError};

#[cfg(test)]
pub use hub_repository::MockHubRepository;
#[cfg(test)]
pub use ledger_repository::MockLedgerRepository;
#[cfg(test)]
pub use monster_repository::MockMonsterRepository;
#[cfg(test)]
pub use quest_store::MockQuestStore;
#[cfg(test)]
pub use template_repository::MockTemplateRepository;
#[cfg(test)]
pub use user_directory::MockUserDirectory;

//! In-memory adapters backed by process-local mutexes.
//!
//! Each adapter serializes its mutations behind one lock, so every port
//! method is a single atomic commit. State lives for the lifetime of the
//! process; a persistent backend can replace these adapters behind the same
//! ports.

mod hubs;
mod ledger;
mod monsters;
mod quests;
mod templates;
mod users;

pub use hubs::MemoryHubs;
pub use ledger::MemoryLedger;
pub use monsters::MemoryMonsters;
pub use quests::MemoryQuests;
pub use templates::MemoryTemplates;
pub use users::MemoryUsers;

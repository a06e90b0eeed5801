//! Domain layer: entities, driven ports, and the services that implement the
//! application's behaviour.
//!
//! Entities are strongly typed and validate their invariants in constructors.
//! Services depend on the traits in [`ports`] and are generic over the
//! adapters wired in at startup; the `*_service` modules also define the
//! driving traits the inbound HTTP layer consumes.

pub mod catalog;
pub mod catalog_service;
pub mod checkin_service;
pub mod error;
pub mod hub;
pub mod ledger;
pub mod lobby_service;
pub mod match_service;
pub mod monster;
pub mod ports;
pub mod profile_service;
pub mod quest;
pub mod registry_service;
pub mod traits;
pub mod user;

pub use self::catalog::{Difficulty, QuestTemplate, TemplateId, TemplateValidationError};
pub use self::catalog_service::{CatalogService, TemplateCatalog};
pub use self::checkin_service::{
    CheckinService, CheckinVerifier, CompletionOutcome, RewardSummary, VerifiedCode,
};
pub use self::error::{Error, ErrorCode};
pub use self::hub::{Hub, HubId};
pub use self::ledger::{CompletionStatus, Connection, Friend, QuestHistoryEntry};
pub use self::lobby_service::{
    EmoteEvent, LobbyCoordinator, LobbyEntry, LobbyService, LobbyView, MonsterBadge, ReadyPolicy,
};
pub use self::match_service::{MatchService, Recommendations, ScoredQuest, TraitMatcher};
pub use self::monster::{Monster, Reward};
pub use self::profile_service::{ProfileGateway, ProfileService};
pub use self::quest::{
    CheckinCode, InstanceId, InstanceSnapshot, LobbyMember, QuestInstance, QuestPhoto,
    RoundStatus,
};
pub use self::registry_service::{
    CreationPolicy, InstanceRegistry, OpenInstance, RegistryService,
};
pub use self::traits::{TraitProfiles, TraitScoreOutOfRange, TraitVector};
pub use self::user::{User, UserId, UserValidationError};

//! Shared HTTP adapter state.
//!
//! HTTP handlers accept this state via `actix_web::web::Data` so they only
//! depend on domain driving traits and remain testable without I/O.

use std::sync::Arc;

use mockable::{Clock, DefaultClock};

use crate::domain::catalog::seed_templates;
use crate::domain::hub::seed_hubs;
use crate::domain::ports::HubRepository;
use crate::domain::quest::seed_instances;
use crate::domain::{
    CatalogService, CheckinService, CheckinVerifier, CreationPolicy, InstanceRegistry,
    LobbyCoordinator, LobbyService, MatchService, ProfileGateway, ProfileService, ReadyPolicy,
    RegistryService, TemplateCatalog, TraitMatcher, TraitProfiles,
};
use crate::outbound::memory::{
    MemoryHubs, MemoryLedger, MemoryMonsters, MemoryQuests, MemoryTemplates, MemoryUsers,
};

/// Dependency bundle for HTTP handlers.
#[derive(Clone)]
pub struct HttpState {
    pub catalog: Arc<dyn TemplateCatalog>,
    pub registry: Arc<dyn InstanceRegistry>,
    pub lobbies: Arc<dyn LobbyCoordinator>,
    pub checkin: Arc<dyn CheckinVerifier>,
    pub matcher: Arc<dyn TraitMatcher>,
    pub profile: Arc<dyn ProfileGateway>,
    pub hubs: Arc<dyn HubRepository>,
}

impl HttpState {
    /// Wire the full service stack over the in-memory adapters with the
    /// default policies: gated creation and any-member readiness.
    ///
    /// Gated creation means a fresh level-1 user cannot open an instance, so
    /// the board is seeded with starter instances at every hub; joining and
    /// completing those is how newcomers earn their way past the gate.
    pub fn in_memory() -> Self {
        let quests = Arc::new(MemoryQuests::seeded(seed_instances(
            &seed_templates(),
            &seed_hubs(),
            DefaultClock.utc(),
        )));
        Self::wired(quests, CreationPolicy::default(), ReadyPolicy::default())
    }

    /// Wire the in-memory stack with explicit policies and an empty board.
    /// Used by tests and by deployments that relax the creation gate.
    pub fn with_policies(creation: CreationPolicy, readiness: ReadyPolicy) -> Self {
        Self::wired(Arc::new(MemoryQuests::new()), creation, readiness)
    }

    fn wired(
        quests: Arc<MemoryQuests>,
        creation: CreationPolicy,
        readiness: ReadyPolicy,
    ) -> Self {
        let templates = Arc::new(MemoryTemplates::seeded(seed_templates()));
        let hubs = Arc::new(MemoryHubs::seeded(seed_hubs()));
        let monsters = Arc::new(MemoryMonsters::new());
        let ledger = Arc::new(MemoryLedger::new());
        let users = Arc::new(MemoryUsers::new());
        let clock: Arc<dyn Clock> = Arc::new(DefaultClock);

        Self {
            catalog: Arc::new(CatalogService::new(templates.clone())),
            registry: Arc::new(RegistryService::new(
                quests.clone(),
                templates.clone(),
                hubs.clone(),
                monsters.clone(),
                users.clone(),
                clock.clone(),
                creation,
            )),
            lobbies: Arc::new(LobbyService::new(
                quests.clone(),
                templates.clone(),
                monsters.clone(),
                users.clone(),
                clock.clone(),
                readiness,
            )),
            checkin: Arc::new(CheckinService::new(
                quests.clone(),
                templates.clone(),
                monsters.clone(),
                ledger.clone(),
                users.clone(),
                clock.clone(),
            )),
            matcher: Arc::new(MatchService::new(
                quests,
                templates,
                monsters.clone(),
                users.clone(),
                Arc::new(TraitProfiles::standard()),
                clock,
            )),
            profile: Arc::new(ProfileService::new(monsters, ledger, users)),
            hubs,
        }
    }
}

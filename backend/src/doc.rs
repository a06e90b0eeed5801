//! OpenAPI documentation configuration.
//!
//! [`ApiDoc`] aggregates every HTTP endpoint from the inbound layer together
//! with the domain schemas they reference, and registers the session cookie
//! security scheme. The generated document is served from
//! `GET /api/openapi.json` for external tooling.

use actix_web::{get, web};
use utoipa::openapi::security::{ApiKey, ApiKeyValue, SecurityScheme};
use utoipa::{Modify, OpenApi};

use crate::domain::{
    CheckinCode, CompletionOutcome, CompletionStatus, Connection, Difficulty, Error, ErrorCode,
    Friend, Hub, InstanceSnapshot, LobbyEntry, LobbyView, Monster, MonsterBadge, QuestHistoryEntry,
    QuestInstance, QuestPhoto, QuestTemplate, Recommendations, RewardSummary, RoundStatus,
    ScoredQuest, TraitVector, User, VerifiedCode,
};
use crate::inbound::http::checkin::{
    PhotoRequest, ReactionSelectionRequest, VerifyCodeRequest, WordSelectionRequest,
};
use crate::inbound::http::instances::OpenInstanceRequest;
use crate::inbound::http::lobbies::EmoteRequest;
use crate::inbound::http::profile::TraitScoresRequest;
use crate::inbound::http::users::{LoginRequest, LoginResponse};

/// Enrich the generated document with the session cookie security scheme.
struct SecurityAddon;

impl Modify for SecurityAddon {
    fn modify(&self, openapi: &mut utoipa::openapi::OpenApi) {
        let components = openapi
            .components
            .get_or_insert_with(utoipa::openapi::Components::default);

        components.add_security_scheme(
            "SessionCookie",
            SecurityScheme::ApiKey(ApiKey::Cookie(ApiKeyValue::with_description(
                "session",
                "Session cookie issued by POST /api/login.",
            ))),
        );
    }
}

/// OpenAPI document for the REST API.
#[derive(OpenApi)]
#[openapi(
    modifiers(&SecurityAddon),
    info(
        title = "Gatherlings backend API",
        description = "HTTP interface for quest coordination, lobbies, check-in, and profiles."
    ),
    servers(
        (url = "/", description = "Relative to the deployment base URL")
    ),
    security(("SessionCookie" = [])),
    paths(
        crate::inbound::http::users::login,
        crate::inbound::http::templates::list_templates,
        crate::inbound::http::templates::get_template,
        crate::inbound::http::templates::create_template,
        crate::inbound::http::instances::list_instances,
        crate::inbound::http::instances::open_instance,
        crate::inbound::http::instances::join_instance,
        crate::inbound::http::instances::delete_instance,
        crate::inbound::http::instances::trait_recommendations,
        crate::inbound::http::instances::list_hubs,
        crate::inbound::http::lobbies::get_lobby,
        crate::inbound::http::lobbies::join_lobby,
        crate::inbound::http::lobbies::toggle_ready,
        crate::inbound::http::lobbies::send_emote,
        crate::inbound::http::lobbies::leave_lobby,
        crate::inbound::http::checkin::submit_word,
        crate::inbound::http::checkin::word_status,
        crate::inbound::http::checkin::submit_reaction,
        crate::inbound::http::checkin::reaction_status,
        crate::inbound::http::checkin::complete_with_reaction,
        crate::inbound::http::checkin::issue_code,
        crate::inbound::http::checkin::verify_code,
        crate::inbound::http::checkin::confirm,
        crate::inbound::http::checkin::add_photo,
        crate::inbound::http::checkin::photos,
        crate::inbound::http::profile::get_monster,
        crate::inbound::http::profile::save_trait_scores,
        crate::inbound::http::profile::list_connections,
        crate::inbound::http::profile::list_friends,
        crate::inbound::http::profile::quest_history,
        crate::inbound::http::health::ready,
        crate::inbound::http::health::live,
    ),
    components(schemas(
        Error,
        ErrorCode,
        User,
        Monster,
        TraitVector,
        QuestTemplate,
        Difficulty,
        QuestInstance,
        InstanceSnapshot,
        Hub,
        LobbyView,
        LobbyEntry,
        MonsterBadge,
        RoundStatus,
        CompletionOutcome,
        RewardSummary,
        VerifiedCode,
        CheckinCode,
        QuestPhoto,
        ScoredQuest,
        Recommendations,
        Connection,
        Friend,
        QuestHistoryEntry,
        CompletionStatus,
        LoginRequest,
        LoginResponse,
        OpenInstanceRequest,
        EmoteRequest,
        WordSelectionRequest,
        ReactionSelectionRequest,
        VerifyCodeRequest,
        PhotoRequest,
        TraitScoresRequest,
    )),
    tags(
        (name = "users", description = "Identity and login"),
        (name = "templates", description = "Quest template catalog"),
        (name = "quests", description = "Quest instances and the board"),
        (name = "lobbies", description = "Pre-quest lobby readiness"),
        (name = "checkin", description = "Consensus check-in and rewards"),
        (name = "profile", description = "Monster state and the social ledger"),
        (name = "health", description = "Health probes")
    )
)]
pub struct ApiDoc;

/// Serve the generated document.
#[get("/openapi.json")]
pub async fn openapi_json() -> web::Json<utoipa::openapi::OpenApi> {
    web::Json(ApiDoc::openapi())
}

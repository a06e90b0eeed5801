//! Check-in protocol handlers: consensus rounds, presence codes, the confirm
//! fallback, and quest photos.
//!
//! ```text
//! POST /api/quests/word-selection
//! GET  /api/quests/{id}/word-status
//! POST /api/quests/reaction-selection
//! GET  /api/quests/{id}/reaction-status?attempt=1
//! POST /api/quests/{id}/complete-with-reaction?attempt=1
//! GET  /api/checkin/{id}/code
//! POST /api/checkin/verify
//! POST /api/checkin/{id}/confirm
//! POST /api/quests/{id}/photos
//! GET  /api/quests/{id}/photos
//! ```

use actix_web::{get, post, web};
use serde::{Deserialize, Serialize};
use utoipa::IntoParams;

use crate::domain::{
    CheckinCode, CompletionOutcome, Error, InstanceId, QuestPhoto, RewardSummary, RoundStatus,
    VerifiedCode,
};
use crate::inbound::http::session::SessionContext;
use crate::inbound::http::state::HttpState;
use crate::inbound::http::ApiResult;

/// Request body for the word round.
#[derive(Debug, Deserialize, Serialize, utoipa::ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct WordSelectionRequest {
    pub quest_id: String,
    #[schema(example = "sunset")]
    pub word: String,
}

/// Request body for the reaction round.
#[derive(Debug, Deserialize, Serialize, utoipa::ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct ReactionSelectionRequest {
    pub quest_id: String,
    #[schema(example = "🎉")]
    pub reaction: String,
    /// Defaults to the first attempt.
    #[serde(default)]
    pub attempt: Option<u32>,
}

/// Request body for `POST /api/checkin/verify`.
#[derive(Debug, Deserialize, Serialize, utoipa::ToSchema)]
pub struct VerifyCodeRequest {
    pub code: String,
}

/// Request body for `POST /api/quests/{id}/photos`.
#[derive(Debug, Deserialize, Serialize, utoipa::ToSchema)]
pub struct PhotoRequest {
    pub url: String,
}

/// Attempt selector for reaction round endpoints.
#[derive(Debug, Deserialize, IntoParams)]
#[into_params(parameter_in = Query)]
pub struct AttemptQuery {
    /// Defaults to the first attempt.
    pub attempt: Option<u32>,
}

impl AttemptQuery {
    fn attempt(&self) -> u32 {
        self.attempt.unwrap_or(1)
    }
}

/// Submit the caller's word for the word round.
#[utoipa::path(
    post,
    path = "/api/quests/word-selection",
    request_body = WordSelectionRequest,
    responses(
        (status = 200, description = "Round state after the submission", body = RoundStatus),
        (status = 400, description = "Empty word or inactive quest", body = Error),
        (status = 401, description = "Unauthorised", body = Error),
        (status = 403, description = "Not a participant", body = Error),
        (status = 404, description = "Unknown quest", body = Error),
        (status = 500, description = "Internal server error", body = Error)
    ),
    tags = ["checkin"],
    operation_id = "submitWord"
)]
#[post("/quests/word-selection")]
pub async fn submit_word(
    state: web::Data<HttpState>,
    session: SessionContext,
    payload: web::Json<WordSelectionRequest>,
) -> ApiResult<web::Json<RoundStatus>> {
    let user = session.require_user_id()?;
    let WordSelectionRequest { quest_id, word } = payload.into_inner();
    let id = InstanceId::new(quest_id);
    Ok(web::Json(state.checkin.submit_word(&id, &user, word).await?))
}

/// Poll the word round.
#[utoipa::path(
    get,
    path = "/api/quests/{id}/word-status",
    params(("id" = String, Path, description = "Instance id")),
    responses(
        (status = 200, description = "Word round state", body = RoundStatus),
        (status = 401, description = "Unauthorised", body = Error),
        (status = 404, description = "Unknown quest", body = Error),
        (status = 500, description = "Internal server error", body = Error)
    ),
    tags = ["checkin"],
    operation_id = "wordStatus"
)]
#[get("/quests/{id}/word-status")]
pub async fn word_status(
    state: web::Data<HttpState>,
    session: SessionContext,
    path: web::Path<String>,
) -> ApiResult<web::Json<RoundStatus>> {
    session.require_user_id()?;
    let id = InstanceId::new(path.into_inner());
    Ok(web::Json(state.checkin.word_status(&id).await?))
}

/// Submit the caller's reaction for one attempt of the reaction round.
#[utoipa::path(
    post,
    path = "/api/quests/reaction-selection",
    request_body = ReactionSelectionRequest,
    responses(
        (status = 200, description = "Round state after the submission", body = RoundStatus),
        (status = 400, description = "Empty reaction or inactive quest", body = Error),
        (status = 401, description = "Unauthorised", body = Error),
        (status = 403, description = "Not a participant", body = Error),
        (status = 404, description = "Unknown quest", body = Error),
        (status = 500, description = "Internal server error", body = Error)
    ),
    tags = ["checkin"],
    operation_id = "submitReaction"
)]
#[post("/quests/reaction-selection")]
pub async fn submit_reaction(
    state: web::Data<HttpState>,
    session: SessionContext,
    payload: web::Json<ReactionSelectionRequest>,
) -> ApiResult<web::Json<RoundStatus>> {
    let user = session.require_user_id()?;
    let ReactionSelectionRequest {
        quest_id,
        reaction,
        attempt,
    } = payload.into_inner();
    let id = InstanceId::new(quest_id);
    Ok(web::Json(
        state
            .checkin
            .submit_reaction(&id, &user, reaction, attempt.unwrap_or(1))
            .await?,
    ))
}

/// Poll one attempt of the reaction round.
#[utoipa::path(
    get,
    path = "/api/quests/{id}/reaction-status",
    params(("id" = String, Path, description = "Instance id"), AttemptQuery),
    responses(
        (status = 200, description = "Reaction round state", body = RoundStatus),
        (status = 401, description = "Unauthorised", body = Error),
        (status = 404, description = "Unknown quest", body = Error),
        (status = 500, description = "Internal server error", body = Error)
    ),
    tags = ["checkin"],
    operation_id = "reactionStatus"
)]
#[get("/quests/{id}/reaction-status")]
pub async fn reaction_status(
    state: web::Data<HttpState>,
    session: SessionContext,
    path: web::Path<String>,
    query: web::Query<AttemptQuery>,
) -> ApiResult<web::Json<RoundStatus>> {
    session.require_user_id()?;
    let id = InstanceId::new(path.into_inner());
    Ok(web::Json(
        state.checkin.reaction_status(&id, query.attempt()).await?,
    ))
}

/// Resolve the reaction round. A unanimous round pays out and retires the
/// instance; a divergent round tears it down and reports `matched: false`.
#[utoipa::path(
    post,
    path = "/api/quests/{id}/complete-with-reaction",
    params(("id" = String, Path, description = "Instance id"), AttemptQuery),
    responses(
        (status = 200, description = "Resolution outcome", body = CompletionOutcome),
        (status = 401, description = "Unauthorised", body = Error),
        (status = 403, description = "Not a participant", body = Error),
        (status = 404, description = "Unknown quest", body = Error),
        (status = 409, description = "Round incomplete or already resolved", body = Error),
        (status = 500, description = "Internal server error", body = Error)
    ),
    tags = ["checkin"],
    operation_id = "completeWithReaction"
)]
#[post("/quests/{id}/complete-with-reaction")]
pub async fn complete_with_reaction(
    state: web::Data<HttpState>,
    session: SessionContext,
    path: web::Path<String>,
    query: web::Query<AttemptQuery>,
) -> ApiResult<web::Json<CompletionOutcome>> {
    let user = session.require_user_id()?;
    let id = InstanceId::new(path.into_inner());
    Ok(web::Json(
        state
            .checkin
            .complete_with_reaction(&id, &user, query.attempt())
            .await?,
    ))
}

/// Issue a short-lived presence code for the confirm fallback.
#[utoipa::path(
    get,
    path = "/api/checkin/{id}/code",
    params(("id" = String, Path, description = "Instance id")),
    responses(
        (status = 200, description = "Fresh code", body = CheckinCode),
        (status = 401, description = "Unauthorised", body = Error),
        (status = 403, description = "Not a participant", body = Error),
        (status = 404, description = "Unknown quest", body = Error),
        (status = 500, description = "Internal server error", body = Error)
    ),
    tags = ["checkin"],
    operation_id = "issueCode"
)]
#[get("/checkin/{id}/code")]
pub async fn issue_code(
    state: web::Data<HttpState>,
    session: SessionContext,
    path: web::Path<String>,
) -> ApiResult<web::Json<CheckinCode>> {
    let user = session.require_user_id()?;
    let id = InstanceId::new(path.into_inner());
    Ok(web::Json(state.checkin.issue_code(&id, &user).await?))
}

/// Verify a presence code. Stale codes are 400 expired.
#[utoipa::path(
    post,
    path = "/api/checkin/verify",
    request_body = VerifyCodeRequest,
    responses(
        (status = 200, description = "Code accepted", body = VerifiedCode),
        (status = 400, description = "Code past its TTL", body = Error),
        (status = 401, description = "Unauthorised", body = Error),
        (status = 403, description = "Not a participant of the code's quest", body = Error),
        (status = 404, description = "Unknown code", body = Error),
        (status = 500, description = "Internal server error", body = Error)
    ),
    tags = ["checkin"],
    operation_id = "verifyCode"
)]
#[post("/checkin/verify")]
pub async fn verify_code(
    state: web::Data<HttpState>,
    session: SessionContext,
    payload: web::Json<VerifyCodeRequest>,
) -> ApiResult<web::Json<VerifiedCode>> {
    let user = session.require_user_id()?;
    Ok(web::Json(
        state
            .checkin
            .verify_code(&user, &payload.into_inner().code)
            .await?,
    ))
}

/// Low-friction completion: flat payout to the caller, connections for the
/// whole party, and a soft deactivate.
#[utoipa::path(
    post,
    path = "/api/checkin/{id}/confirm",
    params(("id" = String, Path, description = "Instance id")),
    responses(
        (status = 200, description = "Payout summary", body = RewardSummary),
        (status = 400, description = "Instance no longer active", body = Error),
        (status = 401, description = "Unauthorised", body = Error),
        (status = 403, description = "Not a participant", body = Error),
        (status = 404, description = "Unknown quest", body = Error),
        (status = 500, description = "Internal server error", body = Error)
    ),
    tags = ["checkin"],
    operation_id = "confirmCheckin"
)]
#[post("/checkin/{id}/confirm")]
pub async fn confirm(
    state: web::Data<HttpState>,
    session: SessionContext,
    path: web::Path<String>,
) -> ApiResult<web::Json<RewardSummary>> {
    let user = session.require_user_id()?;
    let id = InstanceId::new(path.into_inner());
    Ok(web::Json(state.checkin.confirm(&id, &user).await?))
}

/// Attach a photo reference to the quest.
#[utoipa::path(
    post,
    path = "/api/quests/{id}/photos",
    params(("id" = String, Path, description = "Instance id")),
    request_body = PhotoRequest,
    responses(
        (status = 200, description = "Stored photo reference", body = QuestPhoto),
        (status = 401, description = "Unauthorised", body = Error),
        (status = 403, description = "Not a participant", body = Error),
        (status = 404, description = "Unknown quest", body = Error),
        (status = 500, description = "Internal server error", body = Error)
    ),
    tags = ["checkin"],
    operation_id = "addPhoto"
)]
#[post("/quests/{id}/photos")]
pub async fn add_photo(
    state: web::Data<HttpState>,
    session: SessionContext,
    path: web::Path<String>,
    payload: web::Json<PhotoRequest>,
) -> ApiResult<web::Json<QuestPhoto>> {
    let user = session.require_user_id()?;
    let id = InstanceId::new(path.into_inner());
    Ok(web::Json(
        state
            .checkin
            .add_photo(&id, &user, payload.into_inner().url)
            .await?,
    ))
}

/// List the quest's photo references.
#[utoipa::path(
    get,
    path = "/api/quests/{id}/photos",
    params(("id" = String, Path, description = "Instance id")),
    responses(
        (status = 200, description = "Photo references", body = [QuestPhoto]),
        (status = 401, description = "Unauthorised", body = Error),
        (status = 500, description = "Internal server error", body = Error)
    ),
    tags = ["checkin"],
    operation_id = "listPhotos"
)]
#[get("/quests/{id}/photos")]
pub async fn photos(
    state: web::Data<HttpState>,
    session: SessionContext,
    path: web::Path<String>,
) -> ApiResult<web::Json<Vec<QuestPhoto>>> {
    session.require_user_id()?;
    let id = InstanceId::new(path.into_inner());
    Ok(web::Json(state.checkin.photos(&id).await?))
}

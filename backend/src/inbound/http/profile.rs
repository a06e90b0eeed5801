//! Profile handlers: the caller's monster, trait quiz, and social ledger.
//!
//! ```text
//! GET  /api/monsters/me
//! POST /api/monsters/me/trait-scores
//! GET  /api/connections
//! GET  /api/friends
//! GET  /api/profile/me/history
//! ```

use actix_web::{get, post, web};
use serde::{Deserialize, Serialize};

use crate::domain::{Connection, Error, Friend, Monster, QuestHistoryEntry, TraitVector};
use crate::inbound::http::session::SessionContext;
use crate::inbound::http::state::HttpState;
use crate::inbound::http::ApiResult;

/// Trait quiz result, each dimension scored 1-10.
#[derive(Debug, Deserialize, Serialize, utoipa::ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct TraitScoresRequest {
    pub curious: u8,
    pub social: u8,
    pub creative: u8,
    pub adventurous: u8,
    pub calm: u8,
}

impl TraitScoresRequest {
    fn into_vector(self) -> Result<TraitVector, Error> {
        TraitVector::new(
            self.curious,
            self.social,
            self.creative,
            self.adventurous,
            self.calm,
        )
        .map_err(|err| Error::invalid_request(err.to_string()))
    }
}

/// Fetch the caller's monster, creating the starter state on first access.
#[utoipa::path(
    get,
    path = "/api/monsters/me",
    responses(
        (status = 200, description = "The caller's monster", body = Monster),
        (status = 401, description = "Unauthorised", body = Error),
        (status = 500, description = "Internal server error", body = Error)
    ),
    tags = ["profile"],
    operation_id = "getMonster"
)]
#[get("/monsters/me")]
pub async fn get_monster(
    state: web::Data<HttpState>,
    session: SessionContext,
) -> ApiResult<web::Json<Monster>> {
    let user = session.require_user_id()?;
    Ok(web::Json(state.profile.monster(&user).await?))
}

/// Store the caller's trait quiz result. Scores outside 1-10 are rejected.
#[utoipa::path(
    post,
    path = "/api/monsters/me/trait-scores",
    request_body = TraitScoresRequest,
    responses(
        (status = 200, description = "Monster with the stored scores", body = Monster),
        (status = 400, description = "Score out of range", body = Error),
        (status = 401, description = "Unauthorised", body = Error),
        (status = 500, description = "Internal server error", body = Error)
    ),
    tags = ["profile"],
    operation_id = "saveTraitScores"
)]
#[post("/monsters/me/trait-scores")]
pub async fn save_trait_scores(
    state: web::Data<HttpState>,
    session: SessionContext,
    payload: web::Json<TraitScoresRequest>,
) -> ApiResult<web::Json<Monster>> {
    let user = session.require_user_id()?;
    let scores = payload.into_inner().into_vector()?;
    Ok(web::Json(state.profile.save_trait_scores(&user, scores).await?))
}

/// List the caller's connections, most recent first.
#[utoipa::path(
    get,
    path = "/api/connections",
    responses(
        (status = 200, description = "Connection edges", body = [Connection]),
        (status = 401, description = "Unauthorised", body = Error),
        (status = 500, description = "Internal server error", body = Error)
    ),
    tags = ["profile"],
    operation_id = "listConnections"
)]
#[get("/connections")]
pub async fn list_connections(
    state: web::Data<HttpState>,
    session: SessionContext,
) -> ApiResult<web::Json<Vec<Connection>>> {
    let user = session.require_user_id()?;
    Ok(web::Json(state.profile.connections(&user).await?))
}

/// Friends list derived from the connection graph.
#[utoipa::path(
    get,
    path = "/api/friends",
    responses(
        (status = 200, description = "Friends", body = [Friend]),
        (status = 401, description = "Unauthorised", body = Error),
        (status = 500, description = "Internal server error", body = Error)
    ),
    tags = ["profile"],
    operation_id = "listFriends"
)]
#[get("/friends")]
pub async fn list_friends(
    state: web::Data<HttpState>,
    session: SessionContext,
) -> ApiResult<web::Json<Vec<Friend>>> {
    let user = session.require_user_id()?;
    Ok(web::Json(state.profile.friends(&user).await?))
}

/// The caller's completed-quest history, most recent first.
#[utoipa::path(
    get,
    path = "/api/profile/me/history",
    responses(
        (status = 200, description = "History rows", body = [QuestHistoryEntry]),
        (status = 401, description = "Unauthorised", body = Error),
        (status = 500, description = "Internal server error", body = Error)
    ),
    tags = ["profile"],
    operation_id = "questHistory"
)]
#[get("/profile/me/history")]
pub async fn quest_history(
    state: web::Data<HttpState>,
    session: SessionContext,
) -> ApiResult<web::Json<Vec<QuestHistoryEntry>>> {
    let user = session.require_user_id()?;
    Ok(web::Json(state.profile.history(&user).await?))
}

//! Login handler establishing the session used by every other endpoint.
//!
//! ```text
//! POST /api/login {"name":"Ada"}
//! POST /api/login {"userId":"3fa85f64-...","name":"Ada"}
//! ```

use actix_web::{post, web};
use serde::{Deserialize, Serialize};
use serde_json::json;

use crate::domain::{Error, Monster, User, UserId};
use crate::inbound::http::session::SessionContext;
use crate::inbound::http::state::HttpState;
use crate::inbound::http::ApiResult;

/// Login request body for `POST /api/login`.
///
/// Omitting `userId` mints a fresh identity; supplying one re-attaches to an
/// existing profile after a lost cookie.
#[derive(Debug, Deserialize, Serialize, utoipa::ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct LoginRequest {
    #[serde(default)]
    #[schema(value_type = Option<String>, example = "3fa85f64-5717-4562-b3fc-2c963f66afa6")]
    pub user_id: Option<String>,
    #[schema(example = "Ada")]
    pub name: String,
}

/// Login response: the upserted user and their monster.
#[derive(Debug, Serialize, utoipa::ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct LoginResponse {
    pub user: User,
    pub monster: Monster,
}

/// Upsert the user, ensure their monster exists, and establish a session.
#[utoipa::path(
    post,
    path = "/api/login",
    request_body = LoginRequest,
    responses(
        (status = 200, description = "Login success", body = LoginResponse,
            headers(("Set-Cookie" = String, description = "Session cookie"))),
        (status = 400, description = "Invalid request", body = Error),
        (status = 500, description = "Internal server error")
    ),
    tags = ["users"],
    operation_id = "login",
    security([])
)]
#[post("/login")]
pub async fn login(
    state: web::Data<HttpState>,
    session: SessionContext,
    payload: web::Json<LoginRequest>,
) -> ApiResult<web::Json<LoginResponse>> {
    let LoginRequest { user_id, name } = payload.into_inner();
    let id = user_id
        .map(|raw| {
            UserId::parse(&raw).map_err(|error| {
                Error::invalid_request(error.to_string())
                    .with_details(json!({ "field": "userId" }))
            })
        })
        .transpose()?;
    let (user, monster) = state.profile.login(id, name).await?;
    session.persist_user(user.id())?;
    Ok(web::Json(LoginResponse { user, monster }))
}

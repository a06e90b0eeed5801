//! Template catalog handlers.
//!
//! ```text
//! GET  /api/quests/templates
//! GET  /api/quests/templates/{id}
//! POST /api/quests/templates
//! ```

use actix_web::{get, post, web};

use crate::domain::{Error, QuestTemplate, TemplateId};
use crate::inbound::http::session::SessionContext;
use crate::inbound::http::state::HttpState;
use crate::inbound::http::ApiResult;

/// List the template catalog.
#[utoipa::path(
    get,
    path = "/api/quests/templates",
    responses(
        (status = 200, description = "Template catalog", body = [QuestTemplate]),
        (status = 500, description = "Internal server error", body = Error)
    ),
    tags = ["templates"],
    operation_id = "listTemplates",
    security([])
)]
#[get("/quests/templates")]
pub async fn list_templates(
    state: web::Data<HttpState>,
) -> ApiResult<web::Json<Vec<QuestTemplate>>> {
    Ok(web::Json(state.catalog.list_templates().await?))
}

/// Fetch a single template by id.
#[utoipa::path(
    get,
    path = "/api/quests/templates/{id}",
    params(("id" = String, Path, description = "Template id")),
    responses(
        (status = 200, description = "Template", body = QuestTemplate),
        (status = 404, description = "Unknown template", body = Error),
        (status = 500, description = "Internal server error", body = Error)
    ),
    tags = ["templates"],
    operation_id = "getTemplate",
    security([])
)]
#[get("/quests/templates/{id}")]
pub async fn get_template(
    state: web::Data<HttpState>,
    path: web::Path<String>,
) -> ApiResult<web::Json<QuestTemplate>> {
    let id = TemplateId::new(path.into_inner());
    Ok(web::Json(state.catalog.get_template(&id).await?))
}

/// Publish a new template. Validation failures are 400, duplicate ids 409.
#[utoipa::path(
    post,
    path = "/api/quests/templates",
    request_body = QuestTemplate,
    responses(
        (status = 200, description = "Template published", body = QuestTemplate),
        (status = 400, description = "Invalid template", body = Error),
        (status = 401, description = "Unauthorised", body = Error),
        (status = 409, description = "Duplicate template id", body = Error),
        (status = 500, description = "Internal server error", body = Error)
    ),
    tags = ["templates"],
    operation_id = "createTemplate"
)]
#[post("/quests/templates")]
pub async fn create_template(
    state: web::Data<HttpState>,
    session: SessionContext,
    payload: web::Json<QuestTemplate>,
) -> ApiResult<web::Json<QuestTemplate>> {
    session.require_user_id()?;
    Ok(web::Json(
        state.catalog.create_template(payload.into_inner()).await?,
    ))
}

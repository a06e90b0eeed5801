//! Quest board handlers: the instance registry, hub directory, and the trait
//! matcher's recommendation feed.
//!
//! ```text
//! GET    /api/quests/instances?hubId=hub_library
//! POST   /api/quests/instances
//! POST   /api/quests/instances/{id}/join
//! DELETE /api/quests/instances/{id}
//! GET    /api/quests/trait-recommendations
//! GET    /api/hubs
//! ```

use actix_web::{delete, get, post, web, HttpResponse};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use utoipa::IntoParams;

use crate::domain::registry_service::map_hub_error;
use crate::domain::{
    Error, Hub, HubId, InstanceId, InstanceSnapshot, OpenInstance, Recommendations, TemplateId,
};
use crate::inbound::http::session::SessionContext;
use crate::inbound::http::state::HttpState;
use crate::inbound::http::ApiResult;

/// Query parameters for the quest board listing.
#[derive(Debug, Deserialize, IntoParams)]
#[serde(rename_all = "camelCase")]
#[into_params(parameter_in = Query)]
pub struct BoardQuery {
    /// Restrict the listing to one hub.
    pub hub_id: Option<String>,
}

/// Request body for opening a new instance.
#[derive(Debug, Deserialize, Serialize, utoipa::ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct OpenInstanceRequest {
    #[schema(example = "coffee_chat")]
    pub template_id: String,
    #[schema(example = "hub_library")]
    pub hub_id: String,
    /// Free-form meeting point; defaults to the hub's location.
    #[serde(default)]
    pub location: Option<String>,
    #[serde(default)]
    #[schema(value_type = Option<String>, format = "date-time")]
    pub start_time: Option<DateTime<Utc>>,
}

/// List joinable instances. Lapsed instances are swept on the way out.
#[utoipa::path(
    get,
    path = "/api/quests/instances",
    params(BoardQuery),
    responses(
        (status = 200, description = "Open instances", body = [InstanceSnapshot]),
        (status = 500, description = "Internal server error", body = Error)
    ),
    tags = ["quests"],
    operation_id = "listInstances",
    security([])
)]
#[get("/quests/instances")]
pub async fn list_instances(
    state: web::Data<HttpState>,
    query: web::Query<BoardQuery>,
) -> ApiResult<web::Json<Vec<InstanceSnapshot>>> {
    let hub = query.into_inner().hub_id.map(HubId::new);
    Ok(web::Json(state.registry.list_instances(hub.as_ref()).await?))
}

/// Open a new instance. Under gated creation the caller must hold the minimum
/// level and pays the coin fee.
#[utoipa::path(
    post,
    path = "/api/quests/instances",
    request_body = OpenInstanceRequest,
    responses(
        (status = 200, description = "Instance opened", body = InstanceSnapshot),
        (status = 401, description = "Unauthorised", body = Error),
        (status = 403, description = "Creation gate not met", body = Error),
        (status = 404, description = "Unknown template or hub", body = Error),
        (status = 500, description = "Internal server error", body = Error)
    ),
    tags = ["quests"],
    operation_id = "openInstance"
)]
#[post("/quests/instances")]
pub async fn open_instance(
    state: web::Data<HttpState>,
    session: SessionContext,
    payload: web::Json<OpenInstanceRequest>,
) -> ApiResult<web::Json<InstanceSnapshot>> {
    let creator = session.require_user_id()?;
    let OpenInstanceRequest {
        template_id,
        hub_id,
        location,
        start_time,
    } = payload.into_inner();
    let command = OpenInstance {
        template_id: TemplateId::new(template_id),
        hub_id: HubId::new(hub_id),
        location,
        start_time,
    };
    Ok(web::Json(state.registry.open_instance(&creator, command).await?))
}

/// Join an instance. Idempotent for existing members; full instances are 400
/// with seat details, lapsed ones 400 expired.
#[utoipa::path(
    post,
    path = "/api/quests/instances/{id}/join",
    params(("id" = String, Path, description = "Instance id")),
    responses(
        (status = 200, description = "Joined", body = InstanceSnapshot),
        (status = 400, description = "Full or expired", body = Error),
        (status = 401, description = "Unauthorised", body = Error),
        (status = 404, description = "Unknown instance", body = Error),
        (status = 500, description = "Internal server error", body = Error)
    ),
    tags = ["quests"],
    operation_id = "joinInstance"
)]
#[post("/quests/instances/{id}/join")]
pub async fn join_instance(
    state: web::Data<HttpState>,
    session: SessionContext,
    path: web::Path<String>,
) -> ApiResult<web::Json<InstanceSnapshot>> {
    let user = session.require_user_id()?;
    let id = InstanceId::new(path.into_inner());
    Ok(web::Json(state.registry.join_instance(&id, &user).await?))
}

/// Tear an instance down. Only the creator may do this.
#[utoipa::path(
    delete,
    path = "/api/quests/instances/{id}",
    params(("id" = String, Path, description = "Instance id")),
    responses(
        (status = 204, description = "Instance deleted"),
        (status = 401, description = "Unauthorised", body = Error),
        (status = 403, description = "Not the creator", body = Error),
        (status = 404, description = "Unknown instance", body = Error),
        (status = 500, description = "Internal server error", body = Error)
    ),
    tags = ["quests"],
    operation_id = "deleteInstance"
)]
#[delete("/quests/instances/{id}")]
pub async fn delete_instance(
    state: web::Data<HttpState>,
    session: SessionContext,
    path: web::Path<String>,
) -> ApiResult<HttpResponse> {
    let user = session.require_user_id()?;
    let id = InstanceId::new(path.into_inner());
    state.registry.delete_instance(&id, &user).await?;
    Ok(HttpResponse::NoContent().finish())
}

/// Rank open quests against the caller's trait scores. Callers without a
/// stored vector get an empty response rather than an error.
#[utoipa::path(
    get,
    path = "/api/quests/trait-recommendations",
    responses(
        (status = 200, description = "Ranked quests", body = Recommendations),
        (status = 401, description = "Unauthorised", body = Error),
        (status = 500, description = "Internal server error", body = Error)
    ),
    tags = ["quests"],
    operation_id = "traitRecommendations"
)]
#[get("/quests/trait-recommendations")]
pub async fn trait_recommendations(
    state: web::Data<HttpState>,
    session: SessionContext,
) -> ApiResult<web::Json<Recommendations>> {
    let user = session.require_user_id()?;
    Ok(web::Json(state.matcher.recommendations(&user).await?))
}

/// List the hub directory.
#[utoipa::path(
    get,
    path = "/api/hubs",
    responses(
        (status = 200, description = "Hubs", body = [Hub]),
        (status = 500, description = "Internal server error", body = Error)
    ),
    tags = ["quests"],
    operation_id = "listHubs",
    security([])
)]
#[get("/hubs")]
pub async fn list_hubs(state: web::Data<HttpState>) -> ApiResult<web::Json<Vec<Hub>>> {
    Ok(web::Json(state.hubs.list().await.map_err(map_hub_error)?))
}

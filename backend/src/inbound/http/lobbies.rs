//! Lobby handlers: membership, readiness, and emotes for one instance.
//!
//! ```text
//! GET    /api/lobbies/{id}
//! POST   /api/lobbies/{id}/join
//! PUT    /api/lobbies/{id}/ready
//! POST   /api/lobbies/{id}/emote
//! DELETE /api/lobbies/{id}/leave
//! ```
//!
//! Joining a lobby joins the underlying instance first, so a bare lobby join
//! can never outlive its membership row.

use actix_web::{delete, get, post, put, web, HttpResponse};
use serde::{Deserialize, Serialize};

use crate::domain::{EmoteEvent, Error, InstanceId, LobbyView};
use crate::inbound::http::session::SessionContext;
use crate::inbound::http::state::HttpState;
use crate::inbound::http::ApiResult;

/// Request body for `POST /api/lobbies/{id}/emote`.
#[derive(Debug, Deserialize, Serialize, utoipa::ToSchema)]
pub struct EmoteRequest {
    #[schema(example = "🎉")]
    pub emote: String,
}

/// Fetch the lobby read model.
#[utoipa::path(
    get,
    path = "/api/lobbies/{id}",
    params(("id" = String, Path, description = "Instance id")),
    responses(
        (status = 200, description = "Lobby state", body = LobbyView),
        (status = 400, description = "Instance no longer active", body = Error),
        (status = 401, description = "Unauthorised", body = Error),
        (status = 404, description = "Unknown instance", body = Error),
        (status = 500, description = "Internal server error", body = Error)
    ),
    tags = ["lobbies"],
    operation_id = "getLobby"
)]
#[get("/lobbies/{id}")]
pub async fn get_lobby(
    state: web::Data<HttpState>,
    session: SessionContext,
    path: web::Path<String>,
) -> ApiResult<web::Json<LobbyView>> {
    session.require_user_id()?;
    let id = InstanceId::new(path.into_inner());
    Ok(web::Json(state.lobbies.get_lobby(&id).await?))
}

/// Join the lobby. Joins the instance first, then returns the lobby state.
#[utoipa::path(
    post,
    path = "/api/lobbies/{id}/join",
    params(("id" = String, Path, description = "Instance id")),
    responses(
        (status = 200, description = "Joined lobby", body = LobbyView),
        (status = 400, description = "Full or expired", body = Error),
        (status = 401, description = "Unauthorised", body = Error),
        (status = 404, description = "Unknown instance", body = Error),
        (status = 500, description = "Internal server error", body = Error)
    ),
    tags = ["lobbies"],
    operation_id = "joinLobby"
)]
#[post("/lobbies/{id}/join")]
pub async fn join_lobby(
    state: web::Data<HttpState>,
    session: SessionContext,
    path: web::Path<String>,
) -> ApiResult<web::Json<LobbyView>> {
    let user = session.require_user_id()?;
    let id = InstanceId::new(path.into_inner());
    state.registry.join_instance(&id, &user).await?;
    Ok(web::Json(state.lobbies.get_lobby(&id).await?))
}

/// Flip the caller's readiness and return the updated lobby.
#[utoipa::path(
    put,
    path = "/api/lobbies/{id}/ready",
    params(("id" = String, Path, description = "Instance id")),
    responses(
        (status = 200, description = "Updated lobby", body = LobbyView),
        (status = 400, description = "Instance no longer active", body = Error),
        (status = 401, description = "Unauthorised", body = Error),
        (status = 404, description = "Not in the lobby", body = Error),
        (status = 500, description = "Internal server error", body = Error)
    ),
    tags = ["lobbies"],
    operation_id = "toggleReady"
)]
#[put("/lobbies/{id}/ready")]
pub async fn toggle_ready(
    state: web::Data<HttpState>,
    session: SessionContext,
    path: web::Path<String>,
) -> ApiResult<web::Json<LobbyView>> {
    let user = session.require_user_id()?;
    let id = InstanceId::new(path.into_inner());
    Ok(web::Json(state.lobbies.toggle_ready(&id, &user).await?))
}

/// Broadcast an emote to the lobby. Members only.
#[utoipa::path(
    post,
    path = "/api/lobbies/{id}/emote",
    params(("id" = String, Path, description = "Instance id")),
    request_body = EmoteRequest,
    responses(
        (status = 200, description = "Emote echoed", body = EmoteEvent),
        (status = 400, description = "Empty emote or inactive instance", body = Error),
        (status = 401, description = "Unauthorised", body = Error),
        (status = 403, description = "Not a lobby member", body = Error),
        (status = 500, description = "Internal server error", body = Error)
    ),
    tags = ["lobbies"],
    operation_id = "sendEmote"
)]
#[post("/lobbies/{id}/emote")]
pub async fn send_emote(
    state: web::Data<HttpState>,
    session: SessionContext,
    path: web::Path<String>,
    payload: web::Json<EmoteRequest>,
) -> ApiResult<web::Json<EmoteEvent>> {
    let user = session.require_user_id()?;
    let id = InstanceId::new(path.into_inner());
    Ok(web::Json(
        state
            .lobbies
            .send_emote(&id, &user, payload.into_inner().emote)
            .await?,
    ))
}

/// Leave the lobby and release the instance seat.
#[utoipa::path(
    delete,
    path = "/api/lobbies/{id}/leave",
    params(("id" = String, Path, description = "Instance id")),
    responses(
        (status = 204, description = "Left the lobby"),
        (status = 401, description = "Unauthorised", body = Error),
        (status = 404, description = "Unknown instance", body = Error),
        (status = 500, description = "Internal server error", body = Error)
    ),
    tags = ["lobbies"],
    operation_id = "leaveLobby"
)]
#[delete("/lobbies/{id}/leave")]
pub async fn leave_lobby(
    state: web::Data<HttpState>,
    session: SessionContext,
    path: web::Path<String>,
) -> ApiResult<HttpResponse> {
    let user = session.require_user_id()?;
    let id = InstanceId::new(path.into_inner());
    state.registry.leave_instance(&id, &user).await?;
    Ok(HttpResponse::NoContent().finish())
}

#[cfg(test)]
mod tests {
    use super::*;
    use actix_http::Request;
    use actix_web::body::MessageBody;
    use actix_web::cookie::Cookie;
    use actix_web::dev::{Service, ServiceResponse};
    use actix_web::{http::StatusCode, test as actix_test, App};
    use serde_json::{json, Value};

    use crate::domain::{CreationPolicy, ReadyPolicy};
    use crate::inbound::http::instances::open_instance;
    use crate::inbound::http::test_utils::login_as;
    use crate::inbound::http::users::login;

    fn test_app() -> App<
        impl actix_web::dev::ServiceFactory<
            actix_web::dev::ServiceRequest,
            Config = (),
            Response = actix_web::dev::ServiceResponse,
            Error = actix_web::Error,
            InitError = (),
        >,
    > {
        let state = HttpState::with_policies(CreationPolicy::Open, ReadyPolicy::default());
        App::new()
            .app_data(web::Data::new(state))
            .wrap(crate::inbound::http::test_utils::test_session_middleware())
            .service(
                web::scope("/api")
                    .service(login)
                    .service(open_instance)
                    .service(get_lobby)
                    .service(join_lobby)
                    .service(toggle_ready)
                    .service(send_emote)
                    .service(leave_lobby),
            )
    }

    async fn open_quest<S, B>(app: &S, cookie: &Cookie<'static>) -> String
    where
        S: Service<Request, Response = ServiceResponse<B>, Error = actix_web::Error>,
        B: MessageBody,
    {
        let response = actix_test::call_service(
            app,
            actix_test::TestRequest::post()
                .uri("/api/quests/instances")
                .cookie(cookie.clone())
                .set_json(json!({ "templateId": "coffee_chat", "hubId": "hub_library" }))
                .to_request(),
        )
        .await;
        assert_eq!(response.status(), StatusCode::OK);
        let body: Value =
            serde_json::from_slice(&actix_test::read_body(response).await).expect("JSON body");
        body.pointer("/instance/id")
            .and_then(Value::as_str)
            .expect("instance id")
            .to_owned()
    }

    #[actix_web::test]
    async fn joining_seats_the_guest_next_to_the_host() {
        let app = actix_test::init_service(test_app()).await;
        let host = login_as(&app, "Ada").await;
        let id = open_quest(&app, &host).await;

        let guest = login_as(&app, "Grace").await;
        let response = actix_test::call_service(
            &app,
            actix_test::TestRequest::post()
                .uri(&format!("/api/lobbies/{id}/join"))
                .cookie(guest)
                .to_request(),
        )
        .await;
        assert_eq!(response.status(), StatusCode::OK);
        let lobby: Value =
            serde_json::from_slice(&actix_test::read_body(response).await).expect("JSON body");
        let members = lobby.pointer("/members").and_then(Value::as_array).expect("members");
        assert_eq!(members.len(), 2);
        assert_eq!(
            members[0].get("isHost").and_then(Value::as_bool),
            Some(true)
        );
        assert_eq!(lobby.get("allReady"), Some(&json!(false)));
        assert!(lobby.get("countdown").is_none());
        assert!(members
            .iter()
            .all(|member| member.get("monster").map_or(false, |badge| badge.get("level").is_some())));
    }

    #[actix_web::test]
    async fn countdown_starts_once_everyone_is_ready() {
        let app = actix_test::init_service(test_app()).await;
        let host = login_as(&app, "Ada").await;
        let id = open_quest(&app, &host).await;
        let guest = login_as(&app, "Grace").await;
        actix_test::call_service(
            &app,
            actix_test::TestRequest::post()
                .uri(&format!("/api/lobbies/{id}/join"))
                .cookie(guest.clone())
                .to_request(),
        )
        .await;

        let ready_uri = format!("/api/lobbies/{id}/ready");
        let response = actix_test::call_service(
            &app,
            actix_test::TestRequest::put()
                .uri(&ready_uri)
                .cookie(host)
                .to_request(),
        )
        .await;
        assert_eq!(response.status(), StatusCode::OK);
        let lobby: Value =
            serde_json::from_slice(&actix_test::read_body(response).await).expect("JSON body");
        assert_eq!(lobby.get("allReady"), Some(&json!(false)));

        let response = actix_test::call_service(
            &app,
            actix_test::TestRequest::put()
                .uri(&ready_uri)
                .cookie(guest)
                .to_request(),
        )
        .await;
        let lobby: Value =
            serde_json::from_slice(&actix_test::read_body(response).await).expect("JSON body");
        assert_eq!(lobby.get("allReady"), Some(&json!(true)));
        assert_eq!(lobby.get("countdown").and_then(Value::as_u64), Some(5));
    }

    #[actix_web::test]
    async fn emotes_are_member_only() {
        let app = actix_test::init_service(test_app()).await;
        let host = login_as(&app, "Ada").await;
        let id = open_quest(&app, &host).await;
        let emote_uri = format!("/api/lobbies/{id}/emote");

        let response = actix_test::call_service(
            &app,
            actix_test::TestRequest::post()
                .uri(&emote_uri)
                .cookie(host)
                .set_json(json!({ "emote": "🎉" }))
                .to_request(),
        )
        .await;
        assert_eq!(response.status(), StatusCode::OK);
        let event: Value =
            serde_json::from_slice(&actix_test::read_body(response).await).expect("JSON body");
        assert_eq!(event.get("emote").and_then(Value::as_str), Some("🎉"));

        let outsider = login_as(&app, "Grace").await;
        let response = actix_test::call_service(
            &app,
            actix_test::TestRequest::post()
                .uri(&emote_uri)
                .cookie(outsider)
                .set_json(json!({ "emote": "🎉" }))
                .to_request(),
        )
        .await;
        assert_eq!(response.status(), StatusCode::FORBIDDEN);
    }

    #[actix_web::test]
    async fn leaving_releases_the_seat() {
        let app = actix_test::init_service(test_app()).await;
        let host = login_as(&app, "Ada").await;
        let id = open_quest(&app, &host).await;
        let guest = login_as(&app, "Grace").await;
        actix_test::call_service(
            &app,
            actix_test::TestRequest::post()
                .uri(&format!("/api/lobbies/{id}/join"))
                .cookie(guest.clone())
                .to_request(),
        )
        .await;

        let response = actix_test::call_service(
            &app,
            actix_test::TestRequest::delete()
                .uri(&format!("/api/lobbies/{id}/leave"))
                .cookie(guest)
                .to_request(),
        )
        .await;
        assert_eq!(response.status(), StatusCode::NO_CONTENT);

        let response = actix_test::call_service(
            &app,
            actix_test::TestRequest::get()
                .uri(&format!("/api/lobbies/{id}"))
                .cookie(login_as(&app, "Edsger").await)
                .to_request(),
        )
        .await;
        let lobby: Value =
            serde_json::from_slice(&actix_test::read_body(response).await).expect("JSON body");
        assert_eq!(
            lobby.pointer("/members").and_then(Value::as_array).map(Vec::len),
            Some(1)
        );
    }
}

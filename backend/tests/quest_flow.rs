//! End-to-end flow over real Actix handlers: login, open a quest, fill the
//! lobby, agree in both consensus rounds, and collect the payout.

use actix_http::Request;
use actix_session::{storage::CookieSessionStore, SessionMiddleware};
use actix_web::body::MessageBody;
use actix_web::cookie::{Cookie, Key};
use actix_web::dev::{Service, ServiceResponse};
use actix_web::{http::StatusCode, test as actix_test, web, App};
use serde_json::{json, Value};

use gatherlings::domain::{CreationPolicy, ReadyPolicy};
use gatherlings::inbound::http::checkin::{
    complete_with_reaction, confirm, issue_code, submit_reaction, submit_word, verify_code,
    word_status,
};
use gatherlings::inbound::http::instances::{join_instance, list_instances, open_instance};
use gatherlings::inbound::http::lobbies::{get_lobby, join_lobby, toggle_ready};
use gatherlings::inbound::http::profile::{get_monster, list_connections, quest_history};
use gatherlings::inbound::http::state::HttpState;
use gatherlings::inbound::http::users::login;

fn test_app(
    state: HttpState,
) -> App<
    impl actix_web::dev::ServiceFactory<
        actix_web::dev::ServiceRequest,
        Config = (),
        Response = actix_web::dev::ServiceResponse,
        Error = actix_web::Error,
        InitError = (),
    >,
> {
    let session = SessionMiddleware::builder(CookieSessionStore::default(), Key::generate())
        .cookie_name("session".to_owned())
        .cookie_secure(false)
        .build();
    App::new().app_data(web::Data::new(state)).service(
        web::scope("/api")
            .wrap(session)
            .service(login)
            .service(list_instances)
            .service(open_instance)
            .service(join_instance)
            .service(get_lobby)
            .service(join_lobby)
            .service(toggle_ready)
            .service(submit_word)
            .service(word_status)
            .service(submit_reaction)
            .service(complete_with_reaction)
            .service(issue_code)
            .service(verify_code)
            .service(confirm)
            .service(get_monster)
            .service(list_connections)
            .service(quest_history),
    )
}

async fn login_as<S, B>(app: &S, name: &str) -> Cookie<'static>
where
    S: Service<Request, Response = ServiceResponse<B>, Error = actix_web::Error>,
    B: MessageBody,
{
    let response = actix_test::call_service(
        app,
        actix_test::TestRequest::post()
            .uri("/api/login")
            .set_json(json!({ "name": name }))
            .to_request(),
    )
    .await;
    assert!(response.status().is_success(), "login failed for {name}");
    response
        .response()
        .cookies()
        .find(|cookie| cookie.name() == "session")
        .expect("session cookie")
        .into_owned()
}

async fn get_json<S, B>(app: &S, cookie: &Cookie<'static>, uri: &str) -> Value
where
    S: Service<Request, Response = ServiceResponse<B>, Error = actix_web::Error>,
    B: MessageBody,
{
    let response = actix_test::call_service(
        app,
        actix_test::TestRequest::get()
            .uri(uri)
            .cookie(cookie.clone())
            .to_request(),
    )
    .await;
    assert_eq!(response.status(), StatusCode::OK, "{uri}");
    serde_json::from_slice(&actix_test::read_body(response).await).expect("JSON body")
}

async fn post_json<S, B>(
    app: &S,
    cookie: &Cookie<'static>,
    uri: &str,
    body: Value,
) -> (StatusCode, Value)
where
    S: Service<Request, Response = ServiceResponse<B>, Error = actix_web::Error>,
    B: MessageBody,
{
    let response = actix_test::call_service(
        app,
        actix_test::TestRequest::post()
            .uri(uri)
            .cookie(cookie.clone())
            .set_json(body)
            .to_request(),
    )
    .await;
    let status = response.status();
    let body = actix_test::read_body(response).await;
    let value = if body.is_empty() {
        Value::Null
    } else {
        serde_json::from_slice(&body).expect("JSON body")
    };
    (status, value)
}

#[actix_web::test]
async fn full_quest_flow_pays_out_and_records_the_ledger() {
    let state = HttpState::with_policies(CreationPolicy::Open, ReadyPolicy::default());
    let app = actix_test::init_service(test_app(state)).await;

    let ada = login_as(&app, "Ada").await;
    let grace = login_as(&app, "Grace").await;

    // Ada opens a coffee chat at the library hub.
    let (status, opened) = post_json(
        &app,
        &ada,
        "/api/quests/instances",
        json!({ "templateId": "coffee_chat", "hubId": "hub_library" }),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    let quest_id = opened
        .pointer("/instance/id")
        .and_then(Value::as_str)
        .expect("instance id")
        .to_owned();

    // Grace takes the second seat via the lobby.
    let (status, lobby) = post_json(
        &app,
        &grace,
        &format!("/api/lobbies/{quest_id}/join"),
        Value::Null,
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(
        lobby.get("members").and_then(Value::as_array).map(Vec::len),
        Some(2)
    );

    // Both toggle ready; the countdown starts once everyone is in.
    for cookie in [&ada, &grace] {
        let response = actix_test::call_service(
            &app,
            actix_test::TestRequest::put()
                .uri(&format!("/api/lobbies/{quest_id}/ready"))
                .cookie((*cookie).clone())
                .to_request(),
        )
        .await;
        assert_eq!(response.status(), StatusCode::OK);
    }
    let lobby = get_json(&app, &ada, &format!("/api/lobbies/{quest_id}")).await;
    assert_eq!(lobby.get("allReady"), Some(&json!(true)));
    assert_eq!(lobby.get("countdown").and_then(Value::as_u64), Some(5));

    // Word round: both pick the same word.
    for cookie in [&ada, &grace] {
        let (status, _) = post_json(
            &app,
            cookie,
            "/api/quests/word-selection",
            json!({ "questId": quest_id, "word": "lantern" }),
        )
        .await;
        assert_eq!(status, StatusCode::OK);
    }
    let word = get_json(&app, &ada, &format!("/api/quests/{quest_id}/word-status")).await;
    assert_eq!(word.get("matched"), Some(&json!(true)));
    assert_eq!(word.get("chosen"), Some(&json!("lantern")));

    // Reaction round: unanimous, so resolution pays out.
    for cookie in [&ada, &grace] {
        let (status, _) = post_json(
            &app,
            cookie,
            "/api/quests/reaction-selection",
            json!({ "questId": quest_id, "reaction": "🎉" }),
        )
        .await;
        assert_eq!(status, StatusCode::OK);
    }
    let (status, outcome) = post_json(
        &app,
        &ada,
        &format!("/api/quests/{quest_id}/complete-with-reaction"),
        Value::Null,
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(outcome.get("matched"), Some(&json!(true)));
    assert_eq!(
        outcome.pointer("/reward/crystals").and_then(Value::as_i64),
        Some(20)
    );
    assert_eq!(
        outcome.pointer("/reward/coins").and_then(Value::as_i64),
        Some(200)
    );

    // Every member got paid and the ledger recorded the quest.
    let monster = get_json(&app, &grace, "/api/monsters/me").await;
    assert_eq!(monster.get("crystals").and_then(Value::as_i64), Some(20));
    assert_eq!(monster.get("coins").and_then(Value::as_i64), Some(200));
    assert_eq!(
        monster.get("questsCompleted").and_then(Value::as_u64),
        Some(1)
    );

    let connections = get_json(&app, &ada, "/api/connections").await;
    let connections = connections.as_array().expect("array");
    assert_eq!(connections.len(), 1);
    assert_eq!(
        connections[0].get("connectedUserName"),
        Some(&json!("Grace"))
    );

    let history = get_json(&app, &ada, "/api/profile/me/history").await;
    assert_eq!(history.as_array().map(Vec::len), Some(1));
    assert_eq!(
        history[0].get("questKind"),
        Some(&json!("coffee_chat"))
    );

    // The retired quest no longer shows on the board.
    let board = get_json(&app, &ada, "/api/quests/instances").await;
    let on_board = board
        .as_array()
        .expect("array")
        .iter()
        .any(|snapshot| snapshot.pointer("/instance/id") == Some(&json!(quest_id.clone())));
    assert!(!on_board, "completed quest still listed");
}

#[actix_web::test]
async fn divergent_reactions_tear_the_quest_down() {
    let state = HttpState::with_policies(CreationPolicy::Open, ReadyPolicy::default());
    let app = actix_test::init_service(test_app(state)).await;

    let ada = login_as(&app, "Ada").await;
    let grace = login_as(&app, "Grace").await;

    let (_, opened) = post_json(
        &app,
        &ada,
        "/api/quests/instances",
        json!({ "templateId": "coffee_chat", "hubId": "hub_park" }),
    )
    .await;
    let quest_id = opened
        .pointer("/instance/id")
        .and_then(Value::as_str)
        .expect("instance id")
        .to_owned();
    post_json(
        &app,
        &grace,
        &format!("/api/quests/instances/{quest_id}/join"),
        Value::Null,
    )
    .await;

    for (cookie, reaction) in [(&ada, "🎉"), (&grace, "😂")] {
        post_json(
            &app,
            cookie,
            "/api/quests/reaction-selection",
            json!({ "questId": quest_id, "reaction": reaction }),
        )
        .await;
    }
    let (status, outcome) = post_json(
        &app,
        &ada,
        &format!("/api/quests/{quest_id}/complete-with-reaction"),
        Value::Null,
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(outcome.get("matched"), Some(&json!(false)));
    assert!(outcome.get("reward").is_none());

    // No payout and nothing in the ledger.
    let monster = get_json(&app, &ada, "/api/monsters/me").await;
    assert_eq!(monster.get("crystals").and_then(Value::as_i64), Some(0));
    let history = get_json(&app, &ada, "/api/profile/me/history").await;
    assert_eq!(history.as_array().map(Vec::len), Some(0));

    // The torn-down quest is gone from the board.
    let board = get_json(&app, &ada, "/api/quests/instances").await;
    let on_board = board
        .as_array()
        .expect("array")
        .iter()
        .any(|snapshot| snapshot.pointer("/instance/id") == Some(&json!(quest_id.clone())));
    assert!(!on_board, "torn-down quest still listed");
}

#[actix_web::test]
async fn presence_codes_back_the_confirm_fallback() {
    let state = HttpState::with_policies(CreationPolicy::Open, ReadyPolicy::default());
    let app = actix_test::init_service(test_app(state)).await;

    let ada = login_as(&app, "Ada").await;
    let grace = login_as(&app, "Grace").await;

    let (_, opened) = post_json(
        &app,
        &ada,
        "/api/quests/instances",
        json!({ "templateId": "coffee_chat", "hubId": "hub_library" }),
    )
    .await;
    let quest_id = opened
        .pointer("/instance/id")
        .and_then(Value::as_str)
        .expect("instance id")
        .to_owned();
    post_json(
        &app,
        &grace,
        &format!("/api/quests/instances/{quest_id}/join"),
        Value::Null,
    )
    .await;

    let code = get_json(&app, &ada, &format!("/api/checkin/{quest_id}/code")).await;
    let code = code.get("code").and_then(Value::as_str).expect("code");
    assert!(code.starts_with("GATHER_"));

    let (status, verified) =
        post_json(&app, &grace, "/api/checkin/verify", json!({ "code": code })).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(verified.get("valid"), Some(&json!(true)));

    let (status, reward) = post_json(
        &app,
        &grace,
        &format!("/api/checkin/{quest_id}/confirm"),
        Value::Null,
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(reward.get("crystals").and_then(Value::as_i64), Some(200));

    let monster = get_json(&app, &grace, "/api/monsters/me").await;
    // 200 crystals crosses two level thresholds.
    assert_eq!(monster.get("level").and_then(Value::as_u64), Some(3));
}

//! Backend entry-point: wires the REST endpoints, health probes, and the
//! OpenAPI document.

use actix_session::{storage::CookieSessionStore, SessionMiddleware};
use actix_web::cookie::{Key, SameSite};
use actix_web::{web, App, HttpServer};
use std::env;
use tracing::warn;
use tracing_subscriber::{fmt, EnvFilter};

use gatherlings::doc::openapi_json;
use gatherlings::inbound::http::checkin::{
    add_photo, complete_with_reaction, confirm, issue_code, photos, reaction_status, submit_reaction,
    submit_word, verify_code, word_status,
};
use gatherlings::inbound::http::health::{live, ready, HealthState};
use gatherlings::inbound::http::instances::{
    delete_instance, join_instance, list_hubs, list_instances, open_instance,
    trait_recommendations,
};
use gatherlings::inbound::http::lobbies::{
    get_lobby, join_lobby, leave_lobby, send_emote, toggle_ready,
};
use gatherlings::inbound::http::profile::{
    get_monster, list_connections, list_friends, quest_history, save_trait_scores,
};
use gatherlings::inbound::http::state::HttpState;
use gatherlings::inbound::http::templates::{create_template, get_template, list_templates};
use gatherlings::inbound::http::users::login;

/// Application bootstrap.
#[actix_web::main]
async fn main() -> std::io::Result<()> {
    if let Err(e) = fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .json()
        .try_init()
    {
        warn!(error = %e, "tracing init failed");
    }

    let key_path =
        env::var("SESSION_KEY_FILE").unwrap_or_else(|_| "/var/run/secrets/session_key".into());
    let key = match std::fs::read(&key_path) {
        Ok(bytes) => Key::derive_from(&bytes),
        Err(e) => {
            let allow_dev = env::var("SESSION_ALLOW_EPHEMERAL").ok().as_deref() == Some("1");
            if cfg!(debug_assertions) || allow_dev {
                warn!(path = %key_path, error = %e, "using temporary session key (dev only)");
                Key::generate()
            } else {
                return Err(std::io::Error::other(format!(
                    "failed to read session key at {key_path}: {e}"
                )));
            }
        }
    };

    let cookie_secure = env::var("SESSION_COOKIE_SECURE")
        .map(|v| v != "0")
        .unwrap_or(true);

    let state = web::Data::new(HttpState::in_memory());
    let health_state = web::Data::new(HealthState::new());
    // Clone for server factory so readiness probe remains accessible.
    let server_health_state = health_state.clone();
    let server = HttpServer::new(move || {
        let session = SessionMiddleware::builder(CookieSessionStore::default(), key.clone())
            .cookie_name("session".into())
            .cookie_path("/".into())
            .cookie_secure(cookie_secure)
            .cookie_http_only(true)
            .cookie_same_site(SameSite::Lax)
            .build();

        let api = web::scope("/api")
            .wrap(session)
            .service(login)
            .service(list_templates)
            .service(get_template)
            .service(create_template)
            .service(list_instances)
            .service(open_instance)
            .service(join_instance)
            .service(delete_instance)
            .service(trait_recommendations)
            .service(list_hubs)
            .service(get_lobby)
            .service(join_lobby)
            .service(toggle_ready)
            .service(send_emote)
            .service(leave_lobby)
            .service(submit_word)
            .service(word_status)
            .service(submit_reaction)
            .service(reaction_status)
            .service(complete_with_reaction)
            .service(issue_code)
            .service(verify_code)
            .service(confirm)
            .service(add_photo)
            .service(photos)
            .service(get_monster)
            .service(save_trait_scores)
            .service(list_connections)
            .service(list_friends)
            .service(quest_history)
            .service(openapi_json);

        App::new()
            .app_data(state.clone())
            .app_data(server_health_state.clone())
            .service(api)
            .service(ready)
            .service(live)
    })
    .bind(("0.0.0.0", 8080))?;

    health_state.mark_ready();
    server.run().await
}

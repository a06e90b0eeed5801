//! HTTP inbound adapter exposing REST endpoints.

pub mod checkin;
pub mod error;
pub mod health;
pub mod instances;
pub mod lobbies;
pub mod profile;
pub mod session;
pub mod state;
pub mod templates;
#[cfg(test)]
pub mod test_utils;
pub mod users;

pub use error::ApiResult;

//! Port for the external user/session collaborator's directory surface.

use std::collections::HashMap;

use async_trait::async_trait;

use crate::domain::user::{User, UserId};

use super::define_port_error;

define_port_error! {
    /// Errors raised by user directory adapters.
    pub enum UserDirectoryError {
        Storage { message: String } =>
            "user directory failed: {message}",
    }
}

/// Port for name lookups and login-time upserts.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait UserDirectory: Send + Sync {
    async fn upsert(&self, user: &User) -> Result<(), UserDirectoryError>;

    async fn find(&self, id: &UserId) -> Result<Option<User>, UserDirectoryError>;

    /// Resolve display names for a batch of ids; unknown ids are omitted.
    async fn names(&self, ids: &[UserId]) -> Result<HashMap<UserId, String>, UserDirectoryError>;
}

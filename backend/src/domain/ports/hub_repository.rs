//! Port for the read-only hub directory.

use async_trait::async_trait;

use crate::domain::hub::{Hub, HubId};

use super::define_port_error;

define_port_error! {
    /// Errors raised by hub directory adapters.
    pub enum HubRepositoryError {
        Storage { message: String } =>
            "hub directory failed: {message}",
    }
}

/// Port for looking up hubs.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait HubRepository: Send + Sync {
    async fn find(&self, id: &HubId) -> Result<Option<Hub>, HubRepositoryError>;

    async fn list(&self) -> Result<Vec<Hub>, HubRepositoryError>;
}

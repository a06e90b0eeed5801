//! Port for the quest template catalog.

use async_trait::async_trait;

use crate::domain::catalog::{QuestTemplate, TemplateId};

use super::define_port_error;

define_port_error! {
    /// Errors raised by template catalog adapters.
    pub enum TemplateRepositoryError {
        /// A template with the same id already exists.
        Duplicate { id: String } =>
            "template {id} already exists",
        /// Query or mutation failed during execution.
        Storage { message: String } =>
            "template repository failed: {message}",
    }
}

/// Port for reading and publishing quest templates.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait TemplateRepository: Send + Sync {
    /// Publish a new template. Fails with [`TemplateRepositoryError::Duplicate`]
    /// when the id is taken.
    async fn insert(&self, template: &QuestTemplate) -> Result<(), TemplateRepositoryError>;

    /// Find a template by id.
    async fn find(&self, id: &TemplateId)
        -> Result<Option<QuestTemplate>, TemplateRepositoryError>;

    /// List the full catalog.
    async fn list(&self) -> Result<Vec<QuestTemplate>, TemplateRepositoryError>;
}

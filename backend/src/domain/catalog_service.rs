//! Template catalog service: publishing and listing quest templates.

use std::sync::Arc;

use async_trait::async_trait;

use crate::domain::catalog::{QuestTemplate, TemplateId};
use crate::domain::error::Error;
use crate::domain::ports::{TemplateRepository, TemplateRepositoryError};

fn map_repository_error(error: TemplateRepositoryError) -> Error {
    match error {
        TemplateRepositoryError::Duplicate { id } => {
            Error::conflict(format!("template {id} already exists"))
        }
        TemplateRepositoryError::Storage { message } => {
            Error::internal(format!("template repository error: {message}"))
        }
    }
}

/// Driving port for catalog operations.
#[async_trait]
pub trait TemplateCatalog: Send + Sync {
    /// Publish a template after validating its invariants.
    async fn create_template(&self, template: QuestTemplate) -> Result<QuestTemplate, Error>;

    async fn list_templates(&self) -> Result<Vec<QuestTemplate>, Error>;

    async fn get_template(&self, id: &TemplateId) -> Result<QuestTemplate, Error>;
}

/// Catalog service backed by a template repository.
#[derive(Clone)]
pub struct CatalogService<T> {
    templates: Arc<T>,
}

impl<T> CatalogService<T> {
    pub fn new(templates: Arc<T>) -> Self {
        Self { templates }
    }
}

#[async_trait]
impl<T> TemplateCatalog for CatalogService<T>
where
    T: TemplateRepository,
{
    async fn create_template(&self, template: QuestTemplate) -> Result<QuestTemplate, Error> {
        template
            .validate()
            .map_err(|err| Error::invalid_request(err.to_string()))?;
        self.templates
            .insert(&template)
            .await
            .map_err(map_repository_error)?;
        tracing::info!(template = %template.id, "quest template published");
        Ok(template)
    }

    async fn list_templates(&self) -> Result<Vec<QuestTemplate>, Error> {
        self.templates.list().await.map_err(map_repository_error)
    }

    async fn get_template(&self, id: &TemplateId) -> Result<QuestTemplate, Error> {
        self.templates
            .find(id)
            .await
            .map_err(map_repository_error)?
            .ok_or_else(|| Error::not_found(format!("template {id} not found")))
    }
}

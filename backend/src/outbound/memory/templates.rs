//! In-memory template repository.

use std::collections::BTreeMap;
use std::sync::{Mutex, MutexGuard, PoisonError};

use async_trait::async_trait;

use crate::domain::catalog::{QuestTemplate, TemplateId};
use crate::domain::ports::{TemplateRepository, TemplateRepositoryError};

#[derive(Debug, Default)]
pub struct MemoryTemplates {
    inner: Mutex<BTreeMap<TemplateId, QuestTemplate>>,
}

impl MemoryTemplates {
    pub fn new() -> Self {
        Self::default()
    }

    /// Repository preloaded with `templates`; later duplicates win nothing.
    pub fn seeded(templates: Vec<QuestTemplate>) -> Self {
        let repo = Self::new();
        {
            let mut guard = repo.lock();
            for template in templates {
                guard.entry(template.id.clone()).or_insert(template);
            }
        }
        repo
    }

    fn lock(&self) -> MutexGuard<'_, BTreeMap<TemplateId, QuestTemplate>> {
        self.inner.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

#[async_trait]
impl TemplateRepository for MemoryTemplates {
    async fn insert(&self, template: &QuestTemplate) -> Result<(), TemplateRepositoryError> {
        let mut guard = self.lock();
        if guard.contains_key(&template.id) {
            return Err(TemplateRepositoryError::duplicate(template.id.as_str()));
        }
        guard.insert(template.id.clone(), template.clone());
        Ok(())
    }

    async fn find(&self, id: &TemplateId) -> Result<Option<QuestTemplate>, TemplateRepositoryError> {
        Ok(self.lock().get(id).cloned())
    }

    async fn list(&self) -> Result<Vec<QuestTemplate>, TemplateRepositoryError> {
        Ok(self.lock().values().cloned().collect())
    }
}

//! In-memory hub directory.

use std::collections::BTreeMap;
use std::sync::{Mutex, MutexGuard, PoisonError};

use async_trait::async_trait;

use crate::domain::hub::{Hub, HubId};
use crate::domain::ports::{HubRepository, HubRepositoryError};

#[derive(Debug, Default)]
pub struct MemoryHubs {
    inner: Mutex<BTreeMap<String, Hub>>,
}

impl MemoryHubs {
    pub fn seeded(hubs: Vec<Hub>) -> Self {
        let inner = hubs
            .into_iter()
            .map(|hub| (hub.id.as_str().to_owned(), hub))
            .collect();
        Self {
            inner: Mutex::new(inner),
        }
    }

    fn lock(&self) -> MutexGuard<'_, BTreeMap<String, Hub>> {
        self.inner.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

#[async_trait]
impl HubRepository for MemoryHubs {
    async fn find(&self, id: &HubId) -> Result<Option<Hub>, HubRepositoryError> {
        Ok(self.lock().get(id.as_str()).cloned())
    }

    async fn list(&self) -> Result<Vec<Hub>, HubRepositoryError> {
        Ok(self.lock().values().cloned().collect())
    }
}

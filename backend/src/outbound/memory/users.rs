//! In-memory user directory.

use std::collections::HashMap;
use std::sync::{Mutex, MutexGuard, PoisonError};

use async_trait::async_trait;

use crate::domain::ports::{UserDirectory, UserDirectoryError};
use crate::domain::user::{User, UserId};

#[derive(Debug, Default)]
pub struct MemoryUsers {
    inner: Mutex<HashMap<UserId, User>>,
}

impl MemoryUsers {
    pub fn new() -> Self {
        Self::default()
    }

    fn lock(&self) -> MutexGuard<'_, HashMap<UserId, User>> {
        self.inner.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

#[async_trait]
impl UserDirectory for MemoryUsers {
    async fn upsert(&self, user: &User) -> Result<(), UserDirectoryError> {
        self.lock().insert(user.id().clone(), user.clone());
        Ok(())
    }

    async fn find(&self, id: &UserId) -> Result<Option<User>, UserDirectoryError> {
        Ok(self.lock().get(id).cloned())
    }

    async fn names(&self, ids: &[UserId]) -> Result<HashMap<UserId, String>, UserDirectoryError> {
        let guard = self.lock();
        Ok(ids
            .iter()
            .filter_map(|id| guard.get(id).map(|user| (id.clone(), user.name().to_owned())))
            .collect())
    }
}

//! In-memory economy store.

use std::collections::HashMap;
use std::sync::{Mutex, MutexGuard, PoisonError};

use async_trait::async_trait;
use rand::Rng;

use crate::domain::monster::Monster;
use crate::domain::ports::{MonsterRepository, MonsterRepositoryError};
use crate::domain::user::UserId;

/// Number of visual monster variants to pick from at creation.
const MONSTER_TYPES: u8 = 9;

#[derive(Debug, Default)]
pub struct MemoryMonsters {
    inner: Mutex<HashMap<UserId, Monster>>,
}

impl MemoryMonsters {
    pub fn new() -> Self {
        Self::default()
    }

    fn lock(&self) -> MutexGuard<'_, HashMap<UserId, Monster>> {
        self.inner.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

#[async_trait]
impl MonsterRepository for MemoryMonsters {
    async fn ensure(&self, user: &UserId) -> Result<Monster, MonsterRepositoryError> {
        let mut guard = self.lock();
        let monster = guard.entry(user.clone()).or_insert_with(|| {
            let monster_type = rand::thread_rng().gen_range(1..=MONSTER_TYPES);
            Monster::starter(user.clone(), monster_type)
        });
        Ok(monster.clone())
    }

    async fn find(&self, user: &UserId) -> Result<Option<Monster>, MonsterRepositoryError> {
        Ok(self.lock().get(user).cloned())
    }

    async fn save(&self, monster: &Monster) -> Result<(), MonsterRepositoryError> {
        self.lock()
            .insert(monster.user_id.clone(), monster.clone());
        Ok(())
    }

    async fn save_all(&self, monsters: &[Monster]) -> Result<(), MonsterRepositoryError> {
        let mut guard = self.lock();
        for monster in monsters {
            guard.insert(monster.user_id.clone(), monster.clone());
        }
        Ok(())
    }
}

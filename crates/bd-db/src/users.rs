//! User repository

use async_trait::async_trait;
use bd_core::traits::Id;
use bd_models::User;

use crate::memory::MemoryTable;
use crate::repository::{Record, RepositoryResult};

#[async_trait]
pub trait UserRepository: Send + Sync {
    async fn find_by_id(&self, id: Id) -> RepositoryResult<Option<User>>;
    async fn find_by_username(&self, username: &str) -> RepositoryResult<Option<User>>;
    async fn save(&self, user: User) -> RepositoryResult<User>;
}

impl Record for User {
    fn record_id(&self) -> Option<Id> {
        self.id
    }

    fn assign_id(&mut self, id: Id) {
        self.id = Some(id);
    }
}

#[derive(Default)]
pub struct MemoryUserRepository {
    table: MemoryTable<User>,
}

impl MemoryUserRepository {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl UserRepository for MemoryUserRepository {
    async fn find_by_id(&self, id: Id) -> RepositoryResult<Option<User>> {
        Ok(self.table.get(id).await)
    }

    async fn find_by_username(&self, username: &str) -> RepositoryResult<Option<User>> {
        Ok(self.table.find(|u| u.username == username).await)
    }

    async fn save(&self, user: User) -> RepositoryResult<User> {
        self.table
            .save(user, |new, existing| {
                (new.username == existing.username)
                    .then(|| format!("username '{}' is already taken", new.username))
            })
            .await
    }
}

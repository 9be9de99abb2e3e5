//! Keyed async mutexes
//!
//! One lock per id, created on first use. Callers that need several keys go
//! through [`KeyedLocks::lock_many`], which acquires in ascending id order.

use std::sync::Arc;

use bd_core::traits::Id;
use dashmap::DashMap;
use tokio::sync::{Mutex, OwnedMutexGuard};

#[derive(Clone, Default)]
pub struct KeyedLocks {
    locks: Arc<DashMap<Id, Arc<Mutex<()>>>>,
}

impl KeyedLocks {
    pub fn new() -> Self {
        Self::default()
    }

    fn handle(&self, id: Id) -> Arc<Mutex<()>> {
        self.locks
            .entry(id)
            .or_insert_with(|| Arc::new(Mutex::new(())))
            .clone()
    }

    pub async fn lock(&self, id: Id) -> OwnedMutexGuard<()> {
        self.handle(id).lock_owned().await
    }

    pub async fn lock_many(&self, ids: impl IntoIterator<Item = Id>) -> Vec<OwnedMutexGuard<()>> {
        let mut ids: Vec<Id> = ids.into_iter().collect();
        ids.sort_unstable();
        ids.dedup();

        let mut guards = Vec::with_capacity(ids.len());
        for id in ids {
            guards.push(self.lock(id).await);
        }
        guards
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;

    #[tokio::test]
    async fn test_same_key_is_exclusive() {
        let locks = KeyedLocks::new();
        let guard = locks.lock(1).await;

        let other = locks.clone();
        let waiter = tokio::spawn(async move {
            let _g = other.lock(1).await;
        });
        tokio::time::sleep(Duration::from_millis(20)).await;
        assert!(!waiter.is_finished());

        drop(guard);
        waiter.await.unwrap();
    }

    #[tokio::test]
    async fn test_lock_many_dedups() {
        let locks = KeyedLocks::new();
        let guards = locks.lock_many([3, 1, 3, 2]).await;
        assert_eq!(guards.len(), 3);
        drop(guards);
        let _again = locks.lock(3).await;
    }
}

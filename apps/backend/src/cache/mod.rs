//! Optional cache of active room snapshots, keyed by room id.
//!
//! The store stays the source of truth: entries are refreshed after every
//! successful commit and invalidated whenever a commit fails.

use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use moka::future::Cache;

use crate::domain::snapshot::RoomSnapshot;
use crate::errors::domain::DomainError;

#[async_trait]
pub trait StateCache: Send + Sync {
    async fn get(&self, room_id: &str) -> Result<Option<Arc<RoomSnapshot>>, DomainError>;
    async fn put(&self, snapshot: Arc<RoomSnapshot>) -> Result<(), DomainError>;
    async fn invalidate(&self, room_id: &str) -> Result<(), DomainError>;
}

/// In-process cache backed by moka.
#[derive(Clone)]
pub struct MokaStateCache {
    inner: Cache<String, Arc<RoomSnapshot>>,
}

impl MokaStateCache {
    pub fn new(max_rooms: u64, ttl: Duration) -> Self {
        Self {
            inner: Cache::builder()
                .max_capacity(max_rooms)
                .time_to_live(ttl)
                .build(),
        }
    }
}

#[async_trait]
impl StateCache for MokaStateCache {
    async fn get(&self, room_id: &str) -> Result<Option<Arc<RoomSnapshot>>, DomainError> {
        Ok(self.inner.get(room_id).await)
    }

    async fn put(&self, snapshot: Arc<RoomSnapshot>) -> Result<(), DomainError> {
        self.inner
            .insert(snapshot.room.room_id.clone(), snapshot)
            .await;
        Ok(())
    }

    async fn invalidate(&self, room_id: &str) -> Result<(), DomainError> {
        self.inner.invalidate(room_id).await;
        Ok(())
    }
}

//! A cache whose every operation fails, for degraded-infrastructure tests.

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

use async_trait::async_trait;
use avalon_backend::cache::StateCache;
use avalon_backend::domain::snapshot::RoomSnapshot;
use avalon_backend::errors::domain::{DomainError, InfraErrorKind};

#[derive(Default)]
pub struct FlakyCache {
    pub calls: AtomicUsize,
}

impl FlakyCache {
    fn fail(&self) -> DomainError {
        self.calls.fetch_add(1, Ordering::SeqCst);
        DomainError::infra(InfraErrorKind::CacheUnavailable, "cache node unreachable")
    }

    pub fn call_count(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl StateCache for FlakyCache {
    async fn get(&self, _room_id: &str) -> Result<Option<Arc<RoomSnapshot>>, DomainError> {
        Err(self.fail())
    }

    async fn put(&self, _snapshot: Arc<RoomSnapshot>) -> Result<(), DomainError> {
        Err(self.fail())
    }

    async fn invalidate(&self, _room_id: &str) -> Result<(), DomainError> {
        Err(self.fail())
    }
}

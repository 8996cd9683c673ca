//! Per-room critical sections.
//!
//! One async mutex per room id, created on first use. Holding the guard
//! across load, apply and commit is what serializes commands for a room;
//! different rooms never contend.

use std::sync::Arc;

use dashmap::DashMap;
use tokio::sync::{Mutex, OwnedMutexGuard};

use crate::domain::state::RoomId;

#[derive(Default)]
pub struct RoomLocks {
    inner: DashMap<RoomId, Arc<Mutex<()>>>,
}

impl RoomLocks {
    /// Wait for exclusive access to `room_id`.
    pub async fn lock(&self, room_id: &str) -> OwnedMutexGuard<()> {
        let mutex = self
            .inner
            .entry(room_id.to_string())
            .or_default()
            .value()
            .clone();
        mutex.lock_owned().await
    }

    /// Drop the entry for `room_id` if nobody holds or awaits it.
    ///
    /// Call after the guard has been released.
    pub fn reclaim(&self, room_id: &str) -> bool {
        self.inner
            .remove_if(room_id, |_, mutex| Arc::strong_count(mutex) == 1)
            .is_some()
    }

    /// Release `guard`; when no room is stored under `room_id`, drop its
    /// entry as well so ids that never held a room leave nothing behind.
    pub fn release(&self, room_id: &str, guard: OwnedMutexGuard<()>, room_stored: bool) -> bool {
        drop(guard);
        !room_stored && self.reclaim(room_id)
    }

    pub fn len(&self) -> usize {
        self.inner.len()
    }

    pub fn is_empty(&self) -> bool {
        self.inner.is_empty()
    }
}

use std::sync::Arc;

use crate::cache::StateCache;
use crate::domain::rules::RuleSet;
use crate::infra::seed::SeedSource;
use crate::services::room_locks::RoomLocks;
use crate::store::GameStore;

/// Shared handles every command needs. Cheap to clone.
#[derive(Clone)]
pub struct AppState {
    /// Source of truth for rooms, games and history.
    pub store: Arc<dyn GameStore>,
    /// Snapshot cache; `None` when disabled.
    pub cache: Option<Arc<dyn StateCache>>,
    /// Per-room critical sections.
    pub locks: Arc<RoomLocks>,
    pub rules: Arc<RuleSet>,
    pub seeds: Arc<dyn SeedSource>,
}

impl AppState {
    pub fn store(&self) -> &dyn GameStore {
        self.store.as_ref()
    }

    pub fn cache(&self) -> Option<&dyn StateCache> {
        self.cache.as_deref()
    }

    pub fn rules(&self) -> &RuleSet {
        &self.rules
    }
}

impl std::fmt::Debug for AppState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AppState")
            .field("cache_enabled", &self.cache.is_some())
            .field("locked_rooms", &self.locks.len())
            .finish_non_exhaustive()
    }
}

use std::sync::Arc;

use tracing::info;

use crate::cache::{MokaStateCache, StateCache};
use crate::config::Settings;
use crate::domain::rules::RuleSet;
use crate::error::AppError;
use crate::infra::seed::{OsSeedSource, SeedSource};
use crate::services::room_locks::RoomLocks;
use crate::state::app_state::AppState;
use crate::store::{GameStore, InMemoryStore};

/// Builder for creating AppState instances (used in both tests and main)
pub struct StateBuilder {
    settings: Settings,
    store: Option<Arc<dyn GameStore>>,
    cache: Option<Option<Arc<dyn StateCache>>>,
    rules: Option<RuleSet>,
    seeds: Option<Arc<dyn SeedSource>>,
}

impl StateBuilder {
    pub fn new() -> Self {
        Self {
            settings: Settings::default(),
            store: None,
            cache: None,
            rules: None,
            seeds: None,
        }
    }

    pub fn with_settings(mut self, settings: Settings) -> Self {
        self.settings = settings;
        self
    }

    pub fn with_store(mut self, store: Arc<dyn GameStore>) -> Self {
        self.store = Some(store);
        self
    }

    pub fn with_cache(mut self, cache: Arc<dyn StateCache>) -> Self {
        self.cache = Some(Some(cache));
        self
    }

    pub fn without_cache(mut self) -> Self {
        self.cache = Some(None);
        self
    }

    pub fn with_rules(mut self, rules: RuleSet) -> Self {
        self.rules = Some(rules);
        self
    }

    pub fn with_seed_source(mut self, seeds: Arc<dyn SeedSource>) -> Self {
        self.seeds = Some(seeds);
        self
    }

    pub async fn build(self) -> Result<AppState, AppError> {
        let rules = match self.rules {
            Some(rules) => {
                rules.validate().map_err(|e| AppError::config(e.to_string()))?;
                rules
            }
            None => self.settings.load_rules()?,
        };

        let store = self.store.unwrap_or_else(|| Arc::new(InMemoryStore::new()));

        let cache = match self.cache {
            Some(explicit) => explicit,
            None => self.settings.cache_ttl.map(|ttl| {
                Arc::new(MokaStateCache::new(self.settings.cache_max_rooms, ttl))
                    as Arc<dyn StateCache>
            }),
        };

        info!(
            app_env = ?self.settings.app_env,
            cache_enabled = cache.is_some(),
            player_counts = ?rules.tables.iter().map(|t| t.players).collect::<Vec<_>>(),
            "engine state built"
        );

        Ok(AppState {
            store,
            cache,
            locks: Arc::new(RoomLocks::default()),
            rules: Arc::new(rules),
            seeds: self.seeds.unwrap_or_else(|| Arc::new(OsSeedSource)),
        })
    }
}

impl Default for StateBuilder {
    fn default() -> Self {
        Self::new()
    }
}

pub fn build_state() -> StateBuilder {
    StateBuilder::new()
}

//! Engine fixtures for integration tests.

use std::sync::Arc;

use avalon_backend::cache::StateCache;
use avalon_backend::infra::seed::FixedSeedSource;
use avalon_backend::infra::state::{build_state, StateBuilder};
use avalon_backend::store::InMemoryStore;
use avalon_backend::{AppError, CommandDispatcher};

/// Dispatcher plus a handle on its store for inspection and fault injection.
pub struct TestEngine {
    pub dispatcher: CommandDispatcher,
    pub store: Arc<InMemoryStore>,
}

pub struct TestEngineOptions {
    pub seed_start: u64,
    pub cache: CacheChoice,
}

pub enum CacheChoice {
    Default,
    Disabled,
    Custom(Arc<dyn StateCache>),
}

impl Default for TestEngineOptions {
    fn default() -> Self {
        Self {
            seed_start: 7,
            cache: CacheChoice::Default,
        }
    }
}

impl TestEngineOptions {
    pub fn with_seed(mut self, seed: u64) -> Self {
        self.seed_start = seed;
        self
    }

    pub fn without_cache(mut self) -> Self {
        self.cache = CacheChoice::Disabled;
        self
    }

    pub fn with_cache(mut self, cache: Arc<dyn StateCache>) -> Self {
        self.cache = CacheChoice::Custom(cache);
        self
    }
}

pub fn test_state_builder(store: Arc<InMemoryStore>, seed_start: u64) -> StateBuilder {
    build_state()
        .with_store(store)
        .with_seed_source(Arc::new(FixedSeedSource::new(seed_start)))
}

pub async fn build_test_engine_with(options: TestEngineOptions) -> Result<TestEngine, AppError> {
    let store = Arc::new(InMemoryStore::new());
    let builder = test_state_builder(Arc::clone(&store), options.seed_start);
    let builder = match options.cache {
        CacheChoice::Default => builder,
        CacheChoice::Disabled => builder.without_cache(),
        CacheChoice::Custom(cache) => builder.with_cache(cache),
    };
    let state = builder.build().await?;
    Ok(TestEngine {
        dispatcher: CommandDispatcher::new(state),
        store,
    })
}

pub async fn build_test_engine() -> Result<TestEngine, AppError> {
    build_test_engine_with(TestEngineOptions::default()).await
}

//! Application wiring
//!
//! Builds the store, repository, serving and authoring services and the
//! engagement tracker from a `StaticConfig`. All components share one store
//! and one clock.

use std::sync::Arc;

use tracing::{debug, info};

use crate::analytics::EngagementTracker;
use crate::config::StaticConfig;
use crate::errors::Result;
use crate::services::{ContentService, ServingService};
use crate::storage::{ContentRepository, KeyValueStore, StoreFactory};
use crate::utils::{Clock, SystemClock};

pub struct PromoRuntime {
    pub store: Arc<dyn KeyValueStore>,
    pub repository: Arc<ContentRepository>,
    pub serving: Arc<ServingService>,
    pub content: ContentService,
    pub tracker: EngagementTracker,
    pub clock: Arc<dyn Clock>,
}

impl PromoRuntime {
    /// 按配置创建存储并装配全部组件
    pub fn from_config(config: &StaticConfig) -> Result<Self> {
        let start_time = std::time::Instant::now();
        let store = StoreFactory::create(&config.storage)?;
        let runtime = Self::with_store(store, config, SystemClock::arc());
        info!(
            "Runtime ready in {:.2}ms ({} store)",
            start_time.elapsed().as_secs_f64() * 1000.0,
            runtime.store.backend_name()
        );
        Ok(runtime)
    }

    /// 使用给定存储与时钟装配，测试中常配合 `MemoryStore` 与 `FixedClock`
    pub fn with_store(store: Arc<dyn KeyValueStore>, config: &StaticConfig, clock: Arc<dyn Clock>) -> Self {
        let repository = Arc::new(ContentRepository::new(
            Arc::clone(&store),
            config.storage.content_units_key.clone(),
            Arc::clone(&clock),
        ));
        let serving = Arc::new(ServingService::from_config(
            repository.clone(),
            Arc::clone(&clock),
            config,
        ));
        let content = ContentService::new(Arc::clone(&repository), Arc::clone(&serving));
        let tracker = EngagementTracker::new(
            Arc::clone(&store),
            config.storage.engagement_events_key.clone(),
            config.engagement.max_events,
            Arc::clone(&clock),
        );
        debug!(
            "Loaded {} engagement events (cap {})",
            tracker.len(),
            config.engagement.max_events
        );

        Self {
            store,
            repository,
            serving,
            content,
            tracker,
            clock,
        }
    }
}

//! Serving service
//!
//! Entry point for rendering collaborators. Nothing here returns an error:
//! fetch failures degrade to an empty result, which is also never cached.

use std::sync::Arc;

use chrono::{DateTime, Utc};
use tracing::{debug, warn};

use crate::cache::{CacheStats, CoalescingCache, ContextFingerprint};
use crate::config::StaticConfig;
use crate::errors::PromoError;
use crate::resolve::{self, ContextDefaults, PageContext, PageResolution, PlacementQuery};
use crate::services::source::ContentSource;
use crate::storage::{ContentUnit, Slot};
use crate::utils::Clock;

pub struct ServingService {
    source: Arc<dyn ContentSource>,
    page_cache: CoalescingCache<ContextFingerprint, PageResolution>,
    clock: Arc<dyn Clock>,
    defaults: ContextDefaults,
}

impl ServingService {
    pub fn new(
        source: Arc<dyn ContentSource>,
        clock: Arc<dyn Clock>,
        defaults: ContextDefaults,
        cache_capacity: u64,
    ) -> Self {
        Self {
            source,
            page_cache: CoalescingCache::new(cache_capacity),
            clock,
            defaults,
        }
    }

    pub fn from_config(
        source: Arc<dyn ContentSource>,
        clock: Arc<dyn Clock>,
        config: &StaticConfig,
    ) -> Self {
        Self::new(
            source,
            clock,
            ContextDefaults::from(&config.resolution),
            config.cache.max_capacity,
        )
    }

    pub fn defaults(&self) -> &ContextDefaults {
        &self.defaults
    }

    pub fn fingerprint(&self, ctx: &PageContext) -> ContextFingerprint {
        ContextFingerprint::from(&ctx.resolve(&self.defaults))
    }

    /// Resolve every known slot for a page
    ///
    /// Identical contexts share one cached result; concurrent misses for the
    /// same context share one fetch.
    pub async fn resolve_page(&self, ctx: &PageContext) -> Arc<PageResolution> {
        let resolved = ctx.resolve(&self.defaults);
        let key = ContextFingerprint::from(&resolved);

        let source = Arc::clone(&self.source);
        let clock = Arc::clone(&self.clock);
        let fetch = move || async move {
            let units = source.fetch_units().await?;
            let now = clock.now();
            debug!(
                "Resolving page {} against {} content units",
                resolved.page_scope,
                units.len()
            );
            Ok::<_, PromoError>(resolve::resolve_page(&units, &resolved, now))
        };

        match self.page_cache.get_or_fetch(key.clone(), fetch).await {
            Ok(page) => page,
            Err(e) => {
                warn!("Page resolution for {} failed, serving nothing: {}", key, e);
                Arc::new(PageResolution::empty())
            }
        }
    }

    /// Winner for a single slot, through the page cache
    pub async fn resolve_slot(&self, ctx: &PageContext, slot: Slot) -> Option<ContentUnit> {
        self.resolve_page(ctx).await.get(slot).cloned()
    }

    /// Rotation mode: the full ranked list for one placement
    ///
    /// Not cached; `now` is supplied by the caller.
    pub async fn resolve_for_placement(
        &self,
        query: &PlacementQuery,
        now: DateTime<Utc>,
    ) -> Vec<ContentUnit> {
        match self.source.fetch_units().await {
            Ok(units) => resolve::resolve_for_placement(&units, query, now),
            Err(e) => {
                warn!(
                    "Placement resolution for {} failed, serving nothing: {}",
                    query.placement.placement(),
                    e
                );
                Vec::new()
            }
        }
    }

    /// Drop every cached page and retire in-flight fetches
    pub fn invalidate(&self) {
        self.page_cache.invalidate();
    }

    pub fn is_pending(&self, ctx: &PageContext) -> bool {
        self.page_cache.is_pending(&self.fingerprint(ctx))
    }

    pub fn pending_len(&self) -> usize {
        self.page_cache.pending_len()
    }

    pub fn cached(&self, ctx: &PageContext) -> Option<Arc<PageResolution>> {
        self.page_cache.get(&self.fingerprint(ctx))
    }

    pub fn cache_stats(&self) -> CacheStats {
        self.page_cache.stats()
    }
}

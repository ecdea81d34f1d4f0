//! 互动事件记录器
//!
//! 日志按时间倒序（最新在前）保存，超过上限时淘汰最旧的事件。
//! 记录是尽力而为的遥测：持久化失败只记 warn，不向调用方报错。
//! 不做去重，去重由调用方负责（见 `ImpressionLatch`）。

use std::collections::{HashMap, VecDeque};
use std::sync::Arc;

use parking_lot::Mutex;
use serde::Serialize;
use tracing::{trace, warn};

use super::{EngagementEvent, EngagementKind};
use crate::storage::kv::KeyValueStore;
use crate::utils::Clock;

/// 单个推广内容的互动统计
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize)]
pub struct EngagementStats {
    pub impressions: u64,
    pub clicks: u64,
}

impl EngagementStats {
    /// 点击率，无曝光时为 0
    pub fn click_through_rate(&self) -> f64 {
        if self.impressions == 0 {
            0.0
        } else {
            self.clicks as f64 / self.impressions as f64
        }
    }

    fn count(&mut self, kind: EngagementKind) {
        match kind {
            EngagementKind::Impression => self.impressions += 1,
            EngagementKind::Click => self.clicks += 1,
        }
    }
}

pub struct EngagementTracker {
    store: Arc<dyn KeyValueStore>,
    key: String,
    max_events: usize,
    clock: Arc<dyn Clock>,
    /// 最新事件在队首
    log: Mutex<VecDeque<EngagementEvent>>,
}

impl EngagementTracker {
    /// 创建记录器并加载已持久化的日志，内容损坏时从空日志开始
    pub fn new(
        store: Arc<dyn KeyValueStore>,
        key: impl Into<String>,
        max_events: usize,
        clock: Arc<dyn Clock>,
    ) -> Self {
        let key = key.into();
        let mut log = load_log(store.as_ref(), &key);
        log.truncate(max_events);
        Self {
            store,
            key,
            max_events,
            clock,
            log: Mutex::new(log),
        }
    }

    pub fn record_impression(&self, content_unit_id: &str) {
        self.record(content_unit_id, EngagementKind::Impression);
    }

    pub fn record_click(&self, content_unit_id: &str) {
        self.record(content_unit_id, EngagementKind::Click);
    }

    fn record(&self, content_unit_id: &str, kind: EngagementKind) {
        let event = EngagementEvent {
            content_unit_id: content_unit_id.to_string(),
            kind,
            timestamp: self.clock.now(),
        };

        let mut log = self.log.lock();
        log.push_front(event);
        log.truncate(self.max_events);
        trace!(
            "EngagementTracker: recorded {} for {}, log size {}",
            kind,
            content_unit_id,
            log.len()
        );

        // 持锁写入，保证落盘顺序与内存一致
        let persisted = serde_json::to_string(&*log)
            .map_err(|e| e.to_string())
            .and_then(|json| self.store.set(&self.key, &json).map_err(|e| e.to_string()));
        if let Err(e) = persisted {
            warn!(
                "EngagementTracker: failed to persist {} for {}: {}",
                kind, content_unit_id, e
            );
        }
    }

    /// 日志快照，最新在前
    pub fn events(&self) -> Vec<EngagementEvent> {
        self.log.lock().iter().cloned().collect()
    }

    pub fn len(&self) -> usize {
        self.log.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.log.lock().is_empty()
    }

    pub fn stats_for(&self, content_unit_id: &str) -> EngagementStats {
        let mut stats = EngagementStats::default();
        for event in self
            .log
            .lock()
            .iter()
            .filter(|e| e.content_unit_id == content_unit_id)
        {
            stats.count(event.kind);
        }
        stats
    }

    pub fn stats(&self) -> HashMap<String, EngagementStats> {
        let mut all: HashMap<String, EngagementStats> = HashMap::new();
        for event in self.log.lock().iter() {
            all.entry(event.content_unit_id.clone())
                .or_default()
                .count(event.kind);
        }
        all
    }
}

fn load_log(store: &dyn KeyValueStore, key: &str) -> VecDeque<EngagementEvent> {
    let raw = match store.get(key) {
        Ok(Some(raw)) => raw,
        Ok(None) => return VecDeque::new(),
        Err(e) => {
            warn!("EngagementTracker: failed to load '{}', starting empty: {}", key, e);
            return VecDeque::new();
        }
    };
    match serde_json::from_str::<VecDeque<EngagementEvent>>(&raw) {
        Ok(log) => log,
        Err(e) => {
            warn!("EngagementTracker: malformed log under '{}', starting empty: {}", key, e);
            VecDeque::new()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::errors::{PromoError, Result};
    use crate::storage::kv::MemoryStore;
    use crate::utils::FixedClock;
    use chrono::{Duration, TimeZone, Utc};

    const KEY: &str = "promo.engagement_events";

    fn tracker(max_events: usize) -> (EngagementTracker, Arc<MemoryStore>, Arc<FixedClock>) {
        let store = Arc::new(MemoryStore::new());
        let clock = Arc::new(FixedClock::new(Utc.timestamp_opt(1_000, 0).unwrap()));
        let tracker = EngagementTracker::new(store.clone(), KEY, max_events, clock.clone());
        (tracker, store, clock)
    }

    struct FailingStore;

    impl KeyValueStore for FailingStore {
        fn get(&self, _key: &str) -> Result<Option<String>> {
            Err(PromoError::storage("unavailable"))
        }

        fn set(&self, _key: &str, _value: &str) -> Result<()> {
            Err(PromoError::storage("unavailable"))
        }

        fn backend_name(&self) -> &'static str {
            "failing"
        }
    }

    #[test]
    fn test_records_newest_first_and_persists() {
        let (tracker, store, clock) = tracker(1000);
        tracker.record_impression("u1");
        clock.advance(Duration::seconds(1));
        tracker.record_click("u1");

        let events = tracker.events();
        assert_eq!(events.len(), 2);
        assert_eq!(events[0].kind, EngagementKind::Click);
        assert_eq!(events[1].kind, EngagementKind::Impression);

        let persisted: Vec<EngagementEvent> =
            serde_json::from_str(&store.get(KEY).unwrap().unwrap()).unwrap();
        assert_eq!(persisted, events);
    }

    #[test]
    fn test_log_is_capped_and_evicts_oldest() {
        let (tracker, _, clock) = tracker(1000);
        tracker.record_impression("first");
        for _ in 0..1000 {
            clock.advance(Duration::milliseconds(1));
            tracker.record_impression("u1");
        }
        assert_eq!(tracker.len(), 1000);
        assert!(tracker.events().iter().all(|e| e.content_unit_id == "u1"));
        assert_eq!(tracker.stats_for("first"), EngagementStats::default());
    }

    #[test]
    fn test_reload_from_store() {
        let (tracker, store, _) = tracker(10);
        tracker.record_impression("u1");
        tracker.record_click("u1");

        let clock = Arc::new(FixedClock::new(Utc::now()));
        let reopened = EngagementTracker::new(store, KEY, 10, clock);
        assert_eq!(reopened.events(), tracker.events());
    }

    #[test]
    fn test_malformed_store_starts_empty() {
        let store = Arc::new(MemoryStore::new());
        store.set(KEY, "not json").unwrap();
        let tracker = EngagementTracker::new(store, KEY, 10, Arc::new(FixedClock::new(Utc::now())));
        assert!(tracker.is_empty());
    }

    #[test]
    fn test_persistence_failure_is_swallowed() {
        let tracker = EngagementTracker::new(
            Arc::new(FailingStore),
            KEY,
            10,
            Arc::new(FixedClock::new(Utc::now())),
        );
        tracker.record_impression("u1");
        tracker.record_click("u1");
        assert_eq!(tracker.len(), 2);
    }

    #[test]
    fn test_stats_and_ctr() {
        let (tracker, _, _) = tracker(100);
        for _ in 0..4 {
            tracker.record_impression("u1");
        }
        tracker.record_click("u1");
        tracker.record_impression("u2");

        let u1 = tracker.stats_for("u1");
        assert_eq!(u1.impressions, 4);
        assert_eq!(u1.clicks, 1);
        assert!((u1.click_through_rate() - 0.25).abs() < f64::EPSILON);

        let all = tracker.stats();
        assert_eq!(all.len(), 2);
        assert_eq!(all["u2"].click_through_rate(), 0.0);
    }
}

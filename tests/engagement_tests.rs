//! 互动记录集成测试：持久化、容量上限、与运行时装配的配合

use std::sync::Arc;

use chrono::{Duration, TimeZone, Utc};
use tempfile::TempDir;

use promoserve::analytics::{EngagementEvent, EngagementKind, EngagementTracker, ImpressionLatch};
use promoserve::config::{StaticConfig, StorageBackend};
use promoserve::resolve::PageContext;
use promoserve::runtime::PromoRuntime;
use promoserve::storage::{
    ContentStatus, FileStore, KeyValueStore, NewContentUnit, PlacementKey, Slot,
};
use promoserve::utils::FixedClock;

const KEY: &str = "promo.engagement_events";

fn clock() -> Arc<FixedClock> {
    Arc::new(FixedClock::new(Utc.with_ymd_and_hms(2025, 3, 1, 9, 0, 0).unwrap()))
}

#[test]
fn test_events_persist_newest_first_and_reload() {
    let dir = TempDir::new().unwrap();
    let store: Arc<dyn KeyValueStore> = Arc::new(FileStore::new(dir.path().to_path_buf()).unwrap());
    let clock = clock();

    {
        let tracker = EngagementTracker::new(store.clone(), KEY, 1000, clock.clone());
        tracker.record_impression("u1");
        clock.advance(Duration::seconds(1));
        tracker.record_click("u1");
    }

    let raw = store.get(KEY).unwrap().unwrap();
    let persisted: Vec<EngagementEvent> = serde_json::from_str(&raw).unwrap();
    assert_eq!(persisted.len(), 2);
    assert_eq!(persisted[0].kind, EngagementKind::Click);
    assert_eq!(persisted[1].kind, EngagementKind::Impression);
    assert!(raw.contains("\"impression\""));

    let reloaded = EngagementTracker::new(store, KEY, 1000, clock);
    assert_eq!(reloaded.events(), persisted);
    let stats = reloaded.stats_for("u1");
    assert_eq!((stats.impressions, stats.clicks), (1, 1));
}

#[test]
fn test_log_never_exceeds_cap() {
    let dir = TempDir::new().unwrap();
    let store: Arc<dyn KeyValueStore> = Arc::new(FileStore::new(dir.path().to_path_buf()).unwrap());
    let tracker = EngagementTracker::new(store.clone(), KEY, 1000, clock());

    tracker.record_impression("oldest");
    for i in 0..999 {
        tracker.record_impression(&format!("u{}", i));
    }
    assert_eq!(tracker.len(), 1000);
    assert_eq!(tracker.events().last().unwrap().content_unit_id, "oldest");

    tracker.record_click("newest");
    assert_eq!(tracker.len(), 1000);
    let events = tracker.events();
    assert_eq!(events[0].content_unit_id, "newest");
    assert!(events.iter().all(|e| e.content_unit_id != "oldest"));

    let persisted: Vec<EngagementEvent> =
        serde_json::from_str(&store.get(KEY).unwrap().unwrap()).unwrap();
    assert_eq!(persisted.len(), 1000);
}

#[test]
fn test_oversized_persisted_log_is_trimmed_on_load() {
    let dir = TempDir::new().unwrap();
    let store: Arc<dyn KeyValueStore> = Arc::new(FileStore::new(dir.path().to_path_buf()).unwrap());
    {
        let tracker = EngagementTracker::new(store.clone(), KEY, 50, clock());
        for i in 0..50 {
            tracker.record_click(&format!("u{}", i));
        }
    }

    let smaller = EngagementTracker::new(store, KEY, 10, clock());
    assert_eq!(smaller.len(), 10);
    assert_eq!(smaller.events()[0].content_unit_id, "u49");
}

#[tokio::test]
async fn test_disabled_unit_keeps_history() {
    let dir = TempDir::new().unwrap();
    let mut config = StaticConfig::default();
    config.storage.backend = StorageBackend::File;
    config.storage.data_dir = dir.path().to_string_lossy().into_owned();
    let runtime = PromoRuntime::from_config(&config).unwrap();

    let unit = runtime
        .content
        .create(
            NewContentUnit::new(PlacementKey::new("HOME", Slot::PageTop))
                .with_status(ContentStatus::Active),
        )
        .unwrap();

    let ctx = PageContext::new("web", "HOME");
    let mut latch = ImpressionLatch::new();
    for _ in 0..3 {
        let shown = runtime.serving.resolve_slot(&ctx, Slot::PageTop).await;
        latch.record(&runtime.tracker, shown.as_ref().map(|u| u.id.as_str()));
    }
    runtime.tracker.record_click(&unit.id);
    assert_eq!(runtime.tracker.stats_for(&unit.id).impressions, 1);

    runtime.content.soft_delete(&unit.id).unwrap();
    assert!(runtime.serving.resolve_slot(&ctx, Slot::PageTop).await.is_none());

    let reopened = PromoRuntime::from_config(&config).unwrap();
    let stats = reopened.tracker.stats_for(&unit.id);
    assert_eq!((stats.impressions, stats.clicks), (1, 1));
    assert!((stats.click_through_rate() - 1.0).abs() < f64::EPSILON);
    assert_eq!(
        reopened.content.get(&unit.id).map(|u| u.status),
        Some(ContentStatus::Disabled)
    );
}

//! 仓库与文件存储集成测试

use std::sync::Arc;

use chrono::{Duration, TimeZone, Utc};
use tempfile::TempDir;

use promoserve::storage::{
    ContentRepository, ContentStatus, ContentUnitPatch, FileStore, KeyValueStore, NewContentUnit,
    PlacementKey, Slot, TargetValue, Targeting,
};
use promoserve::utils::{Clock, FixedClock};

const KEY: &str = "promo.content_units";

fn clock() -> Arc<FixedClock> {
    Arc::new(FixedClock::new(Utc.with_ymd_and_hms(2025, 3, 1, 9, 0, 0).unwrap()))
}

fn file_repo(dir: &TempDir, clock: Arc<FixedClock>) -> ContentRepository {
    let store = Arc::new(FileStore::new(dir.path().to_path_buf()).unwrap());
    ContentRepository::new(store, KEY, clock)
}

#[test]
fn test_units_survive_reopen() {
    let dir = TempDir::new().unwrap();
    let clock = clock();

    let created = {
        let repo = file_repo(&dir, clock.clone());
        repo.create(
            NewContentUnit::new(PlacementKey::new("HOME", Slot::PageTop))
                .with_status(ContentStatus::Active)
                .with_priority(3)
                .with_targeting(Targeting {
                    device: Some(TargetValue::All),
                    language: Some(TargetValue::Exact("ko".to_string())),
                    ..Targeting::default()
                })
                .with_content(serde_json::json!({"title": "Spring sale"})),
        )
        .unwrap()
    };

    let reopened = file_repo(&dir, clock);
    let units = reopened.list();
    assert_eq!(units, vec![created.clone()]);
    assert_eq!(units[0].content["title"], "Spring sale");
    assert_eq!(units[0].targeting.device, Some(TargetValue::All));
}

#[test]
fn test_persisted_layout_is_newest_first_array() {
    let dir = TempDir::new().unwrap();
    let clock = clock();
    let repo = file_repo(&dir, clock.clone());

    let older = repo
        .create(NewContentUnit::new(PlacementKey::new("ALL", Slot::Sidebar)))
        .unwrap();
    clock.advance(Duration::minutes(1));
    let newer = repo
        .create(NewContentUnit::new(PlacementKey::new("HOME", Slot::InFeed)))
        .unwrap();

    let raw = std::fs::read_to_string(dir.path().join(format!("{}.json", KEY))).unwrap();
    let parsed: Vec<serde_json::Value> = serde_json::from_str(&raw).unwrap();
    assert_eq!(parsed.len(), 2);
    assert_eq!(parsed[0]["id"], newer.id.as_str());
    assert_eq!(parsed[1]["id"], older.id.as_str());
    assert_eq!(parsed[1]["placement_key"]["page_scope"], "ALL");
    assert_eq!(parsed[1]["status"], "PENDING");
}

#[test]
fn test_corrupt_file_reads_as_empty_and_recovers_on_write() {
    let dir = TempDir::new().unwrap();
    std::fs::write(dir.path().join(format!("{}.json", KEY)), "[{\"id\": 1,").unwrap();

    let repo = file_repo(&dir, clock());
    assert!(repo.list().is_empty());

    let unit = repo
        .create(NewContentUnit::new(PlacementKey::new("HOME", Slot::PageTop)))
        .unwrap();
    assert_eq!(repo.list(), vec![unit]);
}

#[test]
fn test_unreadable_file_fails_writes_without_clobbering() {
    let dir = TempDir::new().unwrap();
    let repo = file_repo(&dir, clock());
    let home = || NewContentUnit::new(PlacementKey::new("HOME", Slot::PageTop));
    let first = repo.create(home()).unwrap();
    repo.create(home()).unwrap();

    // 数据文件位置被目录占据，读取失败
    let path = dir.path().join(format!("{}.json", KEY));
    let saved = dir.path().join("saved.json");
    std::fs::rename(&path, &saved).unwrap();
    std::fs::create_dir(&path).unwrap();

    assert!(repo.create(home()).is_err());
    assert!(
        repo.update(&first.id, ContentUnitPatch::status(ContentStatus::Active))
            .is_err()
    );

    std::fs::remove_dir(&path).unwrap();
    std::fs::rename(&saved, &path).unwrap();
    let units = repo.list();
    assert_eq!(units.len(), 2);
    assert_eq!(repo.get_by_id(&first.id).unwrap().status, ContentStatus::Pending);
}

#[test]
fn test_soft_delete_keeps_id_resolvable() {
    let dir = TempDir::new().unwrap();
    let clock = clock();
    let repo = file_repo(&dir, clock.clone());
    let unit = repo
        .create(
            NewContentUnit::new(PlacementKey::new("HOME", Slot::PageTop))
                .with_status(ContentStatus::Active),
        )
        .unwrap();

    clock.advance(Duration::hours(1));
    repo.soft_delete(&unit.id).unwrap();

    let stored = repo.get_by_id(&unit.id).unwrap();
    assert_eq!(stored.status, ContentStatus::Disabled);
    assert!(!stored.is_active());
    assert_eq!(stored.updated_at, Some(clock.now()));
}

#[test]
fn test_update_reject_invalid_window_leaves_store_untouched() {
    let dir = TempDir::new().unwrap();
    let clock = clock();
    let repo = file_repo(&dir, clock.clone());
    let unit = repo
        .create(NewContentUnit::new(PlacementKey::new("HOME", Slot::PageTop)))
        .unwrap();

    let patch = ContentUnitPatch {
        schedule: Some(promoserve::storage::ScheduleWindow {
            start_at: Some(clock.now() + Duration::days(2)),
            end_at: Some(clock.now()),
        }),
        ..ContentUnitPatch::default()
    };
    let err = repo.update(&unit.id, patch).unwrap_err();
    assert_eq!(err.code(), "E003");
    assert_eq!(repo.get_by_id(&unit.id), Some(unit));
}

#[test]
fn test_file_store_rejects_path_like_keys() {
    let dir = TempDir::new().unwrap();
    let store = FileStore::new(dir.path().to_path_buf()).unwrap();
    assert!(store.set("../escape", "[]").is_err());
    assert!(store.get("nested/key").is_err());
    assert_eq!(store.get("absent").unwrap(), None);
}

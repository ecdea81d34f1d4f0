//! 推广内容仓库
//!
//! 纯 CRUD + 状态流转，不关心定向规则。整个集合序列化为一个 JSON 数组
//! 存在单个 key 下，最新创建的记录排在最前。记录永不物理删除：
//! 互动事件通过 id 引用记录，软删除只把状态改为 `Disabled`。

use std::sync::Arc;

use parking_lot::Mutex;
use tracing::{debug, info, warn};
use uuid::Uuid;

use crate::errors::Result;
use crate::storage::kv::KeyValueStore;
use crate::storage::models::{ContentStatus, ContentUnit, ContentUnitPatch, NewContentUnit};
use crate::utils::Clock;

pub struct ContentRepository {
    store: Arc<dyn KeyValueStore>,
    key: String,
    clock: Arc<dyn Clock>,
    /// 串行化读-改-写，避免并发写入互相覆盖
    write_lock: Mutex<()>,
}

impl ContentRepository {
    pub fn new(store: Arc<dyn KeyValueStore>, key: impl Into<String>, clock: Arc<dyn Clock>) -> Self {
        Self {
            store,
            key: key.into(),
            clock,
            write_lock: Mutex::new(()),
        }
    }

    /// 读取全部记录
    ///
    /// 存储读取失败返回错误；内容损坏视为空集合。
    pub fn try_list(&self) -> Result<Vec<ContentUnit>> {
        let Some(raw) = self.store.get(&self.key)? else {
            return Ok(Vec::new());
        };
        match serde_json::from_str::<Vec<ContentUnit>>(&raw) {
            Ok(units) => Ok(units),
            Err(e) => {
                warn!(
                    "Malformed content units under '{}', treating as empty: {}",
                    self.key, e
                );
                Ok(Vec::new())
            }
        }
    }

    /// 读取全部记录，任何读取失败都降级为空集合
    pub fn list(&self) -> Vec<ContentUnit> {
        self.try_list().unwrap_or_else(|e| {
            warn!("Failed to read content units, treating as empty: {}", e);
            Vec::new()
        })
    }

    pub fn get_by_id(&self, id: &str) -> Option<ContentUnit> {
        self.list().into_iter().find(|unit| unit.id == id)
    }

    /// 创建记录：分配 id，缺省状态为 `Pending`，打上 `created_at`
    pub fn create(&self, new_unit: NewContentUnit) -> Result<ContentUnit> {
        let unit = new_unit.into_unit(Uuid::new_v4().to_string(), self.clock.now())?;

        let _guard = self.write_lock.lock();
        let mut units = self.try_list()?;
        units.insert(0, unit.clone());
        self.persist(&units)?;

        info!(
            "Content unit created: {} ({}, status {})",
            unit.id,
            unit.placement_key.placement(),
            unit.status
        );
        Ok(unit)
    }

    /// 合并 patch 并打上 `updated_at`，返回更新后的集合
    ///
    /// 未知 id 不报错，原样返回集合。写路径上的存储读取失败会直接返回错误，
    /// 不会拿空集合覆盖已有数据。
    pub fn update(&self, id: &str, patch: ContentUnitPatch) -> Result<Vec<ContentUnit>> {
        let _guard = self.write_lock.lock();
        let mut units = self.try_list()?;

        let Some(position) = units.iter().position(|unit| unit.id == id) else {
            debug!("Update for unknown content unit {} ignored", id);
            return Ok(units);
        };

        let merged = patch.apply(&units[position], self.clock.now())?;
        units[position] = merged;
        self.persist(&units)?;

        info!("Content unit updated: {}", id);
        Ok(units)
    }

    /// 软删除：状态置为 `Disabled`
    pub fn soft_delete(&self, id: &str) -> Result<Vec<ContentUnit>> {
        self.update(id, ContentUnitPatch::status(ContentStatus::Disabled))
    }

    fn persist(&self, units: &[ContentUnit]) -> Result<()> {
        let json = serde_json::to_string(units)?;
        self.store.set(&self.key, &json)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::storage::kv::MemoryStore;
    use crate::storage::models::{PlacementKey, Slot};
    use crate::utils::FixedClock;
    use chrono::{Duration, TimeZone, Utc};

    const KEY: &str = "promo.content_units";

    fn repo() -> (ContentRepository, Arc<MemoryStore>, Arc<FixedClock>) {
        let store = Arc::new(MemoryStore::new());
        let clock = Arc::new(FixedClock::new(Utc.timestamp_opt(1_000, 0).unwrap()));
        let repo = ContentRepository::new(store.clone(), KEY, clock.clone());
        (repo, store, clock)
    }

    fn home_top() -> NewContentUnit {
        NewContentUnit::new(PlacementKey::new("HOME", Slot::PageTop))
    }

    #[test]
    fn test_list_empty_store() {
        let (repo, _, _) = repo();
        assert!(repo.list().is_empty());
    }

    #[test]
    fn test_create_assigns_id_and_defaults() {
        let (repo, _, clock) = repo();
        let unit = repo.create(home_top()).unwrap();
        assert!(!unit.id.is_empty());
        assert_eq!(unit.status, ContentStatus::Pending);
        assert_eq!(unit.created_at, clock.now());
        assert_eq!(repo.get_by_id(&unit.id), Some(unit));
    }

    #[test]
    fn test_create_orders_newest_first() {
        let (repo, _, clock) = repo();
        let first = repo.create(home_top()).unwrap();
        clock.advance(Duration::seconds(1));
        let second = repo.create(home_top()).unwrap();

        let ids: Vec<String> = repo.list().into_iter().map(|u| u.id).collect();
        assert_eq!(ids, vec![second.id, first.id]);
    }

    #[test]
    fn test_update_merges_and_stamps() {
        let (repo, _, clock) = repo();
        let unit = repo.create(home_top().with_priority(1)).unwrap();
        clock.advance(Duration::seconds(5));

        let units = repo
            .update(
                &unit.id,
                ContentUnitPatch {
                    priority: Some(9),
                    ..ContentUnitPatch::default()
                },
            )
            .unwrap();
        assert_eq!(units.len(), 1);

        let updated = repo.get_by_id(&unit.id).unwrap();
        assert_eq!(updated.priority, 9);
        assert_eq!(updated.updated_at, Some(clock.now()));
        assert_eq!(updated.created_at, unit.created_at);
    }

    #[test]
    fn test_update_unknown_id_is_noop() {
        let (repo, _, _) = repo();
        let unit = repo.create(home_top()).unwrap();
        let units = repo
            .update("missing", ContentUnitPatch::status(ContentStatus::Active))
            .unwrap();
        assert_eq!(units, vec![unit]);
    }

    #[test]
    fn test_soft_delete_keeps_record() {
        let (repo, _, _) = repo();
        let unit = repo
            .create(home_top().with_status(ContentStatus::Active))
            .unwrap();
        repo.soft_delete(&unit.id).unwrap();

        let stored = repo.get_by_id(&unit.id).unwrap();
        assert_eq!(stored.status, ContentStatus::Disabled);
        assert_eq!(repo.list().len(), 1);
    }

    #[test]
    fn test_malformed_store_reads_as_empty() {
        let (repo, store, _) = repo();
        store.set(KEY, "{not json").unwrap();
        assert!(repo.list().is_empty());
        assert!(repo.try_list().unwrap().is_empty());
        assert!(repo.get_by_id("anything").is_none());
    }

    /// 读取可控失败的存储
    struct FlakyStore {
        inner: MemoryStore,
        fail_reads: std::sync::atomic::AtomicBool,
    }

    impl KeyValueStore for FlakyStore {
        fn get(&self, key: &str) -> Result<Option<String>> {
            if self.fail_reads.load(std::sync::atomic::Ordering::SeqCst) {
                return Err(crate::errors::PromoError::storage("read timed out"));
            }
            self.inner.get(key)
        }

        fn set(&self, key: &str, value: &str) -> Result<()> {
            self.inner.set(key, value)
        }

        fn backend_name(&self) -> &'static str {
            "flaky"
        }
    }

    #[test]
    fn test_read_failure_does_not_overwrite_collection() {
        use std::sync::atomic::Ordering;

        let store = Arc::new(FlakyStore {
            inner: MemoryStore::new(),
            fail_reads: std::sync::atomic::AtomicBool::new(false),
        });
        let clock = Arc::new(FixedClock::new(Utc.timestamp_opt(1_000, 0).unwrap()));
        let repo = ContentRepository::new(store.clone(), KEY, clock);
        let first = repo.create(home_top()).unwrap();
        for _ in 0..2 {
            repo.create(home_top()).unwrap();
        }

        store.fail_reads.store(true, Ordering::SeqCst);
        let err = repo.create(home_top()).unwrap_err();
        assert_eq!(err.code(), "E001");
        assert!(
            repo.update(&first.id, ContentUnitPatch::status(ContentStatus::Active))
                .is_err()
        );
        assert!(repo.soft_delete(&first.id).is_err());

        store.fail_reads.store(false, Ordering::SeqCst);
        let units = repo.list();
        assert_eq!(units.len(), 3);
        assert_eq!(repo.get_by_id(&first.id).unwrap().status, ContentStatus::Pending);
    }

    #[test]
    fn test_soft_deleted_unit_cannot_be_reactivated() {
        let (repo, _, _) = repo();
        let unit = repo
            .create(home_top().with_status(ContentStatus::Active))
            .unwrap();
        repo.soft_delete(&unit.id).unwrap();

        let err = repo
            .update(&unit.id, ContentUnitPatch::status(ContentStatus::Active))
            .unwrap_err();
        assert_eq!(err.code(), "E003");
        assert_eq!(
            repo.get_by_id(&unit.id).unwrap().status,
            ContentStatus::Disabled
        );
    }

    #[test]
    fn test_invalid_schedule_is_rejected_without_write() {
        let (repo, store, clock) = repo();
        let window = crate::storage::models::ScheduleWindow {
            start_at: Some(clock.now()),
            end_at: Some(clock.now() - Duration::seconds(1)),
        };
        assert!(repo.create(home_top().with_schedule(window)).is_err());
        assert_eq!(store.get(KEY).unwrap(), None);
    }
}

use std::path::PathBuf;
use std::sync::Arc;

use crate::config::{StorageBackend, StorageConfig};
use crate::errors::Result;

pub mod kv;
pub mod models;
pub mod repository;

pub use kv::{FileStore, KeyValueStore, MemoryStore};
pub use models::{
    ContentStatus, ContentUnit, ContentUnitPatch, DeviceClass, NewContentUnit, PageScope,
    PlacementKey, ScheduleWindow, Slot, TargetValue, Targeting, WILDCARD,
};
pub use repository::ContentRepository;

pub struct StoreFactory;

impl StoreFactory {
    /// 根据配置创建键值存储
    pub fn create(config: &StorageConfig) -> Result<Arc<dyn KeyValueStore>> {
        let store: Arc<dyn KeyValueStore> = match config.backend {
            StorageBackend::Memory => Arc::new(MemoryStore::new()),
            StorageBackend::File => Arc::new(FileStore::new(PathBuf::from(&config.data_dir))?),
        };
        tracing::info!("Using {} key-value store", store.backend_name());
        Ok(store)
    }
}

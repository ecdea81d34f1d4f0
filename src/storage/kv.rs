//! 键值存储
//!
//! 推广内容和互动日志各占一个 key，值为整个集合的 JSON 文本。
//! 写入是整体覆盖（last-write-wins）。

use std::fs;
use std::path::{Path, PathBuf};

use dashmap::DashMap;
use tracing::{debug, trace};

use crate::errors::{PromoError, Result};

pub trait KeyValueStore: Send + Sync {
    /// key 不存在时返回 `Ok(None)`
    fn get(&self, key: &str) -> Result<Option<String>>;

    fn set(&self, key: &str, value: &str) -> Result<()>;

    fn backend_name(&self) -> &'static str;
}

/// 进程内存储
#[derive(Debug, Default)]
pub struct MemoryStore {
    data: DashMap<String, String>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }
}

impl KeyValueStore for MemoryStore {
    fn get(&self, key: &str) -> Result<Option<String>> {
        Ok(self.data.get(key).map(|v| v.value().clone()))
    }

    fn set(&self, key: &str, value: &str) -> Result<()> {
        self.data.insert(key.to_string(), value.to_string());
        trace!("MemoryStore: set {} ({} bytes)", key, value.len());
        Ok(())
    }

    fn backend_name(&self) -> &'static str {
        "memory"
    }
}

/// 文件存储，每个 key 对应 `<dir>/<key>.json`
#[derive(Debug)]
pub struct FileStore {
    dir: PathBuf,
}

impl FileStore {
    pub fn new(dir: PathBuf) -> Result<Self> {
        if !dir.exists() {
            fs::create_dir_all(&dir).map_err(|e| {
                PromoError::file_operation(format!(
                    "创建数据目录失败 {}: {}",
                    dir.display(),
                    e
                ))
            })?;
            debug!("FileStore: created data dir {}", dir.display());
        }
        Ok(Self { dir })
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    fn path_for(&self, key: &str) -> Result<PathBuf> {
        let valid = !key.is_empty()
            && key
                .chars()
                .all(|c| c.is_ascii_alphanumeric() || matches!(c, '.' | '_' | '-'))
            && !key.starts_with('.');
        if !valid {
            return Err(PromoError::validation(format!(
                "invalid store key '{}'",
                key
            )));
        }
        Ok(self.dir.join(format!("{}.json", key)))
    }
}

impl KeyValueStore for FileStore {
    fn get(&self, key: &str) -> Result<Option<String>> {
        let path = self.path_for(key)?;
        match fs::read_to_string(&path) {
            Ok(content) => Ok(Some(content)),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(None),
            Err(e) => Err(PromoError::storage(format!(
                "读取 {} 失败: {}",
                path.display(),
                e
            ))),
        }
    }

    fn set(&self, key: &str, value: &str) -> Result<()> {
        let path = self.path_for(key)?;
        // 先写临时文件再 rename，避免读到半截内容
        let tmp = path.with_extension("json.tmp");
        fs::write(&tmp, value)
            .and_then(|_| fs::rename(&tmp, &path))
            .map_err(|e| PromoError::storage(format!("写入 {} 失败: {}", path.display(), e)))?;
        trace!("FileStore: wrote {} ({} bytes)", path.display(), value.len());
        Ok(())
    }

    fn backend_name(&self) -> &'static str {
        "file"
    }
}

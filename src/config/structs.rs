use serde::{Deserialize, Serialize};
use strum::{AsRefStr, EnumIter, EnumString};

/// 默认配置文件路径
pub const DEFAULT_CONFIG_PATH: &str = "promoserve.toml";

/// 存储后端类型
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default, EnumIter, AsRefStr, EnumString,
)]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase")]
pub enum StorageBackend {
    /// 进程内存储，重启即丢失
    Memory,
    /// 每个 key 一个 JSON 文件
    #[default]
    File,
}

/// 静态配置（从 TOML 加载，启动时使用）
///
/// 包含：
/// - storage: 键值存储后端与 key 名
/// - cache: 解析结果缓存容量
/// - resolution: 请求上下文默认值与设备宽度阈值
/// - engagement: 曝光/点击日志上限
/// - logging: 日志配置
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct StaticConfig {
    #[serde(default)]
    pub storage: StorageConfig,
    #[serde(default)]
    pub cache: CacheConfig,
    #[serde(default)]
    pub resolution: ResolutionConfig,
    #[serde(default)]
    pub engagement: EngagementConfig,
    #[serde(default)]
    pub logging: LoggingConfig,
}

impl StaticConfig {
    /// 从 TOML 文件和环境变量加载配置
    ///
    /// 优先级：ENV > TOML 文件 > 默认值
    /// ENV 前缀：PS，分隔符：__
    /// 示例：PS__RESOLUTION__DEFAULT_LANGUAGE=ko
    pub fn load(path: Option<&str>) -> Self {
        use config::{Config, Environment, File};

        let path = path.unwrap_or(DEFAULT_CONFIG_PATH);

        let builder = Config::builder()
            .add_source(File::with_name(path).required(false))
            .add_source(
                Environment::with_prefix("PS")
                    .separator("__")
                    .try_parsing(true),
            );

        match builder.build() {
            Ok(settings) => match settings.try_deserialize::<StaticConfig>() {
                Ok(config) => {
                    if std::path::Path::new(path).exists() {
                        eprintln!("[INFO] Configuration loaded from: {}", path);
                    }
                    config
                }
                Err(e) => {
                    eprintln!("[ERROR] Failed to deserialize config: {}", e);
                    Self::default()
                }
            },
            Err(e) => {
                eprintln!("[ERROR] Failed to build config: {}", e);
                Self::default()
            }
        }
    }

    /// 生成示例 TOML 配置文件
    pub fn generate_sample_config() -> String {
        let sample_config = Self::default();
        toml::to_string_pretty(&sample_config)
            .unwrap_or_else(|e| format!("Error generating sample config: {}", e))
    }

    /// 保存配置到 TOML 文件
    pub fn save_to_file<P: AsRef<std::path::Path>>(&self, path: P) -> crate::errors::Result<()> {
        let content = toml::to_string_pretty(self)
            .map_err(|e| crate::errors::PromoError::serialization(e.to_string()))?;

        if let Some(parent) = path.as_ref().parent()
            && !parent.as_os_str().is_empty()
            && !parent.exists()
        {
            std::fs::create_dir_all(parent)?;
        }

        std::fs::write(path, content)?;
        Ok(())
    }
}

/// 存储配置
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StorageConfig {
    #[serde(default)]
    pub backend: StorageBackend,
    #[serde(default = "default_data_dir")]
    pub data_dir: String,
    #[serde(default = "default_content_units_key")]
    pub content_units_key: String,
    #[serde(default = "default_engagement_events_key")]
    pub engagement_events_key: String,
}

/// 解析结果缓存配置
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CacheConfig {
    #[serde(default = "default_cache_capacity")]
    pub max_capacity: u64,
}

/// 请求上下文解析配置
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ResolutionConfig {
    #[serde(default = "default_language")]
    pub default_language: String,
    #[serde(default = "default_surface")]
    pub default_surface: String,
    /// 视口宽度 <= 该值视为 mobile
    #[serde(default = "default_mobile_max_width")]
    pub mobile_max_width: u32,
    /// 视口宽度 <= 该值视为 tablet
    #[serde(default = "default_tablet_max_width")]
    pub tablet_max_width: u32,
    /// 轮播消费者的切换间隔
    #[serde(default = "default_rotation_interval_secs")]
    pub rotation_interval_secs: u64,
}

/// 曝光/点击日志配置
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EngagementConfig {
    #[serde(default = "default_max_events")]
    pub max_events: usize,
}

/// 日志配置
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoggingConfig {
    #[serde(default = "default_log_level")]
    pub level: String,
    #[serde(default = "default_log_format")]
    pub format: String,
    #[serde(default)]
    pub file: Option<String>,
    #[serde(default = "default_max_backups")]
    pub max_backups: u32,
    #[serde(default = "default_enable_rotation")]
    pub enable_rotation: bool,
}

// ============================================================
// Default value functions
// ============================================================

fn default_data_dir() -> String {
    "data".to_string()
}

fn default_content_units_key() -> String {
    "promo.content_units".to_string()
}

fn default_engagement_events_key() -> String {
    "promo.engagement_events".to_string()
}

fn default_cache_capacity() -> u64 {
    10_000
}

fn default_language() -> String {
    "en".to_string()
}

fn default_surface() -> String {
    "web".to_string()
}

fn default_mobile_max_width() -> u32 {
    767
}

fn default_tablet_max_width() -> u32 {
    1023
}

fn default_rotation_interval_secs() -> u64 {
    5
}

fn default_max_events() -> usize {
    1000
}

fn default_log_level() -> String {
    "info".to_string()
}

fn default_log_format() -> String {
    "text".to_string()
}

fn default_max_backups() -> u32 {
    5
}

fn default_enable_rotation() -> bool {
    true
}

// ============================================================
// Default implementations
// ============================================================

impl Default for StorageConfig {
    fn default() -> Self {
        Self {
            backend: StorageBackend::default(),
            data_dir: default_data_dir(),
            content_units_key: default_content_units_key(),
            engagement_events_key: default_engagement_events_key(),
        }
    }
}

impl Default for CacheConfig {
    fn default() -> Self {
        Self {
            max_capacity: default_cache_capacity(),
        }
    }
}

impl Default for ResolutionConfig {
    fn default() -> Self {
        Self {
            default_language: default_language(),
            default_surface: default_surface(),
            mobile_max_width: default_mobile_max_width(),
            tablet_max_width: default_tablet_max_width(),
            rotation_interval_secs: default_rotation_interval_secs(),
        }
    }
}

impl Default for EngagementConfig {
    fn default() -> Self {
        Self {
            max_events: default_max_events(),
        }
    }
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
            format: default_log_format(),
            file: None,
            max_backups: default_max_backups(),
            enable_rotation: default_enable_rotation(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_match_documented_values() {
        let config = StaticConfig::default();
        assert_eq!(config.engagement.max_events, 1000);
        assert_eq!(config.resolution.default_language, "en");
        assert_eq!(config.resolution.rotation_interval_secs, 5);
        assert_eq!(config.storage.backend, StorageBackend::File);
    }

    #[test]
    fn test_sample_config_round_trips_through_toml() {
        let sample = StaticConfig::generate_sample_config();
        let parsed: StaticConfig = toml::from_str(&sample).unwrap();
        assert_eq!(parsed.storage.content_units_key, "promo.content_units");
        assert_eq!(parsed.cache.max_capacity, 10_000);
    }

    #[test]
    fn test_partial_toml_uses_defaults() {
        let parsed: StaticConfig = toml::from_str("[engagement]\nmax_events = 50\n").unwrap();
        assert_eq!(parsed.engagement.max_events, 50);
        assert_eq!(parsed.logging.level, "info");
    }

    #[test]
    fn test_storage_backend_from_str() {
        use std::str::FromStr;
        assert_eq!(StorageBackend::from_str("memory").unwrap(), StorageBackend::Memory);
        assert!(StorageBackend::from_str("redis").is_err());
    }
}

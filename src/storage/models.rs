//! 推广内容数据模型
//!
//! `ContentUnit` 是唯一的推广记录形态：轮播模式使用的 placement 字符串
//! 由 `PlacementKey` 派生，不单独存储。

use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use strum::{AsRefStr, Display, EnumIter, EnumString};

use crate::errors::{PromoError, Result};

/// 通配符：页面范围表示“所有页面”，定向维度表示“不限”
pub const WILDCARD: &str = "ALL";

/// 推广内容状态，只有 `Active` 可投放
#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    Hash,
    Default,
    Serialize,
    Deserialize,
    EnumIter,
    EnumString,
    AsRefStr,
    Display,
)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
#[strum(serialize_all = "SCREAMING_SNAKE_CASE", ascii_case_insensitive)]
pub enum ContentStatus {
    #[default]
    Pending,
    Active,
    /// 软删除，不可通过正常流程恢复
    Disabled,
}

/// 页面布局中的固定位置
#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    Hash,
    PartialOrd,
    Ord,
    Serialize,
    Deserialize,
    EnumIter,
    EnumString,
    AsRefStr,
    Display,
)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
#[strum(serialize_all = "SCREAMING_SNAKE_CASE", ascii_case_insensitive)]
pub enum Slot {
    PageTop,
    Sidebar,
    InFeed,
    PageBottom,
}

/// 设备类型
#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    Hash,
    Serialize,
    Deserialize,
    EnumIter,
    EnumString,
    AsRefStr,
    Display,
)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
#[strum(serialize_all = "SCREAMING_SNAKE_CASE", ascii_case_insensitive)]
pub enum DeviceClass {
    Mobile,
    Tablet,
    Desktop,
}

/// 页面范围：具体页面或 `ALL`
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum PageScope {
    All,
    Page(String),
}

impl PageScope {
    /// 记录的页面范围是否覆盖请求的页面范围
    pub fn covers(&self, requested: &PageScope) -> bool {
        match self {
            PageScope::All => true,
            PageScope::Page(_) => self == requested,
        }
    }

    pub fn covers_page(&self, page: &str) -> bool {
        match self {
            PageScope::All => true,
            PageScope::Page(p) => p == page,
        }
    }
}

impl From<String> for PageScope {
    fn from(value: String) -> Self {
        if value == WILDCARD {
            PageScope::All
        } else {
            PageScope::Page(value)
        }
    }
}

impl From<&str> for PageScope {
    fn from(value: &str) -> Self {
        PageScope::from(value.to_string())
    }
}

impl From<PageScope> for String {
    fn from(value: PageScope) -> Self {
        match value {
            PageScope::All => WILDCARD.to_string(),
            PageScope::Page(p) => p,
        }
    }
}

impl fmt::Display for PageScope {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PageScope::All => f.write_str(WILDCARD),
            PageScope::Page(p) => f.write_str(p),
        }
    }
}

/// 单个定向维度的取值：`ALL` 或具体值
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum TargetValue<T> {
    All,
    Exact(T),
}

impl<T: PartialEq> TargetValue<T> {
    /// 通配符接受任意请求值；具体值只接受完全相等的请求值
    pub fn admits(&self, requested: Option<&T>) -> bool {
        match self {
            TargetValue::All => true,
            TargetValue::Exact(expected) => requested == Some(expected),
        }
    }
}

impl<T: fmt::Display> fmt::Display for TargetValue<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TargetValue::All => f.write_str(WILDCARD),
            TargetValue::Exact(v) => write!(f, "{}", v),
        }
    }
}

impl<T: FromStr> FromStr for TargetValue<T>
where
    T::Err: fmt::Display,
{
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        if s == WILDCARD {
            return Ok(TargetValue::All);
        }
        s.parse::<T>()
            .map(TargetValue::Exact)
            .map_err(|e| format!("invalid targeting value '{}': {}", s, e))
    }
}

impl<T: fmt::Display> Serialize for TargetValue<T> {
    fn serialize<S: Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

impl<'de, T: FromStr> Deserialize<'de> for TargetValue<T>
where
    T::Err: fmt::Display,
{
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> std::result::Result<Self, D::Error> {
        let raw = String::deserialize(deserializer)?;
        raw.parse().map_err(serde::de::Error::custom)
    }
}

/// 定向条件，缺省维度不参与过滤
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Targeting {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub domain: Option<TargetValue<String>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub device: Option<TargetValue<DeviceClass>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub language: Option<TargetValue<String>>,
}

/// 投放时间窗口，两端均可开放
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ScheduleWindow {
    #[serde(default)]
    pub start_at: Option<DateTime<Utc>>,
    #[serde(default)]
    pub end_at: Option<DateTime<Utc>>,
}

impl ScheduleWindow {
    /// 闭区间判断：`start_at <= now <= end_at`
    pub fn contains(&self, now: DateTime<Utc>) -> bool {
        self.start_at.is_none_or(|start| start <= now) && self.end_at.is_none_or(|end| now <= end)
    }

    pub fn validate(&self) -> Result<()> {
        if let (Some(start), Some(end)) = (self.start_at, self.end_at)
            && start > end
        {
            return Err(PromoError::validation(format!(
                "schedule start_at ({}) is after end_at ({})",
                start.to_rfc3339(),
                end.to_rfc3339()
            )));
        }
        Ok(())
    }
}

/// 复合定向 key：页面范围 + slot
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct PlacementKey {
    pub page_scope: PageScope,
    pub slot: Slot,
}

impl PlacementKey {
    pub fn new(page_scope: impl Into<PageScope>, slot: Slot) -> Self {
        Self {
            page_scope: page_scope.into(),
            slot,
        }
    }

    /// 轮播模式使用的 placement 字符串，形如 `HOME/PAGE_TOP`
    pub fn placement(&self) -> String {
        format!("{}/{}", self.page_scope, self.slot)
    }

    /// 解析 `placement()` 的输出
    pub fn parse(placement: &str) -> Result<Self> {
        let (page, slot) = placement.rsplit_once('/').ok_or_else(|| {
            PromoError::validation(format!(
                "placement '{}' must look like <PAGE_SCOPE>/<SLOT>",
                placement
            ))
        })?;
        if page.is_empty() {
            return Err(PromoError::validation(format!(
                "placement '{}' has an empty page scope",
                placement
            )));
        }
        let slot = Slot::from_str(slot)
            .map_err(|_| PromoError::validation(format!("unknown slot '{}'", slot)))?;
        Ok(Self::new(page, slot))
    }
}

/// 推广内容单元
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ContentUnit {
    pub id: String,
    #[serde(default)]
    pub status: ContentStatus,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub surface: Option<String>,
    pub placement_key: PlacementKey,
    #[serde(default)]
    pub schedule: ScheduleWindow,
    #[serde(default)]
    pub targeting: Targeting,
    #[serde(default)]
    pub priority: i32,
    /// 展示用载荷，引擎不解析
    #[serde(default)]
    pub content: serde_json::Value,
    pub created_at: DateTime<Utc>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub created_by: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub updated_at: Option<DateTime<Utc>>,
}

impl ContentUnit {
    pub fn is_active(&self) -> bool {
        self.status == ContentStatus::Active
    }
}

/// 创建请求，`status` 缺省为 `Pending`
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct NewContentUnit {
    #[serde(default)]
    pub status: Option<ContentStatus>,
    #[serde(default)]
    pub surface: Option<String>,
    pub placement_key: Option<PlacementKey>,
    #[serde(default)]
    pub schedule: ScheduleWindow,
    #[serde(default)]
    pub targeting: Targeting,
    #[serde(default)]
    pub priority: Option<i32>,
    #[serde(default)]
    pub content: serde_json::Value,
    #[serde(default)]
    pub created_by: Option<String>,
}

impl NewContentUnit {
    pub fn new(placement_key: PlacementKey) -> Self {
        Self {
            placement_key: Some(placement_key),
            ..Self::default()
        }
    }

    pub fn with_status(mut self, status: ContentStatus) -> Self {
        self.status = Some(status);
        self
    }

    pub fn with_priority(mut self, priority: i32) -> Self {
        self.priority = Some(priority);
        self
    }

    pub fn with_surface(mut self, surface: impl Into<String>) -> Self {
        self.surface = Some(surface.into());
        self
    }

    pub fn with_schedule(mut self, schedule: ScheduleWindow) -> Self {
        self.schedule = schedule;
        self
    }

    pub fn with_targeting(mut self, targeting: Targeting) -> Self {
        self.targeting = targeting;
        self
    }

    pub fn with_content(mut self, content: serde_json::Value) -> Self {
        self.content = content;
        self
    }

    /// 校验并生成完整记录
    pub(crate) fn into_unit(self, id: String, now: DateTime<Utc>) -> Result<ContentUnit> {
        let placement_key = self
            .placement_key
            .ok_or_else(|| PromoError::validation("placement_key is required"))?;
        if self.status == Some(ContentStatus::Disabled) {
            return Err(PromoError::validation(
                "new content units must be PENDING or ACTIVE",
            ));
        }
        self.schedule.validate()?;

        Ok(ContentUnit {
            id,
            status: self.status.unwrap_or_default(),
            surface: normalize_surface(self.surface),
            placement_key,
            schedule: self.schedule,
            targeting: self.targeting,
            priority: self.priority.unwrap_or(0),
            content: self.content,
            created_at: now,
            created_by: self.created_by,
            updated_at: None,
        })
    }
}

/// 部分更新，`None` 字段保持原值
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ContentUnitPatch {
    #[serde(default)]
    pub status: Option<ContentStatus>,
    #[serde(default)]
    pub surface: Option<String>,
    #[serde(default)]
    pub placement_key: Option<PlacementKey>,
    #[serde(default)]
    pub schedule: Option<ScheduleWindow>,
    #[serde(default)]
    pub targeting: Option<Targeting>,
    #[serde(default)]
    pub priority: Option<i32>,
    #[serde(default)]
    pub content: Option<serde_json::Value>,
}

impl ContentUnitPatch {
    pub fn status(status: ContentStatus) -> Self {
        Self {
            status: Some(status),
            ..Self::default()
        }
    }

    /// 合并到已有记录并打上 `updated_at`
    pub(crate) fn apply(self, unit: &ContentUnit, now: DateTime<Utc>) -> Result<ContentUnit> {
        let mut merged = unit.clone();
        if let Some(status) = self.status {
            // DISABLED 为终态
            if unit.status == ContentStatus::Disabled && status != ContentStatus::Disabled {
                return Err(PromoError::validation(format!(
                    "content unit {} is disabled and cannot become {}",
                    unit.id, status
                )));
            }
            merged.status = status;
        }
        if let Some(surface) = self.surface {
            merged.surface = normalize_surface(Some(surface));
        }
        if let Some(placement_key) = self.placement_key {
            merged.placement_key = placement_key;
        }
        if let Some(schedule) = self.schedule {
            schedule.validate()?;
            merged.schedule = schedule;
        }
        if let Some(targeting) = self.targeting {
            merged.targeting = targeting;
        }
        if let Some(priority) = self.priority {
            merged.priority = priority;
        }
        if let Some(content) = self.content {
            merged.content = content;
        }
        merged.updated_at = Some(now);
        Ok(merged)
    }
}

fn normalize_surface(surface: Option<String>) -> Option<String> {
    surface
        .map(|s| s.trim().to_string())
        .filter(|s| !s.is_empty())
}

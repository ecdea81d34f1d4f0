//! 曝光 / 点击记录
//!
//! - `tracker`: 追加式事件日志，容量封顶，每次记录后持久化
//! - `latch`: 调用方侧“每次展示只记一次曝光”的标记

pub mod latch;
pub mod tracker;

pub use latch::ImpressionLatch;
pub use tracker::{EngagementStats, EngagementTracker};

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use strum::{AsRefStr, Display, EnumString};

/// 事件类型
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, AsRefStr, Display, EnumString,
)]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase", ascii_case_insensitive)]
pub enum EngagementKind {
    Impression,
    Click,
}

/// 单条互动事件，创建后不再修改
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EngagementEvent {
    pub content_unit_id: String,
    pub kind: EngagementKind,
    pub timestamp: DateTime<Utc>,
}

use super::EngagementTracker;

/// 每次展示只记一次曝光
///
/// 展示的推广内容 id 变化时重置；同一 id 重复渲染不会重复记录。
#[derive(Debug, Clone, Default)]
pub struct ImpressionLatch {
    current: Option<String>,
    recorded: bool,
}

impl ImpressionLatch {
    pub fn new() -> Self {
        Self::default()
    }

    /// 观察当前展示的内容，返回是否需要记录曝光
    pub fn observe(&mut self, content_unit_id: Option<&str>) -> bool {
        if self.current.as_deref() != content_unit_id {
            self.current = content_unit_id.map(str::to_string);
            self.recorded = false;
        }
        if self.current.is_some() && !self.recorded {
            self.recorded = true;
            return true;
        }
        false
    }

    /// `observe` 为真时向 tracker 记录曝光
    pub fn record(&mut self, tracker: &EngagementTracker, content_unit_id: Option<&str>) -> bool {
        let should_record = self.observe(content_unit_id);
        if should_record && let Some(id) = content_unit_id {
            tracker.record_impression(id);
        }
        should_record
    }
}

use crate::storage::models::ContentUnit;

/// 轮播游标
///
/// 每次 `tick` 前进一位；输入列表（按 id 序列判断）变化时回到第 0 位。
#[derive(Debug, Clone, Default)]
pub struct Rotation {
    ids: Vec<String>,
    index: usize,
}

impl Rotation {
    pub fn new() -> Self {
        Self::default()
    }

    /// 接收新一轮解析结果，返回游标是否被重置
    pub fn update(&mut self, units: &[ContentUnit]) -> bool {
        let same = self.ids.len() == units.len()
            && self.ids.iter().zip(units).all(|(id, unit)| *id == unit.id);
        if same {
            return false;
        }
        self.ids = units.iter().map(|unit| unit.id.clone()).collect();
        self.index = 0;
        true
    }

    pub fn tick(&mut self) {
        if !self.ids.is_empty() {
            self.index = (self.index + 1) % self.ids.len();
        }
    }

    pub fn current_index(&self) -> Option<usize> {
        (!self.ids.is_empty()).then_some(self.index)
    }

    pub fn current_id(&self) -> Option<&str> {
        self.ids.get(self.index).map(String::as_str)
    }
}

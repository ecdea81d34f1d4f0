use serde::{Deserialize, Serialize};

use crate::config::ResolutionConfig;
use crate::storage::models::{DeviceClass, PlacementKey};

/// 请求上下文缺省值
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ContextDefaults {
    pub language: String,
    pub mobile_max_width: u32,
    pub tablet_max_width: u32,
}

impl Default for ContextDefaults {
    fn default() -> Self {
        Self::from(&ResolutionConfig::default())
    }
}

impl From<&ResolutionConfig> for ContextDefaults {
    fn from(config: &ResolutionConfig) -> Self {
        Self {
            language: config.default_language.clone(),
            mobile_max_width: config.mobile_max_width,
            tablet_max_width: config.tablet_max_width,
        }
    }
}

impl DeviceClass {
    /// 按视口宽度推断设备类型
    pub fn from_viewport_width(width: u32, defaults: &ContextDefaults) -> Self {
        if width <= defaults.mobile_max_width {
            DeviceClass::Mobile
        } else if width <= defaults.tablet_max_width {
            DeviceClass::Tablet
        } else {
            DeviceClass::Desktop
        }
    }
}

/// 单 slot 模式的页面请求上下文
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PageContext {
    pub surface: String,
    pub page_scope: String,
    #[serde(default)]
    pub domain: Option<String>,
    #[serde(default)]
    pub device: Option<DeviceClass>,
    /// 调用方未给出 `device` 时用于推断
    #[serde(default)]
    pub viewport_width: Option<u32>,
    #[serde(default)]
    pub language: Option<String>,
}

impl PageContext {
    pub fn new(surface: impl Into<String>, page_scope: impl Into<String>) -> Self {
        Self {
            surface: surface.into(),
            page_scope: page_scope.into(),
            ..Self::default()
        }
    }

    pub fn with_domain(mut self, domain: impl Into<String>) -> Self {
        self.domain = Some(domain.into());
        self
    }

    pub fn with_device(mut self, device: DeviceClass) -> Self {
        self.device = Some(device);
        self
    }

    pub fn with_viewport_width(mut self, width: u32) -> Self {
        self.viewport_width = Some(width);
        self
    }

    pub fn with_language(mut self, language: impl Into<String>) -> Self {
        self.language = Some(language.into());
        self
    }

    /// 补齐设备与语言
    ///
    /// 设备：显式值 > 视口宽度推断 > Desktop；语言：显式值 > 默认语言。
    pub fn resolve(&self, defaults: &ContextDefaults) -> ResolvedContext {
        let device = self.device.unwrap_or_else(|| {
            self.viewport_width
                .map(|w| DeviceClass::from_viewport_width(w, defaults))
                .unwrap_or(DeviceClass::Desktop)
        });
        let language = self
            .language
            .clone()
            .filter(|l| !l.is_empty())
            .unwrap_or_else(|| defaults.language.clone());

        ResolvedContext {
            surface: self.surface.clone(),
            page_scope: self.page_scope.clone(),
            domain: self.domain.clone().filter(|d| !d.is_empty()),
            device,
            language,
        }
    }
}

/// 所有维度都已确定的上下文，解析引擎只接受这种形态
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ResolvedContext {
    pub surface: String,
    pub page_scope: String,
    pub domain: Option<String>,
    pub device: DeviceClass,
    pub language: String,
}

/// 轮播模式的查询
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PlacementQuery {
    pub placement: PlacementKey,
    /// 与定向的 domain 维度匹配
    pub service_scope: Option<String>,
    pub language: String,
}

impl PlacementQuery {
    pub fn new(placement: PlacementKey, language: impl Into<String>) -> Self {
        Self {
            placement,
            service_scope: None,
            language: language.into(),
        }
    }

    pub fn with_service_scope(mut self, scope: impl Into<String>) -> Self {
        self.service_scope = Some(scope.into());
        self
    }

    /// 记录的 placement 是否覆盖本次查询
    pub fn placement_matches(&self, key: &PlacementKey) -> bool {
        key.slot == self.placement.slot && key.page_scope.covers(&self.placement.page_scope)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::storage::models::{PageScope, Slot};

    #[test]
    fn test_device_from_viewport_width() {
        let defaults = ContextDefaults::default();
        assert_eq!(DeviceClass::from_viewport_width(375, &defaults), DeviceClass::Mobile);
        assert_eq!(DeviceClass::from_viewport_width(767, &defaults), DeviceClass::Mobile);
        assert_eq!(DeviceClass::from_viewport_width(768, &defaults), DeviceClass::Tablet);
        assert_eq!(DeviceClass::from_viewport_width(1023, &defaults), DeviceClass::Tablet);
        assert_eq!(DeviceClass::from_viewport_width(1440, &defaults), DeviceClass::Desktop);
    }

    #[test]
    fn test_resolve_fills_defaults() {
        let resolved = PageContext::new("web", "HOME").resolve(&ContextDefaults::default());
        assert_eq!(resolved.device, DeviceClass::Desktop);
        assert_eq!(resolved.language, "en");
        assert_eq!(resolved.domain, None);
    }

    #[test]
    fn test_explicit_device_wins_over_viewport() {
        let resolved = PageContext::new("web", "HOME")
            .with_device(DeviceClass::Tablet)
            .with_viewport_width(320)
            .with_language("ko")
            .resolve(&ContextDefaults::default());
        assert_eq!(resolved.device, DeviceClass::Tablet);
        assert_eq!(resolved.language, "ko");
    }

    #[test]
    fn test_viewport_used_when_device_missing() {
        let resolved = PageContext::new("web", "HOME")
            .with_viewport_width(320)
            .resolve(&ContextDefaults::default());
        assert_eq!(resolved.device, DeviceClass::Mobile);
    }

    #[test]
    fn test_placement_query_matches_wildcard_page() {
        let query = PlacementQuery::new(PlacementKey::new("HOME", Slot::PageTop), "en");
        assert!(query.placement_matches(&PlacementKey::new("HOME", Slot::PageTop)));
        assert!(query.placement_matches(&PlacementKey::new(PageScope::All, Slot::PageTop)));
        assert!(!query.placement_matches(&PlacementKey::new("HOME", Slot::Sidebar)));
        assert!(!query.placement_matches(&PlacementKey::new("SEARCH", Slot::PageTop)));
    }
}

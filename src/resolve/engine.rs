//! 解析引擎
//!
//! 纯函数：输入全部记录、请求上下文和 `now`，输出排序列表（轮播模式）
//! 或每个 slot 至多一个胜出记录（单 slot 模式）。不做 I/O，没有匹配时
//! 返回空列表 / `None`，从不报错。

use std::cmp::Ordering;
use std::collections::BTreeMap;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use strum::IntoEnumIterator;
use tracing::trace;

use crate::resolve::context::{PlacementQuery, ResolvedContext};
use crate::storage::models::{ContentUnit, Slot};

/// 状态与时间窗口：两种模式共用的前置条件
fn is_servable(unit: &ContentUnit, now: DateTime<Utc>) -> bool {
    unit.is_active() && unit.schedule.contains(now)
}

fn surface_matches(unit: &ContentUnit, surface: &str) -> bool {
    unit.surface.as_deref().is_none_or(|s| s == surface)
}

/// 单 slot 模式的资格判定
pub fn is_eligible(unit: &ContentUnit, ctx: &ResolvedContext, slot: Slot, now: DateTime<Utc>) -> bool {
    let targeting = &unit.targeting;
    surface_matches(unit, &ctx.surface)
        && is_servable(unit, now)
        && unit.placement_key.slot == slot
        && unit.placement_key.page_scope.covers_page(&ctx.page_scope)
        && targeting
            .domain
            .as_ref()
            .is_none_or(|t| t.admits(ctx.domain.as_ref()))
        && targeting
            .device
            .as_ref()
            .is_none_or(|t| t.admits(Some(&ctx.device)))
        && targeting
            .language
            .as_ref()
            .is_none_or(|t| t.admits(Some(&ctx.language)))
}

/// 轮播模式的资格判定，不考虑设备与 surface
pub fn is_eligible_for_placement(unit: &ContentUnit, query: &PlacementQuery, now: DateTime<Utc>) -> bool {
    let targeting = &unit.targeting;
    is_servable(unit, now)
        && query.placement_matches(&unit.placement_key)
        && targeting
            .domain
            .as_ref()
            .is_none_or(|t| t.admits(query.service_scope.as_ref()))
        && targeting
            .language
            .as_ref()
            .is_none_or(|t| t.admits(Some(&query.language)))
}

/// 排序规则：priority 降序，created_at 降序，最后按 id 保证全序
fn ranking(a: &ContentUnit, b: &ContentUnit) -> Ordering {
    b.priority
        .cmp(&a.priority)
        .then_with(|| b.created_at.cmp(&a.created_at))
        .then_with(|| a.id.cmp(&b.id))
}

pub fn rank(mut units: Vec<ContentUnit>) -> Vec<ContentUnit> {
    units.sort_by(ranking);
    units
}

/// 轮播模式：返回完整排序列表，由调用方轮换
pub fn resolve_for_placement(
    units: &[ContentUnit],
    query: &PlacementQuery,
    now: DateTime<Utc>,
) -> Vec<ContentUnit> {
    let eligible = units
        .iter()
        .filter(|unit| is_eligible_for_placement(unit, query, now))
        .cloned()
        .collect();
    rank(eligible)
}

/// 单 slot 模式：返回排序第一的记录
pub fn resolve_slot(
    units: &[ContentUnit],
    ctx: &ResolvedContext,
    slot: Slot,
    now: DateTime<Utc>,
) -> Option<ContentUnit> {
    let winner = units
        .iter()
        .filter(|unit| is_eligible(unit, ctx, slot, now))
        .min_by(|a, b| ranking(a, b))
        .cloned();
    trace!(
        "Slot {} on page {} resolved to {:?}",
        slot,
        ctx.page_scope,
        winner.as_ref().map(|u| &u.id)
    );
    winner
}

/// 对每个已知 slot 独立解析
pub fn resolve_page(units: &[ContentUnit], ctx: &ResolvedContext, now: DateTime<Utc>) -> PageResolution {
    let slots = Slot::iter()
        .map(|slot| (slot, resolve_slot(units, ctx, slot, now)))
        .collect();
    PageResolution { slots }
}

/// 单 slot 模式的整页结果：slot -> 胜出记录或空
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct PageResolution {
    pub slots: BTreeMap<Slot, Option<ContentUnit>>,
}

impl PageResolution {
    /// 失败降级时返回的空结果（不含任何 slot）
    pub fn empty() -> Self {
        Self::default()
    }

    pub fn get(&self, slot: Slot) -> Option<&ContentUnit> {
        self.slots.get(&slot).and_then(Option::as_ref)
    }

    /// 有胜出记录的 slot 数
    pub fn filled(&self) -> usize {
        self.slots.values().filter(|v| v.is_some()).count()
    }

    pub fn is_empty(&self) -> bool {
        self.filled() == 0
    }
}

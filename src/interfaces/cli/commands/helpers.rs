//! Helpers shared by content management commands

use chrono::{DateTime, Utc};
use colored::Colorize;

use crate::cli::UnitFields;
use crate::interfaces::cli::CliError;
use crate::storage::{
    ContentStatus, ContentUnit, ContentUnitPatch, NewContentUnit, PlacementKey, ScheduleWindow,
    TargetValue, Targeting,
};
use crate::utils::parse_schedule_time;

pub(super) fn parse_placement(placement: &str) -> Result<PlacementKey, CliError> {
    Ok(PlacementKey::parse(placement)?)
}

fn parse_time(input: &str, now: DateTime<Utc>) -> Result<DateTime<Utc>, CliError> {
    parse_schedule_time(input, now).map_err(CliError::ParseError)
}

fn parse_target<T>(input: &str) -> Result<TargetValue<T>, CliError>
where
    T: std::str::FromStr,
    T::Err: std::fmt::Display,
{
    input.parse().map_err(CliError::ParseError)
}

fn parse_content(input: &str) -> Result<serde_json::Value, CliError> {
    serde_json::from_str(input)
        .map_err(|e| CliError::ParseError(format!("content is not valid JSON: {}", e)))
}

/// 用命令行给出的字段覆盖已有窗口
fn merge_schedule(
    base: ScheduleWindow,
    fields: &UnitFields,
    now: DateTime<Utc>,
) -> Result<ScheduleWindow, CliError> {
    let mut window = base;
    if let Some(start) = &fields.start {
        window.start_at = Some(parse_time(start, now)?);
    }
    if let Some(end) = &fields.end {
        window.end_at = Some(parse_time(end, now)?);
    }
    Ok(window)
}

fn merge_targeting(base: Targeting, fields: &UnitFields) -> Result<Targeting, CliError> {
    let mut targeting = base;
    if let Some(domain) = &fields.domain {
        targeting.domain = Some(parse_target(domain)?);
    }
    if let Some(device) = &fields.device {
        targeting.device = Some(parse_target(device)?);
    }
    if let Some(language) = &fields.language {
        targeting.language = Some(parse_target(language)?);
    }
    Ok(targeting)
}

fn touches_schedule(fields: &UnitFields) -> bool {
    fields.start.is_some() || fields.end.is_some()
}

fn touches_targeting(fields: &UnitFields) -> bool {
    fields.domain.is_some() || fields.device.is_some() || fields.language.is_some()
}

/// 组装创建请求：JSON 文档打底，命令行字段覆盖
pub(super) fn build_new_unit(
    placement: Option<String>,
    from_json: Option<String>,
    fields: UnitFields,
    created_by: Option<String>,
    now: DateTime<Utc>,
) -> Result<NewContentUnit, CliError> {
    let mut new_unit = match from_json {
        Some(raw) => serde_json::from_str::<NewContentUnit>(&raw)
            .map_err(|e| CliError::ParseError(format!("invalid unit JSON: {}", e)))?,
        None => NewContentUnit::default(),
    };

    if let Some(placement) = placement {
        new_unit.placement_key = Some(parse_placement(&placement)?);
    }
    if fields.status.is_some() {
        new_unit.status = fields.status;
    }
    if new_unit.status == Some(ContentStatus::Disabled) {
        return Err(CliError::ParseError(
            "a new content unit cannot start DISABLED; use PENDING or ACTIVE".to_string(),
        ));
    }
    if fields.priority.is_some() {
        new_unit.priority = fields.priority;
    }
    if fields.surface.is_some() {
        new_unit.surface = fields.surface.clone();
    }
    if let Some(content) = &fields.content {
        new_unit.content = parse_content(content)?;
    }
    if created_by.is_some() {
        new_unit.created_by = created_by;
    }
    new_unit.schedule = merge_schedule(new_unit.schedule, &fields, now)?;
    new_unit.targeting = merge_targeting(new_unit.targeting, &fields)?;

    Ok(new_unit)
}

/// 组装 patch；时间窗口与定向按维度合并到现有记录上
pub(super) fn build_patch(
    existing: &ContentUnit,
    placement: Option<String>,
    fields: UnitFields,
    now: DateTime<Utc>,
) -> Result<ContentUnitPatch, CliError> {
    let schedule = if touches_schedule(&fields) {
        Some(merge_schedule(existing.schedule, &fields, now)?)
    } else {
        None
    };
    let targeting = if touches_targeting(&fields) {
        Some(merge_targeting(existing.targeting.clone(), &fields)?)
    } else {
        None
    };

    Ok(ContentUnitPatch {
        status: fields.status,
        surface: fields.surface.clone(),
        placement_key: placement.as_deref().map(parse_placement).transpose()?,
        schedule,
        targeting,
        priority: fields.priority,
        content: fields.content.as_deref().map(parse_content).transpose()?,
    })
}

fn format_time(time: DateTime<Utc>) -> String {
    time.format("%Y-%m-%d %H:%M:%S UTC").to_string()
}

/// 单行摘要，`list` 与 `add` 共用
pub(super) fn unit_summary(unit: &ContentUnit) -> String {
    let mut parts = vec![format!(
        "{} {} [{}] p={}",
        unit.id.cyan(),
        unit.placement_key.placement().magenta(),
        unit.status,
        unit.priority
    )];

    if let Some(surface) = &unit.surface {
        parts.push(format!("surface={}", surface).dimmed().to_string());
    }
    if unit.schedule.start_at.is_some() || unit.schedule.end_at.is_some() {
        let start = unit.schedule.start_at.map(format_time).unwrap_or_else(|| "-".into());
        let end = unit.schedule.end_at.map(format_time).unwrap_or_else(|| "-".into());
        parts.push(format!("({} .. {})", start, end).dimmed().yellow().to_string());
    }
    let targeting = targeting_summary(&unit.targeting);
    if !targeting.is_empty() {
        parts.push(targeting.dimmed().cyan().to_string());
    }
    parts.join(" ")
}

fn targeting_summary(targeting: &Targeting) -> String {
    let mut parts = Vec::new();
    if let Some(domain) = &targeting.domain {
        parts.push(format!("domain={}", domain));
    }
    if let Some(device) = &targeting.device {
        parts.push(format!("device={}", device));
    }
    if let Some(language) = &targeting.language {
        parts.push(format!("language={}", language));
    }
    parts.join(",")
}

pub(super) fn print_json<T: serde::Serialize>(value: &T) -> Result<(), CliError> {
    let json = serde_json::to_string_pretty(value)
        .map_err(|e| CliError::CommandError(format!("Failed to serialize output: {}", e)))?;
    println!("{}", json);
    Ok(())
}

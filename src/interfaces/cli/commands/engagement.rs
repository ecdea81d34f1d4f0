//! Engagement commands

use colored::Colorize;

use crate::analytics::EngagementKind;
use crate::interfaces::cli::CliError;
use crate::runtime::PromoRuntime;

pub fn record_engagement(
    runtime: &PromoRuntime,
    id: &str,
    kind: EngagementKind,
) -> Result<(), CliError> {
    // 事件记录本身不校验 id，CLI 这里拦一下手误
    runtime.content.require(id)?;

    match kind {
        EngagementKind::Impression => runtime.tracker.record_impression(id),
        EngagementKind::Click => runtime.tracker.record_click(id),
    }
    println!("{} Recorded {} for {}", "✓".bold().green(), kind, id.cyan());
    Ok(())
}

pub fn show_stats(
    runtime: &PromoRuntime,
    id: Option<String>,
    kind: Option<EngagementKind>,
    recent: usize,
) -> Result<(), CliError> {
    let mut rows: Vec<_> = match &id {
        Some(id) => vec![(id.clone(), runtime.tracker.stats_for(id))],
        None => runtime.tracker.stats().into_iter().collect(),
    };
    rows.sort_by(|a, b| a.0.cmp(&b.0));

    if rows.is_empty() {
        println!("{} No engagement recorded", "ℹ".bold().blue());
    } else {
        println!("{}", "Engagement:".bold().green());
        for (unit_id, stats) in &rows {
            println!(
                "  {} impressions={} clicks={} ctr={:.2}%",
                unit_id.cyan(),
                stats.impressions,
                stats.clicks,
                stats.click_through_rate() * 100.0
            );
        }
    }

    if recent > 0 {
        let events: Vec<_> = runtime
            .tracker
            .events()
            .into_iter()
            .filter(|e| id.as_ref().is_none_or(|id| &e.content_unit_id == id))
            .filter(|e| kind.is_none_or(|k| e.kind == k))
            .take(recent)
            .collect();
        println!();
        println!("{}", "Recent events:".bold().green());
        for event in events {
            println!(
                "  {} {:<10} {}",
                event.timestamp.format("%Y-%m-%d %H:%M:%S").to_string().dimmed(),
                event.kind.to_string(),
                event.content_unit_id.cyan()
            );
        }
    }

    println!(
        "{} {} events in log",
        "ℹ".bold().blue(),
        runtime.tracker.len().to_string().green()
    );
    Ok(())
}

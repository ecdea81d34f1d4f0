//! Resolution commands

use colored::Colorize;

use super::helpers::{parse_placement, print_json};
use crate::cli::ContextArgs;
use crate::config::StaticConfig;
use crate::interfaces::cli::CliError;
use crate::resolve::{PageContext, PlacementQuery};
use crate::runtime::PromoRuntime;

fn page_context(args: ContextArgs, config: &StaticConfig) -> PageContext {
    let surface = args
        .surface
        .unwrap_or_else(|| config.resolution.default_surface.clone());
    PageContext {
        surface,
        page_scope: args.page,
        domain: args.domain,
        device: args.device,
        viewport_width: args.width,
        language: args.language,
    }
}

pub async fn resolve_page(
    runtime: &PromoRuntime,
    config: &StaticConfig,
    args: ContextArgs,
    json: bool,
) -> Result<(), CliError> {
    let ctx = page_context(args, config);
    let resolved = ctx.resolve(runtime.serving.defaults());
    let page = runtime.serving.resolve_page(&ctx).await;

    if json {
        return print_json(&*page);
    }

    println!(
        "{} {} ({} / {} / {})",
        "Page".bold().green(),
        resolved.page_scope.magenta(),
        resolved.surface,
        resolved.device,
        resolved.language
    );
    for (slot, winner) in &page.slots {
        match winner {
            Some(unit) => println!(
                "  {:<12} {} p={}",
                slot.to_string().bold(),
                unit.id.cyan(),
                unit.priority
            ),
            None => println!("  {:<12} {}", slot.to_string().bold(), "-".dimmed()),
        }
    }
    Ok(())
}

pub async fn resolve_placement(
    runtime: &PromoRuntime,
    config: &StaticConfig,
    placement: &str,
    service_scope: Option<String>,
    language: Option<String>,
    json: bool,
) -> Result<(), CliError> {
    let key = parse_placement(placement)?;
    let language = language.unwrap_or_else(|| config.resolution.default_language.clone());
    let mut query = PlacementQuery::new(key, language);
    if let Some(scope) = service_scope {
        query = query.with_service_scope(scope);
    }

    let units = runtime.serving.resolve_for_placement(&query, runtime.clock.now()).await;

    if json {
        return print_json(&units);
    }

    if units.is_empty() {
        println!("{} Nothing eligible for {}", "ℹ".bold().blue(), placement.magenta());
        return Ok(());
    }

    println!(
        "{} {} (rotates every {}s)",
        "Rotation for".bold().green(),
        placement.magenta(),
        config.resolution.rotation_interval_secs
    );
    for (index, unit) in units.iter().enumerate() {
        println!("  {}. {} p={}", index + 1, unit.id.cyan(), unit.priority);
    }
    Ok(())
}

//! Content unit authoring commands

use colored::Colorize;

use super::helpers::{build_new_unit, build_patch, print_json, unit_summary};
use crate::cli::UnitFields;
use crate::interfaces::cli::CliError;
use crate::runtime::PromoRuntime;
use crate::storage::ContentStatus;

pub fn list_units(
    runtime: &PromoRuntime,
    status: Option<ContentStatus>,
    json: bool,
) -> Result<(), CliError> {
    let units = runtime.content.list_by_status(status);

    if json {
        return print_json(&units);
    }

    if units.is_empty() {
        println!("{} No content units found", "ℹ".bold().blue());
        return Ok(());
    }

    println!("{}", "Content units:".bold().green());
    println!();
    for unit in &units {
        println!("  {}", unit_summary(unit));
    }
    println!();
    println!(
        "{} Total {} content units",
        "ℹ".bold().blue(),
        units.len().to_string().green()
    );
    Ok(())
}

pub fn show_unit(runtime: &PromoRuntime, id: &str) -> Result<(), CliError> {
    let unit = runtime.content.require(id)?;
    print_json(&unit)
}

pub fn add_unit(
    runtime: &PromoRuntime,
    placement: Option<String>,
    from_json: Option<String>,
    fields: UnitFields,
    created_by: Option<String>,
) -> Result<(), CliError> {
    let new_unit = build_new_unit(placement, from_json, fields, created_by, runtime.clock.now())?;
    let unit = runtime.content.create(new_unit)?;

    println!("{} Added content unit: {}", "✓".bold().green(), unit_summary(&unit));
    if unit.status == ContentStatus::Pending {
        println!(
            "{} Unit is PENDING; activate it with `update {} --status ACTIVE`",
            "ℹ".bold().blue(),
            unit.id
        );
    }
    Ok(())
}

pub fn update_unit(
    runtime: &PromoRuntime,
    id: &str,
    placement: Option<String>,
    fields: UnitFields,
) -> Result<(), CliError> {
    let existing = runtime.content.require(id)?;
    let patch = build_patch(&existing, placement, fields, runtime.clock.now())?;
    runtime.content.update(id, patch)?;

    let updated = runtime.content.require(id)?;
    println!("{} Content unit updated: {}", "✓".bold().green(), unit_summary(&updated));
    Ok(())
}

pub fn disable_unit(runtime: &PromoRuntime, id: &str) -> Result<(), CliError> {
    runtime.content.require(id)?;
    runtime.content.soft_delete(id)?;
    println!("{} Content unit disabled: {}", "✓".bold().green(), id.cyan());
    Ok(())
}

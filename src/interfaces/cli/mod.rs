//! CLI interface module
//!
//! This module provides command-line interface functionality for promoserve.

pub mod commands;

use std::fmt;

use colored::Colorize;

use crate::cli::{Commands, ConfigCommands};
use crate::config::StaticConfig;
use crate::errors::PromoError;
use crate::runtime::PromoRuntime;
use commands::{
    add_unit, config_generate, config_show, disable_unit, list_units, record_engagement,
    resolve_page, resolve_placement, show_stats, show_unit, update_unit,
};

#[derive(Debug)]
pub enum CliError {
    StorageError(String),
    ParseError(String),
    CommandError(String),
}

impl CliError {
    /// Format as simple output
    pub fn format_simple(&self) -> String {
        match self {
            CliError::StorageError(msg) => format!("Storage error: {}", msg),
            CliError::ParseError(msg) => format!("Parse error: {}", msg),
            CliError::CommandError(msg) => format!("Command error: {}", msg),
        }
    }

    /// Format as colored output
    pub fn format_colored(&self) -> String {
        match self {
            CliError::StorageError(msg) => {
                format!("{} {}", "Storage error:".red().bold(), msg.white())
            }
            CliError::ParseError(msg) => {
                format!("{} {}", "Parse error:".yellow().bold(), msg.white())
            }
            CliError::CommandError(msg) => {
                format!("{} {}", "Command error:".red().bold(), msg.white())
            }
        }
    }
}

impl fmt::Display for CliError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.format_simple())
    }
}

impl std::error::Error for CliError {}

impl From<PromoError> for CliError {
    fn from(err: PromoError) -> Self {
        match err {
            PromoError::Validation(_) | PromoError::Serialization(_) => {
                CliError::ParseError(err.message().to_string())
            }
            PromoError::NotFound(_) => CliError::CommandError(err.message().to_string()),
            _ => CliError::StorageError(err.to_string()),
        }
    }
}

/// Run a CLI command from clap-parsed input
pub async fn run_cli_command(cmd: Commands, config: &StaticConfig) -> Result<(), CliError> {
    // config 子命令不需要存储
    if let Commands::Config { action } = cmd {
        return match action {
            ConfigCommands::Generate { output_path, force } => {
                config_generate(output_path, force).await
            }
            ConfigCommands::Show => config_show(config),
        };
    }

    let runtime = PromoRuntime::from_config(config)?;

    match cmd {
        Commands::List { status, json } => list_units(&runtime, status, json),

        Commands::Show { id } => show_unit(&runtime, &id),

        Commands::Add {
            placement,
            from_json,
            fields,
            created_by,
        } => add_unit(&runtime, placement, from_json, fields, created_by),

        Commands::Update {
            id,
            placement,
            fields,
        } => update_unit(&runtime, &id, placement, fields),

        Commands::Disable { id } => disable_unit(&runtime, &id),

        Commands::Resolve { context, json } => resolve_page(&runtime, config, context, json).await,

        Commands::Placement {
            placement,
            service_scope,
            language,
            json,
        } => resolve_placement(&runtime, config, &placement, service_scope, language, json).await,

        Commands::Impression { id } => {
            record_engagement(&runtime, &id, crate::analytics::EngagementKind::Impression)
        }

        Commands::Click { id } => {
            record_engagement(&runtime, &id, crate::analytics::EngagementKind::Click)
        }

        Commands::Stats { id, kind, recent } => show_stats(&runtime, id, kind, recent),

        Commands::Config { .. } => unreachable!("handled above"),
    }
}

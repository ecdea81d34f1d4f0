//! Command-line interface definitions using clap
//!
//! This module defines the CLI structure for promoserve using clap's derive macros.

use clap::{Args, Parser, Subcommand};

use crate::analytics::EngagementKind;
use crate::storage::{ContentStatus, DeviceClass};

/// Promoserve - promotional content serving engine
#[derive(Parser)]
#[command(name = "promoserve")]
#[command(version)]
#[command(about = "Targeted promotional content: authoring, resolution and engagement", long_about = None)]
pub struct Cli {
    /// Configuration file (default: promoserve.toml)
    #[arg(long, short = 'c', global = true)]
    pub config: Option<String>,

    #[command(subcommand)]
    pub command: Commands,
}

/// Available commands
#[derive(Subcommand)]
pub enum Commands {
    /// List content units
    List {
        /// Only show units with this status (PENDING, ACTIVE, DISABLED)
        #[arg(long)]
        status: Option<ContentStatus>,

        /// Output as JSON
        #[arg(long)]
        json: bool,
    },

    /// Show a single content unit
    Show {
        /// Content unit id
        id: String,
    },

    /// Create a content unit
    ///
    /// Either pass a full JSON document with `--from-json`, or describe the
    /// unit with flags. Flags override fields of the JSON document.
    Add {
        /// Placement, e.g. HOME/PAGE_TOP or ALL/SIDEBAR
        #[arg(long)]
        placement: Option<String>,

        /// JSON document describing the unit
        #[arg(long = "from-json")]
        from_json: Option<String>,

        #[command(flatten)]
        fields: UnitFields,

        /// Author recorded on the unit
        #[arg(long)]
        created_by: Option<String>,
    },

    /// Update fields of a content unit
    Update {
        /// Content unit id
        id: String,

        /// New placement
        #[arg(long)]
        placement: Option<String>,

        #[command(flatten)]
        fields: UnitFields,
    },

    /// Disable (soft delete) a content unit
    Disable {
        /// Content unit id
        id: String,
    },

    /// Resolve every slot of a page for a visitor context
    Resolve {
        #[command(flatten)]
        context: ContextArgs,

        /// Output as JSON
        #[arg(long)]
        json: bool,
    },

    /// Ranked rotation list for one placement
    Placement {
        /// Placement, e.g. HOME/PAGE_TOP
        placement: String,

        /// Service scope, matched against domain targeting
        #[arg(long)]
        service_scope: Option<String>,

        /// Language (default from configuration)
        #[arg(long)]
        language: Option<String>,

        /// Output as JSON
        #[arg(long)]
        json: bool,
    },

    /// Record an impression for a content unit
    Impression {
        /// Content unit id
        id: String,
    },

    /// Record a click for a content unit
    Click {
        /// Content unit id
        id: String,
    },

    /// Show engagement statistics
    Stats {
        /// Only this content unit
        id: Option<String>,

        /// Only events of this kind in the recent event listing
        #[arg(long)]
        kind: Option<EngagementKind>,

        /// Number of recent events to list
        #[arg(long, default_value_t = 0)]
        recent: usize,
    },

    /// Manage configuration
    Config {
        #[command(subcommand)]
        action: ConfigCommands,
    },
}

/// Optional unit fields shared by `add` and `update`
#[derive(Args, Debug, Default, Clone)]
pub struct UnitFields {
    /// Status (PENDING, ACTIVE, DISABLED)
    #[arg(long)]
    pub status: Option<ContentStatus>,

    /// Priority, higher wins
    #[arg(long, allow_hyphen_values = true)]
    pub priority: Option<i32>,

    /// Surface the unit is restricted to
    #[arg(long)]
    pub surface: Option<String>,

    /// Schedule start (RFC3339 or relative like "1d", "2h")
    #[arg(long)]
    pub start: Option<String>,

    /// Schedule end (RFC3339 or relative like "1d", "2h")
    #[arg(long)]
    pub end: Option<String>,

    /// Domain targeting (value or ALL)
    #[arg(long)]
    pub domain: Option<String>,

    /// Device targeting (MOBILE, TABLET, DESKTOP or ALL)
    #[arg(long)]
    pub device: Option<String>,

    /// Language targeting (value or ALL)
    #[arg(long)]
    pub language: Option<String>,

    /// Display payload as JSON
    #[arg(long)]
    pub content: Option<String>,
}

/// Visitor context for `resolve`
#[derive(Args, Debug, Clone)]
pub struct ContextArgs {
    /// Page scope, e.g. HOME
    pub page: String,

    /// Surface (default from configuration)
    #[arg(long)]
    pub surface: Option<String>,

    #[arg(long)]
    pub domain: Option<String>,

    #[arg(long)]
    pub device: Option<DeviceClass>,

    /// Viewport width in pixels, used when --device is absent
    #[arg(long)]
    pub width: Option<u32>,

    #[arg(long)]
    pub language: Option<String>,
}

/// Configuration management commands
#[derive(Subcommand)]
pub enum ConfigCommands {
    /// Generate example configuration file
    Generate {
        /// Output path (default: promoserve.example.toml)
        output_path: Option<String>,

        /// Force overwrite without confirmation
        #[arg(long)]
        force: bool,
    },

    /// Print the effective configuration
    Show,
}

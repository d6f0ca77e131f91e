//! # Capes CLI Module
//!
//! This module implements the CLI interface for Capes.
//!
//! ## Available Commands
//!
//! - `server` - Start the HTTP server
//! - `init` - Initialize a new database
//! - `list` - List characters (filters, ordering, pages)
//! - `show` - Show one character
//! - `create` / `update` / `delete` - Write operations (JSON input files)
//! - `stats` - Catalogue statistics
//! - `top` / `villains` / `by-universe` - Canned queries
//! - `toggle-villain` / `toggle-active` - Status flips

mod commands;

use crate::config::{Backend, ConfigError, Overrides, Settings};
use capes_core::{CatalogueError, CharacterId};
use clap::{Parser, Subcommand};
use std::path::PathBuf;
use thiserror::Error;

pub use commands::*;

// =============================================================================
// CLI ERRORS
// =============================================================================

/// Errors surfaced by CLI commands.
#[derive(Debug, Error)]
pub enum CliError {
    #[error(transparent)]
    Catalogue(#[from] CatalogueError),

    #[error(transparent)]
    Config(#[from] ConfigError),

    #[error("I/O error: {0}")]
    Io(String),

    #[error("Invalid input: {0}")]
    InvalidInput(String),
}

// =============================================================================
// CLI STRUCTURE
// =============================================================================

/// Capes - character catalogue
///
/// Create, browse, filter and summarise a catalogue of heroes and villains.
#[derive(Parser, Debug)]
#[command(name = "capes")]
#[command(version, about, long_about = None)]
pub struct Cli {
    /// Suppress banner output
    #[arg(short, long, global = true)]
    pub quiet: bool,

    /// Path to the character database
    #[arg(short = 'D', long, global = true)]
    pub database: Option<PathBuf>,

    /// Storage backend
    #[arg(short = 'B', long, global = true, value_enum)]
    pub backend: Option<Backend>,

    /// TOML configuration file
    #[arg(short = 'c', long, global = true)]
    pub config: Option<PathBuf>,

    /// Output in JSON format (for programmatic access)
    #[arg(long, global = true)]
    pub json_mode: bool,

    /// Subcommand to execute
    #[command(subcommand)]
    pub command: Option<Commands>,
}

/// Available CLI commands.
#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Start HTTP server
    Server {
        /// Host to bind to
        #[arg(short = 'H', long)]
        host: Option<String>,

        /// Port to bind to
        #[arg(short, long)]
        port: Option<u16>,
    },

    /// Initialize a new empty database
    Init {
        /// Force initialization even if database exists
        #[arg(short, long)]
        force: bool,
    },

    /// List characters
    List {
        /// Filter criterion as key=value (repeatable), e.g. universe=DC
        #[arg(short, long = "filter", value_name = "KEY=VALUE")]
        filters: Vec<String>,

        /// Ordering, e.g. -power_level or age,name
        #[arg(short, long)]
        ordering: Option<String>,

        /// Page number (1-based)
        #[arg(long)]
        page: Option<String>,

        /// Page size
        #[arg(long)]
        page_size: Option<String>,
    },

    /// Show one character
    Show { id: CharacterId },

    /// Create a character from a JSON file
    Create {
        #[arg(short, long)]
        file: PathBuf,
    },

    /// Update a character from a JSON file
    Update {
        id: CharacterId,

        #[arg(short, long)]
        file: PathBuf,

        /// Only change the fields present in the file
        #[arg(long)]
        partial: bool,
    },

    /// Delete a character
    Delete { id: CharacterId },

    /// Show catalogue statistics
    Stats,

    /// Strongest non-villains
    Top {
        #[arg(short, long)]
        limit: Option<String>,
    },

    /// List villains
    Villains,

    /// List the characters of one universe
    ByUniverse { universe: Option<String> },

    /// Flip villain status
    ToggleVillain { id: CharacterId },

    /// Flip active status
    ToggleActive { id: CharacterId },
}

// =============================================================================
// COMMAND EXECUTION
// =============================================================================

/// Execute the CLI with parsed arguments.
pub async fn execute(cli: Cli) -> Result<(), CliError> {
    let mut settings = Settings::load(cli.config.as_deref())?;
    let server_overrides = match &cli.command {
        Some(Commands::Server { host, port }) => (host.clone(), *port),
        _ => (None, None),
    };
    settings.apply_overrides(&Overrides {
        host: server_overrides.0,
        port: server_overrides.1,
        database: cli.database,
        backend: cli.backend,
    });

    let out = Output {
        json: cli.json_mode,
    };

    match cli.command {
        Some(Commands::Server { .. }) => cmd_server(&settings).await,
        Some(Commands::Init { force }) => cmd_init(&settings, force),
        Some(Commands::List {
            filters,
            ordering,
            page,
            page_size,
        }) => cmd_list(&settings, out, &filters, ordering, page, page_size),
        Some(Commands::Show { id }) => cmd_show(&settings, out, id),
        Some(Commands::Create { file }) => cmd_create(&settings, out, &file),
        Some(Commands::Update { id, file, partial }) => {
            cmd_update(&settings, out, id, &file, partial)
        }
        Some(Commands::Delete { id }) => cmd_delete(&settings, out, id),
        Some(Commands::Stats) | None => cmd_stats(&settings, out),
        Some(Commands::Top { limit }) => cmd_top(&settings, out, limit.as_deref()),
        Some(Commands::Villains) => cmd_villains(&settings, out),
        Some(Commands::ByUniverse { universe }) => {
            cmd_by_universe(&settings, out, universe.as_deref())
        }
        Some(Commands::ToggleVillain { id }) => cmd_toggle_villain(&settings, out, id),
        Some(Commands::ToggleActive { id }) => cmd_toggle_active(&settings, out, id),
    }
}

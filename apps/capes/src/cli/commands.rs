//! # CLI Command Implementations
//!
//! This module contains the actual implementations of CLI commands.

use super::CliError;
use crate::api;
use crate::config::{Backend, Settings};
use capes_core::{
    Catalogue, CharacterId, CharacterInput, DetailView, ListParams, ListView, StorageBackend,
    ToggleOutcome, parse_limit,
};
use serde::Serialize;
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

// =============================================================================
// FILE SIZE LIMITS
// =============================================================================

/// Maximum size of a character input file (1 MB).
const MAX_INPUT_FILE_SIZE: u64 = 1024 * 1024;

/// Validate file path: it must exist and be a regular file.
///
/// Canonicalizing resolves symlinks and `..` before anything is read.
fn validate_file_path(path: &Path) -> Result<PathBuf, CliError> {
    let canonical = path.canonicalize().map_err(|e| {
        CliError::Io(format!("Invalid file path '{}': {}", path.display(), e))
    })?;

    if !canonical.is_file() {
        return Err(CliError::Io(format!(
            "Path '{}' is not a regular file",
            path.display()
        )));
    }

    Ok(canonical)
}

/// Read a character input (JSON object) from a file.
pub fn read_input(path: &Path) -> Result<CharacterInput, CliError> {
    let validated = validate_file_path(path)?;

    let metadata = std::fs::metadata(&validated)
        .map_err(|e| CliError::Io(format!("Cannot read file metadata: {}", e)))?;
    if metadata.len() > MAX_INPUT_FILE_SIZE {
        return Err(CliError::InvalidInput(format!(
            "File size {} bytes exceeds maximum allowed {} bytes",
            metadata.len(),
            MAX_INPUT_FILE_SIZE
        )));
    }

    let contents = std::fs::read(&validated)
        .map_err(|e| CliError::Io(format!("Read file: {}", e)))?;
    serde_json::from_slice(&contents).map_err(|e| CliError::InvalidInput(e.to_string()))
}

// =============================================================================
// OUTPUT
// =============================================================================

/// Output mode shared by every command.
#[derive(Debug, Clone, Copy)]
pub struct Output {
    pub json: bool,
}

impl Output {
    fn emit<T: Serialize>(self, value: &T) -> Result<(), CliError> {
        let text = serde_json::to_string_pretty(value)
            .map_err(|e| CliError::InvalidInput(format!("Cannot render output: {}", e)))?;
        println!("{}", text);
        Ok(())
    }

    fn detail(self, view: &DetailView) -> Result<(), CliError> {
        if self.json {
            return self.emit(view);
        }

        let optional = |v: &Option<String>| v.clone().unwrap_or_else(|| "-".to_string());
        println!("#{} {}", view.id, view.display_name);
        println!("  Real name:    {}", optional(&view.real_name));
        println!("  Universe:     {}", view.universe);
        println!(
            "  Power level:  {} ({})",
            view.power_level, view.power_description
        );
        println!(
            "  Age:          {}",
            view.age.map_or_else(|| "-".to_string(), |a| a.to_string())
        );
        println!(
            "  Height:       {}",
            view.height.map_or_else(|| "-".to_string(), |h| h.to_string())
        );
        println!(
            "  Weight:       {}",
            view.weight.map_or_else(|| "-".to_string(), |w| w.to_string())
        );
        println!("  Powers:       {}", optional(&view.powers));
        println!("  Active:       {}", view.is_active);
        println!("  Villain:      {}", view.is_villain);
        println!("  Created:      {}", view.created_at.to_rfc3339());
        println!("  Updated:      {}", view.updated_at.to_rfc3339());
        Ok(())
    }

    fn rows(self, views: &[ListView]) -> Result<(), CliError> {
        if self.json {
            return self.emit(&views);
        }

        if views.is_empty() {
            println!("No characters found");
            return Ok(());
        }
        for view in views {
            let role = if view.is_villain { "villain" } else { "hero" };
            let status = if view.is_active { "" } else { " [inactive]" };
            println!(
                "{:>5}  {:<32} {:<7} {:>2} {:<10} {}{}",
                view.id.0,
                view.display_name,
                view.universe.as_str(),
                view.power_level,
                view.power_description,
                role,
                status
            );
        }
        Ok(())
    }

    fn toggle(self, outcome: &ToggleOutcome) -> Result<(), CliError> {
        if self.json {
            return self.emit(outcome);
        }
        println!("{}", outcome.message);
        Ok(())
    }
}

// =============================================================================
// CATALOGUE LOADING
// =============================================================================

/// Open the configured catalogue.
pub fn open_catalogue(settings: &Settings) -> Result<Catalogue<StorageBackend>, CliError> {
    match settings.backend {
        Backend::Redb => {
            tracing::debug!("Opening redb database at {:?}", settings.database);
            Ok(Catalogue::with_redb(&settings.database)?)
        }
        Backend::Memory => {
            tracing::debug!("Using in-memory storage");
            Ok(Catalogue::in_memory())
        }
    }
}

/// Open the configured catalogue for a one-shot write.
///
/// The memory backend lives only as long as the process, so a write from a
/// single command would be lost on exit. Only `server` may write to it.
fn open_for_write(settings: &Settings) -> Result<Catalogue<StorageBackend>, CliError> {
    if settings.backend == Backend::Memory {
        return Err(CliError::InvalidInput(
            "The memory backend does not persist between commands; use --backend redb or run the server"
                .to_string(),
        ));
    }
    open_catalogue(settings)
}

// =============================================================================
// SERVER COMMAND
// =============================================================================

/// Start the HTTP server.
pub async fn cmd_server(settings: &Settings) -> Result<(), CliError> {
    let catalogue = open_catalogue(settings)?;

    println!("Capes Server Starting...");
    println!();
    println!("Configuration:");
    println!("  Host:       {}", settings.host);
    println!("  Port:       {}", settings.port);
    println!("  Backend:    {}", settings.backend);
    println!("  Database:   {:?}", settings.database);
    println!("  Page size:  {}", settings.page_size);
    println!();
    println!("Endpoints:");
    println!("  GET    /api/characters            - List characters");
    println!("  POST   /api/characters            - Create a character");
    println!("  GET    /api/characters/{{id}}       - Show a character");
    println!("  GET    /api/characters/stats      - Statistics");
    println!("  GET    /health                    - Health check");
    println!();
    println!("Press Ctrl+C to stop");
    println!();

    Ok(api::run_server(settings, catalogue).await?)
}

// =============================================================================
// INIT COMMAND
// =============================================================================

/// Initialize a new empty database.
pub fn cmd_init(settings: &Settings, force: bool) -> Result<(), CliError> {
    if settings.backend == Backend::Memory {
        println!("In-memory backend needs no initialization");
        return Ok(());
    }

    let path = &settings.database;
    if path.exists() {
        if !force {
            return Err(CliError::Io(format!(
                "Database {:?} already exists (use --force to overwrite)",
                path
            )));
        }
        std::fs::remove_file(path)
            .map_err(|e| CliError::Io(format!("Cannot remove {:?}: {}", path, e)))?;
        tracing::info!("Removed existing database {:?}", path);
    }

    let catalogue = Catalogue::with_redb(path)?;
    println!(
        "Initialized empty database at {:?} ({} characters)",
        path,
        catalogue.len()?
    );
    Ok(())
}

// =============================================================================
// READ COMMANDS
// =============================================================================

/// Build the raw parameter map a listing is parsed from.
pub fn list_query(
    filters: &[String],
    ordering: Option<String>,
    page: Option<String>,
    page_size: Option<String>,
) -> Result<BTreeMap<String, String>, CliError> {
    let mut query = BTreeMap::new();
    for filter in filters {
        let (key, value) = filter.split_once('=').ok_or_else(|| {
            CliError::InvalidInput(format!("Filter '{}' must be KEY=VALUE", filter))
        })?;
        query.insert(key.trim().to_string(), value.to_string());
    }
    for (key, value) in [
        ("ordering", ordering),
        ("page", page),
        ("page_size", page_size),
    ] {
        if let Some(value) = value {
            query.insert(key.to_string(), value);
        }
    }
    Ok(query)
}

/// List characters.
pub fn cmd_list(
    settings: &Settings,
    out: Output,
    filters: &[String],
    ordering: Option<String>,
    page: Option<String>,
    page_size: Option<String>,
) -> Result<(), CliError> {
    let query = list_query(filters, ordering, page, page_size)?;
    let params = ListParams::parse(&query, settings.page_size)?;
    let catalogue = open_catalogue(settings)?;
    let page = catalogue.list(&params)?;

    if out.json {
        return out.emit(&page);
    }
    out.rows(&page.results)?;
    println!();
    println!(
        "Page {} of {} ({} matching)",
        page.page, page.total_pages, page.count
    );
    Ok(())
}

/// Show one character.
pub fn cmd_show(settings: &Settings, out: Output, id: CharacterId) -> Result<(), CliError> {
    let catalogue = open_catalogue(settings)?;
    out.detail(&catalogue.get(id)?)
}

/// Show catalogue statistics.
pub fn cmd_stats(settings: &Settings, out: Output) -> Result<(), CliError> {
    let catalogue = open_catalogue(settings)?;
    let stats = catalogue.stats()?;

    if out.json {
        return out.emit(&stats);
    }

    println!("Capes Catalogue Statistics");
    println!("==========================");
    println!("Backend:  {}", settings.backend);
    println!();
    println!("Total:         {}", stats.total);
    println!("Active:        {}", stats.active);
    println!("Inactive:      {}", stats.inactive);
    println!("Heroes:        {}", stats.heroes);
    println!("Villains:      {}", stats.villains);
    println!("Average power: {}", stats.average_power_level);

    if !stats.universe_distribution.is_empty() {
        println!();
        println!("By universe:");
        for (universe, count) in &stats.universe_distribution {
            println!("  {:<8} {}", universe, count);
        }
    }
    if !stats.power_level_distribution.is_empty() {
        println!();
        println!("By power level:");
        for (level, count) in &stats.power_level_distribution {
            println!("  {:>2}  {}", level, count);
        }
    }
    Ok(())
}

/// Strongest non-villains.
pub fn cmd_top(settings: &Settings, out: Output, limit: Option<&str>) -> Result<(), CliError> {
    let limit = parse_limit(limit)?;
    let catalogue = open_catalogue(settings)?;
    out.rows(&catalogue.top(limit)?)
}

/// List villains.
pub fn cmd_villains(settings: &Settings, out: Output) -> Result<(), CliError> {
    let catalogue = open_catalogue(settings)?;
    out.rows(&catalogue.villains()?)
}

/// List one universe.
pub fn cmd_by_universe(
    settings: &Settings,
    out: Output,
    universe: Option<&str>,
) -> Result<(), CliError> {
    let catalogue = open_catalogue(settings)?;
    out.rows(&catalogue.by_universe(universe)?)
}

// =============================================================================
// WRITE COMMANDS
// =============================================================================

/// Create a character from a JSON file.
pub fn cmd_create(settings: &Settings, out: Output, file: &Path) -> Result<(), CliError> {
    let mut catalogue = open_for_write(settings)?;
    let input = read_input(file)?;
    let created = catalogue.create(input)?;

    tracing::info!(id = %created.id, name = %created.name, "Character created");
    out.detail(&created)
}

/// Update a character from a JSON file.
pub fn cmd_update(
    settings: &Settings,
    out: Output,
    id: CharacterId,
    file: &Path,
    partial: bool,
) -> Result<(), CliError> {
    let mut catalogue = open_for_write(settings)?;
    let input = read_input(file)?;
    let updated = catalogue.update(id, input, partial)?;

    tracing::info!(id = %updated.id, partial, "Character updated");
    out.detail(&updated)
}

/// Delete a character.
pub fn cmd_delete(settings: &Settings, out: Output, id: CharacterId) -> Result<(), CliError> {
    let mut catalogue = open_for_write(settings)?;
    catalogue.delete(id)?;

    tracing::info!(id = %id, "Character deleted");
    if out.json {
        return out.emit(&serde_json::json!({ "deleted": id }));
    }
    println!("Deleted character {}", id);
    Ok(())
}

/// Flip villain status.
pub fn cmd_toggle_villain(
    settings: &Settings,
    out: Output,
    id: CharacterId,
) -> Result<(), CliError> {
    let mut catalogue = open_for_write(settings)?;
    out.toggle(&catalogue.toggle_villain(id)?)
}

/// Flip active status.
pub fn cmd_toggle_active(
    settings: &Settings,
    out: Output,
    id: CharacterId,
) -> Result<(), CliError> {
    let mut catalogue = open_for_write(settings)?;
    out.toggle(&catalogue.toggle_active(id)?)
}

// =============================================================================
// TESTS
// =============================================================================

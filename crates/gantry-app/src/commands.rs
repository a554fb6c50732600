//! Implementations of the CLI subcommands.
//!
//! Commands write their output to the given writer so they can be driven
//! from tests; `main` passes stdout.

use std::io::Write;
use std::path::Path;
use std::time::Instant;

use chrono::{DateTime, Utc};

use gantry_action::scaffold_action;
use gantry_api::AppState;
use gantry_core::logfile::tail_lines;
use gantry_core::{format_duration, GantryConfig};

use crate::cli::resolve_port;
use crate::context::AppContext;
use crate::report;
use crate::system::SystemInfo;

pub type CmdResult = Result<(), Box<dyn std::error::Error>>;

/// Log lines shown at the bottom of `gantry dashboard`.
const DASHBOARD_LOG_LINES: usize = 5;

pub async fn serve(ctx: AppContext, port: Option<u16>) -> CmdResult {
    let mut config = ctx.config;
    config.server.port = resolve_port(port, config.server.port);
    if config.server.api_token.trim().is_empty() {
        tracing::warn!("No API token configured; protected endpoints will reject every request");
    }
    tracing::info!(
        "Dashboard at http://{}:{}/ui",
        config.server.bind,
        config.server.port
    );

    let state = AppState::new(config, ctx.dispatcher);
    gantry_api::start_server(state).await?;
    Ok(())
}

/// Run one action through the shared dispatcher.
pub async fn run(ctx: &AppContext, name: &str, args: &[String], out: &mut dyn Write) -> CmdResult {
    let start = Instant::now();
    let result = ctx.dispatcher.dispatch(name, args).await?;
    writeln!(
        out,
        "Action '{}' executed successfully in {}",
        name,
        format_duration(start.elapsed())
    )?;
    writeln!(out, "Result: {}", result)?;
    Ok(())
}

pub fn list(ctx: &AppContext, out: &mut dyn Write) -> CmdResult {
    let names = ctx.registry().list_available()?;
    if names.is_empty() {
        writeln!(
            out,
            "No actions found in {}",
            ctx.config.actions_dir().display()
        )?;
        return Ok(());
    }
    writeln!(out, "Available actions:")?;
    for name in names {
        writeln!(out, "- {}", name)?;
    }
    Ok(())
}

pub fn stats(ctx: &AppContext, name: Option<&str>, out: &mut dyn Write) -> CmdResult {
    match name {
        Some(name) => {
            let stats = ctx
                .stats()
                .get_stats(name)
                .ok_or_else(|| format!("No statistics found for action: {}", name))?;
            write!(out, "{}", report::action_stats(name, &stats))?;
        }
        None => write!(out, "{}", report::all_stats(&ctx.stats().get_all_stats()))?,
    }
    Ok(())
}

pub fn history(ctx: &AppContext, name: &str, limit: usize, out: &mut dyn Write) -> CmdResult {
    let records = ctx.stats().recent_history(name, limit);
    write!(out, "{}", report::history(name, &records))?;
    Ok(())
}

pub fn dashboard(ctx: &AppContext, out: &mut dyn Write) -> CmdResult {
    writeln!(out, "Gantry Dashboard")?;
    writeln!(out)?;
    writeln!(out, "Configuration")?;
    write!(out, "{}", report::config(&ctx.config))?;
    writeln!(out)?;

    writeln!(out, "System Information")?;
    write!(out, "{}", report::system_info(&SystemInfo::collect()))?;
    writeln!(out)?;

    writeln!(out, "Available Actions")?;
    let actions_dir = ctx.config.actions_dir();
    let all_stats = ctx.stats().get_all_stats();
    let names = ctx.registry().list_available()?;
    let rows: Vec<report::ActionRow<'_>> = names
        .iter()
        .map(|name| report::ActionRow {
            name,
            last_modified: modified_at(&actions_dir.join(name).join(name)),
            stats: all_stats.get(name),
        })
        .collect();
    write!(out, "{}", report::action_table(&rows))?;
    writeln!(out)?;

    writeln!(out, "Recent Logs")?;
    match tail_lines(&ctx.config.log_file(), DASHBOARD_LOG_LINES) {
        Ok(lines) => {
            for line in lines {
                writeln!(out, "  {}", line)?;
            }
        }
        Err(e) => writeln!(out, "  Error reading logs: {}", e)?,
    }
    Ok(())
}

fn modified_at(path: &Path) -> Option<DateTime<Utc>> {
    std::fs::metadata(path)
        .and_then(|m| m.modified())
        .ok()
        .map(DateTime::<Utc>::from)
}

pub fn new_action(config: &GantryConfig, name: &str, out: &mut dyn Write) -> CmdResult {
    let path = scaffold_action(&config.actions_dir(), name)?;
    writeln!(out, "New action '{}' created at {}", name, path.display())?;
    Ok(())
}

/// Drop any cached resolution and check the action resolves again.
pub fn update(ctx: &AppContext, name: &str, out: &mut dyn Write) -> CmdResult {
    ctx.registry().invalidate(name);
    ctx.registry().resolve(name)?;
    writeln!(out, "Action '{}' updated successfully", name)?;
    writeln!(
        out,
        "A running server picks up the change after POST /api/actions/{}/reload",
        name
    )?;
    Ok(())
}

pub fn token(config: &GantryConfig, out: &mut dyn Write) -> CmdResult {
    writeln!(out, "Your current API token is: {}", config.server.api_token)?;
    Ok(())
}

pub fn config_view(config: &GantryConfig, path: &Path, out: &mut dyn Write) -> CmdResult {
    writeln!(out, "Current Gantry configuration ({}):", path.display())?;
    write!(out, "{}", report::config(config))?;
    Ok(())
}

pub fn config_reset(path: &Path, out: &mut dyn Write) -> CmdResult {
    let config = GantryConfig::reset(path)?;
    writeln!(out, "Configuration reset to defaults at {}", path.display())?;
    writeln!(out, "New API token: {}", config.server.api_token)?;
    Ok(())
}

pub fn logs(config: &GantryConfig, lines: usize, out: &mut dyn Write) -> CmdResult {
    let log_file = config.log_file();
    let tail = tail_lines(&log_file, lines)
        .map_err(|e| format!("Error reading logs from {}: {}", log_file.display(), e))?;
    for line in tail {
        writeln!(out, "{}", line)?;
    }
    Ok(())
}

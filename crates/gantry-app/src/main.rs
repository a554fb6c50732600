//! Gantry application binary - composition root.
//!
//! 1. Parse the command line
//! 2. Load (or create) the TOML configuration
//! 3. Set up tracing to the console and the log file
//! 4. Build the shared context and run the requested command

mod cli;
mod commands;
mod context;
mod report;
mod system;

use std::fs::OpenOptions;
use std::path::Path;
use std::process::ExitCode;
use std::sync::Mutex;

use clap::Parser;
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

use gantry_core::GantryConfig;

use crate::cli::{CliArgs, Command, ConfigCommand};
use crate::commands::CmdResult;
use crate::context::AppContext;

/// Console output follows the configured level only for the server; one-shot
/// commands keep the terminal for their own output and log to the file.
fn init_tracing(level: &str, log_file: &Path, verbose_console: bool) {
    let filter = || EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(level));

    let file_layer = match open_log_file(log_file) {
        Ok(file) => Some(
            fmt::layer()
                .with_ansi(false)
                .with_writer(Mutex::new(file))
                .with_filter(filter()),
        ),
        Err(e) => {
            eprintln!("Warning: cannot open log file {}: {}", log_file.display(), e);
            None
        }
    };

    let console_filter = if verbose_console {
        filter()
    } else {
        EnvFilter::new("warn")
    };
    let console_layer = fmt::layer()
        .with_writer(std::io::stderr)
        .with_filter(console_filter);

    tracing_subscriber::registry()
        .with(console_layer)
        .with(file_layer)
        .init();
}

fn open_log_file(path: &Path) -> std::io::Result<std::fs::File> {
    if let Some(parent) = path.parent() {
        if !parent.as_os_str().is_empty() {
            std::fs::create_dir_all(parent)?;
        }
    }
    OpenOptions::new().create(true).append(true).open(path)
}

async fn execute(cli: CliArgs, config: GantryConfig, config_path: &Path) -> CmdResult {
    let mut stdout = std::io::stdout().lock();
    let out: &mut dyn std::io::Write = &mut stdout;

    match cli.command {
        // Commands that never touch the statistics store.
        Command::Token => commands::token(&config, out),
        Command::New { name } => commands::new_action(&config, &name, out),
        Command::Logs { lines } => commands::logs(&config, lines, out),
        Command::Config { action } => match action {
            ConfigCommand::View => commands::config_view(&config, config_path, out),
            ConfigCommand::Reset => commands::config_reset(config_path, out),
        },
        command => {
            let ctx = AppContext::open(config, config_path.to_path_buf())?;
            match command {
                Command::Serve { port } => commands::serve(ctx, port).await,
                Command::Run { name, args } => commands::run(&ctx, &name, &args, out).await,
                Command::List => commands::list(&ctx, out),
                Command::Stats { name } => commands::stats(&ctx, name.as_deref(), out),
                Command::History { name, limit } => commands::history(&ctx, &name, limit, out),
                Command::Dashboard => commands::dashboard(&ctx, out),
                Command::Update { name } => commands::update(&ctx, &name, out),
                Command::Token
                | Command::New { .. }
                | Command::Logs { .. }
                | Command::Config { .. } => Ok(()),
            }
        }
    }
}

#[tokio::main]
async fn main() -> ExitCode {
    let cli = CliArgs::parse();

    let config_path = cli.resolve_config_path();
    let config = match GantryConfig::load_or_create(&config_path) {
        Ok(config) => config,
        Err(e) => {
            eprintln!(
                "Error: failed to load configuration from {}: {}",
                config_path.display(),
                e
            );
            return ExitCode::FAILURE;
        }
    };

    let level = cli.resolve_log_level(&config.general.log_level);
    let serving = matches!(cli.command, Command::Serve { .. });
    init_tracing(&level, &config.log_file(), serving);

    tracing::debug!(path = %config_path.display(), "Configuration loaded");
    if serving {
        tracing::info!("Starting Gantry v{}", env!("CARGO_PKG_VERSION"));
    }

    match execute(cli, config, &config_path).await {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            tracing::error!(error = %e, "Command failed");
            eprintln!("Error: {}", e);
            ExitCode::FAILURE
        }
    }
}

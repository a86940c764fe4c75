//! cubeline - build and feed an OLAP cube from an OData source
//!
//! Builds dimensions from the Northwind sample service, publishes them and a
//! sales cube to a TM1 server, loads order data and watches the cube's
//! transaction log.

use std::sync::Arc;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use cubeline_core::{CancelToken, Verbosity};

mod cmd;
mod config;

use config::Config;

#[derive(Parser)]
#[command(name = "cubeline")]
#[command(about = "Build and feed an OLAP cube from an OData source")]
#[command(version)]
struct Cli {
    #[command(subcommand)]
    command: Command,

    /// Enable debug logging
    #[arg(long, global = true)]
    debug: bool,

    /// Config file path (default: ./cubeline.toml or ~/.config/cubeline/config.toml)
    #[arg(short, long, global = true)]
    config: Option<std::path::PathBuf>,

    /// Records requested per page from the source
    #[arg(long, global = true)]
    page_size: Option<u64>,
}

#[derive(Subcommand)]
enum Command {
    /// Build all dimensions, publish them and create the cube
    Build(cmd::build::BuildArgs),
    /// Load order data into an existing cube
    Load(cmd::load::LoadArgs),
    /// Print cube changes as they are logged
    Watch(cmd::watch::WatchArgs),
    /// Show current configuration
    Config,
}

/// First signal requests a graceful stop, a second one exits immediately.
fn setup_signal_handler(cancel: &CancelToken) -> Result<()> {
    use signal_hook::consts::{SIGINT, SIGTERM};

    for signal in [SIGINT, SIGTERM] {
        signal_hook::flag::register_conditional_shutdown(signal, 130, cancel.flag())
            .context("Failed to register signal handler")?;
        signal_hook::flag::register(signal, cancel.flag())
            .context("Failed to register signal handler")?;
    }
    Ok(())
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    // Progress context (TTY auto-detect)
    let progress = Arc::new(cubeline_core::ProgressContext::new());

    // Logging:
    //   TTY:     quiet (warn) unless --debug; spinners show activity
    //   non-TTY: info unless --debug; logs are the only progress indicator
    let is_tty = progress.is_tty();
    let multi = if is_tty { Some(progress.multi()) } else { None };
    let verbosity = match (cli.debug, is_tty) {
        (true, _) => Verbosity::Debug,
        (false, true) => Verbosity::Quiet,
        (false, false) => Verbosity::Normal,
    };
    cubeline_core::init_logging(verbosity, multi).context("Failed to initialise logging")?;

    let mut config = if let Some(path) = cli.config {
        Config::from_file(&path)?
    } else {
        Config::load()?
    };
    if let Some(page_size) = cli.page_size {
        config.source.page_size = page_size;
    }

    let cancel = CancelToken::new();
    setup_signal_handler(&cancel)?;

    match cli.command {
        Command::Build(args) => cmd::build::run(args, &config, &progress, &cancel),
        Command::Load(args) => cmd::load::run(args, &config, &progress, &cancel),
        Command::Watch(args) => cmd::watch::run(args, &config, &cancel),
        Command::Config => {
            cmd::print_config(&config);
            Ok(())
        }
    }
}

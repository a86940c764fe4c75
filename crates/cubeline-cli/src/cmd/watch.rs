//! Watch subcommand - follow a cube's transaction log

use std::io::Write;

use anyhow::Result;
use clap::Args;

use cubeline_core::{CancelToken, ChangeTracker, TrackOutcome, Transport};
use cubeline_tm1::{decode_entries, entries_query, format_entry};

use crate::config::Config;

#[derive(Args, Debug)]
pub struct WatchArgs {
    /// Cube to watch (default: build.cube from the config)
    #[arg(long)]
    pub cube: Option<String>,

    /// Milliseconds between delta polls
    #[arg(long)]
    pub interval_ms: Option<u64>,
}

/// Print every logged change of `cube` to `out` until cancelled or the
/// server stops offering a delta link. Returns the number of entries seen.
pub fn watch<T: Transport, W: Write>(
    tracker: &ChangeTracker<T>,
    cube: &str,
    out: &mut W,
) -> Result<usize> {
    let mut entries = 0usize;
    let summary = tracker.track::<_, anyhow::Error>(&entries_query(cube).target(), |body| {
        let (page, continuation) = decode_entries(body)?;
        for entry in &page {
            writeln!(out, "{}", format_entry(entry))?;
        }
        entries += page.len();
        Ok(continuation)
    })?;

    match summary.outcome {
        TrackOutcome::Cancelled => log::info!("Stopped watching {cube}"),
        TrackOutcome::Stopped => log::warn!("Server stopped offering changes for {cube}"),
    }
    log::debug!("{} requests, {entries} entries", summary.requests);
    Ok(entries)
}

pub fn run(args: WatchArgs, config: &Config, cancel: &CancelToken) -> Result<()> {
    let cube = args.cube.unwrap_or_else(|| config.build.cube.clone());
    let interval = args
        .interval_ms
        .map(std::time::Duration::from_millis)
        .unwrap_or_else(|| config.watch_interval());

    let session = super::connect_target(config)?;
    log::info!("Watching transaction log of {cube}, Ctrl-C to stop");

    let tracker = ChangeTracker::new(&session, interval, cancel.clone());
    watch(&tracker, &cube, &mut std::io::stdout().lock())?;
    Ok(())
}

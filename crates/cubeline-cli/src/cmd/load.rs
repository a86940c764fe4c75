//! Load subcommand - page order data into an existing cube

use anyhow::{Result, bail};
use clap::Args;

use cubeline_core::{CancelToken, FetchSummary, SharedProgress, Transport, fmt_num};
use cubeline_northwind::{Northwind, SalesCube};
use cubeline_tm1::{Publisher, Target};

use crate::config::Config;

#[derive(Args, Debug)]
pub struct LoadArgs {
    /// Cube to load into (default: build.cube from the config)
    #[arg(long)]
    pub cube: Option<String>,
}

/// Stream every page of orders into `cube`, one update request per page.
///
/// Cancellation is checked between pages; a page already sent stays loaded.
pub fn load_orders<S: Transport, T: Target + ?Sized>(
    source: &Northwind<S>,
    publisher: &Publisher<'_, T>,
    cube: &SalesCube,
    progress: &SharedProgress,
    cancel: &CancelToken,
) -> Result<FetchSummary> {
    let pb = progress.task_line(&cube.name);
    pb.set_message("loading orders...");
    let mut cells = 0usize;
    let result = source.load_orders(cube, &pb, |updates| {
        if cancel.is_cancelled() {
            bail!("interrupted after {} cell updates", fmt_num(cells));
        }
        publisher.update_cells(&cube.name, updates)?;
        cells += updates.len();
        Ok(())
    });
    pb.finish_and_clear();

    let summary = result?;
    log::info!(
        "Loaded {} orders into {} ({} cell updates, {} pages)",
        fmt_num(summary.total as usize),
        cube.name,
        fmt_num(cells),
        summary.pages
    );
    Ok(summary)
}

pub fn run(
    args: LoadArgs,
    config: &Config,
    progress: &SharedProgress,
    cancel: &CancelToken,
) -> Result<()> {
    let mut cube = config.sales_cube();
    if let Some(name) = args.cube {
        cube.name = name;
    }

    let target = super::connect_target(config)?;
    let source_session = super::connect_source(config)?;
    let source = Northwind::new(&source_session, config.source.page_size);

    let summary = load_orders(&source, &Publisher::new(&target), &cube, progress, cancel)?;
    super::print_summary(
        "Load",
        &[
            ("Cube", cube.name.clone()),
            ("Orders", fmt_num(summary.total as usize)),
            ("Pages", summary.pages.to_string()),
        ],
    );
    Ok(())
}

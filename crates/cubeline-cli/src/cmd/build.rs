//! Build subcommand - build dimensions, publish them and create the cube

use anyhow::{Context, Result, bail};
use clap::Args;
use rayon::prelude::*;

use cubeline_core::{CancelToken, Dimension, SharedProgress, Transport, fmt_num};
use cubeline_northwind::{Northwind, SalesCube};
use cubeline_tm1::Publisher;

use crate::config::Config;

#[derive(Args, Debug)]
pub struct BuildArgs {
    /// Load order data once the cube exists
    #[arg(long)]
    pub load: bool,

    /// Skip hierarchy validation before publishing
    #[arg(long)]
    pub no_validate: bool,

    /// Build and validate dimensions without contacting the target server
    #[arg(long)]
    pub dry_run: bool,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Kind {
    Products,
    Customers,
    Employees,
    Time,
    Measures,
}

/// Dimensions in cube order
fn plan(cube: &SalesCube) -> [(Kind, &str); 5] {
    [
        (Kind::Products, cube.products.as_str()),
        (Kind::Customers, cube.customers.as_str()),
        (Kind::Employees, cube.employees.as_str()),
        (Kind::Time, cube.time.as_str()),
        (Kind::Measures, cube.measures.as_str()),
    ]
}

fn build_dimension<T: Transport>(
    source: &Northwind<T>,
    kind: Kind,
    name: &str,
    progress: &SharedProgress,
) -> Result<Dimension> {
    let pb = progress.task_line(name);
    pb.set_message("fetching...");
    let result = match kind {
        Kind::Products => source.products(name, &pb),
        Kind::Customers => source.customers(name, &pb),
        Kind::Employees => source.employees(name, &pb),
        Kind::Time => source.time(name),
        Kind::Measures => Ok(cubeline_northwind::measures(name)),
    };
    pb.finish_and_clear();

    let dimension = result.with_context(|| format!("Failed to build dimension {name}"))?;
    log::info!(
        "Built dimension {name}: {} hierarchies, {} elements",
        dimension.hierarchies().len(),
        fmt_num(element_count(&dimension))
    );
    Ok(dimension)
}

fn element_count(dimension: &Dimension) -> usize {
    dimension.hierarchies().iter().map(|h| h.len()).sum()
}

fn check_cancelled(cancel: &CancelToken) -> Result<()> {
    if cancel.is_cancelled() {
        bail!("interrupted");
    }
    Ok(())
}

pub fn run(
    args: BuildArgs,
    config: &Config,
    progress: &SharedProgress,
    cancel: &CancelToken,
) -> Result<()> {
    let cube = config.sales_cube();

    // Fail on credentials before spending time on the source
    let target = if args.dry_run {
        None
    } else {
        Some(super::connect_target(config)?)
    };

    let source_session = super::connect_source(config)?;
    let source = Northwind::new(&source_session, config.source.page_size);

    let steps = plan(&cube);
    let dimensions: Vec<Dimension> = steps
        .par_iter()
        .map(|&(kind, name)| build_dimension(&source, kind, name, progress))
        .collect::<Result<_>>()?;
    check_cancelled(cancel)?;

    if config.build.validate && !args.no_validate {
        for dimension in &dimensions {
            dimension
                .validate()
                .with_context(|| format!("Dimension {} is not consistent", dimension.name()))?;
        }
        log::info!("All {} dimensions validated", dimensions.len());
    }

    let mut rows: Vec<(&str, String)> = dimensions
        .iter()
        .map(|d| {
            (
                d.name(),
                format!(
                    "{} hierarchies, {} elements",
                    d.hierarchies().len(),
                    fmt_num(element_count(d))
                ),
            )
        })
        .collect();

    let Some(target) = target else {
        super::print_summary("Dimension (dry run)", &rows);
        return Ok(());
    };

    let publisher = Publisher::new(&target);
    for dimension in &dimensions {
        check_cancelled(cancel)?;
        publisher
            .publish_dimension(dimension)
            .with_context(|| format!("Failed to publish dimension {}", dimension.name()))?;
    }

    check_cancelled(cancel)?;
    let rules = Some(config.build.rules.as_str());
    let cube_path = publisher.create_cube(&cube.name, &cube.dimensions(), rules)?;
    rows.push(("Cube", cube_path));

    if args.load {
        let summary = super::load::load_orders(&source, &publisher, &cube, progress, cancel)?;
        rows.push(("Orders", fmt_num(summary.total as usize)));
    }

    super::print_summary("Dimension", &rows);
    Ok(())
}

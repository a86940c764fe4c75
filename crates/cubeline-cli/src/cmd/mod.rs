//! Subcommands

pub mod build;
pub mod load;
pub mod watch;

use anyhow::{Context, Result};
use comfy_table::{Cell, Color, Table, modifiers::UTF8_ROUND_CORNERS, presets::UTF8_FULL};
use cubeline_core::Session;

use crate::config::Config;

/// Open the target session and authenticate with a version probe.
pub fn connect_target(config: &Config) -> Result<Session> {
    let session = Session::open(&config.target_session())
        .with_context(|| format!("Failed to open session to {}", config.target.service_root))?;
    let version = cubeline_tm1::product_version(&session)?;
    log::info!("Using TM1 server version {version}");
    Ok(session)
}

pub fn connect_source(config: &Config) -> Result<Session> {
    Session::open(&config.source_session())
        .with_context(|| format!("Failed to open session to {}", config.source.service_root))
}

fn table(title: &str) -> Table {
    let mut table = Table::new();
    table
        .load_preset(UTF8_FULL)
        .apply_modifier(UTF8_ROUND_CORNERS)
        .set_header(vec![
            Cell::new(title).fg(Color::Cyan),
            Cell::new("Value").fg(Color::Cyan),
        ]);
    table
}

/// Print a key-value summary table on stderr
pub fn print_summary(title: &str, rows: &[(&str, String)]) {
    let mut table = table(title);
    for (label, value) in rows {
        table.add_row(vec![Cell::new(label), Cell::new(value)]);
    }
    eprintln!("\n{table}");
}

pub fn print_config(config: &Config) {
    let cube = config.sales_cube();
    print_summary(
        "Setting",
        &[
            ("Source service", config.source.service_root.clone()),
            ("Page size", config.source.page_size.to_string()),
            ("Target service", config.target.service_root.clone()),
            (
                "Target user",
                config
                    .target
                    .user
                    .clone()
                    .unwrap_or_else(|| "not set".to_string()),
            ),
            (
                "Target password",
                if config.target.password.is_some() {
                    "configured"
                } else {
                    "not set"
                }
                .to_string(),
            ),
            (
                "Accept invalid certs",
                config.target.accept_invalid_certs.to_string(),
            ),
            ("Connect timeout", format!("{}s", config.http.connect_timeout)),
            ("Request timeout", format!("{}s", config.http.request_timeout)),
            ("Cube", cube.name.clone()),
            ("Dimensions", cube.dimensions().join(", ")),
            ("Validate", config.build.validate.to_string()),
            ("Watch interval", format!("{}ms", config.watch.interval_ms)),
        ],
    );
}

//! Binlog drainer binary.
//!
//! Reads captured change events from a JSON file, translates them with the configured SQL
//! dialect and writes every generated statement with its bound parameters to stdout, one JSON
//! object per line. Logs go to stderr.

use std::io::{self, BufWriter, Write};

use anyhow::Context;
use config::load::load_config;
use config::shared::DrainerConfig;
use telemetry::tracing::init_tracing;
use tracing::info;
use translator::registry::TranslatorRegistry;

use crate::drain::drain;
use crate::events::read_events;

mod drain;
mod events;
mod hex;
mod output;

/// Entry point for the drainer.
///
/// Loads and validates configuration, initializes tracing, then drains the events file. Exits
/// with an error when any row could not be translated.
fn main() -> anyhow::Result<()> {
    let drainer_config =
        load_config::<DrainerConfig>().context("failed to load drainer configuration")?;
    drainer_config
        .validate()
        .context("invalid drainer configuration")?;

    let _log_flusher = init_tracing(env!("CARGO_BIN_NAME"))?;

    info!(
        dialect = %drainer_config.translator.dialect,
        events_path = %drainer_config.source.events_path.display(),
        "starting drainer"
    );

    let registry = TranslatorRegistry::with_default_dialects()?;
    // Fail before reading any event when the dialect is not known.
    registry.lookup(&drainer_config.translator.dialect)?;

    let events = read_events(&drainer_config.source.events_path)?;

    let stdout = io::stdout();
    let mut out = BufWriter::new(stdout.lock());
    let summary = drain(&registry, &drainer_config.translator, events, &mut out)?;
    out.flush().context("failed to flush statements")?;

    info!(
        events = summary.events,
        statements = summary.statements,
        failed_rows = summary.failed_rows,
        "drainer completed"
    );

    if summary.failed_rows > 0 {
        anyhow::bail!("{} rows could not be translated", summary.failed_rows);
    }

    Ok(())
}

use std::io::Write;

use anyhow::Context;
use config::shared::TranslatorConfig;
use tracing::{debug, error};
use translator::event::{ChangeEvent, translate_event};
use translator::registry::TranslatorRegistry;

use crate::output::StatementLine;

/// Counters of a drain run.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct DrainSummary {
    /// Events read.
    pub events: usize,
    /// Statements written.
    pub statements: usize,
    /// Rows, or whole events, that could not be translated.
    pub failed_rows: usize,
}

/// Translates `events` in order and writes one JSON line per generated statement to `out`.
///
/// A failing row is logged and skipped, its siblings are still written. A failing event, such as
/// an unparsable schema change, counts every row it carries as failed, and at least one.
pub fn drain<W: Write>(
    registry: &TranslatorRegistry,
    config: &TranslatorConfig,
    events: Vec<ChangeEvent>,
    out: &mut W,
) -> anyhow::Result<DrainSummary> {
    let mut summary = DrainSummary::default();

    for (index, mut event) in events.into_iter().enumerate() {
        summary.events += 1;

        let schema = config.schema_for(&event.schema).to_string();
        event.schema = schema;

        let results = match translate_event(registry, &config.dialect, &event) {
            Ok(results) => results,
            Err(err) => {
                error!(
                    event = index,
                    schema = %event.schema,
                    table = %event.table,
                    operation = %event.kind.operation(),
                    "failed to translate event: {err}"
                );
                summary.failed_rows += event.kind.row_count().max(1);
                continue;
            }
        };

        for (row, result) in results.into_iter().enumerate() {
            match result {
                Ok(mutation) => {
                    let line = StatementLine::from(mutation);
                    serde_json::to_writer(&mut *out, &line).context("failed to write statement")?;
                    writeln!(out).context("failed to write statement")?;
                    summary.statements += 1;
                }
                Err(err) => {
                    error!(
                        event = index,
                        row,
                        schema = %event.schema,
                        table = %event.table,
                        "failed to translate row: {err}"
                    );
                    summary.failed_rows += 1;
                }
            }
        }

        debug!(event = index, ?summary, "drained event");
    }

    Ok(summary)
}

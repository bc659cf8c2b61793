//! Writing hits to stdout.

use std::io::Write;

use serde_json::Value;

use crate::config::OutputFormat;

/// Writes `hits` in `format`. With `source_only`, hits without a `_source` are skipped.
pub fn write_hits<W: Write>(
    out: &mut W,
    hits: &[Value],
    format: OutputFormat,
    source_only: bool,
) -> anyhow::Result<()> {
    let docs: Vec<&Value> = if source_only {
        hits.iter().filter_map(|hit| hit.get("_source")).collect()
    } else {
        hits.iter().collect()
    };

    match format {
        OutputFormat::Ndjson => {
            for doc in docs {
                serde_json::to_writer(&mut *out, doc)?;
                writeln!(out)?;
            }
        }
        OutputFormat::Json => {
            serde_json::to_writer_pretty(&mut *out, &docs)?;
            writeln!(out)?;
        }
    }

    out.flush()?;
    Ok(())
}

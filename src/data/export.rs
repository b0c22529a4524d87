use std::io::Write;
use std::path::Path;

use anyhow::{Context, Result};

use super::model::{DetailTable, PlotSeries};

/// Write the detail table as comma-separated text with a header row.
pub fn write_table_csv<W: Write>(table: &DetailTable, writer: W) -> Result<()> {
    let mut csv_writer = csv::Writer::from_writer(writer);
    csv_writer
        .write_record(&table.columns)
        .context("writing CSV header")?;
    for (i, row) in table.rows.iter().enumerate() {
        csv_writer
            .write_record(row)
            .with_context(|| format!("writing CSV row {i}"))?;
    }
    csv_writer.flush().context("flushing CSV output")?;
    Ok(())
}

/// Write the series (entries, colour channel and titles) as pretty JSON.
pub fn write_series_json<W: Write>(series: &PlotSeries, writer: W) -> Result<()> {
    serde_json::to_writer_pretty(writer, series).context("serialising plot series")
}

pub fn save_table_csv(table: &DetailTable, path: &Path) -> Result<()> {
    let file = std::fs::File::create(path)
        .with_context(|| format!("creating {}", path.display()))?;
    write_table_csv(table, file)?;
    log::info!("Wrote {} rows to {}", table.rows.len(), path.display());
    Ok(())
}

pub fn save_series_json(series: &PlotSeries, path: &Path) -> Result<()> {
    let file = std::fs::File::create(path)
        .with_context(|| format!("creating {}", path.display()))?;
    write_series_json(series, std::io::BufWriter::new(file))?;
    log::info!("Wrote {} series entries to {}", series.len(), path.display());
    Ok(())
}

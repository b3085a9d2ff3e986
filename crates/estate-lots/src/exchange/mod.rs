//! CSV export and import of the lot inventory.

mod rows;

use crate::inventory::{LotId, LotRegistry, LotView};
use rows::{ExportRow, ImportRow, HEADER};
use serde::Serialize;
use std::io::{Read, Write};
use std::path::Path;
use tracing::{info, warn};

#[derive(Debug)]
pub enum ExchangeError {
    Io(std::io::Error),
    Csv(csv::Error),
}

impl std::fmt::Display for ExchangeError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ExchangeError::Io(err) => write!(f, "failed to access lot CSV file: {}", err),
            ExchangeError::Csv(err) => write!(f, "invalid lot CSV data: {}", err),
        }
    }
}

impl std::error::Error for ExchangeError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            ExchangeError::Io(err) => Some(err),
            ExchangeError::Csv(err) => Some(err),
        }
    }
}

impl From<std::io::Error> for ExchangeError {
    fn from(err: std::io::Error) -> Self {
        Self::Io(err)
    }
}

impl From<csv::Error> for ExchangeError {
    fn from(err: csv::Error) -> Self {
        Self::Csv(err)
    }
}

/// Outcome of an import. Rows that could not be applied are listed as `line N: reason`.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct ImportSummary {
    pub imported: usize,
    pub errors: Vec<String>,
}

pub struct LotCsvExporter;

impl LotCsvExporter {
    pub fn to_path<P: AsRef<Path>>(path: P, lots: &[LotView]) -> Result<usize, ExchangeError> {
        let file = std::fs::File::create(path.as_ref())?;
        let written = Self::to_writer(file, lots)?;
        info!(path = %path.as_ref().display(), lots = written, "lots exported to CSV");
        Ok(written)
    }

    /// Writes the header and one row per lot with its effective price and status.
    pub fn to_writer<W: Write>(writer: W, lots: &[LotView]) -> Result<usize, ExchangeError> {
        let mut csv_writer = csv::WriterBuilder::new()
            .has_headers(false)
            .from_writer(writer);
        csv_writer.write_record(HEADER)?;
        for view in lots {
            csv_writer.serialize(ExportRow::from_view(view))?;
        }
        csv_writer.flush()?;
        Ok(lots.len())
    }
}

pub struct LotCsvImporter;

impl LotCsvImporter {
    pub fn from_path<P: AsRef<Path>>(
        path: P,
        registry: &LotRegistry,
    ) -> Result<ImportSummary, ExchangeError> {
        let file = std::fs::File::open(path.as_ref())?;
        let summary = Self::from_reader(file, registry)?;
        info!(
            path = %path.as_ref().display(),
            imported = summary.imported,
            rejected = summary.errors.len(),
            "lots imported from CSV"
        );
        Ok(summary)
    }

    /// Adds every valid row to `registry`. Malformed or conflicting rows are recorded in
    /// the summary; only unreadable input aborts the import.
    pub fn from_reader<R: Read>(
        reader: R,
        registry: &LotRegistry,
    ) -> Result<ImportSummary, ExchangeError> {
        let mut csv_reader = csv::ReaderBuilder::new()
            .trim(csv::Trim::All)
            .from_reader(reader);
        csv_reader.headers()?;

        let mut summary = ImportSummary::default();
        for (index, record) in csv_reader.deserialize::<ImportRow>().enumerate() {
            let line = index + 2;
            let outcome = match record {
                Ok(row) => apply_row(&row, registry),
                Err(err) if err.is_io_error() => return Err(err.into()),
                Err(err) => Err(err.to_string()),
            };

            match outcome {
                Ok(()) => summary.imported += 1,
                Err(reason) => {
                    warn!(line, %reason, "lot CSV row rejected");
                    summary.errors.push(format!("line {line}: {reason}"));
                }
            }
        }

        Ok(summary)
    }
}

fn apply_row(row: &ImportRow, registry: &LotRegistry) -> Result<(), String> {
    let status = row.status().map_err(|err| err.to_string())?;
    let features = row.features().map_err(|err| err.to_string())?;

    if let Some(id) = row.id.as_deref() {
        let canonical = LotId::new(row.block, row.lot_number);
        if id != canonical.as_str() {
            warn!(listed = id, %canonical, "CSV lot id does not match block and lot number");
        }
    }

    let view = registry
        .add_lot(row.block, row.lot_number, row.size, row.base_price(&features))
        .map_err(|err| err.to_string())?;
    let id = view.id().as_str();

    for feature in features {
        registry.attach_feature(id, feature).map_err(|err| err.to_string())?;
    }
    registry.transition(id, status).map_err(|err| err.to_string())?;
    Ok(())
}

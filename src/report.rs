//! Semicolon-delimited report assembly.

use std::fs::File;
use std::io::Write;
use std::path::Path;

use tracing::info;

use crate::aggregate::ActivitySummary;
use crate::columns::ColumnRegistry;
use crate::model::Trap;
use crate::store::TrapStore;

/// Field separator of the output table.
pub const DELIMITER: &str = ";";

/// The seven fixed metadata column labels, kept verbatim from the historical
/// report format.
pub const METADATA_LABELS: [&str; 7] = [
    "Lokalita",
    "ID lokality",
    "Oblast",
    "GPS - šířka",
    "GPS - délka",
    "Model fotopasti",
    "Správce",
];

/// Assembles the output table from aggregated counts and the column registry.
///
/// Fields are written verbatim: the format has no quoting or escaping, so a
/// delimiter inside a metadata field passes through as-is.
pub struct ReportFormatter<'a> {
    columns: &'a ColumnRegistry,
}

impl<'a> ReportFormatter<'a> {
    pub fn new(columns: &'a ColumnRegistry) -> Self {
        Self { columns }
    }

    /// Header row: the seven metadata labels plus one `"{season} {year}"`
    /// label per registry pair, in registry order.
    pub fn header(&self) -> String {
        let mut fields: Vec<String> = METADATA_LABELS.iter().map(|l| l.to_string()).collect();
        fields.extend(
            self.columns
                .pairs()
                .map(|(year, season)| format!("{season} {year}")),
        );
        fields.join(DELIMITER)
    }

    /// One row per trap: the seven metadata fields, then the active-day count
    /// for each registry pair in header order. A pair absent from the trap's
    /// tally formats as 0; the aggregator's zero-bucket step keeps that from
    /// happening for any classified date.
    pub fn row(&self, trap: &Trap, summary: &ActivitySummary) -> String {
        let m = &trap.metadata;
        let mut fields = vec![
            m.name.clone(),
            m.id.clone(),
            m.location.clone(),
            m.gps_lat.clone(),
            m.gps_lon.clone(),
            m.model.clone(),
            m.admin.clone(),
        ];
        let tally = summary.tally(&m.id);
        for (year, season) in self.columns.pairs() {
            let count = tally.and_then(|t| t.get(year, season)).unwrap_or(0);
            fields.push(count.to_string());
        }
        fields.join(DELIMITER)
    }

    /// Full table: header plus one line per trap in store order, each line
    /// newline-terminated.
    pub fn format(&self, store: &TrapStore, summary: &ActivitySummary) -> String {
        let mut out = self.header();
        out.push('\n');
        for trap in store.iter() {
            out.push_str(&self.row(trap, summary));
            out.push('\n');
        }
        out
    }

    /// Write the table to `path`. The file handle lives only for the duration
    /// of this write.
    pub fn write_to(
        &self,
        path: impl AsRef<Path>,
        store: &TrapStore,
        summary: &ActivitySummary,
    ) -> std::io::Result<()> {
        let table = self.format(store, summary);
        let mut file = File::create(&path)?;
        file.write_all(table.as_bytes())?;
        info!(
            "Wrote report with {} trap rows to {}",
            store.len(),
            path.as_ref().display()
        );
        Ok(())
    }
}

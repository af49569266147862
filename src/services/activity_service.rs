use std::path::Path;

use tracing::{debug, info};

use crate::aggregate::{aggregate, ActivitySummary};
use crate::calendar::SeasonCalendar;
use crate::columns::ColumnRegistry;
use crate::config::{ConfigError, SeasonConfig};
use crate::importers::{ExcelImporter, ImportError, ParsedSheet};
use crate::report::ReportFormatter;
use crate::store::TrapStore;

/// Error types for a trap activity run
#[derive(Debug, thiserror::Error)]
pub enum ActivityError {
    #[error("Season config error: {0}")]
    Config(#[from] ConfigError),

    #[error("Source import failed: {0}")]
    Import(#[from] ImportError),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

/// Orchestrates a trap activity run.
///
/// The flow is: load each source workbook (sequentially), `finish_loading`
/// once, `aggregate`, then format or write the report. The first error aborts
/// the run; there is no partial-success mode.
pub struct ActivityService {
    calendar: SeasonCalendar,
    store: TrapStore,
    columns: ColumnRegistry,
}

impl ActivityService {
    pub fn new(calendar: SeasonCalendar) -> Self {
        Self {
            calendar,
            store: TrapStore::new(),
            columns: ColumnRegistry::new(),
        }
    }

    pub fn from_config_file(path: impl AsRef<Path>) -> Result<Self, ActivityError> {
        let config = SeasonConfig::from_file(path)?;
        Ok(Self::new(config.into_calendar()))
    }

    /// Load one workbook, merging its traps into the store and extending the
    /// date universe and the report column layout.
    pub fn load_file(&mut self, path: impl AsRef<Path>) -> Result<(), ImportError> {
        let importer = ExcelImporter::new(path.as_ref().to_string_lossy());
        for sheet in importer.parse_all_sheets()? {
            self.load_sheet(&sheet);
        }
        Ok(())
    }

    /// Merge one parsed sheet.
    ///
    /// Newly-discovered dates are classified right away so the column
    /// registry's first-seen order matches discovery order across loads.
    pub fn load_sheet(&mut self, sheet: &ParsedSheet) {
        for date in self.store.record_dates(&sheet.dates) {
            match self.calendar.season_for(date) {
                Some(season) => {
                    let season_year = self.calendar.season_year_for(date);
                    self.columns.observe(season_year, season);
                }
                // Outside every season: the date will not be aggregated
                None => debug!("Date {} matches no season", date),
            }
        }

        for row in &sheet.rows {
            self.store
                .upsert(row.metadata.clone(), row.entries(&sheet.dates));
        }

        info!(
            "Loaded sheet '{}': {} trap rows, {} dates",
            sheet.name,
            sheet.rows.len(),
            sheet.dates.len()
        );
    }

    /// Complete loading: give every trap an entry (default 0) for every known
    /// date. Call once after the last source, before aggregation.
    pub fn finish_loading(&mut self) {
        self.store.fill_missing();
        info!(
            "Filled activity gaps: {} traps x {} dates",
            self.store.len(),
            self.store.dates().len()
        );
    }

    /// Recompute season tallies from the current store contents. Returns a
    /// fresh summary; loading more data afterwards requires another call.
    pub fn aggregate(&self) -> ActivitySummary {
        aggregate(&self.calendar, &self.store)
    }

    pub fn format_report(&self, summary: &ActivitySummary) -> String {
        ReportFormatter::new(&self.columns).format(&self.store, summary)
    }

    pub fn write_report(
        &self,
        path: impl AsRef<Path>,
        summary: &ActivitySummary,
    ) -> Result<(), ActivityError> {
        ReportFormatter::new(&self.columns).write_to(path, &self.store, summary)?;
        Ok(())
    }

    pub fn store(&self) -> &TrapStore {
        &self.store
    }

    pub fn calendar(&self) -> &SeasonCalendar {
        &self.calendar
    }

    pub fn columns(&self) -> &ColumnRegistry {
        &self.columns
    }
}

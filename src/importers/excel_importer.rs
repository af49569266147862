use calamine::{open_workbook, Data, Range, Reader, Xlsx};
use chrono::NaiveDate;
use std::fs::File;
use std::io::BufReader;
use thiserror::Error;
use tracing::{debug, info, warn};

use crate::model::TrapMetadata;

/// Number of fixed metadata columns before the date columns begin.
pub const METADATA_COLUMNS: usize = 7;

#[derive(Error, Debug)]
pub enum ImportError {
    #[error("Failed to open workbook: {0}")]
    WorkbookOpen(String),

    #[error("Sheet not found: {0}")]
    SheetNotFound(String),

    #[error("Sheet '{sheet}': header cell in column {col} is not a DD.MM.YYYY date: {value}")]
    InvalidDate {
        sheet: String,
        col: usize,
        value: String,
    },

    #[error("Sheet '{sheet}': row {row} is shorter than the {expected} fixed metadata columns")]
    ShortRow {
        sheet: String,
        row: usize,
        expected: usize,
    },
}

/// One parsed worksheet: the date header plus one row per trap.
#[derive(Debug, Clone)]
pub struct ParsedSheet {
    pub name: String,
    pub dates: Vec<NaiveDate>,
    pub rows: Vec<TrapRow>,
}

/// One trap row; `states` is positionally aligned with the sheet's dates.
#[derive(Debug, Clone)]
pub struct TrapRow {
    pub metadata: TrapMetadata,
    pub states: Vec<u8>,
}

impl TrapRow {
    /// Pair the states with the sheet's date header.
    pub fn entries<'a>(
        &'a self,
        dates: &'a [NaiveDate],
    ) -> impl Iterator<Item = (NaiveDate, u8)> + 'a {
        dates.iter().copied().zip(self.states.iter().copied())
    }
}

/// Parser for trap activity workbooks.
///
/// # Expected Sheet Structure:
/// ```text
/// Row 1: seven metadata labels | DD.MM.YYYY | DD.MM.YYYY | ...
/// Row 2+: name | id | location | GPS lat | GPS lon | model | admin | 0/1 per date
/// ```
pub struct ExcelImporter {
    workbook_path: String,
}

impl ExcelImporter {
    pub fn new(workbook_path: impl Into<String>) -> Self {
        Self {
            workbook_path: workbook_path.into(),
        }
    }

    /// Parse every sheet in the workbook. Each sheet carries its own date
    /// header row; empty sheets are skipped.
    pub fn parse_all_sheets(&self) -> Result<Vec<ParsedSheet>, ImportError> {
        info!("Parsing workbook: {}", self.workbook_path);

        // Open workbook (synchronous; one handle for the whole read)
        let mut workbook: Xlsx<BufReader<File>> = match open_workbook(&self.workbook_path) {
            Ok(wb) => wb,
            Err(e) => return Err(ImportError::WorkbookOpen(e.to_string())),
        };

        let sheet_names = workbook.sheet_names().to_owned();
        debug!("Found {} sheets", sheet_names.len());

        let mut sheets = Vec::new();
        for sheet_name in sheet_names {
            let range = match workbook.worksheet_range(&sheet_name) {
                Ok(range) => range,
                Err(_) => return Err(ImportError::SheetNotFound(sheet_name)),
            };

            match parse_sheet(&sheet_name, &range)? {
                Some(sheet) => {
                    info!(
                        "Parsed sheet '{}': {} dates, {} trap rows",
                        sheet.name,
                        sheet.dates.len(),
                        sheet.rows.len()
                    );
                    sheets.push(sheet);
                }
                None => warn!("Sheet '{}' is empty, skipping", sheet_name),
            }
        }

        Ok(sheets)
    }
}

/// Parse a single worksheet range. Returns `None` for a sheet with no cells.
///
/// Kept separate from the file handling so tests can drive it with synthetic
/// ranges.
pub fn parse_sheet(
    sheet_name: &str,
    range: &Range<Data>,
) -> Result<Option<ParsedSheet>, ImportError> {
    let (row_count, col_count) = range.get_size();
    if row_count == 0 {
        return Ok(None);
    }

    // Header row: date cells start after the fixed metadata columns and run
    // until the first empty cell
    let mut dates = Vec::new();
    for col in METADATA_COLUMNS..col_count {
        match range.get((0, col)) {
            Some(Data::String(s)) if !s.trim().is_empty() => {
                let date = NaiveDate::parse_from_str(s.trim(), "%d.%m.%Y").map_err(|_| {
                    ImportError::InvalidDate {
                        sheet: sheet_name.to_string(),
                        col,
                        value: s.clone(),
                    }
                })?;
                dates.push(date);
            }
            Some(Data::Empty) | Some(Data::String(_)) | None => break,
            Some(other) => {
                return Err(ImportError::InvalidDate {
                    sheet: sheet_name.to_string(),
                    col,
                    value: format!("{other:?}"),
                })
            }
        }
    }

    let mut rows = Vec::new();
    for row_idx in 1..row_count {
        let width = occupied_width(range, row_idx, col_count);
        if width == 0 {
            debug!("Skipping blank row {} in sheet '{}'", row_idx, sheet_name);
            continue;
        }
        if width < METADATA_COLUMNS {
            return Err(ImportError::ShortRow {
                sheet: sheet_name.to_string(),
                row: row_idx,
                expected: METADATA_COLUMNS,
            });
        }

        let metadata = TrapMetadata {
            name: cell_string(range, row_idx, 0),
            id: cell_string(range, row_idx, 1),
            location: cell_string(range, row_idx, 2),
            gps_lat: cell_string(range, row_idx, 3),
            gps_lon: cell_string(range, row_idx, 4),
            model: cell_string(range, row_idx, 5),
            admin: cell_string(range, row_idx, 6),
        };
        if metadata.id.is_empty() {
            warn!(
                "Row {} in sheet '{}' has no trap id, skipping",
                row_idx, sheet_name
            );
            continue;
        }

        let states = (0..dates.len())
            .map(|n| activation_state(range.get((row_idx, METADATA_COLUMNS + n))))
            .collect();
        rows.push(TrapRow { metadata, states });
    }

    Ok(Some(ParsedSheet {
        name: sheet_name.to_string(),
        dates,
        rows,
    }))
}

/// Index one past the last non-empty cell of a row.
fn occupied_width(range: &Range<Data>, row: usize, col_count: usize) -> usize {
    (0..col_count)
        .rev()
        .find(|&col| !matches!(range.get((row, col)), Some(Data::Empty) | None))
        .map_or(0, |col| col + 1)
}

/// Render a metadata cell to its raw string form. Whole floats lose the
/// trailing ".0" (Excel often types ids and GPS values as numbers).
fn cell_string(range: &Range<Data>, row: usize, col: usize) -> String {
    match range.get((row, col)) {
        Some(Data::Empty) | None => String::new(),
        Some(Data::Float(f)) if f.fract() == 0.0 => format!("{f:.0}"),
        Some(data) => data.to_string().trim().to_string(),
    }
}

/// Lenient activation cell parsing: 1 in any numeric or string form counts as
/// active; everything else (0, blanks, junk) counts as inactive.
fn activation_state(cell: Option<&Data>) -> u8 {
    match cell {
        Some(Data::Int(1)) => 1,
        Some(Data::Float(f)) if *f == 1.0 => 1,
        Some(Data::String(s)) if s.trim() == "1" => 1,
        Some(Data::Bool(true)) => 1,
        _ => 0,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sheet_range() -> Range<Data> {
        let mut range = Range::new((0, 0), (2, 8));
        // Header: metadata labels are ignored, dates start at column 7
        range.set_value((0, 0), Data::String("Lokalita".into()));
        range.set_value((0, 7), Data::String("10.04.2023".into()));
        range.set_value((0, 8), Data::String("11.04.2023".into()));
        // Trap row
        range.set_value((1, 0), Data::String("U potoka".into()));
        range.set_value((1, 1), Data::String("T1".into()));
        range.set_value((1, 2), Data::String("Sumava".into()));
        range.set_value((1, 3), Data::Float(49.0175));
        range.set_value((1, 4), Data::Float(13.5));
        range.set_value((1, 5), Data::String("BG-310".into()));
        range.set_value((1, 6), Data::String("J. Novak".into()));
        range.set_value((1, 7), Data::Int(1));
        range.set_value((1, 8), Data::String("0".into()));
        range
    }

    #[test]
    fn parses_header_dates_and_trap_rows() {
        let range = sheet_range();
        let sheet = parse_sheet("list1", &range).unwrap().unwrap();

        assert_eq!(
            sheet.dates,
            vec![
                NaiveDate::from_ymd_opt(2023, 4, 10).unwrap(),
                NaiveDate::from_ymd_opt(2023, 4, 11).unwrap(),
            ]
        );
        assert_eq!(sheet.rows.len(), 1);
        let row = &sheet.rows[0];
        assert_eq!(row.metadata.id, "T1");
        assert_eq!(row.metadata.gps_lat, "49.0175");
        assert_eq!(row.metadata.gps_lon, "13.5");
        assert_eq!(row.states, vec![1, 0]);
    }

    #[test]
    fn rejects_unparseable_header_date() {
        let mut range = sheet_range();
        range.set_value((0, 8), Data::String("2023-04-11".into()));

        match parse_sheet("list1", &range) {
            Err(ImportError::InvalidDate { col, value, .. }) => {
                assert_eq!(col, 8);
                assert_eq!(value, "2023-04-11");
            }
            other => panic!("Expected InvalidDate, got {other:?}"),
        }
    }

    #[test]
    fn rejects_row_shorter_than_metadata_prefix() {
        let mut range = Range::new((0, 0), (1, 8));
        range.set_value((0, 7), Data::String("10.04.2023".into()));
        range.set_value((1, 0), Data::String("U potoka".into()));
        range.set_value((1, 1), Data::String("T1".into()));

        match parse_sheet("list1", &range) {
            Err(ImportError::ShortRow { row, expected, .. }) => {
                assert_eq!(row, 1);
                assert_eq!(expected, METADATA_COLUMNS);
            }
            other => panic!("Expected ShortRow, got {other:?}"),
        }
    }

    #[test]
    fn skips_blank_rows_and_rows_without_id() {
        let mut range = sheet_range();
        // Row 2 has metadata but an empty id cell
        range.set_value((2, 0), Data::String("Bez id".into()));
        range.set_value((2, 2), Data::String("Sumava".into()));
        range.set_value((2, 3), Data::Float(49.0));
        range.set_value((2, 4), Data::Float(13.0));
        range.set_value((2, 5), Data::String("BG-310".into()));
        range.set_value((2, 6), Data::String("J. Novak".into()));

        let sheet = parse_sheet("list1", &range).unwrap().unwrap();
        assert_eq!(sheet.rows.len(), 1);
    }

    #[test]
    fn activation_parsing_is_lenient() {
        assert_eq!(activation_state(Some(&Data::Int(1))), 1);
        assert_eq!(activation_state(Some(&Data::Float(1.0))), 1);
        assert_eq!(activation_state(Some(&Data::String("1".into()))), 1);
        assert_eq!(activation_state(Some(&Data::Int(0))), 0);
        assert_eq!(activation_state(Some(&Data::String("x".into()))), 0);
        assert_eq!(activation_state(Some(&Data::Empty)), 0);
        assert_eq!(activation_state(None), 0);
    }
}

use std::collections::HashMap;

use chrono::NaiveDate;
use serde::Serialize;

/// Trap metadata, read verbatim from the seven leading columns of a source row.
///
/// GPS coordinates are carried as raw strings, never parsed; the report echoes
/// them unmodified.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TrapMetadata {
    pub name: String,
    pub id: String,
    pub location: String,
    pub gps_lat: String,
    pub gps_lon: String,
    pub model: String,
    pub admin: String,
}

/// A camera-trap site with its per-day activation record (0 or 1 per date).
///
/// `dates` is the append-only discovery order of the entry keys; `states` is
/// the lookup map. Both are kept in sync through [`Trap::set`].
#[derive(Debug, Clone)]
pub struct Trap {
    pub metadata: TrapMetadata,
    dates: Vec<NaiveDate>,
    states: HashMap<NaiveDate, u8>,
}

impl Trap {
    pub fn new(metadata: TrapMetadata) -> Self {
        Self {
            metadata,
            dates: Vec::new(),
            states: HashMap::new(),
        }
    }

    /// Insert or overwrite the state for `date`. First sighting of a date
    /// appends it to the iteration order; overwrites keep the original slot.
    pub fn set(&mut self, date: NaiveDate, state: u8) {
        if self.states.insert(date, state).is_none() {
            self.dates.push(date);
        }
    }

    pub fn state(&self, date: NaiveDate) -> Option<u8> {
        self.states.get(&date).copied()
    }

    pub fn contains(&self, date: NaiveDate) -> bool {
        self.states.contains_key(&date)
    }

    /// Entries in insertion order (discovery order across loads).
    pub fn entries(&self) -> impl Iterator<Item = (NaiveDate, u8)> + '_ {
        self.dates.iter().map(|d| (*d, self.states[d]))
    }

    pub fn entry_count(&self) -> usize {
        self.dates.len()
    }
}

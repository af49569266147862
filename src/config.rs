//! Season configuration loading.
//!
//! Seasons are defined in a JSON file:
//!
//! ```json
//! {
//!   "anchor": "pre-mating",
//!   "seasons": {
//!     "mating":     { "start": "03-01", "end": "05-31" },
//!     "pre-mating": { "start": "11-01", "end": "02-28" }
//!   }
//! }
//! ```
//!
//! Key order of `"seasons"` is the calendar application order. `"anchor"` names
//! the season whose start marks the season-year rollover.

use std::fs::File;
use std::io::{BufReader, Read};
use std::path::Path;

use regex::Regex;
use serde::Deserialize;
use serde_json::Value as JsonValue;
use tracing::info;

use crate::calendar::{MonthDay, Season, SeasonCalendar};

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Failed to read season config: {0}")]
    Io(#[from] std::io::Error),

    #[error("Failed to parse season config: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Season config defines no seasons")]
    NoSeasons,

    #[error("Season '{season}' has invalid {field} '{value}', expected MM-DD")]
    InvalidMonthDay {
        season: String,
        field: &'static str,
        value: String,
    },

    #[error("Anchor season '{0}' is not among the defined seasons")]
    UnknownAnchor(String),
}

/// Raw file shape. Season bodies stay as JSON values so the map keeps the
/// file's key order (serde_json `preserve_order`).
#[derive(Debug, Deserialize)]
struct SeasonsFile {
    anchor: String,
    seasons: serde_json::Map<String, JsonValue>,
}

#[derive(Debug, Deserialize)]
struct SeasonDefRaw {
    start: String,
    end: String,
}

/// Validated season configuration, ready to become a [`SeasonCalendar`].
#[derive(Debug, Clone)]
pub struct SeasonConfig {
    pub seasons: Vec<Season>,
    pub anchor: String,
    anchor_start: MonthDay,
}

impl SeasonConfig {
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let file = File::open(path)?;
        Self::from_reader(BufReader::new(file))
    }

    pub fn from_reader(reader: impl Read) -> Result<Self, ConfigError> {
        let raw: SeasonsFile = serde_json::from_reader(reader)?;

        if raw.seasons.is_empty() {
            return Err(ConfigError::NoSeasons);
        }

        let mut seasons = Vec::with_capacity(raw.seasons.len());
        for (name, body) in &raw.seasons {
            let def: SeasonDefRaw = serde_json::from_value(body.clone())?;
            let start =
                parse_month_day(&def.start).ok_or_else(|| ConfigError::InvalidMonthDay {
                    season: name.clone(),
                    field: "start",
                    value: def.start.clone(),
                })?;
            let end = parse_month_day(&def.end).ok_or_else(|| ConfigError::InvalidMonthDay {
                season: name.clone(),
                field: "end",
                value: def.end.clone(),
            })?;
            seasons.push(Season {
                name: name.clone(),
                start,
                end,
            });
        }

        let anchor_start = seasons
            .iter()
            .find(|s| s.name == raw.anchor)
            .map(|s| s.start)
            .ok_or_else(|| ConfigError::UnknownAnchor(raw.anchor.clone()))?;

        info!(
            "Loaded {} season definitions (anchor: {})",
            seasons.len(),
            raw.anchor
        );

        Ok(Self {
            seasons,
            anchor: raw.anchor,
            anchor_start,
        })
    }

    pub fn into_calendar(self) -> SeasonCalendar {
        SeasonCalendar::new(self.seasons, self.anchor_start)
    }
}

/// Parse an `MM-DD` field (e.g. "03-01").
fn parse_month_day(value: &str) -> Option<MonthDay> {
    let re = Regex::new(r"^(\d{2})-(\d{2})$").ok()?;
    let caps = re.captures(value.trim())?;
    let month: u32 = caps[1].parse().ok()?;
    let day: u32 = caps[2].parse().ok()?;
    if !(1..=12).contains(&month) || !(1..=31).contains(&day) {
        return None;
    }
    Some(MonthDay::new(month, day))
}

#![allow(dead_code)]

use chrono::NaiveDate;
use trap_activity_tracker::calendar::SeasonCalendar;
use trap_activity_tracker::config::SeasonConfig;
use trap_activity_tracker::importers::{ParsedSheet, TrapRow};
use trap_activity_tracker::model::TrapMetadata;

pub const SEASONS: &str = r#"{
    "anchor": "pre-mating",
    "seasons": {
        "mating":     { "start": "03-01", "end": "05-31" },
        "pre-mating": { "start": "11-01", "end": "02-28" }
    }
}"#;

/// The standard two-season calendar used across the test suite: a plain
/// spring season and a year-wrapping anchor season.
pub fn calendar() -> SeasonCalendar {
    SeasonConfig::from_reader(SEASONS.as_bytes())
        .unwrap()
        .into_calendar()
}

pub fn d(y: i32, m: u32, day: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(y, m, day).unwrap()
}

pub fn metadata(id: &str, name: &str) -> TrapMetadata {
    TrapMetadata {
        name: name.to_string(),
        id: id.to_string(),
        location: "Sumava".into(),
        gps_lat: "49.0".into(),
        gps_lon: "13.5".into(),
        model: "BG-310".into(),
        admin: "J. Novak".into(),
    }
}

pub fn sheet(name: &str, dates: Vec<NaiveDate>, rows: Vec<TrapRow>) -> ParsedSheet {
    ParsedSheet {
        name: name.to_string(),
        dates,
        rows,
    }
}

pub fn row(id: &str, states: Vec<u8>) -> TrapRow {
    TrapRow {
        metadata: metadata(id, id),
        states,
    }
}

//! Per-season active-day aggregation.

use std::collections::hash_map::Entry;
use std::collections::HashMap;

use tracing::debug;

use crate::calendar::SeasonCalendar;
use crate::store::TrapStore;

/// Active-day counts for one trap, bucketed by (season-year, season).
///
/// A bucket exists for every season any of the trap's dates touched, all-zero
/// ones included, so the trap reports 0 rather than a missing value where
/// another trap has data. Bucket order is first-observed season year, then
/// first-observed season within it.
#[derive(Debug, Clone, Default)]
pub struct SeasonTally {
    years: Vec<i32>,
    by_year: HashMap<i32, YearTally>,
}

#[derive(Debug, Clone, Default)]
struct YearTally {
    seasons: Vec<String>,
    counts: HashMap<String, u32>,
}

impl SeasonTally {
    fn bucket(&mut self, season_year: i32, season: &str) -> &mut u32 {
        let year = match self.by_year.entry(season_year) {
            Entry::Occupied(occupied) => occupied.into_mut(),
            Entry::Vacant(vacant) => {
                self.years.push(season_year);
                vacant.insert(YearTally::default())
            }
        };
        if !year.counts.contains_key(season) {
            year.seasons.push(season.to_string());
        }
        year.counts.entry(season.to_string()).or_insert(0)
    }

    pub fn get(&self, season_year: i32, season: &str) -> Option<u32> {
        self.by_year.get(&season_year)?.counts.get(season).copied()
    }

    /// Buckets in first-seen order.
    pub fn buckets(&self) -> impl Iterator<Item = (i32, &str, u32)> + '_ {
        self.years.iter().flat_map(move |year| {
            let tally = &self.by_year[year];
            tally
                .seasons
                .iter()
                .map(move |season| (*year, season.as_str(), tally.counts[season]))
        })
    }

    pub fn is_empty(&self) -> bool {
        self.years.is_empty()
    }
}

/// Aggregation result: one tally per trap id.
///
/// Built fresh by each [`aggregate`] call instead of being attached to the
/// traps, so stale counts cannot survive a later load.
#[derive(Debug, Clone, Default)]
pub struct ActivitySummary {
    tallies: HashMap<String, SeasonTally>,
}

impl ActivitySummary {
    pub fn tally(&self, trap_id: &str) -> Option<&SeasonTally> {
        self.tallies.get(trap_id)
    }

    pub fn len(&self) -> usize {
        self.tallies.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tallies.is_empty()
    }
}

/// Count active days per (season-year, season) for every trap in the store.
///
/// Walks each trap's entries in discovery order. Dates matching no season are
/// skipped and contribute to no aggregate (named policy, not an error). Every
/// classified date ensures its bucket exists regardless of state; only state 1
/// increments the count.
pub fn aggregate(calendar: &SeasonCalendar, store: &TrapStore) -> ActivitySummary {
    let mut summary = ActivitySummary::default();

    for trap in store.iter() {
        let tally = summary.tallies.entry(trap.metadata.id.clone()).or_default();
        for (date, state) in trap.entries() {
            let season = match calendar.season_for(date) {
                Some(s) => s,
                // Outside every season: excluded from aggregation
                None => continue,
            };
            let season_year = calendar.season_year_for(date);
            let bucket = tally.bucket(season_year, season);
            if state == 1 {
                *bucket += 1;
            }
        }
    }

    debug!("Aggregated season tallies for {} traps", store.len());
    summary
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::calendar::{MonthDay, Season};
    use crate::model::TrapMetadata;
    use chrono::NaiveDate;

    fn calendar() -> SeasonCalendar {
        SeasonCalendar::new(
            vec![
                Season {
                    name: "mating".into(),
                    start: MonthDay::new(3, 1),
                    end: MonthDay::new(5, 31),
                },
                Season {
                    name: "pre-mating".into(),
                    start: MonthDay::new(11, 1),
                    end: MonthDay::new(2, 28),
                },
            ],
            MonthDay::new(11, 1),
        )
    }

    fn metadata(id: &str) -> TrapMetadata {
        TrapMetadata {
            name: id.to_string(),
            id: id.to_string(),
            location: String::new(),
            gps_lat: String::new(),
            gps_lon: String::new(),
            model: String::new(),
            admin: String::new(),
        }
    }

    fn d(y: i32, m: u32, day: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, day).unwrap()
    }

    #[test]
    fn counts_only_active_days_but_creates_zero_buckets() {
        let mut store = TrapStore::new();
        store.upsert(
            metadata("T1"),
            vec![
                (d(2023, 4, 10), 1),
                (d(2023, 4, 11), 0),
                (d(2023, 4, 12), 1),
            ],
        );

        let summary = aggregate(&calendar(), &store);
        let tally = summary.tally("T1").unwrap();
        assert_eq!(tally.get(2023, "mating"), Some(2));

        // All-zero season still gets a bucket
        let mut store = TrapStore::new();
        store.upsert(metadata("T2"), vec![(d(2023, 4, 10), 0)]);
        let summary = aggregate(&calendar(), &store);
        assert_eq!(summary.tally("T2").unwrap().get(2023, "mating"), Some(0));
    }

    #[test]
    fn dates_outside_all_seasons_are_excluded() {
        let mut store = TrapStore::new();
        store.upsert(metadata("T1"), vec![(d(2023, 7, 1), 1)]);

        let summary = aggregate(&calendar(), &store);
        assert!(summary.tally("T1").unwrap().is_empty());
    }

    #[test]
    fn wrapping_season_splits_by_season_year() {
        let mut store = TrapStore::new();
        store.upsert(
            metadata("T1"),
            vec![(d(2023, 1, 15), 1), (d(2023, 12, 15), 1)],
        );

        let summary = aggregate(&calendar(), &store);
        let tally = summary.tally("T1").unwrap();
        // Jan 15 belongs to the 2023 cycle, Dec 15 to the 2024 cycle
        assert_eq!(tally.get(2023, "pre-mating"), Some(1));
        assert_eq!(tally.get(2024, "pre-mating"), Some(1));
    }

    #[test]
    fn rerun_reflects_later_loads() {
        let mut store = TrapStore::new();
        store.upsert(metadata("T1"), vec![(d(2023, 4, 10), 0)]);
        let before = aggregate(&calendar(), &store);
        assert_eq!(before.tally("T1").unwrap().get(2023, "mating"), Some(0));

        store.upsert(metadata("T1"), vec![(d(2023, 4, 10), 1)]);
        let after = aggregate(&calendar(), &store);
        assert_eq!(after.tally("T1").unwrap().get(2023, "mating"), Some(1));
        // The earlier summary is an independent value, untouched by the re-run
        assert_eq!(before.tally("T1").unwrap().get(2023, "mating"), Some(0));
    }
}

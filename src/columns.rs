use std::collections::hash_map::Entry;
use std::collections::HashMap;

/// First-seen ordering of (season-year, season) report columns.
///
/// Built while sources load, consumed only by the report formatter. Iteration
/// is by first-observed season year, then first-observed season within that
/// year, which makes the column layout deterministic for a given sequence of
/// loaded sources.
#[derive(Debug, Clone, Default)]
pub struct ColumnRegistry {
    years: Vec<i32>,
    seasons_by_year: HashMap<i32, Vec<String>>,
}

impl ColumnRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Record a (season-year, season) pair; already-seen pairs are ignored.
    pub fn observe(&mut self, season_year: i32, season: &str) {
        let seasons = match self.seasons_by_year.entry(season_year) {
            Entry::Occupied(occupied) => occupied.into_mut(),
            Entry::Vacant(vacant) => {
                self.years.push(season_year);
                vacant.insert(Vec::new())
            }
        };
        if !seasons.iter().any(|s| s == season) {
            seasons.push(season.to_string());
        }
    }

    /// (season-year, season) pairs in first-seen order.
    pub fn pairs(&self) -> impl Iterator<Item = (i32, &str)> + '_ {
        self.years.iter().flat_map(move |year| {
            self.seasons_by_year
                .get(year)
                .into_iter()
                .flatten()
                .map(move |season| (*year, season.as_str()))
        })
    }

    pub fn column_count(&self) -> usize {
        self.seasons_by_year.values().map(Vec::len).sum()
    }

    pub fn is_empty(&self) -> bool {
        self.years.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn pairs_follow_first_seen_year_then_season() {
        let mut registry = ColumnRegistry::new();
        registry.observe(2024, "pre-mating");
        registry.observe(2023, "mating");
        registry.observe(2024, "mating");
        registry.observe(2024, "pre-mating"); // duplicate, ignored

        let pairs: Vec<_> = registry.pairs().collect();
        assert_eq!(
            pairs,
            vec![(2024, "pre-mating"), (2024, "mating"), (2023, "mating")]
        );
        assert_eq!(registry.column_count(), 3);
    }
}

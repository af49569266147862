//! In-memory trap record store with cross-source merge semantics.

use std::collections::hash_map::Entry;
use std::collections::{HashMap, HashSet};

use chrono::NaiveDate;
use tracing::debug;

use crate::model::{Trap, TrapMetadata};

/// Store of traps keyed by id, plus the global date universe (the union of all
/// dates seen across every loaded source).
///
/// Trap iteration order and the date universe are both first-seen append-only
/// sequences, kept separate from the lookup maps. Traps are never deleted.
#[derive(Debug, Default)]
pub struct TrapStore {
    traps: HashMap<String, Trap>,
    order: Vec<String>,
    universe: Vec<NaiveDate>,
    universe_set: HashSet<NaiveDate>,
}

impl TrapStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Extend the global date universe. Returns the dates not seen before, in
    /// input order.
    pub fn record_dates(&mut self, dates: &[NaiveDate]) -> Vec<NaiveDate> {
        let mut fresh = Vec::new();
        for &date in dates {
            if self.universe_set.insert(date) {
                self.universe.push(date);
                fresh.push(date);
            }
        }
        fresh
    }

    /// Create or merge a trap record.
    ///
    /// A new id creates the trap with the given metadata. An existing id keeps
    /// the metadata from its first load and merges the entries; overlapping
    /// dates are overwritten by the newer source (last-loaded-wins).
    pub fn upsert(
        &mut self,
        metadata: TrapMetadata,
        entries: impl IntoIterator<Item = (NaiveDate, u8)>,
    ) {
        let id = metadata.id.clone();
        let trap = match self.traps.entry(id) {
            Entry::Occupied(occupied) => {
                debug!("Merging entries into existing trap {}", metadata.id);
                occupied.into_mut()
            }
            Entry::Vacant(vacant) => {
                self.order.push(metadata.id.clone());
                vacant.insert(Trap::new(metadata))
            }
        };
        for (date, state) in entries {
            trap.set(date, state);
        }
    }

    /// Ensure every trap has an entry for every universe date, defaulting
    /// missing ones to 0. Must run once after all sources are loaded and
    /// before aggregation.
    pub fn fill_missing(&mut self) {
        for id in &self.order {
            if let Some(trap) = self.traps.get_mut(id) {
                for &date in &self.universe {
                    if !trap.contains(date) {
                        trap.set(date, 0);
                    }
                }
            }
        }
    }

    pub fn get(&self, id: &str) -> Option<&Trap> {
        self.traps.get(id)
    }

    /// Traps in first-seen id order.
    pub fn iter(&self) -> impl Iterator<Item = &Trap> + '_ {
        self.order.iter().filter_map(|id| self.traps.get(id))
    }

    /// Global date universe in first-seen order.
    pub fn dates(&self) -> &[NaiveDate] {
        &self.universe
    }

    pub fn len(&self) -> usize {
        self.order.len()
    }

    pub fn is_empty(&self) -> bool {
        self.order.is_empty()
    }
}

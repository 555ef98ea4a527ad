//! The Assignment: a central mapping from shift-instance to resident, plus two
//! derived indexes kept incrementally in sync as moves are placed and undone.
//! No back-pointers are stored anywhere else; every other lookup (a resident's
//! shifts, a date's shifts) goes through these two indexes so there is exactly
//! one place that can get out of sync.

use crate::domain::resident::ResidentHandle;
use crate::domain::shift::{Instant, ShiftInstance, ShiftKey};
use chrono::NaiveDate;
use std::collections::{BTreeMap, HashMap};

#[derive(Debug, Clone, Default)]
pub struct Assignment {
    slots: BTreeMap<ShiftKey, Option<ResidentHandle>>,
    /// resident -> start instants of shifts currently assigned to them, kept sorted.
    by_resident: HashMap<ResidentHandle, Vec<Instant>>,
    /// date -> shift keys scheduled on that date, in the order shifts were registered.
    by_date: BTreeMap<NaiveDate, Vec<ShiftKey>>,
    /// the instant a shift starts at, needed to update `by_resident` on removal.
    starts: HashMap<ShiftKey, Instant>,
    /// (resident, start instant) -> shift key, so a neighbor in `by_resident`
    /// can be resolved back to its shift-instance without a back-pointer on
    /// the shift itself.
    key_at: HashMap<(ResidentHandle, Instant), ShiftKey>,
}

impl Assignment {
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers an empty slot for `shift`. Called once per shift-instance while
    /// building the horizon, before any placement happens.
    pub fn register_shift(&mut self, shift: &ShiftInstance) {
        self.slots.entry(shift.key.clone()).or_insert(None);
        self.starts.insert(shift.key.clone(), shift.start);
        self.by_date
            .entry(shift.key.date)
            .or_default()
            .push(shift.key.clone());
    }

    pub fn is_filled(&self, key: &ShiftKey) -> bool {
        matches!(self.slots.get(key), Some(Some(_)))
    }

    pub fn resident_at(&self, key: &ShiftKey) -> Option<&ResidentHandle> {
        self.slots.get(key).and_then(|r| r.as_ref())
    }

    /// Places `resident` into `key`, replacing whoever was there, if anyone.
    /// Updates both indexes. Returns the previous occupant, if any.
    pub fn place(&mut self, key: &ShiftKey, resident: ResidentHandle) -> Option<ResidentHandle> {
        let previous = self.slots.insert(key.clone(), Some(resident.clone()));
        let previous = previous.flatten();
        if let Some(ref prev) = previous {
            self.remove_from_resident_index(prev, key);
        }
        if let Some(&start) = self.starts.get(key) {
            let instants = self.by_resident.entry(resident.clone()).or_default();
            if let Err(pos) = instants.binary_search(&start) {
                instants.insert(pos, start);
            }
            self.key_at.insert((resident, start), key.clone());
        }
        previous
    }

    /// Empties `key`. Returns whoever was removed, if anyone.
    pub fn unplace(&mut self, key: &ShiftKey) -> Option<ResidentHandle> {
        let previous = self.slots.insert(key.clone(), None).flatten();
        if let Some(ref prev) = previous {
            self.remove_from_resident_index(prev, key);
        }
        previous
    }

    fn remove_from_resident_index(&mut self, resident: &ResidentHandle, key: &ShiftKey) {
        let Some(&start) = self.starts.get(key) else {
            return;
        };
        if let Some(instants) = self.by_resident.get_mut(resident) {
            if let Ok(pos) = instants.binary_search(&start) {
                instants.remove(pos);
            }
        }
        self.key_at.remove(&(resident.clone(), start));
    }

    /// Start instants of every shift currently assigned to `resident`, in
    /// chronological order.
    pub fn instants_for(&self, resident: &ResidentHandle) -> &[Instant] {
        self.by_resident
            .get(resident)
            .map(Vec::as_slice)
            .unwrap_or(&[])
    }

    /// The shift key `resident` is assigned to at `start`, if the pairing is
    /// currently part of the assignment.
    pub fn key_at_instant(&self, resident: &ResidentHandle, start: Instant) -> Option<&ShiftKey> {
        self.key_at.get(&(resident.clone(), start))
    }

    pub fn keys_on(&self, date: NaiveDate) -> &[ShiftKey] {
        self.by_date.get(&date).map(Vec::as_slice).unwrap_or(&[])
    }

    pub fn all_keys(&self) -> impl Iterator<Item = &ShiftKey> {
        self.slots.keys()
    }

    pub fn unfilled_required_keys<'a>(
        &'a self,
        shifts_by_key: &'a HashMap<ShiftKey, ShiftInstance>,
    ) -> impl Iterator<Item = &'a ShiftKey> + 'a {
        self.slots.iter().filter_map(move |(key, occupant)| {
            if occupant.is_some() {
                return None;
            }
            shifts_by_key
                .get(key)
                .filter(|s| s.required)
                .map(|_| key)
        })
    }
}

//! Night-run: a 3- or 4-night alternating-hospital commitment for one resident
//! on one team, modeled as a first-class entity with its own lifecycle so the
//! alternation invariant stays local to this type instead of leaking into the
//! day-by-day constructive loop.

use crate::domain::resident::ResidentHandle;
use chrono::NaiveDate;
use shared::{Hospital, Team};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NightRunStatus {
    /// Length and starting hospital decided, no nights placed yet.
    Planned,
    /// Some but not all nights have been placed into the assignment.
    PartiallyPlaced,
    /// Every night in the run has a placed shift-instance.
    Complete,
}

#[derive(Debug, Clone)]
pub struct NightRun {
    pub resident: ResidentHandle,
    pub team: Team,
    pub start_date: NaiveDate,
    pub length: u8,
    pub first_hospital: Hospital,
    pub status: NightRunStatus,
    placed_nights: u8,
}

impl NightRun {
    pub fn planned(
        resident: ResidentHandle,
        team: Team,
        start_date: NaiveDate,
        length: u8,
        first_hospital: Hospital,
    ) -> Self {
        debug_assert!(length == 3 || length == 4, "night-run length must be 3 or 4");
        Self {
            resident,
            team,
            start_date,
            length,
            first_hospital,
            status: NightRunStatus::Planned,
            placed_nights: 0,
        }
    }

    /// The hospital for the `offset`-th night in the run (0-indexed), alternating
    /// from `first_hospital`.
    pub fn hospital_for_offset(&self, offset: u8) -> Hospital {
        if offset % 2 == 0 {
            self.first_hospital
        } else {
            self.first_hospital.other()
        }
    }

    pub fn date_for_offset(&self, offset: u8) -> NaiveDate {
        self.start_date + chrono::Duration::days(offset as i64)
    }

    pub fn dates(&self) -> impl Iterator<Item = NaiveDate> + '_ {
        (0..self.length).map(move |o| self.date_for_offset(o))
    }

    pub fn mark_night_placed(&mut self) {
        self.placed_nights += 1;
        self.status = if self.placed_nights >= self.length {
            NightRunStatus::Complete
        } else {
            NightRunStatus::PartiallyPlaced
        };
    }

    pub fn is_complete(&self) -> bool {
        self.status == NightRunStatus::Complete
    }

    /// Builds the replacement run used by the "night-run reshape" local-search
    /// move: same dates, length, and hospital alternation, different resident.
    pub fn reshaped_for(&self, new_resident: ResidentHandle) -> NightRun {
        NightRun {
            resident: new_resident,
            team: self.team,
            start_date: self.start_date,
            length: self.length,
            first_hospital: self.first_hospital,
            status: NightRunStatus::Planned,
            placed_nights: 0,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn hospital_alternates_across_offsets() {
        let run = NightRun::planned(
            "r1".to_string(),
            Team::R,
            NaiveDate::from_ymd_opt(2026, 7, 1).unwrap(),
            4,
            Hospital::L,
        );
        assert_eq!(run.hospital_for_offset(0), Hospital::L);
        assert_eq!(run.hospital_for_offset(1), Hospital::W);
        assert_eq!(run.hospital_for_offset(2), Hospital::L);
        assert_eq!(run.hospital_for_offset(3), Hospital::W);
    }

    #[test]
    fn becomes_complete_once_every_night_is_placed() {
        let mut run = NightRun::planned(
            "r1".to_string(),
            Team::G,
            NaiveDate::from_ymd_opt(2026, 7, 1).unwrap(),
            3,
            Hospital::W,
        );
        assert_eq!(run.status, NightRunStatus::Planned);
        run.mark_night_placed();
        assert_eq!(run.status, NightRunStatus::PartiallyPlaced);
        run.mark_night_placed();
        run.mark_night_placed();
        assert!(run.is_complete());
    }
}

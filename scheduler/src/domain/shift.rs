//! Shift-instance: a dated, timed slot that needs (or may optionally have) a resident.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use shared::{Hospital, Pgy, Team};
use std::collections::BTreeSet;
use std::fmt;

pub type Instant = i64;

/// Minutes from local midnight on `horizon_start` to `date` at `minute_of_day`.
pub fn instant(horizon_start: NaiveDate, date: NaiveDate, minute_of_day: i64) -> Instant {
    let days = (date - horizon_start).num_days();
    days * 1_440 + minute_of_day
}

/// The shift-instance identity: a calendar date plus a shift code (`LR7`, `LIdw`, ...).
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct ShiftKey {
    pub date: NaiveDate,
    pub code: String,
}

impl fmt::Display for ShiftKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {}", self.date, self.code)
    }
}

/// A dated shift-instance produced by the template expander.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ShiftInstance {
    pub key: ShiftKey,
    pub hospital: Hospital,
    pub team: Team,
    /// The raw start-token this instance was expanded from (`"7"`, `"n"`, `"dw"`, `"11w"`, ...).
    pub start_token: String,
    pub start_minute_of_day: i64,
    pub duration_hours: u8,
    pub required: bool,
    pub eligible_pgy: BTreeSet<Pgy>,
    pub preferred_pgy: BTreeSet<Pgy>,
    pub start: Instant,
    pub end: Instant,
}

impl ShiftInstance {
    pub fn is_night(&self) -> bool {
        self.start_token == "n"
    }

    pub fn duration_minutes(&self) -> i64 {
        self.duration_hours as i64 * 60
    }

    /// The duration this shift actually runs for a resident of `pgy`. The
    /// template expander bakes in a single nominal `duration_hours` at
    /// expansion time, which is only correct for teams with one eligible PGY
    /// (R, G, I); E, B, and P admit more than one PGY class with different
    /// per-PGY durations, so every legality check and the scorer must
    /// re-resolve the real duration here rather than trust the cached value.
    pub fn effective_duration_hours(&self, pgy: Pgy) -> u8 {
        crate::template::duration_for_pgy(self.team, &self.start_token, pgy).unwrap_or(self.duration_hours)
    }

    pub fn effective_duration_minutes(&self, pgy: Pgy) -> i64 {
        self.effective_duration_hours(pgy) as i64 * 60
    }

    pub fn effective_end(&self, pgy: Pgy) -> Instant {
        self.start + self.effective_duration_minutes(pgy)
    }

    /// The "circadian rank" used by the scorer: morning < afternoon < night.
    /// Returns `None` for the Wednesday special tokens, which carry no rank.
    pub fn circadian_rank(&self) -> Option<u8> {
        match self.start_token.as_str() {
            "7" | "9" | "11" => Some(0),
            "1" | "2" | "4" => Some(1),
            "n" => Some(2),
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn instant_advances_one_day_per_1440_minutes() {
        let start = NaiveDate::from_ymd_opt(2026, 7, 1).unwrap();
        let next_day = NaiveDate::from_ymd_opt(2026, 7, 2).unwrap();
        assert_eq!(instant(start, start, 0), 0);
        assert_eq!(instant(start, next_day, 0), 1_440);
        assert_eq!(instant(start, start, 420), 420);
    }

    #[test]
    fn shift_key_displays_date_and_code() {
        let key = ShiftKey {
            date: NaiveDate::from_ymd_opt(2026, 7, 1).unwrap(),
            code: "LR7".to_string(),
        };
        assert_eq!(key.to_string(), "2026-07-01 LR7");
    }
}

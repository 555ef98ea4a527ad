use super::{Constraint, EvalContext};
use crate::domain::Instant;

const MINUTES_PER_DAY: i64 = 1_440;
const FREE_WINDOW_MINUTES: i64 = 24 * 60;
const ROLLING_WINDOW_DAYS: i64 = 7;

/// Item 5 of §4.2: with the candidate tentatively added, every 7-day window
/// containing the candidate's date must still contain a continuous 24-hour
/// interval free of any of the resident's assignments.
pub struct TwentyFourHourFreeRule;

impl Constraint for TwentyFourHourFreeRule {
    fn name(&self) -> &'static str {
        "twenty_four_hour_free"
    }

    fn check(&self, ctx: &EvalContext<'_>) -> Result<(), String> {
        let candidate = ctx.shift;
        let pgy = ctx.resident.pgy;

        let mut intervals: Vec<(Instant, Instant)> = ctx
            .assignment
            .instants_for(&ctx.resident.handle)
            .iter()
            .filter_map(|&start| {
                let key = ctx.assignment.key_at_instant(&ctx.resident.handle, start)?;
                let s = ctx.shifts_by_key.get(key)?;
                Some((s.start, s.effective_end(pgy)))
            })
            .collect();
        intervals.push((candidate.start, candidate.effective_end(pgy)));
        intervals.sort_unstable();

        // Day-aligned window starts: the candidate's own day, minus 0..6 days.
        let candidate_day_start = candidate.start - candidate.start.rem_euclid(MINUTES_PER_DAY);
        for offset in 0..ROLLING_WINDOW_DAYS {
            let window_start = candidate_day_start - offset * MINUTES_PER_DAY;
            let window_end = window_start + ROLLING_WINDOW_DAYS * MINUTES_PER_DAY;
            if !has_free_block(&intervals, window_start, window_end, FREE_WINDOW_MINUTES) {
                return Err(format!(
                    "{} would have no 24h free block in the 7-day window starting at minute {}",
                    ctx.resident.handle, window_start
                ));
            }
        }

        Ok(())
    }
}

fn has_free_block(intervals: &[(Instant, Instant)], window_start: Instant, window_end: Instant, needed: Instant) -> bool {
    let mut cursor = window_start;
    for &(start, end) in intervals {
        if end <= window_start || start >= window_end {
            continue;
        }
        let clipped_start = start.max(window_start);
        if clipped_start - cursor >= needed {
            return true;
        }
        cursor = cursor.max(end.min(window_end));
    }
    window_end - cursor >= needed
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::{instant, Assignment, Resident, ShiftInstance, ShiftKey};
    use chrono::NaiveDate;
    use shared::{Hospital, Pgy, Service, Team};
    use std::collections::{BTreeSet, HashMap};

    fn shift(date: NaiveDate, code: &str, horizon_start: NaiveDate, dur: u8) -> ShiftInstance {
        let start = instant(horizon_start, date, 420);
        ShiftInstance {
            key: ShiftKey {
                date,
                code: code.to_string(),
            },
            hospital: Hospital::L,
            team: Team::R,
            start_token: "7".to_string(),
            start_minute_of_day: 420,
            duration_hours: dur,
            required: true,
            eligible_pgy: BTreeSet::from([Pgy::Three]),
            preferred_pgy: BTreeSet::new(),
            start,
            end: start + dur as i64 * 60,
        }
    }

    #[test]
    fn seven_straight_twelve_hour_days_leave_no_free_block() {
        let horizon_start = NaiveDate::from_ymd_opt(2026, 6, 29).unwrap();
        let mut assignment = Assignment::new();
        let mut shifts = HashMap::new();

        for offset in 0..6 {
            let date = horizon_start + chrono::Duration::days(offset);
            let s = shift(date, &format!("LR7-{offset}"), horizon_start, 12);
            assignment.register_shift(&s);
            assignment.place(&s.key, "r1".to_string());
            shifts.insert(s.key.clone(), s);
        }

        let candidate_date = horizon_start + chrono::Duration::days(6);
        let candidate = shift(candidate_date, "LR7-6", horizon_start, 12);
        assignment.register_shift(&candidate);
        shifts.insert(candidate.key.clone(), candidate.clone());

        let resident = Resident::new("r1", Pgy::Three, Service::Ed, 180);
        let c = EvalContext {
            resident: &resident,
            shift: &candidate,
            assignment: &assignment,
            shifts_by_key: &shifts,
            horizon_start,
            night_run_commitment: true,
        };
        assert!(TwentyFourHourFreeRule.check(&c).is_err());
    }

    #[test]
    fn a_day_off_mid_week_satisfies_the_rule() {
        let horizon_start = NaiveDate::from_ymd_opt(2026, 6, 29).unwrap();
        let mut assignment = Assignment::new();
        let mut shifts = HashMap::new();

        // Work Mon-Wed, rest Thu, work Fri-Sun.
        for offset in [0_i64, 1, 2, 4, 5, 6] {
            let date = horizon_start + chrono::Duration::days(offset);
            let s = shift(date, &format!("LR7-{offset}"), horizon_start, 12);
            assignment.register_shift(&s);
            assignment.place(&s.key, "r1".to_string());
            shifts.insert(s.key.clone(), s);
        }

        let candidate_date = horizon_start + chrono::Duration::days(6);
        let candidate_key = ShiftKey {
            date: candidate_date,
            code: "LR7-6".to_string(),
        };
        let candidate = shifts.get(&candidate_key).unwrap().clone();

        let resident = Resident::new("r1", Pgy::Three, Service::Ed, 180);
        let c = EvalContext {
            resident: &resident,
            shift: &candidate,
            assignment: &assignment,
            shifts_by_key: &shifts,
            horizon_start,
            night_run_commitment: true,
        };
        assert!(TwentyFourHourFreeRule.check(&c).is_ok());
    }
}

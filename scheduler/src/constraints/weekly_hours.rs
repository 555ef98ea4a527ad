use super::{Constraint, EvalContext};
use chrono::{Datelike, Duration, NaiveDate};

/// Item 4 of §4.2: candidate duration plus the resident's other assignments
/// in the candidate's Monday-Sunday week must not exceed the weekly cap.
pub struct WeeklyHoursRule {
    cap_hours: u32,
}

impl WeeklyHoursRule {
    pub fn new(cap_hours: u32) -> Self {
        Self { cap_hours }
    }
}

fn week_start(date: NaiveDate) -> NaiveDate {
    date - Duration::days(date.weekday().num_days_from_monday() as i64)
}

impl Constraint for WeeklyHoursRule {
    fn name(&self) -> &'static str {
        "weekly_hours"
    }

    fn check(&self, ctx: &EvalContext<'_>) -> Result<(), String> {
        let week_start = week_start(ctx.shift.key.date);
        let week_end = week_start + Duration::days(6);

        let pgy = ctx.resident.pgy;
        let mut total_hours: u32 = ctx.shift.effective_duration_hours(pgy) as u32;
        for &start in ctx.assignment.instants_for(&ctx.resident.handle) {
            let Some(key) = ctx.assignment.key_at_instant(&ctx.resident.handle, start) else {
                continue;
            };
            let Some(other) = ctx.shifts_by_key.get(key) else {
                continue;
            };
            if other.key.date >= week_start && other.key.date <= week_end {
                total_hours += other.effective_duration_hours(pgy) as u32;
            }
        }

        if total_hours > self.cap_hours {
            return Err(format!(
                "{} would reach {} hours in the week of {} (cap {})",
                ctx.resident.handle, total_hours, week_start, self.cap_hours
            ));
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::{instant, Assignment, Resident, ShiftInstance, ShiftKey};
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
    fn sixth_twelve_hour_shift_in_one_week_breaks_the_cap() {
        let horizon_start = NaiveDate::from_ymd_opt(2026, 6, 29).unwrap(); // Monday
        let mut assignment = Assignment::new();
        let mut shifts = HashMap::new();

        for offset in 0..5 {
            let date = horizon_start + Duration::days(offset);
            let s = shift(date, &format!("LR7-{offset}"), horizon_start, 12);
            assignment.register_shift(&s);
            assignment.place(&s.key, "r1".to_string());
            shifts.insert(s.key.clone(), s);
        }

        let candidate_date = horizon_start + Duration::days(5);
        let candidate = shift(candidate_date, "LR7-5", horizon_start, 12);
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
        assert!(WeeklyHoursRule::new(60).check(&c).is_err());
    }
}

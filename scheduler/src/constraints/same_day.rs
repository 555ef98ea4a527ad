use super::{Constraint, EvalContext};

/// Item 2 of §4.2: a resident appears at most once per calendar day.
pub struct SameDayRule;

impl Constraint for SameDayRule {
    fn name(&self) -> &'static str {
        "same_day"
    }

    fn check(&self, ctx: &EvalContext<'_>) -> Result<(), String> {
        for key in ctx.assignment.keys_on(ctx.shift.key.date) {
            if key == &ctx.shift.key {
                continue;
            }
            if ctx.assignment.resident_at(key) == Some(&ctx.resident.handle) {
                return Err(format!(
                    "{} is already assigned to {} on {}",
                    ctx.resident.handle, key.code, ctx.shift.key.date
                ));
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::{instant, Assignment, Resident, ShiftInstance, ShiftKey};
    use chrono::NaiveDate;
    use shared::{Hospital, Pgy, Service, Team};
    use std::collections::{BTreeSet, HashMap};

    fn shift(date: NaiveDate, code: &str, horizon_start: NaiveDate, minute: i64) -> ShiftInstance {
        ShiftInstance {
            key: ShiftKey {
                date,
                code: code.to_string(),
            },
            hospital: Hospital::L,
            team: Team::E,
            start_token: "1".to_string(),
            start_minute_of_day: minute,
            duration_hours: 10,
            required: true,
            eligible_pgy: BTreeSet::from([Pgy::One]),
            preferred_pgy: BTreeSet::from([Pgy::One]),
            start: instant(horizon_start, date, minute),
            end: instant(horizon_start, date, minute) + 600,
        }
    }

    #[test]
    fn second_shift_same_day_is_rejected() {
        let horizon_start = NaiveDate::from_ymd_opt(2026, 7, 1).unwrap();
        let first = shift(horizon_start, "LE1", horizon_start, 780);
        let second = shift(horizon_start, "LB4", horizon_start, 960);

        let mut assignment = Assignment::new();
        assignment.register_shift(&first);
        assignment.register_shift(&second);
        assignment.place(&first.key, "r1".to_string());

        let resident = Resident::new("r1", Pgy::One, Service::Ed, 160);
        let mut shifts = HashMap::new();
        shifts.insert(first.key.clone(), first.clone());
        shifts.insert(second.key.clone(), second.clone());

        let c = EvalContext {
            resident: &resident,
            shift: &second,
            assignment: &assignment,
            shifts_by_key: &shifts,
            horizon_start,
            night_run_commitment: true,
        };
        assert!(SameDayRule.check(&c).is_err());
    }
}

use super::{Constraint, EvalContext};

/// Item 6 of §4.2: nights are never placed singly. A night-shift candidate is
/// legal only as part of an already-planned night-run commitment; the solver
/// sets `EvalContext::night_run_commitment` once it has committed a resident
/// to a run, before attempting to place each night in that run.
pub struct NightRunCommitmentRule;

impl Constraint for NightRunCommitmentRule {
    fn name(&self) -> &'static str {
        "night_run_commitment"
    }

    fn check(&self, ctx: &EvalContext<'_>) -> Result<(), String> {
        if ctx.shift.is_night() && !ctx.night_run_commitment {
            return Err(format!(
                "{} cannot take a single night shift ({}) without a committed night-run",
                ctx.resident.handle, ctx.shift.key
            ));
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

    fn night_shift(date: NaiveDate, horizon_start: NaiveDate) -> ShiftInstance {
        let start = instant(horizon_start, date, 19 * 60);
        ShiftInstance {
            key: ShiftKey {
                date,
                code: "LR n".to_string(),
            },
            hospital: Hospital::L,
            team: Team::R,
            start_token: "n".to_string(),
            start_minute_of_day: 19 * 60,
            duration_hours: 12,
            required: true,
            eligible_pgy: BTreeSet::from([Pgy::Three]),
            preferred_pgy: BTreeSet::new(),
            start,
            end: start + 720,
        }
    }

    #[test]
    fn uncommitted_single_night_is_rejected() {
        let horizon_start = NaiveDate::from_ymd_opt(2026, 7, 1).unwrap();
        let shift = night_shift(horizon_start, horizon_start);
        let assignment = Assignment::new();
        let shifts = HashMap::new();
        let resident = Resident::new("r1", Pgy::Three, Service::Ed, 180);
        let c = EvalContext {
            resident: &resident,
            shift: &shift,
            assignment: &assignment,
            shifts_by_key: &shifts,
            horizon_start,
            night_run_commitment: false,
        };
        assert!(NightRunCommitmentRule.check(&c).is_err());
    }

    #[test]
    fn committed_night_is_allowed() {
        let horizon_start = NaiveDate::from_ymd_opt(2026, 7, 1).unwrap();
        let shift = night_shift(horizon_start, horizon_start);
        let assignment = Assignment::new();
        let shifts = HashMap::new();
        let resident = Resident::new("r1", Pgy::Three, Service::Ed, 180);
        let c = EvalContext {
            resident: &resident,
            shift: &shift,
            assignment: &assignment,
            shifts_by_key: &shifts,
            horizon_start,
            night_run_commitment: true,
        };
        assert!(NightRunCommitmentRule.check(&c).is_ok());
    }
}

use super::{Constraint, EvalContext};
use shared::{Service, Team};

/// Service eligibility (item 1 of §4.2) plus the PGY-eligibility-pool check
/// from the data model's assignment invariants: a resident's service must
/// permit the shift's team, and the shift's eligible-PGY set must contain the
/// resident's PGY year.
pub struct EligibilityRule;

impl Constraint for EligibilityRule {
    fn name(&self) -> &'static str {
        "eligibility"
    }

    fn check(&self, ctx: &EvalContext<'_>) -> Result<(), String> {
        let resident = ctx.resident;
        let shift = ctx.shift;

        let service_ok = match resident.service {
            Service::Ed => true,
            Service::Peds => shift.team == Team::P,
            Service::OffService | Service::Vacation => false,
        };
        if !service_ok {
            return Err(format!(
                "{} is on {} and cannot fill a {} shift",
                resident.handle, resident.service, shift.team
            ));
        }

        if !shift.eligible_pgy.contains(&resident.pgy) {
            return Err(format!(
                "{} is PGY-{} which is not in {}'s eligible pool",
                resident.handle,
                resident.pgy,
                shift.key.code
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
    use shared::{Hospital, Pgy};
    use std::collections::{BTreeSet, HashMap};

    fn ctx<'a>(
        resident: &'a Resident,
        shift: &'a ShiftInstance,
        assignment: &'a Assignment,
        shifts_by_key: &'a HashMap<ShiftKey, ShiftInstance>,
        horizon_start: NaiveDate,
    ) -> EvalContext<'a> {
        EvalContext {
            resident,
            shift,
            assignment,
            shifts_by_key,
            horizon_start,
            night_run_commitment: true,
        }
    }

    fn p_shift(date: NaiveDate, horizon_start: NaiveDate) -> ShiftInstance {
        ShiftInstance {
            key: ShiftKey {
                date,
                code: "LP2".to_string(),
            },
            hospital: Hospital::L,
            team: Team::P,
            start_token: "2".to_string(),
            start_minute_of_day: 840,
            duration_hours: 10,
            required: true,
            eligible_pgy: BTreeSet::from([Pgy::One, Pgy::Two, Pgy::Three]),
            preferred_pgy: BTreeSet::from([Pgy::One, Pgy::Two]),
            start: instant(horizon_start, date, 840),
            end: instant(horizon_start, date, 840) + 600,
        }
    }

    #[test]
    fn off_service_resident_is_never_eligible() {
        let horizon_start = NaiveDate::from_ymd_opt(2026, 7, 1).unwrap();
        let mut resident = Resident::new("r1", Pgy::Two, Service::OffService, 160);
        resident.pgy = Pgy::Two;
        let shift = p_shift(horizon_start, horizon_start);
        let assignment = Assignment::new();
        let shifts = HashMap::new();
        let c = ctx(&resident, &shift, &assignment, &shifts, horizon_start);
        assert!(EligibilityRule.check(&c).is_err());
    }

    #[test]
    fn peds_resident_may_only_fill_p_team() {
        let horizon_start = NaiveDate::from_ymd_opt(2026, 7, 1).unwrap();
        let resident = Resident::new("r1", Pgy::One, Service::Peds, 160);
        let shift = p_shift(horizon_start, horizon_start);
        let assignment = Assignment::new();
        let shifts = HashMap::new();
        let c = ctx(&resident, &shift, &assignment, &shifts, horizon_start);
        assert!(EligibilityRule.check(&c).is_ok());
    }
}

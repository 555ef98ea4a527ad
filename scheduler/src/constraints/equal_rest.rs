use super::{Constraint, EvalContext};

/// Item 3 of §4.2: for the resident's previous and next assigned shift, the
/// gap between the earlier's end and the later's start must be at least the
/// earlier's duration.
pub struct EqualRestRule;

impl Constraint for EqualRestRule {
    fn name(&self) -> &'static str {
        "equal_rest"
    }

    fn check(&self, ctx: &EvalContext<'_>) -> Result<(), String> {
        let instants = ctx.assignment.instants_for(&ctx.resident.handle);
        let candidate = ctx.shift;

        let pgy = ctx.resident.pgy;

        let prev = instants.iter().rev().find(|&&i| i < candidate.start);
        if let Some(&prev_start) = prev {
            if let Some(key) = ctx.assignment.key_at_instant(&ctx.resident.handle, prev_start) {
                if let Some(prev_shift) = ctx.shifts_by_key.get(key) {
                    let prev_duration = prev_shift.effective_duration_minutes(pgy);
                    let gap = candidate.start - prev_shift.effective_end(pgy);
                    if gap < prev_duration {
                        return Err(format!(
                            "{} would have only {}m rest after {} (needs {}m)",
                            ctx.resident.handle, gap, prev_shift.key, prev_duration
                        ));
                    }
                }
            }
        }

        let next = instants.iter().find(|&&i| i > candidate.start);
        if let Some(&next_start) = next {
            if let Some(key) = ctx.assignment.key_at_instant(&ctx.resident.handle, next_start) {
                if let Some(next_shift) = ctx.shifts_by_key.get(key) {
                    let candidate_duration = candidate.effective_duration_minutes(pgy);
                    let gap = next_shift.start - candidate.effective_end(pgy);
                    if gap < candidate_duration {
                        return Err(format!(
                            "{} would leave only {}m rest before {} (needs {}m)",
                            ctx.resident.handle, gap, next_shift.key, candidate_duration
                        ));
                    }
                }
            }
        }

        Ok(())
    }
}

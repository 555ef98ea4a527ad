pub mod eligibility;
pub mod equal_rest;
pub mod night_run_commitment;
pub mod same_day;
pub mod twenty_four_hour_free;
pub mod weekly_hours;

use crate::domain::{Assignment, Resident, ShiftInstance, ShiftKey};
use chrono::NaiveDate;
use std::collections::HashMap;

pub use eligibility::EligibilityRule;
pub use equal_rest::EqualRestRule;
pub use night_run_commitment::NightRunCommitmentRule;
pub use same_day::SameDayRule;
pub use twenty_four_hour_free::TwentyFourHourFreeRule;
pub use weekly_hours::WeeklyHoursRule;

/// Everything a rule needs to judge whether placing `resident` into `shift` is
/// legal, given the assignment as it stands right now. Pure data; rules never
/// mutate it.
pub struct EvalContext<'a> {
    pub resident: &'a Resident,
    pub shift: &'a ShiftInstance,
    pub assignment: &'a Assignment,
    pub shifts_by_key: &'a HashMap<ShiftKey, ShiftInstance>,
    pub horizon_start: NaiveDate,
    /// Set by the solver's night-run planner: true once the resident has an
    /// active, already-committed run covering this night. A bare `is_night()`
    /// shift with this false is illegal — nights are never placed singly.
    pub night_run_commitment: bool,
}

/// A single legality rule. Implementations never mutate state; `check`
/// returns the denial reason on failure so the constraint model can report it.
pub trait Constraint: Send + Sync {
    fn name(&self) -> &'static str;
    fn check(&self, ctx: &EvalContext<'_>) -> Result<(), String>;
}

/// Composes the ordered rule chain from §4.2 and runs them with short-circuit
/// semantics: the first denial wins and its reason is what callers see.
pub struct ConstraintModel {
    rules: Vec<Box<dyn Constraint>>,
}

impl ConstraintModel {
    pub fn new() -> Self {
        Self {
            rules: vec![
                Box::new(EligibilityRule),
                Box::new(SameDayRule),
                Box::new(EqualRestRule),
                Box::new(WeeklyHoursRule::new(60)),
                Box::new(TwentyFourHourFreeRule),
                Box::new(NightRunCommitmentRule),
            ],
        }
    }

    pub fn with_weekly_hour_cap(weekly_hour_cap: u32) -> Self {
        let mut model = Self::new();
        model.rules[3] = Box::new(WeeklyHoursRule::new(weekly_hour_cap));
        model
    }

    /// The legality predicate. Never mutates `ctx`.
    pub fn legal(&self, ctx: &EvalContext<'_>) -> bool {
        self.rules.iter().all(|rule| rule.check(ctx).is_ok())
    }

    /// Same as `legal`, but keeps the first denial reason for diagnostics.
    pub fn check_with_reason(&self, ctx: &EvalContext<'_>) -> Result<(), (String, String)> {
        for rule in &self.rules {
            if let Err(reason) = rule.check(ctx) {
                return Err((rule.name().to_string(), reason));
            }
        }
        Ok(())
    }
}

impl Default for ConstraintModel {
    fn default() -> Self {
        Self::new()
    }
}

pub mod constructive;
pub mod local_search;
pub mod rng;

use crate::config::SolverConfig;
use crate::constraints::{ConstraintModel, EvalContext};
use crate::domain::{Assignment, NightRun, ResidentHandle, ShiftInstance, ShiftKey};
use crate::roster::Roster;
use crate::scorer::Scorer;
use chrono::NaiveDate;
use shared::ScheduleResult;
use std::collections::HashMap;
use tracing::info;

/// Everything the two solver phases share: the static shift universe, the
/// roster with its incrementally-updated running totals, the assignment, the
/// constraint model, and the night-run commitments placed so far.
pub struct Instance {
    pub horizon_start: NaiveDate,
    pub horizon_end: NaiveDate,
    pub roster: Roster,
    pub shifts_by_key: HashMap<ShiftKey, ShiftInstance>,
    pub dates: Vec<NaiveDate>,
    pub assignment: Assignment,
    pub model: ConstraintModel,
    pub night_runs: Vec<NightRun>,
}

impl Instance {
    pub fn new(
        horizon_start: NaiveDate,
        horizon_end: NaiveDate,
        roster: Roster,
        shifts: Vec<ShiftInstance>,
        weekly_hour_cap: u32,
    ) -> Self {
        let mut assignment = Assignment::new();
        let mut shifts_by_key = HashMap::new();
        let mut dates: Vec<NaiveDate> = Vec::new();
        for shift in shifts {
            assignment.register_shift(&shift);
            if dates.last() != Some(&shift.key.date) {
                dates.push(shift.key.date);
            }
            shifts_by_key.insert(shift.key.clone(), shift);
        }
        dates.sort();
        dates.dedup();

        Self {
            horizon_start,
            horizon_end,
            roster,
            shifts_by_key,
            dates,
            assignment,
            model: ConstraintModel::with_weekly_hour_cap(weekly_hour_cap),
            night_runs: Vec::new(),
        }
    }

    /// Builds the legality context for `resident` against `key` as the
    /// assignment currently stands, and evaluates it through the constraint
    /// model. Returns the denial reason on failure for diagnostics.
    pub fn check(
        &self,
        resident_handle: &str,
        key: &ShiftKey,
        night_run_commitment: bool,
    ) -> Result<(), (String, String)> {
        let resident = self
            .roster
            .get(resident_handle)
            .expect("resident handle must exist in roster");
        let shift = self
            .shifts_by_key
            .get(key)
            .expect("shift key must exist in shifts_by_key");
        let ctx = EvalContext {
            resident,
            shift,
            assignment: &self.assignment,
            shifts_by_key: &self.shifts_by_key,
            horizon_start: self.horizon_start,
            night_run_commitment,
        };
        self.model.check_with_reason(&ctx)
    }

    pub fn legal(&self, resident_handle: &str, key: &ShiftKey, night_run_commitment: bool) -> bool {
        self.check(resident_handle, key, night_run_commitment).is_ok()
    }

    /// Places `handle` into `key`, updating the resident's running totals.
    /// Returns the previous occupant, if any (whose totals are also updated).
    pub fn place(&mut self, key: &ShiftKey, handle: ResidentHandle) -> Option<ResidentHandle> {
        let shift = self.shifts_by_key.get(key).expect("registered shift");
        let pgy = self.roster.get(&handle).map(|r| r.pgy).unwrap_or(shared::Pgy::One);
        let duration_hours = shift.effective_duration_hours(pgy);
        let is_night = shift.is_night();

        let previous = self.assignment.place(key, handle.clone());

        if let Some(resident) = self.roster.get_mut(&handle) {
            resident.state.assigned_hours += duration_hours as u32;
            if is_night {
                resident.state.nights_worked += 1;
            }
        }

        if let Some(ref prev_handle) = previous {
            self.subtract_running_totals(prev_handle, shift);
        }

        previous
    }

    pub fn unplace(&mut self, key: &ShiftKey) -> Option<ResidentHandle> {
        let shift = self.shifts_by_key.get(key).cloned().expect("registered shift");
        let removed = self.assignment.unplace(key);
        if let Some(ref handle) = removed {
            self.subtract_running_totals(handle, &shift);
        }
        removed
    }

    fn subtract_running_totals(&mut self, handle: &str, shift: &ShiftInstance) {
        let pgy = self.roster.get(handle).map(|r| r.pgy).unwrap_or(shared::Pgy::One);
        let duration_hours = shift.effective_duration_hours(pgy);
        if let Some(resident) = self.roster.get_mut(handle) {
            resident.state.assigned_hours = resident.state.assigned_hours.saturating_sub(duration_hours as u32);
            if shift.is_night() {
                resident.state.nights_worked = resident.state.nights_worked.saturating_sub(1);
            }
        }
    }

    /// Re-validates every placed assignment against the constraint model.
    /// Used as the always-on bug check before emission (§7): a violation here
    /// is an internal invariant violation, not a panic.
    pub fn revalidate(&self) -> ScheduleResult<()> {
        for key in self.assignment.all_keys() {
            let Some(handle) = self.assignment.resident_at(key) else {
                continue;
            };
            let shift = &self.shifts_by_key[key];
            let night_commitment = !shift.is_night()
                || self
                    .night_runs
                    .iter()
                    .any(|run| run.resident == *handle && run.dates().any(|d| d == key.date));
            if let Err((rule, reason)) = self.check(handle, key, night_commitment) {
                return Err(shared::ScheduleError::Invariant(format!(
                    "accepted assignment {key} for {handle} violates rule {rule}: {reason}"
                )));
            }
        }
        Ok(())
    }
}

/// Runs the configured number of independent seed runs and returns the
/// minimum-scored instance. Implemented as a plain sequential loop per §5 and
/// §9 — parallelizing the seed runs is an easy, explicitly out-of-scope
/// follow-up.
pub fn solve(
    horizon_start: NaiveDate,
    horizon_end: NaiveDate,
    roster: Roster,
    shifts: Vec<ShiftInstance>,
    config: &SolverConfig,
    base_seed: u64,
) -> ScheduleResult<Instance> {
    let weights = config.objective_weights();
    let scorer = Scorer::new(&weights);

    let mut best: Option<(Instance, f64)> = None;

    for run in 0..config.seed_runs.max(1) {
        let seed = base_seed.wrapping_add(run as u64);
        info!(seed, run, "starting seed run");

        let mut instance = Instance::new(
            horizon_start,
            horizon_end,
            roster.clone(),
            shifts.clone(),
            config.weekly_hour_cap,
        );
        let mut rng = rng::SolverRng::seeded(seed);

        constructive::run(&mut instance, &mut rng, config)?;
        local_search::run(&mut instance, &mut rng, config, &scorer);
        instance.revalidate()?;

        let score = scorer.score(&instance.assignment, &instance.roster, &instance.shifts_by_key);
        info!(seed, score, "seed run complete");

        match &best {
            Some((_, best_score)) if *best_score <= score => {}
            _ => best = Some((instance, score)),
        }
    }

    Ok(best.expect("at least one seed run configured").0)
}

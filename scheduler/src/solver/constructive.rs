//! Phase A — constructive seed: night-run planning followed by randomized,
//! hours-deficit-weighted filling of required day shifts. Optional shifts are
//! left untouched; Phase B decides whether to fill them.

use super::rng::SolverRng;
use super::Instance;
use crate::config::SolverConfig;
use crate::domain::{NightRun, ResidentHandle, ShiftKey};
use chrono::{Duration, NaiveDate};
use rand::distributions::{Distribution, WeightedIndex};
use rand::seq::SliceRandom;
use shared::{ScheduleError, ScheduleResult, Team};

const NIGHT_RUN_TEAMS: [Team; 3] = [Team::R, Team::G, Team::I];

pub fn run(instance: &mut Instance, rng: &mut SolverRng, config: &SolverConfig) -> ScheduleResult<()> {
    let dates = instance.dates.clone();
    for date in dates {
        fill_day(instance, rng, date, config)?;
    }
    Ok(())
}

/// Attempts to fill one day's commitments and required shifts, retrying with
/// fresh randomness up to the configured budget before surfacing the
/// blocking shift as an infeasibility. This is the bounded-retry
/// approximation of "backtrack one day" described in §4.4 (see design notes).
fn fill_day(
    instance: &mut Instance,
    rng: &mut SolverRng,
    date: NaiveDate,
    config: &SolverConfig,
) -> ScheduleResult<()> {
    let budget = config.backtracking_budget.max(1);
    let mut last_err = None;

    for _ in 0..budget {
        let snapshot = (
            instance.assignment.clone(),
            instance.roster.clone(),
            instance.night_runs.clone(),
        );

        match try_fill_day(instance, rng, date) {
            Ok(()) => return Ok(()),
            Err(err) => {
                instance.assignment = snapshot.0;
                instance.roster = snapshot.1;
                instance.night_runs = snapshot.2;
                last_err = Some(err);
            }
        }
    }

    Err(last_err.expect("loop runs at least once"))
}

fn try_fill_day(instance: &mut Instance, rng: &mut SolverRng, date: NaiveDate) -> ScheduleResult<()> {
    for &team in &NIGHT_RUN_TEAMS {
        if !has_active_run(instance, team, date) {
            plan_night_run(instance, rng, team, date)?;
        }
    }

    let mut required_keys: Vec<ShiftKey> = instance
        .assignment
        .keys_on(date)
        .iter()
        .filter(|k| {
            let shift = &instance.shifts_by_key[k];
            shift.required && !shift.is_night() && !instance.assignment.is_filled(k)
        })
        .cloned()
        .collect();
    required_keys.shuffle(rng.inner_mut());

    for key in required_keys {
        fill_required_shift(instance, rng, &key)?;
    }

    Ok(())
}

fn has_active_run(instance: &Instance, team: Team, date: NaiveDate) -> bool {
    instance
        .night_runs
        .iter()
        .any(|run| run.team == team && run.dates().any(|d| d == date))
}

fn night_shift_key(instance: &Instance, date: NaiveDate, team: Team) -> Option<ShiftKey> {
    instance
        .shifts_by_key
        .values()
        .find(|s| s.key.date == date && s.team == team && s.is_night())
        .map(|s| s.key.clone())
}

fn plan_night_run(
    instance: &mut Instance,
    rng: &mut SolverRng,
    team: Team,
    date: NaiveDate,
) -> ScheduleResult<()> {
    let key = night_shift_key(instance, date, team).ok_or_else(|| {
        ScheduleError::Invariant(format!("no night shift instance for team {team} on {date}"))
    })?;
    let eligible_pgy = instance.shifts_by_key[&key].eligible_pgy.clone();

    let mut candidates: Vec<ResidentHandle> = instance
        .roster
        .schedulable()
        .filter(|r| eligible_pgy.contains(&r.pgy))
        .map(|r| r.handle.clone())
        .collect();

    while !candidates.is_empty() {
        let weights: Vec<f64> = candidates
            .iter()
            .map(|h| instance.roster.get(h).map(|r| r.hours_deficit()).unwrap_or(0.0) + 0.1)
            .collect();
        let dist = WeightedIndex::new(&weights).map_err(|e| {
            ScheduleError::Invariant(format!("night-run candidate weights invalid: {e}"))
        })?;
        let idx = dist.sample(rng.inner_mut());
        let handle = candidates[idx].clone();

        for &length in &[4_u8, 3] {
            if try_place_run(instance, &handle, team, date, length) {
                return Ok(());
            }
        }
        candidates.remove(idx);
    }

    Err(ScheduleError::Infeasible {
        date: date.to_string(),
        shift: key.code,
        candidates: "no eligible resident could sustain a 3- or 4-night run".to_string(),
    })
}

fn try_place_run(instance: &mut Instance, handle: &str, team: Team, date: NaiveDate, length: u8) -> bool {
    let mut placed = Vec::new();
    let mut first_hospital = None;

    for offset in 0..length {
        let d = date + Duration::days(offset as i64);
        if d > instance.horizon_end {
            break_and_rollback(instance, &placed);
            return false;
        }
        let Some(key) = night_shift_key(instance, d, team) else {
            break_and_rollback(instance, &placed);
            return false;
        };
        if !instance.legal(handle, &key, true) {
            break_and_rollback(instance, &placed);
            return false;
        }
        if first_hospital.is_none() {
            first_hospital = Some(instance.shifts_by_key[&key].hospital);
        }
        instance.place(&key, handle.to_string());
        placed.push(key);
    }

    if placed.len() != length as usize {
        break_and_rollback(instance, &placed);
        return false;
    }

    let mut run = NightRun::planned(
        handle.to_string(),
        team,
        date,
        length,
        first_hospital.expect("at least one night placed"),
    );
    for _ in 0..length {
        run.mark_night_placed();
    }
    instance.night_runs.push(run);
    true
}

fn break_and_rollback(instance: &mut Instance, placed: &[ShiftKey]) {
    for key in placed.iter().rev() {
        instance.unplace(key);
    }
}

fn fill_required_shift(instance: &mut Instance, rng: &mut SolverRng, key: &ShiftKey) -> ScheduleResult<()> {
    let shift = instance.shifts_by_key[key].clone();

    let mut candidates: Vec<ResidentHandle> = instance
        .roster
        .schedulable()
        .filter(|r| shift.eligible_pgy.contains(&r.pgy))
        .filter(|r| instance.legal(&r.handle, key, true))
        .map(|r| r.handle.clone())
        .collect();

    if candidates.is_empty() {
        return Err(ScheduleError::Infeasible {
            date: key.date.to_string(),
            shift: key.code.clone(),
            candidates: "no legal resident in the eligible pool".to_string(),
        });
    }

    candidates.sort();
    let weights: Vec<f64> = candidates
        .iter()
        .map(|h| {
            let resident = instance.roster.get(h).expect("candidate came from roster");
            let mut weight = resident.hours_deficit() + 0.1;
            if shift.preferred_pgy.contains(&resident.pgy) {
                weight *= 1.5;
            }
            if resident.requested_off(key.date) {
                weight *= 0.1;
            }
            weight
        })
        .collect();

    let dist = WeightedIndex::new(&weights)
        .map_err(|e| ScheduleError::Invariant(format!("required-shift candidate weights invalid: {e}")))?;
    let idx = dist.sample(rng.inner_mut());
    instance.place(key, candidates[idx].clone());
    Ok(())
}

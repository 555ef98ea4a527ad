//! Phase B — local improvement: hill-climbing over five neighborhood moves
//! with simulated-annealing-style acceptance of neutral/worse moves, the
//! acceptance probability decaying as the stall counter grows. Runs until a
//! stall limit (a no-improving-sweep proxy) or the iteration budget is spent.

use super::rng::SolverRng;
use super::Instance;
use crate::config::SolverConfig;
use crate::domain::{ResidentHandle, ShiftKey};
use crate::scorer::Scorer;
use chrono::NaiveDate;
use rand::seq::SliceRandom;
use rand::Rng;
use shared::Team;

const MOVE_KINDS: usize = 5;

pub fn run(instance: &mut Instance, rng: &mut SolverRng, config: &SolverConfig, scorer: &Scorer<'_>) {
    let iterations = config.local_search_iterations.max(1);
    let stall_limit = (iterations / 10).max(200);
    let mut stall = 0;

    for _ in 0..iterations {
        if stall >= stall_limit {
            break;
        }
        let temperature = 1.0 - (stall as f64 / stall_limit as f64).min(1.0);
        if attempt_move(instance, rng, scorer, temperature) {
            stall = 0;
        } else {
            stall += 1;
        }
    }
}

fn attempt_move(instance: &mut Instance, rng: &mut SolverRng, scorer: &Scorer<'_>, temperature: f64) -> bool {
    let kind = rng.inner_mut().gen_range(0..MOVE_KINDS);

    let before_assignment = instance.assignment.clone();
    let before_roster = instance.roster.clone();
    let before_night_runs = instance.night_runs.clone();

    let touched = match kind {
        0 => reassign_move(instance, rng),
        1 => swap_move(instance, rng),
        2 => fill_optional_move(instance, rng),
        3 => drop_optional_move(instance, rng),
        _ => night_run_reshape_move(instance, rng),
    };

    let Some(touched) = touched else {
        return false;
    };

    let delta = scorer.score_delta(
        &touched,
        &before_assignment,
        &instance.assignment,
        &instance.roster,
        &instance.shifts_by_key,
    );

    // The full-vs-delta bug check from §9: whenever we're about to trust the
    // incremental score for an accept/reject decision, a debug build confirms
    // it agrees with a full recompute.
    debug_assert!(
        {
            let before_full = scorer.score(&before_assignment, &before_roster, &instance.shifts_by_key);
            let after_full = scorer.score(&instance.assignment, &instance.roster, &instance.shifts_by_key);
            (after_full - before_full - delta).abs() < 1e-6
        },
        "score_delta diverged from a full recompute"
    );

    if accept(delta, temperature, rng) {
        true
    } else {
        instance.assignment = before_assignment;
        instance.roster = before_roster;
        instance.night_runs = before_night_runs;
        false
    }
}

fn accept(delta: f64, temperature: f64, rng: &mut SolverRng) -> bool {
    if delta <= 0.0 {
        return true;
    }
    if temperature <= 0.0 {
        return false;
    }
    let probability = (-delta / (temperature.max(1e-6) * 50.0)).exp();
    rng.inner_mut().gen::<f64>() < probability
}

/// Replaces one required day-shift's occupant with a different eligible,
/// legal resident.
fn reassign_move(instance: &mut Instance, rng: &mut SolverRng) -> Option<Vec<ResidentHandle>> {
    let mut keys: Vec<ShiftKey> = instance
        .assignment
        .all_keys()
        .filter(|k| instance.assignment.is_filled(k))
        .filter(|k| !instance.shifts_by_key[k].is_night())
        .cloned()
        .collect();
    keys.shuffle(rng.inner_mut());
    let key = keys.into_iter().next()?;

    let shift = instance.shifts_by_key.get(&key)?.clone();
    let current = instance.assignment.resident_at(&key).cloned()?;

    let mut candidates: Vec<ResidentHandle> = instance
        .roster
        .schedulable()
        .filter(|r| r.handle != current)
        .filter(|r| shift.eligible_pgy.contains(&r.pgy))
        .map(|r| r.handle.clone())
        .collect();
    candidates.shuffle(rng.inner_mut());

    for candidate in candidates {
        if instance.legal(&candidate, &key, true) {
            instance.place(&key, candidate.clone());
            return Some(vec![current, candidate]);
        }
    }
    None
}

/// Swaps the occupants of two filled non-night required shifts, if both
/// directions are legal once the pair is unplaced.
fn swap_move(instance: &mut Instance, rng: &mut SolverRng) -> Option<Vec<ResidentHandle>> {
    let mut keys: Vec<ShiftKey> = instance
        .assignment
        .all_keys()
        .filter(|k| instance.assignment.is_filled(k))
        .filter(|k| !instance.shifts_by_key[k].is_night())
        .cloned()
        .collect();
    if keys.len() < 2 {
        return None;
    }
    keys.shuffle(rng.inner_mut());
    let key_a = keys[0].clone();
    let key_b = keys[1].clone();

    let resident_a = instance.assignment.resident_at(&key_a).cloned()?;
    let resident_b = instance.assignment.resident_at(&key_b).cloned()?;
    if resident_a == resident_b {
        return None;
    }

    let shift_a = instance.shifts_by_key[&key_a].clone();
    let shift_b = instance.shifts_by_key[&key_b].clone();
    let pgy_a = instance.roster.get(&resident_a)?.pgy;
    let pgy_b = instance.roster.get(&resident_b)?.pgy;
    if !shift_a.eligible_pgy.contains(&pgy_b) || !shift_b.eligible_pgy.contains(&pgy_a) {
        return None;
    }

    instance.unplace(&key_a);
    instance.unplace(&key_b);

    let a_to_b_legal = instance.legal(&resident_a, &key_b, true);
    let b_to_a_legal = instance.legal(&resident_b, &key_a, true);

    if a_to_b_legal && b_to_a_legal {
        instance.place(&key_b, resident_a.clone());
        instance.place(&key_a, resident_b.clone());
        Some(vec![resident_a, resident_b])
    } else {
        instance.place(&key_a, resident_a);
        instance.place(&key_b, resident_b);
        None
    }
}

/// Fills one currently-empty optional shift with an eligible, legal resident.
fn fill_optional_move(instance: &mut Instance, rng: &mut SolverRng) -> Option<Vec<ResidentHandle>> {
    let mut keys: Vec<ShiftKey> = instance
        .assignment
        .all_keys()
        .filter(|k| !instance.assignment.is_filled(k))
        .filter(|k| !instance.shifts_by_key[k].required)
        .cloned()
        .collect();
    keys.shuffle(rng.inner_mut());
    let key = keys.into_iter().next()?;
    let shift = instance.shifts_by_key.get(&key)?.clone();

    let mut candidates: Vec<ResidentHandle> = instance
        .roster
        .schedulable()
        .filter(|r| shift.eligible_pgy.contains(&r.pgy))
        .map(|r| r.handle.clone())
        .collect();
    candidates.shuffle(rng.inner_mut());

    for candidate in candidates {
        if instance.legal(&candidate, &key, true) {
            instance.place(&key, candidate.clone());
            return Some(vec![candidate]);
        }
    }
    None
}

/// Empties one currently-filled optional shift.
fn drop_optional_move(instance: &mut Instance, rng: &mut SolverRng) -> Option<Vec<ResidentHandle>> {
    let mut keys: Vec<ShiftKey> = instance
        .assignment
        .all_keys()
        .filter(|k| instance.assignment.is_filled(k))
        .filter(|k| !instance.shifts_by_key[k].required)
        .cloned()
        .collect();
    keys.shuffle(rng.inner_mut());
    let key = keys.into_iter().next()?;
    let handle = instance.unplace(&key)?;
    Some(vec![handle])
}

/// Reassigns an entire night-run to a different eligible resident, keeping
/// its dates, length, and hospital alternation intact.
fn night_run_reshape_move(instance: &mut Instance, rng: &mut SolverRng) -> Option<Vec<ResidentHandle>> {
    if instance.night_runs.is_empty() {
        return None;
    }
    let run_idx = rng.inner_mut().gen_range(0..instance.night_runs.len());
    let run = instance.night_runs[run_idx].clone();

    let eligible_pgy = instance
        .shifts_by_key
        .values()
        .find(|s| s.team == run.team && s.is_night())?
        .eligible_pgy
        .clone();

    let night_keys: Vec<ShiftKey> = run
        .dates()
        .filter_map(|d| night_shift_key(instance, d, run.team))
        .collect();
    if night_keys.len() != run.length as usize {
        return None;
    }

    let mut candidates: Vec<ResidentHandle> = instance
        .roster
        .schedulable()
        .filter(|r| r.handle != run.resident)
        .filter(|r| eligible_pgy.contains(&r.pgy))
        .map(|r| r.handle.clone())
        .collect();
    candidates.shuffle(rng.inner_mut());

    for key in &night_keys {
        instance.unplace(key);
    }

    for candidate in candidates {
        let all_legal = night_keys.iter().all(|k| instance.legal(&candidate, k, true));
        if all_legal {
            for key in &night_keys {
                instance.place(key, candidate.clone());
            }
            let mut reshaped = run.reshaped_for(candidate.clone());
            for _ in 0..run.length {
                reshaped.mark_night_placed();
            }
            instance.night_runs[run_idx] = reshaped;
            return Some(vec![run.resident.clone(), candidate]);
        }
    }

    for key in &night_keys {
        instance.place(key, run.resident.clone());
    }
    None
}

fn night_shift_key(instance: &Instance, date: NaiveDate, team: Team) -> Option<ShiftKey> {
    instance
        .shifts_by_key
        .values()
        .find(|s| s.key.date == date && s.team == team && s.is_night())
        .map(|s| s.key.clone())
}

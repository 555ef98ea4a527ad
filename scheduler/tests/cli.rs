//! CLI-level integration tests: invokes the built binary against fixture
//! roster CSVs and asserts on exit code and the emitted schedule, per §8's
//! CLI-level test requirements.

use assert_cmd::Command;
use predicates::str::contains;
use std::io::Write;
use tempfile::NamedTempFile;

fn roster_fixture(body: &str) -> NamedTempFile {
    let mut file = NamedTempFile::new().unwrap();
    writeln!(file, "handle,pgy,service,hour_target,requests,chief").unwrap();
    write!(file, "{body}").unwrap();
    file
}

/// A roster with exactly one resident per team/role, generous enough that the
/// whole 4-day horizon solves: one day-shift resident and one night-run
/// resident for each of R, G, I, plus one each for E, B, and P.
fn well_staffed_roster() -> NamedTempFile {
    roster_fixture(
        "r-day,3,ED,200,,false\n\
         r-night,3,ED,200,,false\n\
         g-day,2,ED,200,,false\n\
         g-night,2,ED,200,,false\n\
         i-day,1,ED,200,,false\n\
         i-night,1,ED,200,,false\n\
         e-day,1,ED,200,,false\n\
         b-day,1,ED,200,,false\n\
         p-day,1,ED,200,,false\n",
    )
}

#[test]
fn full_four_day_horizon_emits_a_completely_filled_schedule() {
    let roster = well_staffed_roster();
    let out = NamedTempFile::new().unwrap();

    Command::cargo_bin("resident-scheduler")
        .unwrap()
        .args([
            "--start",
            "2026-07-06", // a Monday; the horizon also covers that week's Wednesday
            "--days",
            "4",
            "--roster",
        ])
        .arg(roster.path())
        .args(["--seed", "1", "--out"])
        .arg(out.path())
        .assert()
        .success();

    let written = std::fs::read_to_string(out.path()).unwrap();
    let mut lines = written.lines();
    assert_eq!(lines.next(), Some("date,code,resident"));
    // 10 shift-instance rows/day (R/G/I day+night, E, B, P required, P optional) * 4 days.
    assert_eq!(lines.count(), 40);
    assert!(!written.contains(",LR7,\n"), "R-team day shift must be filled");
}

#[test]
fn malformed_service_column_exits_with_input_error() {
    let roster = roster_fixture("r1,3,Nights,180,,false\n");

    Command::cargo_bin("resident-scheduler")
        .unwrap()
        .args(["--start", "2026-07-06", "--days", "4", "--roster"])
        .arg(roster.path())
        .assert()
        .failure()
        .code(1)
        .stderr(contains("service"));
}

#[test]
fn a_single_pgy3_cannot_cover_both_the_r_night_run_and_the_daily_r_day_shift() {
    let roster = roster_fixture(
        "r-only,3,ED,200,,false\n\
         g-day,2,ED,200,,false\n\
         g-night,2,ED,200,,false\n\
         i-day,1,ED,200,,false\n\
         i-night,1,ED,200,,false\n\
         e-day,1,ED,200,,false\n\
         b-day,1,ED,200,,false\n\
         p-day,1,ED,200,,false\n",
    );

    Command::cargo_bin("resident-scheduler")
        .unwrap()
        .args(["--start", "2026-07-06", "--days", "4", "--roster"])
        .arg(roster.path())
        .args(["--seed", "1"])
        .assert()
        .failure()
        .code(2)
        .stderr(contains("infeasible"));
}

//! Emitter: renders a solved instance as the output CSV, one row per
//! shift-instance in chronological order, `resident` empty for an unfilled
//! optional shift.

use crate::solver::Instance;
use shared::{ScheduleError, ScheduleResult};
use std::io::Write;

pub fn emit<W: Write>(instance: &Instance, writer: W) -> ScheduleResult<()> {
    let mut csv_writer = csv::Writer::from_writer(writer);
    csv_writer
        .write_record(["date", "code", "resident"])
        .map_err(emit_err)?;

    let mut keys: Vec<_> = instance.assignment.all_keys().cloned().collect();
    keys.sort();

    for key in &keys {
        let resident = instance.assignment.resident_at(key).map(String::as_str).unwrap_or("");
        csv_writer
            .write_record([key.date.to_string().as_str(), key.code.as_str(), resident])
            .map_err(emit_err)?;
    }

    csv_writer.flush().map_err(|e| ScheduleError::input("emitter", e.to_string()))?;
    Ok(())
}

fn emit_err(e: csv::Error) -> ScheduleError {
    ScheduleError::input("emitter", e.to_string())
}

//! Roster Loader: ingests the resident table CSV into an in-memory roster.

use crate::domain::Resident;
use shared::{Pgy, ScheduleError, ScheduleResult, Service};
use std::collections::{HashMap, HashSet};
use std::path::Path;

#[derive(Debug, Clone, Default)]
pub struct Roster {
    residents: HashMap<String, Resident>,
}

impl Roster {
    /// Builds a roster directly from residents already in memory — used by
    /// the solver's unit tests and by callers that construct residents
    /// programmatically rather than from a CSV file.
    pub fn from_residents(residents: impl IntoIterator<Item = Resident>) -> Self {
        Self {
            residents: residents.into_iter().map(|r| (r.handle.clone(), r)).collect(),
        }
    }

    pub fn from_csv(path: &Path) -> ScheduleResult<Self> {
        let mut reader = csv::Reader::from_path(path).map_err(|e| {
            ScheduleError::input("roster", format!("cannot read {}: {e}", path.display()))
        })?;

        let mut residents = HashMap::new();
        for (idx, record) in reader.records().enumerate() {
            let row_num = idx + 2; // header is row 1
            let record = record
                .map_err(|e| ScheduleError::input(format!("roster row {row_num}"), e.to_string()))?;
            let resident = parse_row(&record, row_num)?;

            if residents.contains_key(&resident.handle) {
                return Err(ScheduleError::input(
                    format!("roster row {row_num}"),
                    format!("duplicate resident handle {:?}", resident.handle),
                ));
            }
            residents.insert(resident.handle.clone(), resident);
        }

        Ok(Self { residents })
    }

    pub fn residents(&self) -> impl Iterator<Item = &Resident> {
        self.residents.values()
    }

    pub fn residents_mut(&mut self) -> impl Iterator<Item = &mut Resident> {
        self.residents.values_mut()
    }

    pub fn get(&self, handle: &str) -> Option<&Resident> {
        self.residents.get(handle)
    }

    pub fn get_mut(&mut self, handle: &str) -> Option<&mut Resident> {
        self.residents.get_mut(handle)
    }

    pub fn len(&self) -> usize {
        self.residents.len()
    }

    pub fn is_empty(&self) -> bool {
        self.residents.is_empty()
    }

    pub fn schedulable(&self) -> impl Iterator<Item = &Resident> {
        self.residents().filter(|r| r.is_schedulable())
    }
}

fn parse_row(record: &csv::StringRecord, row_num: usize) -> ScheduleResult<Resident> {
    let loc = || format!("roster row {row_num}");

    let handle = record
        .get(0)
        .map(str::trim)
        .filter(|h| !h.is_empty())
        .ok_or_else(|| ScheduleError::input(loc(), "missing handle"))?
        .to_string();

    let pgy: Pgy = record
        .get(1)
        .unwrap_or("")
        .parse()
        .map_err(|_| ScheduleError::input(loc(), "invalid pgy column"))?;

    let service: Service = record
        .get(2)
        .unwrap_or("")
        .parse()
        .map_err(|_| ScheduleError::input(loc(), "invalid service column"))?;

    let hour_target: u32 = record
        .get(3)
        .unwrap_or("")
        .trim()
        .parse()
        .map_err(|_| ScheduleError::input(loc(), "invalid hour_target column, expected an integer"))?;

    let requests = parse_requests(record.get(4).unwrap_or(""), row_num)?;

    let chief = record
        .get(5)
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(|s| match s.to_ascii_lowercase().as_str() {
            "true" | "1" | "yes" => Ok(true),
            "false" | "0" | "no" => Ok(false),
            other => Err(ScheduleError::input(
                loc(),
                format!("invalid chief column {other:?}"),
            )),
        })
        .transpose()?
        .unwrap_or(false);

    let mut resident = Resident::new(handle, pgy, service, hour_target);
    resident.chief = chief;
    resident.requests = requests;
    Ok(resident)
}

/// Parses `M/D` comma-separated dates. The roster carries no year; a parsed
/// pair matches a calendar date in any year, via `Resident::requested_off`.
fn parse_requests(raw: &str, row_num: usize) -> ScheduleResult<HashSet<(u32, u32)>> {
    let raw = raw.trim();
    if raw.is_empty() {
        return Ok(HashSet::new());
    }
    let mut out = HashSet::new();
    for part in raw.split(',') {
        let part = part.trim();
        if part.is_empty() {
            continue;
        }
        let mut pieces = part.splitn(2, '/');
        let month: u32 = pieces
            .next()
            .and_then(|m| m.parse().ok())
            .filter(|m| (1..=12).contains(m))
            .ok_or_else(|| {
                ScheduleError::input(format!("roster row {row_num}"), format!("invalid request date {part:?}"))
            })?;
        let day: u32 = pieces
            .next()
            .and_then(|d| d.parse().ok())
            .filter(|d| (1..=31).contains(d))
            .ok_or_else(|| {
                ScheduleError::input(format!("roster row {row_num}"), format!("invalid request date {part:?}"))
            })?;
        out.insert((month, day));
    }
    Ok(out)
}

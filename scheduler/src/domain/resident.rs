//! Resident: an opaque handle plus the static facts and running totals the
//! constraint model and solver need.

use chrono::{Datelike, NaiveDate};
use serde::{Deserialize, Serialize};
use shared::{Pgy, Service};
use std::collections::HashSet;

pub type ResidentHandle = String;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Resident {
    pub handle: ResidentHandle,
    pub pgy: Pgy,
    pub service: Service,
    pub hour_target: u32,
    pub chief: bool,
    /// Requested days off, as `(month, day)` pairs — the roster carries no
    /// year, so a request matches that month/day in any year of the horizon.
    pub requests: HashSet<(u32, u32)>,
    #[serde(skip)]
    pub state: ResidentState,
}

impl Resident {
    pub fn new(handle: impl Into<String>, pgy: Pgy, service: Service, hour_target: u32) -> Self {
        Self {
            handle: handle.into(),
            pgy,
            service,
            hour_target,
            chief: false,
            requests: HashSet::new(),
            state: ResidentState::default(),
        }
    }

    pub fn is_schedulable(&self) -> bool {
        self.service.is_schedulable()
    }

    pub fn hours_deficit(&self) -> f64 {
        (self.hour_target as f64 - self.state.assigned_hours as f64).max(0.0)
    }

    pub fn requested_off(&self, date: NaiveDate) -> bool {
        self.requests.contains(&(date.month(), date.day()))
    }
}

/// Running totals maintained incrementally as the solver places and removes
/// assignments. Rebuilt from scratch for a fresh `Resident`; never serialized.
#[derive(Debug, Clone, Default)]
pub struct ResidentState {
    pub assigned_hours: u32,
    pub nights_worked: u32,
}

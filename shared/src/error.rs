use thiserror::Error;

/// The three error kinds a solve can fail with. Exit-code mapping lives in the
/// CLI binary, not here, since this crate doesn't know about process exit codes.
#[derive(Error, Debug)]
pub enum ScheduleError {
    #[error("invalid input at {location}: {message}")]
    Input { location: String, message: String },

    #[error("infeasible: no legal resident for {shift} on {date} after exhausting backtracking budget (candidates: {candidates})")]
    Infeasible {
        date: String,
        shift: String,
        candidates: String,
    },

    #[error("internal invariant violation: {0}")]
    Invariant(String),
}

impl ScheduleError {
    pub fn input(location: impl Into<String>, message: impl Into<String>) -> Self {
        Self::Input {
            location: location.into(),
            message: message.into(),
        }
    }
}

pub type ScheduleResult<T> = Result<T, ScheduleError>;

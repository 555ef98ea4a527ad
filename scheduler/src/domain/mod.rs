pub mod assignment;
pub mod night_run;
pub mod resident;
pub mod shift;

pub use assignment::Assignment;
pub use night_run::{NightRun, NightRunStatus};
pub use resident::{Resident, ResidentHandle, ResidentState};
pub use shift::{instant, Instant, ShiftInstance, ShiftKey};

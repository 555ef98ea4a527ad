//! Resident-scheduler library: the pipeline stages used by the `resident-scheduler`
//! binary, exposed as a library so the CLI-level integration tests under
//! `tests/` can drive it without shelling out for every assertion that only
//! needs the solved instance.

pub mod config;
pub mod constraints;
pub mod domain;
pub mod emitter;
pub mod roster;
pub mod scorer;
pub mod solver;
pub mod template;

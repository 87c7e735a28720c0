//! Simulation error types.
//!
//! Follows the teacher's `OsrmSpawnError` shape (`routing/osrm_spawn/error.rs`):
//! a plain `#[derive(Debug)]` enum with a manual `Display`/`Error` impl, no
//! `thiserror`. `InvalidTransition` and `NoMorePassengers` are *not* members
//! of this enum — per spec.md §7 they are recoverable, non-propagating
//! signals (a refused transition is logged and ignored; "no more passengers"
//! is modeled as `Option::None`, never raised as an error).

use std::fmt;

/// Errors that can surface from the simulation engine.
#[derive(Debug, Clone, PartialEq)]
pub enum SimError {
    /// The routing service reports that two points are mutually unreachable.
    NoRoute,
    /// A configuration was rejected at construction time (never at tick time).
    ImproperConfig(String),
}

impl fmt::Display for SimError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SimError::NoRoute => write!(f, "no route between the given points"),
            SimError::ImproperConfig(msg) => write!(f, "improper configuration: {msg}"),
        }
    }
}

impl std::error::Error for SimError {}

pub type SimResult<T> = Result<T, SimError>;

//! Waypoint navigation for Astrolabe
//!
//! This module moves the robot to a target pose with confirmed arrival:
//! a move command is issued (with bounded retries), then telemetry is polled
//! until the position converges inside a tolerance or a deadline elapses.
//! Every outcome is an ordinary value; navigation never panics and never
//! aborts the mission on its own.

mod navigator;

pub use navigator::{DEFAULT_POLL_INTERVAL, Navigator};

use std::time::Duration;

use crate::pose::Pose;

/// One navigation request: where to go and how patiently.
#[derive(Debug, Clone)]
pub struct MoveRequest {
    /// Target pose in the world frame.
    pub target: Pose,
    /// Arrival tolerance in meters; arrival means distance strictly below this.
    pub tolerance_m: f64,
    /// Additional command attempts after the first rejection (total attempts
    /// is `command_retries + 1`).
    pub command_retries: u32,
    /// Deadline for the polling phase, measured from its start.
    pub arrival_timeout: Duration,
}

impl MoveRequest {
    /// Builds a validated request. Tolerance and timeout must be positive and
    /// the target pose finite.
    pub fn new(
        target: Pose,
        tolerance_m: f64,
        command_retries: u32,
        arrival_timeout: Duration,
    ) -> Result<Self, NavigationError> {
        if !target.is_finite() {
            return Err(NavigationError::NonFiniteTarget);
        }
        if !(tolerance_m > 0.0) || !tolerance_m.is_finite() {
            return Err(NavigationError::InvalidTolerance(tolerance_m));
        }
        if arrival_timeout.is_zero() {
            return Err(NavigationError::InvalidTimeout);
        }
        Ok(MoveRequest {
            target,
            tolerance_m,
            command_retries,
            arrival_timeout,
        })
    }
}

/// Result of one navigation call. Never partially valid.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MoveOutcome {
    /// Position converged inside the tolerance.
    Arrived,
    /// The robot rejected the move command on every attempt.
    CommandFailed,
    /// The command was accepted but arrival was not confirmed in time.
    TimedOut,
}

/// Navigation error types
#[derive(Debug)]
pub enum NavigationError {
    /// Tolerance was zero, negative or non-finite.
    InvalidTolerance(f64),
    /// Arrival timeout was zero.
    InvalidTimeout,
    /// Target pose had non-finite coordinates.
    NonFiniteTarget,
}

impl std::fmt::Display for NavigationError {
    fn fmt(&self, f: &mut std::fmt::Formatter) -> std::fmt::Result {
        match self {
            NavigationError::InvalidTolerance(t) => {
                write!(f, "invalid arrival tolerance: {} m", t)
            }
            NavigationError::InvalidTimeout => write!(f, "arrival timeout must be positive"),
            NavigationError::NonFiniteTarget => write!(f, "target pose has non-finite coordinates"),
        }
    }
}

impl std::error::Error for NavigationError {}

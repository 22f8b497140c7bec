// src/navigation/navigator.rs

// Issues a move command with bounded retries, then polls telemetry until the
// robot converges on the target or the deadline elapses. The two phases are
// separate functions returning tagged results; move_to only sequences them.

// Dependencies
use log::{debug, error, info, warn};
use std::time::{Duration, Instant};

use super::{MoveOutcome, MoveRequest};
use crate::platform::{MotionSystem, PlatformError, TelemetrySource};

/// Default pause between telemetry samples while waiting for arrival.
pub const DEFAULT_POLL_INTERVAL: Duration = Duration::from_millis(250);

/// Moves the robot to waypoints with confirmed arrival.
///
/// Stateless between calls; the only configuration is the telemetry poll
/// interval, which exists so tests can run the polling loop at full speed.
#[derive(Debug, Clone)]
pub struct Navigator {
    poll_interval: Duration,
}

impl Default for Navigator {
    fn default() -> Self {
        Navigator::new(DEFAULT_POLL_INTERVAL)
    }
}

impl Navigator {
    /// Creates a navigator with the given telemetry poll interval.
    pub fn new(poll_interval: Duration) -> Self {
        Navigator { poll_interval }
    }

    /// Executes one navigation request: command phase, then polling phase.
    ///
    /// Returns `CommandFailed` without entering the polling phase when every
    /// command attempt is rejected; otherwise polls until `Arrived` or
    /// `TimedOut`. The call blocks the current thread for the duration.
    pub fn move_to<P>(&self, platform: &mut P, request: &MoveRequest) -> MoveOutcome
    where
        P: MotionSystem + TelemetrySource + ?Sized,
    {
        if let Err(e) = self.issue_command(platform, request) {
            error!("move command failed after retries: {}", e);
            return MoveOutcome::CommandFailed;
        }
        self.await_arrival(platform, request)
    }

    /// Command phase: issue the move, retrying rejected commands immediately
    /// (no backoff) up to `request.command_retries` additional times.
    pub fn issue_command<M>(&self, motion: &mut M, request: &MoveRequest) -> Result<(), PlatformError>
    where
        M: MotionSystem + ?Sized,
    {
        let attempts = request.command_retries + 1;
        let mut attempt = 0;
        loop {
            attempt += 1;
            match motion.command_move(&request.target) {
                Ok(()) => {
                    debug!("move command accepted on attempt {}/{}", attempt, attempts);
                    return Ok(());
                }
                Err(e) if attempt >= attempts => return Err(e),
                Err(e) => {
                    warn!("move command rejected (attempt {}/{}): {}", attempt, attempts, e);
                }
            }
        }
    }

    /// Polling phase: sample position until distance to the target drops
    /// strictly below the tolerance, or the deadline elapses.
    ///
    /// The first sample happens before any sleep, so a robot already inside
    /// tolerance yields `Arrived` immediately.
    pub fn await_arrival<T>(&self, telemetry: &mut T, request: &MoveRequest) -> MoveOutcome
    where
        T: TelemetrySource + ?Sized,
    {
        let started = Instant::now();
        loop {
            let position = telemetry.current_position();
            let distance = request.target.distance_to(&position);
            if distance < request.tolerance_m {
                info!("arrived: {:.3} m from target", distance);
                return MoveOutcome::Arrived;
            }
            if started.elapsed() > request.arrival_timeout {
                error!(
                    "timed out waiting for arrival: still {:.3} m from target after {:?}",
                    distance, request.arrival_timeout
                );
                return MoveOutcome::TimedOut;
            }
            debug!("awaiting arrival: {:.3} m from target", distance);
            std::thread::sleep(self.poll_interval);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::pose::Pose;
    use mockall::{Sequence, mock};
    use nalgebra::Point3;
    use std::sync::Arc;
    use std::sync::atomic::{AtomicUsize, Ordering};

    mock! {
        Robot {}

        impl MotionSystem for Robot {
            fn command_move(&mut self, target: &Pose) -> Result<(), PlatformError>;
        }

        impl TelemetrySource for Robot {
            fn current_position(&mut self) -> Point3<f64>;
        }
    }

    fn request(tolerance_m: f64, retries: u32, timeout_ms: u64) -> MoveRequest {
        let target = Pose::from_parts([10.0, -9.0, 5.0], [0.0, 0.0, 0.0, 1.0]).unwrap();
        MoveRequest::new(target, tolerance_m, retries, Duration::from_millis(timeout_ms)).unwrap()
    }

    fn fast_navigator() -> Navigator {
        Navigator::new(Duration::from_millis(1))
    }

    #[test]
    fn arrives_with_single_sample_when_already_in_tolerance() {
        let mut robot = MockRobot::new();
        robot.expect_command_move().times(1).returning(|_| Ok(()));
        // Exactly one telemetry sample; a second call would fail the mock.
        robot
            .expect_current_position()
            .times(1)
            .returning(|| Point3::new(10.0, -9.0, 5.01));

        let outcome = fast_navigator().move_to(&mut robot, &request(0.05, 0, 1_000));
        assert_eq!(outcome, MoveOutcome::Arrived);
    }

    #[test]
    fn arrives_after_position_converges() {
        let mut robot = MockRobot::new();
        robot.expect_command_move().times(1).returning(|_| Ok(()));

        let samples = Arc::new(AtomicUsize::new(0));
        let counter = samples.clone();
        robot.expect_current_position().returning(move || {
            // Two samples out of tolerance, then converged.
            if counter.fetch_add(1, Ordering::SeqCst) < 2 {
                Point3::new(8.0, -9.0, 5.0)
            } else {
                Point3::new(10.0, -9.0, 5.0)
            }
        });

        let outcome = fast_navigator().move_to(&mut robot, &request(0.05, 0, 1_000));
        assert_eq!(outcome, MoveOutcome::Arrived);
        assert_eq!(samples.load(Ordering::SeqCst), 3);
    }

    #[test]
    fn command_failure_is_retried_until_acceptance() {
        let mut robot = MockRobot::new();
        let mut seq = Sequence::new();
        // Two rejections, then acceptance: within the retries=2 budget.
        robot
            .expect_command_move()
            .times(2)
            .in_sequence(&mut seq)
            .returning(|_| Err(PlatformError::CommandRejected("robot busy".into())));
        robot
            .expect_command_move()
            .times(1)
            .in_sequence(&mut seq)
            .returning(|_| Ok(()));
        robot
            .expect_current_position()
            .returning(|| Point3::new(10.0, -9.0, 5.0));

        let outcome = fast_navigator().move_to(&mut robot, &request(0.05, 2, 1_000));
        assert_eq!(outcome, MoveOutcome::Arrived);
    }

    #[test]
    fn command_failed_after_exhausting_all_attempts() {
        let mut robot = MockRobot::new();
        // retries=2 means exactly three attempts, and no polling afterwards.
        robot
            .expect_command_move()
            .times(3)
            .returning(|_| Err(PlatformError::CommandRejected("robot busy".into())));
        robot.expect_current_position().times(0);

        let outcome = fast_navigator().move_to(&mut robot, &request(0.05, 2, 1_000));
        assert_eq!(outcome, MoveOutcome::CommandFailed);
    }

    #[test]
    fn zero_retries_means_single_attempt() {
        let mut robot = MockRobot::new();
        robot
            .expect_command_move()
            .times(1)
            .returning(|_| Err(PlatformError::CommandRejected("robot busy".into())));
        robot.expect_current_position().times(0);

        let outcome = fast_navigator().move_to(&mut robot, &request(0.05, 0, 1_000));
        assert_eq!(outcome, MoveOutcome::CommandFailed);
    }

    #[test]
    fn times_out_when_position_never_converges() {
        let mut robot = MockRobot::new();
        robot.expect_command_move().times(1).returning(|_| Ok(()));
        robot
            .expect_current_position()
            .returning(|| Point3::new(0.0, 0.0, 0.0));

        let started = Instant::now();
        let outcome = fast_navigator().move_to(&mut robot, &request(0.05, 0, 20));
        assert_eq!(outcome, MoveOutcome::TimedOut);
        assert!(started.elapsed() >= Duration::from_millis(20));
    }

    #[test]
    fn arrival_requires_distance_strictly_below_tolerance() {
        let mut robot = MockRobot::new();
        // Exactly on the tolerance boundary: not arrived.
        robot
            .expect_current_position()
            .returning(|| Point3::new(10.05, -9.0, 5.0));

        let outcome = fast_navigator().await_arrival(&mut robot, &request(0.05, 0, 20));
        assert_eq!(outcome, MoveOutcome::TimedOut);
    }
}

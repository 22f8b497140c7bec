//! Robot platform capabilities for Astrolabe
//!
//! This module defines the seams between the mission logic and the physical
//! robot. Motion, telemetry, cameras and mission reporting are each a small
//! trait; the mission driver is written against the traits and never against
//! a concrete robot. Two adapters live here:
//! - [`sim`]: a kinematic stand-in used by the demo binary and the tests
//! - `ros`: an r2r-backed ROS 2 adapter (behind the `ros` cargo feature)

pub mod sim;

#[cfg(feature = "ros")]
pub mod ros;

use nalgebra::Point3;

use crate::pose::Pose;

/// Which onboard camera to capture from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum CameraKind {
    /// Forward-facing navigation camera.
    Navigation,
    /// Dock-facing camera.
    Dock,
}

/// A single captured image frame.
///
/// The mission logic never decodes pixels; frames are carried opaquely from
/// the camera to whatever detector backend is in use.
#[derive(Debug, Clone, PartialEq)]
pub struct Frame {
    /// Width in pixels.
    pub width: u32,
    /// Height in pixels.
    pub height: u32,
    /// Raw pixel bytes, layout defined by the producing camera.
    pub data: Vec<u8>,
}

/// Errors raised by a platform adapter.
#[derive(Debug)]
pub enum PlatformError {
    /// The robot rejected a motion command.
    CommandRejected(String),
    /// The adapter could not be constructed or connected.
    Init(String),
    /// A requested sample or resource is not available.
    Unavailable(String),
}

impl std::fmt::Display for PlatformError {
    fn fmt(&self, f: &mut std::fmt::Formatter) -> std::fmt::Result {
        match self {
            PlatformError::CommandRejected(msg) => write!(f, "move command rejected: {}", msg),
            PlatformError::Init(msg) => write!(f, "platform init failed: {}", msg),
            PlatformError::Unavailable(msg) => write!(f, "platform unavailable: {}", msg),
        }
    }
}

impl std::error::Error for PlatformError {}

/// Issues motion commands to the robot.
///
/// A successful return means the command was accepted, not that the robot
/// has arrived; arrival is confirmed separately through telemetry.
pub trait MotionSystem {
    /// Command the robot to move to `target`.
    fn command_move(&mut self, target: &Pose) -> Result<(), PlatformError>;
}

/// Reads the robot's current position on demand.
pub trait TelemetrySource {
    /// Latest known position in the world frame.
    fn current_position(&mut self) -> Point3<f64>;
}

/// Captures single frames from an onboard camera.
pub trait CameraSource {
    /// Capture one frame, or `None` when the capture failed. Callers treat
    /// an absent frame as "skip this observation", never as a fatal error.
    fn capture(&mut self, camera: CameraKind) -> Option<Frame>;
}

/// Fire-and-forget mission reporting channel.
///
/// Nothing here returns a result; a lost report degrades scoring, not the
/// mission, so failures stay inside the adapter.
pub trait MissionReporter {
    /// The mission clock has started.
    fn mission_started(&mut self);
    /// An item was identified at a survey site.
    fn site_info(&mut self, site: u32, label: &str, count: u32);
    /// All survey sites have been visited.
    fn patrol_complete(&mut self);
    /// The target item has been recognized from the operator's clue.
    fn target_recognized(&mut self);
    /// The final snapshot of the target item was taken.
    fn target_snapshot(&mut self);
    /// The mission is over.
    fn mission_complete(&mut self);
}

/// A complete robot platform: motion, telemetry, cameras and reporting.
pub trait Platform: MotionSystem + TelemetrySource + CameraSource + MissionReporter {}

impl<T> Platform for T where T: MotionSystem + TelemetrySource + CameraSource + MissionReporter {}

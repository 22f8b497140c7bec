// src/platform/sim.rs

//! Simulated free-flyer platform for demos and tests. Motion teleports to the
//! commanded pose (or stalls, when disabled), captures pop scripted frames
//! from a queue, and every reporter call is recorded for later inspection.
//! Frames carry a one-byte tag that the scripted detector maps to canned
//! detections.

// Dependencies
use log::{debug, info};
use nalgebra::Point3;
use std::collections::{HashMap, VecDeque};

use super::{
    CameraKind, CameraSource, Frame, MissionReporter, MotionSystem, PlatformError,
    TelemetrySource,
};
use crate::perception::{Detection, ItemDetector};
use crate::pose::Pose;

/// A reporter call observed by the simulated platform.
#[derive(Debug, Clone, PartialEq)]
pub enum ReportEvent {
    /// `mission_started` was called.
    MissionStarted,
    /// `site_info` was called with these values.
    SiteInfo {
        /// Reported site.
        site: u32,
        /// Reported label.
        label: String,
        /// Reported count.
        count: u32,
    },
    /// `patrol_complete` was called.
    PatrolComplete,
    /// `target_recognized` was called.
    TargetRecognized,
    /// `target_snapshot` was called.
    TargetSnapshot,
    /// `mission_complete` was called.
    MissionComplete,
}

/// Kinematic stand-in for the real robot.
pub struct SimPlatform {
    position: Point3<f64>,
    motion_enabled: bool,
    remaining_command_failures: u32,
    frames: VecDeque<Option<Frame>>,
    events: Vec<ReportEvent>,
}

impl SimPlatform {
    /// Creates a platform holding position at `start`.
    pub fn new(start: Point3<f64>) -> Self {
        SimPlatform {
            position: start,
            motion_enabled: true,
            remaining_command_failures: 0,
            frames: VecDeque::new(),
            events: Vec::new(),
        }
    }

    /// Rejects the next `n` move commands before accepting again.
    pub fn fail_next_commands(&mut self, n: u32) {
        self.remaining_command_failures = n;
    }

    /// When disabled, commands are accepted but the position never changes,
    /// so every arrival wait runs into its deadline.
    pub fn set_motion_enabled(&mut self, enabled: bool) {
        self.motion_enabled = enabled;
    }

    /// Queues a frame for the next capture.
    pub fn push_frame(&mut self, frame: Frame) {
        self.frames.push_back(Some(frame));
    }

    /// Queues a failed capture.
    pub fn push_capture_failure(&mut self) {
        self.frames.push_back(None);
    }

    /// Reporter calls observed so far, in order.
    pub fn events(&self) -> &[ReportEvent] {
        &self.events
    }
}

impl MotionSystem for SimPlatform {
    fn command_move(&mut self, target: &Pose) -> Result<(), PlatformError> {
        if self.remaining_command_failures > 0 {
            self.remaining_command_failures -= 1;
            return Err(PlatformError::CommandRejected("sim: scripted rejection".into()));
        }
        if self.motion_enabled {
            self.position = target.position;
        }
        debug!("sim: move command accepted, target {:?}", target.position);
        Ok(())
    }
}

impl TelemetrySource for SimPlatform {
    fn current_position(&mut self) -> Point3<f64> {
        self.position
    }
}

impl CameraSource for SimPlatform {
    fn capture(&mut self, camera: CameraKind) -> Option<Frame> {
        let frame = self.frames.pop_front().flatten();
        debug!(
            "sim: capture from {:?} -> {}",
            camera,
            if frame.is_some() { "frame" } else { "no frame" }
        );
        frame
    }
}

impl MissionReporter for SimPlatform {
    fn mission_started(&mut self) {
        self.events.push(ReportEvent::MissionStarted);
    }

    fn site_info(&mut self, site: u32, label: &str, count: u32) {
        info!("sim: site {} reported as {} x{}", site, label, count);
        self.events.push(ReportEvent::SiteInfo {
            site,
            label: label.to_string(),
            count,
        });
    }

    fn patrol_complete(&mut self) {
        self.events.push(ReportEvent::PatrolComplete);
    }

    fn target_recognized(&mut self) {
        self.events.push(ReportEvent::TargetRecognized);
    }

    fn target_snapshot(&mut self) {
        self.events.push(ReportEvent::TargetSnapshot);
    }

    fn mission_complete(&mut self) {
        self.events.push(ReportEvent::MissionComplete);
    }
}

/// Builds a minimal frame whose first byte is `tag`.
pub fn tagged_frame(tag: u8) -> Frame {
    Frame {
        width: 64,
        height: 48,
        data: vec![tag; (64 * 48) as usize],
    }
}

/// Detector backend that maps a frame's tag byte to canned detections.
///
/// Stands in for the real template-correlation or neural backends, which
/// live outside this crate.
#[derive(Debug, Default)]
pub struct ScriptedDetector {
    script: HashMap<u8, Vec<Detection>>,
}

impl ScriptedDetector {
    /// Creates an empty script; every frame detects nothing.
    pub fn new() -> Self {
        ScriptedDetector::default()
    }

    /// Adds detections for frames tagged `tag`.
    pub fn on_tag(mut self, tag: u8, detections: Vec<Detection>) -> Self {
        self.script.insert(tag, detections);
        self
    }
}

impl ItemDetector for ScriptedDetector {
    fn detect(&self, frame: &Frame) -> Vec<Detection> {
        frame
            .data
            .first()
            .and_then(|tag| self.script.get(tag))
            .cloned()
            .unwrap_or_default()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn motion_teleports_when_enabled() {
        let mut sim = SimPlatform::new(Point3::origin());
        let target = Pose::from_parts([1.0, 2.0, 3.0], [0.0, 0.0, 0.0, 1.0]).unwrap();
        sim.command_move(&target).unwrap();
        assert_eq!(sim.current_position(), Point3::new(1.0, 2.0, 3.0));
    }

    #[test]
    fn scripted_rejections_then_acceptance() {
        let mut sim = SimPlatform::new(Point3::origin());
        sim.fail_next_commands(2);
        let target = Pose::from_parts([1.0, 0.0, 0.0], [0.0, 0.0, 0.0, 1.0]).unwrap();
        assert!(sim.command_move(&target).is_err());
        assert!(sim.command_move(&target).is_err());
        assert!(sim.command_move(&target).is_ok());
    }

    #[test]
    fn capture_drains_the_queue_then_fails() {
        let mut sim = SimPlatform::new(Point3::origin());
        sim.push_frame(tagged_frame(7));
        sim.push_capture_failure();
        assert!(sim.capture(CameraKind::Navigation).is_some());
        assert!(sim.capture(CameraKind::Navigation).is_none());
        assert!(sim.capture(CameraKind::Dock).is_none());
    }

    #[test]
    fn scripted_detector_follows_the_tag() {
        let detector = ScriptedDetector::new().on_tag(1, vec![Detection::new("coin", 2.0)]);
        let hits = detector.detect(&tagged_frame(1));
        assert_eq!(hits.len(), 1);
        assert_eq!(hits[0].label, "coin");
        assert!(detector.detect(&tagged_frame(9)).is_empty());
    }
}

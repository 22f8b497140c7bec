//! Item perception for Astrolabe
//!
//! Recognition itself lives outside this crate: classical template
//! correlation and learned object detectors both plug in behind the
//! [`ItemDetector`] trait, and everything downstream is agnostic to which
//! backend produced a detection. This module owns only the detection value
//! type and the closed item vocabulary.

pub mod vocabulary;

use crate::platform::Frame;

/// One recognized-item candidate in a frame.
///
/// `strength` is whatever metric the backend produces, a template match
/// count or a classifier confidence. It is only ever compared within a
/// single frame, so the scales need not agree across backends.
#[derive(Debug, Clone, PartialEq)]
pub struct Detection {
    /// Item label, drawn from the closed vocabulary.
    pub label: String,
    /// Match count or confidence score.
    pub strength: f32,
}

impl Detection {
    /// Builds a detection.
    pub fn new(label: impl Into<String>, strength: f32) -> Self {
        Detection {
            label: label.into(),
            strength,
        }
    }
}

/// Capability interface over detection backends.
///
/// One method: a frame in, detections out. Template correlation and neural
/// detectors both satisfy it without the caller knowing which is in use.
pub trait ItemDetector {
    /// Detect known items in `frame`. An empty vector is a normal result.
    fn detect(&self, frame: &Frame) -> Vec<Detection>;
}
